// src/handlers.rs
use actix_web::{HttpResponse, web};
use log::{info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::errors::ProxyError;
use crate::models::{AnalyzeRequest, GenerateRequest};

pub async fn analyze(
    data: web::Data<AppState>,
    body: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, ProxyError> {
    let request_id = Uuid::new_v4();
    let request = body.into_inner();
    info!(
        "[{}] analyze: mode={:?} niche={:?}",
        request_id,
        request.mode(),
        request.niche
    );

    let result = data
        .orchestrator
        .handle_analysis(&request)
        .await
        .inspect_err(|e| warn!("[{}] analyze failed: {}", request_id, e))?;

    Ok(HttpResponse::Ok().json(result))
}

pub async fn generate_image(
    data: web::Data<AppState>,
    body: web::Json<GenerateRequest>,
) -> Result<HttpResponse, ProxyError> {
    let request_id = Uuid::new_v4();
    info!("[{}] generate-image", request_id);

    let result = data
        .orchestrator
        .handle_generation(&body.into_inner())
        .await
        .inspect_err(|e| warn!("[{}] generation failed: {}", request_id, e))?;

    Ok(HttpResponse::Ok().json(result))
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "analisathumb",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use reqwest::Client;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::models::ProviderKind;
    use crate::services::Orchestrator;

    fn test_state() -> web::Data<AppState> {
        let config = Arc::new(Config {
            bind_addr: "0.0.0.0:0".to_string(),
            gemini_api_key: None,
            openai_api_key: None,
            leonardo_api_key: None,
            analysis_provider: ProviderKind::Gemini,
            generation_provider: ProviderKind::Leonardo,
        });
        web::Data::new(AppState {
            orchestrator: Arc::new(Orchestrator::new(config, Client::new())),
        })
    }

    #[actix_web::test]
    async fn health_endpoint_responds() {
        let app = test::init_service(
            App::new().route("/health", web::get().to(health_check)),
        )
        .await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request())
            .await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn empty_image_returns_400_with_error_body() {
        let app = test::init_service(
            App::new()
                .app_data(test_state())
                .route("/api/analyze", web::post().to(analyze)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/analyze")
            .set_json(serde_json::json!({ "image": "", "niche": "tech" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("image"));
    }

    #[actix_web::test]
    async fn empty_prompt_returns_400() {
        let app = test::init_service(
            App::new()
                .app_data(test_state())
                .route("/api/generate-image", web::post().to(generate_image)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/generate-image")
            .set_json(serde_json::json!({ "prompt": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unconfigured_provider_returns_500() {
        let app = test::init_service(
            App::new()
                .app_data(test_state())
                .route("/api/generate-image", web::post().to(generate_image)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/generate-image")
            .set_json(serde_json::json!({ "prompt": "a fox" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("leonardo"));
    }
}
