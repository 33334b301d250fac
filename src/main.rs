// src/main.rs
use actix_web::{App, HttpServer, middleware, web};
use log::info;
use std::sync::Arc;

mod config;
mod errors;
mod handlers;
mod models;
mod prompts;
mod services;

use crate::config::Config;
use crate::handlers::{analyze, generate_image, health_check};
use crate::services::Orchestrator;

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Arc::new(Config::from_env());
    info!(
        "Starting AnalisaThumb backend (analysis: {}, generation: {})",
        config.analysis_provider, config.generation_provider
    );

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .expect("Failed to create HTTP client");

    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        orchestrator: Arc::new(Orchestrator::new(config, client)),
    };

    info!("Starting HTTP server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .service(
                web::scope("/api")
                    .route("/analyze", web::post().to(analyze))
                    .route("/generate-image", web::post().to(generate_image)),
            )
            .route("/health", web::get().to(health_check))
    })
    .bind(bind_addr)?
    .run()
    .await
}
