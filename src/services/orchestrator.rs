// src/services/orchestrator.rs
use std::sync::Arc;

use log::info;
use reqwest::Client;

use crate::config::Config;
use crate::errors::ProxyError;
use crate::models::{
    AnalysisResult, AnalyzeRequest, GeneratedImage, GenerateRequest, GenerationHandle,
    ImagePayload, ProviderKind,
};
use crate::prompts::build_analysis_prompt;
use crate::services::extractor::extract;
use crate::services::image_processor::ImageProcessor;
use crate::services::poller::{MAX_POLL_ATTEMPTS, POLL_INTERVAL, await_generation};
use crate::services::providers::{
    AnalysisBackend, GeminiAdapter, GenerationBackend, LeonardoAdapter, OpenAiAdapter,
};

/// Composes prompt building, provider dispatch, extraction and polling for a
/// single request. Holds only read-only configuration and a shared HTTP
/// client; every other value lives and dies with the request.
pub struct Orchestrator {
    config: Arc<Config>,
    client: Client,
    image_processor: ImageProcessor,
}

impl Orchestrator {
    pub fn new(config: Arc<Config>, client: Client) -> Self {
        Self {
            config,
            client,
            image_processor: ImageProcessor::new(),
        }
    }

    pub async fn handle_analysis(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<AnalysisResult, ProxyError> {
        if request.image.trim().is_empty() {
            return Err(ProxyError::InvalidInput("image is required".to_string()));
        }

        let mode = request.mode();

        let mut images: Vec<ImagePayload> = vec![self.image_processor.prepare(&request.image)?];
        if let Some(image_b) = request.image_b.as_deref().filter(|b| !b.trim().is_empty()) {
            images.push(self.image_processor.prepare(image_b)?);
        }

        let prompt = build_analysis_prompt(
            request.title.as_deref(),
            &request.niche,
            &request.language,
            mode,
        );

        let provider = request.provider.unwrap_or(self.config.analysis_provider);
        let backend = self.analysis_backend(provider)?;

        info!("dispatching {:?} analysis to {}", mode, provider);
        let raw = backend.submit_analysis(&prompt, &images).await?;

        extract(&raw, mode)
    }

    pub async fn handle_generation(
        &self,
        request: &GenerateRequest,
    ) -> Result<GeneratedImage, ProxyError> {
        if request.prompt.trim().is_empty() {
            return Err(ProxyError::InvalidInput("prompt is required".to_string()));
        }

        let provider = self.config.generation_provider;
        let backend = self.generation_backend(provider)?;

        info!("dispatching generation to {}", provider);
        let url = match backend.submit_generation(&request.prompt).await? {
            GenerationHandle::Finished(url) => url,
            GenerationHandle::Queued(job) => {
                info!("provider queued job {}, polling", job.id);
                await_generation(backend.as_ref(), &job, POLL_INTERVAL, MAX_POLL_ATTEMPTS).await?
            }
        };

        Ok(GeneratedImage {
            generated_image_url: url,
        })
    }

    /// Resolves the vision adapter for a provider, once per request.
    fn analysis_backend(
        &self,
        provider: ProviderKind,
    ) -> Result<Box<dyn AnalysisBackend>, ProxyError> {
        let key = self.config.credential(provider).map(|k| k.to_string());
        match provider {
            ProviderKind::Gemini => Ok(Box::new(GeminiAdapter::new(key, self.client.clone()))),
            ProviderKind::OpenAi => Ok(Box::new(OpenAiAdapter::new(key, self.client.clone()))),
            ProviderKind::Leonardo => Err(ProxyError::InvalidInput(
                "provider 'leonardo' does not support image analysis".to_string(),
            )),
        }
    }

    fn generation_backend(
        &self,
        provider: ProviderKind,
    ) -> Result<Box<dyn GenerationBackend>, ProxyError> {
        let key = self.config.credential(provider).map(|k| k.to_string());
        match provider {
            ProviderKind::OpenAi => Ok(Box::new(OpenAiAdapter::new(key, self.client.clone()))),
            ProviderKind::Leonardo => Ok(Box::new(LeonardoAdapter::new(key, self.client.clone()))),
            ProviderKind::Gemini => Err(ProxyError::InvalidInput(
                "provider 'gemini' does not support image generation".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, engine::general_purpose};
    use image::ImageFormat;

    fn tiny_png_base64() -> String {
        let img = image::DynamicImage::new_rgb8(2, 2);
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        general_purpose::STANDARD.encode(bytes)
    }

    fn orchestrator(gemini_key: Option<&str>) -> Orchestrator {
        let config = Config {
            bind_addr: "0.0.0.0:0".to_string(),
            gemini_api_key: gemini_key.map(|k| k.to_string()),
            openai_api_key: None,
            leonardo_api_key: None,
            analysis_provider: ProviderKind::Gemini,
            generation_provider: ProviderKind::Leonardo,
        };
        Orchestrator::new(Arc::new(config), Client::new())
    }

    fn analyze_request(image: &str) -> AnalyzeRequest {
        serde_json::from_value(serde_json::json!({
            "image": image,
            "niche": "gaming"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn missing_image_is_invalid_input_before_any_network_call() {
        let err = orchestrator(None)
            .handle_analysis(&analyze_request("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn undecodable_image_is_invalid_input() {
        let err = orchestrator(Some("key"))
            .handle_analysis(&analyze_request("@@not-an-image@@"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn absent_credential_surfaces_before_any_network_call() {
        // No Gemini key configured: the adapter must refuse before dialing out.
        let err = orchestrator(None)
            .handle_analysis(&analyze_request(&tiny_png_base64()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProxyError::MissingCredential(ProviderKind::Gemini)
        ));
    }

    #[tokio::test]
    async fn leonardo_cannot_be_selected_for_analysis() {
        let mut request = analyze_request(&tiny_png_base64());
        request.provider = Some(ProviderKind::Leonardo);
        let err = orchestrator(Some("key"))
            .handle_analysis(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn blank_prompt_is_invalid_input() {
        let err = orchestrator(None)
            .handle_generation(&GenerateRequest {
                prompt: "   ".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn generation_without_leonardo_key_is_missing_credential() {
        let err = orchestrator(None)
            .handle_generation(&GenerateRequest {
                prompt: "a bold thumbnail".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProxyError::MissingCredential(ProviderKind::Leonardo)
        ));
    }
}
