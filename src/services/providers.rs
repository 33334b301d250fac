// src/services/providers.rs
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::errors::ProxyError;
use crate::models::{
    GenerationHandle, GenerationJob, ImagePayload, JobStatus, ProviderKind,
};

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";
const LEONARDO_URL: &str = "https://cloud.leonardo.ai/api/rest/v1/generations";
const LEONARDO_MODEL_ID: &str = "b24e16ff-06e3-43eb-8d33-4416c2d75876";

/// Vision backends: prompt plus one or two images in, raw model text out.
/// Exactly one outbound call per invocation; no retries here.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn submit_analysis(
        &self,
        prompt: &str,
        images: &[ImagePayload],
    ) -> Result<String, ProxyError>;
}

/// Generation backends: some render inline, others queue a job that the
/// poller drives through `fetch_job_status`.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn submit_generation(&self, prompt: &str) -> Result<GenerationHandle, ProxyError>;

    async fn fetch_job_status(&self, job_id: &str) -> Result<GenerationJob, ProxyError>;
}

fn transport_error(e: reqwest::Error) -> ProxyError {
    ProxyError::UpstreamUnavailable(e.to_string())
}

/// Reads the response body and classifies non-success statuses, keeping the
/// upstream code and body for diagnostics.
async fn read_success_body(resp: reqwest::Response) -> Result<Value, ProxyError> {
    let status = resp.status();
    let body = resp.text().await.map_err(transport_error)?;

    if !status.is_success() {
        return Err(ProxyError::UpstreamRejected {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|_| ProxyError::MalformedUpstreamPayload { raw: body })
}

// --- Gemini ---------------------------------------------------------------

pub struct GeminiAdapter {
    api_key: Option<String>,
    client: Client,
}

impl GeminiAdapter {
    pub fn new(api_key: Option<String>, client: Client) -> Self {
        Self { api_key, client }
    }
}

#[async_trait]
impl AnalysisBackend for GeminiAdapter {
    async fn submit_analysis(
        &self,
        prompt: &str,
        images: &[ImagePayload],
    ) -> Result<String, ProxyError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProxyError::MissingCredential(ProviderKind::Gemini))?;

        // Gemini wants bare base64 in inline_data parts, never a data URL.
        let mut parts = vec![json!({ "text": prompt })];
        for image in images {
            parts.push(json!({
                "inline_data": {
                    "mime_type": image.mime_type,
                    "data": image.base64
                }
            }));
        }

        let resp = self
            .client
            .post(GEMINI_URL)
            .header("x-goog-api-key", api_key)
            .json(&json!({
                "contents": [{ "parts": parts }],
                "generationConfig": {
                    "temperature": 0.4,
                    "maxOutputTokens": 2048
                }
            }))
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_success_body(resp).await?;

        let text = body["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(text)
    }
}

// --- OpenAI ---------------------------------------------------------------

pub struct OpenAiAdapter {
    api_key: Option<String>,
    client: Client,
}

impl OpenAiAdapter {
    pub fn new(api_key: Option<String>, client: Client) -> Self {
        Self { api_key, client }
    }

    fn key(&self) -> Result<&str, ProxyError> {
        self.api_key
            .as_deref()
            .ok_or(ProxyError::MissingCredential(ProviderKind::OpenAi))
    }
}

#[async_trait]
impl AnalysisBackend for OpenAiAdapter {
    async fn submit_analysis(
        &self,
        prompt: &str,
        images: &[ImagePayload],
    ) -> Result<String, ProxyError> {
        let api_key = self.key()?;

        let mut content = vec![json!({ "type": "text", "text": prompt })];
        for image in images {
            content.push(json!({
                "type": "image_url",
                "image_url": { "url": image.data_url() }
            }));
        }

        let resp = self
            .client
            .post(OPENAI_CHAT_URL)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&json!({
                "model": "gpt-4o",
                "messages": [{ "role": "user", "content": content }],
                "max_tokens": 2048
            }))
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_success_body(resp).await?;

        let text = body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(text)
    }
}

#[async_trait]
impl GenerationBackend for OpenAiAdapter {
    async fn submit_generation(&self, prompt: &str) -> Result<GenerationHandle, ProxyError> {
        let api_key = self.key()?;

        let resp = self
            .client
            .post(OPENAI_IMAGES_URL)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&json!({
                "model": "dall-e-3",
                "prompt": prompt,
                "n": 1,
                "size": "1792x1024",
                "response_format": "url"
            }))
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_success_body(resp).await?;

        let url = body["data"][0]["url"].as_str().ok_or_else(|| {
            ProxyError::GenerationFailed("no image URL in provider response".to_string())
        })?;

        Ok(GenerationHandle::Finished(url.to_string()))
    }

    async fn fetch_job_status(&self, job_id: &str) -> Result<GenerationJob, ProxyError> {
        // OpenAI generations complete inline; there is nothing to poll.
        Err(ProxyError::GenerationFailed(format!(
            "unknown generation job '{}'",
            job_id
        )))
    }
}

// --- Leonardo -------------------------------------------------------------

pub struct LeonardoAdapter {
    api_key: Option<String>,
    client: Client,
}

impl LeonardoAdapter {
    pub fn new(api_key: Option<String>, client: Client) -> Self {
        Self { api_key, client }
    }

    fn key(&self) -> Result<&str, ProxyError> {
        self.api_key
            .as_deref()
            .ok_or(ProxyError::MissingCredential(ProviderKind::Leonardo))
    }
}

#[async_trait]
impl GenerationBackend for LeonardoAdapter {
    async fn submit_generation(&self, prompt: &str) -> Result<GenerationHandle, ProxyError> {
        let api_key = self.key()?;

        let resp = self
            .client
            .post(LEONARDO_URL)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&json!({
                "prompt": prompt,
                "modelId": LEONARDO_MODEL_ID,
                "width": 1024,
                "height": 576,
                "num_images": 1
            }))
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_success_body(resp).await?;

        let job_id = body["sdGenerationJob"]["generationId"]
            .as_str()
            .ok_or_else(|| {
                ProxyError::GenerationFailed("no generation id in provider response".to_string())
            })?;

        Ok(GenerationHandle::Queued(GenerationJob {
            id: job_id.to_string(),
            status: JobStatus::Pending,
            result_url: None,
        }))
    }

    async fn fetch_job_status(&self, job_id: &str) -> Result<GenerationJob, ProxyError> {
        let api_key = self.key()?;

        let resp = self
            .client
            .get(format!("{}/{}", LEONARDO_URL, job_id))
            .header("Authorization", format!("Bearer {}", api_key))
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_success_body(resp).await?;

        let generation = &body["generations_by_pk"];
        let status = match generation["status"].as_str() {
            Some("COMPLETE") => JobStatus::Complete,
            Some("FAILED") => JobStatus::Failed,
            // PENDING and any future in-flight status keep the job running.
            _ => JobStatus::Pending,
        };

        let result_url = if status == JobStatus::Complete {
            generation["generated_images"][0]["url"]
                .as_str()
                .map(|u| u.to_string())
        } else {
            None
        };

        Ok(GenerationJob {
            id: job_id.to_string(),
            status,
            result_url,
        })
    }
}
