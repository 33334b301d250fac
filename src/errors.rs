// src/errors.rs
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::models::ProviderKind;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("API key for provider '{0}' is not configured")]
    MissingCredential(ProviderKind),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("AI provider unreachable: {0}")]
    UpstreamUnavailable(String),

    #[error("AI provider rejected the request ({status}): {body}")]
    UpstreamRejected { status: u16, body: String },

    #[error("AI provider returned an empty response")]
    EmptyUpstreamPayload,

    #[error("AI provider returned malformed JSON: {raw}")]
    MalformedUpstreamPayload { raw: String },

    #[error("AI response is missing required structure: {0}")]
    SchemaMismatch(String),

    #[error("Image generation failed: {0}")]
    GenerationFailed(String),

    #[error("Image generation did not finish in time")]
    GenerationTimeout,
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MissingCredential(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            // Upstream status codes pass through verbatim so callers can
            // distinguish e.g. provider-side 401s from our own errors.
            ProxyError::UpstreamRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::EmptyUpstreamPayload
            | ProxyError::MalformedUpstreamPayload { .. }
            | ProxyError::SchemaMismatch(_)
            | ProxyError::GenerationFailed(_) => StatusCode::BAD_GATEWAY,
            ProxyError::GenerationTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}
