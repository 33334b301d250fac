// src/config.rs
use std::env;

use crate::models::ProviderKind;

/// Process-wide read-only configuration, resolved once at startup and passed
/// explicitly into the orchestrator. Missing keys are not fatal here: a
/// request only fails if it selects a provider whose key is absent.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub leonardo_api_key: Option<String>,
    pub analysis_provider: ProviderKind,
    pub generation_provider: ProviderKind,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        Self {
            bind_addr: format!("0.0.0.0:{}", port),
            gemini_api_key: non_empty(env::var("GEMINI_API_KEY").ok()),
            openai_api_key: non_empty(env::var("OPENAI_API_KEY").ok()),
            leonardo_api_key: non_empty(env::var("LEONARDO_API_KEY").ok()),
            analysis_provider: provider_from_env("ANALYSIS_PROVIDER", ProviderKind::Gemini),
            generation_provider: provider_from_env("GENERATION_PROVIDER", ProviderKind::Leonardo),
        }
    }

    /// Credential lookup for a provider; absence is a value, not an error.
    pub fn credential(&self, provider: ProviderKind) -> Option<&str> {
        match provider {
            ProviderKind::Gemini => self.gemini_api_key.as_deref(),
            ProviderKind::OpenAi => self.openai_api_key.as_deref(),
            ProviderKind::Leonardo => self.leonardo_api_key.as_deref(),
        }
    }
}

fn provider_from_env(var: &str, default: ProviderKind) -> ProviderKind {
    env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_config() -> Config {
        Config {
            bind_addr: "0.0.0.0:8080".to_string(),
            gemini_api_key: Some("g-key".to_string()),
            openai_api_key: None,
            leonardo_api_key: None,
            analysis_provider: ProviderKind::Gemini,
            generation_provider: ProviderKind::Leonardo,
        }
    }

    #[test]
    fn credential_lookup_returns_absence_not_error() {
        let config = bare_config();
        assert_eq!(config.credential(ProviderKind::Gemini), Some("g-key"));
        assert_eq!(config.credential(ProviderKind::OpenAi), None);
        assert_eq!(config.credential(ProviderKind::Leonardo), None);
    }
}
