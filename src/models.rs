// src/models.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The AI backends this proxy can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Leonardo,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Leonardo => "leonardo",
        };
        f.write_str(name)
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            "leonardo" => Ok(ProviderKind::Leonardo),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Single-image analysis vs two-image comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Single,
    Comparison,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    /// Primary thumbnail, base64 (optionally a full data URL).
    pub image: String,
    /// Second thumbnail; when present and non-empty the request becomes an
    /// A/B comparison.
    #[serde(default)]
    pub image_b: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub niche: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Overrides the configured analysis provider for this request.
    #[serde(default)]
    pub provider: Option<ProviderKind>,
}

fn default_language() -> String {
    "português".to_string()
}

impl AnalyzeRequest {
    pub fn mode(&self) -> AnalysisMode {
        match &self.image_b {
            Some(b) if !b.trim().is_empty() => AnalysisMode::Comparison,
            _ => AnalysisMode::Single,
        }
    }
}

/// A base64 image body normalized for the adapters: data-URL prefix stripped,
/// MIME type detected from the decoded bytes.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub base64: String,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleReport {
    pub details: Vec<Criterion>,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_titles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<Vec<String>>,
    /// Prompt revisions add fields over time; unknown ones pass through.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionReport {
    pub details: Vec<Criterion>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    A,
    B,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub winner: Winner,
    pub justification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub version_a: VersionReport,
    pub version_b: VersionReport,
    pub comparison: Verdict,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    Single(SingleReport),
    Comparison(ComparisonReport),
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedImage {
    pub generated_image_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Complete,
    Failed,
}

/// Handle for a generation the provider runs asynchronously.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub id: String,
    pub status: JobStatus,
    pub result_url: Option<String>,
}

/// What a generation backend hands back on submit.
#[derive(Debug, Clone)]
pub enum GenerationHandle {
    /// The provider rendered inline and returned the asset location.
    Finished(String),
    /// The provider queued a job that must be polled.
    Queued(GenerationJob),
}
