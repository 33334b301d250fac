// src/services/extractor.rs
//
// The upstream model is an untrusted text generator: it was *asked* for bare
// JSON but routinely wraps it in markdown fences or pads it with whitespace.
// This module is the single gate between that text and the typed result the
// rest of the service relies on. Validation failure fails the request; a
// missing field is never papered over.

use serde_json::Value;

use crate::errors::ProxyError;
use crate::models::{AnalysisMode, AnalysisResult, ComparisonReport, SingleReport};

const CRITERIA_COUNT: usize = 5;
const MAX_SCORE: u64 = 100;

pub fn extract(raw: &str, mode: AnalysisMode) -> Result<AnalysisResult, ProxyError> {
    let cleaned = strip_fences(raw);
    if cleaned.is_empty() {
        return Err(ProxyError::EmptyUpstreamPayload);
    }

    let value: Value = serde_json::from_str(cleaned).map_err(|_| {
        ProxyError::MalformedUpstreamPayload {
            raw: raw.to_string(),
        }
    })?;

    match mode {
        AnalysisMode::Single => validate_single(&value).map(AnalysisResult::Single),
        AnalysisMode::Comparison => validate_comparison(&value).map(AnalysisResult::Comparison),
    }
}

/// Removes a leading/trailing markdown code fence (with or without a
/// language tag) and surrounding whitespace.
fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the language tag ("json", "JSON", ...) up to the first newline.
        text = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest,
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

fn validate_single(value: &Value) -> Result<SingleReport, ProxyError> {
    validate_criteria(value, "details")?;
    require_field(value, "recommendations")?;

    serde_json::from_value(value.clone())
        .map_err(|e| ProxyError::SchemaMismatch(e.to_string()))
}

fn validate_comparison(value: &Value) -> Result<ComparisonReport, ProxyError> {
    for version in ["version_a", "version_b"] {
        let report = require_field(value, version)?;
        validate_criteria(report, "details")
            .map_err(|e| prefix_mismatch(version, e))?;
    }

    let comparison = require_field(value, "comparison")?;
    match comparison["winner"].as_str() {
        Some("A") | Some("B") => {}
        Some(other) => {
            return Err(ProxyError::SchemaMismatch(format!(
                "comparison.winner must be \"A\" or \"B\", got \"{}\"",
                other
            )));
        }
        None => {
            return Err(ProxyError::SchemaMismatch(
                "missing field 'comparison.winner'".to_string(),
            ));
        }
    }

    serde_json::from_value(value.clone())
        .map_err(|e| ProxyError::SchemaMismatch(e.to_string()))
}

fn require_field<'a>(value: &'a Value, field: &str) -> Result<&'a Value, ProxyError> {
    match value.get(field) {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(ProxyError::SchemaMismatch(format!(
            "missing field '{}'",
            field
        ))),
    }
}

/// The criteria field must be an *ordered array* of 5 `{name, score}`
/// objects with scores in 0..=100. A keyed map loses the canonical order and
/// is rejected outright.
fn validate_criteria(value: &Value, field: &str) -> Result<(), ProxyError> {
    let entries = match require_field(value, field)? {
        Value::Array(entries) => entries,
        _ => {
            return Err(ProxyError::SchemaMismatch(format!(
                "'{}' must be an ordered array, not a map",
                field
            )));
        }
    };

    if entries.len() != CRITERIA_COUNT {
        return Err(ProxyError::SchemaMismatch(format!(
            "'{}' must have exactly {} entries, got {}",
            field,
            CRITERIA_COUNT,
            entries.len()
        )));
    }

    for (i, entry) in entries.iter().enumerate() {
        if entry["name"].as_str().is_none() {
            return Err(ProxyError::SchemaMismatch(format!(
                "'{}[{}].name' must be a string",
                field, i
            )));
        }
        match entry["score"].as_u64() {
            Some(score) if score <= MAX_SCORE => {}
            _ => {
                return Err(ProxyError::SchemaMismatch(format!(
                    "'{}[{}].score' must be an integer between 0 and 100",
                    field, i
                )));
            }
        }
    }

    Ok(())
}

fn prefix_mismatch(prefix: &str, err: ProxyError) -> ProxyError {
    match err {
        ProxyError::SchemaMismatch(msg) => {
            ProxyError::SchemaMismatch(format!("{}: {}", prefix, msg))
        }
        other => other,
    }
}
