//! Recovery of the evidence/summary JSON object from raw model text.

use serde_json::Value;
use std::fmt;

pub const MISSING_EVIDENCE: &str = "No evidence extracted";
pub const MISSING_SUMMARY: &str = "No summary generated";

/// Parsed extraction output.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    pub evidence: String,
    pub summary: String,
}

/// Why a model response could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseFailure {
    InvalidJson(String),
    NotAnObject,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailure::InvalidJson(e) => write!(f, "invalid JSON: {}", e),
            ParseFailure::NotAnObject => write!(f, "JSON value is not an object"),
        }
    }
}

impl std::error::Error for ParseFailure {}

/// Remove code fences and slice from the first `{` to the last `}`.
///
/// Text without a brace pair comes back fence-free and trimmed.
pub fn extract_json_object(text: &str) -> String {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(left), Some(right)) if left <= right => cleaned[left..=right].to_string(),
        _ => cleaned.to_string(),
    }
}

/// Parse raw model output into a [`SummaryRecord`].
pub fn parse_summary(raw: &str) -> Result<SummaryRecord, ParseFailure> {
    let json = extract_json_object(raw);
    let value: Value =
        serde_json::from_str(&json).map_err(|e| ParseFailure::InvalidJson(e.to_string()))?;

    let object = value.as_object().ok_or(ParseFailure::NotAnObject)?;

    Ok(SummaryRecord {
        evidence: field_text(object.get("evidence")).unwrap_or_else(|| MISSING_EVIDENCE.to_string()),
        summary: field_text(object.get("summary")).unwrap_or_else(|| MISSING_SUMMARY.to_string()),
    })
}

fn field_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        other => Some(other.to_string()),
    }
}
