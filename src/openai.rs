//! OpenAI-compatible client configuration for the summarization endpoint.

use crate::config::LlmSettings;
use crate::error::{Result, VisitError};
use async_openai::{config::OpenAIConfig, Client};
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

/// Create a client for the configured endpoint.
///
/// The routing headers (`HTTP-Referer`, `X-Title`) ride on the underlying
/// HTTP client so every request carries them.
pub fn create_client(settings: &LlmSettings) -> Result<Client<OpenAIConfig>> {
    let api_key = settings
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            VisitError::Config("OPENROUTER_API_KEY environment variable is not set".to_string())
        })?;

    let mut headers = HeaderMap::new();
    headers.insert("HTTP-Referer", header_value(&settings.referer)?);
    headers.insert("X-Title", header_value(&settings.title)?);

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .default_headers(headers)
        .build()
        .map_err(|e| VisitError::Llm(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(settings.base_url.trim_end_matches('/'));

    Ok(Client::with_config(config).with_http_client(http_client))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| VisitError::Config(format!("Invalid header value '{}': {}", value, e)))
}
