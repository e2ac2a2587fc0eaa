//! Jina Reader client.

use super::{PageReader, ReaderResponse};
use crate::config::ReaderSettings;
use crate::error::{Result, VisitError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Reader backed by `GET {endpoint}/{url}` with a bearer token.
pub struct JinaReader {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl JinaReader {
    /// Create a reader from settings.
    pub fn new(settings: &ReaderSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| VisitError::Config("JINA_API_KEYS not set in environment".to_string()))?;

        Self::with_config(
            &settings.endpoint,
            &api_key,
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// Create a reader with an explicit endpoint, key and timeout.
    pub fn with_config(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VisitError::Reader(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Full request URL for a target page.
    pub fn request_url(&self, url: &str) -> String {
        format!("{}/{}", self.endpoint, url)
    }
}

#[async_trait]
impl PageReader for JinaReader {
    #[instrument(skip(self))]
    async fn read(&self, url: &str) -> Result<ReaderResponse> {
        let response = self
            .client
            .get(self.request_url(url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("Reader returned status {} with {} chars", status, body.len());

        Ok(ReaderResponse { status, body })
    }
}
