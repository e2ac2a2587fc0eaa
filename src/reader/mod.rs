//! Content-extraction service abstraction.
//!
//! A reader turns a URL into readable page text. The fetcher only sees the
//! raw HTTP outcome; deciding whether a body is usable happens upstream.

mod jina;

pub use jina::JinaReader;

use crate::error::Result;
use async_trait::async_trait;

/// Raw outcome of one reader request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderResponse {
    pub status: u16,
    pub body: String,
}

impl ReaderResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Trait for content-extraction services.
#[async_trait]
pub trait PageReader: Send + Sync {
    /// Perform a single request for `url`.
    ///
    /// Transport failures are errors; any HTTP status is a response.
    async fn read(&self, url: &str) -> Result<ReaderResponse>;
}
