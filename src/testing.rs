//! In-process stand-ins for the reader and the chat model.

use crate::config::Settings;
use crate::error::Result;
use crate::llm::ChatModel;
use crate::reader::{PageReader, ReaderResponse};
use crate::visit::Visitor;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Model answer with a fenced JSON object, evidence `E` and summary `S`.
pub const ANSWER: &str =
    "```json\n{\"rational\":\"r\",\"evidence\":\"E\",\"summary\":\"S\"}\n```";

/// Serves `content of <url>` after a delay; URLs containing "broken" get 500.
pub struct StubReader {
    latency: Duration,
    calls: Mutex<Vec<String>>,
}

impl StubReader {
    pub fn new(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageReader for StubReader {
    async fn read(&self, url: &str) -> Result<ReaderResponse> {
        self.calls.lock().unwrap().push(url.to_string());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if url.contains("broken") {
            return Ok(ReaderResponse {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(ReaderResponse::ok(format!("content of {}", url)))
    }
}

/// Serves the same body for every URL.
pub struct FixedPageReader(pub String);

#[async_trait]
impl PageReader for FixedPageReader {
    async fn read(&self, _url: &str) -> Result<ReaderResponse> {
        Ok(ReaderResponse::ok(self.0.clone()))
    }
}

/// Records every prompt and answers with [`ANSWER`].
#[derive(Default)]
pub struct RecordingModel {
    prompts: Mutex<Vec<String>>,
}

impl RecordingModel {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for RecordingModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(ANSWER.to_string())
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

/// Always answers with the same text.
pub struct FixedModel(pub String);

#[async_trait]
impl ChatModel for FixedModel {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(self.0.clone())
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

/// Visitor over a [`StubReader`] and a [`FixedModel`].
pub fn stub_visitor(reader: Arc<StubReader>, answer: &str, batch_timeout_secs: u64) -> Visitor {
    let mut settings = Settings::default();
    settings.visit.batch_timeout_secs = batch_timeout_secs;
    Visitor::with_components(&settings, reader, Arc::new(FixedModel(answer.to_string())))
        .unwrap()
}
