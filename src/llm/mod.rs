//! Chat-completion model abstraction used by the summarizer.

mod openrouter;

pub use openrouter::OpenRouterChat;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for chat models that answer a single user prompt.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send `prompt` as one user message and return the assistant text.
    ///
    /// An empty string means the model answered with no content.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}
