//! OpenRouter chat model via the OpenAI-compatible API.

use super::ChatModel;
use crate::config::LlmSettings;
use crate::error::{Result, VisitError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, error, instrument, warn};

/// Chat model backed by an OpenAI-compatible endpoint.
pub struct OpenRouterChat {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl OpenRouterChat {
    /// Create a chat model from settings.
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_retries: settings.max_retries.max(1),
        })
    }

    async fn request_once(&self, prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| VisitError::Llm(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| VisitError::Llm(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| VisitError::Llm(format!("Chat completion error: {}", e)))?;

        Ok(response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ChatModel for OpenRouterChat {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        for attempt in 1..=self.max_retries {
            debug!("LLM API call attempt {}/{}", attempt, self.max_retries);

            let content = self.request_once(prompt).await?;
            if !content.is_empty() {
                debug!("LLM response received: {} characters", content.len());
                return Ok(content);
            }

            warn!("LLM returned empty content on attempt {}", attempt);
        }

        error!("LLM call returned no content after {} attempts", self.max_retries);
        Ok(String::new())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
