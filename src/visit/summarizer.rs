//! Goal-conditioned evidence extraction through a chat model.

use super::tokens::truncate_chars;
use crate::config::{Prompts, VisitSettings};
use crate::llm::ChatModel;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// How extraction retries shrink their input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionPolicy {
    /// Attempts after the first one.
    pub retries: u32,
    /// Fraction of the current content kept before an intermediate retry.
    pub shrink_factor: f64,
    /// Character length of the content on the final retry.
    pub floor_chars: usize,
    /// Responses shorter than this count as failures.
    pub min_response_chars: usize,
}

impl ExtractionPolicy {
    pub fn from_settings(settings: &VisitSettings) -> Self {
        Self {
            retries: settings.extraction_retries,
            shrink_factor: settings.shrink_factor,
            floor_chars: settings.floor_chars,
            min_response_chars: settings.min_response_chars,
        }
    }

    /// Character length of the content for `attempt` (1-based), given the
    /// length used by the previous attempt.
    ///
    /// The last retry drops to the floor; the ones before it keep
    /// `shrink_factor` of the previous length.
    pub fn next_length(&self, attempt: u32, previous: usize) -> usize {
        if attempt == self.retries + 1 {
            previous.min(self.floor_chars)
        } else {
            (previous as f64 * self.shrink_factor).round() as usize
        }
    }

    fn is_acceptable(&self, response: &str) -> bool {
        response.chars().count() >= self.min_response_chars
    }
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self::from_settings(&VisitSettings::default())
    }
}

/// Content and index of one extraction attempt.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionAttempt<'a> {
    pub content_snapshot: &'a str,
    pub attempt_index: u32,
}

/// Drives the extractor prompt through a [`ChatModel`].
pub struct Summarizer {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
    policy: ExtractionPolicy,
}

impl Summarizer {
    pub fn new(model: Arc<dyn ChatModel>, prompts: Prompts, policy: ExtractionPolicy) -> Self {
        Self {
            model,
            prompts,
            policy,
        }
    }

    /// Ask the model for evidence about `goal` in `content`.
    ///
    /// Returns the raw model text, or `None` when every attempt came back
    /// empty or too short.
    #[instrument(skip(self, content, goal), fields(content_len = content.len()))]
    pub async fn summarize(&self, content: &str, goal: &str) -> Option<String> {
        let total = self.policy.retries + 1;
        let mut attempt = ExtractionAttempt {
            content_snapshot: content,
            attempt_index: 1,
        };

        loop {
            debug!(
                "Calling {} for extraction (attempt {}/{}, {} chars)",
                self.model.model_name(),
                attempt.attempt_index,
                total,
                attempt.content_snapshot.chars().count()
            );

            let prompt = self
                .prompts
                .render_extractor(attempt.content_snapshot, goal);
            let response = match self.model.complete(&prompt).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("LLM call failed: {}", e);
                    String::new()
                }
            };

            if self.policy.is_acceptable(&response) {
                debug!("LLM extraction successful");
                return Some(response);
            }

            warn!(
                "LLM extraction attempt {}/{} failed, response length: {} chars",
                attempt.attempt_index,
                total,
                response.chars().count()
            );

            if attempt.attempt_index >= total {
                break;
            }

            let next_index = attempt.attempt_index + 1;
            let current = attempt.content_snapshot.chars().count();
            let next_len = self.policy.next_length(next_index, current);
            debug!("Truncating content from {} to {} chars", current, next_len);

            attempt = ExtractionAttempt {
                content_snapshot: truncate_chars(attempt.content_snapshot, next_len),
                attempt_index: next_index,
            };
        }

        error!("LLM extraction failed after {} attempts", total);
        None
    }
}
