//! Visit pipeline: fetch a page, extract goal-relevant evidence, format it.
//!
//! [`Visitor`] is the entry point. Every failure inside the pipeline becomes
//! a formatted response block, so callers (usually an agent loop) always get
//! text back.

pub mod fetcher;
pub mod format;
pub mod parser;
pub mod retry;
pub mod summarizer;
pub mod tokens;

pub use fetcher::{FetchPolicy, FetchResult, Fetcher};
pub use parser::{parse_summary, ParseFailure, SummaryRecord};
pub use retry::RetryPolicy;
pub use summarizer::{ExtractionPolicy, Summarizer};
pub use tokens::TokenBudget;

use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::llm::{ChatModel, OpenRouterChat};
use crate::reader::{JinaReader, PageReader};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// One URL or an ordered list of URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UrlInput {
    Single(String),
    Multiple(Vec<String>),
}

/// A validated visit request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRequest {
    pub url: UrlInput,
    pub goal: String,
}

/// Reasons a request is rejected before any network call.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestError {
    InvalidFormat,
    InvalidUrlType(&'static str),
    EmptyUrlList,
    EmptyUrl,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidFormat => write!(
                f,
                "[Visit] Invalid request format: Input must be a JSON object containing 'url' and 'goal' fields"
            ),
            RequestError::InvalidUrlType(kind) => write!(f, "[Visit] Invalid URL type: {}", kind),
            RequestError::EmptyUrlList => write!(f, "[Visit] Invalid URL type: empty list"),
            RequestError::EmptyUrl => write!(f, "[Visit] Invalid URL type: empty string"),
        }
    }
}

impl std::error::Error for RequestError {}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl VisitRequest {
    pub fn single(url: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            url: UrlInput::Single(url.into()),
            goal: goal.into(),
        }
    }

    pub fn multiple(urls: Vec<String>, goal: impl Into<String>) -> Self {
        Self {
            url: UrlInput::Multiple(urls),
            goal: goal.into(),
        }
    }

    /// Validate untyped tool arguments.
    pub fn from_value(params: &Value) -> std::result::Result<Self, RequestError> {
        let object = params.as_object().ok_or(RequestError::InvalidFormat)?;
        let url = object.get("url").ok_or(RequestError::InvalidFormat)?;
        let goal = object
            .get("goal")
            .and_then(Value::as_str)
            .ok_or(RequestError::InvalidFormat)?;

        let url = match url {
            Value::String(s) => UrlInput::Single(s.clone()),
            Value::Array(items) => {
                let urls = items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .map(str::to_string)
                            .ok_or(RequestError::InvalidUrlType(json_kind(item)))
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                UrlInput::Multiple(urls)
            }
            other => return Err(RequestError::InvalidUrlType(json_kind(other))),
        };

        let request = Self {
            url,
            goal: goal.to_string(),
        };
        request.validate()?;
        Ok(request)
    }

    /// Check that the URL list is non-empty and holds no empty URL.
    pub fn validate(&self) -> std::result::Result<(), RequestError> {
        match &self.url {
            UrlInput::Single(url) if url.trim().is_empty() => Err(RequestError::EmptyUrl),
            UrlInput::Multiple(urls) if urls.is_empty() => Err(RequestError::EmptyUrlList),
            UrlInput::Multiple(urls) if urls.iter().any(|u| u.trim().is_empty()) => {
                Err(RequestError::EmptyUrl)
            }
            _ => Ok(()),
        }
    }
}

/// Fetches, summarizes and formats web pages for a goal.
pub struct Visitor {
    fetcher: Fetcher,
    summarizer: Summarizer,
    budget: TokenBudget,
    max_content_length: usize,
    max_tokens: usize,
    batch_timeout: Duration,
}

impl Visitor {
    /// Build a visitor with the Jina reader and the OpenRouter model.
    ///
    /// Fails when a credential is missing.
    pub fn new(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let reader = Arc::new(JinaReader::new(&settings.reader)?);
        let model = Arc::new(OpenRouterChat::new(&settings.llm)?);

        info!(
            "Visit tool initialized (reader timeout {}s, {} rounds x {} attempts, model {})",
            settings.reader.timeout_secs,
            settings.reader.max_rounds,
            settings.reader.max_retries,
            settings.llm.model
        );

        Self::with_components(settings, reader, model)
    }

    /// Build a visitor with custom reader and model.
    pub fn with_components(
        settings: &Settings,
        reader: Arc<dyn PageReader>,
        model: Arc<dyn ChatModel>,
    ) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.extractor_file.as_deref())?;

        Ok(Self {
            fetcher: Fetcher::new(reader, FetchPolicy::from_settings(&settings.reader)),
            summarizer: Summarizer::new(
                model,
                prompts,
                ExtractionPolicy::from_settings(&settings.visit),
            ),
            budget: TokenBudget::new()?,
            max_content_length: settings.visit.max_content_length,
            max_tokens: settings.visit.max_tokens,
            batch_timeout: settings.batch_timeout(),
        })
    }

    /// Handle tool arguments given as a JSON string.
    pub async fn visit_raw(&self, params: &str) -> String {
        match serde_json::from_str::<Value>(params) {
            Ok(value) => self.visit_value(&value).await,
            Err(e) => {
                error!("Parameter parsing failed: {}", e);
                RequestError::InvalidFormat.to_string()
            }
        }
    }

    /// Handle untyped tool arguments (`{"url": ..., "goal": ...}`).
    pub async fn visit_value(&self, params: &Value) -> String {
        match VisitRequest::from_value(params) {
            Ok(request) => self.visit(&request).await,
            Err(e) => {
                error!("Rejected visit request: {}", e);
                e.to_string()
            }
        }
    }

    /// Visit every URL of a request and return the joined, trimmed response.
    pub async fn visit(&self, request: &VisitRequest) -> String {
        if let Err(e) = request.validate() {
            error!("Rejected visit request: {}", e);
            return e.to_string();
        }

        let start = Instant::now();
        let response = match &request.url {
            UrlInput::Single(url) => {
                info!("Processing visit request for 1 URL, goal: {}", preview(&request.goal));
                self.visit_url(url, &request.goal).await
            }
            UrlInput::Multiple(urls) => {
                info!(
                    "Processing visit request for {} URLs, goal: {}",
                    urls.len(),
                    preview(&request.goal)
                );
                self.visit_urls(urls, &request.goal).await
            }
        };

        info!(
            "Visit request completed in {:.2}s, response length: {}",
            start.elapsed().as_secs_f64(),
            response.len()
        );

        response.trim().to_string()
    }

    /// Process URLs in order under the cumulative batch timeout.
    pub async fn visit_urls(&self, urls: &[String], goal: &str) -> String {
        let start = Instant::now();
        let mut blocks = Vec::with_capacity(urls.len());

        for (idx, url) in urls.iter().enumerate() {
            if start.elapsed() > self.batch_timeout {
                warn!(
                    "Batch timeout reached ({}s), processed {}/{} URLs",
                    self.batch_timeout.as_secs(),
                    idx,
                    urls.len()
                );
                blocks.push(format::failure_block(url, goal, Some(format::BATCH_TIMEOUT)));
                continue;
            }

            debug!("Processing URL {}/{}: {}", idx + 1, urls.len(), url);
            blocks.push(self.visit_url(url, goal).await);
        }

        info!(
            "Batch processing completed: {} URLs in {:.2}s",
            urls.len(),
            start.elapsed().as_secs_f64()
        );

        blocks.join(format::BLOCK_SEPARATOR)
    }

    /// Fetch, summarize and parse a single URL into one response block.
    #[instrument(skip(self, goal))]
    pub async fn visit_url(&self, url: &str, goal: &str) -> String {
        let content = match self.fetcher.fetch(url).await {
            FetchResult::Fetched(content) => content,
            FetchResult::Failed(reason) => {
                warn!("Failed to fetch content from {}: {}", url, reason);
                let message = format!("{}: {}", format::FETCH_FAILED, reason);
                return format::failure_block(url, goal, Some(&message));
            }
        };
        debug!("Fetched {} characters from {}", content.len(), url);

        let capped = tokens::truncate_chars(&content, self.max_content_length);
        let budgeted = self.budget.truncate(capped, self.max_tokens);
        debug!("Content truncated to {} characters", budgeted.len());

        let raw = match self.summarizer.summarize(&budgeted, goal).await {
            Some(raw) => raw,
            None => {
                warn!("Failed to generate summary for {}", url);
                return format::failure_block(url, goal, Some(format::SUMMARY_FAILED));
            }
        };

        match parse_summary(&raw) {
            Ok(record) => format::success_block(url, goal, &record.evidence, &record.summary),
            Err(e) => {
                warn!("Failed to parse summary JSON for {}: {}", url, e);
                format::failure_block(url, goal, Some(format::PARSE_FAILED))
            }
        }
    }
}

fn preview(text: &str) -> String {
    let head = tokens::truncate_chars(text, 50);
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        stub_visitor as visitor, FixedPageReader, RecordingModel, StubReader, ANSWER,
    };
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_single_url_success() {
        let reader = StubReader::new(Duration::ZERO);
        let visitor = visitor(reader.clone(), ANSWER, 900);

        let response = visitor
            .visit(&VisitRequest::single("https://a.example", "find facts"))
            .await;

        assert_eq!(
            response,
            "The useful information in https://a.example for user goal find facts as follows: \n\n\
             Evidence in page: \nE\n\n\
             Summary: \nS"
        );
        assert_eq!(reader.calls(), vec!["https://a.example".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_multi_url_order_with_isolated_failure() {
        let reader = StubReader::new(Duration::ZERO);
        let visitor = visitor(reader, ANSWER, 900);
        let urls = vec![
            "https://a.example".to_string(),
            "https://broken.example".to_string(),
            "https://c.example".to_string(),
        ];

        let response = visitor.visit(&VisitRequest::multiple(urls, "g")).await;
        let blocks: Vec<&str> = response.split(format::BLOCK_SEPARATOR).collect();

        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].contains("https://a.example") && blocks[0].contains("Evidence in page: \nE"));
        assert!(blocks[1].contains("https://broken.example"));
        assert!(blocks[1].contains("Error: Failed to fetch webpage: fetch exhausted"));
        assert!(blocks[2].contains("https://c.example") && blocks[2].contains("Summary: \nS"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_timeout_skips_later_urls() {
        let reader = StubReader::new(Duration::from_secs(2));
        let visitor = visitor(reader.clone(), ANSWER, 1);
        let urls = vec!["https://a.example".to_string(), "https://b.example".to_string()];

        let response = visitor.visit(&VisitRequest::multiple(urls, "g")).await;
        let blocks: Vec<&str> = response.split(format::BLOCK_SEPARATOR).collect();

        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("Evidence in page: \nE"));
        assert!(blocks[1].contains("https://b.example"));
        assert!(blocks[1].contains("Error: Batch timeout exceeded"));
        assert_eq!(reader.calls(), vec!["https://a.example".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_model_output_reports_summary_failure() {
        let reader = StubReader::new(Duration::ZERO);
        let visitor = visitor(reader, "", 900);

        let response = visitor.visit(&VisitRequest::single("https://a.example", "g")).await;

        assert!(response.contains("Error: Summary generation failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_prose_output_reports_parse_failure() {
        let reader = StubReader::new(Duration::ZERO);
        let visitor = visitor(reader, "I could not find anything useful here.", 900);

        let response = visitor.visit(&VisitRequest::single("https://a.example", "g")).await;

        assert!(response.contains("Error: Summary parsing failed"));
    }

    #[tokio::test]
    async fn test_missing_url_makes_no_network_call() {
        let reader = StubReader::new(Duration::ZERO);
        let visitor = visitor(reader.clone(), ANSWER, 900);

        let response = visitor.visit_value(&json!({"goal": "g"})).await;

        assert_eq!(response, RequestError::InvalidFormat.to_string());
        assert!(response.starts_with("[Visit] Invalid request format"));
        assert!(reader.calls().is_empty());
    }

    #[tokio::test]
    async fn test_visit_raw_rejects_non_json() {
        let reader = StubReader::new(Duration::ZERO);
        let visitor = visitor(reader.clone(), ANSWER, 900);

        let response = visitor.visit_raw("url=https://a.example").await;

        assert_eq!(response, RequestError::InvalidFormat.to_string());
        assert!(reader.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_visit_raw_accepts_url_list() {
        let reader = StubReader::new(Duration::ZERO);
        let visitor = visitor(reader.clone(), ANSWER, 900);

        let response = visitor
            .visit_raw(r#"{"url": ["https://a.example", "https://b.example"], "goal": "g"}"#)
            .await;

        assert_eq!(response.matches("Evidence in page: \nE").count(), 2);
        assert_eq!(reader.calls().len(), 2);
    }

    /// Visitor whose extractor prompt is the bare page content, so the
    /// recorded prompt is exactly what reached the model.
    fn limited_visitor(
        page: &str,
        max_content_length: usize,
        max_tokens: usize,
    ) -> (Visitor, Arc<RecordingModel>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let prompt_path = dir.path().join("extractor.txt");
        std::fs::write(&prompt_path, "{{webpage_content}}").unwrap();

        let mut settings = Settings::default();
        settings.prompts.extractor_file = Some(prompt_path.to_string_lossy().to_string());
        settings.visit.max_content_length = max_content_length;
        settings.visit.max_tokens = max_tokens;

        let model = Arc::new(RecordingModel::default());
        let visitor = Visitor::with_components(
            &settings,
            Arc::new(FixedPageReader(page.to_string())),
            model.clone(),
        )
        .unwrap();
        (visitor, model, dir)
    }

    #[tokio::test]
    async fn test_content_capped_by_characters() {
        let page = "é".repeat(500);
        let (visitor, model, _dir) = limited_visitor(&page, 120, 95_000);

        let response = visitor.visit(&VisitRequest::single("https://a.example", "g")).await;

        assert!(response.contains("Evidence in page: \nE"));
        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].chars().count(), 120);
        assert!(page.starts_with(&prompts[0]));
    }

    #[tokio::test]
    async fn test_content_truncated_to_token_budget() {
        let page = "alpha beta gamma delta ".repeat(400);
        let (visitor, model, _dir) = limited_visitor(&page, 150_000, 50);

        visitor.visit(&VisitRequest::single("https://a.example", "g")).await;

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        let budget = TokenBudget::new().unwrap();
        let tokens = budget.count(&prompts[0]);
        assert!(tokens > 0 && tokens <= 50, "prompt has {} tokens", tokens);
        assert!(prompts[0].len() < page.len());
        assert!(page.starts_with(&prompts[0]));
    }

    #[tokio::test]
    async fn test_character_cap_applies_before_token_budget() {
        let page = "alpha beta gamma delta ".repeat(400);
        let (visitor, model, _dir) = limited_visitor(&page, 46, 1_000);

        visitor.visit(&VisitRequest::single("https://a.example", "g")).await;

        assert_eq!(
            model.prompts(),
            vec!["alpha beta gamma delta alpha beta gamma delta ".to_string()]
        );
    }

    #[test]
    fn test_request_validation() {
        assert_eq!(
            VisitRequest::from_value(&json!({"url": "https://a", "goal": "g"})),
            Ok(VisitRequest::single("https://a", "g"))
        );
        assert_eq!(
            VisitRequest::from_value(&json!({"url": 42, "goal": "g"})),
            Err(RequestError::InvalidUrlType("number"))
        );
        assert_eq!(
            VisitRequest::from_value(&json!({"url": ["https://a", 1], "goal": "g"})),
            Err(RequestError::InvalidUrlType("number"))
        );
        assert_eq!(
            VisitRequest::from_value(&json!({"url": [], "goal": "g"})),
            Err(RequestError::EmptyUrlList)
        );
        assert_eq!(
            VisitRequest::from_value(&json!({"url": "", "goal": "g"})),
            Err(RequestError::EmptyUrl)
        );
        assert_eq!(
            VisitRequest::from_value(&json!({"url": "https://a", "goal": 3})),
            Err(RequestError::InvalidFormat)
        );
        assert_eq!(
            VisitRequest::from_value(&json!(["https://a"])),
            Err(RequestError::InvalidFormat)
        );
    }

    #[test]
    fn test_url_input_deserializes_both_shapes() {
        let single: VisitRequest =
            serde_json::from_value(json!({"url": "https://a", "goal": "g"})).unwrap();
        assert_eq!(single.url, UrlInput::Single("https://a".to_string()));

        let multiple: VisitRequest =
            serde_json::from_value(json!({"url": ["https://a"], "goal": "g"})).unwrap();
        assert_eq!(multiple.url, UrlInput::Multiple(vec!["https://a".to_string()]));
    }
}
