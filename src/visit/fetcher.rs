//! Page fetching with two retry layers.
//!
//! The inner layer retries HTTP attempts until the reader answers 200. The
//! outer layer repeats whole rounds because the reader can answer 200 with a
//! body that is empty or carries an upstream failure marker.

use super::retry::RetryPolicy;
use crate::config::ReaderSettings;
use crate::reader::PageReader;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Body prefixes the reader uses to report a failed extraction with status 200.
pub const FAILURE_SENTINELS: &[&str] = &["[document_parser]", "[visit] Empty content."];

/// Reason reported when every round fails.
pub const FETCH_EXHAUSTED: &str = "fetch exhausted";

/// Outcome of fetching one URL.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Fetched(String),
    Failed(String),
}

/// Default check for a usable 200 body.
pub fn is_usable_content(body: &str) -> bool {
    !body.trim().is_empty() && !FAILURE_SENTINELS.iter().any(|s| body.starts_with(s))
}

/// Retry configuration for the fetcher.
#[derive(Debug, Clone, Copy)]
pub struct FetchPolicy {
    /// Independent fetch rounds.
    pub rounds: u32,
    /// HTTP attempts within a round, with the delay between them.
    pub attempts: RetryPolicy,
    /// Decides whether a 200 body ends the fetch.
    pub is_usable: fn(&str) -> bool,
}

impl FetchPolicy {
    pub fn from_settings(settings: &ReaderSettings) -> Self {
        Self {
            rounds: settings.max_rounds.max(1),
            attempts: RetryPolicy::new(
                settings.max_retries,
                Duration::from_millis(settings.retry_delay_ms),
            ),
            is_usable: is_usable_content,
        }
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self::from_settings(&ReaderSettings::default())
    }
}

/// Fetches page content through a [`PageReader`].
pub struct Fetcher {
    reader: Arc<dyn PageReader>,
    policy: FetchPolicy,
}

impl Fetcher {
    pub fn new(reader: Arc<dyn PageReader>, policy: FetchPolicy) -> Self {
        Self { reader, policy }
    }

    /// Fetch `url`, returning its content or the failure reason.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> FetchResult {
        for round in 1..=self.policy.rounds {
            debug!("Fetch round {}/{}", round, self.policy.rounds);

            match self.read_round(url, round).await {
                Some(body) if (self.policy.is_usable)(&body) => {
                    debug!("Fetched content on round {}", round);
                    return FetchResult::Fetched(body);
                }
                Some(body) => {
                    warn!(
                        "Round {} returned unusable content: {:?}",
                        round,
                        snippet(&body, 100)
                    );
                }
                None => {
                    debug!("Round {} failed without a 200 response", round);
                }
            }
        }

        error!(
            "All {} fetch rounds failed for {}",
            self.policy.rounds, url
        );
        FetchResult::Failed(FETCH_EXHAUSTED.to_string())
    }

    /// One round of HTTP attempts; returns the first 200 body.
    async fn read_round(&self, url: &str, round: u32) -> Option<String> {
        let attempts = self.policy.attempts;

        for attempt in attempts.attempts() {
            debug!(
                "Reader request round {} attempt {}/{}",
                round, attempt, attempts.max_attempts
            );

            match self.reader.read(url).await {
                Ok(response) if response.is_ok() => {
                    info!("Reader success: {} chars from {}", response.body.len(), url);
                    return Some(response.body);
                }
                Ok(response) => {
                    warn!(
                        "Reader error (round {}, attempt {}): status={}, response={:?}",
                        round,
                        attempt,
                        response.status,
                        snippet(&response.body, 200)
                    );
                }
                Err(e) => {
                    warn!(
                        "Reader request failed (round {}, attempt {}): {}",
                        round, attempt, e
                    );
                }
            }

            attempts.pause_after(attempt).await;
        }

        error!(
            "Reader failed after {} attempts in round {}: {}",
            attempts.max_attempts, round, url
        );
        None
    }
}

fn snippet(text: &str, max_chars: usize) -> &str {
    super::tokens::truncate_chars(text, max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, VisitError};
    use crate::reader::ReaderResponse;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses, then repeats the fallback.
    struct ScriptedReader {
        script: Mutex<VecDeque<Result<ReaderResponse>>>,
        fallback: ReaderResponse,
        calls: Mutex<u32>,
    }

    impl ScriptedReader {
        fn new(script: Vec<Result<ReaderResponse>>, fallback: ReaderResponse) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                fallback,
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl PageReader for ScriptedReader {
        async fn read(&self, _url: &str) -> Result<ReaderResponse> {
            *self.calls.lock().unwrap() += 1;
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(self.fallback.clone()))
        }
    }

    fn status(code: u16) -> ReaderResponse {
        ReaderResponse {
            status: code,
            body: format!("error {}", code),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_returns_body_unmodified() {
        let body = "  # Title\n\nPage body with [links](http://x).  ";
        let reader = ScriptedReader::new(vec![], ReaderResponse::ok(body));
        let fetcher = Fetcher::new(reader.clone(), FetchPolicy::default());

        let result = fetcher.fetch("https://example.com").await;

        assert_eq!(result, FetchResult::Fetched(body.to_string()));
        assert_eq!(reader.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_errors_exhaust_every_attempt() {
        let reader = ScriptedReader::new(vec![], status(503));
        let fetcher = Fetcher::new(reader.clone(), FetchPolicy::default());

        let result = fetcher.fetch("https://example.com").await;

        assert_eq!(result, FetchResult::Failed(FETCH_EXHAUSTED.to_string()));
        assert_eq!(reader.calls(), 8 * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_errors_are_retried() {
        let reader = ScriptedReader::new(
            vec![
                Err(VisitError::Reader("connection reset".to_string())),
                Ok(status(429)),
            ],
            ReaderResponse::ok("content"),
        );
        let fetcher = Fetcher::new(reader.clone(), FetchPolicy::default());

        let result = fetcher.fetch("https://example.com").await;

        assert_eq!(result, FetchResult::Fetched("content".to_string()));
        assert_eq!(reader.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sentinel_body_starts_new_round() {
        let reader = ScriptedReader::new(
            vec![
                Ok(ReaderResponse::ok("[document_parser] failed to parse")),
                Ok(ReaderResponse::ok("")),
            ],
            ReaderResponse::ok("real content"),
        );
        let fetcher = Fetcher::new(reader.clone(), FetchPolicy::default());

        let result = fetcher.fetch("https://example.com").await;

        assert_eq!(result, FetchResult::Fetched("real content".to_string()));
        // A 200 ends its round, so each body costs exactly one call.
        assert_eq!(reader.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_attempts_within_round() {
        let reader = ScriptedReader::new(vec![], status(500));
        let policy = FetchPolicy {
            rounds: 1,
            attempts: RetryPolicy::new(3, Duration::from_millis(500)),
            is_usable: is_usable_content,
        };
        let fetcher = Fetcher::new(reader.clone(), policy);
        let start = tokio::time::Instant::now();

        fetcher.fetch("https://example.com").await;

        assert_eq!(reader.calls(), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(1500));
    }

    #[test]
    fn test_is_usable_content() {
        assert!(is_usable_content("Some page"));
        assert!(!is_usable_content("   \n"));
        assert!(!is_usable_content("[document_parser] error"));
        assert!(!is_usable_content("[visit] Empty content."));
        assert!(is_usable_content("Intro mentions [document_parser] later"));
    }
}
