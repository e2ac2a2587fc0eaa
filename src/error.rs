//! Error types for webvisit.

use thiserror::Error;

/// Library-level error type for webvisit operations.
#[derive(Error, Debug)]
pub enum VisitError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Page reader error: {0}")]
    Reader(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for webvisit operations.
pub type Result<T> = std::result::Result<T, VisitError>;
