//! Configuration settings for webvisit.

use crate::error::{Result, VisitError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub reader: ReaderSettings,
    pub llm: LlmSettings,
    pub visit: VisitSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for log files.
    pub log_dir: String,
    /// Write debug-level records to the log file.
    pub debug_logging: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_dir: "log".to_string(),
            debug_logging: true,
        }
    }
}

/// Content-extraction service (Jina Reader) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    /// Reader endpoint; the target URL is appended after a slash.
    pub endpoint: String,
    /// Bearer token for the reader.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// HTTP attempts per fetch round.
    pub max_retries: u32,
    /// Delay between HTTP attempts in milliseconds.
    pub retry_delay_ms: u64,
    /// Independent fetch rounds per URL.
    pub max_rounds: u32,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://r.jina.ai".to_string(),
            api_key: None,
            timeout_secs: 50,
            max_retries: 3,
            retry_delay_ms: 500,
            max_rounds: 8,
        }
    }
}

/// Summarization model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// OpenAI-compatible API base URL.
    pub base_url: String,
    /// API key for the LLM endpoint.
    pub api_key: Option<String>,
    /// Model used for evidence extraction.
    pub model: String,
    pub temperature: f32,
    /// Calls per extraction attempt when the model returns empty content.
    pub max_retries: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Value of the `HTTP-Referer` routing header.
    pub referer: String,
    /// Value of the `X-Title` routing header.
    pub title: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: None,
            model: "alibaba/tongyi-deepresearch-30b-a3b".to_string(),
            temperature: 0.7,
            max_retries: 1,
            timeout_secs: 300,
            referer: "https://github.com/QwenLM/DeepResearch".to_string(),
            title: "DeepResearch".to_string(),
        }
    }
}

/// Visit pipeline limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitSettings {
    /// Character cap applied to fetched content before token budgeting.
    pub max_content_length: usize,
    /// Token budget for content sent to the model.
    pub max_tokens: usize,
    /// Cumulative wall-clock budget for a list of URLs, in seconds.
    pub batch_timeout_secs: u64,
    /// Extra extraction attempts after the first one.
    pub extraction_retries: u32,
    /// Fraction of content kept on each intermediate extraction retry.
    pub shrink_factor: f64,
    /// Character length used on the final extraction retry.
    pub floor_chars: usize,
    /// Responses shorter than this many characters count as failures.
    pub min_response_chars: usize,
}

impl Default for VisitSettings {
    fn default() -> Self {
        Self {
            max_content_length: 150_000,
            max_tokens: 95_000,
            batch_timeout_secs: 900,
            extraction_retries: 3,
            shrink_factor: 0.7,
            floor_chars: 25_000,
            min_response_chars: 10,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// File whose content replaces the built-in extractor prompt.
    pub extractor_file: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment variables are applied on top of the file.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Override fields from environment variables.
    ///
    /// `lookup` is `std::env::var` in production and a map in tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("JINA_API_KEYS") {
            self.reader.api_key = Some(v);
        }
        if let Some(v) = get("OPENROUTER_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = get("SUMMARY_MODEL_NAME") {
            self.llm.model = v;
        }
        if let Some(v) = get("VISIT_SERVER_TIMEOUT") {
            self.reader.timeout_secs = parse_env("VISIT_SERVER_TIMEOUT", &v)?;
        }
        if let Some(v) = get("WEBCONTENT_MAXLENGTH") {
            self.visit.max_content_length = parse_env("WEBCONTENT_MAXLENGTH", &v)?;
        }
        if let Some(v) = get("VISIT_SERVER_MAX_RETRIES") {
            self.llm.max_retries = parse_env("VISIT_SERVER_MAX_RETRIES", &v)?;
        }
        if let Some(v) = get("VISIT_MAX_TOKENS") {
            self.visit.max_tokens = parse_env("VISIT_MAX_TOKENS", &v)?;
        }
        if let Some(v) = get("VISIT_BATCH_TIMEOUT") {
            self.visit.batch_timeout_secs = parse_env("VISIT_BATCH_TIMEOUT", &v)?;
        }
        if let Some(v) = get("DEBUG_VISIT") {
            self.general.debug_logging = v.eq_ignore_ascii_case("true");
        }
        if let Some(v) = get("VISIT_LOG_DIR") {
            self.general.log_dir = v;
        }

        Ok(())
    }

    /// Fail fast when a required credential is missing.
    pub fn validate(&self) -> Result<()> {
        if self.reader_api_key().is_none() {
            return Err(VisitError::Config(
                "JINA_API_KEYS not set in environment".to_string(),
            ));
        }
        if self.llm_api_key().is_none() {
            return Err(VisitError::Config(
                "OPENROUTER_API_KEY not set in environment".to_string(),
            ));
        }
        if self.reader.max_rounds == 0 || self.reader.max_retries == 0 {
            return Err(VisitError::Config(
                "reader.max_rounds and reader.max_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Reader key, if set and non-empty.
    pub fn reader_api_key(&self) -> Option<&str> {
        self.reader.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// LLM key, if set and non-empty.
    pub fn llm_api_key(&self) -> Option<&str> {
        self.llm.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VisitError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Copy of the settings with API keys masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.reader.api_key = copy.reader.api_key.as_deref().map(mask_secret);
        copy.llm.api_key = copy.llm.api_key.as_deref().map(mask_secret);
        copy
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("webvisit")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded log directory path.
    pub fn log_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.log_dir)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.visit.batch_timeout_secs)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| VisitError::Config(format!("Invalid value for {}: {}", key, value)))
}

/// Mask a secret, keeping a short prefix and suffix.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.reader.max_rounds, 8);
        assert_eq!(settings.reader.max_retries, 3);
        assert_eq!(settings.reader.retry_delay_ms, 500);
        assert_eq!(settings.reader.timeout_secs, 50);
        assert_eq!(settings.visit.max_tokens, 95_000);
        assert_eq!(settings.visit.batch_timeout_secs, 900);
        assert_eq!(settings.visit.floor_chars, 25_000);
    }

    #[test]
    fn test_apply_env_overrides() {
        let vars = env(&[
            ("JINA_API_KEYS", " jina-key "),
            ("OPENROUTER_API_KEY", "or-key"),
            ("SUMMARY_MODEL_NAME", "alibaba/qwen-max"),
            ("VISIT_SERVER_TIMEOUT", "20"),
            ("DEBUG_VISIT", "FALSE"),
        ]);
        let mut settings = Settings::default();
        settings.apply_env(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(settings.reader_api_key(), Some("jina-key"));
        assert_eq!(settings.llm_api_key(), Some("or-key"));
        assert_eq!(settings.llm.model, "alibaba/qwen-max");
        assert_eq!(settings.reader.timeout_secs, 20);
        assert!(!settings.general.debug_logging);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_numeric_env() {
        let vars = env(&[("VISIT_BATCH_TIMEOUT", "soon")]);
        let mut settings = Settings::default();
        let err = settings.apply_env(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("VISIT_BATCH_TIMEOUT"));
    }

    #[test]
    fn test_validate_requires_credentials() {
        let settings = Settings::default();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("JINA_API_KEYS"));

        let mut settings = Settings::default();
        settings.reader.api_key = Some("jina".to_string());
        settings.llm.api_key = Some(String::new());
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_str = r#"
            [reader]
            max_rounds = 2

            [visit]
            batch_timeout_secs = 30
        "#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.reader.max_rounds, 2);
        assert_eq!(settings.reader.max_retries, 3);
        assert_eq!(settings.visit.batch_timeout_secs, 30);
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("jina_1234567890"), "jina...7890");
        assert_eq!(mask_secret("short"), "***");
    }
}
