//! Token counting and truncation for the summarization context window.

use crate::error::{Result, VisitError};
use std::borrow::Cow;
use tiktoken_rs::CoreBPE;

/// Counts and truncates text with the `cl100k_base` encoding.
pub struct TokenBudget {
    bpe: CoreBPE,
}

impl TokenBudget {
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| VisitError::Tokenizer(format!("Failed to load cl100k_base: {}", e)))?;
        Ok(Self { bpe })
    }

    /// Number of tokens in `text`.
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Truncate `text` to at most `max_tokens` tokens.
    ///
    /// Text already within budget is returned borrowed and untouched. The
    /// result always re-encodes within budget, so truncating twice gives the
    /// same text as truncating once.
    pub fn truncate<'a>(&self, text: &'a str, max_tokens: usize) -> Cow<'a, str> {
        let tokens = self.bpe.encode_ordinary(text);
        if tokens.len() <= max_tokens {
            return Cow::Borrowed(text);
        }

        // A prefix can end inside a multi-byte character or re-encode to
        // more tokens than it was cut from; back off until neither happens.
        let mut end = max_tokens;
        while end > 0 {
            if let Ok(prefix) = self.bpe.decode(tokens[..end].to_vec()) {
                if self.count(&prefix) <= max_tokens {
                    return Cow::Owned(prefix);
                }
            }
            end -= 1;
        }

        Cow::Owned(String::new())
    }
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
