//! Configuration module for webvisit.
//!
//! Handles loading settings (file, then environment) and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, EXTRACTOR_PROMPT};
pub use settings::{
    mask_secret, GeneralSettings, LlmSettings, PromptSettings, ReaderSettings, Settings,
    VisitSettings,
};
