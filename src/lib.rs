//! webvisit - goal-directed web page visits for research agents.
//!
//! Given one or more URLs and a goal, webvisit fetches each page through
//! Jina Reader, asks an OpenRouter-hosted model to extract the evidence
//! relevant to the goal, and returns a formatted text block per URL.
//!
//! # Architecture
//!
//! - `config` - Settings file, environment overrides and prompt templates
//! - `reader` - Page-text extraction service client
//! - `llm` - Chat model used for evidence extraction
//! - `visit` - Fetch, truncate, summarize, parse and format pipeline
//! - `mcp` / `cli` - Tool surfaces for agents and humans
//!
//! # Example
//!
//! ```rust,no_run
//! use webvisit::config::Settings;
//! use webvisit::visit::{VisitRequest, Visitor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let visitor = Visitor::new(&settings)?;
//!
//!     let request = VisitRequest::single("https://www.rust-lang.org", "What is Rust for?");
//!     println!("{}", visitor.visit(&request).await);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod mcp;
pub mod openai;
pub mod reader;
#[cfg(test)]
mod testing;
pub mod visit;

pub use error::{Result, VisitError};
