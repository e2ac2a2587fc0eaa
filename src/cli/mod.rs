//! CLI module for webvisit.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{count_failures, Output};

use clap::{Parser, Subcommand};

/// webvisit - goal-directed web page visits
///
/// Fetches pages through Jina Reader and extracts the evidence relevant to a
/// goal with an OpenRouter model.
#[derive(Parser, Debug)]
#[command(name = "webvisit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase console verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Visit one or more pages and summarize them for a goal
    Visit {
        /// URLs to visit, processed in order
        #[arg(required = true, num_args = 1..)]
        urls: Vec<String>,

        /// What information to look for
        #[arg(short, long)]
        goal: String,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check credentials and configuration
    Doctor {
        /// Also send a test request to the reader and the model endpoint
        #[arg(long)]
        online: bool,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Start MCP server exposing the visit tool over stdio
    Mcp,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (API keys masked)
    Show,

    /// Show configuration file path
    Path,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
