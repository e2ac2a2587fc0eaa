//! Pre-flight checks before expensive operations.
//!
//! Validates credentials, prompt overrides and output paths before a
//! command starts, so a visit does not fail after minutes of fetching.

use crate::config::Settings;
use crate::error::{Result, VisitError};
use std::path::Path;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// A CLI visit, optionally writing its result to a file.
    Visit { output: Option<&'a Path> },
    /// Long-running servers (HTTP and MCP).
    Serve,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation<'_>, settings: &Settings) -> Result<()> {
    settings.validate()?;
    check_prompt_file(settings)?;

    if let Operation::Visit {
        output: Some(path),
    } = operation
    {
        check_output_path(path)?;
    }
    Ok(())
}

fn check_prompt_file(settings: &Settings) -> Result<()> {
    match &settings.prompts.extractor_file {
        Some(file) if !Settings::expand_path(file).is_file() => Err(VisitError::Config(format!(
            "Extractor prompt file not found: {}",
            file
        ))),
        _ => Ok(()),
    }
}

fn check_output_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(VisitError::Config(format!(
            "Output path is a directory: {}",
            path.display()
        )));
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(VisitError::Config(format!(
                "Output directory does not exist: {}",
                parent.display()
            )))
        }
        _ => Ok(()),
    }
}
