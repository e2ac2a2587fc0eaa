//! Visit command - fetch and summarize pages from the terminal.

use crate::cli::preflight::{self, Operation};
use crate::cli::{count_failures, Output};
use crate::config::Settings;
use crate::visit::{format::BLOCK_SEPARATOR, VisitRequest, Visitor};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;

/// Run the visit command.
pub async fn run_visit(
    urls: &[String],
    goal: &str,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    let output = output.map(|p| Settings::expand_path(&p));
    preflight::check(
        Operation::Visit {
            output: output.as_deref(),
        },
        &settings,
    )?;

    let visitor = Visitor::new(&settings)?;
    let request = match urls {
        [single] => VisitRequest::single(single.clone(), goal),
        _ => VisitRequest::multiple(urls.to_vec(), goal),
    };

    let started = Instant::now();
    let spinner = Output::spinner(&format!(
        "Visiting {} page{}...",
        urls.len(),
        if urls.len() == 1 { "" } else { "s" }
    ));
    let result = visitor.visit(&request).await;
    spinner.finish_and_clear();

    let failures = count_failures(&result, BLOCK_SEPARATOR);

    match output {
        Some(path) => {
            write_result(&path, &result)?;
            Output::success(&format!("Result written to {}", path.display()));
        }
        None => Output::visit_result(&result, BLOCK_SEPARATOR),
    }

    let summary = format!(
        "{} of {} page(s) summarized in {:.1}s",
        urls.len().saturating_sub(failures),
        urls.len(),
        started.elapsed().as_secs_f64()
    );
    if failures > 0 {
        Output::warning(&summary);
    } else {
        Output::success(&summary);
    }

    Ok(())
}

fn write_result(path: &Path, result: &str) -> Result<()> {
    std::fs::write(path, format!("{}\n", result))
        .with_context(|| format!("Failed to write {}", path.display()))
}
