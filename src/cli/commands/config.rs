//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Run the config command.
///
/// `config_path` is the `-c` override, if any.
pub fn run_config(
    action: &ConfigAction,
    config_path: Option<PathBuf>,
    settings: Settings,
) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            println!("{}", render_redacted(&settings)?);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }

        ConfigAction::Init { force } => {
            init_config(&config_path, *force)?;
        }
    }

    Ok(())
}

fn render_redacted(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(&settings.redacted())
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))
}

/// Write defaults to `path`. Credentials are left out so they stay in the
/// environment.
fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        Output::warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ));
        return Ok(());
    }

    Settings::default().save_to(&path.to_path_buf())?;
    Output::success(&format!("Created default config at {}", path.display()));
    Ok(())
}
