//! webvisit CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use webvisit::cli::{commands, Cli, Commands};
use webvisit::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the environment may already be populated.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    webvisit::logging::init(&settings, cli.verbose)?;

    match &cli.command {
        Commands::Visit { urls, goal, output } => {
            commands::run_visit(urls, goal, output.clone(), settings).await?;
        }

        Commands::Doctor { online } => {
            commands::run_doctor(&settings, *online).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Mcp => {
            commands::run_mcp(settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
