//! Tracing setup: console on stderr plus a timestamped file in the log directory.

use crate::config::Settings;
use crate::error::{Result, VisitError};
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Console level for a `-v` count.
pub fn console_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// `log_<YYYY_mm_dd-HH_MM_SS>.log`
pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("log_{}.log", now.format("%Y_%m_%d-%H_%M_%S"))
}

fn open_log_file(dir: &Path, now: DateTime<Local>) -> Result<(PathBuf, File)> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(log_file_name(now));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the console filter. Returns the log file path when
/// the file layer could be opened.
pub fn init(settings: &Settings, verbose: u8) -> Result<Option<PathBuf>> {
    let console_filter = EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| format!("webvisit={}", console_level(verbose))),
    );
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file_level = if settings.general.debug_logging {
        "debug"
    } else {
        "info"
    };

    let (log_path, file_layer) = match open_log_file(&settings.log_dir(), Local::now()) {
        Ok((path, file)) => {
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(EnvFilter::new(format!("webvisit={}", file_level)));
            (Some(path), Some(layer))
        }
        Err(e) => {
            eprintln!(
                "failed to open log file in '{}': {}",
                settings.log_dir().display(),
                e
            );
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| VisitError::Config(format!("Failed to initialize logging: {}", e)))?;

    if let Some(path) = &log_path {
        tracing::info!("Logging to {}", path.display());
    }

    Ok(log_path)
}
