//! leadrelay - reliable lead form submission
//!
//! Main entry point for the leadrelay CLI.

mod cli;
mod cmd_config;
mod cmd_submit;
mod ui;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use leadrelay_config::{Config, ConfigLoader, LoggingConfig};

use crate::cli::{Cli, Commands};

/// Get the leadrelay home directory (~/.leadrelay).
fn leadrelay_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".leadrelay"))
        .unwrap_or_else(|| PathBuf::from(".leadrelay"))
}

/// Initialize tracing with console and optional file output.
///
/// Log files are written to `logging.directory` (default ~/.leadrelay/logs/) with
/// daily rotation.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();

    let file_layer = if logging.file {
        let log_dir = logging
            .directory
            .clone()
            .unwrap_or_else(|| leadrelay_dir().join("logs"));
        std::fs::create_dir_all(&log_dir)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("leadrelay")
            .filename_suffix("log")
            .max_log_files(14)
            .build(&log_dir)?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console on stderr, stdout is reserved for command output
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(true),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Load the config file, falling back to defaults when it does not exist.
fn load_config(path: &Path) -> Result<(Config, bool), Box<dyn std::error::Error>> {
    if path.exists() {
        Ok((ConfigLoader::load(path)?, true))
    } else {
        Ok((Config::default(), false))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::CheckConfig = cli.command {
        return cmd_config::handle_check_config(&cli.config);
    }

    let (config, loaded) = load_config(&cli.config)?;
    init_tracing(&config.logging)?;

    if loaded {
        info!(config = %cli.config.display(), "Configuration loaded");
    } else {
        warn!(config = %cli.config.display(), "Config file not found, using defaults");
    }

    match cli.command {
        Commands::Submit {
            form,
            endpoint,
            invalid,
        } => cmd_submit::handle_submit(config, form, endpoint, invalid).await,
        Commands::Preview { form } => cmd_submit::handle_preview(config, form).await,
        Commands::CheckConfig => Ok(()),
    }
}
