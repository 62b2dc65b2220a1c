//! Tracing subscriber setup.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// Picks the filter directive: `RUST_LOG`, then `-v` count, then the configured level.
fn filter_directive(config: &LoggingConfig, verbose: u8, rust_log: Option<String>) -> String {
    if let Some(directive) = rust_log.filter(|d| !d.trim().is_empty()) {
        return directive;
    }
    match verbose {
        0 => config.level.clone(),
        1 => "info".to_owned(),
        2 => "debug".to_owned(),
        _ => "trace".to_owned(),
    }
}

/// Installs the global subscriber. Logs go to stderr so stdout stays clean
/// for command output.
///
/// # Errors
///
/// Returns an error for an invalid filter directive or when a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig, verbose: u8) -> Result<()> {
    let directive = filter_directive(config, verbose, std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{directive}'"))?;

    let layer = match config.format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .context("Failed to install tracing subscriber")
}
