mod calc;
mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use offline_cache::api::rest::{GatewayState, router};
use offline_cache::{HttpFetcher, OfflineCacheController, storage_from_config};

use crate::config::AppConfig;

/// Calculator web app server - offline cache gateway and terminal calculator
#[derive(Parser)]
#[command(name = "calc-pwa-server")]
#[command(about = "Calculator web app server - offline cache gateway and terminal calculator")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install, activate and serve the offline gateway
    Run,
    /// Validate configuration and exit
    Check,
    /// Read key names from stdin and print the calculator display
    Calc,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.config
        && !Path::new(path).is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (CALC_PWA__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.port);

    logging::init_logging(&config.logging, cli.verbose)?;

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    // Dispatch subcommands (default: run)
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
        Commands::Calc => {
            let stdin = std::io::stdin();
            calc::run_keys(stdin.lock(), std::io::stdout().lock())
        }
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.validate()?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    config.validate()?;
    let addr = config.socket_addr()?;
    let cache_config = &config.offline_cache;

    let storage = storage_from_config(&cache_config.storage).await?;
    let fetcher = Arc::new(HttpFetcher::new());
    let controller = Arc::new(OfflineCacheController::new(
        cache_config,
        fetcher.clone(),
        storage,
    )?);

    controller
        .install()
        .await
        .context("Offline cache install failed")?;
    if controller.should_activate() {
        controller.activate().await?;
    }

    let app = router(GatewayState {
        controller,
        fetcher,
        origin: cache_config.origin_url()?,
    });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, origin = %cache_config.origin, "Offline gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Offline gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
