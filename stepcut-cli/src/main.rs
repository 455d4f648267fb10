//! Stepcut CLI
//!
//! Command-line interface for the STEP-to-DXF conversion and quoting service.

mod activity;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stepcut")]
#[command(about = "STEP to laser DXF conversion service CLI", long_about = None)]
struct Cli {
    /// Service base URL
    #[arg(long, env = "STEPCUT_API_BASE", default_value = "http://localhost:8787")]
    api_base: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "STEPCUT_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Delay between job status polls in milliseconds
    #[arg(long, env = "STEPCUT_POLL_INTERVAL_MS", default_value_t = 1500)]
    poll_interval_ms: u64,

    /// Stop watching after this many consecutive failed polls
    #[arg(long, env = "STEPCUT_MAX_POLL_FAILURES")]
    max_poll_failures: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stepcut_cli=info,stepcut_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_base: cli.api_base,
        request_timeout: Duration::from_secs(cli.timeout_secs),
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        max_poll_failures: cli.max_poll_failures,
    };
    config.validate()?;

    tracing::debug!("Using service at {}", config.api_base);

    handle_command(cli.command, &config).await
}
