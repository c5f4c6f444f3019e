use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use opsdeck::client::{Backend, BackendConfig, DEFAULT_TIMEOUT_MS};
use opsdeck::registry::Registry;
use opsdeck::server::{self, Console};
use opsdeck::status::StatusHub;

/// Environment fallback for the backend base URL.
const API_BASE_ENV: &str = "OPSDECK_API_BASE";
/// Backend used when neither the flag nor the environment names one.
const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// opsdeck — Operator console driving a scan-and-scrape backend from the browser.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "opsdeck",
    version,
    about = "Operator console driving a scan-and-scrape backend from the browser.",
    long_about = None
)]
struct Cli {
    /// Base URL of the backend API. Falls back to OPSDECK_API_BASE.
    #[arg(long = "api-base")]
    api_base: Option<String>,

    /// Address the console listens on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Seconds between background status polls.
    #[arg(long = "poll-secs", default_value_t = 10)]
    poll_secs: u64,

    /// Backend request timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Log filter directives, e.g. "opsdeck=debug". Falls back to RUST_LOG.
    #[arg(long)]
    log: Option<String>,
}

fn init_tracing(directives: Option<&str>) {
    let filter = match directives {
        Some(spec) => EnvFilter::new(spec),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref());

    let api_base = cli
        .api_base
        .clone()
        .or_else(|| std::env::var(API_BASE_ENV).ok())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

    println!("opsdeck configuration:");
    println!("  api_base    : {api_base}");
    println!("  bind        : {}", cli.bind);
    println!("  poll_secs   : {}", cli.poll_secs);
    println!("  timeout_ms  : {}", cli.timeout_ms);

    let registry = Registry::new().context("operation catalog failed validation")?;
    let backend = Backend::new(BackendConfig {
        base_url: api_base,
        timeout_ms: cli.timeout_ms,
    })
    .context("invalid backend configuration")?;

    let hub = StatusHub::new(backend.clone(), Duration::from_secs(cli.poll_secs.max(1)));
    let shutdown = CancellationToken::new();
    let poller = hub.spawn_poller(shutdown.clone());

    let console = Console::new(registry, backend, hub);

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!("\nShutting down...");
                shutdown.cancel();
            }
        });
    }

    println!("Console starting at http://{} (Ctrl+C to stop)", cli.bind);
    let result = server::serve(&cli.bind, console, shutdown.clone()).await;

    // Stop the poller even when the server exits on its own.
    shutdown.cancel();
    let _ = poller.await;
    result
}
