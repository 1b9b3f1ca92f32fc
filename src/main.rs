//! HTML rewriting forward proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────────▶ http::server ──▶ http::dispatch ──▶ upstream::fetcher ──▶ Origin
//!                                              │
//!                                              │ text/html?
//!                                  ┌───────────┴───────────┐
//!                                  ▼ yes                   ▼ no
//!                         transform::pipeline        raw bytes
//!                    (parse → links → text → pretty)       │
//!                                  │                       │
//!     Client Response              ▼                       ▼
//!     ◀───────────────── http::response ◀──────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use trademark_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use trademark_proxy::lifecycle;
use trademark_proxy::observability::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "trademark-proxy", version)]
#[command(about = "Forward proxy that rewrites HTML from a single origin", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(long)]
    bind: Option<String>,

    /// Override `upstream.origin`.
    #[arg(long)]
    origin: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(origin) = cli.origin {
        config.upstream.origin = origin;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        origin = %config.upstream.origin,
        upstream_timeout_ms = config.upstream.timeout_ms,
        word_length = config.transform.word_length,
        "Configuration loaded"
    );

    lifecycle::run(config).await?;
    Ok(())
}
