//! Rule-based HTTP request router.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request       ┌──────────────────────────────────────────────┐
//!     ─────────────────────┼─▶ http server ──▶ routing engine            │
//!                          │   (request id,     (ordered rules,          │
//!                          │    trace)           first match wins)       │
//!                          │                         │                   │
//!                          │                         ▼                   │
//!                          │                   destination pool ─────────┼──▶ Destination
//!                          │                         │                   │
//!     404 / 500            │                   no match / failure        │
//!     ◀────────────────────┼──── response ◀──────────┘                   │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use rule_router::config::load_config;
use rule_router::lifecycle::{self, signals, Shutdown};
use rule_router::observability::logging;

#[derive(Parser)]
#[command(name = "rule-router")]
#[command(about = "Route HTTP requests to named destinations by hostname and pathname", long_about = None)]
struct Cli {
    /// Path to the router configuration (TOML, or JSON for *.json).
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}", cli.config.display(), e);
            return Err(e.into());
        }
    };

    logging::init_logging(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        bind_address = %config.listener.bind_address,
        rules = config.rules.len(),
        destinations = config.destinations.len(),
        "rule-router starting"
    );

    let shutdown = Shutdown::new();
    let running = lifecycle::start(config, &shutdown).await?;
    signals::spawn_signal_handler(shutdown.clone());

    running.handle.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
