//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate the configuration and build the routing table and destination pool
//! - Install the metrics exporter when enabled
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::{ConfigError, RouterConfig};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// A running server.
pub struct Running {
    pub local_addr: SocketAddr,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

/// Start serving `config` until `shutdown` is triggered.
pub async fn start(config: RouterConfig, shutdown: &Shutdown) -> Result<Running, StartupError> {
    let bind_address = config.listener.bind_address.clone();
    let metrics_enabled = config.observability.metrics_enabled;
    let metrics_address = config.observability.metrics_address.clone();
    let server = HttpServer::new(config)?;

    if metrics_enabled {
        let addr: SocketAddr = metrics_address.parse().map_err(|e| StartupError::Bind {
            address: metrics_address.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        })?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&bind_address).await.map_err(|source| StartupError::Bind {
        address: bind_address.clone(),
        source,
    })?;
    let local_addr = listener.local_addr().map_err(|source| StartupError::Bind {
        address: bind_address,
        source,
    })?;

    tracing::info!(address = %local_addr, "Listening for connections");

    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));
    Ok(Running { local_addr, handle })
}
