//! Startup orchestration.
//!
//! # Responsibilities
//! - Pick the listener address (CLI > settings file > variant default)
//! - Build the forwarder and start optional background services
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Takes an already-resolved `UpstreamConfig`; the entry point decides
//!   what to do when resolution fails
//! - Subsystems initialize in order, listener last

use std::net::SocketAddr;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ServerSettings, UpstreamConfig, Upstreams};
use crate::forward::Forwarder;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Process-level options that sit beside the upstream configuration.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// Listener address from the command line, overriding everything else.
    pub bind: Option<SocketAddr>,
    pub settings: ServerSettings,
}

/// Errors that abort startup or end the serve loop.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid bind address `{0}`")]
    BindAddress(String),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Resolve the listener address for `upstreams`' variant.
pub fn bind_address(
    upstreams: &UpstreamConfig,
    options: &StartupOptions,
) -> Result<SocketAddr, StartupError> {
    if let Some(addr) = options.bind {
        return Ok(addr);
    }
    let raw = options
        .settings
        .listener
        .bind_address
        .as_deref()
        .unwrap_or_else(|| upstreams.variant().default_bind_address());
    raw.parse()
        .map_err(|_| StartupError::BindAddress(raw.to_string()))
}

/// Start serving `upstreams` and block until `shutdown` fires.
pub async fn start(
    upstreams: UpstreamConfig,
    options: StartupOptions,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    match upstreams.upstreams() {
        Upstreams::Single { url } => {
            tracing::info!(variant = %upstreams.variant(), upstream = %url, "Upstream configured");
        }
        Upstreams::Split { backend, lambda } => {
            tracing::info!(
                variant = %upstreams.variant(),
                backend = %backend,
                lambda = %lambda,
                "Upstreams configured"
            );
        }
    }

    let addr = bind_address(&upstreams, &options)?;
    let settings = options.settings;

    tracing::info!(
        bind_address = %addr,
        upstream_timeout_secs = ?settings.upstream.timeout_secs,
        "Configuration loaded"
    );

    let forwarder = Forwarder::new(upstreams, &settings.upstream)?;

    let obs = &settings.observability;
    if obs.metrics_enabled {
        let metrics_addr: SocketAddr = obs
            .metrics_address
            .parse()
            .map_err(|_| StartupError::BindAddress(obs.metrics_address.clone()))?;
        metrics::init_metrics(metrics_addr)?;
    }

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    HttpServer::new(forwarder, &settings.assets)
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
