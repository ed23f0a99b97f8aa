//! Lattice forwarder.
//!
//! ```text
//!   Client ──▶ wildcard route ──▶ Forwarder ──GET──▶ Upstream
//!                                  │                   │
//!   Client ◀── JSON / HTML / text ◀┴───── body ◀───────┘
//! ```
//!
//! Upstream URLs come from `LATTICEURL`, or `BACKENDURL` + `LAMBDAURL`,
//! depending on `--variant`. A missing URL aborts before the listener binds.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use lattice_forwarder::config::{load_settings, ObservabilityConfig, ServerSettings};
use lattice_forwarder::lifecycle::{signals, start, StartupOptions};
use lattice_forwarder::observability::logging::init_logging;
use lattice_forwarder::{Shutdown, UpstreamConfig, Variant};

#[derive(Parser, Debug)]
#[command(name = "lattice-forwarder", version)]
#[command(about = "Forward requests to an EKS backend or Lambda upstream", long_about = None)]
struct Cli {
    /// Which routing policy to run.
    #[arg(long, value_enum, env = "FORWARDER_VARIANT", default_value_t = Variant::Frontend)]
    variant: Variant,

    /// Optional TOML settings file.
    #[arg(short, long, env = "FORWARDER_CONFIG")]
    config: Option<PathBuf>,

    /// Listener address, overriding the settings file and variant default.
    #[arg(short, long, env = "FORWARDER_BIND")]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => load_settings(path),
        None => Ok(ServerSettings::default()),
    };
    let observability = settings
        .as_ref()
        .map(|s| s.observability.clone())
        .unwrap_or_else(|_| ObservabilityConfig::default());
    init_logging(&observability);

    let settings = settings.inspect_err(|e| {
        tracing::error!(error = %e, "Failed to load settings");
    })?;

    tracing::info!(variant = %cli.variant, "lattice-forwarder v{} starting", env!("CARGO_PKG_VERSION"));

    let upstreams = UpstreamConfig::from_env(cli.variant).inspect_err(|e| {
        tracing::error!(error = %e, "Refusing to start");
    })?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let options = StartupOptions {
        bind: cli.bind,
        settings,
    };
    start(upstreams, options, &shutdown).await.inspect_err(|e| {
        tracing::error!(error = %e, "Forwarder stopped with an error");
    })?;

    tracing::info!("Shutdown complete");
    Ok(())
}
