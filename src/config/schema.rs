//! Configuration schema definitions.
//!
//! Server-level settings that are not part of the upstream contract. All
//! types derive Serde traits for deserialization from an optional TOML file.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Root settings for a forwarder process.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerSettings {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Outbound call settings.
    pub upstream: UpstreamSettings,

    /// Static asset serving for the rendered page.
    pub assets: AssetConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080"). Unset means the variant default.
    pub bind_address: Option<String>,
}

/// Outbound call settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct UpstreamSettings {
    /// Total time allowed for one upstream GET. Unset waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl UpstreamSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("./static"),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
