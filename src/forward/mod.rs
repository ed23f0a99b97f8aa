//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! request path
//!     → route.rs (resolve against UpstreamConfig)
//!     → Forwarder::handle (one outbound GET)
//!     → Reply (JSON relay, rendered page, or instructions)
//!     → http/response.rs turns Reply / ForwardError into a response
//! ```
//!
//! # Design Decisions
//! - Stateless per request; the only shared state is immutable config
//!   and the HTTP client
//! - Upstream status codes never change the reply, only the body does
//! - Transport failures are recovered into a fixed message; payload
//!   failures are reported to the client as a bad gateway

pub mod page;
pub mod route;

use std::time::Instant;

use serde::Serialize;
use thiserror::Error;

use crate::config::schema::UpstreamSettings;
use crate::config::UpstreamConfig;
use crate::observability::metrics;

pub use page::Page;
pub use route::{resolve, Dispatch, Route};

/// Body returned for other paths by the dispatch variants.
pub const INSTRUCTIONS: &str = "Please specify /backend /lambda path";

/// Body returned when the outbound call fails at the transport level.
pub const TRANSPORT_FAILURE: &str = "Something went wrong, check Lattice URL";

/// Body returned when the upstream answer cannot be interpreted.
pub const PAYLOAD_FAILURE: &str = "Upstream returned an unexpected payload";

/// JSON document produced by the passthrough variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relayed {
    pub message: String,
    pub code: &'static str,
}

impl Relayed {
    pub fn success(message: String) -> Self {
        Self {
            message,
            code: "SUCCESS",
        }
    }
}

/// Successful outcome of handling one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Json(Relayed),
    Page(Page),
    Instructions,
}

/// Errors that can occur while forwarding a request.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Connect, DNS, I/O, invalid URL or timeout on the outbound call.
    #[error("upstream request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered, but not with a JSON object carrying `message`.
    #[error("upstream {url} returned an unexpected payload: {reason}")]
    Payload { url: String, reason: String },
}

impl ForwardError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::Transport { .. } => "transport_error",
            ForwardError::Payload { .. } => "payload_error",
        }
    }
}

/// Resolves and performs the outbound call for each request.
#[derive(Debug, Clone)]
pub struct Forwarder {
    config: UpstreamConfig,
    client: reqwest::Client,
}

impl Forwarder {
    /// Build a forwarder with its own HTTP client.
    pub fn new(config: UpstreamConfig, settings: &UpstreamSettings) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(config, builder.build()?))
    }

    pub fn with_client(config: UpstreamConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Handle a request for `path` (without its leading slash).
    pub async fn handle(&self, path: &str) -> Result<Reply, ForwardError> {
        let (route, url) = match resolve(&self.config, path) {
            Dispatch::Fetch { route, url } => (route, url),
            Dispatch::Instructions => {
                tracing::debug!(path = %path, "No upstream for path");
                metrics::record_request("none", "instructions");
                return Ok(Reply::Instructions);
            }
        };

        tracing::debug!(route = route.as_str(), upstream = %url, "Forwarding request");

        let result = self.fetch(route, &url).await;
        match &result {
            Ok(_) => metrics::record_request(route.as_str(), "ok"),
            Err(e) => metrics::record_request(route.as_str(), e.kind()),
        }
        result
    }

    async fn fetch(&self, route: Route, url: &str) -> Result<Reply, ForwardError> {
        let body = self.get_text(route, url).await?;

        let reply = match route {
            Route::Passthrough => Reply::Json(Relayed::success(body)),
            Route::Lambda => Reply::Page(Page::for_route(route, body)),
            Route::Backend => {
                let message = extract_message(&body).map_err(|reason| ForwardError::Payload {
                    url: url.to_string(),
                    reason,
                })?;
                Reply::Page(Page::for_route(route, message))
            }
        };
        Ok(reply)
    }

    async fn get_text(&self, route: Route, url: &str) -> Result<String, ForwardError> {
        let start = Instant::now();
        let transport = |source| ForwardError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        metrics::record_upstream_latency(route.as_str(), start);

        if !status.is_success() {
            tracing::debug!(upstream = %url, status = %status, "Upstream returned non-success status");
        }
        Ok(body)
    }
}

/// Pull the `message` field out of a JSON object body.
fn extract_message(body: &str) -> Result<String, String> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| format!("invalid JSON: {e}"))?;

    match value.get("message") {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err("missing `message` field".to_string()),
    }
}
