//! Lattice forwarder library.
//!
//! Thin HTTP front ends that relay one upstream GET per request, in one of
//! three variants: a JSON passthrough, or `/backend` + `/lambda` dispatch
//! rendered as an HTML page (with two upstream URLs or one).

pub mod config;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::{UpstreamConfig, Variant};
pub use forward::Forwarder;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
