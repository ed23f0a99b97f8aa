//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → env.rs (variant → required URLs)
//!     → UpstreamConfig (immutable)
//!
//! optional settings file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerSettings (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Everything is resolved once at startup and never re-read per request
//! - All settings fields have defaults; upstream URLs have none

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{EnvError, UpstreamConfig, Upstreams, Variant};
pub use loader::{load_settings, ConfigError};
pub use schema::{ListenerConfig, ObservabilityConfig, ServerSettings};
