//! Path-based target resolution.
//!
//! # Responsibilities
//! - Map a request path to an upstream target for the running variant
//! - Build target URLs by appending the sub-path to the configured base
//!
//! # Design Decisions
//! - Pure function of (config, path); no I/O, trivially testable
//! - Exact, case-sensitive match on `backend` / `lambda`
//! - Passthrough ignores the path entirely

use crate::config::{UpstreamConfig, Variant};

/// Sub-path served by the container-hosted upstream.
pub const BACKEND_PATH: &str = "backend";
/// Sub-path served by the serverless upstream.
pub const LAMBDA_PATH: &str = "lambda";

/// Which upstream a request is bound for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Passthrough,
    Backend,
    Lambda,
}

impl Route {
    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Route::Passthrough => "passthrough",
            Route::Backend => "backend",
            Route::Lambda => "lambda",
        }
    }
}

/// Outcome of resolving a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Issue a GET to `url`.
    Fetch { route: Route, url: String },
    /// No upstream matches; answer with usage instructions.
    Instructions,
}

/// Resolve `path` (without its leading slash) against `config`.
pub fn resolve(config: &UpstreamConfig, path: &str) -> Dispatch {
    if config.variant() == Variant::Backend {
        return Dispatch::Fetch {
            route: Route::Passthrough,
            url: config.backend_base().to_string(),
        };
    }

    match path {
        BACKEND_PATH => Dispatch::Fetch {
            route: Route::Backend,
            url: join(config.backend_base(), BACKEND_PATH),
        },
        LAMBDA_PATH => Dispatch::Fetch {
            route: Route::Lambda,
            url: join(config.lambda_base(), LAMBDA_PATH),
        },
        _ => Dispatch::Instructions,
    }
}

fn join(base: &str, suffix: &str) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    format!("{base}/{suffix}")
}
