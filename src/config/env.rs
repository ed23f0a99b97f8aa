//! Upstream URL resolution from the process environment.
//!
//! # Responsibilities
//! - Decide which variables a service variant requires
//! - Read them once, at startup, into an immutable `UpstreamConfig`
//! - Report every missing variable in one structured error
//!
//! # Design Decisions
//! - Resolution is a pure function over a lookup closure; only
//!   `UpstreamConfig::from_env` touches the real environment
//! - Empty values count as missing

use std::fmt;

use clap::ValueEnum;
use thiserror::Error;

/// Single upstream base URL for the backend service and the lattice frontend.
pub const LATTICE_URL: &str = "LATTICEURL";
/// Serverless upstream base URL for the dual-URL frontend.
pub const LAMBDA_URL: &str = "LAMBDAURL";
/// Container-hosted upstream base URL for the dual-URL frontend.
pub const BACKEND_URL: &str = "BACKENDURL";

/// Which routing policy this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Ignore the path and relay the single upstream as JSON.
    Backend,
    /// Dispatch `/backend` and `/lambda` to two separately configured URLs.
    Frontend,
    /// Dispatch `/backend` and `/lambda` to sub-paths of one URL.
    FrontendLattice,
}

impl Variant {
    /// Environment variables this variant cannot start without.
    pub fn required_vars(self) -> &'static [&'static str] {
        match self {
            Variant::Backend | Variant::FrontendLattice => &[LATTICE_URL],
            Variant::Frontend => &[BACKEND_URL, LAMBDA_URL],
        }
    }

    /// Listener address used when neither the CLI nor a config file set one.
    pub fn default_bind_address(self) -> &'static str {
        match self {
            Variant::Backend => "0.0.0.0:8081",
            Variant::Frontend | Variant::FrontendLattice => "0.0.0.0:8080",
        }
    }

    /// Whether the variant renders the HTML page (and so serves its assets).
    pub fn renders_page(self) -> bool {
        !matches!(self, Variant::Backend)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Variant::Backend => "backend",
            Variant::Frontend => "frontend",
            Variant::FrontendLattice => "frontend-lattice",
        };
        f.write_str(name)
    }
}

/// Startup failure: the variant's required variables are not all set.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no upstream URL configured for the {variant} service: {} not set", .missing.join(", "))]
pub struct EnvError {
    pub variant: Variant,
    pub missing: Vec<&'static str>,
}

/// Where each dispatch target lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upstreams {
    /// One URL, fetched verbatim.
    Single { url: String },
    /// Separate bases for the `/backend` and `/lambda` sub-paths.
    Split { backend: String, lambda: String },
}

/// Immutable upstream configuration, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    variant: Variant,
    upstreams: Upstreams,
}

impl UpstreamConfig {
    /// Resolve the variant's upstreams from the process environment.
    pub fn from_env(variant: Variant) -> Result<Self, EnvError> {
        Self::resolve(variant, |key| std::env::var(key).ok())
    }

    /// Resolve the variant's upstreams through `lookup`.
    pub fn resolve<F>(variant: Variant, lookup: F) -> Result<Self, EnvError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut values = Vec::with_capacity(2);

        for &key in variant.required_vars() {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(value) => values.push(value),
                None => missing.push(key),
            }
        }

        if !missing.is_empty() {
            return Err(EnvError { variant, missing });
        }

        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or_default();
        let upstreams = match variant {
            Variant::Backend | Variant::FrontendLattice => Upstreams::Single { url: next() },
            Variant::Frontend => {
                let backend = next();
                let lambda = next();
                Upstreams::Split { backend, lambda }
            }
        };

        Ok(Self { variant, upstreams })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn upstreams(&self) -> &Upstreams {
        &self.upstreams
    }

    /// Base URL the `/backend` sub-path is appended to.
    pub fn backend_base(&self) -> &str {
        match &self.upstreams {
            Upstreams::Single { url } => url,
            Upstreams::Split { backend, .. } => backend,
        }
    }

    /// Base URL the `/lambda` sub-path is appended to.
    pub fn lambda_base(&self) -> &str {
        match &self.upstreams {
            Upstreams::Single { url } => url,
            Upstreams::Split { lambda, .. } => lambda,
        }
    }
}
