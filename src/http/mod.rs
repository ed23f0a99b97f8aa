//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, wildcard route, middleware)
//!     → request.rs (request ID)
//!     → forward::Forwarder (resolve + outbound GET)
//!     → response.rs (Reply / ForwardError → response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
