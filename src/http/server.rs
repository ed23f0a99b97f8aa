//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the wildcard forwarding route (GET/HEAD only)
//! - Wire up middleware (tracing, request ID)
//! - Serve page assets under `/static/` for the dispatch variants
//! - Bind server to listener and stop on shutdown

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::schema::AssetConfig;
use crate::config::Variant;
use crate::forward::Forwarder;
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub assets: ServeDir,
}

/// HTTP server for one forwarder variant.
pub struct HttpServer {
    router: Router,
    variant: Variant,
}

impl HttpServer {
    /// Create a new HTTP server around `forwarder`.
    pub fn new(forwarder: Forwarder, assets: &AssetConfig) -> Self {
        let variant = forwarder.config().variant();
        let state = AppState {
            forwarder: Arc::new(forwarder),
            assets: ServeDir::new(&assets.static_dir),
        };
        let router = Self::build_router(variant, state);
        Self { router, variant }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(variant: Variant, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/{*path}", get(forward_path))
            .route("/", get(forward_root));

        // Only `/static/<file>` is an asset; bare `/static` is an ordinary path.
        if variant.renders_page() {
            router = router.route("/static/{*file}", get(serve_asset));
        }

        router.with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
        )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            variant = %self.variant,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for driving the server without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }
}

async fn forward_root(State(state): State<AppState>, headers: HeaderMap) -> Response {
    forward(&state, &headers, "").await
}

async fn forward_path(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Response {
    forward(&state, &headers, &path).await
}

async fn serve_asset(State(state): State<AppState>, mut request: Request) -> Response {
    let file = request
        .uri()
        .path()
        .strip_prefix("/static")
        .unwrap_or("/")
        .to_string();
    match file.parse::<Uri>() {
        Ok(uri) => *request.uri_mut() = uri,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    }
    state.assets.oneshot(request).await.into_response()
}

async fn forward(state: &AppState, headers: &HeaderMap, path: &str) -> Response {
    match state.forwarder.handle(path).await {
        Ok(reply) => reply.into_response(),
        Err(e) => {
            tracing::warn!(
                request_id = %request_id(headers),
                path = %path,
                kind = e.kind(),
                error = %e,
                "Upstream call failed"
            );
            e.into_response()
        }
    }
}
