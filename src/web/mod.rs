mod error;
mod routes;

pub use error::{ApiError, ErrorBody};
pub use routes::{LoginRequest, LoginResponse};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::AdminCredential;
use crate::config::Config;
use crate::store::BlogStore;

/// Path prefix of every blog resource endpoint.
pub const API_PREFIX: &str = "/api/blog";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub credential: Arc<AdminCredential>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn BlogStore>, credential: AdminCredential) -> Self {
        Self {
            store,
            credential: Arc::new(credential),
        }
    }
}

/// Bind the configured address and serve until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn serve(
    config: &Config,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.web_host, config.web_port)
        .parse()
        .context("Invalid web server address")?;

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind web server")?;

    serve_listener(listener, state, shutdown).await
}

/// Serve on an already-bound listener until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if serving fails.
pub async fn serve_listener(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!(addr = %addr, backend = state.store.backend(), "Starting HTTP web server");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Web server error")?;

    Ok(())
}

/// Create the main application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .nest(API_PREFIX, routes::router())
        .route("/healthz", get(routes::health))
        .fallback(routes::not_found)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
