//! HTTP surface of the analysis service.

pub mod error;
pub mod handlers;

use crate::pipeline::Pipeline;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state accessible by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    /// Upper bound for one analysis.
    pub request_timeout: Duration,
}

/// Router-level settings.
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Allowed origins; empty means any origin.
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

/// Build the router with all routes and middleware.
pub fn build_router(state: AppState, options: &RouterOptions) -> Router {
    let cors = if options.cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = options
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/analyze", post(handlers::analyze))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl+C.
pub async fn serve(bind: &str, router: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}
