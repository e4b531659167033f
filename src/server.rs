use axum::{middleware as axum_mw, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::error::Result;
use crate::handlers;
use crate::metrics::stream;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // ── Metrics ─────────────────────────────────────────────
        .route("/metrics", get(stream::get_metrics))
        .route("/metrics/prom", get(stream::get_prometheus))
        .route("/metrics/stream", get(stream::metrics_stream))
        .fallback(handlers::not_found)
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            timing::record_request,
        ))
        .layer(CorsLayer::permissive())
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
}

/// Bind the configured address and serve until the process exits.
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let addr = state.config.bind_addr;
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
