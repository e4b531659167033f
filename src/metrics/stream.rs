use axum::{
    extract::State,
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use super::prometheus::{self, render_prometheus_text};
use super::Snapshot;
use crate::handlers::ApiResponse;
use crate::AppState;

// ─── GET /metrics ────────────────────────────────────────────────
/// Returns a single JSON snapshot wrapped in the API envelope.

pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Snapshot>> {
    Json(ApiResponse::ok(state.metrics.snapshot()))
}

// ─── GET /metrics/prom ───────────────────────────────────────────
/// Prometheus scrape target.

pub async fn get_prometheus(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = render_prometheus_text(&state.metrics.snapshot());
    ([(header::CONTENT_TYPE, prometheus::CONTENT_TYPE)], body)
}

// ─── GET /metrics/stream ─────────────────────────────────────────
/// Server-Sent Events endpoint.
/// Pushes a full `Snapshot` as JSON on every `stream_interval` tick.

pub async fn metrics_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let interval = tokio::time::interval(state.config.stream_interval);
    tracing::debug!(interval_ms = state.config.stream_interval.as_millis() as u64, "metrics stream opened");

    let stream = IntervalStream::new(interval).map(move |_| {
        let snapshot = state.metrics.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap_or_default();
        Ok(Event::default().data(json))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
