use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::AppState;

/// Records every completed request into the metrics aggregator and adds
/// two response headers:
///
///   X-Response-Time-Us  — total handler wall time in microseconds
///   Server-Timing       — same value in the standard Server-Timing format
///
/// Routes are keyed by the router's path template when one matched
/// (`/users/:id`), otherwise by the raw request path.
pub async fn record_request(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let start = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = start.elapsed();
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    let status = response.status().as_u16();

    state.metrics.record(method.as_str(), &path, status, elapsed_ms);

    // ── Inject response headers ─────────────────────────────────
    if let Ok(val) = elapsed.as_micros().to_string().parse() {
        response.headers_mut().insert("x-response-time-us", val);
    }

    let server_timing = format!("total;dur={elapsed_ms:.3}");
    if let Ok(val) = server_timing.parse() {
        response.headers_mut().insert("server-timing", val);
    }

    // Skip the long-lived SSE connection
    if !path.ends_with("/stream") {
        tracing::debug!(%method, %path, status, latency_ms = elapsed_ms, "request completed");
    }

    response
}
