//! Per-route request metrics for an HTTP API: status counters, a sliding
//! latency window with nearest-rank percentiles, and JSON / Prometheus
//! reporting endpoints.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// Central metrics engine — the timing middleware pushes samples, reporting routes read snapshots.
    pub metrics: Arc<metrics::MetricsAggregator>,

    pub config: config::Config,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        Self {
            metrics: Arc::new(metrics::MetricsAggregator::new()),
            config,
        }
    }
}
