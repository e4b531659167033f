use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use super::percentiles::PercentileSet;
use super::{route_key, Counters, RouteReport, RouteTable, Snapshot};

// ─── Configuration ───────────────────────────────────────────────

/// Sliding window of most recent latencies kept per route.
pub const RESERVOIR_CAPACITY: usize = 512;

/// Raw samples echoed back in `latenciesSmall`.
pub const RECENT_LATENCIES: usize = 50;

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe per-route metrics engine.
/// The timing middleware calls `record()`, reporting endpoints call `snapshot()`.
///
/// Each route owns its own lock, so concurrent requests on different routes
/// only contend on the map's read lock.
pub struct MetricsAggregator {
    routes: RwLock<RouteMap>,
}

// ─── Internal state ──────────────────────────────────────────────

#[derive(Default)]
struct RouteMap {
    index: HashMap<String, Arc<Mutex<RouteStats>>>,
    // First-seen order, for stable exporter output
    order: Vec<(String, Arc<Mutex<RouteStats>>)>,
}

struct RouteStats {
    method: String,
    path: String,
    counters: Counters,
    reservoir: VecDeque<f64>,
}

// ─── MetricsAggregator impl ──────────────────────────────────────

impl MetricsAggregator {
    pub fn new() -> Self {
        Self {
            routes: RwLock::new(RouteMap::default()),
        }
    }

    /// Record one completed request. Never fails.
    pub fn record(&self, method: &str, path: &str, status: u16, latency_ms: f64) {
        let method = method.to_uppercase();
        let key = route_key(&method, path);
        let route = self.route(key, method, path);
        route.lock().record(status, latency_ms);
    }

    /// Produce a read-only view of every route recorded so far.
    pub fn snapshot(&self) -> Snapshot {
        // Clone the handles so no route lock is taken under the map lock
        let routes: Vec<(String, Arc<Mutex<RouteStats>>)> = self.routes.read().order.clone();

        let entries = routes
            .into_iter()
            .map(|(key, stats)| (key, stats.lock().report()))
            .collect();

        Snapshot {
            generated_at: Utc::now(),
            routes: RouteTable::new(entries),
        }
    }

    /// Look up the route entry, creating it on first sight.
    fn route(&self, key: String, method: String, path: &str) -> Arc<Mutex<RouteStats>> {
        if let Some(stats) = self.routes.read().index.get(&key) {
            return stats.clone();
        }

        let mut map = self.routes.write();
        // Another request may have inserted it between the two locks
        if let Some(stats) = map.index.get(&key) {
            return stats.clone();
        }

        let stats = Arc::new(Mutex::new(RouteStats::new(method, path.to_owned())));
        map.index.insert(key.clone(), stats.clone());
        map.order.push((key, stats.clone()));
        stats
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

// ─── RouteStats impl ─────────────────────────────────────────────

impl RouteStats {
    fn new(method: String, path: String) -> Self {
        Self {
            method,
            path,
            counters: Counters::default(),
            reservoir: VecDeque::with_capacity(RESERVOIR_CAPACITY + 1),
        }
    }

    fn record(&mut self, status: u16, latency_ms: f64) {
        self.counters.observe(status);

        // Non-positive latencies (including -0.0) store as 0.0; NaN passes through
        let latency_ms = if latency_ms <= 0.0 { 0.0 } else { latency_ms };
        self.reservoir.push_back(latency_ms);
        while self.reservoir.len() > RESERVOIR_CAPACITY {
            self.reservoir.pop_front();
        }
    }

    fn report(&self) -> RouteReport {
        let percentiles = PercentileSet::from_samples(&self.reservoir);
        let skip = self.reservoir.len().saturating_sub(RECENT_LATENCIES);

        RouteReport {
            method: self.method.clone(),
            path: self.path.clone(),
            counters: self.counters,
            p50: percentiles.p50,
            p95: percentiles.p95,
            p99: percentiles.p99,
            latencies_small: self.reservoir.iter().skip(skip).copied().collect(),
        }
    }
}
