pub mod collector;
pub mod percentiles;
pub mod prometheus;
pub mod stream;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub use collector::MetricsAggregator;

/// Builds the `"METHOD path"` key a route is tracked under.
/// The method is expected upper-cased already; the path is used verbatim.
pub fn route_key(method: &str, path: &str) -> String {
    format!("{method} {path}")
}

/// Per-route status counters.
///
/// `total == s2xx + s3xx + s4xx + s5xx` for every status in `[200, 600)`.
/// `s429` is a subset of `s4xx`, never an extra bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub total: u64,
    pub s2xx: u64,
    pub s3xx: u64,
    pub s4xx: u64,
    pub s5xx: u64,
    pub s429: u64,
}

impl Counters {
    /// Count one response. Statuses outside `[200, 600)` only bump `total`.
    pub fn observe(&mut self, status: u16) {
        self.total += 1;
        match status {
            200..=299 => self.s2xx += 1,
            300..=399 => self.s3xx += 1,
            429 => {
                self.s4xx += 1;
                self.s429 += 1;
            }
            400..=499 => self.s4xx += 1,
            500..=599 => self.s5xx += 1,
            _ => {}
        }
    }
}

/// Everything reported for one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteReport {
    pub method: String,
    pub path: String,
    pub counters: Counters,
    pub p50: Option<f64>,
    pub p95: Option<f64>,
    pub p99: Option<f64>,
    /// Last (up to) 50 raw samples, oldest first.
    pub latencies_small: Vec<f64>,
}

/// Route key → report, kept in first-seen order.
/// Serialises as a JSON object without re-sorting the keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteTable(Vec<(String, RouteReport)>);

impl RouteTable {
    pub fn new(entries: Vec<(String, RouteReport)>) -> Self {
        Self(entries)
    }

    /// Convenience lookup by route key. Linear scan; tables are small and
    /// callers that need every route should use `iter`.
    pub fn get(&self, key: &str) -> Option<&RouteReport> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RouteReport)> {
        self.0.iter().map(|(k, r)| (k, r))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for RouteTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, report) in &self.0 {
            map.serialize_entry(key, report)?;
        }
        map.end()
    }
}

/// Point-in-time view returned by `GET /metrics`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub generated_at: DateTime<Utc>,
    pub routes: RouteTable,
}
