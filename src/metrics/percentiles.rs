use serde::Serialize;

/// p50 / p95 / p99 for one route, recomputed from the reservoir on every
/// snapshot. `None` means the route has no samples yet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PercentileSet {
    pub p50: Option<f64>,
    pub p95: Option<f64>,
    pub p99: Option<f64>,
}

impl PercentileSet {
    /// Sort once, then read all three ranks from the same ordering.
    pub fn from_samples<'a, I>(samples: I) -> Self
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let sorted = sorted_copy(samples);
        Self {
            p50: nearest_rank(&sorted, 50.0),
            p95: nearest_rank(&sorted, 95.0),
            p99: nearest_rank(&sorted, 99.0),
        }
    }
}

/// Nearest-rank percentile: `sorted[floor(p/100 * n)]`, index clamped to
/// `[0, n-1]`. No interpolation between ranks.
///
/// Returns `None` for an empty input. NaN sorts after every other value.
pub fn percentile(samples: &[f64], p: f64) -> Option<f64> {
    nearest_rank(&sorted_copy(samples), p)
}

fn sorted_copy<'a, I>(samples: I) -> Vec<f64>
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut sorted: Vec<f64> = samples.into_iter().copied().collect();
    // stable, and total over NaN
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn nearest_rank(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = ((p / 100.0) * sorted.len() as f64).floor();
    // `as usize` saturates: negative and NaN ranks land on 0
    let idx = (rank as usize).min(last);
    Some(sorted[idx])
}
