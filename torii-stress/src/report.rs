/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! Per-worker and aggregate run statistics.

use serde::Serialize;

/// Distribution of sampled ack latencies.
#[derive(Debug, Clone, Serialize)]
pub struct LatencyStats {
    pub count: usize,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p90_ms: f64,
    pub p99_ms: f64,
}

impl LatencyStats {
    /// Summarizes latency samples given in seconds; `None` when empty.
    #[must_use]
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = samples.iter().map(|s| s * 1000.0).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mean_ms = sorted.iter().sum::<f64>() / sorted.len() as f64;
        Some(Self {
            count: sorted.len(),
            mean_ms,
            p50_ms: percentile(&sorted, 0.5),
            p90_ms: percentile(&sorted, 0.9),
            p99_ms: percentile(&sorted, 0.99),
        })
    }
}

/// Linear-interpolated quantile over a sorted sample set.
#[must_use]
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    if low == high {
        sorted[low]
    } else {
        let weight = rank - low as f64;
        sorted[low] * (1.0 - weight) + sorted[high] * weight
    }
}

/// Outcome of a single worker session.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStats {
    pub worker_id: usize,
    pub sent: usize,
    pub elapsed_s: f64,
    pub rate_msg_per_s: f64,
    pub first_send_unix_ms: Option<u64>,
    pub last_send_unix_ms: Option<u64>,
    pub latency: Option<LatencyStats>,
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct StressReport {
    pub workers: Vec<WorkerStats>,
    pub total_sent: usize,
    pub elapsed_s: f64,
    pub overall_rate_msg_per_s: f64,
    pub rate_p50: f64,
    pub rate_p90: f64,
    pub rate_p99: f64,
    pub latency: Option<LatencyStats>,
    pub tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 1.0), 4.0);
        assert!((percentile(&sorted, 0.5) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_edges() {
        assert_eq!(percentile(&[], 0.5), 0.0);
        assert_eq!(percentile(&[7.0], 0.99), 7.0);
    }

    #[test]
    fn test_latency_stats() {
        let samples = [0.001, 0.002, 0.003];
        let stats = LatencyStats::from_samples(&samples).unwrap();
        assert_eq!(stats.count, 3);
        assert!((stats.mean_ms - 2.0).abs() < 1e-9);
        assert!((stats.p50_ms - 2.0).abs() < 1e-9);

        assert!(LatencyStats::from_samples(&[]).is_none());
    }
}
