use crate::signal::IntervalSeries;
use serde::{Deserialize, Serialize};

/// Time-domain summary of an R-R interval series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntervalStats {
    pub n: usize,
    /// Mean R-R interval (ms)
    pub mean_ms: f64,
    /// Heart rate derived from the mean interval (BPM)
    pub bpm: f64,
    /// Standard deviation of R-R intervals (ms), population variance
    pub sdnn_ms: f64,
}

pub fn interval_stats(intervals: &IntervalSeries) -> IntervalStats {
    let n = intervals.ms.len();
    if n == 0 {
        return IntervalStats {
            n: 0,
            mean_ms: 0.0,
            bpm: 0.0,
            sdnn_ms: 0.0,
        };
    }
    let mean_ms = intervals.ms.iter().sum::<f64>() / n as f64;
    let bpm = if mean_ms > 0.0 { 60_000.0 / mean_ms } else { 0.0 };
    let variance = intervals
        .ms
        .iter()
        .map(|x| (x - mean_ms).powi(2))
        .sum::<f64>()
        / n as f64;
    IntervalStats {
        n,
        mean_ms,
        bpm,
        sdnn_ms: variance.sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_750ms_intervals_give_80_bpm() {
        let intervals = IntervalSeries {
            ms: vec![750.0; 8],
        };
        let stats = interval_stats(&intervals);
        assert!((stats.bpm - 80.0).abs() < 1e-9);
        assert!(stats.sdnn_ms.abs() < 1e-9);
    }

    #[test]
    fn sdnn_uses_population_variance() {
        let intervals = IntervalSeries {
            ms: vec![100.0, 900.0, 100.0, 900.0],
        };
        let stats = interval_stats(&intervals);
        assert!((stats.mean_ms - 500.0).abs() < 1e-9);
        // population sd of {100,900,100,900} around 500 is exactly 400
        assert!((stats.sdnn_ms - 400.0).abs() < 1e-9);
    }

    #[test]
    fn empty_series_is_all_zero() {
        let stats = interval_stats(&IntervalSeries { ms: Vec::new() });
        assert_eq!(stats.n, 0);
        assert_eq!(stats.bpm, 0.0);
    }
}
