use crate::signal::{Peaks, SampleSeries};

/// Configurable parameters for the amplitude-threshold R-peak detector.
///
/// The defaults reproduce the monitor's historical behaviour exactly; they
/// are tunables, not physiological law.
#[derive(Debug, Clone, Copy)]
pub struct PeakConfig {
    /// Fraction of the min→max range added to min to form the peak threshold.
    pub threshold_fraction: f64,
    /// Half-width (samples) of the symmetric local-maximum window.
    pub half_width: usize,
    /// Minimum separation between accepted peaks (samples).
    pub refractory_samples: usize,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            threshold_fraction: 0.75,
            half_width: 10,
            refractory_samples: 40,
        }
    }
}

/// Detect R-peaks by amplitude threshold plus strict local-maximum test.
///
/// A sample qualifies when it exceeds `min + threshold_fraction * range` and
/// no neighbour within `half_width` samples is greater than or equal to it
/// (ties disqualify). Accepted peaks are separated by more than
/// `refractory_samples` indices; candidates inside the refractory distance of
/// the last accepted peak are discarded even when locally maximal.
pub fn detect_r_peaks(series: &SampleSeries, cfg: &PeakConfig) -> Peaks {
    let data = &series.data;
    let w = cfg.half_width;
    if data.len() < 2 * w + 1 {
        return Peaks::from_indices(Vec::new());
    }

    let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let threshold = min + cfg.threshold_fraction * (max - min);

    let mut peaks: Vec<usize> = Vec::new();
    let mut last_peak: Option<usize> = None;
    for i in w..data.len() - w {
        if data[i] <= threshold {
            continue;
        }
        let is_max = (1..=w).all(|j| data[i] > data[i - j] && data[i] > data[i + j]);
        if !is_max {
            continue;
        }
        let refractory_ok = match last_peak {
            Some(last) => i - last > cfg.refractory_samples,
            None => true,
        };
        if refractory_ok {
            peaks.push(i);
            last_peak = Some(i);
        }
    }
    Peaks::from_indices(peaks)
}
