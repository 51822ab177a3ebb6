use serde::{Deserialize, Serialize};

/// Single-lead voltage series at a uniform sample rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSeries {
    /// Uniform sampling frequency in Hz
    pub fs: f64,
    /// Samples (unitless voltage readings)
    pub data: Vec<f64>,
}

impl SampleSeries {
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn duration(&self) -> f64 {
        self.data.len() as f64 / self.fs
    }
}

/// R-peak positions as indices into a SampleSeries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peaks {
    pub indices: Vec<usize>,
}

impl Peaks {
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// R-R intervals (milliseconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalSeries {
    pub ms: Vec<f64>,
}

impl IntervalSeries {
    pub fn from_peaks(peaks: &Peaks, fs: f64) -> Self {
        let mut ms = Vec::new();
        for w in peaks.indices.windows(2) {
            let dt = (w[1] as f64 - w[0] as f64) / fs * 1000.0;
            ms.push(dt);
        }
        Self { ms }
    }
}
