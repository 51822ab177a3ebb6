use std::collections::VecDeque;

/// Rolling window of the most recent samples for display.
///
/// Capacity is `fs * window_seconds`; once full, appends evict from the
/// front so the buffer always holds the newest span of signal.
#[derive(Debug, Clone)]
pub struct WaveBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl WaveBuffer {
    pub fn with_window_seconds(fs: f64, window_seconds: f64) -> Self {
        let capacity = (fs * window_seconds).ceil() as usize;
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn extend(&mut self, samples: &[f64]) {
        for &s in samples {
            self.push(s);
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest-first copy of the window.
    pub fn snapshot(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
