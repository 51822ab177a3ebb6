pub mod rpeak;

pub use rpeak::{detect_r_peaks, PeakConfig};
