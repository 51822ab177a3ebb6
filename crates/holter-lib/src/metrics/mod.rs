pub mod intervals;

pub use intervals::{interval_stats, IntervalStats};
