pub mod alerts;
pub mod analysis;
pub mod buffer;
pub mod detectors;
pub mod error;
pub mod events;
pub mod io;
pub mod metrics;
pub mod playback;
pub mod report;
pub mod signal;

pub use alerts::*;
pub use analysis::*;
pub use buffer::*;
pub use error::*;
pub use events::*;
pub use playback::*;
pub use report::*;
pub use signal::*;
