use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HolterError {
    #[error("invalid source: {0} is not tagged as an MIT or PhysioNet export")]
    InvalidSource(PathBuf),
    #[error("no numeric samples found in recording")]
    EmptyRecording,
    #[error("playback requested with no recording loaded")]
    PlaybackWithoutData,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HolterError {
    /// Alert text shown to the operator when the error surfaces at the UI edge.
    pub fn alert_message(&self) -> &'static str {
        match self {
            HolterError::InvalidSource(_) => "Invalid Source: Upload MIT or PhysioNet CSV",
            HolterError::EmptyRecording => "No Samples in File",
            HolterError::PlaybackWithoutData => "Upload CSV Required",
            HolterError::Read { .. } => "Unable to Read File",
        }
    }
}
