use crate::error::HolterError;
use crate::signal::SampleSeries;
use std::path::Path;

/// File name tags accepted as recording provenance (case-insensitive).
const SOURCE_TAGS: [&str; 2] = ["mit", "physionet"];

/// Check that a file name carries one of the accepted provenance tags.
///
/// Rejected files must not mutate any monitor state; callers surface the
/// error as a critical alert.
pub fn check_provenance(path: &Path) -> Result<(), HolterError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if SOURCE_TAGS.iter().any(|tag| name.contains(tag)) {
        Ok(())
    } else {
        Err(HolterError::InvalidSource(path.to_path_buf()))
    }
}

/// Parse newline-delimited CSV-ish text into voltage samples.
///
/// Only the field before the first comma is read; lines that do not parse as
/// a finite float are dropped silently rather than treated as errors.
pub fn parse_sample_series(text: &str) -> Result<Vec<f64>, HolterError> {
    let mut out = Vec::new();
    for line in text.lines() {
        let field = line.split(',').next().unwrap_or("").trim();
        if let Ok(val) = field.parse::<f64>() {
            if val.is_finite() {
                out.push(val);
            }
        }
    }
    if out.is_empty() {
        return Err(HolterError::EmptyRecording);
    }
    Ok(out)
}

/// Load a recording from disk: provenance check, then parse.
pub fn load_recording(path: &Path, fs: f64) -> Result<SampleSeries, HolterError> {
    check_provenance(path)?;
    let text = std::fs::read_to_string(path).map_err(|source| HolterError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let data = parse_sample_series(&text)?;
    log::info!("loaded {} samples from {}", data.len(), path.display());
    Ok(SampleSeries { fs, data })
}
