use serde::{Deserialize, Serialize};

/// Reference dataset / inference profile the monitor reports against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelId {
    MitBih,
    Ptb,
    Physionet,
}

impl Default for ModelId {
    fn default() -> Self {
        ModelId::MitBih
    }
}

impl ModelId {
    pub fn name(&self) -> &'static str {
        match self {
            ModelId::MitBih => "MIT-BIH",
            ModelId::Ptb => "PTB-XL",
            ModelId::Physionet => "PhysioNet",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModelId::MitBih => {
                "MIT-BIH Arrhythmia Database: 48 half-hour excerpts of 2-channel ambulatory ECG."
            }
            ModelId::Ptb => {
                "PTB Diagnostic Database: myocardial infarction detection, 549 records."
            }
            ModelId::Physionet => {
                "PhysioNet Challenge 2017: AFib detection from single-lead short recordings."
            }
        }
    }
}

/// Point-in-time vitals snapshot handed to the report generator.
///
/// Assembled in one place between ticks so the fields are always mutually
/// consistent; formatting is the consumer's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub heart_rate: f64,
    pub risk: u8,
    pub rhythm: String,
    pub confidence: f64,
    pub explanation: String,
    pub model_id: ModelId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_id_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ModelId::MitBih).unwrap(),
            "\"mit-bih\""
        );
        assert_eq!(
            serde_json::to_string(&ModelId::Physionet).unwrap(),
            "\"physionet\""
        );
    }
}
