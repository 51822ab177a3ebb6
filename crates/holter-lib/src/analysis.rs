use crate::alerts::Severity;
use crate::detectors::rpeak::{detect_r_peaks, PeakConfig};
use crate::metrics::intervals::{interval_stats, IntervalStats};
use crate::signal::{IntervalSeries, SampleSeries};
use serde::{Deserialize, Serialize};

/// Rhythm classification labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rhythm {
    #[serde(rename = "Normal Sinus")]
    NormalSinus,
    #[serde(rename = "Sinus Tachycardia")]
    SinusTachycardia,
    #[serde(rename = "Sinus Bradycardia")]
    SinusBradycardia,
    #[serde(rename = "Arrhythmia / Irregular")]
    ArrhythmiaIrregular,
    #[serde(rename = "Noise / Artifact")]
    NoiseArtifact,
    #[serde(rename = "Asystole / No Signal")]
    Asystole,
    #[serde(rename = "Signal Error")]
    SignalError,
}

impl Rhythm {
    pub fn label(&self) -> &'static str {
        match self {
            Rhythm::NormalSinus => "Normal Sinus",
            Rhythm::SinusTachycardia => "Sinus Tachycardia",
            Rhythm::SinusBradycardia => "Sinus Bradycardia",
            Rhythm::ArrhythmiaIrregular => "Arrhythmia / Irregular",
            Rhythm::NoiseArtifact => "Noise / Artifact",
            Rhythm::Asystole => "Asystole / No Signal",
            Rhythm::SignalError => "Signal Error",
        }
    }
}

/// Alert raised together with a classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSpec {
    pub message: String,
    pub severity: Severity,
}

/// Settled outcome of analysing one recording. Computed once per load,
/// cached, and re-applied whenever playback reverts from a transient event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub heart_rate: f64,
    pub rhythm: Rhythm,
    pub risk: u8,
    pub explanation: String,
    pub alert: Option<AlertSpec>,
}

/// Tunable thresholds for the analyzer. Defaults reproduce the historical
/// constants; none of them are clinically derived.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzerConfig {
    /// Below this min→max range the trace counts as isoelectric.
    pub range_floor: f64,
    pub peaks: PeakConfig,
    /// SDNN (ms) above which the irregular-rhythm override fires.
    pub sdnn_override_ms: f64,
    /// Rates above this are treated as artifact, not physiology.
    pub noise_bpm: f64,
    pub tachy_bpm: f64,
    pub brady_bpm: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            range_floor: 0.05,
            peaks: PeakConfig::default(),
            sdnn_override_ms: 100.0,
            noise_bpm: 180.0,
            tachy_bpm: 100.0,
            brady_bpm: 60.0,
        }
    }
}

struct Classified {
    rhythm: Rhythm,
    risk: u8,
    explanation: String,
    alert: Option<&'static str>,
}

struct Rule {
    matches: fn(&IntervalStats, &AnalyzerConfig) -> bool,
    classify: fn(&IntervalStats) -> Classified,
}

/// Ordered decision table. Evaluated top to bottom; every matching rule
/// yields a complete classification and the last match wins. The irregular
/// override sits last so it supersedes the rate tiers but keeps its own
/// bpm guard against the noise branch.
const RULES: [Rule; 5] = [
    Rule {
        matches: |_, _| true,
        classify: |_| Classified {
            rhythm: Rhythm::NormalSinus,
            risk: 15,
            explanation: "Regular R-R intervals. Heart rate within normal range.".into(),
            alert: None,
        },
    },
    Rule {
        matches: |s, cfg| s.bpm > cfg.noise_bpm,
        classify: |_| Classified {
            rhythm: Rhythm::NoiseArtifact,
            risk: 0,
            explanation: "Detected rate > 180 BPM. Likely motion artifact or electrode noise."
                .into(),
            alert: Some("High Noise Level"),
        },
    },
    Rule {
        matches: |s, cfg| s.bpm > cfg.tachy_bpm && s.bpm <= cfg.noise_bpm,
        classify: |s| Classified {
            rhythm: Rhythm::SinusTachycardia,
            risk: 65,
            explanation: format!(
                "Heart rate elevated ({} BPM). R-R intervals consistent but shortened.",
                s.bpm.round() as i64
            ),
            alert: Some("Tachycardia Detected"),
        },
    },
    Rule {
        matches: |s, cfg| s.bpm < cfg.brady_bpm,
        classify: |s| Classified {
            rhythm: Rhythm::SinusBradycardia,
            risk: 45,
            explanation: format!(
                "Heart rate depressed ({} BPM). R-R intervals prolonged.",
                s.bpm.round() as i64
            ),
            alert: Some("Bradycardia Detected"),
        },
    },
    Rule {
        matches: |s, cfg| s.sdnn_ms > cfg.sdnn_override_ms && s.bpm <= cfg.noise_bpm,
        classify: |_| Classified {
            rhythm: Rhythm::ArrhythmiaIrregular,
            risk: 85,
            explanation: "High variability in R-R intervals detected (Possible AFib or Ectopy)."
                .into(),
            alert: Some("Irregular Rhythm"),
        },
    },
];

fn classify(stats: &IntervalStats, cfg: &AnalyzerConfig) -> Classified {
    // the first rule is unconditional, every later match replaces it
    let mut outcome = (RULES[0].classify)(stats);
    for rule in &RULES[1..] {
        if (rule.matches)(stats, cfg) {
            outcome = (rule.classify)(stats);
        }
    }
    outcome
}

fn alert_for(risk: u8, message: &str) -> AlertSpec {
    let severity = if risk > 70 {
        Severity::Critical
    } else {
        Severity::Warning
    };
    AlertSpec {
        message: message.to_string(),
        severity,
    }
}

/// Analyse a full recording. Pure and total: every non-empty finite sample
/// sequence maps to some AnalysisResult; flat and peak-starved traces are
/// classifications, not errors.
pub fn analyze(series: &SampleSeries, cfg: &AnalyzerConfig) -> AnalysisResult {
    let min = series.data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = series
        .data
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);

    // isoelectric line: terminal classification, no peak scan
    if max - min < cfg.range_floor {
        return AnalysisResult {
            heart_rate: 0.0,
            rhythm: Rhythm::Asystole,
            risk: 100,
            explanation: "No cardiac electrical activity detected (Isoelectric line).".into(),
            alert: Some(alert_for(100, "Asystole Warning")),
        };
    }

    let peaks = detect_r_peaks(series, &cfg.peaks);
    if peaks.len() < 2 {
        return AnalysisResult {
            heart_rate: 0.0,
            rhythm: Rhythm::SignalError,
            risk: 0,
            explanation:
                "Unable to detect distinct R-peaks. Signal may be too noisy or disconnected."
                    .into(),
            alert: Some(alert_for(0, "Check Electrodes")),
        };
    }

    let intervals = IntervalSeries::from_peaks(&peaks, series.fs);
    let stats = interval_stats(&intervals);
    let outcome = classify(&stats, cfg);
    log::debug!(
        "classified {} peaks as {} ({:.1} BPM, SDNN {:.1} ms)",
        peaks.len(),
        outcome.rhythm.label(),
        stats.bpm,
        stats.sdnn_ms
    );
    AnalysisResult {
        heart_rate: stats.bpm,
        rhythm: outcome.rhythm,
        risk: outcome.risk,
        explanation: outcome.explanation,
        alert: outcome.alert.map(|msg| alert_for(outcome.risk, msg)),
    }
}
