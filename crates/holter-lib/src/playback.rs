use crate::alerts::{Alert, AlertManager, Severity};
use crate::analysis::AnalysisResult;
use crate::buffer::WaveBuffer;
use crate::error::HolterError;
use crate::events::EventSource;
use crate::report::{ModelId, ReportSnapshot};
use crate::signal::SampleSeries;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Tunables for the playback loop. Defaults keep 60 Hz hosts at roughly
/// real-time cardiac speed: 4 samples/tick * 60 ticks/s ~ 200 Hz.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackConfig {
    pub fs: f64,
    pub window_seconds: f64,
    /// Samples consumed per tick.
    pub samples_per_tick: usize,
    /// Cosmetic heart-rate jitter cadence (consumed samples).
    pub jitter_every: usize,
    /// Event source poll cadence (consumed samples).
    pub inject_every: usize,
    /// How long an injected event overrides the settled vitals.
    pub override_dwell: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fs: 200.0,
            window_seconds: 3.0,
            samples_per_tick: 4,
            jitter_every: 20,
            inject_every: 300,
            override_dwell: Duration::from_millis(4000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Playing,
    Paused,
    Completed,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick arrived while not playing; state untouched. This is the guard
    /// that keeps stale host callbacks from resurrecting progress.
    NotPlaying,
    Advanced {
        consumed: usize,
    },
    Completed,
}

/// Vitals as currently displayed. Transient events mutate this view only;
/// the cached AnalysisResult stays untouched.
#[derive(Debug, Clone)]
pub struct Vitals {
    pub heart_rate: f64,
    pub rhythm_label: String,
    pub risk: u8,
    pub explanation: String,
    pub confidence: f64,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            heart_rate: 0.0,
            rhythm_label: "System Paused".into(),
            risk: 0,
            explanation: "System in standby. Please upload ECG data to begin.".into(),
            confidence: 0.0,
        }
    }
}

fn settled_vitals(analysis: &AnalysisResult, confidence: f64) -> Vitals {
    Vitals {
        heart_rate: analysis.heart_rate,
        rhythm_label: analysis.rhythm.label().into(),
        risk: analysis.risk,
        explanation: analysis.explanation.clone(),
        confidence,
    }
}

/// Drives consumption of a loaded recording at a fixed virtual rate.
///
/// The host calls `tick` at its own cadence; each tick advances a fixed
/// number of samples of virtual time no matter how much wall time elapsed.
/// Single-threaded by construction: the owner is the only writer.
pub struct PlaybackScheduler {
    cfg: PlaybackConfig,
    series: Option<SampleSeries>,
    analysis: Option<AnalysisResult>,
    window: WaveBuffer,
    alerts: AlertManager,
    source: Box<dyn EventSource>,
    rng: StdRng,
    phase: PlaybackPhase,
    cursor: usize,
    progress: f64,
    vitals: Vitals,
    override_until: Option<Instant>,
    model: ModelId,
}

impl PlaybackScheduler {
    pub fn new(cfg: PlaybackConfig, source: Box<dyn EventSource>, seed: u64) -> Self {
        let window = WaveBuffer::with_window_seconds(cfg.fs, cfg.window_seconds);
        Self {
            cfg,
            series: None,
            analysis: None,
            window,
            alerts: AlertManager::default(),
            source,
            rng: StdRng::seed_from_u64(seed),
            phase: PlaybackPhase::Idle,
            cursor: 0,
            progress: 0.0,
            vitals: Vitals::default(),
            override_until: None,
            model: ModelId::default(),
        }
    }

    pub fn set_model(&mut self, model: ModelId) {
        self.model = model;
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    pub fn window(&self) -> &WaveBuffer {
        &self.window
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    /// Live alerts, oldest first.
    pub fn alerts(&mut self, now: Instant) -> &[Alert] {
        self.alerts.active(now)
    }

    /// Raise an operator-facing alert outside the analysis path (upload
    /// rejection, playback precondition failures).
    pub fn trigger_alert(&mut self, message: &str, severity: Severity, now: Instant) {
        self.alerts.trigger(message, severity, now);
    }

    /// Install a freshly analysed recording and start playing it.
    pub fn load(&mut self, series: SampleSeries, analysis: AnalysisResult, now: Instant) {
        self.window.clear();
        self.cursor = 0;
        self.progress = 0.0;
        self.override_until = None;
        self.vitals = settled_vitals(&analysis, 99.5);
        if let Some(alert) = &analysis.alert {
            self.alerts.trigger(&alert.message, alert.severity, now);
        }
        log::info!(
            "recording loaded: {} samples, settled rhythm {}",
            series.len(),
            analysis.rhythm.label()
        );
        self.series = Some(series);
        self.analysis = Some(analysis);
        self.phase = PlaybackPhase::Playing;
    }

    /// Start or resume playback. From Completed this is the replay path.
    pub fn play(&mut self, now: Instant) -> Result<(), HolterError> {
        if self.series.is_none() {
            return Err(HolterError::PlaybackWithoutData);
        }
        match self.phase {
            PlaybackPhase::Completed => self.replay(now)?,
            _ => self.phase = PlaybackPhase::Playing,
        }
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.phase == PlaybackPhase::Playing {
            self.phase = PlaybackPhase::Paused;
        }
    }

    /// Explicit restart: cursor to 0, window cleared, settled vitals back.
    pub fn replay(&mut self, _now: Instant) -> Result<(), HolterError> {
        let analysis = self
            .analysis
            .as_ref()
            .ok_or(HolterError::PlaybackWithoutData)?;
        self.vitals = settled_vitals(analysis, 99.5);
        self.cursor = 0;
        self.progress = 0.0;
        self.window.clear();
        self.override_until = None;
        self.phase = PlaybackPhase::Playing;
        Ok(())
    }

    /// Advance one scheduling quantum of virtual time.
    ///
    /// Order within a tick is fixed: completion check, sample consumption,
    /// jitter, event injection, override revert.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.phase != PlaybackPhase::Playing {
            return TickOutcome::NotPlaying;
        }
        let (len, batch) = match &self.series {
            Some(series) => {
                let end = (self.cursor + self.cfg.samples_per_tick).min(series.len());
                (series.len(), series.data[self.cursor..end].to_vec())
            }
            None => return TickOutcome::NotPlaying,
        };

        if self.cursor >= len {
            self.complete(now);
            return TickOutcome::Completed;
        }

        let consumed = batch.len();
        self.window.extend(&batch);
        self.cursor += consumed;
        self.progress = (self.cursor as f64 / len as f64 * 100.0).min(100.0);

        if self.cursor % self.cfg.jitter_every == 0 {
            if let Some(analysis) = &self.analysis {
                if analysis.heart_rate > 0.0 {
                    self.vitals.heart_rate =
                        analysis.heart_rate + self.rng.gen_range(-1.0..1.0);
                }
            }
        }

        if self.cursor % self.cfg.inject_every == 0 {
            if let Some(event) = self.source.poll() {
                log::debug!("transient event injected: {}", event.label);
                self.vitals.rhythm_label = event.label;
                self.vitals.risk = event.risk;
                self.vitals.explanation = event.explanation;
                if let Some((message, severity)) = event.alert {
                    self.alerts.trigger(&message, severity, now);
                }
                self.override_until = Some(now + self.cfg.override_dwell);
            }
        }

        if let Some(deadline) = self.override_until {
            if now >= deadline {
                if let Some(analysis) = &self.analysis {
                    let confidence = self.vitals.confidence;
                    self.vitals = settled_vitals(analysis, confidence);
                }
                self.override_until = None;
            }
        }

        TickOutcome::Advanced { consumed }
    }

    fn complete(&mut self, now: Instant) {
        self.phase = PlaybackPhase::Completed;
        self.progress = 100.0;
        self.override_until = None;
        if let Some(analysis) = &self.analysis {
            let mut vitals = settled_vitals(analysis, 100.0);
            vitals.rhythm_label = "Analysis Complete".into();
            vitals.explanation = format!(
                "File processing complete. Final Classification: {}. {}",
                analysis.rhythm.label(),
                analysis.explanation
            );
            self.vitals = vitals;
        }
        self.alerts.trigger("Signal Stream Ended", Severity::Info, now);
        log::info!("playback complete");
    }

    /// Consistent point-in-time view for report generation.
    pub fn snapshot(&self) -> ReportSnapshot {
        ReportSnapshot {
            heart_rate: self.vitals.heart_rate,
            risk: self.vitals.risk,
            rhythm: self.vitals.rhythm_label.clone(),
            confidence: self.vitals.confidence,
            explanation: self.vitals.explanation.clone(),
            model_id: self.model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Rhythm;
    use crate::events::{InjectedEvent, NullSource, ScriptedSource};

    fn normal_analysis() -> AnalysisResult {
        AnalysisResult {
            heart_rate: 80.0,
            rhythm: Rhythm::NormalSinus,
            risk: 15,
            explanation: "Regular R-R intervals. Heart rate within normal range.".into(),
            alert: None,
        }
    }

    fn series(len: usize) -> SampleSeries {
        SampleSeries {
            fs: 200.0,
            data: (0..len).map(|i| (i as f64 * 0.1).sin()).collect(),
        }
    }

    fn scheduler() -> PlaybackScheduler {
        PlaybackScheduler::new(PlaybackConfig::default(), Box::new(NullSource), 1)
    }

    #[test]
    fn play_without_data_is_an_error_and_mutates_nothing() {
        let mut sched = scheduler();
        let err = sched.play(Instant::now()).unwrap_err();
        assert!(matches!(err, HolterError::PlaybackWithoutData));
        assert_eq!(sched.phase(), PlaybackPhase::Idle);
        assert_eq!(sched.cursor(), 0);
    }

    #[test]
    fn load_applies_settled_vitals_and_starts_playing() {
        let mut sched = scheduler();
        sched.load(series(100), normal_analysis(), Instant::now());
        assert_eq!(sched.phase(), PlaybackPhase::Playing);
        assert_eq!(sched.vitals().rhythm_label, "Normal Sinus");
        assert_eq!(sched.vitals().confidence, 99.5);
        assert_eq!(sched.vitals().risk, 15);
    }

    #[test]
    fn ticks_consume_fixed_batches() {
        let mut sched = scheduler();
        let now = Instant::now();
        sched.load(series(100), normal_analysis(), now);
        let outcome = sched.tick(now);
        assert_eq!(outcome, TickOutcome::Advanced { consumed: 4 });
        assert_eq!(sched.cursor(), 4);
        assert!((sched.progress() - 4.0).abs() < 1e-9);
        assert_eq!(sched.window().len(), 4);
    }

    #[test]
    fn paused_tick_is_a_no_op() {
        let mut sched = scheduler();
        let now = Instant::now();
        sched.load(series(100), normal_analysis(), now);
        sched.pause();
        assert_eq!(sched.tick(now), TickOutcome::NotPlaying);
        assert_eq!(sched.cursor(), 0);
        assert!(sched.window().is_empty());
    }

    #[test]
    fn completes_exactly_once_and_consumes_nothing_further() {
        let mut sched = scheduler();
        let now = Instant::now();
        sched.load(series(8), normal_analysis(), now);
        sched.tick(now);
        sched.tick(now);
        assert_eq!(sched.cursor(), 8);
        assert!((sched.progress() - 100.0).abs() < 1e-9);
        assert_eq!(sched.phase(), PlaybackPhase::Playing);

        // completion fires on the next tick, before any consumption
        assert_eq!(sched.tick(now), TickOutcome::Completed);
        assert_eq!(sched.phase(), PlaybackPhase::Completed);
        assert_eq!(sched.progress(), 100.0);
        assert_eq!(sched.vitals().rhythm_label, "Analysis Complete");
        assert_eq!(sched.vitals().confidence, 100.0);
        assert!(sched
            .vitals()
            .explanation
            .starts_with("File processing complete."));

        // stale callbacks after completion do not move the cursor
        assert_eq!(sched.tick(now), TickOutcome::NotPlaying);
        assert_eq!(sched.cursor(), 8);
    }

    #[test]
    fn replay_resets_cursor_progress_and_window() {
        let mut sched = scheduler();
        let now = Instant::now();
        sched.load(series(8), normal_analysis(), now);
        sched.tick(now);
        sched.tick(now);
        sched.tick(now);
        assert_eq!(sched.phase(), PlaybackPhase::Completed);

        sched.play(now).unwrap();
        assert_eq!(sched.phase(), PlaybackPhase::Playing);
        assert_eq!(sched.cursor(), 0);
        assert_eq!(sched.progress(), 0.0);
        assert!(sched.window().is_empty());
        assert_eq!(sched.vitals().rhythm_label, "Normal Sinus");
    }

    #[test]
    fn jitter_stays_within_one_bpm_of_settled_rate() {
        let mut sched = scheduler();
        let now = Instant::now();
        sched.load(series(400), normal_analysis(), now);
        for _ in 0..40 {
            sched.tick(now);
        }
        assert!((sched.vitals().heart_rate - 80.0).abs() <= 1.0);
        // the cached analysis itself is untouched
        assert_eq!(sched.analysis().unwrap().heart_rate, 80.0);
    }

    #[test]
    fn injected_event_overrides_then_reverts_after_dwell() {
        let event = InjectedEvent {
            label: "Ventricular Ectopy".into(),
            risk: 65,
            explanation: "Real-time analysis detected isolated PVC.".into(),
            alert: Some(("PVC Detected".into(), Severity::Warning)),
        };
        let source = ScriptedSource::new(vec![Some(event)]);
        let mut sched =
            PlaybackScheduler::new(PlaybackConfig::default(), Box::new(source), 1);
        let base = Instant::now();
        sched.load(series(2000), normal_analysis(), base);

        // 75 ticks of 4 samples reach cursor 300, the injection cadence
        for _ in 0..75 {
            sched.tick(base);
        }
        assert_eq!(sched.vitals().rhythm_label, "Ventricular Ectopy");
        assert_eq!(sched.vitals().risk, 65);
        assert!(sched
            .alerts(base)
            .iter()
            .any(|a| a.message == "PVC Detected"));

        // dwell not yet elapsed: override still showing
        sched.tick(base + Duration::from_millis(3999));
        assert_eq!(sched.vitals().rhythm_label, "Ventricular Ectopy");

        // past the dwell the settled analysis comes back
        sched.tick(base + Duration::from_millis(4000));
        assert_eq!(sched.vitals().rhythm_label, "Normal Sinus");
        assert_eq!(sched.vitals().risk, 15);
    }

    #[test]
    fn snapshot_reflects_displayed_vitals() {
        let mut sched = scheduler();
        let now = Instant::now();
        sched.set_model(ModelId::Physionet);
        sched.load(series(100), normal_analysis(), now);
        let snap = sched.snapshot();
        assert_eq!(snap.rhythm, "Normal Sinus");
        assert_eq!(snap.risk, 15);
        assert_eq!(snap.model_id, ModelId::Physionet);
        assert_eq!(snap.confidence, 99.5);
    }
}
