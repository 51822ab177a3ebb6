use crate::alerts::Severity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Transient finding pushed into playback between settled analyses.
#[derive(Debug, Clone)]
pub struct InjectedEvent {
    pub label: String,
    pub risk: u8,
    pub explanation: String,
    pub alert: Option<(String, Severity)>,
}

impl InjectedEvent {
    fn new(label: &str, risk: u8, explanation: &str, alert: &str, severity: Severity) -> Self {
        Self {
            label: label.to_string(),
            risk,
            explanation: explanation.to_string(),
            alert: Some((alert.to_string(), severity)),
        }
    }
}

/// Something that can produce transient events while playback runs.
///
/// The scheduler treats the output opaquely: it applies the override/revert
/// protocol and nothing else, so a randomized demo source and a real
/// inference model are interchangeable here.
pub trait EventSource {
    fn poll(&mut self) -> Option<InjectedEvent>;
}

/// Source that never fires.
#[derive(Debug, Default)]
pub struct NullSource;

impl EventSource for NullSource {
    fn poll(&mut self) -> Option<InjectedEvent> {
        None
    }
}

/// In-memory source useful for tests and deterministic playback.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    queue: VecDeque<Option<InjectedEvent>>,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = Option<InjectedEvent>>) -> Self {
        Self {
            queue: events.into_iter().collect(),
        }
    }
}

impl EventSource for ScriptedSource {
    fn poll(&mut self) -> Option<InjectedEvent> {
        self.queue.pop_front().flatten()
    }
}

/// Randomized demo source mimicking live model output.
///
/// Fires on 40% of polls; roughly one fifth of the firings escalate to the
/// critical V-Tach event, the rest draw from the minor anomaly catalog.
pub struct DemoEventSource {
    rng: StdRng,
}

impl DemoEventSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl EventSource for DemoEventSource {
    fn poll(&mut self) -> Option<InjectedEvent> {
        let roll: f64 = self.rng.gen();
        if roll <= 0.6 {
            return None;
        }
        if roll > 0.92 {
            return Some(InjectedEvent::new(
                "Non-Sustained V-Tach",
                88,
                "CRITICAL: Run of 3+ ventricular beats > 100bpm detected.",
                "V-Tach Warning",
                Severity::Critical,
            ));
        }
        let minor = [
            InjectedEvent::new(
                "Ventricular Ectopy",
                65,
                "Real-time analysis detected isolated PVC.",
                "PVC Detected",
                Severity::Warning,
            ),
            InjectedEvent::new(
                "Signal Artifact",
                20,
                "Motion artifact detected in signal stream.",
                "Signal Noise",
                Severity::Info,
            ),
            InjectedEvent::new(
                "T-Wave Alternans",
                55,
                "Beat-to-beat variation in repolarization.",
                "Repolarization Risk",
                Severity::Warning,
            ),
        ];
        let pick = self.rng.gen_range(0..minor.len());
        Some(minor[pick].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_source_never_fires() {
        let mut source = NullSource;
        for _ in 0..100 {
            assert!(source.poll().is_none());
        }
    }

    #[test]
    fn scripted_source_replays_in_order() {
        let event = InjectedEvent {
            label: "Ventricular Ectopy".into(),
            risk: 65,
            explanation: "isolated PVC".into(),
            alert: None,
        };
        let mut source = ScriptedSource::new(vec![None, Some(event)]);
        assert!(source.poll().is_none());
        assert_eq!(source.poll().unwrap().label, "Ventricular Ectopy");
        assert!(source.poll().is_none());
    }

    #[test]
    fn demo_source_is_deterministic_per_seed() {
        let collect = |seed| {
            let mut source = DemoEventSource::seeded(seed);
            (0..50)
                .map(|_| source.poll().map(|e| e.label))
                .collect::<Vec<_>>()
        };
        assert_eq!(collect(7), collect(7));
        let fired = collect(7).iter().filter(|e| e.is_some()).count();
        assert!(fired > 0, "seed 7 should fire at least once in 50 polls");
    }
}
