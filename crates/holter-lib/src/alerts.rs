use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// How loudly an alert should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// A single surfaced notification.
#[derive(Debug, Clone)]
pub struct Alert {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub created_at: Instant,
}

/// Deduplicating, self-expiring notification set.
///
/// At most `capacity` alerts are retained (oldest evicted first); a message
/// that is already active is not re-armed, so its expiry stays on the
/// original schedule. Expiry only ever touches this set, never playback
/// state.
#[derive(Debug)]
pub struct AlertManager {
    active: Vec<Alert>,
    next_id: u64,
    capacity: usize,
    ttl: Duration,
}

impl Default for AlertManager {
    fn default() -> Self {
        Self {
            active: Vec::new(),
            next_id: 0,
            capacity: 3,
            ttl: Duration::from_millis(3000),
        }
    }
}

impl AlertManager {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            active: Vec::new(),
            next_id: 0,
            capacity,
            ttl,
        }
    }

    /// Raise an alert. No-op when the same message text is already active.
    pub fn trigger(&mut self, message: &str, severity: Severity, now: Instant) {
        self.prune(now);
        if self.active.iter().any(|a| a.message == message) {
            return;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.active.push(Alert {
            id,
            message: message.to_string(),
            severity,
            created_at: now,
        });
        if self.active.len() > self.capacity {
            self.active.remove(0);
        }
        log::debug!("alert raised: {} ({:?})", message, severity);
    }

    /// Drop alerts whose TTL has elapsed.
    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.active
            .retain(|a| now.duration_since(a.created_at) < ttl);
    }

    /// The currently live alerts, oldest first.
    pub fn active(&mut self, now: Instant) -> &[Alert] {
        self.prune(now);
        &self.active
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn duplicate_message_is_suppressed() {
        let base = Instant::now();
        let mut mgr = AlertManager::default();
        mgr.trigger("Tachycardia Detected", Severity::Warning, base);
        mgr.trigger("Tachycardia Detected", Severity::Warning, at(base, 500));
        assert_eq!(mgr.active(at(base, 600)).len(), 1);
    }

    #[test]
    fn retrigger_does_not_extend_ttl() {
        let base = Instant::now();
        let mut mgr = AlertManager::default();
        mgr.trigger("Irregular Rhythm", Severity::Critical, base);
        // re-trigger late in the window; expiry stays on the original clock
        mgr.trigger("Irregular Rhythm", Severity::Critical, at(base, 2900));
        assert!(mgr.active(at(base, 3000)).is_empty());
    }

    #[test]
    fn expires_after_ttl() {
        let base = Instant::now();
        let mut mgr = AlertManager::default();
        mgr.trigger("Asystole Warning", Severity::Critical, base);
        assert_eq!(mgr.active(at(base, 2999)).len(), 1);
        assert!(mgr.active(at(base, 3000)).is_empty());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let base = Instant::now();
        let mut mgr = AlertManager::default();
        mgr.trigger("one", Severity::Info, base);
        mgr.trigger("two", Severity::Info, at(base, 10));
        mgr.trigger("three", Severity::Info, at(base, 20));
        mgr.trigger("four", Severity::Info, at(base, 30));
        let live = mgr.active(at(base, 40));
        assert_eq!(live.len(), 3);
        assert_eq!(live[0].message, "two");
        assert_eq!(live[2].message, "four");
    }
}
