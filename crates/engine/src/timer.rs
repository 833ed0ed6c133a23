use tokio::time::Duration;
use tokio::time::Instant;

/// Per-match round deadline, extended with the `epoch` concept (glossary):
/// a monotonically increasing tag attached to each armed deadline, used to
/// discard stale timer firings racing a round resolution.
///
/// A single in-memory match re-arms its deadline every round, so a bare
/// `Option<Instant>` deadline isn't enough: a scheduled firing for a
/// superseded arming must be a no-op rather than forfeiting a round that
/// already resolved.
#[derive(Debug, Default, Clone)]
pub struct Timer {
    deadline: Option<Instant>,
    epoch: u64,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a fresh deadline `timeout` from now, incrementing the epoch.
    /// Returns the new epoch so the caller can schedule a firing that
    /// carries it.
    pub fn arm(&mut self, timeout: Duration) -> u64 {
        self.deadline = Some(Instant::now() + timeout);
        self.epoch += 1;
        self.epoch
    }

    /// Clears the deadline. Any in-flight firing for the epoch just cleared
    /// becomes a no-op: [`Self::fires`] requires a live deadline.
    pub fn clear(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn expired(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// True if an `onDeadline(epoch)` event arriving now should actually
    /// fire: the timer must still be armed and the epoch must match the
    /// most recently armed one. A stale epoch is discarded.
    pub fn fires(&self, epoch: u64) -> bool {
        self.deadline.is_some() && self.epoch == epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_cleared() {
        let t = Timer::new();
        assert!(t.deadline().is_none());
        assert!(!t.expired());
        assert_eq!(t.epoch(), 0);
    }

    #[test]
    fn arm_sets_deadline_and_bumps_epoch() {
        let mut t = Timer::new();
        let e1 = t.arm(Duration::from_secs(60));
        assert_eq!(e1, 1);
        assert!(t.deadline().is_some());
        let e2 = t.arm(Duration::from_secs(60));
        assert_eq!(e2, 2);
    }

    #[test]
    fn clear_discards_deadline() {
        let mut t = Timer::new();
        t.arm(Duration::from_secs(60));
        t.clear();
        assert!(t.deadline().is_none());
    }

    #[test]
    fn stale_epoch_does_not_fire() {
        let mut t = Timer::new();
        let stale = t.arm(Duration::from_secs(60));
        let fresh = t.arm(Duration::from_secs(60));
        assert_ne!(stale, fresh);
        assert!(!t.fires(stale));
        assert!(t.fires(fresh));
    }

    #[test]
    fn cleared_timer_never_fires() {
        let mut t = Timer::new();
        let epoch = t.arm(Duration::from_secs(60));
        t.clear();
        assert!(!t.fires(epoch));
    }
}
