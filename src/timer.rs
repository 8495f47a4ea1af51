use std::time::{Duration, Instant};

/// Single-slot timer owned by one debounce/flash concern.
///
/// Arming replaces any pending deadline, so callbacks for the same concern
/// never stack up or fire out of order. The owner polls it with the current
/// time from its event loop.
#[derive(Debug, Default, Clone)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn new() -> Self {
        Self { at: None }
    }

    /// Schedule the deadline `after` from `now`, replacing any pending one
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.at = Some(now + after);
    }

    pub fn cancel(&mut self) {
        self.at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    /// Returns true exactly once when the deadline has passed, then disarms
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.at {
            Some(at) if now >= at => {
                self.at = None;
                true
            }
            _ => false,
        }
    }

    /// Time left until the deadline, if armed
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(now))
    }
}
