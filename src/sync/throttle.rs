use std::time::{Duration, Instant};

/// Lets through at most one event per `interval`; the rest are dropped.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Throttle {
            interval,
            last: None,
        }
    }

    /// Whether an event at `now` may pass. Admitted events restart the window.
    pub fn admit(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Reopen the window immediately.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
