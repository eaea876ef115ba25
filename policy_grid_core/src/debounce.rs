use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Single pending deadline, restarted on every touch. Polled from the frame loop, every call
/// takes `now` so it can be driven deterministically.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    last_changed: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Debounce {
            delay,
            last_changed: None,
        }
    }

    /// Restart the countdown, dropping any earlier pending one.
    pub fn touch(&mut self, now: Instant) {
        self.last_changed = Some(now);
    }

    pub fn cancel(&mut self) {
        self.last_changed = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.last_changed.map(|t| t + self.delay)
    }

    /// Returns true once per touch, when the delay has elapsed since the last one.
    #[must_use]
    pub fn fire(&mut self, now: Instant) -> bool {
        let elapsed = self
            .last_changed
            .is_some_and(|t| now.saturating_duration_since(t) >= self.delay);
        if elapsed {
            self.last_changed = None;
        }
        elapsed
    }
}

impl Default for Debounce {
    fn default() -> Self {
        Debounce::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_last_touch() {
        let start = Instant::now();
        let mut debounce = Debounce::default();
        assert!(!debounce.fire(start));

        debounce.touch(start);
        debounce.touch(start + Duration::from_millis(100));
        debounce.touch(start + Duration::from_millis(300));
        assert!(!debounce.fire(start + Duration::from_millis(700)));
        assert_eq!(debounce.deadline(), Some(start + Duration::from_millis(800)));
        assert!(debounce.fire(start + Duration::from_millis(800)));
        assert!(!debounce.fire(start + Duration::from_millis(2000)));
        assert_eq!(debounce.deadline(), None);
    }

    #[test]
    fn cancel_drops_pending() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(10));
        debounce.touch(start);
        debounce.cancel();
        assert!(!debounce.fire(start + Duration::from_secs(1)));
        assert_eq!(debounce.deadline(), None);
    }
}
