//! Simulated clock

use crate::core::hal::Clock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Deterministic [`Clock`] for tests
///
/// Every `now()` call advances time by a fixed step so polling loops make
/// progress without real waiting. `sleep()` advances by the requested
/// duration and returns immediately. Clones share the same timeline.
#[derive(Debug, Clone)]
pub struct MockClock {
    nanos: Arc<AtomicU64>,
    step_nanos: u64,
}

impl MockClock {
    /// Clock starting at zero that advances 1 µs per `now()` call
    pub fn new() -> Self {
        Self::with_step(Duration::from_micros(1))
    }

    /// Clock that advances `step` per `now()` call
    pub fn with_step(step: Duration) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(0)),
            step_nanos: step.as_nanos() as u64,
        }
    }

    /// Move time forward without reading it
    pub fn advance(&self, duration: Duration) {
        self.nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Current time without advancing
    pub fn peek(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.fetch_add(self.step_nanos, Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_advances_by_step() {
        let clock = MockClock::with_step(Duration::from_micros(10));
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.now(), Duration::from_micros(10));
        assert_eq!(clock.peek(), Duration::from_micros(20));
    }

    #[test]
    fn test_sleep_and_shared_timeline() {
        let clock = MockClock::with_step(Duration::ZERO);
        let other = clock.clone();
        clock.sleep(Duration::from_millis(5));
        other.advance(Duration::from_millis(1));
        assert_eq!(clock.now(), Duration::from_millis(6));
    }
}
