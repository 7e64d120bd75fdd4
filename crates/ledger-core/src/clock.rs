use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of block timestamps, in nanoseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_ns(&self) -> u64;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ns(&self) -> u64 {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        u64::try_from(since_epoch.as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Clock that starts at a fixed instant and moves forward by `step` on every read.
///
/// Lets simulations and tests decide whether blocks look fast or slow
/// regardless of how long hashing actually takes.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicU64,
    step: u64,
}

impl ManualClock {
    pub fn new(start: u64, step: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
            step,
        }
    }

    /// Clock that never moves.
    pub fn frozen(at: u64) -> Self {
        Self::new(at, 0)
    }

    /// Jump to `at`; following reads continue from there.
    pub fn set(&self, at: u64) {
        self.now.store(at, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> u64 {
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_past_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_ns() > 1_577_836_800_000_000_000);
    }

    #[test]
    fn manual_clock_steps_per_read() {
        let clock = ManualClock::new(100, 10);
        assert_eq!(clock.now_ns(), 100);
        assert_eq!(clock.now_ns(), 110);
        clock.set(5);
        assert_eq!(clock.now_ns(), 5);
        assert_eq!(clock.now_ns(), 15);
    }

    #[test]
    fn frozen_clock_never_moves() {
        let clock = ManualClock::frozen(42);
        assert_eq!(clock.now_ns(), 42);
        assert_eq!(clock.now_ns(), 42);
    }
}
