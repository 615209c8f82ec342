//! # Clock
//!
//! Injectable time source.
//!
//! Sale dates, purchase dates, movement timestamps, and synthesized lot
//! codes all derive from the clock. Keeping it behind a trait makes
//! settlement tests deterministic: a fixed clock produces identical
//! documents on every run.

use chrono::{DateTime, Utc};

/// Supplies the current timestamp to settlement operations.
pub trait Clock: Send + Sync {
    /// Returns "now" in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_is_stable() {
        let instant = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now(), instant);
    }
}
