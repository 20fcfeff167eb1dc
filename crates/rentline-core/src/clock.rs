//! # Clock
//!
//! Time source for the booking engine.
//!
//! Start dates, end dates and fees all depend on "now", so the engine reads
//! time through the [`Clock`] trait instead of calling `Utc::now()` directly.
//! Production uses [`SystemClock`]; tests and the seed tool use
//! [`ManualClock`] to place rentals at exact instants.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// A source of the current UTC time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use rentline_core::{Clock, ManualClock};
///
/// let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
/// clock.advance(Duration::hours(14));
/// assert_eq!(clock.now(), Utc.with_ymd_and_hms(2026, 3, 1, 23, 0, 0).unwrap());
/// ```
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        ManualClock {
            current: Mutex::new(start),
        }
    }

    /// Jumps to an absolute instant. Going backwards is allowed.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.lock() = at;
    }

    /// Moves the clock by `by` (negative durations move it back).
    pub fn advance(&self, by: Duration) {
        let mut current = self.lock();
        *current = *current + by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        // A poisoned lock still holds a valid timestamp.
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    #[test]
    fn test_manual_clock_set_and_advance() {
        let t0 = Utc.with_ymd_and_hms(2026, 2, 10, 8, 0, 0).unwrap();
        let clock = ManualClock::new(t0);
        assert_eq!(clock.now(), t0);

        clock.advance(Duration::hours(49));
        assert_eq!(clock.now(), t0 + Duration::hours(49));

        clock.set(t0 - Duration::days(1));
        assert_eq!(clock.now(), t0 - Duration::days(1));
    }

    #[test]
    fn test_clock_is_object_safe() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let before = Utc::now();
        assert!(clock.now() >= before);
    }
}
