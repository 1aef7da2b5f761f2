//! Time source for completion timestamps and streak days.

use chrono::{DateTime, FixedOffset, Local, NaiveDate};

/// Source of the current time.
///
/// The offset of the returned time decides which calendar day "today" is
/// when counting streaks.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;

    /// The current calendar day in the clock's offset.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock frozen at one instant. Used by tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<FixedOffset>);

impl FixedClock {
    pub fn new(at: DateTime<FixedOffset>) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_today_uses_its_offset() {
        let at = DateTime::parse_from_rfc3339("2026-10-15T23:30:00-05:00").unwrap();
        let clock = FixedClock::new(at);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        // Same instant is already the 16th in UTC
        assert_eq!(
            clock.now().naive_utc().date(),
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
        );
    }
}
