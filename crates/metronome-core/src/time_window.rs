//! Half-open time intervals backing partitions.
//!
//! A [`TimeWindow`] is the value side of a partition: the interval
//! `[start, end)` of wall-clock time the partition covers. Windows produced
//! by one scheme tile the time axis exactly: the end of partition *i* is the
//! start of partition *i + 1*, with no gap and no overlap.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;

/// A half-open time interval `[start, end)` with timezone-aware endpoints.
///
/// Equality compares instants, so two windows constructed in different
/// timezones are equal when they cover the same span of absolute time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl TimeWindow {
    /// Creates a new window.
    ///
    /// Callers must uphold `start < end`; boundary generation in
    /// [`crate::partition::PartitionsDefinition`] does so by construction.
    #[must_use]
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        debug_assert!(start < end, "time window must be non-empty");
        Self { start, end }
    }

    /// The inclusive start of the window.
    #[must_use]
    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    /// The exclusive end of the window.
    #[must_use]
    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    /// The absolute duration covered by the window.
    ///
    /// For daily and coarser cadences this is wall-clock dependent: a local
    /// calendar day spanning a DST transition is 23 or 25 real hours.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end.signed_duration_since(self.start)
    }

    /// Returns true if `instant` falls inside the window.
    ///
    /// The start is inclusive and the end is exclusive, matching the
    /// half-open contract.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Tz>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Tz;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_window_accessors_and_duration() {
        let w = TimeWindow::new(utc(2021, 5, 5, 0, 0), utc(2021, 5, 6, 0, 0));
        assert_eq!(w.start(), utc(2021, 5, 5, 0, 0));
        assert_eq!(w.end(), utc(2021, 5, 6, 0, 0));
        assert_eq!(w.duration(), Duration::days(1));
    }

    #[test]
    fn test_contains_is_half_open() {
        let w = TimeWindow::new(utc(2021, 5, 5, 0, 0), utc(2021, 5, 6, 0, 0));
        assert!(w.contains(utc(2021, 5, 5, 0, 0)));
        assert!(w.contains(utc(2021, 5, 5, 23, 59)));
        assert!(!w.contains(utc(2021, 5, 6, 0, 0)));
        assert!(!w.contains(utc(2021, 5, 4, 23, 59)));
    }

    #[test]
    fn test_equality_compares_instants() {
        let new_york: Tz = "America/New_York".parse().unwrap();
        let local = new_york.with_ymd_and_hms(2021, 5, 4, 20, 0, 0).unwrap();
        let w1 = TimeWindow::new(utc(2021, 5, 5, 0, 0), utc(2021, 5, 6, 0, 0));
        let w2 = TimeWindow::new(local, utc(2021, 5, 6, 0, 0));
        assert_eq!(w1, w2);
    }

    #[test]
    fn test_serializes_endpoints_as_strings() {
        let w = TimeWindow::new(utc(2021, 5, 5, 0, 0), utc(2021, 5, 6, 0, 0));
        let encoded = serde_json::to_value(&w).unwrap();
        let start = encoded["start"].as_str().unwrap();
        let end = encoded["end"].as_str().unwrap();
        assert!(start.starts_with("2021-05-05T00:00:00"));
        assert!(end.starts_with("2021-05-06T00:00:00"));
    }

    #[test]
    fn test_display_uses_rfc3339_with_explicit_offset() {
        let w = TimeWindow::new(utc(2021, 5, 5, 0, 0), utc(2021, 5, 6, 0, 0));
        assert_eq!(
            w.to_string(),
            "[2021-05-05T00:00:00+00:00, 2021-05-06T00:00:00+00:00)"
        );
    }
}
