//! Cadence-based time partitioning.
//!
//! A [`PartitionsDefinition`] divides the time axis into uniquely-keyed,
//! non-overlapping half-open windows at a fixed cadence (hourly, daily,
//! weekly, or monthly) with sub-cadence offsets. Key strings are indexed by
//! external run storage, so their format is exact:
//!
//! ```text
//! HOURLY (UTC)               2021-05-05-00:20        (%Y-%m-%d-%H:%M of the start)
//! HOURLY (other timezone)    2021-05-05-00:20-0400   (%Y-%m-%d-%H:%M%z of the start)
//! DAILY / WEEKLY / MONTHLY   2021-05-05              (%Y-%m-%d of the start)
//! ```
//!
//! Non-UTC hourly keys carry the UTC offset because a fall-back transition
//! repeats a local hour: without the offset, the 01:00 daylight-time and
//! 01:00 standard-time partitions would collide on one key.
//!
//! Boundary arithmetic for daily and coarser cadences runs on local
//! wall-clock time in the configured timezone and is converted to an absolute
//! instant last, so a daily partition is always one local calendar day (23 or
//! 25 real hours on DST transition days). Hourly boundaries advance in
//! absolute hours from the first boundary.
//!
//! Elapsed partition counts grow without bound (years of hourly data), so
//! key lookup and latest-window queries invert the recurrence in closed form;
//! the full sequence is only walked when a caller asks for it explicitly.

use chrono::{DateTime, Datelike, Days, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::time_window::TimeWindow;

/// The fixed recurrence unit of a partitioning scheme.
///
/// Cadence-specific boundary and key-format logic is selected by matching on
/// this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cadence {
    /// One partition per hour.
    Hourly,
    /// One partition per local calendar day.
    Daily,
    /// One partition per seven local calendar days.
    Weekly,
    /// One partition per calendar month.
    Monthly,
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        };
        write!(f, "{name}")
    }
}

/// One addressable unit of work: a key and the window it covers.
///
/// The key is a pure function of the window start and the cadence. Keys are
/// unique within a scheme; date-keyed cadences and UTC hourly schemes also
/// sort lexicographically in time order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    key: String,
    window: TimeWindow,
}

impl Partition {
    /// The deterministic string identifier of this partition.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The time window this partition covers.
    #[must_use]
    pub fn window(&self) -> &TimeWindow {
        &self.window
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.window)
    }
}

/// An immutable cadence/offset partitioning scheme.
///
/// Constructed once at pipeline-definition time; every query is a pure
/// function of the definition and an explicit timestamp, so instances are
/// safely shared across threads.
///
/// # Example
///
/// ```rust
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use metronome_core::partition::PartitionsDefinition;
///
/// let start = NaiveDate::from_ymd_opt(2021, 5, 5).unwrap();
/// let def = PartitionsDefinition::daily(start)
///     .with_hour_offset(2)?
///     .with_minute_offset(15);
///
/// let now = Utc.with_ymd_and_hms(2021, 5, 8, 12, 0, 0).unwrap();
/// let keys = def.get_partition_keys(now);
/// assert_eq!(keys, vec!["2021-05-05", "2021-05-06", "2021-05-07"]);
/// # Ok::<(), metronome_core::error::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionsDefinition {
    cadence: Cadence,
    start_date: NaiveDate,
    minute_offset: u32,
    hour_offset: u32,
    /// Weekday (0 = Sunday) for weekly, day-of-month (1..=28) for monthly.
    day_offset: u32,
    timezone: Tz,
}

impl PartitionsDefinition {
    /// Creates an hourly scheme starting at midnight of `start_date`.
    #[must_use]
    pub fn hourly(start_date: NaiveDate) -> Self {
        Self::new(Cadence::Hourly, start_date, 0)
    }

    /// Creates a daily scheme starting at `start_date`.
    #[must_use]
    pub fn daily(start_date: NaiveDate) -> Self {
        Self::new(Cadence::Daily, start_date, 0)
    }

    /// Creates a weekly scheme whose first boundary is the first Sunday at or
    /// after `start_date`.
    #[must_use]
    pub fn weekly(start_date: NaiveDate) -> Self {
        Self::new(Cadence::Weekly, start_date, 0)
    }

    /// Creates a monthly scheme whose first boundary is the first
    /// first-of-the-month at or after `start_date`.
    #[must_use]
    pub fn monthly(start_date: NaiveDate) -> Self {
        Self::new(Cadence::Monthly, start_date, 1)
    }

    fn new(cadence: Cadence, start_date: NaiveDate, day_offset: u32) -> Self {
        Self {
            cadence,
            start_date,
            minute_offset: 0,
            hour_offset: 0,
            day_offset,
            timezone: Tz::UTC,
        }
    }

    /// Sets the minute offset applied to every boundary.
    ///
    /// Values at or beyond one hour are reduced modulo 60, so an offset of 75
    /// behaves identically to an offset of 15.
    #[must_use]
    pub fn with_minute_offset(mut self, minute_offset: u32) -> Self {
        self.minute_offset = minute_offset % 60;
        self
    }

    /// Sets the hour offset applied to every boundary (reduced modulo 24).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOffset`] for hourly cadence, which has no hour
    /// dimension.
    pub fn with_hour_offset(mut self, hour_offset: u32) -> Result<Self> {
        if self.cadence == Cadence::Hourly {
            return Err(Error::invalid_offset(
                "hour offset is not meaningful for hourly cadence",
            ));
        }
        self.hour_offset = hour_offset % 24;
        Ok(self)
    }

    /// Sets the day offset: the weekday (0 = Sunday, reduced modulo 7) for
    /// weekly cadence, or the day-of-month (1..=28) for monthly cadence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOffset`] for hourly and daily cadence, and for
    /// a monthly day outside 1..=28 — months have unequal lengths and no
    /// clamping rule is defined past day 28.
    pub fn with_day_offset(mut self, day_offset: u32) -> Result<Self> {
        match self.cadence {
            Cadence::Hourly | Cadence::Daily => Err(Error::invalid_offset(format!(
                "day offset is not meaningful for {} cadence",
                self.cadence
            ))),
            Cadence::Weekly => {
                self.day_offset = day_offset % 7;
                Ok(self)
            }
            Cadence::Monthly => {
                if (1..=28).contains(&day_offset) {
                    self.day_offset = day_offset;
                    Ok(self)
                } else {
                    Err(Error::invalid_offset(format!(
                        "day offset {day_offset} must be between 1 and 28 for monthly cadence"
                    )))
                }
            }
        }
    }

    /// Sets the timezone boundary arithmetic runs in (default UTC).
    #[must_use]
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// The cadence of this scheme.
    #[must_use]
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// The configured start date.
    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// The normalized minute offset.
    #[must_use]
    pub fn minute_offset(&self) -> u32 {
        self.minute_offset
    }

    /// The normalized hour offset.
    #[must_use]
    pub fn hour_offset(&self) -> u32 {
        self.hour_offset
    }

    /// The normalized day offset (weekday for weekly, day-of-month for
    /// monthly).
    #[must_use]
    pub fn day_offset(&self) -> u32 {
        self.day_offset
    }

    /// The timezone boundary arithmetic runs in.
    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Returns all partitions whose window is fully elapsed at
    /// `current_time`, ordered by start ascending, as a lazy sequence.
    ///
    /// Callers that only need the tail should use
    /// [`Self::last_complete_partition`] instead, which is O(1).
    pub fn partitions(&self, current_time: DateTime<Utc>) -> impl Iterator<Item = Partition> + '_ {
        let complete = self
            .boundary_index(current_time.with_timezone(&self.timezone))
            .unwrap_or(0);
        (0..complete).map(move |index| self.partition_at(index))
    }

    /// Collects [`Self::partitions`] into a vector.
    #[must_use]
    pub fn get_partitions(&self, current_time: DateTime<Utc>) -> Vec<Partition> {
        self.partitions(current_time).collect()
    }

    /// Collects the keys of all fully-elapsed partitions, ordered by start
    /// ascending.
    #[must_use]
    pub fn get_partition_keys(&self, current_time: DateTime<Utc>) -> Vec<String> {
        self.partitions(current_time)
            .map(|partition| partition.key)
            .collect()
    }

    /// Resolves a partition by key without enumerating the sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPartitionKey`] when `key` does not land on a
    /// boundary generated by this scheme.
    pub fn get_partition(&self, key: &str) -> Result<Partition> {
        let start = self.parse_key(key)?;
        let index = self
            .boundary_index(start)
            .ok_or_else(|| Error::unknown_partition_key(key))?;
        let partition = self.partition_at(index);
        if partition.key == key {
            Ok(partition)
        } else {
            Err(Error::unknown_partition_key(key))
        }
    }

    /// Returns the most recently closed partition at `current_time`: the
    /// partition with the greatest `end <= current_time`.
    ///
    /// Computed by inverting the recurrence, not by enumeration. `None` when
    /// no partition has fully elapsed yet; this is a normal outcome for a
    /// young scheme, not an error.
    #[must_use]
    pub fn last_complete_partition(&self, current_time: DateTime<Utc>) -> Option<Partition> {
        let complete = self.boundary_index(current_time.with_timezone(&self.timezone))?;
        if complete == 0 {
            None
        } else {
            Some(self.partition_at(complete - 1))
        }
    }

    /// Builds the partition at a boundary index.
    fn partition_at(&self, index: u32) -> Partition {
        let window = TimeWindow::new(self.boundary_instant(index), self.boundary_instant(index + 1));
        Partition {
            key: self.key_for(window.start()),
            window,
        }
    }

    /// Formats the key for a partition starting at `start`.
    ///
    /// Non-UTC hourly keys include the UTC offset so the repeated local hour
    /// of a fall-back transition yields two distinct keys.
    fn key_for(&self, start: DateTime<Tz>) -> String {
        match self.cadence {
            Cadence::Hourly if self.timezone == Tz::UTC => {
                start.format("%Y-%m-%d-%H:%M").to_string()
            }
            Cadence::Hourly => start.format("%Y-%m-%d-%H:%M%z").to_string(),
            Cadence::Daily | Cadence::Weekly | Cadence::Monthly => {
                start.format("%Y-%m-%d").to_string()
            }
        }
    }

    /// Parses a key back into the instant it claims as its window start.
    fn parse_key(&self, key: &str) -> Result<DateTime<Tz>> {
        match self.cadence {
            Cadence::Hourly if self.timezone == Tz::UTC => {
                NaiveDateTime::parse_from_str(key, "%Y-%m-%d-%H:%M")
                    .map(|naive| self.localize(naive))
                    .map_err(|_| Error::unknown_partition_key(key))
            }
            // The explicit offset addresses the instant directly, so the
            // ambiguous-hour handling in `localize` never applies here.
            Cadence::Hourly => DateTime::parse_from_str(key, "%Y-%m-%d-%H:%M%z")
                .map(|parsed| parsed.with_timezone(&self.timezone))
                .map_err(|_| Error::unknown_partition_key(key)),
            Cadence::Daily | Cadence::Weekly | Cadence::Monthly => {
                NaiveDate::parse_from_str(key, "%Y-%m-%d")
                    .map(|date| self.localize(date.and_time(self.offset_time())))
                    .map_err(|_| Error::unknown_partition_key(key))
            }
        }
    }

    /// The absolute instant of boundary `index`.
    fn boundary_instant(&self, index: u32) -> DateTime<Tz> {
        let first = self.first_boundary();
        match self.cadence {
            Cadence::Hourly => self.localize(first) + Duration::hours(i64::from(index)),
            Cadence::Daily => self.localize(first + Days::new(u64::from(index))),
            Cadence::Weekly => self.localize(first + Days::new(u64::from(index) * 7)),
            Cadence::Monthly => self.localize(first + Months::new(index)),
        }
    }

    /// The greatest index whose boundary is at or before `at`, in closed
    /// form. `None` when `at` precedes boundary 0.
    fn boundary_index(&self, at: DateTime<Tz>) -> Option<u32> {
        let first = self.first_boundary();
        let index = match self.cadence {
            Cadence::Hourly => {
                let elapsed = at.signed_duration_since(self.localize(first)).num_seconds();
                if elapsed < 0 {
                    return None;
                }
                elapsed / 3600
            }
            Cadence::Daily | Cadence::Weekly => {
                let local = at.naive_local();
                let mut days = local.date().signed_duration_since(first.date()).num_days();
                if local.time() < first.time() {
                    days -= 1;
                }
                let span = if self.cadence == Cadence::Weekly { 7 } else { 1 };
                days.div_euclid(span)
            }
            Cadence::Monthly => {
                let local = at.naive_local();
                let mut months = (i64::from(local.year()) - i64::from(first.year())) * 12
                    + i64::from(local.month())
                    - i64::from(first.month());
                if (local.day(), local.time()) < (first.day(), first.time()) {
                    months -= 1;
                }
                months
            }
        };
        u32::try_from(index).ok()
    }

    /// Boundary 0 in local wall-clock time: the first boundary at or after
    /// `start_date` carrying the offsets.
    fn first_boundary(&self) -> NaiveDateTime {
        let date = match self.cadence {
            Cadence::Hourly | Cadence::Daily => self.start_date,
            Cadence::Weekly => {
                let ahead =
                    (self.day_offset + 7 - self.start_date.weekday().num_days_from_sunday()) % 7;
                self.start_date + Days::new(u64::from(ahead))
            }
            Cadence::Monthly => {
                let anchor = if self.start_date.day() <= self.day_offset {
                    self.start_date
                } else {
                    self.start_date + Months::new(1)
                };
                // day_offset is validated to 1..=28, valid in every month
                anchor.with_day(self.day_offset).unwrap_or(anchor)
            }
        };
        date.and_time(self.offset_time())
    }

    /// The time-of-day component of every boundary.
    fn offset_time(&self) -> NaiveTime {
        // offsets are normalized at construction, so the components are
        // always in range
        NaiveTime::from_hms_opt(self.hour_offset, self.minute_offset, 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// Resolves a local wall-clock time to an absolute instant in the
    /// configured timezone.
    fn localize(&self, naive: NaiveDateTime) -> DateTime<Tz> {
        match self.timezone.from_local_datetime(&naive) {
            LocalResult::Single(instant) => instant,
            // Fall-back transition: the wall clock repeats, take the first
            // occurrence.
            LocalResult::Ambiguous(earliest, _) => earliest,
            // Spring-forward gap: the wall clock skips, take the same wall
            // time one hour later.
            LocalResult::None => self
                .timezone
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
                .unwrap_or_else(|| self.timezone.from_utc_datetime(&naive)),
        }
    }
}
