//! Deriving a recurring schedule from a partitioned config.
//!
//! A [`ScheduleDefinition`] is built once from a [`PartitionedConfig`] plus
//! optional cron selector overrides, and carries two things: the generated
//! 5-field cron expression (`minute hour day-of-month * day-of-week`, month
//! fixed to `*`) an external trigger subsystem consumes, and the tick
//! evaluator the scheduling daemon invokes once per firing.
//!
//! ## Temporal contract
//!
//! A tick always targets the partition that has most recently *closed*: the
//! window with the greatest `end` at or before the firing instant. By the
//! time the schedule is due, that partition's data is fully materialized.
//! When the selector overrides place the firing away from the scheme's own
//! boundary, the lag between a window closing and its run firing can exceed
//! one partition width; the resolved partition is still the most recently
//! closed one, never a partially-elapsed one. Before the first window closes
//! the evaluator returns nothing, which is a normal outcome rather than an
//! error.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;
use std::str::FromStr;

use metronome_core::{Cadence, tick_span};

use crate::config::PartitionedConfig;
use crate::error::{Error, Result};
use crate::run_request::{PARTITION_TAG, RunRequest};

/// Weekday names in cron order, indexed by the 0 = Sunday convention.
const WEEKDAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Catch-up horizon when a schedule has no recorded last tick.
const DEFAULT_CATCHUP_WINDOW_HOURS: i64 = 24;

/// Builder for [`ScheduleDefinition`].
///
/// Selector overrides replace the corresponding field of the generated cron
/// expression; fields left unset default to the partition scheme's own
/// normalized offsets. Supplying a selector the cadence does not use is a
/// configuration error surfaced by [`Self::build`].
#[derive(Debug, Clone)]
pub struct ScheduleBuilder {
    name: String,
    config: PartitionedConfig,
    minute_of_hour: Option<u32>,
    hour_of_day: Option<u32>,
    day_of_week: Option<u32>,
    day_of_month: Option<u32>,
    execution_timezone: Option<Tz>,
    tags: BTreeMap<String, String>,
}

impl ScheduleBuilder {
    /// Starts a builder for a schedule named `name` over `config`.
    pub fn new(name: impl Into<String>, config: PartitionedConfig) -> Self {
        Self {
            name: name.into(),
            config,
            minute_of_hour: None,
            hour_of_day: None,
            day_of_week: None,
            day_of_month: None,
            execution_timezone: None,
            tags: BTreeMap::new(),
        }
    }

    /// Overrides the minute field (0..=59). Valid for every cadence.
    #[must_use]
    pub fn minute_of_hour(mut self, minute: u32) -> Self {
        self.minute_of_hour = Some(minute);
        self
    }

    /// Overrides the hour field (0..=23). Not valid for hourly cadence.
    #[must_use]
    pub fn hour_of_day(mut self, hour: u32) -> Self {
        self.hour_of_day = Some(hour);
        self
    }

    /// Overrides the day-of-week field (0 = Sunday ..= 6 = Saturday). Only
    /// valid for weekly cadence.
    #[must_use]
    pub fn day_of_week(mut self, day: u32) -> Self {
        self.day_of_week = Some(day);
        self
    }

    /// Overrides the day-of-month field (1..=28). Only valid for monthly
    /// cadence.
    #[must_use]
    pub fn day_of_month(mut self, day: u32) -> Self {
        self.day_of_month = Some(day);
        self
    }

    /// Sets the timezone ticks are interpreted in (default: the partition
    /// scheme's timezone).
    #[must_use]
    pub fn execution_timezone(mut self, timezone: Tz) -> Self {
        self.execution_timezone = Some(timezone);
        self
    }

    /// Sets schedule-level tags merged into every emitted run request.
    #[must_use]
    pub fn tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    /// Validates the selectors and builds the schedule.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSelector`] for a selector the cadence does not use
    /// - [`Error::SelectorOutOfRange`] for a value outside the field's range
    /// - [`Error::InvalidCron`] if the generated expression fails to parse
    pub fn build(self) -> Result<ScheduleDefinition> {
        let cadence = self.config.partitions_def().cadence();

        if self.hour_of_day.is_some() && cadence == Cadence::Hourly {
            return Err(Error::InvalidSelector {
                selector: "hour_of_day",
                cadence,
            });
        }
        if self.day_of_week.is_some() && cadence != Cadence::Weekly {
            return Err(Error::InvalidSelector {
                selector: "day_of_week",
                cadence,
            });
        }
        if self.day_of_month.is_some() && cadence != Cadence::Monthly {
            return Err(Error::InvalidSelector {
                selector: "day_of_month",
                cadence,
            });
        }
        check_range("minute_of_hour", self.minute_of_hour, 0, 59)?;
        check_range("hour_of_day", self.hour_of_day, 0, 23)?;
        check_range("day_of_week", self.day_of_week, 0, 6)?;
        check_range("day_of_month", self.day_of_month, 1, 28)?;

        let def = self.config.partitions_def();
        let minute = self.minute_of_hour.unwrap_or_else(|| def.minute_offset());
        let hour = self.hour_of_day.unwrap_or_else(|| def.hour_offset());
        let (hour, day_of_month, day_of_week) = match cadence {
            Cadence::Hourly => (None, None, None),
            Cadence::Daily => (Some(hour), None, None),
            Cadence::Weekly => (
                Some(hour),
                None,
                Some(self.day_of_week.unwrap_or_else(|| def.day_offset())),
            ),
            Cadence::Monthly => (
                Some(hour),
                Some(self.day_of_month.unwrap_or_else(|| def.day_offset())),
                None,
            ),
        };

        let cron_schedule = render_cron(minute, hour, day_of_month, day_of_week);
        let cron = parse_cron(minute, hour, day_of_month, day_of_week, &cron_schedule)?;
        let execution_timezone = self
            .execution_timezone
            .unwrap_or_else(|| def.timezone());

        Ok(ScheduleDefinition {
            name: self.name,
            cron_schedule,
            cron,
            execution_timezone,
            config: self.config,
            tags: self.tags,
        })
    }
}

/// A derived recurring trigger over a partition scheme.
///
/// Holds no mutable state: the tick evaluator is a pure function of the
/// firing instant and the immutable definitions it closes over, so instances
/// are shared freely for concurrent evaluation.
#[derive(Debug, Clone)]
pub struct ScheduleDefinition {
    name: String,
    cron_schedule: String,
    cron: cron::Schedule,
    execution_timezone: Tz,
    config: PartitionedConfig,
    tags: BTreeMap<String, String>,
}

impl ScheduleDefinition {
    /// The schedule's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The generated 5-field cron expression.
    #[must_use]
    pub fn cron_schedule(&self) -> &str {
        &self.cron_schedule
    }

    /// The timezone ticks are interpreted in.
    #[must_use]
    pub fn execution_timezone(&self) -> Tz {
        self.execution_timezone
    }

    /// The partitioned config this schedule was derived from.
    #[must_use]
    pub fn partitioned_config(&self) -> &PartitionedConfig {
        &self.config
    }

    /// The schedule-level tags.
    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Evaluates one firing of the schedule.
    ///
    /// Resolves the most recently closed partition at
    /// `scheduled_execution_time` and emits a run request for it, with tags
    /// merged from the config tags, the schedule tags, and a `partition` tag
    /// carrying the resolved key. Returns `Ok(None)` when no partition has
    /// fully elapsed yet.
    ///
    /// # Errors
    ///
    /// Propagates `UnknownPartitionKey` if the resolved key fails to round
    /// trip through the config, which indicates a definition inconsistency.
    pub fn evaluate_tick(
        &self,
        scheduled_execution_time: DateTime<Utc>,
    ) -> Result<Option<RunRequest>> {
        let span = tick_span(&self.name, scheduled_execution_time);
        let _guard = span.enter();

        let Some(partition) = self
            .config
            .partitions_def()
            .last_complete_partition(scheduled_execution_time)
        else {
            tracing::debug!("no partition has fully elapsed yet");
            return Ok(None);
        };

        let run_config = self.config.get_run_config_for_partition_key(partition.key())?;

        let mut tags = self.config.tags().clone();
        tags.extend(self.tags.clone());
        tags.insert(PARTITION_TAG.to_string(), partition.key().to_string());

        tracing::debug!(partition = partition.key(), "resolved tick to partition");
        Ok(Some(RunRequest::new(run_config, tags)))
    }

    /// The next instant strictly after `after` at which the cron expression
    /// fires, in the execution timezone.
    #[must_use]
    pub fn next_tick_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.cron
            .after(&after.with_timezone(&self.execution_timezone))
            .next()
            .map(|tick| tick.with_timezone(&Utc))
    }

    /// Computes the firing instants due between the last recorded tick and
    /// `now`, capped at `limit`.
    ///
    /// With no recorded tick the catch-up horizon is 24 hours, so a schedule
    /// enabled long after its start date does not replay its entire history.
    #[must_use]
    pub fn due_ticks(
        &self,
        last_scheduled_for: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Vec<DateTime<Utc>> {
        // `cron::Schedule::after` is exclusive of the given instant, so
        // starting from the last recorded tick does not replay it.
        let start = last_scheduled_for
            .unwrap_or_else(|| now - Duration::hours(DEFAULT_CATCHUP_WINDOW_HOURS));

        let start_tz = start.with_timezone(&self.execution_timezone);
        let now_tz = now.with_timezone(&self.execution_timezone);

        self.cron
            .after(&start_tz)
            .take_while(|tick| *tick <= now_tz)
            .take(limit)
            .map(|tick| tick.with_timezone(&Utc))
            .collect()
    }
}

/// Renders the displayed 5-field expression, `*` for unused fields.
fn render_cron(
    minute: u32,
    hour: Option<u32>,
    day_of_month: Option<u32>,
    day_of_week: Option<u32>,
) -> String {
    format!(
        "{minute} {} {} * {}",
        field(hour),
        field(day_of_month),
        field(day_of_week)
    )
}

/// Parse-checks the expression with the cron crate.
///
/// The cron crate wants a seconds field and numbers weekdays differently, so
/// the parsed form prepends `0` and names the weekday instead of using the
/// displayed 5-field form directly.
fn parse_cron(
    minute: u32,
    hour: Option<u32>,
    day_of_month: Option<u32>,
    day_of_week: Option<u32>,
    displayed: &str,
) -> Result<cron::Schedule> {
    let weekday = day_of_week
        .and_then(|day| usize::try_from(day).ok())
        .and_then(|day| WEEKDAY_NAMES.get(day).copied())
        .unwrap_or("*");
    let expression = format!(
        "0 {minute} {} {} * {weekday}",
        field(hour),
        field(day_of_month)
    );
    cron::Schedule::from_str(&expression).map_err(|err| Error::InvalidCron {
        expression: displayed.to_string(),
        message: err.to_string(),
    })
}

fn field(value: Option<u32>) -> String {
    value.map_or_else(|| "*".to_string(), |v| v.to_string())
}

fn check_range(selector: &'static str, value: Option<u32>, min: u32, max: u32) -> Result<()> {
    match value {
        Some(v) if !(min..=max).contains(&v) => {
            Err(Error::SelectorOutOfRange { selector, value: v })
        }
        _ => Ok(()),
    }
}
