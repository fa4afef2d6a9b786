//! Error types for the schedule-derivation domain.
//!
//! Configuration errors are raised at schedule-build time, never deferred: a
//! misconfigured selector must not silently produce wrong partitions for
//! months. A schedule with no eligible partition is not an error at all; tick
//! evaluation returns an empty result in that case.

use metronome_core::Cadence;

/// The result type used throughout metronome-flow.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building or evaluating schedules.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A selector was supplied that is irrelevant to the cadence.
    #[error("selector {selector} is not valid for {cadence} cadence")]
    InvalidSelector {
        /// The selector field name.
        selector: &'static str,
        /// The cadence it was supplied for.
        cadence: Cadence,
    },

    /// A selector value was outside its valid range.
    #[error("selector {selector} value {value} is out of range")]
    SelectorOutOfRange {
        /// The selector field name.
        selector: &'static str,
        /// The supplied value.
        value: u32,
    },

    /// A generated cron expression failed validation.
    #[error("invalid cron expression {expression:?}: {message}")]
    InvalidCron {
        /// The expression that failed to parse.
        expression: String,
        /// The parser's description of the failure.
        message: String,
    },

    /// A schedule name was registered twice.
    #[error("schedule already registered: {name}")]
    DuplicateSchedule {
        /// The conflicting schedule name.
        name: String,
    },

    /// An error from metronome-core.
    #[error("core error: {0}")]
    Core(#[from] metronome_core::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidSelector {
            selector: "hour_of_day",
            cadence: Cadence::Hourly,
        };
        assert_eq!(
            err.to_string(),
            "selector hour_of_day is not valid for hourly cadence"
        );

        let err = Error::SelectorOutOfRange {
            selector: "day_of_month",
            value: 29,
        };
        assert_eq!(err.to_string(), "selector day_of_month value 29 is out of range");
    }

    #[test]
    fn test_core_error_converts() {
        let core = metronome_core::Error::unknown_partition_key("2021-05-05");
        let err: Error = core.into();
        assert!(matches!(
            err,
            Error::Core(metronome_core::Error::UnknownPartitionKey { .. })
        ));
    }
}
