//! # metronome-core
//!
//! Time-window partition primitives for the Metronome scheduling engine.
//!
//! This crate provides the foundational value types and the calendar
//! arithmetic everything above it depends on:
//!
//! - **Time Windows**: half-open `[start, end)` intervals with
//!   timezone-aware endpoints
//! - **Partition Schemes**: hourly/daily/weekly/monthly recurrences with
//!   sub-cadence offsets and closed-form boundary inversion
//! - **Error Types**: shared error definitions and result types
//! - **Observability**: structured logging initialization and span helpers
//!
//! Schedule derivation and run-request emission live in `metronome-flow`.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use metronome_core::prelude::*;
//!
//! let start = NaiveDate::from_ymd_opt(2021, 5, 5).unwrap();
//! let def = PartitionsDefinition::hourly(start).with_minute_offset(20);
//!
//! let now = Utc.with_ymd_and_hms(2021, 5, 5, 3, 0, 0).unwrap();
//! assert_eq!(
//!     def.get_partition_keys(now),
//!     vec!["2021-05-05-00:20", "2021-05-05-01:20"],
//! );
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod observability;
pub mod partition;
pub mod time_window;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use metronome_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::partition::{Cadence, Partition, PartitionsDefinition};
    pub use crate::time_window::TimeWindow;
}

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use observability::{LogFormat, init_logging, tick_span};
pub use partition::{Cadence, Partition, PartitionsDefinition};
pub use time_window::TimeWindow;
