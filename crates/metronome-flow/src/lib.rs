//! # metronome-flow
//!
//! Schedule derivation for the Metronome scheduling engine.
//!
//! This crate turns a partition scheme from `metronome-core` into a recurring
//! trigger:
//!
//! - **Partitioned Config**: binds a scheme to a user function producing one
//!   run-config payload per partition window
//! - **Schedule Derivation**: generates the cron expression and the tick
//!   evaluator; every firing resolves exactly one fully-elapsed partition
//! - **Run Requests**: the unit of work handed to the execution engine
//! - **Repository**: explicit registration of schedules, no global state
//!
//! ## Guarantees
//!
//! - **Deterministic**: the same firing instant always resolves the same
//!   partition and payload
//! - **Lag-safe**: a tick targets the partition that has already closed, so
//!   its data is fully materialized when the run starts
//! - **Fail-fast**: selector and offset misconfiguration is rejected when the
//!   schedule is built, never at tick time
//!
//! ## Example
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use metronome_core::PartitionsDefinition;
//! use metronome_flow::config::{PartitionedConfig, RunConfig};
//! use metronome_flow::schedule::ScheduleBuilder;
//!
//! # fn main() -> metronome_flow::error::Result<()> {
//! let start = NaiveDate::from_ymd_opt(2021, 5, 5).unwrap();
//! let config = PartitionedConfig::new(PartitionsDefinition::daily(start), |window| {
//!     let mut run_config = RunConfig::new();
//!     run_config.insert("start".into(), window.start().to_rfc3339().into());
//!     run_config.insert("end".into(), window.end().to_rfc3339().into());
//!     run_config
//! });
//!
//! let schedule = ScheduleBuilder::new("daily_etl", config)
//!     .minute_of_hour(30)
//!     .hour_of_day(9)
//!     .build()?;
//! assert_eq!(schedule.cron_schedule(), "30 9 * * *");
//!
//! let tick = Utc.with_ymd_and_hms(2021, 5, 8, 9, 30, 0).unwrap();
//! let request = schedule.evaluate_tick(tick)?.expect("a partition has elapsed");
//! assert_eq!(request.partition_key(), Some("2021-05-07"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod repository;
pub mod run_request;
pub mod schedule;

pub use config::{PartitionedConfig, RunConfig, RunConfigFn};
pub use error::{Error, Result};
pub use repository::ScheduleRepository;
pub use run_request::{PARTITION_TAG, RunRequest};
pub use schedule::{ScheduleBuilder, ScheduleDefinition};
