//! Observability infrastructure for Metronome.
//!
//! Structured logging with consistent spans: this module provides the
//! initialization helper and span constructors used by schedule evaluation.

use chrono::{DateTime, Utc};
use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs (for production).
    Json,
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `metronome_flow=debug`)
///
/// # Example
///
/// ```rust
/// use metronome_core::observability::{init_logging, LogFormat};
///
/// init_logging(LogFormat::Pretty);
/// ```
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Creates a span for one schedule tick evaluation.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use metronome_core::observability::tick_span;
///
/// let span = tick_span("daily_etl", Utc::now());
/// let _guard = span.enter();
/// // ... evaluate the tick
/// ```
#[must_use]
pub fn tick_span(schedule: &str, scheduled_for: DateTime<Utc>) -> Span {
    tracing::info_span!(
        "schedule_tick",
        schedule = schedule,
        scheduled_for = %scheduled_for.to_rfc3339(),
    )
}
