//! Logging, metrics and timing for NextFinish
//!
//! This crate provides:
//! - Structured logging with tracing (compact or JSON lines on stderr)
//! - An in-process metrics registry with a serializable snapshot
//! - Timers that record durations into histograms

mod logging;
mod registry;
mod timer;

pub use logging::{init, init_with_config, LogFormat, TelemetryConfig};
pub use registry::{metrics, MetricsRegistry, MetricsSnapshot, Summary};
pub use timer::Timer;

use once_cell::sync::Lazy;
use uuid::Uuid;

static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Metric names recorded by the discovery engine and CLI
pub mod names {
    /// Place searches submitted
    pub const SUBMISSIONS: &str = "discovery.submissions";
    /// Resolutions applied to the session
    pub const APPLIED: &str = "discovery.resolutions_applied";
    /// Resolutions discarded as superseded
    pub const STALE: &str = "discovery.resolutions_stale";
    /// Resolutions that ended in a failure state
    pub const FAILED: &str = "discovery.resolutions_failed";
    /// Resolver round-trip time in milliseconds
    pub const RESOLVE_MS: &str = "discovery.resolve_ms";
    /// Size of the most recent result set
    pub const RESULT_COUNT: &str = "discovery.result_count";
    /// Events given coordinates by a backfill run
    pub const BACKFILL_UPDATED: &str = "backfill.updated";
}

/// Random id of this process, attached to the first log line and metric exports
pub fn session_id() -> &'static str {
    &SESSION_ID
}
