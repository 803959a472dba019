//! Core utilities for the NextFinish event discovery engine
//!
//! This crate provides the shared plumbing used by every other crate:
//!
//! - **Error handling**: structured errors with codes, context and recovery suggestions
//! - **Configuration**: TOML-based configuration with defaults and validation
//! - **Rate limiting**: token buckets keyed by host, used to respect geocoder usage policies
//! - **Retry**: backoff policies and a circuit breaker for outbound calls
//!
//! # Example
//!
//! ```rust,no_run
//! use nextfinish_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("default radius: {} km", config.schema.search.default_radius_km);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod retry;

pub use error::{Error, ErrorCategory, ErrorCode, ErrorReport, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::rate_limit::{RateLimitConfig, RateLimiter};
    pub use crate::retry::{CircuitBreaker, CircuitBreakerConfig, RetryConfig};
}
