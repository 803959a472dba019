//! Resilience components used by the client
//!
//! Re-exported from `nextfinish-core` for convenience.

pub use nextfinish_core::rate_limit::{RateLimitConfig, RateLimitStatus, RateLimiter};
pub use nextfinish_core::retry::{CircuitBreaker, CircuitBreakerConfig, CircuitState, RetryConfig};
