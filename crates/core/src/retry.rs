//! Retry policies and circuit breaking for outbound calls
//!
//! The geocoder client consults these before every request:
//! - [`RetryConfig`] decides how many attempts a call gets and how long to back off
//! - [`CircuitBreaker`] stops hammering a service that keeps failing
//!
//! Interactive place resolution uses [`RetryConfig::none`]: a failed lookup is
//! reported to the user, who decides whether to search again. Coordinate
//! backfill runs unattended and uses [`RetryConfig::patient`].

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How often a call is attempted and how long to pause in between
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Pause before the second attempt
    pub first_backoff: Duration,
    /// No pause is longer than this
    pub backoff_cap: Duration,
    /// Each pause is this many times the previous one
    pub growth: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            first_backoff: Duration::from_millis(250),
            backoff_cap: Duration::from_secs(8),
            growth: 2.0,
        }
    }
}

impl RetryConfig {
    /// Single attempt, no retries
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            first_backoff: Duration::ZERO,
            backoff_cap: Duration::ZERO,
            growth: 1.0,
        }
    }

    /// Long pauses for unattended batch jobs
    #[must_use]
    pub fn patient() -> Self {
        Self {
            max_attempts: 4,
            first_backoff: Duration::from_secs(1),
            backoff_cap: Duration::from_secs(20),
            growth: 3.0,
        }
    }

    /// Pause before the zero-based `attempt`; the first attempt starts immediately
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let Some(retry) = attempt.checked_sub(1) else {
            return Duration::ZERO;
        };
        let factor = self.growth.powi(i32::try_from(retry).unwrap_or(i32::MAX));
        let secs = (self.first_backoff.as_secs_f64() * factor).min(self.backoff_cap.as_secs_f64());
        Duration::from_secs_f64(secs.max(0.0))
    }

    /// Pauses before each retry, in order
    pub fn backoffs(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts).map(|attempt| self.delay_for_attempt(attempt))
    }
}

/// Observable state of a [`CircuitBreaker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Calls flow normally
    Closed,
    /// Calls are rejected until the cooldown elapses
    Open,
    /// Trial calls decide whether to close again
    HalfOpen,
}

/// Thresholds for a [`CircuitBreaker`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Successful trial calls that close it again
    pub success_threshold: u32,
    /// How long the circuit stays open
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 1,
            cooldown: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed { failures: u32 },
    Open { since: Instant },
    HalfOpen { successes: u32 },
}

/// Opens after repeated failures so callers fail fast instead of waiting on a dead service
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    phase: Mutex<Phase>,
}

impl CircuitBreaker {
    /// A closed breaker
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            phase: Mutex::new(Phase::Closed { failures: 0 }),
        }
    }

    fn with_phase<T>(&self, f: impl FnOnce(&mut Phase) -> T) -> T {
        let mut phase = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut phase)
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.with_phase(|phase| match phase {
            Phase::Closed { .. } => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen { .. } => CircuitState::HalfOpen,
        })
    }

    /// Whether a call may go out now. An open circuit whose cooldown has
    /// elapsed moves to half-open and lets the call through.
    #[must_use]
    pub fn can_execute(&self) -> bool {
        let cooldown = self.config.cooldown;
        self.with_phase(|phase| match *phase {
            Phase::Open { since } if since.elapsed() < cooldown => false,
            Phase::Open { .. } => {
                *phase = Phase::HalfOpen { successes: 0 };
                true
            }
            Phase::Closed { .. } | Phase::HalfOpen { .. } => true,
        })
    }

    /// Time left before an open circuit admits a trial call
    #[must_use]
    pub fn remaining_cooldown(&self) -> Option<Duration> {
        let cooldown = self.config.cooldown;
        self.with_phase(|phase| match *phase {
            Phase::Open { since } => Some(cooldown.saturating_sub(since.elapsed())),
            _ => None,
        })
    }

    /// Record a call that succeeded
    pub fn record_success(&self) {
        let needed = self.config.success_threshold;
        self.with_phase(|phase| {
            *phase = match *phase {
                Phase::HalfOpen { successes } if successes + 1 < needed => Phase::HalfOpen {
                    successes: successes + 1,
                },
                Phase::Open { since } => Phase::Open { since },
                _ => Phase::Closed { failures: 0 },
            };
        });
    }

    /// Record a call that failed
    pub fn record_failure(&self) {
        let threshold = self.config.failure_threshold;
        self.with_phase(|phase| {
            *phase = match *phase {
                Phase::Closed { failures } if failures + 1 < threshold => Phase::Closed {
                    failures: failures + 1,
                },
                Phase::Open { since } => Phase::Open { since },
                _ => Phase::Open { since: Instant::now() },
            };
        });
    }

    /// Close the circuit and forget past failures
    pub fn reset(&self) {
        self.with_phase(|phase| *phase = Phase::Closed { failures: 0 });
    }
}
