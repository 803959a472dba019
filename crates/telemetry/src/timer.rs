use crate::registry::metrics;
use std::time::{Duration, Instant};

/// Measures one operation and records it, in milliseconds, into a histogram.
///
/// Records exactly once: on [`Timer::stop`] or, failing that, on drop.
#[derive(Debug)]
pub struct Timer {
    name: &'static str,
    started: Option<Instant>,
}

impl Timer {
    /// Start timing
    pub fn start(name: &'static str) -> Self {
        Self {
            name,
            started: Some(Instant::now()),
        }
    }

    /// Stop, record and return the elapsed time
    pub fn stop(mut self) -> Duration {
        let elapsed = self.finish();
        tracing::trace!(metric = self.name, elapsed_ms = elapsed.as_millis(), "Timer stopped");
        elapsed
    }

    fn finish(&mut self) -> Duration {
        let Some(started) = self.started.take() else {
            return Duration::ZERO;
        };
        let elapsed = started.elapsed();
        metrics().observe(self.name, elapsed.as_secs_f64() * 1000.0);
        elapsed
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.finish();
    }
}
