//! In-process metrics
//!
//! Counters and gauges are plain `u64`s. Histograms keep running totals plus
//! the most recent samples, from which percentiles are estimated.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

static METRICS: Lazy<MetricsRegistry> = Lazy::new(MetricsRegistry::new);

/// Samples kept per histogram for percentile estimates
const RECENT_SAMPLES: usize = 1024;

/// The process-wide registry
pub fn metrics() -> &'static MetricsRegistry {
    &METRICS
}

#[derive(Debug, Default)]
struct Samples {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    recent: VecDeque<f64>,
}

impl Samples {
    fn observe(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;

        if self.recent.len() == RECENT_SAMPLES {
            self.recent.pop_front();
        }
        self.recent.push_back(value);
    }

    fn summary(&self) -> Summary {
        let mut sorted: Vec<f64> = self.recent.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        Summary {
            count: self.count,
            mean: if self.count == 0 { 0.0 } else { self.sum / self.count as f64 },
            min: self.min,
            max: self.max,
            p50: nearest_rank(&sorted, 0.50),
            p95: nearest_rank(&sorted, 0.95),
            p99: nearest_rank(&sorted, 0.99),
        }
    }
}

fn nearest_rank(sorted: &[f64], quantile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (quantile * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Aggregate view of one histogram. Percentiles cover recent samples only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    /// Samples observed since start
    pub count: u64,
    /// Mean of all samples
    pub mean: f64,
    /// Smallest sample
    pub min: f64,
    /// Largest sample
    pub max: f64,
    /// Median
    pub p50: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
}

/// Point-in-time copy of every metric
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Process session id
    pub session_id: String,
    /// Registry creation time
    pub started_at: DateTime<Utc>,
    /// Seconds since creation
    pub uptime_secs: u64,
    /// Counter values by name
    pub counters: BTreeMap<&'static str, u64>,
    /// Last gauge values by name
    pub gauges: BTreeMap<&'static str, u64>,
    /// Histogram summaries by name
    pub histograms: BTreeMap<&'static str, Summary>,
}

#[derive(Debug, Default)]
struct Tables {
    counters: BTreeMap<&'static str, u64>,
    gauges: BTreeMap<&'static str, u64>,
    histograms: BTreeMap<&'static str, Samples>,
}

/// Counters, gauges and histograms keyed by static names
#[derive(Debug)]
pub struct MetricsRegistry {
    tables: Mutex<Tables>,
    started: Instant,
    started_at: DateTime<Utc>,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    /// An empty registry. Most code should use [`metrics`].
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    // A panic while holding the lock cannot leave the tables half-updated
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add one to a counter
    pub fn increment(&self, name: &'static str) {
        self.increment_by(name, 1);
    }

    /// Add to a counter
    pub fn increment_by(&self, name: &'static str, value: u64) {
        let mut tables = self.tables();
        let counter = tables.counters.entry(name).or_default();
        *counter = counter.saturating_add(value);
    }

    /// Current counter value, zero if never incremented
    pub fn counter(&self, name: &str) -> u64 {
        self.tables().counters.get(name).copied().unwrap_or(0)
    }

    /// Replace a gauge value
    pub fn gauge(&self, name: &'static str, value: u64) {
        self.tables().gauges.insert(name, value);
    }

    /// Last gauge value
    pub fn gauge_value(&self, name: &str) -> Option<u64> {
        self.tables().gauges.get(name).copied()
    }

    /// Record one histogram sample
    pub fn observe(&self, name: &'static str, value: f64) {
        if value.is_finite() {
            self.tables().histograms.entry(name).or_default().observe(value);
        }
    }

    /// Summary of a histogram
    pub fn summary(&self, name: &str) -> Option<Summary> {
        self.tables().histograms.get(name).map(Samples::summary)
    }

    /// Seconds since the registry was created
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Copy every metric
    pub fn snapshot(&self) -> MetricsSnapshot {
        let tables = self.tables();
        MetricsSnapshot {
            session_id: crate::session_id().to_string(),
            started_at: self.started_at,
            uptime_secs: self.uptime_secs(),
            counters: tables.counters.clone(),
            gauges: tables.gauges.clone(),
            histograms: tables
                .histograms
                .iter()
                .map(|(name, samples)| (*name, samples.summary()))
                .collect(),
        }
    }

    /// The snapshot as JSON
    pub fn export_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or_default()
    }
}
