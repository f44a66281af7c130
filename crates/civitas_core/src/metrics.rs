//! Performance metrics collection for the simulation.
//!
//! Provides structured logging and counters for monitoring the day clock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const DECISIONS_REQUESTED: &str = "decisions_requested";
pub const DECISIONS_FAILED: &str = "decisions_failed";
pub const MEETINGS_CANCELLED: &str = "meetings_cancelled";

/// Metrics collector for the day clock.
pub struct Metrics {
    day_count: AtomicU64,
    agent_count: AtomicU64,
    total_day_micros: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    log_interval: u64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(30)
    }
}

impl Metrics {
    /// Creates a collector that logs a summary every `log_interval` days (0 disables it).
    #[must_use]
    pub fn new(log_interval: u64) -> Self {
        Self {
            day_count: AtomicU64::new(0),
            agent_count: AtomicU64::new(0),
            total_day_micros: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            log_interval,
        }
    }

    /// Records a completed day with its wall-clock duration.
    pub fn record_day(&self, day: u64, duration: Duration, agents: usize, events: usize) {
        let days = self.day_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.agent_count.store(agents as u64, Ordering::Relaxed);
        self.total_day_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        if self.log_interval > 0 && days.is_multiple_of(self.log_interval) {
            tracing::info!(
                day = day,
                agents = agents,
                events = events,
                duration_ms = duration.as_millis() as u64,
                avg_day_ms = self.avg_day_duration().as_millis() as u64,
                decisions_requested = self.counter(DECISIONS_REQUESTED),
                decisions_failed = self.counter(DECISIONS_FAILED),
                meetings_cancelled = self.counter(MEETINGS_CANCELLED),
                "Simulation day"
            );
        }
    }

    /// Adds `by` to a named counter.
    pub fn add_to_counter(&self, name: &str, by: u64) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(by, Ordering::Relaxed);
    }

    pub fn increment_counter(&self, name: &str) {
        self.add_to_counter(name, 1);
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters.get(name).map_or(0, |c| c.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn day_count(&self) -> u64 {
        self.day_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn agent_count(&self) -> u64 {
        self.agent_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn avg_day_duration(&self) -> Duration {
        let days = self.day_count();
        if days == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(self.total_day_micros.load(Ordering::Relaxed) / days)
    }
}

/// Installs the global fmt subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new(10);
        assert_eq!(metrics.day_count(), 0);
        assert_eq!(metrics.avg_day_duration(), Duration::ZERO);
    }

    #[test]
    fn test_record_day() {
        let metrics = Metrics::new(0);
        metrics.record_day(1, Duration::from_millis(4), 10, 3);
        metrics.record_day(2, Duration::from_millis(6), 12, 5);
        assert_eq!(metrics.day_count(), 2);
        assert_eq!(metrics.agent_count(), 12);
        assert_eq!(metrics.avg_day_duration(), Duration::from_millis(5));
    }

    #[test]
    fn test_counters() {
        let metrics = Metrics::default();
        metrics.increment_counter(DECISIONS_FAILED);
        metrics.add_to_counter(DECISIONS_FAILED, 2);
        assert_eq!(metrics.counter(DECISIONS_FAILED), 3);
        assert_eq!(metrics.counter(MEETINGS_CANCELLED), 0);
    }
}
