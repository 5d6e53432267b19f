//! Session metrics collection.
//!
//! Aggregates view counts and latency percentiles for one viewer instance.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Aggregated statistics for one viewing session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub started_at: DateTime<Utc>,
    pub total_views: u64,
    pub successes: u64,
    pub failures: u64,
    pub average_latency: Option<Duration>,
    pub p95_latency: Option<Duration>,
    pub last_status: Option<u16>,
}

#[derive(Debug)]
struct MetricsState {
    started_at: DateTime<Utc>,
    total_views: u64,
    successes: u64,
    failures: u64,
    latencies: VecDeque<Duration>,
    max_window: usize,
    last_status: Option<u16>,
}

impl MetricsState {
    fn new(max_window: usize) -> Self {
        Self {
            started_at: Utc::now(),
            total_views: 0,
            successes: 0,
            failures: 0,
            latencies: VecDeque::with_capacity(max_window),
            max_window,
            last_status: None,
        }
    }

    fn latency_stats(&self) -> (Option<Duration>, Option<Duration>) {
        if self.latencies.is_empty() {
            return (None, None);
        }
        let mut samples: Vec<_> = self.latencies.iter().cloned().collect();
        samples.sort_unstable();
        let avg = samples.iter().map(|d| d.as_secs_f64()).sum::<f64>() / samples.len() as f64;
        let p95_index = ((samples.len() as f64 * 0.95).ceil() as usize).saturating_sub(1);
        (Some(Duration::from_secs_f64(avg)), Some(samples[p95_index]))
    }
}

/// Thread-safe metrics collector shared with the event layer.
#[derive(Clone, Debug)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsState>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsState::new(128))),
        }
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsState::new(window.max(16)))),
        }
    }

    /// Record one completed view; `status` is `None` for captured failures.
    pub fn record_view(&self, status: Option<u16>, latency: Duration) {
        let mut guard = self.inner.lock().expect("metrics lock poisoned");
        guard.total_views += 1;
        match status {
            Some(status) => {
                guard.successes += 1;
                guard.last_status = Some(status);
            }
            None => guard.failures += 1,
        }

        if guard.latencies.len() == guard.max_window {
            guard.latencies.pop_front();
        }
        guard.latencies.push_back(latency);
    }

    pub fn snapshot(&self) -> SessionStats {
        let guard = self.inner.lock().expect("metrics lock poisoned");
        let (average_latency, p95_latency) = guard.latency_stats();
        SessionStats {
            started_at: guard.started_at,
            total_views: guard.total_views,
            successes: guard.successes,
            failures: guard.failures,
            average_latency,
            p95_latency,
            last_status: guard.last_status,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
