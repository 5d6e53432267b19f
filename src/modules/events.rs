//! Event hooks around each view.
//!
//! Provides structured events for logging and metrics without coupling the
//! loop to either.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use super::metrics::MetricsCollector;

/// Emitted just before a descriptor is fetched.
#[derive(Debug, Clone)]
pub struct PreViewEvent {
    /// 1-indexed position within the session.
    pub index: usize,
    pub url: String,
    pub user_agent: String,
    pub header_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Emitted once a view completed, successfully or not.
#[derive(Debug, Clone)]
pub struct ViewOutcomeEvent {
    pub index: usize,
    pub url: String,
    pub success: bool,
    /// HTTP status for successful views, `None` for captured failures.
    pub status: Option<u16>,
    pub latency: Duration,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum ViewEvent {
    PreView(PreViewEvent),
    Outcome(ViewOutcomeEvent),
}

/// Trait implemented by event handlers.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &ViewEvent);
}

/// Dispatcher that broadcasts events to registered handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn register_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn dispatch(&self, event: ViewEvent) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

/// Logs events using the `log` crate.
#[derive(Debug)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn handle(&self, event: &ViewEvent) {
        match event {
            ViewEvent::PreView(pre) => {
                log::debug!(
                    "-> view {} GET {} as {} ({} headers)",
                    pre.index,
                    pre.url,
                    pre.user_agent,
                    pre.header_count
                );
            }
            ViewEvent::Outcome(outcome) if outcome.success => {
                log::debug!(
                    "<- view {} {} -> {} ({:.2}s)",
                    outcome.index,
                    outcome.url,
                    outcome.status.unwrap_or_default(),
                    outcome.latency.as_secs_f64()
                );
            }
            ViewEvent::Outcome(outcome) => {
                log::warn!(
                    "view {} {} failed after {:.2}s",
                    outcome.index,
                    outcome.url,
                    outcome.latency.as_secs_f64()
                );
            }
        }
    }
}

/// Feeds view outcomes into the metrics collector.
#[derive(Clone, Debug)]
pub struct MetricsHandler {
    metrics: MetricsCollector,
}

impl MetricsHandler {
    pub fn new(metrics: MetricsCollector) -> Self {
        Self { metrics }
    }
}

impl EventHandler for MetricsHandler {
    fn handle(&self, event: &ViewEvent) {
        if let ViewEvent::Outcome(outcome) = event {
            self.metrics.record_view(outcome.status, outcome.latency);
        }
    }
}
