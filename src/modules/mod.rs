//! Cross-cutting services module
//!
//! Observability around the view loop: structured events and session
//! metrics.

pub mod events;
pub mod metrics;

// Re-export commonly used types
pub use events::{
    EventDispatcher,
    EventHandler,
    LoggingHandler,
    MetricsHandler,
    PreViewEvent,
    ViewEvent,
    ViewOutcomeEvent,
};
pub use metrics::{MetricsCollector, SessionStats};
