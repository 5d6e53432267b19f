//! # pageviewer-rs
//!
//! A repeated page "viewer": issues sequential HTTP(S) GET requests against
//! a configured address, presenting a freshly randomized browser fingerprint
//! (User-Agent plus a randomized subset of common request headers) on every
//! visit, with a configurable pause between views.
//!
//! Each fetch is isolated: a transport fault becomes a captured failure
//! result and the loop carries on with the remaining views.
//!
//! ## Example
//!
//! ```no_run
//! use pageviewer_rs::{PageViewer, Target};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let viewer = PageViewer::new(Target::new("www.example.com", true))?;
//!     let session = viewer.view_pages(4, Duration::from_millis(1000), true).await;
//!     println!("{} of {} views succeeded", session.successes(), session.len());
//!     Ok(())
//! }
//! ```

mod viewer;

pub mod fetch;
pub mod fingerprint;
pub mod modules;
pub mod request;
pub mod target;
pub mod transport;

pub use crate::viewer::{
    DEFAULT_PREVIEW_LIMIT,
    PageViewer,
    PageViewerBuilder,
    PageViewerConfig,
    PageViewerError,
    PageViewerResult,
    ViewSession,
};

pub use crate::fetch::{FetchFailure, FetchResult, Fetcher, PageView};

pub use crate::fingerprint::{
    BrowserFamily,
    Fingerprint,
    FingerprintGenerator,
    FreshnessPolicy,
    HeaderSetGenerator,
    UserAgentGenerator,
};

pub use crate::request::{RequestDescriptor, build_request};

pub use crate::target::Target;

pub use crate::transport::{
    PageTransport,
    ReqwestPageTransport,
    TransportError,
    TransportResponse,
};

pub use crate::modules::{
    EventDispatcher,
    EventHandler,
    LoggingHandler,
    MetricsCollector,
    MetricsHandler,
    PreViewEvent,
    SessionStats,
    ViewEvent,
    ViewOutcomeEvent,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
