//! High level viewer orchestration.
//!
//! Wires the fingerprint generators, the request builder, the fetch boundary
//! and the observability services into a page viewer that runs bounded,
//! sequential view loops with a fixed pause between iterations.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::fetch::{FetchResult, Fetcher};
use crate::fingerprint::{Fingerprint, FingerprintGenerator, FreshnessPolicy};
use crate::modules::events::{
	EventDispatcher, LoggingHandler, MetricsHandler, PreViewEvent, ViewEvent, ViewOutcomeEvent,
};
use crate::modules::metrics::{MetricsCollector, SessionStats};
use crate::request::build_request;
use crate::target::Target;
use crate::transport::{PageTransport, ReqwestPageTransport, TransportError};

/// Result alias used across the orchestration layer.
pub type PageViewerResult<T> = Result<T, PageViewerError>;

/// High-level error surfaced while assembling a viewer or a request.
/// Faults during a fetch never surface here; they become failed views.
#[derive(Debug, Error)]
pub enum PageViewerError {
	#[error("transport setup failed: {0}")]
	Transport(#[from] TransportError),
	#[error("url parse error: {0}")]
	Url(#[from] url::ParseError),
	#[error("header conversion failed: {0}")]
	InvalidHeader(String),
}

/// Default preview truncation, in characters.
pub const DEFAULT_PREVIEW_LIMIT: usize = 500;

/// Viewer configuration used by the builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageViewerConfig {
	/// Whether fingerprints are minted per view or once per session.
	pub freshness: FreshnessPolicy,
	/// Preview truncation, in characters, applied after the body is decoded.
	pub preview_limit: usize,
	pub enable_metrics: bool,
	/// Seed for the fingerprint generators; `None` draws from entropy.
	pub seed: Option<u64>,
	/// Optional per-request timeout, configured on the transport itself.
	pub request_timeout: Option<Duration>,
}

impl Default for PageViewerConfig {
	fn default() -> Self {
		Self {
			freshness: FreshnessPolicy::PerView,
			preview_limit: DEFAULT_PREVIEW_LIMIT,
			enable_metrics: true,
			seed: None,
			request_timeout: None,
		}
	}
}

impl PageViewerConfig {
	/// Load a configuration from its JSON representation.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}

/// Fluent builder for [`PageViewer`].
pub struct PageViewerBuilder {
	config: PageViewerConfig,
	target: Target,
	transport: Option<Arc<dyn PageTransport>>,
	cancel: Option<CancellationToken>,
}

impl PageViewerBuilder {
	pub fn new(target: Target) -> Self {
		Self {
			config: PageViewerConfig::default(),
			target,
			transport: None,
			cancel: None,
		}
	}

	pub fn with_config(mut self, config: PageViewerConfig) -> Self {
		self.config = config;
		self
	}

	pub fn with_freshness(mut self, policy: FreshnessPolicy) -> Self {
		self.config.freshness = policy;
		self
	}

	pub fn with_preview_limit(mut self, limit: usize) -> Self {
		self.config.preview_limit = limit;
		self
	}

	pub fn with_seed(mut self, seed: u64) -> Self {
		self.config.seed = Some(seed);
		self
	}

	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = Some(timeout);
		self
	}

	pub fn disable_metrics(mut self) -> Self {
		self.config.enable_metrics = false;
		self
	}

	/// Replace the reqwest transport, e.g. with a stub in tests.
	pub fn with_transport(mut self, transport: Arc<dyn PageTransport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Cooperative cancellation, checked between iterations only; a fetch
	/// already in flight always completes.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancel = Some(token);
		self
	}

	pub fn build(self) -> PageViewerResult<PageViewer> {
		PageViewer::from_builder(self)
	}
}

/// Ordered record of one viewing run. Append-only while the loop runs,
/// handed to the caller afterwards, never persisted.
#[derive(Debug)]
pub struct ViewSession {
	started_at: DateTime<Utc>,
	results: Vec<FetchResult>,
}

impl ViewSession {
	fn new(capacity: usize) -> Self {
		Self {
			started_at: Utc::now(),
			results: Vec::with_capacity(capacity),
		}
	}

	fn push(&mut self, result: FetchResult) {
		self.results.push(result);
	}

	pub fn started_at(&self) -> DateTime<Utc> {
		self.started_at
	}

	pub fn len(&self) -> usize {
		self.results.len()
	}

	pub fn is_empty(&self) -> bool {
		self.results.is_empty()
	}

	pub fn results(&self) -> &[FetchResult] {
		&self.results
	}

	pub fn successes(&self) -> usize {
		self.results.iter().filter(|r| r.is_success()).count()
	}

	pub fn failures(&self) -> usize {
		self.results.iter().filter(|r| r.is_failure()).count()
	}
}

/// Randomized state guarded behind the viewer's inner lock.
struct ViewerInner {
	generator: FingerprintGenerator,
	session_fingerprint: Option<Fingerprint>,
}

impl ViewerInner {
	fn fingerprint(&mut self, policy: FreshnessPolicy) -> Fingerprint {
		match policy {
			FreshnessPolicy::PerView => self.generator.generate(),
			FreshnessPolicy::PerSession => self
				.session_fingerprint
				.get_or_insert_with(|| self.generator.generate())
				.clone(),
		}
	}
}

/// Main viewer orchestrator.
pub struct PageViewer {
	config: PageViewerConfig,
	target: Target,
	fetcher: Fetcher,
	metrics: Option<MetricsCollector>,
	events: Arc<EventDispatcher>,
	cancel: Option<CancellationToken>,
	inner: Mutex<ViewerInner>,
}

impl PageViewer {
	/// Construct a viewer with default configuration.
	pub fn new(target: Target) -> PageViewerResult<Self> {
		PageViewer::builder(target).build()
	}

	/// Obtain a builder to customise the viewer instance.
	pub fn builder(target: Target) -> PageViewerBuilder {
		PageViewerBuilder::new(target)
	}

	fn from_builder(builder: PageViewerBuilder) -> PageViewerResult<Self> {
		let PageViewerBuilder {
			config,
			target,
			transport,
			cancel,
		} = builder;

		let transport: Arc<dyn PageTransport> = match transport {
			Some(transport) => transport,
			None => match config.request_timeout {
				Some(timeout) => Arc::new(ReqwestPageTransport::with_timeout(timeout)?),
				None => Arc::new(ReqwestPageTransport::new()?),
			},
		};

		let generator = match config.seed {
			Some(seed) => FingerprintGenerator::from_seed(seed),
			None => FingerprintGenerator::new(),
		};

		let metrics = config.enable_metrics.then(MetricsCollector::new);

		let mut events = EventDispatcher::new();
		events.register_handler(Arc::new(LoggingHandler));
		if let Some(ref collector) = metrics {
			events.register_handler(Arc::new(MetricsHandler::new(collector.clone())));
		}

		let fetcher = Fetcher::new(transport, config.preview_limit);

		Ok(Self {
			config,
			target,
			fetcher,
			metrics,
			events: Arc::new(events),
			cancel,
			inner: Mutex::new(ViewerInner {
				generator,
				session_fingerprint: None,
			}),
		})
	}

	pub fn target(&self) -> &Target {
		&self.target
	}

	pub fn config(&self) -> &PageViewerConfig {
		&self.config
	}

	/// Session statistics, if metrics collection is enabled.
	pub fn metrics_snapshot(&self) -> Option<SessionStats> {
		self.metrics.as_ref().map(MetricsCollector::snapshot)
	}

	/// Perform a single view.
	pub async fn view_page(&self) -> FetchResult {
		self.view_once(1).await
	}

	/// Run `views` sequential fetches, pausing `delay` between iterations.
	///
	/// A failed fetch contributes a failure result but never aborts the
	/// remaining iterations. `views = 0` returns an empty session with zero
	/// fetches and zero pauses. When `verbose`, each result is echoed as a
	/// 1-indexed progress line.
	pub async fn view_pages(&self, views: usize, delay: Duration, verbose: bool) -> ViewSession {
		let mut session = ViewSession::new(views);

		for index in 1..=views {
			if let Some(token) = &self.cancel
				&& token.is_cancelled()
			{
				log::info!("view loop cancelled after {} of {} views", index - 1, views);
				break;
			}

			let result = self.view_once(index).await;
			if verbose {
				println!("[{index}:] {}", result.display());
			}
			session.push(result);

			if index < views && !delay.is_zero() {
				sleep(delay).await;
			}
		}

		session
	}

	async fn view_once(&self, index: usize) -> FetchResult {
		let fingerprint = {
			let mut guard = self.inner.lock().await;
			guard.fingerprint(self.config.freshness)
		};

		let descriptor = match build_request(&self.target, &fingerprint) {
			Ok(descriptor) => descriptor,
			Err(err) => {
				// Assembly faults are reported like any other failed view.
				self.events.dispatch(ViewEvent::Outcome(ViewOutcomeEvent {
					index,
					url: self.target.full_url(),
					success: false,
					status: None,
					latency: Duration::ZERO,
					timestamp: Utc::now(),
				}));
				return FetchResult::failure(err.to_string());
			}
		};

		self.events.dispatch(ViewEvent::PreView(PreViewEvent {
			index,
			url: descriptor.url.to_string(),
			user_agent: fingerprint.user_agent.clone(),
			header_count: descriptor.headers.len(),
			timestamp: Utc::now(),
		}));

		let started = Instant::now();
		let result = self.fetcher.fetch(&descriptor).await;
		let latency = started.elapsed();

		self.events.dispatch(ViewEvent::Outcome(ViewOutcomeEvent {
			index,
			url: descriptor.url.to_string(),
			success: result.is_success(),
			status: result.status(),
			latency,
			timestamp: Utc::now(),
		}));

		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::transport::TransportResponse;
	use async_trait::async_trait;
	use bytes::Bytes;
	use http::HeaderMap;
	use http::header::USER_AGENT;
	use std::collections::VecDeque;
	use std::sync::Mutex as StdMutex;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use url::Url;

	fn canned_response(body: &str) -> TransportResponse {
		TransportResponse {
			status: 200,
			headers: HeaderMap::new(),
			body: Bytes::from(body.to_string()),
		}
	}

	/// Replays queued outcomes; falls back to a canned success when drained.
	struct StubTransport {
		calls: AtomicUsize,
		seen_agents: StdMutex<Vec<String>>,
		queue: StdMutex<VecDeque<Result<TransportResponse, TransportError>>>,
	}

	impl StubTransport {
		fn always_ok() -> Self {
			Self {
				calls: AtomicUsize::new(0),
				seen_agents: StdMutex::new(Vec::new()),
				queue: StdMutex::new(VecDeque::new()),
			}
		}

		fn scripted(outcomes: Vec<Result<TransportResponse, TransportError>>) -> Self {
			Self {
				calls: AtomicUsize::new(0),
				seen_agents: StdMutex::new(Vec::new()),
				queue: StdMutex::new(outcomes.into()),
			}
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}

	#[async_trait]
	impl PageTransport for StubTransport {
		async fn get(
			&self,
			_url: &Url,
			headers: &HeaderMap,
		) -> Result<TransportResponse, TransportError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			if let Some(agent) = headers.get(USER_AGENT) {
				self.seen_agents
					.lock()
					.unwrap()
					.push(agent.to_str().unwrap_or_default().to_string());
			}
			self.queue
				.lock()
				.unwrap()
				.pop_front()
				.unwrap_or_else(|| Ok(canned_response("stub page body")))
		}
	}

	fn viewer_with(transport: Arc<StubTransport>) -> PageViewer {
		PageViewer::builder(Target::new("example.com", false))
			.with_seed(7)
			.with_transport(transport)
			.build()
			.unwrap()
	}

	#[tokio::test]
	async fn zero_views_yield_empty_session_and_no_fetches() {
		let transport = Arc::new(StubTransport::always_ok());
		let viewer = viewer_with(transport.clone());

		let session = viewer.view_pages(0, Duration::ZERO, false).await;
		assert!(session.is_empty());
		assert_eq!(transport.calls(), 0);
	}

	#[tokio::test]
	async fn three_views_collect_the_stub_content() {
		let transport = Arc::new(StubTransport::always_ok());
		let viewer = viewer_with(transport.clone());

		let session = viewer.view_pages(3, Duration::ZERO, false).await;
		assert_eq!(session.len(), 3);
		assert_eq!(session.successes(), 3);
		for result in session.results() {
			assert_eq!(result.display(), "stub page body");
			assert_eq!(result.status(), Some(200));
		}
		assert_eq!(transport.calls(), 3);
	}

	#[tokio::test]
	async fn a_failed_fetch_does_not_abort_the_loop() {
		let transport = Arc::new(StubTransport::scripted(vec![
			Err(TransportError::Transport("connection refused".into())),
			Ok(canned_response("second page")),
		]));
		let viewer = viewer_with(transport.clone());

		let session = viewer.view_pages(2, Duration::ZERO, false).await;
		assert_eq!(session.len(), 2);
		assert!(session.results()[0].is_failure());
		assert!(session.results()[1].is_success());
		assert_eq!(session.results()[1].display(), "second page");
	}

	#[tokio::test]
	async fn per_session_policy_reuses_one_fingerprint() {
		let transport = Arc::new(StubTransport::always_ok());
		let viewer = PageViewer::builder(Target::new("example.com", false))
			.with_seed(7)
			.with_freshness(FreshnessPolicy::PerSession)
			.with_transport(transport.clone())
			.build()
			.unwrap();

		viewer.view_pages(3, Duration::ZERO, false).await;
		let agents = transport.seen_agents.lock().unwrap();
		assert_eq!(agents.len(), 3);
		assert!(agents.iter().all(|agent| agent == &agents[0]));
	}

	#[tokio::test]
	async fn every_request_carries_a_user_agent() {
		let transport = Arc::new(StubTransport::always_ok());
		let viewer = viewer_with(transport.clone());

		viewer.view_pages(4, Duration::ZERO, false).await;
		let agents = transport.seen_agents.lock().unwrap();
		assert_eq!(agents.len(), 4);
		assert!(agents.iter().all(|agent| !agent.is_empty()));
	}

	#[tokio::test]
	async fn metrics_track_the_session() {
		let transport = Arc::new(StubTransport::scripted(vec![
			Ok(canned_response("one")),
			Err(TransportError::Transport("timeout".into())),
		]));
		let viewer = viewer_with(transport);

		viewer.view_pages(2, Duration::ZERO, false).await;
		let stats = viewer.metrics_snapshot().unwrap();
		assert_eq!(stats.total_views, 2);
		assert_eq!(stats.successes, 1);
		assert_eq!(stats.failures, 1);
		assert_eq!(stats.last_status, Some(200));
	}

	#[tokio::test]
	async fn cancellation_is_honoured_between_iterations() {
		let transport = Arc::new(StubTransport::always_ok());
		let token = CancellationToken::new();
		token.cancel();

		let viewer = PageViewer::builder(Target::new("example.com", false))
			.with_transport(transport.clone())
			.with_cancellation(token)
			.build()
			.unwrap();

		let session = viewer.view_pages(5, Duration::ZERO, false).await;
		assert!(session.is_empty());
		assert_eq!(transport.calls(), 0);
	}

	#[tokio::test]
	async fn preview_is_truncated_to_the_configured_limit() {
		let long_body = "x".repeat(2000);
		let transport = Arc::new(StubTransport::scripted(vec![Ok(canned_response(
			&long_body,
		))]));
		let viewer = PageViewer::builder(Target::new("example.com", false))
			.with_transport(transport)
			.build()
			.unwrap();

		let result = viewer.view_page().await;
		assert_eq!(result.display().chars().count(), DEFAULT_PREVIEW_LIMIT);
	}

	#[test]
	fn config_loads_from_json() {
		let config = PageViewerConfig::from_json(
			r#"{"freshness": "per_session", "preview_limit": 100, "seed": 3}"#,
		)
		.unwrap();
		assert_eq!(config.freshness, FreshnessPolicy::PerSession);
		assert_eq!(config.preview_limit, 100);
		assert_eq!(config.seed, Some(3));
		assert!(config.enable_metrics);
	}
}
