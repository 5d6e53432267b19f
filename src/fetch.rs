//! The fetch boundary: one descriptor in, one captured result out.
//!
//! This is the system's sole error boundary. Whatever the transport raises
//! (connection refused, DNS failure, timeout, non-2xx status, undecodable
//! body) is converted into a [`FetchResult::Failure`]; nothing propagates
//! past [`Fetcher::fetch`].

use std::sync::Arc;

use crate::request::RequestDescriptor;
use crate::transport::PageTransport;

/// A successfully viewed page.
#[derive(Debug, Clone)]
pub struct PageView {
    pub status: u16,
    /// Body decoded in full, then truncated to the configured preview limit.
    pub preview: String,
}

/// A captured transport fault.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub description: String,
}

/// Outcome of a single view. Exactly one of page content or a failure
/// description, never both.
#[derive(Debug, Clone)]
pub enum FetchResult {
    Success(PageView),
    Failure(FetchFailure),
}

impl FetchResult {
    pub(crate) fn failure(description: impl Into<String>) -> Self {
        FetchResult::Failure(FetchFailure {
            description: description.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FetchResult::Failure(_))
    }

    /// HTTP status for successful views.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchResult::Success(view) => Some(view.status),
            FetchResult::Failure(_) => None,
        }
    }

    /// Display text: the preview on success, the failure description
    /// otherwise.
    pub fn display(&self) -> &str {
        match self {
            FetchResult::Success(view) => &view.preview,
            FetchResult::Failure(failure) => &failure.description,
        }
    }
}

/// Executes descriptors against the transport collaborator.
pub struct Fetcher {
    transport: Arc<dyn PageTransport>,
    preview_limit: usize,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn PageTransport>, preview_limit: usize) -> Self {
        Self {
            transport,
            preview_limit,
        }
    }

    pub async fn fetch(&self, descriptor: &RequestDescriptor) -> FetchResult {
        log::debug!("-> GET {}", descriptor.url);

        let response = match self
            .transport
            .get(&descriptor.url, &descriptor.headers)
            .await
        {
            Ok(response) => response,
            Err(err) => return FetchResult::failure(err.to_string()),
        };

        let text = match response.text() {
            Ok(text) => text,
            Err(err) => return FetchResult::failure(err.to_string()),
        };

        let preview: String = text.chars().take(self.preview_limit).collect();
        FetchResult::Success(PageView {
            status: response.status,
            preview,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_accessors_match_variants() {
        let ok = FetchResult::Success(PageView {
            status: 200,
            preview: "hello".into(),
        });
        assert!(ok.is_success());
        assert_eq!(ok.status(), Some(200));
        assert_eq!(ok.display(), "hello");

        let err = FetchResult::failure("connection refused");
        assert!(err.is_failure());
        assert_eq!(err.status(), None);
        assert_eq!(err.display(), "connection refused");
    }
}
