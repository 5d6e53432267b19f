//! Outbound request assembly.
//!
//! Pure data step: merges a fingerprint into an `http::HeaderMap` and parses
//! the target's full URL. No network access happens here.

use http::header::USER_AGENT;
use http::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::fingerprint::Fingerprint;
use crate::target::Target;
use crate::viewer::{PageViewerError, PageViewerResult};

/// One fully assembled outbound GET, consumed by a single fetch.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub url: Url,
    pub headers: HeaderMap,
}

/// Merge the fingerprint headers with the explicit User-Agent entry.
///
/// The agent string is inserted last so it always wins, even if the header
/// catalog ever grows a conflicting key.
pub fn build_request(
    target: &Target,
    fingerprint: &Fingerprint,
) -> PageViewerResult<RequestDescriptor> {
    let url = Url::parse(&target.full_url())?;

    let mut headers = HeaderMap::new();
    for (name, value) in &fingerprint.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| PageViewerError::InvalidHeader(name.clone()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| PageViewerError::InvalidHeader(name.clone()))?;
        headers.insert(header_name, header_value);
    }

    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&fingerprint.user_agent)
            .map_err(|_| PageViewerError::InvalidHeader("user-agent".into()))?,
    );

    Ok(RequestDescriptor { url, headers })
}
