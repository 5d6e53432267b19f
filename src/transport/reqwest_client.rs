//! Reqwest-based implementation of the [`PageTransport`] trait.
//!
//! Thin adapter around `reqwest::Client`. Redirect handling and TLS stay
//! with reqwest; no cookie store is configured, so every view stands alone.

use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use url::Url;

use super::{PageTransport, TransportError, TransportResponse};

/// Reqwest-backed transport used for real page views.
pub struct ReqwestPageTransport {
    client: reqwest::Client,
}

impl ReqwestPageTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| TransportError::Transport(err.to_string()))?;
        Ok(Self { client })
    }

    /// Client with a request timeout. The timeout lives here, on the
    /// transport, and nowhere else.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Transport(err.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageTransport for ReqwestPageTransport {
    async fn get(&self, url: &Url, headers: &HeaderMap) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url.as_str())
            .headers(headers.clone())
            .send()
            .await
            .map_err(|err| TransportError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let response_headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::Transport(err.to_string()))?;

        Ok(TransportResponse {
            status: status.as_u16(),
            headers: response_headers,
            body,
        })
    }
}
