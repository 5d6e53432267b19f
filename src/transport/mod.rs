//! HTTP transport seam.
//!
//! The viewer core talks to the network through the [`PageTransport`] trait
//! so the loop can be exercised against stubs. The production implementation
//! lives in [`reqwest_client`].

pub mod reqwest_client;

pub use reqwest_client::ReqwestPageTransport;

use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderMap;
use thiserror::Error;
use url::Url;

/// Faults surfaced by a transport implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("http status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("body decode failed: {0}")]
    Decode(String),
}

/// Response handed back across the transport seam. Always a success status;
/// everything else arrives as a [`TransportError`].
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    /// Body decoded as UTF-8 text.
    pub fn text(&self) -> Result<String, TransportError> {
        String::from_utf8(self.body.to_vec()).map_err(|err| TransportError::Decode(err.to_string()))
    }
}

/// One GET against the wire. Implementations report non-2xx statuses as
/// errors so the fetch boundary sees every fault the same way.
#[async_trait]
pub trait PageTransport: Send + Sync {
    async fn get(&self, url: &Url, headers: &HeaderMap) -> Result<TransportResponse, TransportError>;
}
