//! Target address handling.
//!
//! A [`Target`] pairs the logical web address with the transport security
//! selection and derives the full URL on demand. The address itself is never
//! re-validated here; a malformed address surfaces as a failed view.

use serde::{Deserialize, Serialize};

/// Logical web address plus http/https selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    address: String,
    secure: bool,
}

impl Target {
    /// Build a target from a bare address and an explicit secure flag.
    pub fn new(address: impl Into<String>, secure: bool) -> Self {
        Self {
            address: address.into(),
            secure,
        }
    }

    /// Accepts either a bare address or a full URL with an embedded scheme.
    ///
    /// `https://` selects the secure transport, `http://` the plain one, and
    /// a bare address defaults to plain http.
    pub fn parse(input: &str) -> Self {
        if let Some(rest) = input.strip_prefix("https://") {
            Self::new(rest, true)
        } else if let Some(rest) = input.strip_prefix("http://") {
            Self::new(rest, false)
        } else {
            Self::new(input, false)
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    /// Scheme is exactly `https` when secure, else `http`.
    pub fn scheme(&self) -> &'static str {
        if self.secure { "https" } else { "http" }
    }

    /// Full URL, `"{scheme}://{address}"`.
    pub fn full_url(&self) -> String {
        format!("{}://{}", self.scheme(), self.address)
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::new("www.example.com", false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_flag_selects_scheme() {
        assert_eq!(
            Target::new("example.com", true).full_url(),
            "https://example.com"
        );
        assert_eq!(
            Target::new("example.com", false).full_url(),
            "http://example.com"
        );
    }

    #[test]
    fn parse_accepts_embedded_scheme() {
        let secure = Target::parse("https://example.com/page");
        assert!(secure.secure());
        assert_eq!(secure.address(), "example.com/page");

        let plain = Target::parse("http://example.com");
        assert!(!plain.secure());

        let bare = Target::parse("www.example.com");
        assert!(!bare.secure());
        assert_eq!(bare.full_url(), "http://www.example.com");
    }
}
