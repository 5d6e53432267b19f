//! Browser fingerprint assembly.
//!
//! A fingerprint is one User-Agent string plus one randomized header
//! mapping. The freshness policy decides whether a viewer mints a new
//! fingerprint for every view or reuses one for the whole session; both
//! behaviors exist in the wild, so the choice is explicit configuration.

pub mod headers;
pub mod user_agent;

pub use headers::HeaderSetGenerator;
pub use user_agent::{BrowserFamily, UserAgentGenerator};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A User-Agent string paired with the headers presenting as that client.
#[derive(Debug, Clone)]
pub struct Fingerprint {
    pub user_agent: String,
    pub headers: HashMap<String, String>,
}

/// When a viewer mints a fresh fingerprint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessPolicy {
    /// A new fingerprint for every view.
    #[default]
    PerView,
    /// One fingerprint minted on first use and reused for the whole session.
    PerSession,
}

/// Combines the two leaf generators into whole fingerprints.
pub struct FingerprintGenerator {
    user_agents: UserAgentGenerator,
    headers: HeaderSetGenerator,
}

impl FingerprintGenerator {
    pub fn new() -> Self {
        Self {
            user_agents: UserAgentGenerator::new(),
            headers: HeaderSetGenerator::new(),
        }
    }

    /// Deterministic generator; the two leaves get distinct streams derived
    /// from the same seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            user_agents: UserAgentGenerator::from_seed(seed),
            headers: HeaderSetGenerator::from_seed(seed.wrapping_add(1)),
        }
    }

    pub fn generate(&mut self) -> Fingerprint {
        Fingerprint {
            user_agent: self.user_agents.generate(),
            headers: self.headers.generate(),
        }
    }
}

impl Default for FingerprintGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_fingerprints_are_structurally_sound() {
        let mut generator = FingerprintGenerator::from_seed(21);
        for _ in 0..32 {
            let fingerprint = generator.generate();
            assert!(!fingerprint.user_agent.is_empty());
            assert!(!fingerprint.headers.is_empty());
        }
    }

    #[test]
    fn policy_serializes_as_snake_case() {
        let json = serde_json::to_string(&FreshnessPolicy::PerSession).unwrap();
        assert_eq!(json, "\"per_session\"");
        let parsed: FreshnessPolicy = serde_json::from_str("\"per_view\"").unwrap();
        assert_eq!(parsed, FreshnessPolicy::PerView);
    }
}
