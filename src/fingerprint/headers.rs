//! Randomized request-header synthesis.
//!
//! A fixed catalog maps header names to value sources: either a list of
//! literal candidates or a derivation run fresh per call. Generation resolves
//! every entry, shuffles the resolved pairs, and keeps a uniformly sized
//! non-empty prefix, so each call yields a different subset in a different
//! order.

use std::collections::HashMap;

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

type DeriveFn = Box<dyn Fn(&mut StdRng) -> String + Send + Sync>;

enum HeaderSource {
    /// Literal candidates, one picked uniformly per call.
    Choices(&'static [&'static str]),
    /// Value derived fresh per call.
    Derived(DeriveFn),
}

struct CatalogEntry {
    name: &'static str,
    source: HeaderSource,
}

const REFERER_SITES: &[&str] = &[
    "https://www.google.com/",
    "https://www.bing.com/",
    "https://duckduckgo.com/",
    "https://search.yahoo.com/",
];

static CATALOG: Lazy<Vec<CatalogEntry>> = Lazy::new(|| {
    vec![
        CatalogEntry {
            name: "Accept",
            source: HeaderSource::Choices(&[
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
                "*/*",
            ]),
        },
        CatalogEntry {
            name: "Accept-Language",
            source: HeaderSource::Choices(&[
                "en-US,en;q=0.9",
                "en-GB,en;q=0.8",
                "en-US,en;q=0.5",
                "de-DE,de;q=0.7,en;q=0.3",
            ]),
        },
        CatalogEntry {
            name: "Accept-Encoding",
            source: HeaderSource::Choices(&["gzip, deflate", "gzip, deflate, br", "identity"]),
        },
        CatalogEntry {
            name: "Connection",
            source: HeaderSource::Choices(&["keep-alive", "close"]),
        },
        CatalogEntry {
            name: "Cache-Control",
            source: HeaderSource::Derived(Box::new(|rng| {
                format!("max-age={}", rng.gen_range(0..=3600))
            })),
        },
        CatalogEntry {
            name: "DNT",
            source: HeaderSource::Choices(&["1", "0"]),
        },
        CatalogEntry {
            name: "Upgrade-Insecure-Requests",
            source: HeaderSource::Choices(&["1"]),
        },
        CatalogEntry {
            name: "Pragma",
            source: HeaderSource::Choices(&["no-cache"]),
        },
        CatalogEntry {
            name: "Referer",
            source: HeaderSource::Derived(Box::new(|rng| {
                REFERER_SITES
                    .choose(rng)
                    .copied()
                    .unwrap_or(REFERER_SITES[0])
                    .to_string()
            })),
        },
        CatalogEntry {
            name: "X-Forwarded-For",
            source: HeaderSource::Derived(Box::new(|rng| {
                format!(
                    "{}.{}.{}.{}",
                    rng.gen_range(1..=223),
                    rng.gen_range(0..=255u8),
                    rng.gen_range(0..=255u8),
                    rng.gen_range(1..=254u8),
                )
            })),
        },
        CatalogEntry {
            name: "X-Request-Id",
            source: HeaderSource::Derived(Box::new(|rng| {
                let token: u128 = rng.r#gen();
                format!("{token:032x}")
            })),
        },
        CatalogEntry {
            name: "If-Modified-Since",
            source: HeaderSource::Derived(Box::new(|rng| {
                let age = chrono::Duration::hours(rng.gen_range(1..=72));
                (Utc::now() - age)
                    .format("%a, %d %b %Y %H:%M:%S GMT")
                    .to_string()
            })),
        },
    ]
});

/// Produces one randomized header mapping per call.
pub struct HeaderSetGenerator {
    rng: StdRng,
}

impl HeaderSetGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for reproducible selections.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Number of candidate headers in the catalog.
    pub fn catalog_len() -> usize {
        CATALOG.len()
    }

    /// Resolve the whole catalog, shuffle, and keep a random non-empty
    /// subset. Keys are unique by construction.
    pub fn generate(&mut self) -> HashMap<String, String> {
        let mut resolved: Vec<(&'static str, String)> = CATALOG
            .iter()
            .map(|entry| {
                let value = match &entry.source {
                    HeaderSource::Choices(values) => values
                        .choose(&mut self.rng)
                        .copied()
                        .unwrap_or_default()
                        .to_string(),
                    HeaderSource::Derived(derive) => derive(&mut self.rng),
                };
                (entry.name, value)
            })
            .collect();

        resolved.shuffle(&mut self.rng);
        let count = self.rng.gen_range(1..=resolved.len());
        resolved.truncate(count);

        resolved
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

impl Default for HeaderSetGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_of_catalog_with_valid_cardinality() {
        let mut generator = HeaderSetGenerator::from_seed(3);
        for _ in 0..64 {
            let headers = generator.generate();
            assert!(!headers.is_empty());
            assert!(headers.len() <= HeaderSetGenerator::catalog_len());
            for (name, value) in &headers {
                assert!(CATALOG.iter().any(|entry| entry.name == name));
                assert!(!name.is_empty());
                assert!(!value.is_empty());
            }
        }
    }

    #[test]
    fn derived_values_are_well_formed() {
        let mut generator = HeaderSetGenerator::from_seed(5);
        // Pull until every derived header has shown up at least once.
        let mut seen: HashMap<String, String> = HashMap::new();
        for _ in 0..256 {
            seen.extend(generator.generate());
        }

        let forwarded = &seen["X-Forwarded-For"];
        assert_eq!(forwarded.split('.').count(), 4);

        let token = &seen["X-Request-Id"];
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        assert!(seen["Cache-Control"].starts_with("max-age="));
        assert!(seen["If-Modified-Since"].ends_with("GMT"));
        assert!(REFERER_SITES.contains(&seen["Referer"].as_str()));
    }

    #[test]
    fn seeded_generators_agree() {
        let mut a = HeaderSetGenerator::from_seed(9);
        let mut b = HeaderSetGenerator::from_seed(9);
        for _ in 0..16 {
            let left = a.generate();
            let right = b.generate();
            // Derived timestamps may straddle a second boundary; compare keys.
            let mut left_keys: Vec<_> = left.keys().collect();
            let mut right_keys: Vec<_> = right.keys().collect();
            left_keys.sort();
            right_keys.sort();
            assert_eq!(left_keys, right_keys);
        }
    }
}
