//! Randomized User-Agent synthesis.
//!
//! Picks a browser family, a version from that family's fixed list, and an
//! OS token, then formats the family-specific template. Chrome and Safari
//! use WebKit-style strings, Firefox a Gecko-style string, Internet Explorer
//! a Trident-style string.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Browser families the generator can present as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserFamily {
    Chrome,
    Firefox,
    InternetExplorer,
    Safari,
}

const FAMILIES: &[BrowserFamily] = &[
    BrowserFamily::Chrome,
    BrowserFamily::Firefox,
    BrowserFamily::InternetExplorer,
    BrowserFamily::Safari,
];

const CHROME_VERSIONS: &[&str] = &[
    "118.0.0.0",
    "119.0.0.0",
    "120.0.0.0",
    "121.0.0.0",
    "122.0.0.0",
];

const FIREFOX_VERSIONS: &[&str] = &["119.0", "120.0", "121.0", "122.0"];

const IE_VERSIONS: &[&str] = &["9.0", "10.0", "11.0"];

const SAFARI_VERSIONS: &[&str] = &["16.5", "16.6", "17.0", "17.2"];

const OS_TOKENS: &[&str] = &[
    "Windows NT 10.0; Win64; x64",
    "Windows NT 6.1; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "Macintosh; Intel Mac OS X 13_1",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
];

/// Produces one randomized User-Agent string per call.
#[derive(Debug)]
pub struct UserAgentGenerator {
    rng: StdRng,
}

impl UserAgentGenerator {
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

    /// Synthesize a User-Agent string. Always well-formed and non-empty.
    pub fn generate(&mut self) -> String {
        // Empty-catalog guards fall back to the Chrome-style template.
        let family = FAMILIES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(BrowserFamily::Chrome);
        let version = versions_for(family)
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(CHROME_VERSIONS[0]);
        let os = OS_TOKENS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(OS_TOKENS[0]);

        format_agent(family, version, os)
    }
}

impl Default for UserAgentGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn versions_for(family: BrowserFamily) -> &'static [&'static str] {
    match family {
        BrowserFamily::Chrome => CHROME_VERSIONS,
        BrowserFamily::Firefox => FIREFOX_VERSIONS,
        BrowserFamily::InternetExplorer => IE_VERSIONS,
        BrowserFamily::Safari => SAFARI_VERSIONS,
    }
}

fn format_agent(family: BrowserFamily, version: &str, os: &str) -> String {
    match family {
        BrowserFamily::Chrome => format!(
            "Mozilla/5.0 ({os}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{version} Safari/537.36"
        ),
        BrowserFamily::Safari => format!(
            "Mozilla/5.0 ({os}) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{version} Safari/605.1.15"
        ),
        BrowserFamily::Firefox => {
            format!("Mozilla/5.0 ({os}; rv:{version}) Gecko/20100101 Firefox/{version}")
        }
        BrowserFamily::InternetExplorer => {
            format!("Mozilla/5.0 ({os}; Trident/7.0; rv:{version}) like Gecko")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn family_patterns() -> Vec<Regex> {
        [
            r"^Mozilla/5\.0 \(.+\) AppleWebKit/537\.36 \(KHTML, like Gecko\) Chrome/[0-9.]+ Safari/537\.36$",
            r"^Mozilla/5\.0 \(.+\) AppleWebKit/605\.1\.15 \(KHTML, like Gecko\) Version/[0-9.]+ Safari/605\.1\.15$",
            r"^Mozilla/5\.0 \(.+; rv:[0-9.]+\) Gecko/20100101 Firefox/[0-9.]+$",
            r"^Mozilla/5\.0 \(.+; Trident/7\.0; rv:[0-9.]+\) like Gecko$",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
    }

    #[test]
    fn matches_exactly_one_family_template() {
        let patterns = family_patterns();
        let mut generator = UserAgentGenerator::from_seed(7);
        for _ in 0..64 {
            let agent = generator.generate();
            assert!(!agent.is_empty());
            let matches = patterns.iter().filter(|p| p.is_match(&agent)).count();
            assert_eq!(matches, 1, "agent matched {matches} templates: {agent}");
        }
    }

    #[test]
    fn values_are_closed_over_the_catalogs() {
        let mut generator = UserAgentGenerator::from_seed(11);
        for _ in 0..64 {
            let agent = generator.generate();
            assert!(OS_TOKENS.iter().any(|os| agent.contains(os)));
            let known_version = CHROME_VERSIONS
                .iter()
                .chain(FIREFOX_VERSIONS)
                .chain(IE_VERSIONS)
                .chain(SAFARI_VERSIONS)
                .any(|version| agent.contains(version));
            assert!(known_version, "unknown version in {agent}");
        }
    }

    #[test]
    fn seeded_generators_agree() {
        let mut a = UserAgentGenerator::from_seed(42);
        let mut b = UserAgentGenerator::from_seed(42);
        for _ in 0..16 {
            assert_eq!(a.generate(), b.generate());
        }
    }
}
