//! Locale detection from free-text location hints.

use crate::definition::GLOBAL_REGION;
use jobmesh_core::{normalize, slugify};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Region code for Bangladesh.
pub const BANGLADESH: &str = "bd";

/// Region tag for remote-friendly boards.
pub const REMOTE_REGION: &str = "remote";

static REMOTE_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(remote|anywhere|worldwide|work from home|wfh)\b").expect("valid regex")
});

static BANGLADESH_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(bangladesh|bd|dhaka|chittagong|chattogram|khulna|sylhet|rajshahi|barisal|barishal|rangpur|mymensingh|gazipur|narayanganj|comilla|cumilla)\b|বাংলাদেশ|ঢাকা|চট্টগ্রাম",
    )
    .expect("valid regex")
});

/// Where the caller wants to work, as far as source selection cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LocaleSignal {
    /// Remote work, no physical region
    Remote,
    /// A named region
    Region {
        /// Stable code matched against `region_relevance` (e.g. "bd")
        code: String,
        /// Display name
        name: String,
    },
    /// No usable hint
    Unspecified,
}

impl LocaleSignal {
    /// Classify a location hint.
    ///
    /// Bangladesh is recognized by country name, the `bd` code or a major
    /// city; remote-work phrases win over everything else. Any other
    /// non-empty hint becomes a generic region keyed by its slug.
    #[must_use]
    pub fn detect(hint: &str) -> Self {
        let normalized = normalize(hint);
        if normalized.is_empty() {
            return Self::Unspecified;
        }
        if REMOTE_HINT.is_match(&normalized) {
            return Self::Remote;
        }
        if BANGLADESH_HINT.is_match(&normalized) {
            return Self::Region {
                code: BANGLADESH.to_string(),
                name: "Bangladesh".to_string(),
            };
        }
        Self::Region {
            code: slugify(&normalized),
            name: hint.trim().to_string(),
        }
    }

    /// Region code, if this signal names one.
    #[must_use]
    pub fn region_code(&self) -> Option<&str> {
        match self {
            Self::Region { code, .. } => Some(code),
            Self::Remote => Some(REMOTE_REGION),
            Self::Unspecified => None,
        }
    }

    /// Whether a source with the given relevance list should be queried.
    ///
    /// `global` sources serve everything and an unspecified locale is served
    /// by every source.
    #[must_use]
    pub fn matches_relevance(&self, relevance: &[String]) -> bool {
        if relevance.iter().any(|r| r == GLOBAL_REGION) {
            return true;
        }
        match self.region_code() {
            Some(code) => relevance.iter().any(|r| r.eq_ignore_ascii_case(code)),
            None => true,
        }
    }
}
