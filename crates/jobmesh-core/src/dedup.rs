//! Identity keys for listings.
//!
//! Two listings with the same key are the same real-world posting, even when
//! scraped from different result pages of the same source. The key doubles as
//! the storage-level `source_key` used for skip-if-exists checks.

use crate::text::normalize;
use sha2::{Digest, Sha256};

/// Hex characters kept from the digest.
const KEY_LEN: usize = 16;

/// Build a stable 16-hex-char identity key from title, employer and a discriminator
/// (the source id for query-based dedup).
///
/// Each part is normalized and every run of non-alphanumeric characters is
/// collapsed to a single space, so case, punctuation and spacing differences
/// never change the key.
#[must_use]
pub fn build_key(title: &str, employer: &str, discriminator: &str) -> String {
    let composite = [title, employer, discriminator]
        .iter()
        .map(|part| canonical_part(part))
        .collect::<Vec<_>>()
        .join("|");

    let mut hasher = Sha256::new();
    hasher.update(composite.as_bytes());
    let mut key = hex::encode(hasher.finalize());
    key.truncate(KEY_LEN);
    key
}

fn canonical_part(part: &str) -> String {
    normalize(part)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shape() {
        let key = build_key("Rust Engineer", "Acme", "remotive");
        assert_eq!(key.len(), KEY_LEN);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            build_key("Rust Engineer", "Acme", "remotive"),
            build_key("Rust Engineer", "Acme", "remotive")
        );
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let base = build_key("Senior Rust Engineer", "Acme Corp", "bdjobs");
        assert_eq!(base, build_key("  senior   RUST engineer ", "ACME corp", "bdjobs"));
        assert_eq!(base, build_key("Senior Rust-Engineer!", "Acme, Corp.", "bdjobs"));
    }

    #[test]
    fn test_parts_are_not_interchangeable() {
        assert_ne!(
            build_key("Acme", "Rust Engineer", "bdjobs"),
            build_key("Rust Engineer", "Acme", "bdjobs")
        );
        assert_ne!(
            build_key("Rust Engineer", "Acme", "bdjobs"),
            build_key("Rust Engineer", "Acme", "linkedin")
        );
    }

    #[test]
    fn test_unicode_inputs() {
        let composed = build_key("Caf\u{e9} Manager", "ঢাকা ফুডস", "bdjobs");
        let decomposed = build_key("Cafe\u{301} Manager", "ঢাকা ফুডস", "bdjobs");
        assert_eq!(composed, decomposed);
    }
}
