//! Text normalization and scoring helpers.
//!
//! Everything here is pure and allocation-light. Lengths are counted in
//! Unicode scalar values, never bytes, so Bangla and accented text is
//! never cut inside a codepoint.

use unicode_normalization::UnicodeNormalization;

/// Marker appended by [`truncate_at_word`].
pub const ELLIPSIS: char = '…';

/// Longest slug produced by [`slugify`].
const MAX_SLUG_CHARS: usize = 80;

/// Canonical form used for every comparison: NFC, lowercase, trimmed,
/// internal whitespace collapsed to a single space.
#[must_use]
pub fn normalize(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split normalized text into search tokens.
///
/// Tokens of one character or less are dropped. Order and duplicates are kept.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(is_separator)
        .filter(|token| token.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

fn is_separator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            ',' | ';'
                | '/'
                | '|'
                | '•'
                | '·'
                | '('
                | ')'
                | '['
                | ']'
                | '{'
                | '}'
                | ':'
                | '!'
                | '?'
                | '"'
                | '\''
                | '&'
                | '<'
                | '>'
                | '='
        )
}

/// Truncate `text` to at most `max_chars` characters, preferring a word boundary.
///
/// The text is cut at `max_chars - 1`; if whitespace exists in the last 20% of
/// that window the cut moves back to it. An ellipsis is appended either way.
#[must_use]
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let window = max_chars - 1;
    let cut: String = text.chars().take(window).collect();
    let min_break = window * 4 / 5;

    let break_at = cut
        .char_indices()
        .enumerate()
        .filter(|(char_idx, (_, c))| c.is_whitespace() && *char_idx >= min_break)
        .map(|(_, (byte_idx, _))| byte_idx)
        .last();

    let head = match break_at {
        Some(byte_idx) => cut[..byte_idx].trim_end(),
        None => cut.as_str(),
    };

    let mut out = String::with_capacity(head.len() + ELLIPSIS.len_utf8());
    out.push_str(head);
    out.push(ELLIPSIS);
    out
}

/// Case- and Unicode-insensitive substring test. An empty needle never matches.
#[must_use]
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    let needle = normalize(needle);
    !needle.is_empty() && normalize(haystack).contains(&needle)
}

/// Build a URL-safe slug: ASCII alphanumerics separated by single hyphens.
///
/// Returns `"listing"` when nothing survives (e.g. an all-Bangla title).
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;

    for c in normalize(text).chars() {
        if c.is_ascii_alphanumeric() {
            let dash = pending_dash && !slug.is_empty();
            if slug.len() + usize::from(dash) + 1 > MAX_SLUG_CHARS {
                break;
            }
            if dash {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "listing".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Senior   RUST\tEngineer \n"), "senior rust engineer");
        // Decomposed "é" (e + combining acute) composes to the precomposed form
        assert_eq!(normalize("Caf\u{0065}\u{0301}"), normalize("Café"));
        // Bangla passes through intact
        assert_eq!(normalize(" ঢাকা "), "ঢাকা");
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Senior Developer (Rust/Go), Dhaka | Remote"),
            vec!["senior", "developer", "rust", "go", "dhaka", "remote"]
        );
        assert_eq!(tokenize("C++ & C# a b node.js"), vec!["c++", "c#", "node.js"]);
        assert_eq!(tokenize("go go go"), vec!["go", "go", "go"]);
        assert!(tokenize(" , ; ").is_empty());
    }

    #[test]
    fn test_truncate_within_budget_is_identity() {
        assert_eq!(truncate_at_word("hello world", 11), "hello world");
        assert_eq!(truncate_at_word("", 0), "");
    }

    #[test]
    fn test_truncate_prefers_word_boundary() {
        let out = truncate_at_word("The quick brown fox jumps over the lazy dog", 20);
        assert_eq!(out, "The quick brown…");
        assert!(out.chars().count() <= 20);
    }

    #[test]
    fn test_truncate_hard_cut_without_nearby_space() {
        let out = truncate_at_word("abcdefghijklmnopqrstuvwxyz", 10);
        assert_eq!(out, "abcdefghi…");
    }

    #[test]
    fn test_truncate_ignores_space_outside_window_tail() {
        // The only space sits at index 2, far outside the last 20% of the window
        let out = truncate_at_word("ab cdefghijklmnopqrstuvwxyz", 12);
        assert_eq!(out, "ab cdefghij…");
    }

    #[test]
    fn test_truncate_multibyte() {
        let text = "বাংলাদেশ সফটওয়্যার ডেভেলপার চাকরি ঢাকা";
        for max in 0..text.chars().count() + 2 {
            let out = truncate_at_word(text, max);
            assert!(out.chars().count() <= max, "max {max} produced {out:?}");
        }
    }

    #[test]
    fn test_truncate_length_bound_for_many_inputs() {
        let samples = [
            "a",
            "short text",
            "a b c d e f g h i j k l m n o p",
            "supercalifragilisticexpialidocious and more",
            "emoji 🚀 rockets 🚀 everywhere 🚀",
        ];
        for sample in samples {
            for max in 0..60 {
                let out = truncate_at_word(sample, max);
                assert!(out.chars().count() <= max || out == sample);
                if sample.chars().count() <= max {
                    assert_eq!(out, sample);
                }
            }
        }
    }

    #[test]
    fn test_contains_phrase() {
        assert!(contains_phrase("Senior Rust Developer", "rust  DEVELOPER"));
        assert!(!contains_phrase("Senior Rust Developer", "python"));
        assert!(!contains_phrase("anything", "   "));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Senior Rust Engineer @ Acme, Inc."), "senior-rust-engineer-acme-inc");
        assert_eq!(slugify("  --Hello--World--  "), "hello-world");
        assert_eq!(slugify("সফটওয়্যার"), "listing");
        assert!(slugify(&"word ".repeat(50)).len() <= MAX_SLUG_CHARS);
    }
}
