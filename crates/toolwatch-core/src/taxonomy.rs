//! Fixed error taxonomy.
//!
//! Raw error text is bucketed into seven causes by case-insensitive
//! substring match, first match wins in declaration order. The order is
//! load-bearing: "Connection timeout" is a timeout, not a network error,
//! because timeout is checked first.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorClass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Timeout,
    Permission,
    Network,
    RateLimit,
    InvalidInput,
    NotFound,
    Other,
}

/// Precedence-ordered keyword table. Every non-empty error string lands on
/// exactly one label; no keyword match falls through to `Other`.
const KEYWORDS: &[(ErrorClass, &[&str])] = &[
    (ErrorClass::Timeout, &["timeout", "timed out"]),
    (ErrorClass::Permission, &["permission", "unauthorized"]),
    (ErrorClass::Network, &["network", "connection"]),
    (ErrorClass::RateLimit, &["rate limit"]),
    (ErrorClass::InvalidInput, &["invalid", "malformed"]),
    (ErrorClass::NotFound, &["not found"]),
];

impl ErrorClass {
    pub fn all() -> &'static [ErrorClass] {
        &[
            ErrorClass::Timeout,
            ErrorClass::Permission,
            ErrorClass::Network,
            ErrorClass::RateLimit,
            ErrorClass::InvalidInput,
            ErrorClass::NotFound,
            ErrorClass::Other,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::Timeout => "timeout",
            ErrorClass::Permission => "permission",
            ErrorClass::Network => "network",
            ErrorClass::RateLimit => "rate_limit",
            ErrorClass::InvalidInput => "invalid_input",
            ErrorClass::NotFound => "not_found",
            ErrorClass::Other => "other",
        }
    }

    /// Classify raw error text. Returns `None` only for empty/whitespace
    /// text; every non-empty string maps to exactly one label.
    pub fn classify(error_text: &str) -> Option<ErrorClass> {
        if error_text.trim().is_empty() {
            return None;
        }
        let lower = error_text.to_lowercase();
        for (class, keywords) in KEYWORDS {
            if keywords.iter().any(|kw| lower.contains(kw)) {
                return Some(*class);
            }
        }
        Some(ErrorClass::Other)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_beats_network_on_combined_text() {
        assert_eq!(
            ErrorClass::classify("Connection timeout after 30s"),
            Some(ErrorClass::Timeout)
        );
    }

    #[test]
    fn keyword_buckets() {
        let cases = [
            ("Request timed out", ErrorClass::Timeout),
            ("Permission denied", ErrorClass::Permission),
            ("401 Unauthorized", ErrorClass::Permission),
            ("connection refused", ErrorClass::Network),
            ("Network unreachable", ErrorClass::Network),
            ("Rate limit exceeded", ErrorClass::RateLimit),
            ("Invalid input format", ErrorClass::InvalidInput),
            ("malformed JSON body", ErrorClass::InvalidInput),
            ("file not found", ErrorClass::NotFound),
            ("segfault in module", ErrorClass::Other),
        ];
        for (text, expected) in cases {
            assert_eq!(ErrorClass::classify(text), Some(expected), "text: {text}");
        }
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(ErrorClass::classify("TIMEOUT"), Some(ErrorClass::Timeout));
        assert_eq!(
            ErrorClass::classify("RATE LIMIT hit"),
            Some(ErrorClass::RateLimit)
        );
    }

    #[test]
    fn empty_text_classifies_nothing() {
        assert_eq!(ErrorClass::classify(""), None);
        assert_eq!(ErrorClass::classify("   "), None);
    }

    #[test]
    fn every_nonempty_string_maps_to_one_label() {
        for text in ["x", "unexpected EOF", "паника", "exit code 1"] {
            assert!(ErrorClass::classify(text).is_some(), "text: {text}");
        }
    }
}
