//! Sensitivity classification for key names and values.
//!
//! Key names are matched in two tiers after normalization (lower-case,
//! `_` and `-` removed):
//!
//! - an exact-match list for compound names that would over-match as
//!   substrings (`apikey`, `clientid`, ...)
//! - a substring list for broad terms (`password`, `token`, `auth`, ...) so
//!   compound field names such as `clientAuthToken` are caught
//!
//! Values are matched against a fixed list of secret shapes. A value must be
//! at least [`MIN_SECRET_VALUE_LEN`] characters long and match a shape in
//! full; partial matches inside longer text never count.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Normalized key names that are sensitive only when matched exactly.
pub const EXACT_SENSITIVE_KEYS: &[&str] = &[
    "apikey",
    "accesskey",
    "secretkey",
    "clientsecret",
    "clientid",
    "tenantid",
];

/// Terms that mark a normalized key name as sensitive wherever they appear.
pub const SUBSTRING_SENSITIVE_TERMS: &[&str] = &[
    "password",
    "secret",
    "token",
    "credential",
    "auth",
    "bearer",
    "authorization",
    "pat",
];

/// Shortest string that is ever considered for value-shape matching.
pub const MIN_SECRET_VALUE_LEN: usize = 10;

/// A value shape that is almost certainly a secret regardless of its key.
struct ValueSignature {
    pattern: Lazy<Regex>,
    description: &'static str,
}

// Anchored so that only full matches count.
#[allow(clippy::expect_used)]
static SIGNATURES: [ValueSignature; 4] = [
    ValueSignature {
        pattern: Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/]{52}$").expect("literal pattern")),
        description: "Azure DevOps personal access token",
    },
    ValueSignature {
        pattern: Lazy::new(|| {
            Regex::new(r"^gh[pousr]_[A-Za-z0-9_]{36,251}$").expect("literal pattern")
        }),
        description: "GitHub token",
    },
    ValueSignature {
        pattern: Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{20,}$").expect("literal pattern")),
        description: "Generic alphanumeric API key",
    },
    ValueSignature {
        pattern: Lazy::new(|| {
            Regex::new(
                r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
            )
            .expect("literal pattern")
        }),
        description: "GUID",
    },
];

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns `true` if a field name denotes secret material.
///
/// ```
/// use ado_mcp_redact::is_sensitive_key;
///
/// assert!(is_sensitive_key("Azure_DevOps_PAT"));
/// assert!(is_sensitive_key("client-id"));
/// assert!(!is_sensitive_key("project_name"));
/// ```
#[must_use]
pub fn is_sensitive_key(key: &str) -> bool {
    if key.is_empty() {
        return false;
    }

    let normalized = normalize_key(key);

    if EXACT_SENSITIVE_KEYS.contains(&normalized.as_str()) {
        return true;
    }

    SUBSTRING_SENSITIVE_TERMS
        .iter()
        .any(|term| normalized.contains(term))
}

/// Returns `true` if a string has the shape of a known secret format.
#[must_use]
pub fn is_sensitive_value(value: &str) -> bool {
    if value.chars().count() < MIN_SECRET_VALUE_LEN {
        return false;
    }

    SIGNATURES.iter().any(|sig| sig.pattern.is_match(value))
}

/// Like [`is_sensitive_value`], for an arbitrary JSON value.
///
/// Only strings are eligible; every other kind (including `null`) is never
/// classified sensitive by value.
#[must_use]
pub fn is_sensitive_json(value: &Value) -> bool {
    value.as_str().is_some_and(is_sensitive_value)
}

/// Describes the first signature a value matches, if any.
#[must_use]
pub fn matched_signature(value: &str) -> Option<&'static str> {
    if value.chars().count() < MIN_SECRET_VALUE_LEN {
        return None;
    }

    SIGNATURES
        .iter()
        .find(|sig| sig.pattern.is_match(value))
        .map(|sig| sig.description)
}
