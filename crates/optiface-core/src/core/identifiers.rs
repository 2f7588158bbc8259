// crates/optiface-core/src/core/identifiers.rs
// ============================================================================
// Module: Optiface Identifiers
// Description: Validated names for problem spaces and features.
// Purpose: Keep names safe to use as directory names and SQL column names.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A problem-space name doubles as its on-disk directory name, and a feature
//! name doubles as a results-table column. Both are validated once at the
//! boundary so downstream code can use them verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a problem-space name in bytes (one path component).
pub const MAX_PROBLEM_NAME_LENGTH: usize = 255;

// ============================================================================
// SECTION: Problem Names
// ============================================================================

/// Rejected problem-space name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid problem space name `{name}`: {reason}")]
pub struct InvalidProblemName {
    /// Offending name.
    pub name: String,
    /// Why the name was rejected.
    pub reason: &'static str,
}

/// Name of a problem space.
///
/// # Invariants
/// - Non-empty, at most [`MAX_PROBLEM_NAME_LENGTH`] bytes.
/// - Contains no path separators or NUL bytes and does not start with `.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProblemName(String);

impl ProblemName {
    /// Validates and wraps a problem-space name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidProblemName`] when the name is unusable as a directory name.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidProblemName> {
        let name = name.into();
        let reason = if name.trim().is_empty() {
            Some("name must be non-empty")
        } else if name.len() > MAX_PROBLEM_NAME_LENGTH {
            Some("name exceeds 255 bytes")
        } else if name.starts_with('.') {
            Some("name must not start with '.'")
        } else if name.chars().any(|ch| matches!(ch, '/' | '\\' | '\0')) {
            Some("name must not contain path separators")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(InvalidProblemName {
                name,
                reason,
            }),
            None => Ok(Self(name)),
        }
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProblemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for ProblemName {
    type Error = InvalidProblemName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ProblemName {
    type Error = InvalidProblemName;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProblemName> for String {
    fn from(value: ProblemName) -> Self {
        value.0
    }
}

impl AsRef<str> for ProblemName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// SECTION: Feature Names
// ============================================================================

/// Returns true when `name` is a plain identifier (`[A-Za-z_][A-Za-z0-9_]*`).
#[must_use]
pub fn is_feature_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::ProblemName;
    use super::is_feature_identifier;

    #[test]
    fn problem_names_reject_path_like_input() {
        assert!(ProblemName::new("knapsack").is_ok());
        assert!(ProblemName::new("").is_err());
        assert!(ProblemName::new("..").is_err());
        assert!(ProblemName::new(".hidden").is_err());
        assert!(ProblemName::new("a/b").is_err());
        assert!(ProblemName::new("a".repeat(256)).is_err());
    }

    #[test]
    fn feature_identifiers_are_sql_safe() {
        assert!(is_feature_identifier("time_ms"));
        assert!(is_feature_identifier("_n2"));
        assert!(!is_feature_identifier("2n"));
        assert!(!is_feature_identifier("n; DROP TABLE results"));
        assert!(!is_feature_identifier(""));
    }
}
