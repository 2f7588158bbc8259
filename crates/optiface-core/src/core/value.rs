// crates/optiface-core/src/core/value.rs
// ============================================================================
// Module: Optiface Feature Values
// Description: Closed set of feature types and their runtime values.
// Purpose: Give every schema attribute a strict, checkable primitive type.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Features declare one of five primitive types. Runtime values carry their
//! own type tag so validation can compare them against the declaration
//! without coercion: an integer never satisfies a float feature, and a
//! boolean is never an integer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use time::OffsetDateTime;

use crate::core::clock::format_timestamp;
use crate::core::clock::parse_timestamp;

// ============================================================================
// SECTION: Feature Types
// ============================================================================

/// Declared primitive type of a feature.
///
/// # Invariants
/// - Tags map 1:1 to the strings used in problem-space documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureType {
    /// UTF-8 string.
    Str,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean flag.
    Bool,
    /// UTC timestamp.
    DateTime,
}

impl FeatureType {
    /// All recognized feature types, in tag order.
    pub const ALL: [Self; 5] = [Self::Str, Self::Int, Self::Float, Self::Bool, Self::DateTime];

    /// Returns the document tag for this type.
    #[must_use]
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::DateTime => "datetime",
        }
    }

    /// Parses a document tag, returning `None` for unrecognized tags.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_tag() == tag)
    }

    /// Returns true when `value` has exactly this type.
    #[must_use]
    pub fn accepts(self, value: &FeatureValue) -> bool {
        value.feature_type() == self
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

// ============================================================================
// SECTION: Feature Values
// ============================================================================

/// Runtime value of a feature.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// String value.
    Str(String),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Timestamp value.
    DateTime(OffsetDateTime),
}

impl FeatureValue {
    /// Returns the runtime type of this value.
    #[must_use]
    pub const fn feature_type(&self) -> FeatureType {
        match self {
            Self::Str(_) => FeatureType::Str,
            Self::Int(_) => FeatureType::Int,
            Self::Float(_) => FeatureType::Float,
            Self::Bool(_) => FeatureType::Bool,
            Self::DateTime(_) => FeatureType::DateTime,
        }
    }

    /// Returns the string payload when this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integer payload when this is an integer value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the float payload when this is a float value.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the boolean payload when this is a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the timestamp payload when this is a timestamp value.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<OffsetDateTime> {
        match self {
            Self::DateTime(value) => Some(*value),
            _ => None,
        }
    }

    /// Parses raw text as a value of the declared type.
    ///
    /// Text that does not parse as `declared` is kept as a string value, so
    /// row validation reports it as a type mismatch instead of losing it.
    #[must_use]
    pub fn parse_as(text: &str, declared: FeatureType) -> Self {
        let trimmed = text.trim();
        let parsed = match declared {
            FeatureType::Str => None,
            FeatureType::Int => trimmed.parse().ok().map(Self::Int),
            FeatureType::Float => trimmed.parse().ok().map(Self::Float),
            FeatureType::Bool => parse_bool(trimmed).map(Self::Bool),
            FeatureType::DateTime => parse_timestamp(trimmed).ok().map(Self::DateTime),
        };
        parsed.unwrap_or_else(|| Self::Str(text.to_string()))
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(value) => write!(f, "\"{value}\""),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{value:.1}")
            }
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::DateTime(value) => {
                f.write_str(&format_timestamp(*value).map_err(|_| fmt::Error)?)
            }
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<OffsetDateTime> for FeatureValue {
    fn from(value: OffsetDateTime) -> Self {
        Self::DateTime(value)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses the boolean spellings accepted from text sources.
fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
