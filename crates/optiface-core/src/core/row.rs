// crates/optiface-core/src/core/row.rs
// ============================================================================
// Module: Optiface Rows
// Description: Raw and normalized rows plus structured validation results.
// Purpose: Carry row data and every error or note produced by validation.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`RawRow`] is whatever an ingestion source supplied: column names
//! mapped to possibly-null values. Validation turns it into a
//! [`NormalizedRow`] holding exactly one non-null value per schema feature,
//! in schema order, or a [`ValidationFailure`] collecting every problem.
//! Validation outcomes are values, never panics, so bulk ingestion can keep
//! going past bad rows.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::core::value::FeatureType;
use crate::core::value::FeatureValue;

// ============================================================================
// SECTION: Raw Rows
// ============================================================================

/// Unvalidated row: column name to optional value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow(BTreeMap<String, Option<FeatureValue>>);

impl RawRow {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets a column to a value.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<FeatureValue>) {
        self.0.insert(column.into(), Some(value.into()));
    }

    /// Sets a column to null.
    pub fn set_null(&mut self, column: impl Into<String>) {
        self.0.insert(column.into(), None);
    }

    /// Builder form of [`RawRow::set`].
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Builder form of [`RawRow::set_null`].
    #[must_use]
    pub fn with_null(mut self, column: impl Into<String>) -> Self {
        self.set_null(column);
        self
    }

    /// Returns the value for `column`; `Some(None)` means an explicit null.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<Option<&FeatureValue>> {
        self.0.get(column).map(Option::as_ref)
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the row, returning its columns.
    #[must_use]
    pub fn into_columns(self) -> BTreeMap<String, Option<FeatureValue>> {
        self.0
    }
}

impl FromIterator<(String, Option<FeatureValue>)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, Option<FeatureValue>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<NormalizedRow> for RawRow {
    fn from(row: NormalizedRow) -> Self {
        row.0.into_iter().map(|(name, value)| (name, Some(value))).collect()
    }
}

// ============================================================================
// SECTION: Normalized Rows
// ============================================================================

/// Validated row: one value per schema feature, in schema order.
///
/// # Invariants
/// - Holds exactly the problem space's features, each with a value of its
///   declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow(Vec<(String, FeatureValue)>);

impl NormalizedRow {
    /// Wraps ordered feature values. Callers outside validation use this to
    /// rebuild rows read back from a store.
    #[must_use]
    pub const fn from_ordered(values: Vec<(String, FeatureValue)>) -> Self {
        Self(values)
    }

    /// Returns the value for `feature`.
    #[must_use]
    pub fn get(&self, feature: &str) -> Option<&FeatureValue> {
        self.0.iter().find(|(name, _)| name == feature).map(|(_, value)| value)
    }

    /// Iterates `(feature, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Iterates values in schema order.
    pub fn values(&self) -> impl Iterator<Item = &FeatureValue> {
        self.0.iter().map(|(_, value)| value)
    }

    /// Returns the number of features.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the row has no features.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// SECTION: Validation Results
// ============================================================================

/// Row-level problem that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowError {
    /// Required feature absent or null.
    MissingRequired,
    /// Supplied value has the wrong type.
    TypeMismatch {
        /// Declared type.
        expected: FeatureType,
        /// Runtime type of the supplied value.
        actual: FeatureType,
    },
    /// Float value is NaN or infinite.
    NonFiniteFloat,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired => f.write_str("missing required feature"),
            Self::TypeMismatch {
                expected,
                actual,
            } => write!(f, "expected {expected}, got {actual}"),
            Self::NonFiniteFloat => f.write_str("float value must be finite"),
        }
    }
}

/// Informational observation that never fails validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RowNote {
    /// Optional feature omitted; its default was written.
    DefaultApplied(FeatureValue),
    /// Column is not part of the schema and was dropped.
    DroppedUnknownColumn,
    /// Column names run metadata, which the store assigns itself; dropped.
    DroppedRunMetadata,
}

impl fmt::Display for RowNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefaultApplied(value) => write!(f, "default applied: {value}"),
            Self::DroppedUnknownColumn => f.write_str("unknown column dropped"),
            Self::DroppedRunMetadata => f.write_str("run metadata column dropped"),
        }
    }
}

/// Notes keyed by feature or column name.
pub type RowNotes = BTreeMap<String, Vec<RowNote>>;

/// Successful validation: the normalized row plus any notes.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    /// Normalized row.
    pub row: NormalizedRow,
    /// Notes keyed by feature or column name.
    pub notes: RowNotes,
}

/// Failed validation: every error found, plus notes gathered on the way.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row rejected: {}", summarize(.errors))]
pub struct ValidationFailure {
    /// Errors keyed by feature name.
    pub errors: BTreeMap<String, Vec<RowError>>,
    /// Notes keyed by feature or column name.
    pub notes: RowNotes,
}

impl ValidationFailure {
    /// Returns true when `feature` has at least one error.
    #[must_use]
    pub fn has_error_for(&self, feature: &str) -> bool {
        self.errors.get(feature).is_some_and(|errors| !errors.is_empty())
    }

    /// Returns the errors rendered as messages, keyed by feature name.
    #[must_use]
    pub fn messages(&self) -> BTreeMap<String, Vec<String>> {
        self.errors
            .iter()
            .map(|(feature, errors)| {
                (feature.clone(), errors.iter().map(ToString::to_string).collect())
            })
            .collect()
    }
}

/// Renders `feature: message` pairs for the failure display.
fn summarize(errors: &BTreeMap<String, Vec<RowError>>) -> String {
    errors
        .iter()
        .flat_map(|(feature, errors)| errors.iter().map(move |error| format!("{feature}: {error}")))
        .collect::<Vec<_>>()
        .join("; ")
}
