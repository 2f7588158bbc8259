// crates/optiface-core/src/interfaces/mod.rs
// ============================================================================
// Module: Optiface Interfaces
// Description: Backend-agnostic interface for persisting validated rows.
// Purpose: Define the contract surface between the row store and storage.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Optiface hands validated rows to a physical store
//! without embedding backend-specific details. A [`ResultsBackend`] owns one
//! results table per problem space; the schema-derived [`ColumnSpec`] list
//! is the only description of that table the backend receives.
//! Implementations must fail closed when an existing table disagrees with
//! the requested columns.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;
use time::OffsetDateTime;

use crate::core::FeatureType;
use crate::core::NormalizedRow;
use crate::core::Provenance;
use crate::core::RunMetadata;

// ============================================================================
// SECTION: Columns
// ============================================================================

/// Native column type of the results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Text column.
    Text,
    /// Integer column.
    Integer,
    /// Floating-point column.
    Real,
}

impl ColumnType {
    /// Returns the SQL type name.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
        }
    }
}

impl From<FeatureType> for ColumnType {
    fn from(declared: FeatureType) -> Self {
        match declared {
            FeatureType::Str | FeatureType::DateTime => Self::Text,
            FeatureType::Int | FeatureType::Bool => Self::Integer,
            FeatureType::Float => Self::Real,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One schema-derived results-table column.
///
/// # Invariants
/// - `column_type` equals `ColumnType::from(declared_type)`.
/// - Exactly one column of a table is the primary key (`run_id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name, equal to the feature name.
    pub name: String,
    /// Native column type.
    pub column_type: ColumnType,
    /// Declared feature type the column was derived from.
    pub declared_type: FeatureType,
    /// Whether this column is the store-assigned row key.
    pub primary_key: bool,
}

impl ColumnSpec {
    /// Builds a column from a feature name and declared type.
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: FeatureType) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::from(declared_type),
            declared_type,
            primary_key: false,
        }
    }

    /// Marks this column as the row key.
    #[must_use]
    pub const fn into_primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

// ============================================================================
// SECTION: Stored Rows
// ============================================================================

/// Row read back from a results table.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    /// Store-assigned row identifier.
    pub run_id: i64,
    /// UTC instant the row was added.
    pub timestamp_added: OffsetDateTime,
    /// Ingestion path.
    pub added_from: Provenance,
    /// Feature values in schema order.
    pub values: NormalizedRow,
}

/// Outcome of preparing the results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    /// Table did not exist and was created.
    Created,
    /// Table existed and matches the requested columns.
    Existing,
}

// ============================================================================
// SECTION: Results Backend
// ============================================================================

/// Results store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages never embed full row payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("results store io error: {0}")]
    Io(String),
    /// Store reported an error.
    #[error("results store error: {0}")]
    Store(String),
    /// Existing results table disagrees with the schema.
    #[error("results table does not match schema: {0}")]
    SchemaMismatch(String),
    /// Store data version is incompatible.
    #[error("results store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("results store invalid data: {0}")]
    Invalid(String),
    /// Operation attempted in the wrong lifecycle state.
    #[error("results store state error: {0}")]
    State(String),
}

/// Physical storage for one problem space's results table.
pub trait ResultsBackend {
    /// Creates the results table, or checks that the existing one has
    /// exactly `columns`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SchemaMismatch`] when an existing table differs,
    /// or another [`StoreError`] when the store fails.
    fn ensure_results_table(&mut self, columns: &[ColumnSpec]) -> Result<TableStatus, StoreError>;

    /// Appends one validated row and returns its assigned run id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the table is not prepared or the write fails.
    fn append(&mut self, metadata: &RunMetadata, row: &NormalizedRow) -> Result<i64, StoreError>;

    /// Returns at most `limit` rows in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the table is not prepared or the read fails.
    fn head(&self, limit: usize) -> Result<Vec<StoredRow>, StoreError>;
}

impl<B: ResultsBackend + ?Sized> ResultsBackend for Box<B> {
    fn ensure_results_table(&mut self, columns: &[ColumnSpec]) -> Result<TableStatus, StoreError> {
        (**self).ensure_results_table(columns)
    }

    fn append(&mut self, metadata: &RunMetadata, row: &NormalizedRow) -> Result<i64, StoreError> {
        (**self).append(metadata, row)
    }

    fn head(&self, limit: usize) -> Result<Vec<StoredRow>, StoreError> {
        (**self).head(limit)
    }
}
