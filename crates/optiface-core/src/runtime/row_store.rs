// crates/optiface-core/src/runtime/row_store.rs
// ============================================================================
// Module: Optiface Row Store
// Description: Validating row store driven by an explicit lifecycle.
// Purpose: Persist only rows that pass validation, stamped with run metadata.
// Dependencies: crate::{core, interfaces}, thiserror, tracing
// ============================================================================

//! ## Overview
//! A [`RowStore`] binds one problem space to one [`ResultsBackend`]. Opening
//! it derives the results-table columns from the schema, asks the backend to
//! create or check that table, and only then accepts rows:
//! `Uninitialized -> SchemaChecked -> Ready`.
//!
//! Each insert validates the row first. Rejected rows are returned to the
//! caller untouched and nothing is written. Bulk inserts treat every row
//! independently; there is no surrounding transaction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;
use tracing::info;

use crate::core::Clock;
use crate::core::ProblemSpace;
use crate::core::Provenance;
use crate::core::RUN_ID;
use crate::core::RawRow;
use crate::core::RowNotes;
use crate::core::RunMetadata;
use crate::core::ValidationFailure;
use crate::interfaces::ColumnSpec;
use crate::interfaces::ResultsBackend;
use crate::interfaces::StoreError;
use crate::interfaces::StoredRow;
use crate::interfaces::TableStatus;

// ============================================================================
// SECTION: Columns
// ============================================================================

/// Derives the results-table columns for `space`.
///
/// Run metadata comes first (`run_id` as the row key), followed by the full
/// feature list in instance, solver, output order.
#[must_use]
pub fn results_columns(space: &ProblemSpace) -> Vec<ColumnSpec> {
    let run = space.run_features().iter().map(|feature| {
        let column = ColumnSpec::new(feature.name(), feature.declared_type());
        if feature.name() == RUN_ID { column.into_primary_key() } else { column }
    });
    let features = space
        .full_feature_list()
        .into_iter()
        .map(|feature| ColumnSpec::new(feature.name(), feature.declared_type()));
    run.chain(features).collect()
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

/// Row store lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStoreState {
    /// Backend opened; results table not yet checked.
    Uninitialized,
    /// Results table created or verified against the schema.
    SchemaChecked,
    /// Accepting rows.
    Ready,
}

impl RowStoreState {
    /// Transitions `Uninitialized -> SchemaChecked`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::State`] from any other state.
    pub fn schema_checked(self) -> Result<Self, StoreError> {
        match self {
            Self::Uninitialized => Ok(Self::SchemaChecked),
            other => Err(other.illegal("schema check")),
        }
    }

    /// Transitions `SchemaChecked -> Ready`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::State`] from any other state.
    pub fn ready(self) -> Result<Self, StoreError> {
        match self {
            Self::SchemaChecked => Ok(Self::Ready),
            other => Err(other.illegal("ready")),
        }
    }

    /// Succeeds only in the `Ready` state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::State`] when rows cannot be accepted yet.
    pub fn ensure_ready(self) -> Result<(), StoreError> {
        match self {
            Self::Ready => Ok(()),
            other => Err(other.illegal("row access")),
        }
    }

    /// Builds the error for an illegal transition out of `self`.
    fn illegal(self, action: &str) -> StoreError {
        StoreError::State(format!("{action} not allowed in state {self}"))
    }
}

impl fmt::Display for RowStoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::SchemaChecked => "schema_checked",
            Self::Ready => "ready",
        })
    }
}

// ============================================================================
// SECTION: Insert Results
// ============================================================================

/// Row accepted and persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertedRow {
    /// Store-assigned row identifier.
    pub run_id: i64,
    /// Validation notes (defaults applied, dropped columns).
    pub notes: RowNotes,
}

/// Row not persisted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InsertError {
    /// Row failed validation; nothing was written.
    #[error(transparent)]
    Rejected(#[from] ValidationFailure),
    /// Backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Row Store
// ============================================================================

/// Validating store for one problem space's results.
pub struct RowStore<B> {
    /// Schema the results table was derived from.
    space: ProblemSpace,
    /// Physical storage.
    backend: B,
    /// Source of `timestamp_added`.
    clock: Box<dyn Clock>,
    /// Schema-derived results-table columns.
    columns: Vec<ColumnSpec>,
    /// Lifecycle state.
    state: RowStoreState,
}

impl<B: ResultsBackend> RowStore<B> {
    /// Opens a row store, creating or checking the results table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SchemaMismatch`] when an existing table disagrees
    /// with the schema, or another [`StoreError`] when the backend fails.
    pub fn open(
        space: ProblemSpace,
        mut backend: B,
        clock: Box<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let columns = results_columns(&space);
        let mut state = RowStoreState::Uninitialized;
        let status = backend.ensure_results_table(&columns)?;
        state = state.schema_checked()?;
        state = state.ready()?;
        info!(
            problem = %space.name(),
            columns = columns.len(),
            created = status == TableStatus::Created,
            "row store ready"
        );
        Ok(Self {
            space,
            backend,
            clock,
            columns,
            state,
        })
    }

    /// Returns the problem space backing this store.
    #[must_use]
    pub const fn space(&self) -> &ProblemSpace {
        &self.space
    }

    /// Returns the results-table columns.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RowStoreState {
        self.state
    }

    /// Returns the backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Consumes the store, returning the backend.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Validates and persists one row.
    ///
    /// # Errors
    ///
    /// Returns [`InsertError::Rejected`] when validation fails (nothing is
    /// written) or [`InsertError::Store`] when the backend fails.
    pub fn insert_row(
        &mut self,
        row: RawRow,
        provenance: Provenance,
    ) -> Result<InsertedRow, InsertError> {
        self.state.ensure_ready()?;
        let validated = self.space.validate_row(row).inspect_err(|failure| {
            debug!(
                problem = %self.space.name(),
                errors = failure.errors.len(),
                "row rejected"
            );
        })?;
        let metadata = RunMetadata {
            timestamp_added: self.stamp()?,
            added_from: provenance,
        };
        let run_id = self.backend.append(&metadata, &validated.row)?;
        debug!(problem = %self.space.name(), run_id, "row stored");
        Ok(InsertedRow {
            run_id,
            notes: validated.notes,
        })
    }

    /// Inserts rows one by one, in input order.
    ///
    /// A rejected or failed row does not stop later rows; the result for
    /// each row is returned in the same position.
    pub fn insert_rows<I>(
        &mut self,
        rows: I,
        provenance: Provenance,
    ) -> Vec<Result<InsertedRow, InsertError>>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let results: Vec<_> = rows.into_iter().map(|row| self.insert_row(row, provenance)).collect();
        let stored = results.iter().filter(|result| result.is_ok()).count();
        info!(
            problem = %self.space.name(),
            provenance = %provenance,
            stored,
            failed = results.len() - stored,
            "bulk insert finished"
        );
        results
    }

    /// Returns at most `limit` persisted rows, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is not ready or the read fails.
    pub fn head(&self, limit: usize) -> Result<Vec<StoredRow>, StoreError> {
        self.state.ensure_ready()?;
        self.backend.head(limit)
    }

    /// Returns the current instant at whole-second precision.
    fn stamp(&self) -> Result<OffsetDateTime, StoreError> {
        self.clock
            .now()
            .replace_nanosecond(0)
            .map_err(|err| StoreError::Invalid(format!("clock returned unusable instant: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::RowStoreState;
    use crate::interfaces::StoreError;

    #[test]
    fn lifecycle_only_moves_forward() {
        let state = RowStoreState::Uninitialized;
        assert!(matches!(state.ensure_ready(), Err(StoreError::State(_))));
        assert!(matches!(state.ready(), Err(StoreError::State(_))));
        let checked = state.schema_checked();
        assert_eq!(checked, Ok(RowStoreState::SchemaChecked));
        let ready = RowStoreState::SchemaChecked.ready();
        assert_eq!(ready, Ok(RowStoreState::Ready));
        assert!(RowStoreState::Ready.schema_checked().is_err());
        assert_eq!(RowStoreState::Ready.ensure_ready(), Ok(()));
    }
}
