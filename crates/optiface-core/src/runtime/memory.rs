// crates/optiface-core/src/runtime/memory.rs
// ============================================================================
// Module: Optiface In-Memory Results Backend
// Description: Process-local results table for tests and dry runs.
// Purpose: Provide a ResultsBackend with the same column checks as durable stores.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`InMemoryResultsBackend`] keeps one results table in a `Vec`. It applies
//! the same contract as durable backends: the column list is fixed on first
//! use, a later mismatch fails closed, and run ids count up from 1.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::NormalizedRow;
use crate::core::RunMetadata;
use crate::interfaces::ColumnSpec;
use crate::interfaces::ResultsBackend;
use crate::interfaces::StoreError;
use crate::interfaces::StoredRow;
use crate::interfaces::TableStatus;

// ============================================================================
// SECTION: Backend
// ============================================================================

/// In-memory results table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResultsBackend {
    /// Columns fixed by the first `ensure_results_table` call.
    columns: Option<Vec<ColumnSpec>>,
    /// Stored rows in insertion order.
    rows: Vec<StoredRow>,
}

impl InMemoryResultsBackend {
    /// Creates a backend with no results table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: None,
            rows: Vec::new(),
        }
    }

    /// Returns the table columns, if the table exists.
    #[must_use]
    pub fn columns(&self) -> Option<&[ColumnSpec]> {
        self.columns.as_deref()
    }

    /// Returns the number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when no rows are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Checks that `row` carries exactly the non-metadata columns, in order.
    fn check_row(columns: &[ColumnSpec], row: &NormalizedRow) -> Result<(), StoreError> {
        let expected = columns.iter().skip(RUN_METADATA_COLUMNS).map(|column| column.name.as_str());
        if expected.eq(row.iter().map(|(name, _)| name)) {
            Ok(())
        } else {
            Err(StoreError::Invalid("row columns do not match results table".to_string()))
        }
    }
}

/// Number of leading run-metadata columns in every results table.
const RUN_METADATA_COLUMNS: usize = 3;

impl ResultsBackend for InMemoryResultsBackend {
    fn ensure_results_table(&mut self, columns: &[ColumnSpec]) -> Result<TableStatus, StoreError> {
        match &self.columns {
            None => {
                self.columns = Some(columns.to_vec());
                Ok(TableStatus::Created)
            }
            Some(existing) if existing.as_slice() == columns => Ok(TableStatus::Existing),
            Some(_) => Err(StoreError::SchemaMismatch(
                "existing in-memory table has different columns".to_string(),
            )),
        }
    }

    fn append(&mut self, metadata: &RunMetadata, row: &NormalizedRow) -> Result<i64, StoreError> {
        let Some(columns) = &self.columns else {
            return Err(StoreError::State("results table not created".to_string()));
        };
        Self::check_row(columns, row)?;
        let run_id = i64::try_from(self.rows.len())
            .ok()
            .and_then(|count| count.checked_add(1))
            .ok_or_else(|| StoreError::Store("run id space exhausted".to_string()))?;
        self.rows.push(StoredRow {
            run_id,
            timestamp_added: metadata.timestamp_added,
            added_from: metadata.added_from,
            values: row.clone(),
        });
        Ok(run_id)
    }

    fn head(&self, limit: usize) -> Result<Vec<StoredRow>, StoreError> {
        if self.columns.is_none() {
            return Err(StoreError::State("results table not created".to_string()));
        }
        Ok(self.rows.iter().take(limit).cloned().collect())
    }
}
