// crates/optiface-cli/src/import.rs
// ============================================================================
// Module: CSV Import
// Description: Reads CSV result files into raw rows and inserts them.
// Purpose: Bulk-load historical results into a problem space's store.
// Dependencies: csv, optiface-core, thiserror, tracing
// ============================================================================

//! ## Overview
//! The header row names the columns. Each cell is typed by the declared type
//! of the feature with the same name; cells that do not parse stay strings so
//! the core reports them as type mismatches. Empty cells become nulls, and
//! columns that match no feature are kept as strings so validation can note
//! and drop them. A ragged record only affects its own row.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;

use optiface_core::FeatureValue;
use optiface_core::InsertError;
use optiface_core::InsertedRow;
use optiface_core::ProblemSpace;
use optiface_core::Provenance;
use optiface_core::RawRow;
use optiface_core::ResultsBackend;
use optiface_core::RowStore;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum CSV file size accepted for import.
pub const MAX_IMPORT_BYTES: u64 = 64 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures that stop an import before any row is inserted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// File could not be opened or read.
    #[error("csv io error: {0}")]
    Io(String),
    /// File is larger than [`MAX_IMPORT_BYTES`].
    #[error("csv file exceeds size limit ({actual} > {limit} bytes)")]
    TooLarge {
        /// Configured limit.
        limit: u64,
        /// Observed size.
        actual: u64,
    },
    /// Malformed CSV.
    #[error("csv parse error: {0}")]
    Csv(String),
}

// ============================================================================
// SECTION: Reading
// ============================================================================

/// Reads CSV text into raw rows typed against `space`.
///
/// Records need not match the header width. Missing trailing cells are left
/// absent, so validation reports any required feature they held. Cells past
/// the last header are kept under positional names and dropped with a note.
///
/// # Errors
///
/// Returns [`ImportError::Csv`] when the header or any record is unreadable.
pub fn read_rows<R: Read>(space: &ProblemSpace, reader: R) -> Result<Vec<RawRow>, ImportError> {
    let mut csv_reader =
        csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|err| ImportError::Csv(err.to_string()))?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|err| ImportError::Csv(format!("row {}: {err}", index + 1)))?;
        if record.len() != headers.len() {
            debug!(
                row = index + 1,
                fields = record.len(),
                expected = headers.len(),
                "csv record width differs from header"
            );
        }
        let row: RawRow = record
            .iter()
            .enumerate()
            .map(|(position, cell)| {
                let column =
                    headers.get(position).cloned().unwrap_or_else(|| extra_column(position));
                let value = typed_cell(space, &column, cell);
                (column, value)
            })
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Reads a CSV file into raw rows typed against `space`.
///
/// # Errors
///
/// Returns [`ImportError`] when the file is unreadable, too large, or
/// malformed.
pub fn read_rows_from_path(space: &ProblemSpace, path: &Path) -> Result<Vec<RawRow>, ImportError> {
    let file = File::open(path).map_err(|err| ImportError::Io(err.to_string()))?;
    let actual = file.metadata().map_err(|err| ImportError::Io(err.to_string()))?.len();
    if actual > MAX_IMPORT_BYTES {
        return Err(ImportError::TooLarge {
            limit: MAX_IMPORT_BYTES,
            actual,
        });
    }
    read_rows(space, file)
}

/// Names a cell that has no header; never a valid feature identifier.
fn extra_column(position: usize) -> String {
    format!("extra column {}", position + 1)
}

/// Types one cell by the declared type of its column.
fn typed_cell(space: &ProblemSpace, column: &str, cell: &str) -> Option<FeatureValue> {
    if cell.trim().is_empty() {
        return None;
    }
    Some(match space.feature(column) {
        Some(feature) => FeatureValue::parse_as(cell, feature.declared_type()),
        None => FeatureValue::Str(cell.to_string()),
    })
}

// ============================================================================
// SECTION: Inserting
// ============================================================================

/// Per-row outcomes of an import, numbered from 1 in file order.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Rows that were stored.
    pub inserted: Vec<(usize, InsertedRow)>,
    /// Rows that were rejected or failed to store.
    pub failed: Vec<(usize, InsertError)>,
}

impl ImportReport {
    /// Returns true when every row was stored.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Inserts `rows` with CSV provenance, continuing past failures.
pub fn import_rows<B: ResultsBackend>(store: &mut RowStore<B>, rows: Vec<RawRow>) -> ImportReport {
    let mut report = ImportReport::default();
    for (index, outcome) in store.insert_rows(rows, Provenance::Csv).into_iter().enumerate() {
        match outcome {
            Ok(inserted) => report.inserted.push((index + 1, inserted)),
            Err(error) => {
                warn!(row = index + 1, error = %error, "csv row not imported");
                report.failed.push((index + 1, error));
            }
        }
    }
    info!(
        problem = %store.space().name(),
        inserted = report.inserted.len(),
        failed = report.failed.len(),
        "csv import finished"
    );
    report
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use optiface_core::FeatureValue;
    use optiface_core::ProblemName;
    use optiface_core::ProblemSpace;

    use super::read_rows;

    #[test]
    fn cells_are_typed_by_feature() {
        let space = ProblemSpace::with_default_schema(ProblemName::new("p").unwrap()).unwrap();
        let text = "set_name,n,rep,objective,note\nalpha, 7 ,,1.5,hi\n";
        let rows = read_rows(&space, text.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.get("set_name"), Some(Some(&FeatureValue::from("alpha"))));
        assert_eq!(row.get("n"), Some(Some(&FeatureValue::Int(7))));
        assert_eq!(row.get("rep"), Some(None));
        assert_eq!(row.get("objective"), Some(Some(&FeatureValue::Float(1.5))));
        assert_eq!(row.get("note"), Some(Some(&FeatureValue::from("hi"))));
    }

    #[test]
    fn ragged_records_keep_their_own_cells() {
        let space = ProblemSpace::with_default_schema(ProblemName::new("p").unwrap()).unwrap();
        let text = "set_name,n,solver
alpha
beta,3,dp,late,
";
        let rows = read_rows(&space, text.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("set_name"), Some(Some(&FeatureValue::from("alpha"))));
        assert_eq!(rows[0].get("n"), None);
        assert_eq!(rows[1].get("solver"), Some(Some(&FeatureValue::from("dp"))));
        assert_eq!(rows[1].get("extra column 4"), Some(Some(&FeatureValue::from("late"))));
        assert_eq!(rows[1].get("extra column 5"), Some(None));
    }
}
