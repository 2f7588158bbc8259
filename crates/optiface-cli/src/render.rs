// crates/optiface-cli/src/render.rs
// ============================================================================
// Module: Terminal Rendering
// Description: Text and CSV renderings of problem spaces and stored rows.
// Purpose: Keep all output formatting out of the core.
// Dependencies: csv, optiface-core, thiserror
// ============================================================================

//! ## Overview
//! Renderers return strings or write to a caller-supplied writer so the
//! binary decides where output goes. Stored rows are written as CSV with a
//! header row, using the same column order as the results table.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use optiface_core::ColumnSpec;
use optiface_core::FeatureValue;
use optiface_core::ProblemName;
use optiface_core::ProblemSpace;
use optiface_core::StoredRow;
use optiface_core::format_timestamp;
use thiserror::Error;

use crate::import::ImportReport;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Rendering failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("render error: {0}")]
pub struct RenderError(String);

// ============================================================================
// SECTION: Problem Spaces
// ============================================================================

/// Renders the problem-space listing, marking the current space with `*`.
#[must_use]
pub fn render_problem_list(problems: &[ProblemName], current: &ProblemName) -> Vec<String> {
    problems
        .iter()
        .map(|name| {
            let marker = if name == current { '*' } else { ' ' };
            format!("{marker} {name}")
        })
        .collect()
}

/// Renders a problem space with its run-metadata columns.
#[must_use]
pub fn render_space(space: &ProblemSpace) -> String {
    let run = space.run_features().names().join(", ");
    format!("{space}\n\trun metadata: {run}")
}

// ============================================================================
// SECTION: Stored Rows
// ============================================================================

/// Writes `rows` as CSV under a header of `columns`.
///
/// # Errors
///
/// Returns [`RenderError`] when writing fails or a timestamp cannot be
/// formatted.
pub fn write_rows_csv<W: Write>(
    writer: W,
    columns: &[ColumnSpec],
    rows: &[StoredRow],
) -> Result<(), RenderError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(columns.iter().map(|column| column.name.as_str()))
        .map_err(|err| RenderError(err.to_string()))?;
    for row in rows {
        let mut record = vec![
            row.run_id.to_string(),
            format_timestamp(row.timestamp_added).map_err(|err| RenderError(err.to_string()))?,
            row.added_from.as_str().to_string(),
        ];
        for value in row.values.values() {
            record.push(cell_text(value)?);
        }
        csv_writer.write_record(&record).map_err(|err| RenderError(err.to_string()))?;
    }
    csv_writer.flush().map_err(|err| RenderError(err.to_string()))
}

/// Renders a value as a bare CSV cell.
fn cell_text(value: &FeatureValue) -> Result<String, RenderError> {
    match value {
        FeatureValue::Str(text) => Ok(text.clone()),
        FeatureValue::DateTime(instant) => {
            format_timestamp(*instant).map_err(|err| RenderError(err.to_string()))
        }
        other => Ok(other.to_string()),
    }
}

// ============================================================================
// SECTION: Import Reports
// ============================================================================

/// Renders one line per failed row followed by a summary line.
#[must_use]
pub fn render_import_report(report: &ImportReport) -> Vec<String> {
    let mut lines: Vec<String> =
        report.failed.iter().map(|(row, error)| format!("row {row}: {error}")).collect();
    lines.push(format!(
        "imported {} row(s), {} failed",
        report.inserted.len(),
        report.failed.len()
    ));
    lines
}
