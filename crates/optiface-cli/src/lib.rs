// crates/optiface-cli/src/lib.rs
// ============================================================================
// Module: Optiface CLI Library
// Description: Shared helpers for the optiface command-line interface.
// Purpose: Keep CSV ingestion, rendering, and logging setup testable.
// Dependencies: csv, optiface-core, tracing-subscriber
// ============================================================================

//! ## Overview
//! This library houses the pieces of the `optiface` binary that are worth
//! testing on their own: turning CSV files into raw rows, rendering problem
//! spaces and stored rows for the terminal, and installing the log
//! subscriber. Validation never happens here; rows go to the core untouched
//! apart from cell typing.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod import;
pub mod logging;
pub mod render;
