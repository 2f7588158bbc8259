// crates/optiface-core/src/runtime/mod.rs
// ============================================================================
// Module: Optiface Runtime
// Description: Row store lifecycle and the in-memory results backend.
// Purpose: Validate rows, stamp run metadata, and hand them to a backend.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime wires a [`crate::core::ProblemSpace`] to a
//! [`crate::interfaces::ResultsBackend`]. [`RowStore`] walks an explicit
//! lifecycle before accepting rows and never persists a row that failed
//! validation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod memory;
pub mod row_store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use memory::InMemoryResultsBackend;
pub use row_store::InsertError;
pub use row_store::InsertedRow;
pub use row_store::RowStore;
pub use row_store::RowStoreState;
pub use row_store::results_columns;
