// crates/optiface-core/src/lib.rs
// ============================================================================
// Module: Optiface Core Library
// Description: Public API surface for the Optiface core.
// Purpose: Expose the schema model, problem-space lifecycle, and row store.
// Dependencies: crate::{core, space, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Optiface core manages problem spaces: user-authored schemas describing the
//! shape of experiment results for an optimization workflow. It validates
//! and normalizes incoming rows against a schema and hands them to a results
//! backend. The core never prints and never reads wall-clock time directly;
//! hosts supply a [`Clock`] and render the returned results themselves.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;
pub mod space;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::core::*;

pub use interfaces::ColumnSpec;
pub use interfaces::ColumnType;
pub use interfaces::ResultsBackend;
pub use interfaces::StoreError;
pub use interfaces::StoredRow;
pub use interfaces::TableStatus;
pub use runtime::InMemoryResultsBackend;
pub use runtime::InsertError;
pub use runtime::InsertedRow;
pub use runtime::RowStore;
pub use runtime::RowStoreState;
pub use runtime::results_columns;
pub use space::DEFAULT_PROBLEM_NAME;
pub use space::EXPERIMENTS_DB_FILE;
pub use space::PROBLEM_SPACE_FILE;
pub use space::ProblemSpaceRegistry;
pub use space::SpaceError;
pub use space::SpaceLayout;
