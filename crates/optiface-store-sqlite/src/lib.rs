// crates/optiface-store-sqlite/src/lib.rs
// ============================================================================
// Module: Optiface SQLite Store Library
// Description: SQLite-backed results tables for problem spaces.
// Purpose: Persist validated rows durably, one database per problem space.
// Dependencies: optiface-core, rusqlite
// ============================================================================

//! ## Overview
//! `optiface-store-sqlite` implements [`optiface_core::ResultsBackend`] on top
//! of `SQLite`. Each problem space owns one database file holding a single
//! `results` table whose columns are derived from the schema.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::RESULTS_TABLE;
pub use store::SCHEMA_VERSION;
pub use store::SqliteResultsBackend;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
pub use store::open_row_store;
