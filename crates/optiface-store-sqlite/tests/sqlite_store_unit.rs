// crates/optiface-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite Results Store Unit Tests
// Description: Table creation, persistence, and fail-closed reopening.
// Purpose: Validate path safety, schema checks, versioning, and round trips.
// ============================================================================

//! ## Overview
//! Unit-level tests for the `SQLite` results store:
//! - Results table columns follow the schema-derived column list
//! - Rows survive a reopen with their metadata and typed values
//! - Changed schemas and unknown layout versions fail closed
//! - Path safety checks reject unusable paths

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;

use optiface_core::FeatureDefinition;
use optiface_core::FeatureType;
use optiface_core::FeatureValue;
use optiface_core::FixedClock;
use optiface_core::InsertError;
use optiface_core::ProblemName;
use optiface_core::ProblemSpace;
use optiface_core::Provenance;
use optiface_core::RawRow;
use optiface_core::RowError;
use optiface_core::RowStore;
use optiface_core::SpaceLayout;
use optiface_core::StoreError;
use optiface_store_sqlite::RESULTS_TABLE;
use optiface_store_sqlite::SCHEMA_VERSION;
use optiface_store_sqlite::SqliteResultsBackend;
use optiface_store_sqlite::SqliteStoreConfig;
use optiface_store_sqlite::SqliteStoreError;
use optiface_store_sqlite::SqliteStoreMode;
use optiface_store_sqlite::SqliteSyncMode;
use optiface_store_sqlite::open_row_store;
use rusqlite::Connection;
use tempfile::TempDir;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn instant() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
}

fn clock() -> Box<FixedClock> {
    Box::new(FixedClock::new(instant()))
}

fn graph_space() -> ProblemSpace {
    ProblemSpace::new(
        ProblemName::new("graphs").unwrap(),
        vec![
            FeatureDefinition::required("graph", FeatureType::Str, "Graph", "g").unwrap(),
            FeatureDefinition::optional("directed", false, "Directed", "dir").unwrap(),
            FeatureDefinition::optional("generated_at", instant(), "Generated At", "gen").unwrap(),
        ],
        vec![FeatureDefinition::optional("threads", 4_i64, "Threads", "thr").unwrap()],
        vec![FeatureDefinition::required("cost", FeatureType::Float, "Cost", "c").unwrap()],
    )
    .unwrap()
}

fn graph_row(graph: &str, cost: f64) -> RawRow {
    RawRow::new().with("graph", graph).with("cost", cost).with("directed", true)
}

fn config(dir: &Path) -> SqliteStoreConfig {
    SqliteStoreConfig::new(dir.join("graphs").join("experiments.db"))
}

fn table_columns(path: &Path) -> Vec<(String, String, i64)> {
    let connection = Connection::open(path).unwrap();
    let mut statement = connection
        .prepare("SELECT name, type, pk FROM pragma_table_info('results') ORDER BY cid")
        .unwrap();
    statement
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

// ============================================================================
// SECTION: Table Layout
// ============================================================================

#[test]
fn results_table_follows_the_derived_columns() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    let store = open_row_store(graph_space(), &config, clock()).unwrap();
    drop(store);

    let columns = table_columns(&config.path);
    let expected = [
        ("run_id", "INTEGER", 1),
        ("timestamp_added", "TEXT", 0),
        ("added_from", "TEXT", 0),
        ("graph", "TEXT", 0),
        ("directed", "INTEGER", 0),
        ("generated_at", "TEXT", 0),
        ("threads", "INTEGER", 0),
        ("cost", "REAL", 0),
    ];
    assert_eq!(columns.len(), expected.len());
    for ((name, sql_type, pk), (want_name, want_type, want_pk)) in columns.iter().zip(expected) {
        assert_eq!((name.as_str(), sql_type.as_str(), *pk), (want_name, want_type, want_pk));
    }
}

#[test]
fn fresh_database_records_the_layout_version() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    drop(open_row_store(graph_space(), &config, clock()).unwrap());
    let connection = Connection::open(&config.path).unwrap();
    let version: i64 =
        connection.pragma_query_value(None, "user_version", |row| row.get(0)).unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

// ============================================================================
// SECTION: Persistence
// ============================================================================

#[test]
fn rows_survive_a_reopen_with_typed_values() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    {
        let mut store = open_row_store(graph_space(), &config, clock()).unwrap();
        assert_eq!(store.insert_row(graph_row("petersen", 15.5), Provenance::Csv).unwrap().run_id, 1);
        assert_eq!(store.insert_row(graph_row("k5", 10.0), Provenance::Manual).unwrap().run_id, 2);
    }

    let store = open_row_store(graph_space(), &config, clock()).unwrap();
    let rows = store.head(10).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].run_id, 1);
    assert_eq!(rows[0].timestamp_added, instant());
    assert_eq!(rows[0].added_from, Provenance::Csv);
    assert_eq!(rows[1].added_from, Provenance::Manual);
    assert_eq!(rows[0].values.get("graph"), Some(&FeatureValue::from("petersen")));
    assert_eq!(rows[0].values.get("directed"), Some(&FeatureValue::Bool(true)));
    assert_eq!(rows[0].values.get("generated_at"), Some(&FeatureValue::DateTime(instant())));
    assert_eq!(rows[0].values.get("threads"), Some(&FeatureValue::Int(4)));
    assert_eq!(rows[1].values.get("cost"), Some(&FeatureValue::Float(10.0)));
}

#[test]
fn head_limits_and_orders_by_run_id() {
    let dir = TempDir::new().unwrap();
    let mut store = open_row_store(graph_space(), &config(dir.path()), clock()).unwrap();
    for index in 0 .. 5 {
        store.insert_row(graph_row(&format!("g{index}"), 1.0), Provenance::Csv).unwrap();
    }
    let rows = store.head(3).unwrap();
    let ids: Vec<i64> = rows.iter().map(|row| row.run_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(store.head(0).unwrap().is_empty());
}

#[test]
fn rejected_rows_leave_the_table_untouched() {
    let dir = TempDir::new().unwrap();
    let mut store = open_row_store(graph_space(), &config(dir.path()), clock()).unwrap();
    let result = store.insert_row(RawRow::new().with("graph", "g"), Provenance::Csv);
    assert!(matches!(result, Err(InsertError::Rejected(_))));
    assert!(store.head(10).unwrap().is_empty());
}

#[test]
fn nan_costs_are_rejected_before_reaching_sqlite() {
    let dir = TempDir::new().unwrap();
    let mut store = open_row_store(graph_space(), &config(dir.path()), clock()).unwrap();
    let result = store.insert_row(graph_row("petersen", f64::NAN), Provenance::Csv);
    let Err(InsertError::Rejected(failure)) = result else {
        panic!("expected a validation rejection");
    };
    assert_eq!(failure.errors["cost"], vec![RowError::NonFiniteFloat]);
    store.insert_row(graph_row("petersen", 15.0), Provenance::Csv).unwrap();
    assert_eq!(store.head(10).unwrap().len(), 1);
}

// ============================================================================
// SECTION: Fail-Closed Reopening
// ============================================================================

#[test]
fn changed_schema_is_a_mismatch() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    drop(open_row_store(graph_space(), &config, clock()).unwrap());

    let narrower = ProblemSpace::new(
        ProblemName::new("graphs").unwrap(),
        vec![FeatureDefinition::required("graph", FeatureType::Str, "Graph", "g").unwrap()],
        Vec::new(),
        vec![FeatureDefinition::required("cost", FeatureType::Float, "Cost", "c").unwrap()],
    )
    .unwrap();
    let result = open_row_store(narrower, &config, clock());
    assert!(matches!(result, Err(StoreError::SchemaMismatch(_))));
}

#[test]
fn retyped_column_is_a_mismatch() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    drop(open_row_store(graph_space(), &config, clock()).unwrap());

    let retyped = ProblemSpace::new(
        ProblemName::new("graphs").unwrap(),
        vec![
            FeatureDefinition::required("graph", FeatureType::Str, "Graph", "g").unwrap(),
            FeatureDefinition::optional("directed", false, "Directed", "dir").unwrap(),
            FeatureDefinition::optional("generated_at", instant(), "Generated At", "gen").unwrap(),
        ],
        vec![FeatureDefinition::optional("threads", 4.0, "Threads", "thr").unwrap()],
        vec![FeatureDefinition::required("cost", FeatureType::Float, "Cost", "c").unwrap()],
    )
    .unwrap();
    let result = open_row_store(retyped, &config, clock());
    assert!(matches!(result, Err(StoreError::SchemaMismatch(message)) if message.contains("threads")));
}

#[test]
fn unknown_layout_version_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path());
    drop(open_row_store(graph_space(), &config, clock()).unwrap());
    Connection::open(&config.path).unwrap().pragma_update(None, "user_version", 99_i64).unwrap();

    let result = SqliteResultsBackend::open(&config);
    assert!(matches!(result, Err(SqliteStoreError::VersionMismatch(_))));
    let result = open_row_store(graph_space(), &config, clock());
    assert!(matches!(result, Err(StoreError::VersionMismatch(_))));
}

#[test]
fn backend_can_be_driven_through_row_store_open() {
    let dir = TempDir::new().unwrap();
    let backend = SqliteResultsBackend::open(&config(dir.path())).unwrap();
    assert!(backend.path().ends_with("graphs/experiments.db"));
    let store = RowStore::open(graph_space(), backend, clock()).unwrap();
    assert!(store.head(1).unwrap().is_empty());
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

#[test]
fn config_for_problem_points_into_the_space_directory() {
    let layout = SpaceLayout::new("/srv/optiface");
    let config = SqliteStoreConfig::for_problem(&layout, &ProblemName::new("tsp").unwrap());
    assert_eq!(config.path, Path::new("/srv/optiface/tsp/experiments.db"));
    assert_eq!(config.busy_timeout_ms, 5_000);
    assert_eq!(config.journal_mode, SqliteStoreMode::Wal);
    assert_eq!(config.sync_mode, SqliteSyncMode::Full);
    assert_eq!(RESULTS_TABLE, "results");
}

#[test]
fn delete_journal_and_normal_sync_are_accepted() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path());
    config.journal_mode = SqliteStoreMode::Delete;
    config.sync_mode = SqliteSyncMode::Normal;
    let mut store = open_row_store(graph_space(), &config, clock()).unwrap();
    store.insert_row(graph_row("g", 2.0), Provenance::Csv).unwrap();
    assert_eq!(store.head(5).unwrap().len(), 1);
}

// ============================================================================
// SECTION: Path Safety
// ============================================================================

#[test]
fn directory_paths_are_rejected() {
    let dir = TempDir::new().unwrap();
    let result = SqliteResultsBackend::open(&SqliteStoreConfig::new(dir.path()));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn overlong_components_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a".repeat(300)).join("experiments.db");
    let result = SqliteResultsBackend::open(&SqliteStoreConfig::new(path));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn empty_paths_are_rejected() {
    let result = SqliteResultsBackend::open(&SqliteStoreConfig::new(""));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}
