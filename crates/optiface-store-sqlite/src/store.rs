// crates/optiface-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Results Store
// Description: Durable ResultsBackend backed by SQLite.
// Purpose: Persist validated rows in a schema-derived results table.
// Dependencies: optiface-core, rusqlite, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! This module implements a durable [`ResultsBackend`] using `SQLite`. The
//! `results` table is created from the schema-derived column list on first
//! use; an existing table must match that list exactly, column for column,
//! or the store fails closed with a schema mismatch. The layout version is
//! tracked in `PRAGMA user_version`.
//!
//! Values map to native column types: strings and timestamps are `TEXT`
//! (timestamps as RFC 3339 UTC), integers and booleans are `INTEGER`, and
//! floats are `REAL`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use optiface_core::Clock;
use optiface_core::ColumnSpec;
use optiface_core::FeatureType;
use optiface_core::FeatureValue;
use optiface_core::NormalizedRow;
use optiface_core::ProblemName;
use optiface_core::ProblemSpace;
use optiface_core::Provenance;
use optiface_core::ResultsBackend;
use optiface_core::RowStore;
use optiface_core::RunMetadata;
use optiface_core::SpaceLayout;
use optiface_core::StoreError;
use optiface_core::StoredRow;
use optiface_core::TableStatus;
use optiface_core::format_timestamp;
use optiface_core::parse_timestamp;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::params;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use tracing::info;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Layout version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;
/// Name of the results table.
pub const RESULTS_TABLE: &str = "results";
/// Default busy timeout (ms) for `SQLite` connections.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Number of leading run-metadata columns.
const RUN_METADATA_COLUMNS: usize = 3;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode.
    #[default]
    Wal,
    /// Delete journal mode.
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode.
    #[default]
    Full,
    /// Normal synchronous mode.
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for one problem space's results database.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with default pragmas.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }

    /// Creates a config for the results database of problem space `name`.
    #[must_use]
    pub fn for_problem(layout: &SpaceLayout, name: &ProblemName) -> Self {
        Self::new(layout.store_path(name))
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding row payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Existing results table disagrees with the schema.
    #[error("sqlite results table mismatch: {0}")]
    SchemaMismatch(String),
    /// Store layout version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Results table used before it was prepared.
    #[error("sqlite store state error: {0}")]
    State(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::SchemaMismatch(message) => Self::SchemaMismatch(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::State(message) => Self::State(message),
        }
    }
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Db(error.to_string())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed results table for one problem space.
pub struct SqliteResultsBackend {
    /// Open connection.
    connection: Connection,
    /// Database file path.
    path: PathBuf,
    /// Columns of the prepared results table.
    columns: Option<Vec<ColumnSpec>>,
}

impl SqliteResultsBackend {
    /// Opens (or creates) the database described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is unsafe, the database
    /// cannot be opened, or its layout version is unknown.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let connection = open_connection(config)?;
        check_version(&connection)?;
        debug!(path = %config.path.display(), "sqlite results store opened");
        Ok(Self {
            connection,
            path: config.path.clone(),
            columns: None,
        })
    }

    /// Returns the database file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the prepared columns.
    fn prepared_columns(&self) -> Result<&[ColumnSpec], SqliteStoreError> {
        self.columns
            .as_deref()
            .ok_or_else(|| SqliteStoreError::State("results table not prepared".to_string()))
    }

    /// Creates or verifies the results table.
    fn prepare_table(&mut self, columns: &[ColumnSpec]) -> Result<TableStatus, SqliteStoreError> {
        let tx = self.connection.transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            params![RESULTS_TABLE],
            |row| row.get(0),
        )?;
        let status = if exists {
            let existing = existing_columns(&tx)?;
            compare_columns(&existing, columns)?;
            TableStatus::Existing
        } else {
            tx.execute_batch(&create_table_sql(columns))?;
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            TableStatus::Created
        };
        tx.commit()?;
        self.columns = Some(columns.to_vec());
        Ok(status)
    }

    /// Inserts one row and returns its run id.
    fn insert(
        &self,
        metadata: &RunMetadata,
        row: &NormalizedRow,
    ) -> Result<i64, SqliteStoreError> {
        let columns = self.prepared_columns()?;
        let features = &columns[RUN_METADATA_COLUMNS.min(columns.len()) ..];
        if !features.iter().map(|column| column.name.as_str()).eq(row.iter().map(|(name, _)| name))
        {
            return Err(SqliteStoreError::Invalid(
                "row columns do not match results table".to_string(),
            ));
        }
        let timestamp = format_timestamp(metadata.timestamp_added)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let mut values =
            vec![Value::Text(timestamp), Value::Text(metadata.added_from.as_str().to_string())];
        for value in row.values() {
            values.push(to_sql_value(value)?);
        }
        let names: Vec<&str> =
            columns.iter().skip(1).map(|column| column.name.as_str()).collect();
        let sql = format!(
            "INSERT INTO {RESULTS_TABLE} ({}) VALUES ({})",
            names.iter().map(|name| quote(name)).collect::<Vec<_>>().join(", "),
            (1 ..= names.len()).map(|index| format!("?{index}")).collect::<Vec<_>>().join(", ")
        );
        self.connection.execute(&sql, params_from_iter(values))?;
        Ok(self.connection.last_insert_rowid())
    }

    /// Reads at most `limit` rows ordered by run id.
    fn select_head(&self, limit: usize) -> Result<Vec<StoredRow>, SqliteStoreError> {
        let columns = self.prepared_columns()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql = format!(
            "SELECT {} FROM {RESULTS_TABLE} ORDER BY {} ASC LIMIT ?1",
            columns.iter().map(|column| quote(&column.name)).collect::<Vec<_>>().join(", "),
            quote(columns.first().map_or("run_id", |column| column.name.as_str()))
        );
        let mut statement = self.connection.prepare(&sql)?;
        let raw_rows = statement
            .query_map(params![limit], |row| {
                (0 .. columns.len())
                    .map(|index| row.get::<_, Value>(index))
                    .collect::<rusqlite::Result<Vec<Value>>>()
            })?
            .collect::<Result<Vec<Vec<Value>>, _>>()?;
        raw_rows.into_iter().map(|raw| decode_row(columns, raw)).collect()
    }
}

impl ResultsBackend for SqliteResultsBackend {
    fn ensure_results_table(&mut self, columns: &[ColumnSpec]) -> Result<TableStatus, StoreError> {
        let status = self.prepare_table(columns)?;
        info!(
            path = %self.path.display(),
            created = status == TableStatus::Created,
            "sqlite results table ready"
        );
        Ok(status)
    }

    fn append(&mut self, metadata: &RunMetadata, row: &NormalizedRow) -> Result<i64, StoreError> {
        Ok(self.insert(metadata, row)?)
    }

    fn head(&self, limit: usize) -> Result<Vec<StoredRow>, StoreError> {
        Ok(self.select_head(limit)?)
    }
}

/// Opens a row store for `space` on the `SQLite` database in `config`.
///
/// # Errors
///
/// Returns [`StoreError`] when the database cannot be opened or its results
/// table disagrees with the schema.
pub fn open_row_store(
    space: ProblemSpace,
    config: &SqliteStoreConfig,
    clock: Box<dyn Clock>,
) -> Result<RowStore<SqliteResultsBackend>, StoreError> {
    let backend = SqliteResultsBackend::open(config)?;
    RowStore::open(space, backend, clock)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path.display().to_string().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection and applies pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    Ok(connection)
}

/// Rejects databases written with an unknown layout version.
fn check_version(connection: &Connection) -> Result<(), SqliteStoreError> {
    let version: i64 = connection.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if version == 0 || version == SCHEMA_VERSION {
        Ok(())
    } else {
        Err(SqliteStoreError::VersionMismatch(format!(
            "unsupported results store version {version} (expected {SCHEMA_VERSION})"
        )))
    }
}

/// Quotes a column identifier.
fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Builds the `CREATE TABLE` statement for `columns`.
fn create_table_sql(columns: &[ColumnSpec]) -> String {
    let definitions: Vec<String> = columns
        .iter()
        .map(|column| {
            if column.primary_key {
                format!("{} {} PRIMARY KEY ASC", quote(&column.name), column.column_type)
            } else {
                format!("{} {} NOT NULL", quote(&column.name), column.column_type)
            }
        })
        .collect();
    format!("CREATE TABLE {RESULTS_TABLE} ({});", definitions.join(", "))
}

/// Column as reported by `table_info`.
struct ExistingColumn {
    /// Column name.
    name: String,
    /// Declared SQL type, upper-cased.
    sql_type: String,
    /// Whether the column is part of the primary key.
    primary_key: bool,
}

/// Reads the existing results-table columns in declaration order.
fn existing_columns(connection: &Connection) -> Result<Vec<ExistingColumn>, SqliteStoreError> {
    let mut statement = connection
        .prepare("SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid ASC")?;
    let rows = statement.query_map(params![RESULTS_TABLE], |row| {
        Ok(ExistingColumn {
            name: row.get(0)?,
            sql_type: row.get::<_, String>(1)?.to_ascii_uppercase(),
            primary_key: row.get::<_, i64>(2)? != 0,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Checks that an existing table has exactly the requested columns.
fn compare_columns(
    existing: &[ExistingColumn],
    columns: &[ColumnSpec],
) -> Result<(), SqliteStoreError> {
    if existing.len() != columns.len() {
        return Err(SqliteStoreError::SchemaMismatch(format!(
            "table has {} columns, schema derives {}",
            existing.len(),
            columns.len()
        )));
    }
    for (index, (found, wanted)) in existing.iter().zip(columns).enumerate() {
        if found.name != wanted.name
            || found.sql_type != wanted.column_type.as_sql()
            || found.primary_key != wanted.primary_key
        {
            return Err(SqliteStoreError::SchemaMismatch(format!(
                "column {index} is `{} {}`, schema expects `{} {}`",
                found.name, found.sql_type, wanted.name, wanted.column_type
            )));
        }
    }
    Ok(())
}

/// Converts a feature value to its stored form.
fn to_sql_value(value: &FeatureValue) -> Result<Value, SqliteStoreError> {
    Ok(match value {
        FeatureValue::Str(text) => Value::Text(text.clone()),
        FeatureValue::Int(whole) => Value::Integer(*whole),
        FeatureValue::Float(real) => Value::Real(*real),
        FeatureValue::Bool(flag) => Value::Integer(i64::from(*flag)),
        FeatureValue::DateTime(instant) => Value::Text(
            format_timestamp(*instant).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?,
        ),
    })
}

/// Converts a stored value back to a feature value of `declared` type.
fn from_sql_value(
    column: &ColumnSpec,
    value: Value,
) -> Result<FeatureValue, SqliteStoreError> {
    let invalid = || {
        SqliteStoreError::Invalid(format!(
            "column `{}` holds a value that is not {}",
            column.name, column.declared_type
        ))
    };
    match (column.declared_type, value) {
        (FeatureType::Str, Value::Text(text)) => Ok(FeatureValue::Str(text)),
        (FeatureType::Int, Value::Integer(whole)) => Ok(FeatureValue::Int(whole)),
        (FeatureType::Bool, Value::Integer(flag)) => Ok(FeatureValue::Bool(flag != 0)),
        (FeatureType::Float, Value::Real(real)) => Ok(FeatureValue::Float(real)),
        #[allow(clippy::cast_precision_loss, reason = "SQLite may store whole REAL values as integers.")]
        (FeatureType::Float, Value::Integer(whole)) => Ok(FeatureValue::Float(whole as f64)),
        (FeatureType::DateTime, Value::Text(text)) => {
            parse_timestamp(&text).map(FeatureValue::DateTime).map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}

/// Decodes one selected row.
fn decode_row(columns: &[ColumnSpec], raw: Vec<Value>) -> Result<StoredRow, SqliteStoreError> {
    let mut cells = raw.into_iter();
    let (Some(run_id), Some(timestamp), Some(added_from)) = (cells.next(), cells.next(), cells.next())
    else {
        return Err(SqliteStoreError::Invalid("row is missing run metadata".to_string()));
    };
    let Value::Integer(run_id) = run_id else {
        return Err(SqliteStoreError::Invalid("run_id is not an integer".to_string()));
    };
    let timestamp_added = match timestamp {
        Value::Text(text) => parse_timestamp(&text)
            .map_err(|_| SqliteStoreError::Invalid("timestamp_added is not RFC 3339".to_string()))?,
        _ => return Err(SqliteStoreError::Invalid("timestamp_added is not text".to_string())),
    };
    let added_from = match added_from {
        Value::Text(text) => Provenance::from_str(&text).map_err(SqliteStoreError::Invalid)?,
        _ => return Err(SqliteStoreError::Invalid("added_from is not text".to_string())),
    };
    let mut values = Vec::with_capacity(columns.len().saturating_sub(RUN_METADATA_COLUMNS));
    for (column, value) in columns.iter().skip(RUN_METADATA_COLUMNS).zip(cells) {
        values.push((column.name.clone(), from_sql_value(column, value)?));
    }
    Ok(StoredRow {
        run_id,
        timestamp_added,
        added_from,
        values: NormalizedRow::from_ordered(values),
    })
}
