// crates/optiface-config/src/config.rs
// ============================================================================
// Module: Optiface Configuration
// Description: Configuration loading and validation for optiface.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: optiface-core, optiface-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, else `OPTIFACE_CONFIG`, else
//! `./optiface.toml`. Only the implicit default file may be absent, in which
//! case built-in defaults apply; every other failure is an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use optiface_core::DEFAULT_PROBLEM_NAME;
use optiface_core::ProblemName;
use optiface_core::SpaceLayout;
use optiface_store_sqlite::SqliteStoreConfig;
use optiface_store_sqlite::SqliteStoreMode;
use optiface_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "optiface.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "OPTIFACE_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default space root directory.
const DEFAULT_SPACE_ROOT: &str = "space";
/// Default busy timeout (ms) for results databases.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default log filter directive.
const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level optiface configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OptifaceConfig {
    /// Problem-space directory settings.
    #[serde(default)]
    pub space: SpaceConfig,
    /// Results database settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

impl OptifaceConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let source = resolve_path(path)?;
        Self::load_source(&source)
    }

    /// Loads a resolved config source.
    fn load_source(source: &ConfigSource) -> Result<Self, ConfigError> {
        validate_path(&source.path)?;
        let bytes = match fs::read(&source.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound && !source.explicit => {
                return Ok(Self::default());
            }
            Err(err) => return Err(ConfigError::Io(err.to_string())),
        };
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.space.validate()?;
        self.store.validate()?;
        self.log.validate()
    }

    /// Returns the directory layout rooted at `space.root`.
    #[must_use]
    pub fn layout(&self) -> SpaceLayout {
        SpaceLayout::new(self.space.root.clone())
    }

    /// Returns the results database config for problem space `name`.
    #[must_use]
    pub fn sqlite_config(&self, name: &ProblemName) -> SqliteStoreConfig {
        SqliteStoreConfig {
            busy_timeout_ms: self.store.busy_timeout_ms,
            journal_mode: self.store.journal_mode,
            sync_mode: self.store.sync_mode,
            ..SqliteStoreConfig::for_problem(&self.layout(), name)
        }
    }
}

/// Problem-space directory configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpaceConfig {
    /// Directory holding one subdirectory per problem space.
    #[serde(default = "default_space_root")]
    pub root: PathBuf,
    /// Name of the problem space synthesized into an empty root.
    #[serde(default = "default_problem_name")]
    pub default_problem: String,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            root: default_space_root(),
            default_problem: default_problem_name(),
        }
    }
}

impl SpaceConfig {
    /// Returns the validated default problem name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configured name is not a valid
    /// problem-space name.
    pub fn default_name(&self) -> Result<ProblemName, ConfigError> {
        ProblemName::new(self.default_problem.as_str())
            .map_err(|err| ConfigError::Invalid(format!("space.default_problem: {err}")))
    }

    /// Validates space configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("space.root", &self.root.to_string_lossy())?;
        self.default_name().map(drop)
    }
}

/// Results database configuration applied to every problem space.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid("store.busy_timeout_ms must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl LogConfig {
    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log.filter must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Returns the default space root.
fn default_space_root() -> PathBuf {
    PathBuf::from(DEFAULT_SPACE_ROOT)
}

/// Returns the default problem name.
fn default_problem_name() -> String {
    DEFAULT_PROBLEM_NAME.to_string()
}

/// Returns the default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default log filter.
fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolved config location.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfigSource {
    /// Path to read.
    path: PathBuf,
    /// Whether the caller or environment named the path.
    explicit: bool,
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<ConfigSource, ConfigError> {
    if let Some(path) = path {
        return Ok(ConfigSource {
            path: path.to_path_buf(),
            explicit: true,
        });
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ConfigSource {
            path: PathBuf::from(env_path),
            explicit: true,
        });
    }
    Ok(ConfigSource {
        path: PathBuf::from(DEFAULT_CONFIG_NAME),
        explicit: false,
    })
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::ConfigSource;
    use super::OptifaceConfig;
    use super::validate_path_string;

    #[test]
    fn missing_implicit_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let source = ConfigSource {
            path: dir.path().join("optiface.toml"),
            explicit: false,
        };
        assert_eq!(OptifaceConfig::load_source(&source).unwrap(), OptifaceConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let source = ConfigSource {
            path: PathBuf::from("/nonexistent/optiface.toml"),
            explicit: true,
        };
        let error = OptifaceConfig::load_source(&source).unwrap_err();
        assert!(error.to_string().starts_with("config io error"));
    }

    #[test]
    fn path_strings_must_be_non_empty() {
        let error = validate_path_string("space.root", "  ").unwrap_err();
        assert_eq!(error.to_string(), "invalid config: space.root must be non-empty");
        assert!(validate_path_string("space.root", "data/space").is_ok());
    }
}
