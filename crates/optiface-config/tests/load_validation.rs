//! Config load validation tests for optiface-config.
// crates/optiface-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards and section defaults.
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use optiface_config::ConfigError;
use optiface_config::OptifaceConfig;
use optiface_core::ProblemName;
use optiface_store_sqlite::SqliteStoreMode;
use optiface_store_sqlite::SqliteSyncMode;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<OptifaceConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

// ============================================================================
// SECTION: Guards
// ============================================================================

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(OptifaceConfig::load(Some(Path::new(&long_path))), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_invalid(
        OptifaceConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'#'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(OptifaceConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(OptifaceConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_rejects_missing_explicit_file() -> TestResult {
    assert_invalid(
        OptifaceConfig::load(Some(Path::new("/nonexistent/optiface.toml"))),
        "config io error",
    )
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_config("[space\nroot = 1")?;
    assert_invalid(OptifaceConfig::load(Some(file.path())), "config parse error")
}

// ============================================================================
// SECTION: Sections
// ============================================================================

#[test]
fn empty_file_yields_defaults() -> TestResult {
    let file = write_config("")?;
    let config = OptifaceConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config != OptifaceConfig::default() {
        return Err("empty config should equal defaults".to_string());
    }
    if config.space.root != Path::new("space") || config.space.default_problem != "defaultproblem"
    {
        return Err("unexpected space defaults".to_string());
    }
    if config.store.busy_timeout_ms != 5_000 || config.log.filter != "info" {
        return Err("unexpected store or log defaults".to_string());
    }
    Ok(())
}

#[test]
fn sections_override_defaults() -> TestResult {
    let file = write_config(
        "[space]\nroot = \"/data/experiments\"\ndefault_problem = \"knapsack\"\n\n[store]\n\
         busy_timeout_ms = 250\njournal_mode = \"delete\"\nsync_mode = \"normal\"\n\n[log]\n\
         filter = \"optiface_core=debug\"\n",
    )?;
    let config = OptifaceConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    let name = config.space.default_name().map_err(|err| err.to_string())?;
    if name.as_str() != "knapsack" {
        return Err(format!("unexpected default problem {name}"));
    }
    if config.store.journal_mode != SqliteStoreMode::Delete
        || config.store.sync_mode != SqliteSyncMode::Normal
    {
        return Err("store modes not applied".to_string());
    }
    let sqlite = config.sqlite_config(&ProblemName::new("tsp").map_err(|err| err.to_string())?);
    if sqlite.path != Path::new("/data/experiments/tsp/experiments.db")
        || sqlite.busy_timeout_ms != 250
        || sqlite.journal_mode != SqliteStoreMode::Delete
    {
        return Err("sqlite config does not reflect the store section".to_string());
    }
    if config.log.filter != "optiface_core=debug" {
        return Err("log filter not applied".to_string());
    }
    Ok(())
}

#[test]
fn zero_busy_timeout_is_invalid() -> TestResult {
    assert_invalid(
        OptifaceConfig::from_toml_str("[store]\nbusy_timeout_ms = 0\n"),
        "store.busy_timeout_ms must be > 0",
    )
}

#[test]
fn unknown_journal_mode_is_a_parse_error() -> TestResult {
    assert_invalid(
        OptifaceConfig::from_toml_str("[store]\njournal_mode = \"memory\"\n"),
        "config parse error",
    )
}

#[test]
fn invalid_default_problem_is_rejected() -> TestResult {
    assert_invalid(
        OptifaceConfig::from_toml_str("[space]\ndefault_problem = \"../up\"\n"),
        "space.default_problem",
    )
}

#[test]
fn blank_log_filter_is_rejected() -> TestResult {
    assert_invalid(OptifaceConfig::from_toml_str("[log]\nfilter = \" \"\n"), "log.filter must be non-empty")
}

#[test]
fn empty_space_root_is_rejected() -> TestResult {
    assert_invalid(
        OptifaceConfig::from_toml_str("[space]\nroot = \"\"\n"),
        "space.root must be non-empty",
    )
}
