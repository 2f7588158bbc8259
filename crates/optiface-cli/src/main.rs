// crates/optiface-cli/src/main.rs
// ============================================================================
// Module: Optiface CLI Entry Point
// Description: Command dispatcher for problem spaces and their results.
// Purpose: Wire config, logging, the registry, CSV import, and SQLite storage.
// Dependencies: clap, optiface-cli, optiface-config, optiface-core,
//               optiface-store-sqlite, thiserror, tracing
// ============================================================================

//! ## Overview
//! The `optiface` binary lists, creates, and shows problem spaces, imports
//! CSV results into a space's results database, and prints the first rows
//! stored there. Validation lives in the core; this file only wires the
//! pieces together and writes output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use optiface_cli::import::import_rows;
use optiface_cli::import::read_rows_from_path;
use optiface_cli::logging::init_logging;
use optiface_cli::render::render_import_report;
use optiface_cli::render::render_problem_list;
use optiface_cli::render::render_space;
use optiface_cli::render::write_rows_csv;
use optiface_config::OptifaceConfig;
use optiface_core::ProblemSpaceRegistry;
use optiface_core::RowStore;
use optiface_core::SystemClock;
use optiface_store_sqlite::SqliteResultsBackend;
use optiface_store_sqlite::open_row_store;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Default number of rows printed by `head`.
const DEFAULT_HEAD_ROWS: usize = 10;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "optiface", version, about = "Manage optimization experiment results")]
struct Cli {
    /// Path to `optiface.toml`.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Command to run.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List known problem spaces.
    List,
    /// Create a problem space with the default schema.
    New {
        /// Problem-space name.
        name: String,
    },
    /// Show a problem space's features.
    Show {
        /// Problem-space name; defaults to the current space.
        name: Option<String>,
    },
    /// Import a CSV file of results.
    Import {
        /// Problem-space name.
        problem: String,
        /// CSV file with a header row.
        csv: PathBuf,
    },
    /// Print the first stored rows as CSV.
    Head {
        /// Problem-space name.
        problem: String,
        /// Maximum number of rows.
        #[arg(short = 'n', long, default_value_t = DEFAULT_HEAD_ROWS)]
        rows: usize,
    },
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Converts any displayable error into a [`CliError`].
fn cli_error(error: impl std::fmt::Display) -> CliError {
    CliError::new(error.to_string())
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = OptifaceConfig::load(cli.config.as_deref()).map_err(cli_error)?;
    init_logging(&config.log.filter).map_err(cli_error)?;
    let default_name = config.space.default_name().map_err(cli_error)?;
    let mut registry =
        ProblemSpaceRegistry::open_with_default(config.layout(), default_name).map_err(cli_error)?;
    debug!(problems = registry.problems().len(), "registry opened");

    match cli.command {
        Commands::List => command_list(&registry),
        Commands::New {
            name,
        } => command_new(&mut registry, &name),
        Commands::Show {
            name,
        } => command_show(&mut registry, name.as_deref()),
        Commands::Import {
            problem,
            csv,
        } => command_import(&config, &mut registry, &problem, &csv),
        Commands::Head {
            problem,
            rows,
        } => command_head(&config, &mut registry, &problem, rows),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Lists problem spaces.
fn command_list(registry: &ProblemSpaceRegistry) -> CliResult<ExitCode> {
    for line in render_problem_list(registry.problems(), registry.current().name()) {
        write_stdout_line(&line).map_err(cli_error)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Creates a problem space.
fn command_new(registry: &mut ProblemSpaceRegistry, name: &str) -> CliResult<ExitCode> {
    registry.add_new_pspace(name).map_err(cli_error)?;
    write_stdout_line(&format!("created problem space {name}")).map_err(cli_error)?;
    Ok(ExitCode::SUCCESS)
}

/// Shows a problem space.
fn command_show(registry: &mut ProblemSpaceRegistry, name: Option<&str>) -> CliResult<ExitCode> {
    if let Some(name) = name {
        registry.switch_current_pspace(name).map_err(cli_error)?;
    }
    write_stdout_line(&render_space(registry.current())).map_err(cli_error)?;
    Ok(ExitCode::SUCCESS)
}

/// Imports a CSV file; fails when any row was not stored.
fn command_import(
    config: &OptifaceConfig,
    registry: &mut ProblemSpaceRegistry,
    problem: &str,
    csv: &std::path::Path,
) -> CliResult<ExitCode> {
    let mut store = open_store(config, registry, problem)?;
    let rows = read_rows_from_path(store.space(), csv).map_err(cli_error)?;
    let report = import_rows(&mut store, rows);
    for line in render_import_report(&report) {
        write_stdout_line(&line).map_err(cli_error)?;
    }
    Ok(if report.is_clean() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Prints the first stored rows.
fn command_head(
    config: &OptifaceConfig,
    registry: &mut ProblemSpaceRegistry,
    problem: &str,
    limit: usize,
) -> CliResult<ExitCode> {
    let store = open_store(config, registry, problem)?;
    let rows = store.head(limit).map_err(cli_error)?;
    write_rows_csv(std::io::stdout().lock(), store.columns(), &rows).map_err(cli_error)?;
    Ok(ExitCode::SUCCESS)
}

/// Switches to `problem` and opens its results database.
fn open_store(
    config: &OptifaceConfig,
    registry: &mut ProblemSpaceRegistry,
    problem: &str,
) -> CliResult<RowStore<SqliteResultsBackend>> {
    let space = registry.switch_current_pspace(problem).map_err(cli_error)?.clone();
    let sqlite = config.sqlite_config(space.name());
    open_row_store(space, &sqlite, Box::new(SystemClock)).map_err(cli_error)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
