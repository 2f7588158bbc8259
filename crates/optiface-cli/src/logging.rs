// crates/optiface-cli/src/logging.rs
// ============================================================================
// Module: Logging Setup
// Description: Installs the global tracing subscriber for the binary.
// Purpose: Route structured logs to stderr under an env-driven filter.
// Dependencies: tracing-subscriber, thiserror
// ============================================================================

//! ## Overview
//! `RUST_LOG` wins when set; otherwise the configured filter applies. Logs go
//! to stderr so stdout carries only command output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Subscriber installation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoggingError {
    /// Filter directive did not parse.
    #[error("invalid log filter `{filter}`: {message}")]
    Filter {
        /// Offending directive.
        filter: String,
        /// Parser message.
        message: String,
    },
    /// A global subscriber is already installed.
    #[error("log subscriber already installed: {0}")]
    Install(String),
}

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Builds the filter from `RUST_LOG`, falling back to `default_filter`.
///
/// # Errors
///
/// Returns [`LoggingError::Filter`] when `default_filter` is needed and does
/// not parse.
pub fn build_filter(default_filter: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(default_filter).map_err(|err| LoggingError::Filter {
            filter: default_filter.to_string(),
            message: err.to_string(),
        })
    })
}

/// Installs the stderr subscriber.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_logging(default_filter: &str) -> Result<(), LoggingError> {
    let filter = build_filter(default_filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| LoggingError::Install(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::LoggingError;

    #[test]
    fn filter_errors_name_the_directive() {
        let error = LoggingError::Filter {
            filter: "info,=bad".to_string(),
            message: "invalid directive".to_string(),
        };
        assert_eq!(error.to_string(), "invalid log filter `info,=bad`: invalid directive");
    }
}
