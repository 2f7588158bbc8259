// crates/optiface-core/src/space/mod.rs
// ============================================================================
// Module: Optiface Space Persistence
// Description: On-disk layout, declarative documents, and the registry.
// Purpose: Load, save, discover, and switch problem spaces.
// Dependencies: crate::core, serde_yaml, thiserror, tracing
// ============================================================================

//! ## Overview
//! A space root holds one directory per problem space. Each directory holds
//! the declarative schema document (`problemspace.yaml`) and the results
//! store (`experiments.db`). Loading fails closed: a missing document is
//! [`SpaceError::NotFound`], and any malformed feature fails the whole load.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod document;
pub mod layout;
pub mod registry;

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::InvalidProblemName;
use crate::core::SchemaDefinitionError;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use document::MAX_DOCUMENT_BYTES;
pub use layout::SpaceLayout;
pub use registry::ProblemSpaceRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File name of a problem space's declarative schema document.
pub const PROBLEM_SPACE_FILE: &str = "problemspace.yaml";
/// File name of a problem space's results store.
pub const EXPERIMENTS_DB_FILE: &str = "experiments.db";
/// Name of the problem space synthesized when a root holds none.
pub const DEFAULT_PROBLEM_NAME: &str = "defaultproblem";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Problem-space lifecycle errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpaceError {
    /// No problem space with this name exists.
    #[error("problem space `{0}` not found")]
    NotFound(String),
    /// A problem space with this name already exists.
    #[error("problem space `{0}` already exists")]
    AlreadyExists(String),
    /// Name is not usable as a problem space directory.
    #[error(transparent)]
    InvalidName(#[from] InvalidProblemName),
    /// Filesystem failure.
    #[error("problem space io error: {0}")]
    Io(String),
    /// Document could not be parsed or rendered.
    #[error("problem space document error: {0}")]
    Parse(String),
    /// Document parsed but declares an invalid schema.
    #[error(transparent)]
    Schema(#[from] SchemaDefinitionError),
}
