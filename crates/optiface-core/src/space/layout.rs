// crates/optiface-core/src/space/layout.rs
// ============================================================================
// Module: Optiface Space Layout
// Description: Path derivation and discovery under a space root.
// Purpose: Keep every problem-space path rooted in one directory.
// Dependencies: crate::core, tracing
// ============================================================================

//! ## Overview
//! [`SpaceLayout`] derives every path from the root and a validated
//! [`ProblemName`], so callers never join user text onto paths themselves.
//! Discovery is deterministic: names are returned in lexicographic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use tracing::warn;

use super::EXPERIMENTS_DB_FILE;
use super::PROBLEM_SPACE_FILE;
use super::SpaceError;
use crate::core::ProblemName;

// ============================================================================
// SECTION: Layout
// ============================================================================

/// Directory layout of a space root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceLayout {
    /// Root directory holding one subdirectory per problem space.
    root: PathBuf,
}

impl SpaceLayout {
    /// Creates a layout rooted at `root`. Nothing is touched on disk.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Returns the space root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory of problem space `name`.
    #[must_use]
    pub fn problem_dir(&self, name: &ProblemName) -> PathBuf {
        self.root.join(name.as_str())
    }

    /// Returns the schema document path of problem space `name`.
    #[must_use]
    pub fn document_path(&self, name: &ProblemName) -> PathBuf {
        self.problem_dir(name).join(PROBLEM_SPACE_FILE)
    }

    /// Returns the results store path of problem space `name`.
    #[must_use]
    pub fn store_path(&self, name: &ProblemName) -> PathBuf {
        self.problem_dir(name).join(EXPERIMENTS_DB_FILE)
    }

    /// Returns true when problem space `name` has a schema document.
    #[must_use]
    pub fn contains(&self, name: &ProblemName) -> bool {
        self.document_path(name).is_file()
    }

    /// Lists problem spaces under the root in lexicographic order.
    ///
    /// Only directories holding a schema document count. A missing root
    /// yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::Io`] when the root cannot be read.
    pub fn discover(&self) -> Result<Vec<ProblemName>, SpaceError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(SpaceError::Io(err.to_string())),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| SpaceError::Io(err.to_string()))?;
            let Ok(raw) = entry.file_name().into_string() else {
                warn!(root = %self.root.display(), "skipping non-utf8 directory name");
                continue;
            };
            let Ok(name) = ProblemName::new(raw) else {
                continue;
            };
            if self.contains(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}
