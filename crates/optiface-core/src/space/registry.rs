// crates/optiface-core/src/space/registry.rs
// ============================================================================
// Module: Optiface Problem Space Registry
// Description: Discovery, creation, and selection of problem spaces.
// Purpose: Track the known problem spaces and which one is current.
// Dependencies: crate::core, tracing
// ============================================================================

//! ## Overview
//! [`ProblemSpaceRegistry`] scans a space root, guarantees at least one
//! problem space exists, and owns the notion of the current space.
//!
//! # Invariants
//! - `current().name()` is always listed in `problems()`.
//! - A failed switch leaves the previous current space active.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::info;
use tracing::warn;

use super::DEFAULT_PROBLEM_NAME;
use super::SpaceError;
use super::layout::SpaceLayout;
use crate::core::ProblemName;
use crate::core::ProblemSpace;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Known problem spaces under one root, plus the current one.
#[derive(Debug, Clone)]
pub struct ProblemSpaceRegistry {
    /// Directory layout being managed.
    layout: SpaceLayout,
    /// Name synthesized when the root holds no problem space.
    default_name: ProblemName,
    /// Known problem-space names.
    problems: Vec<ProblemName>,
    /// Active problem space.
    current: ProblemSpace,
}

impl ProblemSpaceRegistry {
    /// Opens the registry, using `defaultproblem` when the root is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError`] when the root cannot be scanned or the first
    /// problem space cannot be loaded or created.
    pub fn open(layout: SpaceLayout) -> Result<Self, SpaceError> {
        Self::open_with_default(layout, ProblemName::new(DEFAULT_PROBLEM_NAME)?)
    }

    /// Opens the registry with a custom name for the synthesized space.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError`] when the root cannot be scanned or the first
    /// problem space cannot be loaded or created.
    pub fn open_with_default(
        layout: SpaceLayout,
        default_name: ProblemName,
    ) -> Result<Self, SpaceError> {
        let (problems, current) = scan(&layout, &default_name)?;
        Ok(Self {
            layout,
            default_name,
            problems,
            current,
        })
    }

    /// Re-scans the root and makes the first discovered space current.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError`] when scanning or loading fails; the registry
    /// is left unchanged in that case.
    pub fn read(&mut self) -> Result<(), SpaceError> {
        let (problems, current) = scan(&self.layout, &self.default_name)?;
        self.problems = problems;
        self.current = current;
        Ok(())
    }

    /// Returns the managed layout.
    #[must_use]
    pub const fn layout(&self) -> &SpaceLayout {
        &self.layout
    }

    /// Returns the known problem-space names.
    #[must_use]
    pub fn problems(&self) -> &[ProblemName] {
        &self.problems
    }

    /// Returns the current problem space.
    #[must_use]
    pub const fn current(&self) -> &ProblemSpace {
        &self.current
    }

    /// Returns true when `name` is a known problem space.
    #[must_use]
    pub fn problem_exists(&self, name: &str) -> bool {
        self.problems.iter().any(|known| known.as_str() == name)
    }

    /// Creates and saves a default-schema problem space named `name`.
    ///
    /// The current problem space does not change.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::AlreadyExists`] when `name` is taken,
    /// [`SpaceError::InvalidName`] when it is unusable, or another
    /// [`SpaceError`] when the document cannot be written.
    pub fn add_new_pspace(&mut self, name: &str) -> Result<(), SpaceError> {
        let name = ProblemName::new(name)?;
        if self.problem_exists(name.as_str()) || self.layout.contains(&name) {
            return Err(SpaceError::AlreadyExists(name.to_string()));
        }
        ProblemSpace::create_default(&self.layout, name.clone())?;
        self.problems.push(name);
        Ok(())
    }

    /// Loads problem space `name` and makes it current.
    ///
    /// The target is loaded before anything changes; on failure the previous
    /// current space stays active and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::NotFound`] for unknown names, or the load error
    /// when the target document is missing or invalid.
    pub fn switch_current_pspace(&mut self, name: &str) -> Result<&ProblemSpace, SpaceError> {
        if !self.problem_exists(name) {
            return Err(SpaceError::NotFound(name.to_string()));
        }
        let name = ProblemName::new(name)?;
        let loaded = ProblemSpace::load(&self.layout, &name).inspect_err(|err| {
            warn!(
                problem = %name,
                current = %self.current.name(),
                error = %err,
                "switch failed; keeping current problem space"
            );
        })?;
        info!(problem = %name, "current problem space switched");
        self.current = loaded;
        Ok(&self.current)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Discovers problem spaces, creating the default one when none exist.
fn scan(
    layout: &SpaceLayout,
    default_name: &ProblemName,
) -> Result<(Vec<ProblemName>, ProblemSpace), SpaceError> {
    let problems = layout.discover()?;
    let Some(first) = problems.first() else {
        let current = ProblemSpace::create_default(layout, default_name.clone())?;
        return Ok((vec![default_name.clone()], current));
    };
    let current = ProblemSpace::load(layout, first)?;
    info!(root = %layout.root().display(), problems = problems.len(), "problem spaces discovered");
    Ok((problems, current))
}
