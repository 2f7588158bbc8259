// crates/optiface-core/src/core/schema.rs
// ============================================================================
// Module: Optiface Schema Groups
// Description: Insertion-ordered collections of feature definitions.
// Purpose: Represent one logical group (run, instance, solver, output).
// Dependencies: none
// ============================================================================

//! ## Overview
//! A [`SchemaGroup`] keeps its features in insertion order, which is also
//! the order they appear in documents and results-table columns. Groups are
//! small, so lookups scan linearly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::core::feature::FeatureDefinition;
use crate::core::feature::SchemaDefinitionError;

// ============================================================================
// SECTION: Group Kinds
// ============================================================================

/// Logical group a feature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Fixed run metadata attached to every stored row.
    Run,
    /// Instance attributes.
    Instance,
    /// Solver attributes.
    Solver,
    /// Solver outputs.
    Output,
}

impl GroupKind {
    /// Returns the document key for this group.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Run => "run_key",
            Self::Instance => "instance_key",
            Self::Solver => "solver_key",
            Self::Output => "output_key",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ============================================================================
// SECTION: Schema Groups
// ============================================================================

/// Insertion-ordered mapping of feature name to definition.
///
/// # Invariants
/// - Feature names are unique within the group.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaGroup {
    /// Group this collection represents.
    kind: GroupKind,
    /// Features in insertion order.
    features: Vec<FeatureDefinition>,
}

impl SchemaGroup {
    /// Creates an empty group.
    #[must_use]
    pub const fn new(kind: GroupKind) -> Self {
        Self {
            kind,
            features: Vec::new(),
        }
    }

    /// Creates a group from features in order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError::DuplicateFeature`] when a name repeats.
    pub fn with_features(
        kind: GroupKind,
        features: impl IntoIterator<Item = FeatureDefinition>,
    ) -> Result<Self, SchemaDefinitionError> {
        let mut group = Self::new(kind);
        for feature in features {
            group.push(feature)?;
        }
        Ok(group)
    }

    /// Appends a feature to the group.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError::DuplicateFeature`] when the name is taken.
    pub fn push(&mut self, feature: FeatureDefinition) -> Result<(), SchemaDefinitionError> {
        if self.contains(feature.name()) {
            return Err(SchemaDefinitionError::DuplicateFeature {
                feature: feature.name().to_string(),
                first: self.kind,
                second: self.kind,
            });
        }
        self.features.push(feature);
        Ok(())
    }

    /// Returns the group kind.
    #[must_use]
    pub const fn kind(&self) -> GroupKind {
        self.kind
    }

    /// Returns the feature with `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FeatureDefinition> {
        self.features.iter().find(|feature| feature.name() == name)
    }

    /// Returns true when the group declares `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates features in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, FeatureDefinition> {
        self.features.iter()
    }

    /// Returns the feature names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(FeatureDefinition::name).collect()
    }

    /// Returns the number of features.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true when the group has no features.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl<'a> IntoIterator for &'a SchemaGroup {
    type Item = &'a FeatureDefinition;
    type IntoIter = std::slice::Iter<'a, FeatureDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]
mod tests {
    use super::GroupKind;
    use super::SchemaGroup;
    use crate::core::feature::FeatureDefinition;
    use crate::core::feature::SchemaInvariant;
    use crate::core::value::FeatureType;

    #[test]
    fn groups_keep_insertion_order_and_reject_duplicates() {
        let mut group = SchemaGroup::new(GroupKind::Output);
        group.push(FeatureDefinition::required("time_ms", FeatureType::Float, "Time", "t").unwrap())
            .unwrap();
        group.push(FeatureDefinition::required("gap", FeatureType::Float, "Gap", "g").unwrap())
            .unwrap();
        assert_eq!(group.names(), vec!["time_ms", "gap"]);

        let duplicate = FeatureDefinition::optional("gap", 0.0, "Gap", "g").unwrap();
        let error = group.push(duplicate).unwrap_err();
        assert_eq!(error.invariant(), SchemaInvariant::UniqueNames);
        assert_eq!(group.len(), 2);
    }
}
