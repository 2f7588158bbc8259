// crates/optiface-core/src/core/problem_space.rs
// ============================================================================
// Module: Optiface Problem Space
// Description: Schema aggregate for one problem and its row validation.
// Purpose: Decide, purely from the schema, whether a row can be stored.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! A [`ProblemSpace`] aggregates the instance, solver, and output groups of
//! one problem, plus the fixed run-metadata group shared by every space.
//! Feature names are unique across all four groups, which keeps row
//! validation unambiguous. [`ProblemSpace::validate_row`] is a pure function
//! of the schema and the row: it fills defaults, drops unknown columns, and
//! collects every error before deciding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use crate::core::defaults::default_instance_features;
use crate::core::defaults::default_output_features;
use crate::core::defaults::default_solver_features;
use crate::core::feature::FeatureDefinition;
use crate::core::feature::SchemaDefinitionError;
use crate::core::identifiers::ProblemName;
use crate::core::row::NormalizedRow;
use crate::core::row::RawRow;
use crate::core::row::RowError;
use crate::core::row::RowNote;
use crate::core::row::RowNotes;
use crate::core::row::ValidatedRow;
use crate::core::row::ValidationFailure;
use crate::core::run::run_features;
use crate::core::schema::GroupKind;
use crate::core::schema::SchemaGroup;
use crate::core::value::FeatureType;
use crate::core::value::FeatureValue;

// ============================================================================
// SECTION: Problem Space
// ============================================================================

/// Schema for one problem's experiment results.
///
/// # Invariants
/// - Feature names are unique across run, instance, solver, and output groups.
/// - The run group is identical for every problem space.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemSpace {
    /// Problem name, also the on-disk directory name.
    name: ProblemName,
    /// Fixed run-metadata group.
    run_features: SchemaGroup,
    /// Instance attributes.
    instance_features: SchemaGroup,
    /// Solver attributes.
    solver_features: SchemaGroup,
    /// Solver outputs.
    output_features: SchemaGroup,
}

impl ProblemSpace {
    /// Builds a problem space from its three editable groups.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError::DuplicateFeature`] when a feature name
    /// repeats within or across groups, including run-metadata names.
    pub fn new(
        name: ProblemName,
        instance_features: Vec<FeatureDefinition>,
        solver_features: Vec<FeatureDefinition>,
        output_features: Vec<FeatureDefinition>,
    ) -> Result<Self, SchemaDefinitionError> {
        let space = Self {
            name,
            run_features: run_features()?,
            instance_features: SchemaGroup::with_features(GroupKind::Instance, instance_features)?,
            solver_features: SchemaGroup::with_features(GroupKind::Solver, solver_features)?,
            output_features: SchemaGroup::with_features(GroupKind::Output, output_features)?,
        };
        space.check_unique_names()?;
        Ok(space)
    }

    /// Builds a problem space from the built-in default schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError`] only if the built-in schema is malformed.
    pub fn with_default_schema(name: ProblemName) -> Result<Self, SchemaDefinitionError> {
        Self::new(
            name,
            default_instance_features()?,
            default_solver_features()?,
            default_output_features()?,
        )
    }

    /// Returns the problem name.
    #[must_use]
    pub const fn name(&self) -> &ProblemName {
        &self.name
    }

    /// Returns the fixed run-metadata group.
    #[must_use]
    pub const fn run_features(&self) -> &SchemaGroup {
        &self.run_features
    }

    /// Returns the instance group.
    #[must_use]
    pub const fn instance_features(&self) -> &SchemaGroup {
        &self.instance_features
    }

    /// Returns the solver group.
    #[must_use]
    pub const fn solver_features(&self) -> &SchemaGroup {
        &self.solver_features
    }

    /// Returns the output group.
    #[must_use]
    pub const fn output_features(&self) -> &SchemaGroup {
        &self.output_features
    }

    /// Returns the editable groups in canonical order.
    #[must_use]
    pub const fn editable_groups(&self) -> [&SchemaGroup; 3] {
        [&self.instance_features, &self.solver_features, &self.output_features]
    }

    /// Returns instance, solver, then output features, in that order.
    #[must_use]
    pub fn full_feature_list(&self) -> Vec<&FeatureDefinition> {
        self.editable_groups().into_iter().flat_map(SchemaGroup::iter).collect()
    }

    /// Returns the editable feature named `name`.
    #[must_use]
    pub fn feature(&self, name: &str) -> Option<&FeatureDefinition> {
        self.editable_groups().into_iter().find_map(|group| group.get(name))
    }

    /// Validates and normalizes a raw row against this schema.
    ///
    /// Every feature is checked; errors are collected rather than returned
    /// at the first problem. Omitted optional features receive their
    /// default, and columns outside the schema are dropped with a note.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationFailure`] carrying every missing-required,
    /// type-mismatch, and non-finite float error, plus the notes gathered on
    /// the way.
    pub fn validate_row(&self, row: RawRow) -> Result<ValidatedRow, ValidationFailure> {
        let mut columns = row.into_columns();
        let mut values = Vec::with_capacity(self.full_feature_list().len());
        let mut errors: BTreeMap<String, Vec<RowError>> = BTreeMap::new();
        let mut notes = RowNotes::new();

        for feature in self.full_feature_list() {
            let name = feature.name();
            match columns.remove(name).flatten() {
                Some(FeatureValue::Float(real))
                    if feature.declared_type() == FeatureType::Float && !real.is_finite() =>
                {
                    errors.entry(name.to_string()).or_default().push(RowError::NonFiniteFloat);
                }
                Some(value) if feature.declared_type().accepts(&value) => {
                    values.push((name.to_string(), value));
                }
                Some(value) => {
                    errors.entry(name.to_string()).or_default().push(RowError::TypeMismatch {
                        expected: feature.declared_type(),
                        actual: value.feature_type(),
                    });
                }
                None => match feature.default_value() {
                    Some(default) if !feature.is_required() => {
                        notes
                            .entry(name.to_string())
                            .or_default()
                            .push(RowNote::DefaultApplied(default.clone()));
                        values.push((name.to_string(), default.clone()));
                    }
                    _ => {
                        errors.entry(name.to_string()).or_default().push(RowError::MissingRequired);
                    }
                },
            }
        }

        for column in columns.into_keys() {
            let note = if self.run_features.contains(&column) {
                RowNote::DroppedRunMetadata
            } else {
                RowNote::DroppedUnknownColumn
            };
            notes.entry(column).or_default().push(note);
        }

        if errors.is_empty() {
            Ok(ValidatedRow {
                row: NormalizedRow::from_ordered(values),
                notes,
            })
        } else {
            Err(ValidationFailure {
                errors,
                notes,
            })
        }
    }

    /// Rejects feature names declared more than once across all groups.
    fn check_unique_names(&self) -> Result<(), SchemaDefinitionError> {
        let mut seen: BTreeMap<&str, GroupKind> = BTreeMap::new();
        let groups = [
            &self.run_features,
            &self.instance_features,
            &self.solver_features,
            &self.output_features,
        ];
        for group in groups {
            for feature in group {
                if let Some(first) = seen.insert(feature.name(), group.kind()) {
                    return Err(SchemaDefinitionError::DuplicateFeature {
                        feature: feature.name().to_string(),
                        first,
                        second: group.kind(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for ProblemSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "problem space: {}", self.name)?;
        for group in self.editable_groups() {
            write!(f, "\n\t{}:", group.kind())?;
            for feature in group {
                write!(f, "\n\t\t{feature}")?;
            }
        }
        Ok(())
    }
}
