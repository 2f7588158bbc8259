// crates/optiface-core/src/core/defaults.rs
// ============================================================================
// Module: Optiface Default Schema
// Description: Built-in schema used when authoring a new problem space.
// Purpose: Give every new problem space a usable knapsack-style starting point.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! New problem spaces start from a small default schema: a named instance
//! set with a size and repetition counter, a solver label, and the objective
//! and running time as outputs. Users edit the generated document afterwards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::feature::FeatureDefinition;
use crate::core::feature::SchemaDefinitionError;
use crate::core::value::FeatureType;

// ============================================================================
// SECTION: Default Groups
// ============================================================================

/// Default instance features: `set_name`, `n`, `rep`.
///
/// # Errors
///
/// Returns [`SchemaDefinitionError`] only if the built-in definitions are malformed.
pub fn default_instance_features() -> Result<Vec<FeatureDefinition>, SchemaDefinitionError> {
    Ok(vec![
        FeatureDefinition::required("set_name", FeatureType::Str, "Set Name", "s_n")?,
        FeatureDefinition::required("n", FeatureType::Int, "Number of Items", "n")?,
        FeatureDefinition::optional("rep", 0_i64, "Instance Rep", "i_rep")?,
    ])
}

/// Default solver features: `solver`.
///
/// # Errors
///
/// Returns [`SchemaDefinitionError`] only if the built-in definitions are malformed.
pub fn default_solver_features() -> Result<Vec<FeatureDefinition>, SchemaDefinitionError> {
    Ok(vec![FeatureDefinition::required("solver", FeatureType::Str, "Solver", "sol")?])
}

/// Default output features: `objective`, `time_ms`.
///
/// # Errors
///
/// Returns [`SchemaDefinitionError`] only if the built-in definitions are malformed.
pub fn default_output_features() -> Result<Vec<FeatureDefinition>, SchemaDefinitionError> {
    Ok(vec![
        FeatureDefinition::required("objective", FeatureType::Float, "Objective", "obj")?,
        FeatureDefinition::required("time_ms", FeatureType::Float, "Running Time (ms)", "t_ms")?,
    ])
}
