// crates/optiface-core/src/core/mod.rs
// ============================================================================
// Module: Optiface Core Types
// Description: Schema model, feature values, rows, and time primitives.
// Purpose: Group the pure data model shared by every Optiface component.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! Pure value types for problem spaces. Nothing in this module performs I/O;
//! persistence lives in [`crate::space`] and [`crate::runtime`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod clock;
pub mod defaults;
pub mod feature;
pub mod identifiers;
pub mod problem_space;
pub mod row;
pub mod run;
pub mod schema;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use clock::format_timestamp;
pub use clock::parse_timestamp;
pub use defaults::default_instance_features;
pub use defaults::default_output_features;
pub use defaults::default_solver_features;
pub use feature::FeatureDefinition;
pub use feature::FeatureDraft;
pub use feature::SchemaDefinitionError;
pub use feature::SchemaInvariant;
pub use identifiers::InvalidProblemName;
pub use identifiers::ProblemName;
pub use problem_space::ProblemSpace;
pub use row::NormalizedRow;
pub use row::RawRow;
pub use row::RowError;
pub use row::RowNote;
pub use row::RowNotes;
pub use row::ValidatedRow;
pub use row::ValidationFailure;
pub use run::ADDED_FROM;
pub use run::Provenance;
pub use run::RUN_ID;
pub use run::RunMetadata;
pub use run::TIMESTAMP_ADDED;
pub use run::run_features;
pub use schema::GroupKind;
pub use schema::SchemaGroup;
pub use value::FeatureType;
pub use value::FeatureValue;
