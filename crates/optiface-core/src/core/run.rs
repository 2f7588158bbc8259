// crates/optiface-core/src/core/run.rs
// ============================================================================
// Module: Optiface Run Metadata
// Description: Fixed metadata group attached to every stored row.
// Purpose: Define run id, timestamp-added, and provenance once for all spaces.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Every problem space shares the same run-metadata group. Its values are
//! never supplied by callers: the store assigns `run_id`, and the row store
//! stamps `timestamp_added` and `added_from` after validation succeeds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use time::OffsetDateTime;

use crate::core::feature::FeatureDefinition;
use crate::core::feature::SchemaDefinitionError;
use crate::core::schema::GroupKind;
use crate::core::schema::SchemaGroup;
use crate::core::value::FeatureType;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Store-assigned row identifier.
pub const RUN_ID: &str = "run_id";
/// UTC instant the row was added.
pub const TIMESTAMP_ADDED: &str = "timestamp_added";
/// Ingestion path the row arrived through.
pub const ADDED_FROM: &str = "added_from";

// ============================================================================
// SECTION: Run Features
// ============================================================================

/// Builds the fixed run-metadata group.
///
/// # Errors
///
/// Returns [`SchemaDefinitionError`] only if the built-in definitions are malformed.
pub fn run_features() -> Result<SchemaGroup, SchemaDefinitionError> {
    SchemaGroup::with_features(
        GroupKind::Run,
        [
            FeatureDefinition::required(RUN_ID, FeatureType::Int, "Run Id", "run_id")?,
            FeatureDefinition::required(
                TIMESTAMP_ADDED,
                FeatureType::DateTime,
                "Timestamp Added",
                "ts_added",
            )?,
            FeatureDefinition::required(ADDED_FROM, FeatureType::Str, "Added From", "from")?,
        ],
    )
}

// ============================================================================
// SECTION: Provenance
// ============================================================================

/// Ingestion path a row arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Bulk import from a CSV file.
    Csv,
    /// Manual entry through an interactive collaborator.
    Manual,
}

impl Provenance {
    /// Returns the stored tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provenance {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CSV" => Ok(Self::Csv),
            "MANUAL" => Ok(Self::Manual),
            other => Err(format!("unknown provenance tag `{other}`")),
        }
    }
}

/// Metadata stamped onto a row when it is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunMetadata {
    /// UTC instant the row was added.
    pub timestamp_added: OffsetDateTime,
    /// Ingestion path.
    pub added_from: Provenance,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]
mod tests {
    use super::Provenance;
    use super::run_features;

    #[test]
    fn run_group_lists_metadata_in_column_order() {
        let group = run_features().unwrap();
        assert_eq!(group.names(), vec!["run_id", "timestamp_added", "added_from"]);
        assert!(group.iter().all(|feature| feature.is_required()));
    }

    #[test]
    fn provenance_tags_parse_back() {
        for tag in [Provenance::Csv, Provenance::Manual] {
            assert_eq!(tag.as_str().parse::<Provenance>().unwrap(), tag);
        }
        assert!("WIZARD".parse::<Provenance>().is_err());
    }
}
