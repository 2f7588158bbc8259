// crates/optiface-core/src/space/document.rs
// ============================================================================
// Module: Optiface Problem Space Documents
// Description: YAML (de)serialization of problem-space schemas.
// Purpose: Persist the three editable groups in a human-editable document.
// Dependencies: crate::core, serde, serde_yaml, tracing
// ============================================================================

//! ## Overview
//! A problem-space document has three top-level mappings, `instance_key`,
//! `solver_key`, and `output_key`. Each maps a feature name to
//! `{required, default, verbose_name, short_name, feature_type}`. Feature
//! order is the document order and survives a load/save cycle.
//!
//! Defaults are read against the declared type: an RFC 3339 string is a
//! timestamp only for `datetime` features, and a whole number is accepted
//! for a `float` feature. Every other mismatch is left to the feature
//! definition rules.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io;

use serde::Deserialize;
use serde::Serialize;
use serde_yaml::Mapping;
use serde_yaml::Value;
use tracing::debug;
use tracing::info;

use super::SpaceError;
use super::layout::SpaceLayout;
use crate::core::FeatureDefinition;
use crate::core::FeatureDraft;
use crate::core::FeatureType;
use crate::core::FeatureValue;
use crate::core::ProblemName;
use crate::core::ProblemSpace;
use crate::core::SchemaDefinitionError;
use crate::core::SchemaGroup;
use crate::core::format_timestamp;
use crate::core::parse_timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum size of a problem-space document in bytes.
pub const MAX_DOCUMENT_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Document Model
// ============================================================================

/// Top-level document shape.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProblemSpaceDocument {
    /// Instance features by name.
    #[serde(default)]
    instance_key: Mapping,
    /// Solver features by name.
    #[serde(default)]
    solver_key: Mapping,
    /// Output features by name.
    #[serde(default)]
    output_key: Mapping,
}

/// Persisted attributes of one feature; the name is the mapping key.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeatureEntry {
    /// Whether rows must supply the feature.
    required: bool,
    /// Default value, `null` for required features.
    #[serde(default)]
    default: Value,
    /// Display name.
    verbose_name: String,
    /// Compact display name.
    short_name: String,
    /// Type tag.
    feature_type: String,
}

// ============================================================================
// SECTION: Problem Space I/O
// ============================================================================

impl ProblemSpace {
    /// Parses a problem space from document text.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::Parse`] for malformed YAML and
    /// [`SpaceError::Schema`] for the first invalid feature.
    pub fn from_yaml_str(name: ProblemName, text: &str) -> Result<Self, SpaceError> {
        let document: ProblemSpaceDocument =
            serde_yaml::from_str(text).map_err(|err| SpaceError::Parse(err.to_string()))?;
        let instance = read_group("instance_key", document.instance_key)?;
        let solver = read_group("solver_key", document.solver_key)?;
        let output = read_group("output_key", document.output_key)?;
        Ok(Self::new(name, instance, solver, output)?)
    }

    /// Renders the editable groups as document text.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::Parse`] when a value cannot be rendered.
    pub fn to_yaml_string(&self) -> Result<String, SpaceError> {
        let document = ProblemSpaceDocument {
            instance_key: write_group(self.instance_features())?,
            solver_key: write_group(self.solver_features())?,
            output_key: write_group(self.output_features())?,
        };
        serde_yaml::to_string(&document).map_err(|err| SpaceError::Parse(err.to_string()))
    }

    /// Loads problem space `name` from its document under `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::NotFound`] when no document exists, or another
    /// [`SpaceError`] when the document is unreadable or invalid.
    pub fn load(layout: &SpaceLayout, name: &ProblemName) -> Result<Self, SpaceError> {
        let path = layout.document_path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(SpaceError::NotFound(name.to_string()));
            }
            Err(err) => return Err(SpaceError::Io(err.to_string())),
        };
        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(SpaceError::Parse(format!(
                "problem space document exceeds {MAX_DOCUMENT_BYTES} bytes"
            )));
        }
        let text = std::str::from_utf8(&bytes)
            .map_err(|_| SpaceError::Parse("problem space document must be utf-8".to_string()))?;
        let space = Self::from_yaml_str(name.clone(), text)?;
        debug!(problem = %name, features = space.full_feature_list().len(), "problem space loaded");
        Ok(space)
    }

    /// Writes the document under `layout`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::Io`] when the directory or file cannot be written.
    pub fn save(&self, layout: &SpaceLayout) -> Result<(), SpaceError> {
        let text = self.to_yaml_string()?;
        fs::create_dir_all(layout.problem_dir(self.name()))
            .map_err(|err| SpaceError::Io(err.to_string()))?;
        fs::write(layout.document_path(self.name()), text)
            .map_err(|err| SpaceError::Io(err.to_string()))?;
        debug!(problem = %self.name(), "problem space saved");
        Ok(())
    }

    /// Builds problem space `name` from the default schema and saves it.
    ///
    /// Any existing document for `name` is overwritten; the registry checks
    /// for existence before calling this.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError`] when the document cannot be written.
    pub fn create_default(layout: &SpaceLayout, name: ProblemName) -> Result<Self, SpaceError> {
        let space = Self::with_default_schema(name)?;
        space.save(layout)?;
        info!(problem = %space.name(), "default problem space created");
        Ok(space)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads one group mapping into feature definitions, in document order.
fn read_group(group: &str, mapping: Mapping) -> Result<Vec<FeatureDefinition>, SpaceError> {
    let mut features = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let Value::String(name) = key else {
            return Err(SpaceError::Parse(format!("{group}: feature names must be strings")));
        };
        let entry: FeatureEntry = serde_yaml::from_value(value)
            .map_err(|err| SpaceError::Parse(format!("{group}.{name}: {err}")))?;
        let default = read_default(&name, &entry.feature_type, entry.default)?;
        let draft = FeatureDraft {
            name,
            required: entry.required,
            default,
            feature_type: entry.feature_type,
            verbose_name: entry.verbose_name,
            short_name: entry.short_name,
        };
        features.push(FeatureDefinition::try_from(draft)?);
    }
    Ok(features)
}

/// Reads a document default against the declared type tag.
fn read_default(
    feature: &str,
    tag: &str,
    value: Value,
) -> Result<Option<FeatureValue>, SchemaDefinitionError> {
    let declared = FeatureType::from_tag(tag);
    let unreadable = |detail: &str| SchemaDefinitionError::UnreadableDefault {
        feature: feature.to_string(),
        detail: detail.to_string(),
    };
    let read = match value {
        Value::Null => return Ok(None),
        Value::Bool(flag) => FeatureValue::Bool(flag),
        Value::Number(number) => match (number.as_i64(), number.as_f64(), declared) {
            (Some(_), Some(real), Some(FeatureType::Float)) | (None, Some(real), _) => {
                FeatureValue::Float(real)
            }
            (Some(whole), _, _) => FeatureValue::Int(whole),
            (None, None, _) => return Err(unreadable("number out of range")),
        },
        Value::String(text) => match declared {
            Some(FeatureType::DateTime) => parse_timestamp(&text)
                .map_or_else(|_| FeatureValue::Str(text), FeatureValue::DateTime),
            _ => FeatureValue::Str(text),
        },
        Value::Sequence(_) => return Err(unreadable("found a sequence")),
        Value::Mapping(_) => return Err(unreadable("found a mapping")),
        Value::Tagged(_) => return Err(unreadable("found a tagged value")),
    };
    Ok(Some(read))
}

/// Writes one group as a name-keyed mapping, in insertion order.
fn write_group(group: &SchemaGroup) -> Result<Mapping, SpaceError> {
    let mut mapping = Mapping::with_capacity(group.len());
    for feature in group {
        let entry = FeatureEntry {
            required: feature.is_required(),
            default: feature.default_value().map_or(Ok(Value::Null), write_default)?,
            verbose_name: feature.verbose_name().to_string(),
            short_name: feature.short_name().to_string(),
            feature_type: feature.declared_type().as_tag().to_string(),
        };
        let value =
            serde_yaml::to_value(entry).map_err(|err| SpaceError::Parse(err.to_string()))?;
        mapping.insert(Value::String(feature.name().to_string()), value);
    }
    Ok(mapping)
}

/// Renders a default value as a YAML scalar.
fn write_default(value: &FeatureValue) -> Result<Value, SpaceError> {
    Ok(match value {
        FeatureValue::Str(text) => Value::String(text.clone()),
        FeatureValue::Int(whole) => Value::from(*whole),
        FeatureValue::Float(real) => Value::from(*real),
        FeatureValue::Bool(flag) => Value::Bool(*flag),
        FeatureValue::DateTime(instant) => Value::String(
            format_timestamp(*instant).map_err(|err| SpaceError::Parse(err.to_string()))?,
        ),
    })
}

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    reason = "Test-only assertions are permitted."
)]
mod tests {
    use crate::core::FeatureType;
    use crate::core::FeatureValue;
    use crate::core::ProblemName;
    use crate::core::ProblemSpace;
    use crate::core::SchemaInvariant;
    use crate::space::SpaceError;

    const DOCUMENT: &str = "\
instance_key:
  n:
    required: true
    default: null
    verbose_name: Number of Items
    short_name: n
    feature_type: int
  seed:
    required: false
    default: 7
    verbose_name: Seed
    short_name: sd
    feature_type: int
solver_key:
  solver:
    required: true
    default: null
    verbose_name: Solver
    short_name: sol
    feature_type: str
output_key:
  gap:
    required: false
    default: 0
    verbose_name: Gap
    short_name: g
    feature_type: float
";

    fn name() -> ProblemName {
        ProblemName::new("knapsack").unwrap()
    }

    #[test]
    fn document_order_and_types_are_preserved() {
        let space = ProblemSpace::from_yaml_str(name(), DOCUMENT).unwrap();
        assert_eq!(space.instance_features().names(), vec!["n", "seed"]);
        let gap = space.feature("gap").unwrap();
        assert_eq!(gap.declared_type(), FeatureType::Float);
        assert_eq!(gap.default_value(), Some(&FeatureValue::Float(0.0)));

        let rendered = space.to_yaml_string().unwrap();
        let reparsed = ProblemSpace::from_yaml_str(name(), &rendered).unwrap();
        assert_eq!(reparsed, space);
    }

    #[test]
    fn invalid_feature_fails_the_whole_load() {
        let text = DOCUMENT.replace("feature_type: str", "feature_type: text");
        let error = ProblemSpace::from_yaml_str(name(), &text).unwrap_err();
        let SpaceError::Schema(schema) = error else {
            panic!("expected schema error, got {error}");
        };
        assert_eq!(schema.invariant(), SchemaInvariant::DeclaredType);
        assert_eq!(schema.feature(), "solver");
    }

    #[test]
    fn unknown_attributes_are_parse_errors() {
        let text = DOCUMENT.replace("short_name: sol", "short_name: sol\n    units: none");
        assert!(matches!(
            ProblemSpace::from_yaml_str(name(), &text),
            Err(SpaceError::Parse(_))
        ));
    }

    #[test]
    fn structured_defaults_are_rejected() {
        let text = DOCUMENT.replace("default: 7", "default: [7]");
        let SpaceError::Schema(schema) = ProblemSpace::from_yaml_str(name(), &text).unwrap_err()
        else {
            panic!("expected schema error");
        };
        assert_eq!(schema.invariant(), SchemaInvariant::DefaultMatchesType);
    }
}
