// crates/optiface-core/src/core/feature.rs
// ============================================================================
// Module: Optiface Feature Definitions
// Description: Self-validating schema attribute definitions.
// Purpose: Make malformed features unrepresentable after construction.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`FeatureDefinition`] describes one schema attribute: its name, whether
//! it is required, its default, its declared type, and two display labels.
//! Construction either returns a fully valid, immutable definition or fails
//! with a [`SchemaDefinitionError`] naming the violated rule.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::core::identifiers::is_feature_identifier;
use crate::core::schema::GroupKind;
use crate::core::value::FeatureType;
use crate::core::value::FeatureValue;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema rule violated by a rejected definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaInvariant {
    /// Feature names are plain identifiers.
    FeatureName,
    /// The declared type is one of the recognized tags.
    DeclaredType,
    /// Required features carry no default.
    RequiredHasNoDefault,
    /// Optional features carry a default.
    OptionalHasDefault,
    /// Optional defaults match the declared type.
    DefaultMatchesType,
    /// Verbose and short names are non-empty.
    DisplayNames,
    /// Feature names are unique across all groups of a problem space.
    UniqueNames,
}

/// Malformed feature or schema definition.
///
/// # Invariants
/// - Every variant names the offending feature.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaDefinitionError {
    /// Feature name is not a plain identifier.
    #[error("feature `{feature}`: name must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidName {
        /// Offending feature name.
        feature: String,
    },
    /// Declared type tag is not recognized.
    #[error(
        "feature `{feature}`: unrecognized feature type `{tag}` (expected str, int, float, bool \
         or datetime)"
    )]
    UnknownType {
        /// Offending feature name.
        feature: String,
        /// Rejected type tag.
        tag: String,
    },
    /// Required feature declares a default.
    #[error("feature `{feature}`: required feature must not declare a default (found {default})")]
    RequiredWithDefault {
        /// Offending feature name.
        feature: String,
        /// Rejected default value.
        default: FeatureValue,
    },
    /// Optional feature has no default.
    #[error("feature `{feature}`: optional feature must declare a default")]
    MissingDefault {
        /// Offending feature name.
        feature: String,
    },
    /// Optional feature default does not match its declared type.
    #[error("feature `{feature}`: default {default} is {actual}, expected {expected}")]
    DefaultTypeMismatch {
        /// Offending feature name.
        feature: String,
        /// Rejected default value.
        default: FeatureValue,
        /// Declared type.
        expected: FeatureType,
        /// Runtime type of the default.
        actual: FeatureType,
    },
    /// Default could not be read as any feature value.
    #[error("feature `{feature}`: default must be a scalar value ({detail})")]
    UnreadableDefault {
        /// Offending feature name.
        feature: String,
        /// Description of the rejected default.
        detail: String,
    },
    /// Verbose name is empty.
    #[error("feature `{feature}`: verbose_name must be non-empty")]
    EmptyVerboseName {
        /// Offending feature name.
        feature: String,
    },
    /// Short name is empty.
    #[error("feature `{feature}`: short_name must be non-empty")]
    EmptyShortName {
        /// Offending feature name.
        feature: String,
    },
    /// Feature name appears more than once in a problem space.
    #[error("feature `{feature}` is declared in both {first} and {second}")]
    DuplicateFeature {
        /// Duplicated feature name.
        feature: String,
        /// Group holding the first declaration.
        first: GroupKind,
        /// Group holding the conflicting declaration.
        second: GroupKind,
    },
}

impl SchemaDefinitionError {
    /// Returns the schema rule this error violates.
    #[must_use]
    pub const fn invariant(&self) -> SchemaInvariant {
        match self {
            Self::InvalidName {
                ..
            } => SchemaInvariant::FeatureName,
            Self::UnknownType {
                ..
            } => SchemaInvariant::DeclaredType,
            Self::RequiredWithDefault {
                ..
            } => SchemaInvariant::RequiredHasNoDefault,
            Self::MissingDefault {
                ..
            } => SchemaInvariant::OptionalHasDefault,
            Self::DefaultTypeMismatch {
                ..
            }
            | Self::UnreadableDefault {
                ..
            } => SchemaInvariant::DefaultMatchesType,
            Self::EmptyVerboseName {
                ..
            }
            | Self::EmptyShortName {
                ..
            } => SchemaInvariant::DisplayNames,
            Self::DuplicateFeature {
                ..
            } => SchemaInvariant::UniqueNames,
        }
    }

    /// Returns the name of the offending feature.
    #[must_use]
    pub fn feature(&self) -> &str {
        match self {
            Self::InvalidName {
                feature,
            }
            | Self::UnknownType {
                feature,
                ..
            }
            | Self::RequiredWithDefault {
                feature,
                ..
            }
            | Self::MissingDefault {
                feature,
            }
            | Self::DefaultTypeMismatch {
                feature,
                ..
            }
            | Self::UnreadableDefault {
                feature,
                ..
            }
            | Self::EmptyVerboseName {
                feature,
            }
            | Self::EmptyShortName {
                feature,
            }
            | Self::DuplicateFeature {
                feature,
                ..
            } => feature,
        }
    }
}

// ============================================================================
// SECTION: Feature Definitions
// ============================================================================

/// Unvalidated feature fields, with the type still in its textual tag form.
///
/// This is the shape features arrive in from documents and authoring
/// prompts; convert with [`FeatureDefinition::try_from`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDraft {
    /// Feature name.
    pub name: String,
    /// Whether rows must supply the feature.
    pub required: bool,
    /// Default for optional features.
    pub default: Option<FeatureValue>,
    /// Type tag (`str`, `int`, `float`, `bool`, `datetime`).
    pub feature_type: String,
    /// Display name.
    pub verbose_name: String,
    /// Compact display name, used as a column alias.
    pub short_name: String,
}

/// Validated, immutable schema attribute.
///
/// # Invariants
/// - `name` is a plain identifier.
/// - Required features have no default; optional features have a default of
///   the declared type.
/// - `verbose_name` and `short_name` are non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDefinition {
    /// Feature name, unique within its problem space.
    name: String,
    /// Whether rows must supply the feature.
    required: bool,
    /// Default applied when an optional feature is omitted.
    default: Option<FeatureValue>,
    /// Declared primitive type.
    declared_type: FeatureType,
    /// Display name.
    verbose_name: String,
    /// Compact display name.
    short_name: String,
}

impl FeatureDefinition {
    /// Builds a feature definition, enforcing every definition invariant.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError`] identifying the first violated rule.
    pub fn new(
        name: impl Into<String>,
        required: bool,
        default: Option<FeatureValue>,
        declared_type: FeatureType,
        verbose_name: impl Into<String>,
        short_name: impl Into<String>,
    ) -> Result<Self, SchemaDefinitionError> {
        let name = name.into();
        if !is_feature_identifier(&name) {
            return Err(SchemaDefinitionError::InvalidName {
                feature: name,
            });
        }
        match (required, default.as_ref()) {
            (true, Some(value)) => {
                return Err(SchemaDefinitionError::RequiredWithDefault {
                    feature: name,
                    default: value.clone(),
                });
            }
            (false, None) => {
                return Err(SchemaDefinitionError::MissingDefault {
                    feature: name,
                });
            }
            (false, Some(FeatureValue::Float(real))) if !real.is_finite() => {
                return Err(SchemaDefinitionError::UnreadableDefault {
                    feature: name,
                    detail: format!("non-finite float {real}"),
                });
            }
            (false, Some(value)) if !declared_type.accepts(value) => {
                return Err(SchemaDefinitionError::DefaultTypeMismatch {
                    feature: name,
                    default: value.clone(),
                    expected: declared_type,
                    actual: value.feature_type(),
                });
            }
            _ => {}
        }
        let verbose_name = verbose_name.into();
        if verbose_name.trim().is_empty() {
            return Err(SchemaDefinitionError::EmptyVerboseName {
                feature: name,
            });
        }
        let short_name = short_name.into();
        if short_name.trim().is_empty() {
            return Err(SchemaDefinitionError::EmptyShortName {
                feature: name,
            });
        }
        Ok(Self {
            name,
            required,
            default,
            declared_type,
            verbose_name,
            short_name,
        })
    }

    /// Builds a required feature (no default).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError`] when the name or labels are invalid.
    pub fn required(
        name: impl Into<String>,
        declared_type: FeatureType,
        verbose_name: impl Into<String>,
        short_name: impl Into<String>,
    ) -> Result<Self, SchemaDefinitionError> {
        Self::new(name, true, None, declared_type, verbose_name, short_name)
    }

    /// Builds an optional feature whose declared type is taken from `default`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError`] when the name or labels are invalid.
    pub fn optional(
        name: impl Into<String>,
        default: impl Into<FeatureValue>,
        verbose_name: impl Into<String>,
        short_name: impl Into<String>,
    ) -> Result<Self, SchemaDefinitionError> {
        let default = default.into();
        let declared_type = default.feature_type();
        Self::new(name, false, Some(default), declared_type, verbose_name, short_name)
    }

    /// Returns the feature name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true when rows must supply this feature.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the default applied to rows that omit this feature.
    #[must_use]
    pub const fn default_value(&self) -> Option<&FeatureValue> {
        self.default.as_ref()
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn declared_type(&self) -> FeatureType {
        self.declared_type
    }

    /// Returns the display name.
    #[must_use]
    pub fn verbose_name(&self) -> &str {
        &self.verbose_name
    }

    /// Returns the compact display name.
    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }
}

impl TryFrom<FeatureDraft> for FeatureDefinition {
    type Error = SchemaDefinitionError;

    fn try_from(draft: FeatureDraft) -> Result<Self, Self::Error> {
        if !is_feature_identifier(&draft.name) {
            return Err(SchemaDefinitionError::InvalidName {
                feature: draft.name,
            });
        }
        let Some(declared_type) = FeatureType::from_tag(&draft.feature_type) else {
            return Err(SchemaDefinitionError::UnknownType {
                feature: draft.name,
                tag: draft.feature_type,
            });
        };
        Self::new(
            draft.name,
            draft.required,
            draft.default,
            declared_type,
            draft.verbose_name,
            draft.short_name,
        )
    }
}

impl From<&FeatureDefinition> for FeatureDraft {
    fn from(feature: &FeatureDefinition) -> Self {
        Self {
            name: feature.name.clone(),
            required: feature.required,
            default: feature.default.clone(),
            feature_type: feature.declared_type.as_tag().to_string(),
            verbose_name: feature.verbose_name.clone(),
            short_name: feature.short_name.clone(),
        }
    }
}

impl fmt::Display for FeatureDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "feature: {}, type: {}, ", self.name, self.declared_type)?;
        match &self.default {
            Some(default) => write!(f, "default: {default}")?,
            None => f.write_str("required")?,
        }
        write!(f, ", output names: '{}', '{}'", self.verbose_name, self.short_name)
    }
}
