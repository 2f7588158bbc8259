// crates/optiface-core/tests/feature_definition.rs
// ============================================================================
// Module: Feature Definition Tests
// Description: Construction rules for feature definitions.
// Purpose: Check that valid definitions round-trip and each rule is named.
// ============================================================================

//! Feature definition construction tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use optiface_core::FeatureDefinition;
use optiface_core::FeatureType;
use optiface_core::FeatureValue;
use optiface_core::SchemaInvariant;
use proptest::prelude::*;

// ============================================================================
// SECTION: Strategies
// ============================================================================

fn feature_name() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,15}"
}

fn label() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ()]{0,20}"
}

fn typed_value() -> impl Strategy<Value = FeatureValue> {
    prop_oneof![
        ".{0,12}".prop_map(FeatureValue::Str),
        any::<i64>().prop_map(FeatureValue::Int),
        any::<f64>().prop_filter("finite", |v| v.is_finite()).prop_map(FeatureValue::Float),
        any::<bool>().prop_map(FeatureValue::Bool),
        (0_i64 .. 4_102_444_800).prop_map(|secs| {
            FeatureValue::DateTime(time::OffsetDateTime::from_unix_timestamp(secs).unwrap())
        }),
    ]
}

proptest! {
    #[test]
    fn valid_optional_features_round_trip(
        name in feature_name(),
        default in typed_value(),
        verbose in label(),
        short in label(),
    ) {
        let declared = default.feature_type();
        let feature = FeatureDefinition::new(
            name.clone(),
            false,
            Some(default.clone()),
            declared,
            verbose.clone(),
            short.clone(),
        )
        .unwrap();
        prop_assert_eq!(feature.name(), name.as_str());
        prop_assert!(!feature.is_required());
        prop_assert_eq!(feature.default_value(), Some(&default));
        prop_assert_eq!(feature.declared_type(), declared);
        prop_assert_eq!(feature.verbose_name(), verbose.as_str());
        prop_assert_eq!(feature.short_name(), short.as_str());
    }

    #[test]
    fn valid_required_features_round_trip(
        name in feature_name(),
        index in 0_usize .. FeatureType::ALL.len(),
        verbose in label(),
        short in label(),
    ) {
        let declared = FeatureType::ALL[index];
        let feature = FeatureDefinition::required(name.clone(), declared, verbose, short).unwrap();
        prop_assert!(feature.is_required());
        prop_assert_eq!(feature.default_value(), None);
        prop_assert_eq!(feature.declared_type(), declared);
    }

    #[test]
    fn mismatched_defaults_are_always_rejected(
        default in typed_value(),
        index in 0_usize .. FeatureType::ALL.len(),
    ) {
        let declared = FeatureType::ALL[index];
        prop_assume!(declared != default.feature_type());
        let error =
            FeatureDefinition::new("x", false, Some(default), declared, "X", "x").unwrap_err();
        prop_assert_eq!(error.invariant(), SchemaInvariant::DefaultMatchesType);
    }
}

// ============================================================================
// SECTION: Rule Violations
// ============================================================================

#[test]
fn each_rule_is_reported_in_isolation() {
    let cases = [
        (
            FeatureDefinition::new("n", true, Some(FeatureValue::Int(1)), FeatureType::Int, "N", "n"),
            SchemaInvariant::RequiredHasNoDefault,
        ),
        (
            FeatureDefinition::new("n", false, None, FeatureType::Int, "N", "n"),
            SchemaInvariant::OptionalHasDefault,
        ),
        (
            FeatureDefinition::new(
                "n",
                false,
                Some(FeatureValue::Float(1.0)),
                FeatureType::Int,
                "N",
                "n",
            ),
            SchemaInvariant::DefaultMatchesType,
        ),
        (
            FeatureDefinition::new("n", true, None, FeatureType::Int, "", "n"),
            SchemaInvariant::DisplayNames,
        ),
        (
            FeatureDefinition::new("n", true, None, FeatureType::Int, "N", " "),
            SchemaInvariant::DisplayNames,
        ),
        (
            FeatureDefinition::new("1n", true, None, FeatureType::Int, "N", "n"),
            SchemaInvariant::FeatureName,
        ),
    ];
    for (result, expected) in cases {
        let error = result.unwrap_err();
        assert_eq!(error.invariant(), expected, "{error}");
        assert!(error.to_string().contains('`'), "error names the feature: {error}");
    }
}

#[test]
fn error_message_carries_offending_value() {
    let error = FeatureDefinition::new(
        "rep",
        false,
        Some(FeatureValue::from("zero")),
        FeatureType::Int,
        "Instance Rep",
        "i_rep",
    )
    .unwrap_err();
    let message = error.to_string();
    assert!(message.contains("rep"));
    assert!(message.contains("\"zero\""));
    assert!(message.contains("int"));
}

#[test]
fn non_finite_float_defaults_are_rejected() {
    for default in [f64::NAN, f64::NEG_INFINITY] {
        let error = FeatureDefinition::optional("gap", default, "Gap", "gap").unwrap_err();
        assert_eq!(error.invariant(), SchemaInvariant::DefaultMatchesType);
        assert_eq!(error.feature(), "gap");
        assert!(error.to_string().contains("non-finite float"), "{error}");
    }
}
