// crates/optiface-core/tests/space_registry.rs
// ============================================================================
// Module: Problem Space Persistence Tests
// Description: Document round trips, discovery, and registry switching.
// Purpose: Validate the on-disk lifecycle of problem spaces.
// ============================================================================

//! Problem-space persistence and registry tests.

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

use std::fs;

use optiface_core::DEFAULT_PROBLEM_NAME;
use optiface_core::FeatureDefinition;
use optiface_core::FeatureType;
use optiface_core::FeatureValue;
use optiface_core::PROBLEM_SPACE_FILE;
use optiface_core::ProblemName;
use optiface_core::ProblemSpace;
use optiface_core::ProblemSpaceRegistry;
use optiface_core::SpaceError;
use optiface_core::SpaceLayout;
use tempfile::TempDir;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn layout() -> (TempDir, SpaceLayout) {
    let dir = TempDir::new().unwrap();
    let layout = SpaceLayout::new(dir.path().join("space"));
    (dir, layout)
}

fn name(value: &str) -> ProblemName {
    ProblemName::new(value).unwrap()
}

fn rich_space(problem: &str) -> ProblemSpace {
    ProblemSpace::new(
        name(problem),
        vec![
            FeatureDefinition::required("graph", FeatureType::Str, "Graph", "g").unwrap(),
            FeatureDefinition::optional("directed", false, "Directed", "dir").unwrap(),
            FeatureDefinition::optional(
                "generated_at",
                OffsetDateTime::from_unix_timestamp(842_392_800).unwrap(),
                "Generated At",
                "gen",
            )
            .unwrap(),
        ],
        vec![FeatureDefinition::optional("threads", 4_i64, "Threads", "thr").unwrap()],
        vec![
            FeatureDefinition::required("cost", FeatureType::Float, "Cost", "c").unwrap(),
            FeatureDefinition::optional("gap", 0.25, "Gap", "gp").unwrap(),
            FeatureDefinition::optional("status", "optimal", "Status", "st").unwrap(),
        ],
    )
    .unwrap()
}

// ============================================================================
// SECTION: Documents
// ============================================================================

#[test]
fn save_then_load_is_structurally_equal() {
    let (_dir, layout) = layout();
    let space = rich_space("shortest_path");
    space.save(&layout).unwrap();
    let loaded = ProblemSpace::load(&layout, space.name()).unwrap();
    assert_eq!(loaded, space);
    assert_eq!(loaded.feature("directed").unwrap().default_value(), Some(&FeatureValue::Bool(false)));
}

#[test]
fn saved_document_uses_group_keys_and_nulls_required_defaults() {
    let (_dir, layout) = layout();
    let space = ProblemSpace::create_default(&layout, name("knapsack")).unwrap();
    let text = fs::read_to_string(layout.document_path(space.name())).unwrap();
    for key in ["instance_key:", "solver_key:", "output_key:", "feature_type: int"] {
        assert!(text.contains(key), "missing {key} in\n{text}");
    }
    assert!(text.contains("default: null"));
    assert!(!text.contains("run_id"));
}

#[test]
fn loading_a_missing_space_is_not_found() {
    let (_dir, layout) = layout();
    let error = ProblemSpace::load(&layout, &name("absent")).unwrap_err();
    assert_eq!(error, SpaceError::NotFound("absent".to_string()));
}

#[test]
fn oversized_documents_are_rejected() {
    let (_dir, layout) = layout();
    let problem = name("huge");
    fs::create_dir_all(layout.problem_dir(&problem)).unwrap();
    let padding = format!("# {}\n", "x".repeat(optiface_core::space::MAX_DOCUMENT_BYTES));
    fs::write(layout.document_path(&problem), padding).unwrap();
    assert!(matches!(ProblemSpace::load(&layout, &problem), Err(SpaceError::Parse(_))));
}

// ============================================================================
// SECTION: Registry
// ============================================================================

#[test]
fn empty_root_gets_the_default_problem_space() {
    let (_dir, layout) = layout();
    let registry = ProblemSpaceRegistry::open(layout.clone()).unwrap();
    assert_eq!(registry.problems(), &[name(DEFAULT_PROBLEM_NAME)]);
    assert_eq!(registry.current().name().as_str(), DEFAULT_PROBLEM_NAME);
    assert!(layout.document_path(&name(DEFAULT_PROBLEM_NAME)).is_file());
}

#[test]
fn added_space_exists_and_survives_a_rescan() {
    let (_dir, layout) = layout();
    let mut registry = ProblemSpaceRegistry::open(layout).unwrap();
    registry.add_new_pspace("foo").unwrap();
    assert!(registry.problem_exists("foo"));
    assert_eq!(registry.current().name().as_str(), DEFAULT_PROBLEM_NAME);

    registry.read().unwrap();
    assert!(registry.problem_exists("foo"));
    assert!(registry.problem_exists(DEFAULT_PROBLEM_NAME));
}

#[test]
fn adding_an_existing_space_fails() {
    let (_dir, layout) = layout();
    let mut registry = ProblemSpaceRegistry::open(layout).unwrap();
    registry.add_new_pspace("foo").unwrap();
    assert_eq!(
        registry.add_new_pspace("foo").unwrap_err(),
        SpaceError::AlreadyExists("foo".to_string())
    );
    assert!(matches!(registry.add_new_pspace("../escape"), Err(SpaceError::InvalidName(_))));
}

#[test]
fn discovery_is_lexicographic_and_ignores_stray_directories() {
    let (_dir, layout) = layout();
    for problem in ["zeta", "alpha", "mid"] {
        ProblemSpace::create_default(&layout, name(problem)).unwrap();
    }
    fs::create_dir_all(layout.root().join("scratch")).unwrap();
    let registry = ProblemSpaceRegistry::open(layout).unwrap();
    assert_eq!(registry.problems(), &[name("alpha"), name("mid"), name("zeta")]);
    assert_eq!(registry.current().name().as_str(), "alpha");
}

#[test]
fn switching_loads_the_target() {
    let (_dir, layout) = layout();
    rich_space("graphs").save(&layout).unwrap();
    let mut registry = ProblemSpaceRegistry::open(layout).unwrap();
    registry.add_new_pspace("knapsack").unwrap();
    let current = registry.switch_current_pspace("knapsack").unwrap();
    assert_eq!(current.name().as_str(), "knapsack");
    assert!(current.feature("set_name").is_some());
}

#[test]
fn failed_switch_keeps_the_previous_space() {
    let (_dir, layout) = layout();
    let mut registry = ProblemSpaceRegistry::open(layout.clone()).unwrap();
    registry.add_new_pspace("broken").unwrap();
    fs::write(layout.document_path(&name("broken")), "instance_key: [not, a, mapping]\n").unwrap();

    assert!(matches!(registry.switch_current_pspace("broken"), Err(SpaceError::Parse(_))));
    assert_eq!(registry.current().name().as_str(), DEFAULT_PROBLEM_NAME);

    assert_eq!(
        registry.switch_current_pspace("nowhere").unwrap_err(),
        SpaceError::NotFound("nowhere".to_string())
    );
    assert_eq!(registry.current().name().as_str(), DEFAULT_PROBLEM_NAME);
}

#[test]
fn document_file_name_is_stable() {
    let (_dir, layout) = layout();
    let path = layout.document_path(&name("p"));
    assert!(path.ends_with(format!("p/{PROBLEM_SPACE_FILE}")));
}
