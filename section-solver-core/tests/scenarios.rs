//! End-to-end scenarios exercising the compiler's constraint kinds
//! together, each solved with the reference backtracking backend.

mod common;

use common::sections;
use section_solver_core::constraints::{
    ConstraintType, ItemOrderingConstraint, SectionAssignmentConstraint, SectionConstraintHierarchy,
    SectionSetConstraint,
};
use section_solver_core::domain::{AttributeValue, Candidate, DomainObject};
use section_solver_core::error::SolverError;
use section_solver_core::model::BacktrackingModel;

fn scored(uri: &str, score: f64) -> Candidate {
    let mut c = Candidate::new(DomainObject::new(uri));
    c.applied_explanations.push("fixture".to_string());
    c.applied_scores.push(score);
    c
}

fn scored_with_attribute(uri: &str, score: f64, attribute: &str, value: f64) -> Candidate {
    let mut c = scored(uri, score);
    c.domain_object = c.domain_object.with_attribute(attribute, AttributeValue::Number(value));
    c
}

/// Three sections, five items scored 3/2/2/1/1, an exact-one-per-section
/// count cap and nothing else: the optimum fills every section with one
/// of the three highest-scored items.
#[test]
fn exact_count_per_section_picks_the_top_scored_items() {
    let constraint = SectionSetConstraint::new()
        .set_sections(sections(&["s1", "s2", "s3"]))
        .unwrap()
        .add_section_count_constraint(Some("s1"), ConstraintType::Eq, 1)
        .unwrap()
        .add_section_count_constraint(Some("s2"), ConstraintType::Eq, 1)
        .unwrap()
        .add_section_count_constraint(Some("s3"), ConstraintType::Eq, 1)
        .unwrap();

    let items = vec![
        scored("i1", 3.0),
        scored("i2", 2.0),
        scored("i3", 2.0),
        scored("i4", 1.0),
        scored("i5", 1.0),
    ];

    let mut model = BacktrackingModel::new();
    let solution = section_solver_core::solve(&constraint, items, &mut model).unwrap();

    assert_eq!(solution.overall_score, 7.0);
    let section_set = &solution.solution_section_sets[0];
    assert!(section_set.sections.iter().all(|s| s.items.len() == 1));
    let selected: Vec<&str> = section_set
        .sections
        .iter()
        .flat_map(|s| s.items.iter())
        .map(|c| c.domain_object.uri.as_str())
        .collect();
    assert_eq!(solution.unselected_items.len(), 2);
    for left_out in &solution.unselected_items {
        assert!(!selected.contains(&left_out.domain_object.uri.as_str()));
    }
}

/// A strict ordering constraint between two items, both worth selecting,
/// with a per-section cap of one forces them into distinct, correctly
/// ordered sections.
#[test]
fn strict_ordering_places_the_independent_item_first() {
    let constraint = SectionSetConstraint::new()
        .set_sections(sections(&["slot0", "slot1"]))
        .unwrap()
        .add_section_count_constraint(Some("slot0"), ConstraintType::Leq, 1)
        .unwrap()
        .add_section_count_constraint(Some("slot1"), ConstraintType::Leq, 1)
        .unwrap()
        .add_item_ordering_constraint(ItemOrderingConstraint {
            constraint_type: ConstraintType::Less,
            independent_uri: "A".to_string(),
            dependent_uri: "B".to_string(),
        });

    let items = vec![scored("A", 5.0), scored("B", 5.0)];
    let mut model = BacktrackingModel::new();
    let solution = section_solver_core::solve(&constraint, items, &mut model).unwrap();

    let section_set = &solution.solution_section_sets[0];
    assert_eq!(section_set.sections[0].items.len(), 1);
    assert_eq!(section_set.sections[0].items[0].domain_object.uri, "A");
    assert_eq!(section_set.sections[1].items.len(), 1);
    assert_eq!(section_set.sections[1].items[0].domain_object.uri, "B");
}

/// A single section with a cost cap: the optimizer must pick the
/// highest-scoring subset of items whose cost sum stays under the cap.
#[test]
fn attribute_sum_constraint_bounds_the_selected_subset() {
    let constraint = SectionSetConstraint::new()
        .set_sections(sections(&["bucket"]))
        .unwrap()
        .add_section_constraint(
            Some("bucket"),
            section_solver_core::constraints::AttributeConstraint::new("cost", ConstraintType::Leq, 10),
        )
        .unwrap();

    let items = vec![
        scored_with_attribute("c4", 4.0, "cost", 4.0),
        scored_with_attribute("c5", 5.0, "cost", 5.0),
        scored_with_attribute("c6", 6.0, "cost", 6.0),
        scored_with_attribute("c7", 7.0, "cost", 7.0),
    ];

    let mut model = BacktrackingModel::new();
    let solution = section_solver_core::solve(&constraint, items, &mut model).unwrap();

    let section_set = &solution.solution_section_sets[0];
    let chosen: Vec<&str> = section_set.sections[0].items.iter().map(|c| c.domain_object.uri.as_str()).collect();
    let cost_sum: f64 = section_set.sections[0].attribute_totals.get("cost").copied().unwrap_or(0.0);
    assert!(cost_sum <= 10.0);
    assert_eq!(chosen, vec!["c4", "c6"]);
    assert_eq!(solution.overall_score, 10.0);
}

/// `root` enforces an AND child `r1` together with an OR pair `r2`/`r3`,
/// each carrying its own exact-one count cap.
#[test]
fn hierarchy_and_or_enforcement_gates_the_right_sections() {
    let hierarchy = SectionConstraintHierarchy::leaf("root")
        .with_and(SectionConstraintHierarchy::leaf("r1"))
        .with_or(SectionConstraintHierarchy::leaf("r2"))
        .with_or(SectionConstraintHierarchy::leaf("r3"));

    let constraint = SectionSetConstraint::new()
        .set_sections(sections(&["root", "r1", "r2", "r3"]))
        .unwrap()
        .add_section_count_constraint(Some("r1"), ConstraintType::Eq, 1)
        .unwrap()
        .add_section_count_constraint(Some("r2"), ConstraintType::Eq, 1)
        .unwrap()
        .add_section_count_constraint(Some("r3"), ConstraintType::Eq, 1)
        .unwrap()
        .add_section_hierarchy(hierarchy)
        .unwrap();

    let items = vec![scored("i1", 1.0), scored("i2", 1.0), scored("i3", 1.0), scored("i4", 1.0)];

    let mut model = BacktrackingModel::new();
    let solution = section_solver_core::solve(&constraint, items, &mut model).unwrap();

    let section_set = &solution.solution_section_sets[0];
    let by_uri = |uri: &str| section_set.sections.iter().find(|s| s.section.uri == uri).unwrap();
    assert_eq!(by_uri("r1").items.len(), 1);
    assert!(by_uri("r2").items.len() == 1 || by_uri("r3").items.len() == 1);
}

/// An at-most-one cross-section constraint: no item is ever assigned to
/// both sections at once.
#[test]
fn am1_cross_section_constraint_forbids_double_assignment() {
    let constraint = SectionSetConstraint::new()
        .set_sections(sections(&["s1", "s2"]))
        .unwrap()
        .add_section_assignment_constraint(SectionAssignmentConstraint {
            constraint_type: ConstraintType::Am1,
            section_a: "s1".to_string(),
            section_b: "s2".to_string(),
        })
        .unwrap();

    let items = vec![scored("i1", 1.0), scored("i2", 1.0), scored("i3", 1.0)];
    let mut model = BacktrackingModel::new();
    let solution = section_solver_core::solve(&constraint, items, &mut model).unwrap();

    let section_set = &solution.solution_section_sets[0];
    let in_s1: Vec<&str> = section_set.sections[0].items.iter().map(|c| c.domain_object.uri.as_str()).collect();
    let in_s2: Vec<&str> = section_set.sections[1].items.iter().map(|c| c.domain_object.uri.as_str()).collect();
    for uri in &in_s1 {
        assert!(!in_s2.contains(uri));
    }
}

/// A required assignment that conflicts with the target section's filter
/// (and isn't opted out via the escape hatch) is infeasible.
#[test]
fn required_assignment_conflicting_with_filter_is_infeasible() {
    let constraint = SectionSetConstraint::new()
        .set_sections(sections(&["s1", "s2"]))
        .unwrap()
        .set_section_assignment_filter("s2", |obj| obj.uri != "pinned")
        .unwrap()
        .add_required_item_assignment("pinned", "s2")
        .unwrap();

    let items = vec![scored("pinned", 1.0)];
    let mut model = BacktrackingModel::new();
    let err = section_solver_core::solve(&constraint, items, &mut model).unwrap_err();
    assert!(matches!(err, SolverError::Infeasible));
}

/// The same required-assignment pin succeeds once the section opts out of
/// filter gating.
#[test]
fn required_assignment_succeeds_when_filter_gating_is_waived() {
    let constraint = SectionSetConstraint::new()
        .set_sections(sections(&["s1", "s2"]))
        .unwrap()
        .set_section_assignment_filter("s2", |obj| obj.uri != "pinned")
        .unwrap()
        .allow_invalid_assignment_to_section("s2")
        .unwrap()
        .add_required_item_assignment("pinned", "s2")
        .unwrap();

    let items = vec![scored("pinned", 1.0)];
    let mut model = BacktrackingModel::new();
    let solution = section_solver_core::solve(&constraint, items, &mut model).unwrap();
    let section_set = &solution.solution_section_sets[0];
    assert_eq!(section_set.sections[1].items.len(), 1);
    assert_eq!(section_set.sections[1].items[0].domain_object.uri, "pinned");
}
