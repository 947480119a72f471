//! Reads a solved model back out into a [`ConstraintSolution`].

use std::collections::HashMap;

use crate::attributes::resolve_numeric;
use crate::compiler::CompiledModel;
use crate::constraints::SectionSetConstraint;
use crate::domain::Candidate;
use crate::model::Solution;
use crate::solution::{ConstraintSolution, ConstraintSolutionSection, ConstraintSolutionSectionSet};

/// Reads `solution` back into the domain-level [`ConstraintSolution`]
/// shape: which items landed in which section, each section's score and
/// tracked attribute totals, and whatever items the objective left
/// unselected. `constraint` compiles to exactly one section set, so the
/// result always carries a single [`ConstraintSolutionSectionSet`]; the
/// shape still has room for a future orchestrator to combine several.
pub fn extract(
    constraint: &SectionSetConstraint,
    compiled: &CompiledModel,
    items: &[Candidate],
    solution: &Solution,
) -> ConstraintSolution {
    let mut sections = Vec::with_capacity(constraint.sections.len());
    let mut overall_attribute_totals: HashMap<String, f64> = HashMap::new();
    let mut overall_score = 0.0;
    let mut unselected_items = Vec::new();

    for (s, section) in constraint.sections.iter().enumerate() {
        let mut section_items = Vec::new();
        let mut attribute_totals: HashMap<String, f64> = HashMap::new();
        let mut score = 0.0;

        for (i, item) in items.iter().enumerate() {
            let var = compiled.assignment[&(i, s)];
            if !solution.bool_value(var) {
                continue;
            }
            score += item.total_score();
            for attribute_name in &compiled.attributes_of_interest {
                if let Some(value) = resolve_numeric(&item.domain_object, attribute_name) {
                    *attribute_totals.entry(attribute_name.clone()).or_insert(0.0) += value;
                }
            }
            section_items.push(item.clone());
        }

        for (name, value) in &attribute_totals {
            *overall_attribute_totals.entry(name.clone()).or_insert(0.0) += value;
        }
        overall_score += score;

        sections.push(ConstraintSolutionSection {
            section: section.clone(),
            items: section_items,
            score,
            attribute_totals,
        });
    }

    for (i, item) in items.iter().enumerate() {
        if !solution.bool_value(compiled.item_selection[i]) {
            unselected_items.push(item.clone());
        }
    }

    ConstraintSolution {
        overall_score,
        overall_attribute_totals,
        solution_section_sets: vec![ConstraintSolutionSectionSet { sections }],
        unselected_items,
    }
}
