//! The shape of a completed solve, returned by [`crate::solve`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Candidate, DomainObject};

/// One section of a solved section set: which items landed there, the sum
/// of their scores, and the attribute sums the compiler was asked to
/// track for that section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintSolutionSection {
    pub section: DomainObject,
    pub items: Vec<Candidate>,
    pub score: f64,
    pub attribute_totals: HashMap<String, f64>,
}

/// One solved section set: its sections' assignments, in the same order
/// as the [`crate::constraints::SectionSetConstraint`] that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintSolutionSectionSet {
    pub sections: Vec<ConstraintSolutionSection>,
}

/// A fully solved problem: one or more section sets (each compiled from
/// its own [`crate::constraints::SectionSetConstraint`] over the shared
/// candidate pool) plus whatever items were selected but left unassigned
/// (selected-but-uncovered is impossible by construction within a single
/// section set; this only ever holds items the objective chose not to
/// select at all).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintSolution {
    pub overall_score: f64,
    pub overall_attribute_totals: HashMap<String, f64>,
    pub solution_section_sets: Vec<ConstraintSolutionSectionSet>,
    pub unselected_items: Vec<Candidate>,
}

impl ConstraintSolution {
    /// The report used when the caller opted into treating infeasibility
    /// as "nothing could be assigned" rather than a hard error.
    pub fn empty() -> Self {
        Self {
            overall_score: 0.0,
            overall_attribute_totals: HashMap::new(),
            solution_section_sets: Vec::new(),
            unselected_items: Vec::new(),
        }
    }
}
