//! Shared test fixtures for section-solver-core integration tests.

use section_solver_core::domain::{Candidate, DomainObject};

#[allow(dead_code)]
pub fn sections(uris: &[&str]) -> Vec<DomainObject> {
    uris.iter().map(|u| DomainObject::new(*u)).collect()
}

/// Items named `p0..pN`, each with a distinct positive score so selecting
/// more of them is always at least as good as selecting fewer.
#[allow(dead_code)]
pub fn scored_items(count: usize) -> Vec<Candidate> {
    (0..count)
        .map(|i| {
            let mut candidate = Candidate::new(DomainObject::new(format!("p{i}")));
            candidate.applied_explanations.push("fixture".to_string());
            candidate.applied_scores.push((i + 1) as f64);
            candidate
        })
        .collect()
}
