//! # section-solver-core: Section-Set Constraint Assembler
//!
//! Partitions a ranked pool of candidates into ordered sections under
//! per-section attribute/count constraints, cross-section assignment
//! rules, hierarchical AND/OR enforcement, and item-ordering constraints —
//! maximizing the total pipeline score of the items selected.
//!
//! ## Quick example
//!
//! ```no_run
//! use section_solver_core::constraints::{ConstraintType, SectionSetConstraint};
//! use section_solver_core::domain::{Candidate, DomainObject};
//! use section_solver_core::error::SolverError;
//! use section_solver_core::model::BacktrackingModel;
//!
//! fn main() -> Result<(), SolverError> {
//!     let sections = vec![DomainObject::new("section:morning"), DomainObject::new("section:afternoon")];
//!     let constraint = SectionSetConstraint::new()
//!         .set_sections(sections)?
//!         .add_section_count_constraint(Some("section:morning"), ConstraintType::Leq, 1)?;
//!
//!     let items = vec![
//!         Candidate::new(DomainObject::new("item:alice")),
//!         Candidate::new(DomainObject::new("item:bob")),
//!     ];
//!
//!     let mut model = BacktrackingModel::new();
//!     let solution = section_solver_core::solve(&constraint, items, &mut model)?;
//!     println!("overall score: {}", solution.overall_score);
//!     Ok(())
//! }
//! ```

pub mod attributes;
pub mod compiler;
pub mod config;
pub mod constraints;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod model;
pub mod pipeline;
pub mod solution;

use constraints::SectionSetConstraint;
use domain::Candidate;
use error::SolverError;
use model::{ModelBuilder, SolveOutcome};
use solution::ConstraintSolution;

/// Compiles `constraint` over `items` into `builder`, solves it, and reads
/// the result back out.
///
/// `items` should already be the ranked output of a
/// [`pipeline::Pipeline::run`] call; the compiler doesn't re-rank or
/// re-filter, it only reads each candidate's accumulated score.
pub fn solve(
    constraint: &SectionSetConstraint,
    items: Vec<Candidate>,
    builder: &mut dyn ModelBuilder,
) -> Result<ConstraintSolution, SolverError> {
    let compiled = compiler::compile(constraint, &items, builder)?;
    match builder.solve(constraint.config.solver_time_budget_ms) {
        SolveOutcome::Optimal(solution) | SolveOutcome::Feasible(solution) => {
            Ok(extractor::extract(constraint, &compiled, &items, &solution))
        }
        SolveOutcome::Infeasible => {
            if constraint.config.allow_infeasible_report {
                Ok(ConstraintSolution::empty())
            } else {
                Err(SolverError::Infeasible)
            }
        }
        SolveOutcome::Failure(message) => Err(SolverError::SolverFailure(message)),
    }
}
