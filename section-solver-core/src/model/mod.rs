//! The abstract model-builder seam the compiler targets.
//!
//! [`ModelBuilder`] is deliberately shaped like a 0/1 integer-programming
//! API (boolean/int variables, linear (in)equalities, conditional
//! enforcement, `AddMaxEquality`-style coverage, a maximize objective, a
//! bounded solve) so a production build can point it at a real CP-SAT
//! binding. This crate ships exactly one implementation,
//! [`backtracking::BacktrackingModel`], as a dependency-free reference and
//! test backend — not a production solver.

mod backtracking;
mod expr;

pub use backtracking::BacktrackingModel;
pub use expr::{Comparator, LinearExpr};

use std::collections::HashMap;

/// An opaque handle to a variable created by a [`ModelBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub u32);

/// The assignment a successful solve produced, queried by [`VarId`].
#[derive(Debug, Clone, Default)]
pub struct Solution {
    values: HashMap<VarId, i64>,
}

impl Solution {
    pub fn new(values: HashMap<VarId, i64>) -> Self {
        Self { values }
    }

    /// The integer value assigned to `var`. Panics if `var` was never
    /// created against the model that produced this solution — backends
    /// are expected to populate every variable they created.
    pub fn value(&self, var: VarId) -> i64 {
        *self.values.get(&var).unwrap_or_else(|| panic!("{var:?} has no value in this solution"))
    }

    pub fn bool_value(&self, var: VarId) -> bool {
        self.value(var) != 0
    }
}

/// The result of [`ModelBuilder::solve`].
pub enum SolveOutcome {
    /// A provably best solution was found.
    Optimal(Solution),
    /// A solution was found but the backend can't certify optimality (for
    /// example, it ran out of time budget first).
    Feasible(Solution),
    /// The model has no solution satisfying every constraint.
    Infeasible,
    /// The backend could not reach a verdict (timed out with nothing
    /// feasible yet found, or hit an internal error).
    Failure(String),
}

/// The seam between the model compiler and whatever optimizer actually
/// searches for an assignment.
///
/// All variables created through this trait have integer domains; a
/// boolean variable is simply one with domain `[0, 1]`. Enforcement lists
/// passed to [`ModelBuilder::add_linear`] are ANDed together — CP-SAT's
/// `OnlyEnforceIf` accepts the same shape, a list of literals that must all
/// hold for the constraint to apply.
pub trait ModelBuilder {
    fn new_bool_var(&mut self, name: &str) -> VarId;
    fn new_int_var(&mut self, lower: i64, upper: i64, name: &str) -> VarId;

    /// Fixes a variable to a constant value.
    fn fix(&mut self, var: VarId, value: i64);

    /// Posts `lhs cmp rhs`, active only when every variable in
    /// `enforced_by` is `true` (an empty slice means unconditional).
    fn add_linear(&mut self, lhs: LinearExpr, cmp: Comparator, rhs: LinearExpr, enforced_by: &[VarId]);

    /// Posts `target == max(terms)` for boolean `target` and `terms`.
    fn add_max_equality(&mut self, target: VarId, terms: &[VarId]);

    fn maximize(&mut self, objective: LinearExpr);

    /// Searches for a feasible, objective-maximizing assignment, bounded
    /// by `time_budget_ms` if given.
    fn solve(&mut self, time_budget_ms: Option<u64>) -> SolveOutcome;

    /// Returns a fresh boolean variable constrained to `1 - var`.
    fn not_var(&mut self, var: VarId) -> VarId {
        let negated = self.new_bool_var("");
        self.add_linear(
            LinearExpr::var(negated) + LinearExpr::var(var),
            Comparator::Eq,
            LinearExpr::constant(1),
            &[],
        );
        negated
    }
}
