//! Solver-wide configuration, deserialized from the same problem file the
//! CLI reads.

use serde::{Deserialize, Serialize};

fn default_scaling() -> i64 {
    1
}

/// Knobs that affect how a [`crate::constraints::SectionSetConstraint`]
/// compiles and solves, independent of the constraint graph itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSetSolverConfig {
    /// Multiplier applied to every attribute value and threshold before it
    /// enters the model, so fractional attributes survive the conversion
    /// to integer CP-SAT coefficients. Must be a positive integer.
    #[serde(default = "default_scaling")]
    pub scaling: i64,

    /// Wall-clock budget handed to the model builder backend. `None` means
    /// let the backend run to completion.
    #[serde(default)]
    pub solver_time_budget_ms: Option<u64>,

    /// When `true`, an infeasible model produces an empty
    /// [`crate::solution::ConstraintSolution`] instead of a
    /// [`crate::error::SolverError::Infeasible`].
    #[serde(default)]
    pub allow_infeasible_report: bool,
}

impl Default for SectionSetSolverConfig {
    fn default() -> Self {
        Self {
            scaling: default_scaling(),
            solver_time_budget_ms: None,
            allow_infeasible_report: false,
        }
    }
}
