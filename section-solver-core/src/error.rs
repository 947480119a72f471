//! Error types returned by the builder, compiler and orchestrator.

use serde::Serialize;
use thiserror::Error;

/// All failure modes surfaced by `section-solver-core`.
///
/// Variants map directly onto the six error kinds a caller needs to
/// distinguish: a bad reference in the constraint graph, a missing
/// attribute discovered while evaluating a filter or constraint, a bad
/// configuration value, an infeasible model, a backend failure, and a
/// pipeline stage raising mid-stream.
#[derive(Error, Debug, Clone, Serialize)]
pub enum SolverError {
    /// A builder method or compile step referenced a URI that is not a
    /// registered section or item.
    #[error("'{uri}' is not a registered section or item URI")]
    UnknownReference { uri: String },

    /// An attribute path could not be resolved (or did not resolve to a
    /// number) while evaluating an item.
    #[error("item '{item_uri}' is missing attribute '{attribute}'")]
    MissingAttribute { item_uri: String, attribute: String },

    /// A builder or solver configuration value is out of range or
    /// internally inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The compiled model has no feasible assignment.
    #[error("no feasible solution exists for the given constraints")]
    Infeasible,

    /// The model builder backend failed to produce an answer for a reason
    /// unrelated to feasibility (time budget exhausted, internal error).
    #[error("solver backend failed: {0}")]
    SolverFailure(String),

    /// A candidate pipeline stage raised while processing a candidate.
    #[error("pipeline stage '{stage}' failed: {source}")]
    StageFailure {
        stage: String,
        #[source]
        source: Box<SolverError>,
    },
}
