//! The candidate pipeline: a composable chain of lazy stages that takes a
//! context and produces a ranked candidate list.
//!
//! Every stage but the ranker is lazy — generators, filters and scorers all
//! operate item-by-item over an iterator and never collect the stream. The
//! ranker is the one stage allowed to materialize, since sorting needs the
//! whole set in hand. See [`stages`] for the four stage kinds.

mod stages;

pub use stages::{BooleanScorerStage, FilterStage, GeneratorStage, RankerStage, UnconditionalScorerStage};

use crate::domain::Candidate;
use crate::error::SolverError;

/// One element of a candidate stream: either a candidate that survived
/// every stage so far, or an error tagged with the stage that raised it.
pub type StageResult = Result<Candidate, SolverError>;

/// A lazy stream of candidates flowing through the pipeline.
pub type CandidateStream<'a> = Box<dyn Iterator<Item = StageResult> + 'a>;

/// A single step of the candidate pipeline.
///
/// Implementors receive the previous stage's stream and return a new one;
/// `context` is the opaque, per-run data every stage may read (attribute
/// thresholds, a reference date, whatever the caller's generators/filters
/// close over). Stages never mutate `context`.
pub trait Stage<Ctx> {
    /// A short, stable name used to tag errors raised while this stage runs.
    fn identity(&self) -> &str;

    fn apply<'a>(&'a self, context: &'a Ctx, input: CandidateStream<'a>) -> CandidateStream<'a>;
}

/// An ordered chain of stages, run front to back.
pub struct Pipeline<Ctx> {
    stages: Vec<Box<dyn Stage<Ctx>>>,
}

impl<Ctx> Default for Pipeline<Ctx> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<Ctx> Pipeline<Ctx> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage to the end of the pipeline.
    pub fn push(mut self, stage: Box<dyn Stage<Ctx>>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Runs every stage in order and collects the final stream.
    ///
    /// The first stage normally ignores its (empty) input stream and acts
    /// as the generator; every later stage narrows or scores what came
    /// before it. Returns the first error encountered, already tagged with
    /// the identity of the stage that raised it.
    pub fn run(&self, context: &Ctx) -> Result<Vec<Candidate>, SolverError> {
        let mut stream: CandidateStream<'_> = Box::new(std::iter::empty());
        for stage in &self.stages {
            stream = stage.apply(context, stream);
        }
        stream.collect()
    }
}
