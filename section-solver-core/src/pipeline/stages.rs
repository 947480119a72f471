//! The four stage kinds: Generator, Filter, Scorer (unconditional and
//! boolean) and Ranker.

use crate::domain::{Candidate, DomainObject, Explanation};
use crate::error::SolverError;

use super::{CandidateStream, Stage};

fn tag(identity: &str, err: SolverError) -> SolverError {
    SolverError::StageFailure {
        stage: identity.to_string(),
        source: Box::new(err),
    }
}

/// Produces the initial candidate stream from scratch, ignoring whatever
/// came before it. Every emitted candidate starts its trail with this
/// stage's explanation and a score of zero.
pub struct GeneratorStage<Ctx> {
    identity: String,
    explanation: Explanation,
    #[allow(clippy::type_complexity)]
    generate: Box<
        dyn for<'a> Fn(&'a Ctx) -> Box<dyn Iterator<Item = Result<DomainObject, SolverError>> + 'a>,
    >,
}

impl<Ctx> GeneratorStage<Ctx> {
    pub fn new<F>(identity: impl Into<String>, explanation: impl Into<Explanation>, generate: F) -> Self
    where
        F: for<'a> Fn(&'a Ctx) -> Box<dyn Iterator<Item = Result<DomainObject, SolverError>> + 'a>
            + 'static,
    {
        Self {
            identity: identity.into(),
            explanation: explanation.into(),
            generate: Box::new(generate),
        }
    }
}

impl<Ctx> Stage<Ctx> for GeneratorStage<Ctx> {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn apply<'a>(&'a self, context: &'a Ctx, _input: CandidateStream<'a>) -> CandidateStream<'a> {
        let identity = self.identity.clone();
        let explanation = self.explanation.clone();
        Box::new((self.generate)(context).map(move |item| {
            item.map(|domain_object| {
                let mut candidate = Candidate::new(domain_object);
                candidate.push_trail(explanation.clone(), 0.0);
                candidate
            })
            .map_err(|e| tag(&identity, e))
        }))
    }
}

/// Drops candidates that don't satisfy `predicate`; survivors get the
/// stage's explanation appended with a score of zero. A predicate error
/// aborts the pipeline rather than silently excluding the candidate.
pub struct FilterStage<Ctx> {
    identity: String,
    explanation: Explanation,
    predicate: Box<dyn Fn(&Ctx, &Candidate) -> Result<bool, SolverError>>,
}

impl<Ctx> FilterStage<Ctx> {
    pub fn new<F>(identity: impl Into<String>, explanation: impl Into<Explanation>, predicate: F) -> Self
    where
        F: Fn(&Ctx, &Candidate) -> Result<bool, SolverError> + 'static,
    {
        Self {
            identity: identity.into(),
            explanation: explanation.into(),
            predicate: Box::new(predicate),
        }
    }
}

impl<Ctx> Stage<Ctx> for FilterStage<Ctx> {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn apply<'a>(&'a self, context: &'a Ctx, input: CandidateStream<'a>) -> CandidateStream<'a> {
        Box::new(input.filter_map(move |item| {
            let outcome = (|| -> Result<Option<Candidate>, SolverError> {
                let mut candidate = item?;
                if (self.predicate)(context, &candidate)? {
                    candidate.push_trail(self.explanation.clone(), 0.0);
                    Ok(Some(candidate))
                } else {
                    Ok(None)
                }
            })();
            match outcome {
                Ok(Some(c)) => Some(Ok(c)),
                Ok(None) => None,
                Err(e) => Some(Err(tag(&self.identity, e))),
            }
        }))
    }
}

/// Appends exactly one `(explanation, score)` pair to every candidate that
/// passes through, unconditionally.
pub struct UnconditionalScorerStage<Ctx> {
    identity: String,
    explanation: Explanation,
    score: Box<dyn Fn(&Ctx, &Candidate) -> Result<f64, SolverError>>,
}

impl<Ctx> UnconditionalScorerStage<Ctx> {
    pub fn new<F>(identity: impl Into<String>, explanation: impl Into<Explanation>, score: F) -> Self
    where
        F: Fn(&Ctx, &Candidate) -> Result<f64, SolverError> + 'static,
    {
        Self {
            identity: identity.into(),
            explanation: explanation.into(),
            score: Box::new(score),
        }
    }
}

impl<Ctx> Stage<Ctx> for UnconditionalScorerStage<Ctx> {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn apply<'a>(&'a self, context: &'a Ctx, input: CandidateStream<'a>) -> CandidateStream<'a> {
        Box::new(input.map(move |item| {
            let mut candidate = item.map_err(|e| tag(&self.identity, e))?;
            let value = (self.score)(context, &candidate).map_err(|e| tag(&self.identity, e))?;
            candidate.push_trail(self.explanation.clone(), value);
            Ok(candidate)
        }))
    }
}

/// Appends one of two `(explanation, score)` pairs depending on a
/// predicate — the branching generalization of [`UnconditionalScorerStage`].
pub struct BooleanScorerStage<Ctx> {
    identity: String,
    predicate: Box<dyn Fn(&Ctx, &Candidate) -> Result<bool, SolverError>>,
    on_true: (Explanation, f64),
    on_false: (Explanation, f64),
}

impl<Ctx> BooleanScorerStage<Ctx> {
    pub fn new<F>(
        identity: impl Into<String>,
        predicate: F,
        on_true: (impl Into<Explanation>, f64),
        on_false: (impl Into<Explanation>, f64),
    ) -> Self
    where
        F: Fn(&Ctx, &Candidate) -> Result<bool, SolverError> + 'static,
    {
        Self {
            identity: identity.into(),
            predicate: Box::new(predicate),
            on_true: (on_true.0.into(), on_true.1),
            on_false: (on_false.0.into(), on_false.1),
        }
    }
}

impl<Ctx> Stage<Ctx> for BooleanScorerStage<Ctx> {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn apply<'a>(&'a self, context: &'a Ctx, input: CandidateStream<'a>) -> CandidateStream<'a> {
        Box::new(input.map(move |item| {
            let mut candidate = item.map_err(|e| tag(&self.identity, e))?;
            let matched = (self.predicate)(context, &candidate).map_err(|e| tag(&self.identity, e))?;
            let (explanation, score) = if matched { &self.on_true } else { &self.on_false };
            candidate.push_trail(explanation.clone(), *score);
            Ok(candidate)
        }))
    }
}

/// The only stage that materializes: collects the whole stream, then sorts
/// descending by total score. [`Vec::sort_by`] is stable, so ties keep
/// whatever order they arrived in.
pub struct RankerStage {
    identity: String,
}

impl RankerStage {
    pub fn new(identity: impl Into<String>) -> Self {
        Self { identity: identity.into() }
    }
}

impl<Ctx> Stage<Ctx> for RankerStage {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn apply<'a>(&'a self, _context: &'a Ctx, input: CandidateStream<'a>) -> CandidateStream<'a> {
        let mut collected = Vec::new();
        for item in input {
            match item {
                Ok(c) => collected.push(c),
                Err(e) => return Box::new(std::iter::once(Err(e))),
            }
        }
        collected.sort_by(|a, b| {
            b.total_score()
                .partial_cmp(&a.total_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Box::new(collected.into_iter().map(Ok))
    }
}
