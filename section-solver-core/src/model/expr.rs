//! Linear expressions over model variables.

use std::ops::Add;

use super::VarId;

/// The comparison relation a [`ModelBuilder::add_linear`] call posts.
///
/// [`ModelBuilder`]: super::ModelBuilder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Le,
    Ge,
    Lt,
    Gt,
}

impl Comparator {
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparator::Eq => lhs == rhs,
            Comparator::Le => lhs <= rhs,
            Comparator::Ge => lhs >= rhs,
            Comparator::Lt => lhs < rhs,
            Comparator::Gt => lhs > rhs,
        }
    }
}

/// A sum of `coefficient * variable` terms plus a constant.
#[derive(Debug, Clone, Default)]
pub struct LinearExpr {
    pub terms: Vec<(i64, VarId)>,
    pub constant: i64,
}

impl LinearExpr {
    pub fn constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn var(var: VarId) -> Self {
        Self {
            terms: vec![(1, var)],
            constant: 0,
        }
    }

    pub fn term(coefficient: i64, var: VarId) -> Self {
        Self {
            terms: vec![(coefficient, var)],
            constant: 0,
        }
    }

    pub fn add_term(&mut self, coefficient: i64, var: VarId) {
        self.terms.push((coefficient, var));
    }

    pub fn add_constant(&mut self, value: i64) {
        self.constant += value;
    }

    /// Evaluates the expression against a full variable assignment.
    /// Variables missing from `values` are treated as zero, which is only
    /// correct for callers that already know every term is assigned.
    pub fn evaluate(&self, values: &std::collections::HashMap<VarId, i64>) -> i64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(coeff, var)| coeff * values.get(var).copied().unwrap_or(0))
                .sum::<i64>()
    }
}

impl Add for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: LinearExpr) -> LinearExpr {
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}
