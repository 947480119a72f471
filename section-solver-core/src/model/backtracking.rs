//! A dependency-free branch-and-bound [`ModelBuilder`] over bounded integer
//! variables.
//!
//! This is a reference/test backend, not a production solver: it exists so
//! the compiler and its test suite run without wiring an external CP-SAT
//! binding. It explores assignments in an order biased toward the
//! objective's largest coefficients, prunes branches whose optimistic
//! bound can't beat the best solution found so far, and checks each
//! constraint as soon as every variable it touches has a value rather than
//! waiting for a full leaf assignment.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::{Comparator, LinearExpr, ModelBuilder, SolveOutcome, Solution, VarId};

#[derive(Debug)]
struct VarInfo {
    lower: i64,
    upper: i64,
    #[allow(dead_code)]
    name: String,
}

struct PostedConstraint {
    lhs: LinearExpr,
    cmp: Comparator,
    rhs: LinearExpr,
    enforced_by: Vec<VarId>,
}

#[derive(Default)]
pub struct BacktrackingModel {
    vars: Vec<VarInfo>,
    fixed: HashMap<VarId, i64>,
    constraints: Vec<PostedConstraint>,
    objective: LinearExpr,
}

impl BacktrackingModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_var(&mut self, lower: i64, upper: i64, name: &str) -> VarId {
        let id = VarId(self.vars.len() as u32);
        self.vars.push(VarInfo {
            lower,
            upper,
            name: name.to_string(),
        });
        id
    }

    fn eval(expr: &LinearExpr, values: &[i64]) -> i64 {
        expr.constant
            + expr
                .terms
                .iter()
                .map(|(coeff, var)| coeff * values[var.0 as usize])
                .sum::<i64>()
    }

    fn referenced_vars(constraint: &PostedConstraint) -> impl Iterator<Item = usize> + '_ {
        constraint
            .lhs
            .terms
            .iter()
            .chain(constraint.rhs.terms.iter())
            .map(|(_, v)| v.0 as usize)
            .chain(constraint.enforced_by.iter().map(|v| v.0 as usize))
    }

    fn constraint_holds(constraint: &PostedConstraint, values: &[i64]) -> bool {
        if constraint.enforced_by.iter().any(|v| values[v.0 as usize] == 0) {
            return true;
        }
        let lhs = Self::eval(&constraint.lhs, values);
        let rhs = Self::eval(&constraint.rhs, values);
        constraint.cmp.holds(lhs, rhs)
    }

    #[allow(clippy::too_many_arguments)]
    fn dfs(
        &self,
        depth: usize,
        order: &[usize],
        lb: &[i64],
        ub: &[i64],
        assignment: &mut [Option<i64>],
        constraints_by_var: &[Vec<usize>],
        obj_coeff: &[i64],
        deadline: Option<Instant>,
        best: &mut Option<(i64, Vec<i64>)>,
        timed_out: &mut bool,
    ) {
        if *timed_out {
            return;
        }
        if let Some(dl) = deadline {
            if Instant::now() >= dl {
                *timed_out = true;
                return;
            }
        }

        if depth == order.len() {
            let values: Vec<i64> = assignment.iter().map(|v| v.expect("every variable assigned at a leaf")).collect();
            let objective = Self::eval(&self.objective, &values);
            if best.as_ref().map_or(true, |(b, _)| objective > *b) {
                *best = Some((objective, values));
            }
            return;
        }

        let mut bound = self.objective.constant;
        for (i, coeff) in obj_coeff.iter().enumerate() {
            if *coeff == 0 {
                continue;
            }
            bound += match assignment[i] {
                Some(v) => coeff * v,
                None if *coeff > 0 => coeff * ub[i],
                None => coeff * lb[i],
            };
        }
        if let Some((b, _)) = best {
            if bound <= *b {
                return;
            }
        }

        let var = order[depth];
        for value in (lb[var]..=ub[var]).rev() {
            assignment[var] = Some(value);
            let consistent = constraints_by_var[var].iter().all(|&ci| {
                let constraint = &self.constraints[ci];
                let fully_assigned = Self::referenced_vars(constraint).all(|v| assignment[v].is_some());
                if !fully_assigned {
                    return true;
                }
                let values: Vec<i64> = assignment.iter().map(|v| v.unwrap_or(0)).collect();
                Self::constraint_holds(constraint, &values)
            });

            if consistent {
                self.dfs(
                    depth + 1,
                    order,
                    lb,
                    ub,
                    assignment,
                    constraints_by_var,
                    obj_coeff,
                    deadline,
                    best,
                    timed_out,
                );
            }

            assignment[var] = None;
            if *timed_out {
                return;
            }
        }
    }
}

impl ModelBuilder for BacktrackingModel {
    fn new_bool_var(&mut self, name: &str) -> VarId {
        self.new_var(0, 1, name)
    }

    fn new_int_var(&mut self, lower: i64, upper: i64, name: &str) -> VarId {
        self.new_var(lower, upper, name)
    }

    fn fix(&mut self, var: VarId, value: i64) {
        self.fixed.insert(var, value);
    }

    fn add_linear(&mut self, lhs: LinearExpr, cmp: Comparator, rhs: LinearExpr, enforced_by: &[VarId]) {
        self.constraints.push(PostedConstraint {
            lhs,
            cmp,
            rhs,
            enforced_by: enforced_by.to_vec(),
        });
    }

    fn add_max_equality(&mut self, target: VarId, terms: &[VarId]) {
        for &term in terms {
            self.add_linear(LinearExpr::var(target), Comparator::Ge, LinearExpr::var(term), &[]);
        }
        let mut sum = LinearExpr::default();
        for &term in terms {
            sum.add_term(1, term);
        }
        self.add_linear(LinearExpr::var(target), Comparator::Le, sum, &[]);
    }

    fn maximize(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    fn solve(&mut self, time_budget_ms: Option<u64>) -> SolveOutcome {
        let n = self.vars.len();
        let mut lb = vec![0i64; n];
        let mut ub = vec![0i64; n];
        for i in 0..n {
            if let Some(&value) = self.fixed.get(&VarId(i as u32)) {
                lb[i] = value;
                ub[i] = value;
            } else {
                lb[i] = self.vars[i].lower;
                ub[i] = self.vars[i].upper;
            }
            if lb[i] > ub[i] {
                return SolveOutcome::Infeasible;
            }
        }

        let mut obj_coeff = vec![0i64; n];
        for (coeff, var) in &self.objective.terms {
            obj_coeff[var.0 as usize] += coeff;
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| obj_coeff[b].abs().cmp(&obj_coeff[a].abs()).then(a.cmp(&b)));

        let mut constraints_by_var: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (ci, constraint) in self.constraints.iter().enumerate() {
            let mut seen: Vec<usize> = Self::referenced_vars(constraint).collect();
            seen.sort_unstable();
            seen.dedup();
            for v in seen {
                constraints_by_var[v].push(ci);
            }
        }

        let deadline = time_budget_ms.map(|ms| Instant::now() + Duration::from_millis(ms));
        let mut assignment = vec![None; n];
        let mut best: Option<(i64, Vec<i64>)> = None;
        let mut timed_out = false;

        self.dfs(
            0,
            &order,
            &lb,
            &ub,
            &mut assignment,
            &constraints_by_var,
            &obj_coeff,
            deadline,
            &mut best,
            &mut timed_out,
        );

        match best {
            Some((_, values)) => {
                let solution = Solution::new(
                    values.into_iter().enumerate().map(|(i, v)| (VarId(i as u32), v)).collect(),
                );
                if timed_out {
                    SolveOutcome::Feasible(solution)
                } else {
                    SolveOutcome::Optimal(solution)
                }
            }
            None if timed_out => {
                SolveOutcome::Failure("time budget exhausted before a feasible solution was found".to_string())
            }
            None => SolveOutcome::Infeasible,
        }
    }
}
