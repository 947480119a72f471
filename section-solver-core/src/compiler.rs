//! Lowers a [`SectionSetConstraint`] plus a ranked candidate list into a
//! [`ModelBuilder`] model: variable creation, constraint posting, and the
//! maximize objective. Nothing here solves anything — that's
//! [`ModelBuilder::solve`]; this module only builds the request.

use std::collections::{BTreeSet, HashMap};

use crate::attributes::numeric_attribute;
use crate::constraints::{
    AttributeConstraint, ConstraintType, SectionConstraintHierarchy, SectionSetConstraint,
};
use crate::domain::Candidate;
use crate::error::SolverError;
use crate::model::{Comparator, LinearExpr, ModelBuilder, VarId};

/// The variables the compiler created, handed to the extractor once a
/// solution exists. Scoped to one `compile` call; nothing here outlives
/// the solve that follows it.
pub struct CompiledModel {
    pub item_selection: Vec<VarId>,
    pub assignment: HashMap<(usize, usize), VarId>,
    pub attributes_of_interest: BTreeSet<String>,
}

/// Compiles `constraint` over `items` into `builder`, posting a maximize
/// objective over the items' pipeline scores. `items` must already be the
/// ranked output of a candidate pipeline run.
pub fn compile(
    constraint: &SectionSetConstraint,
    items: &[Candidate],
    builder: &mut dyn ModelBuilder,
) -> Result<CompiledModel, SolverError> {
    if constraint.config.scaling <= 0 {
        return Err(SolverError::InvalidConfiguration(
            "scaling must be a positive integer".to_string(),
        ));
    }
    let scaling = constraint.config.scaling;
    let section_count = constraint.sections.len();
    let item_count = items.len();

    let mut item_uri_to_index: HashMap<String, usize> = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        item_uri_to_index.insert(item.domain_object.uri.clone(), i);
    }
    validate_item_references(constraint, &item_uri_to_index)?;

    let item_selection: Vec<VarId> = (0..item_count)
        .map(|i| builder.new_bool_var(&format!("sel[{i}]")))
        .collect();

    let mut assignment: HashMap<(usize, usize), VarId> = HashMap::with_capacity(item_count * section_count);

    for (i, item) in items.iter().enumerate() {
        let mut row_vars = Vec::with_capacity(section_count);
        for s in 0..section_count {
            let var = builder.new_bool_var(&format!("a[{i},{s}]"));
            assignment.insert((i, s), var);
            row_vars.push(var);

            // Assignment implies selection.
            builder.add_linear(LinearExpr::var(var), Comparator::Le, LinearExpr::var(item_selection[i]), &[]);

            // Filter gating: the filter is evaluated once here and baked in
            // as a constant 0/1 upper bound, never re-evaluated at solve
            // time.
            if !constraint.is_allowed(s, &item.domain_object) {
                builder.add_linear(LinearExpr::var(var), Comparator::Le, LinearExpr::constant(0), &[]);
            }
        }

        if let Some(section_uri) = constraint.required_item_assignments.get(&item.domain_object.uri) {
            let s = *constraint
                .uri_to_index
                .get(section_uri)
                .ok_or_else(|| SolverError::UnknownReference { uri: section_uri.clone() })?;
            builder.fix(assignment[&(i, s)], 1);
        }

        // Coverage: an item is selected exactly when it is assigned
        // somewhere.
        builder.add_max_equality(item_selection[i], &row_vars);
    }

    let mut enforcement: HashMap<usize, Vec<VarId>> = HashMap::new();
    for hierarchy in &constraint.hierarchies {
        add_recursive_enforcement(constraint, builder, hierarchy, Vec::new(), &mut enforcement)?;
    }

    let mut attributes_of_interest = BTreeSet::new();

    for s in 0..section_count {
        let enforced_by = enforcement.get(&s).cloned().unwrap_or_default();

        if let Some(counts) = constraint.assignment_count_constraints.get(&s) {
            for ac in resolve_effective(s, counts) {
                let mut expr = LinearExpr::default();
                for (i, item) in items.iter().enumerate() {
                    if constraint.is_allowed(s, &item.domain_object) {
                        expr.add_term(1, assignment[&(i, s)]);
                    }
                }
                post(builder, expr, ac.constraint_type, LinearExpr::constant(ac.constraint_value), &enforced_by)?;
            }
        }

        if let Some(targeted) = constraint.targeted_section_constraints.get(&s) {
            for ac in targeted {
                attributes_of_interest.insert(ac.attribute_name.clone());
                let mut expr = LinearExpr::default();
                for (i, item) in items.iter().enumerate() {
                    if !constraint.is_allowed(s, &item.domain_object) {
                        continue;
                    }
                    let raw = numeric_attribute(&item.domain_object, &ac.attribute_name)?;
                    let coeff = (raw * scaling as f64).round() as i64;
                    expr.add_term(coeff, assignment[&(i, s)]);
                }
                let rhs = (ac.constraint_value as f64 * scaling as f64).round() as i64;
                post(builder, expr, ac.constraint_type, LinearExpr::constant(rhs), &enforced_by)?;
            }
        }
    }

    for sac in &constraint.section_assignment_constraints {
        let idx_a = constraint.uri_to_index[&sac.section_a];
        let idx_b = constraint.uri_to_index[&sac.section_b];
        for i in 0..item_count {
            if sac.constraint_type == ConstraintType::Am1 {
                let allowed = constraint.is_allowed(idx_a, &items[i].domain_object)
                    && constraint.is_allowed(idx_b, &items[i].domain_object);
                if !allowed {
                    continue;
                }
                let sum = LinearExpr::var(assignment[&(i, idx_a)]) + LinearExpr::var(assignment[&(i, idx_b)]);
                builder.add_linear(sum, Comparator::Le, LinearExpr::constant(1), &[]);
            } else {
                let cmp = comparator_for(sac.constraint_type)?;
                builder.add_linear(
                    LinearExpr::var(assignment[&(i, idx_a)]),
                    cmp,
                    LinearExpr::var(assignment[&(i, idx_b)]),
                    &[],
                );
            }
        }
    }

    for ioc in &constraint.item_ordering_constraints {
        let idx_a = item_uri_to_index[&ioc.independent_uri];
        let idx_b = item_uri_to_index[&ioc.dependent_uri];

        // Items not selected at all are pushed far past any real position
        // by the (S+2) padding, so an unselected item never blocks the
        // other's freedom to sit anywhere.
        let padding = (section_count as i64) + 2;
        let pos_a = position_expr(&assignment, idx_a, section_count) + LinearExpr::term(padding, item_selection[idx_b]);
        let pos_b = position_expr(&assignment, idx_b, section_count) + LinearExpr::term(padding, item_selection[idx_a]);

        if ioc.constraint_type.is_strict() {
            let channel = builder.new_bool_var("");
            let cmp = comparator_for(ioc.constraint_type)?;
            builder.add_linear(pos_a, cmp, pos_b, std::slice::from_ref(&channel));
            // channel true implies the dependent item is selected; channel
            // false implies it is not. This is what keeps the strict
            // ordering from being trivially satisfiable by leaving the
            // dependent item out of every section.
            builder.add_linear(
                LinearExpr::var(item_selection[idx_b]),
                Comparator::Eq,
                LinearExpr::constant(1),
                std::slice::from_ref(&channel),
            );
            let not_channel = builder.not_var(channel);
            builder.add_linear(
                LinearExpr::var(item_selection[idx_b]),
                Comparator::Eq,
                LinearExpr::constant(0),
                std::slice::from_ref(&not_channel),
            );
        } else {
            let cmp = comparator_for(ioc.constraint_type)?;
            builder.add_linear(pos_a, cmp, pos_b, &[]);
        }
    }

    builder.maximize(objective_expr(items, &item_selection, scaling));

    Ok(CompiledModel {
        item_selection,
        assignment,
        attributes_of_interest,
    })
}

fn validate_item_references(
    constraint: &SectionSetConstraint,
    item_uri_to_index: &HashMap<String, usize>,
) -> Result<(), SolverError> {
    for ioc in &constraint.item_ordering_constraints {
        if !item_uri_to_index.contains_key(&ioc.independent_uri) {
            return Err(SolverError::UnknownReference { uri: ioc.independent_uri.clone() });
        }
        if !item_uri_to_index.contains_key(&ioc.dependent_uri) {
            return Err(SolverError::UnknownReference { uri: ioc.dependent_uri.clone() });
        }
    }
    for item_uri in constraint.required_item_assignments.keys() {
        if !item_uri_to_index.contains_key(item_uri) {
            return Err(SolverError::UnknownReference { uri: item_uri.clone() });
        }
    }
    Ok(())
}

/// Resolves the "exact count silently wins over min/max" rule for count
/// constraints only: within a group of `assignment_count_constraints`
/// sharing an attribute name, an `Eq` threshold makes any `Leq`/`Geq`
/// threshold on the same attribute redundant. Those are dropped with a
/// warning rather than posted as no-op constraints. Plain attribute-sum
/// constraints (`targeted_section_constraints`) are posted unconditionally
/// and never pass through here.
fn resolve_effective<'a>(section_idx: usize, constraints: &'a [AttributeConstraint]) -> Vec<&'a AttributeConstraint> {
    let mut by_attribute: HashMap<&str, Vec<&AttributeConstraint>> = HashMap::new();
    for ac in constraints {
        by_attribute.entry(ac.attribute_name.as_str()).or_default().push(ac);
    }

    let mut effective = Vec::new();
    for (attribute_name, group) in by_attribute {
        let has_exact = group.iter().any(|ac| ac.constraint_type == ConstraintType::Eq);
        if has_exact {
            for ac in &group {
                if ac.constraint_type != ConstraintType::Eq {
                    log::warn!(
                        "section {section_idx}: exact_count on '{attribute_name}' overrides a min/max constraint of the same attribute; the min/max is dropped"
                    );
                } else {
                    effective.push(*ac);
                }
            }
        } else {
            effective.extend(group);
        }
    }
    effective
}

fn comparator_for(constraint_type: ConstraintType) -> Result<Comparator, SolverError> {
    match constraint_type {
        ConstraintType::Eq => Ok(Comparator::Eq),
        ConstraintType::Leq => Ok(Comparator::Le),
        ConstraintType::Geq => Ok(Comparator::Ge),
        ConstraintType::Less => Ok(Comparator::Lt),
        ConstraintType::Grtr => Ok(Comparator::Gt),
        ConstraintType::Am1 => Err(SolverError::InvalidConfiguration(
            "Am1 has no direct comparator; it compiles to a dedicated sum constraint".to_string(),
        )),
    }
}

fn post(
    builder: &mut dyn ModelBuilder,
    lhs: LinearExpr,
    constraint_type: ConstraintType,
    rhs: LinearExpr,
    enforced_by: &[VarId],
) -> Result<(), SolverError> {
    let cmp = comparator_for(constraint_type)?;
    log::debug!("posting constraint under {} enforcement bool(s)", enforced_by.len());
    builder.add_linear(lhs, cmp, rhs, enforced_by);
    Ok(())
}

/// `sum_s a[item, s] * (s + 1)` — the item's 1-based position in the
/// section sequence, zero if unassigned.
fn position_expr(assignment: &HashMap<(usize, usize), VarId>, item_idx: usize, section_count: usize) -> LinearExpr {
    let mut expr = LinearExpr::default();
    for s in 0..section_count {
        expr.add_term((s + 1) as i64, assignment[&(item_idx, s)]);
    }
    expr
}

fn objective_expr(items: &[Candidate], item_selection: &[VarId], scaling: i64) -> LinearExpr {
    let mut expr = LinearExpr::default();
    for (i, item) in items.iter().enumerate() {
        let coeff = (item.total_score() * scaling as f64).round() as i64;
        expr.add_term(coeff, item_selection[i]);
    }
    expr
}

/// Walks a hierarchy node, recording its section's enforcement booleans
/// (additive across multiple hierarchies touching the same section) and
/// creating fresh booleans for every AND/OR child per
/// `_add_recursive_enforcement_booleans`'s original shape: an AND group
/// requires every child boolean to hold, an OR group requires at least
/// one, and both are themselves only enforced under the parent's
/// accumulated boolean chain.
fn add_recursive_enforcement(
    constraint: &SectionSetConstraint,
    builder: &mut dyn ModelBuilder,
    node: &SectionConstraintHierarchy,
    parent_bools: Vec<VarId>,
    enforcement: &mut HashMap<usize, Vec<VarId>>,
) -> Result<(), SolverError> {
    let idx = *constraint
        .uri_to_index
        .get(&node.root_uri)
        .ok_or_else(|| SolverError::UnknownReference { uri: node.root_uri.clone() })?;
    enforcement.entry(idx).or_default().extend(parent_bools.iter().copied());
    log::debug!("section {idx} reachable under {} enforcement bool(s)", parent_bools.len());

    if !node.dependency_and.is_empty() {
        let mut and_bools = Vec::with_capacity(node.dependency_and.len());
        for child in &node.dependency_and {
            let b = builder.new_bool_var("");
            and_bools.push(b);
            let mut next = parent_bools.clone();
            next.push(b);
            add_recursive_enforcement(constraint, builder, child, next, enforcement)?;
        }
        let mut sum = LinearExpr::default();
        for &b in &and_bools {
            sum.add_term(1, b);
        }
        builder.add_linear(sum, Comparator::Ge, LinearExpr::constant(and_bools.len() as i64), &parent_bools);
    }

    if !node.dependency_or.is_empty() {
        let mut or_bools = Vec::with_capacity(node.dependency_or.len());
        for child in &node.dependency_or {
            let b = builder.new_bool_var("");
            or_bools.push(b);
            let mut next = parent_bools.clone();
            next.push(b);
            add_recursive_enforcement(constraint, builder, child, next, enforcement)?;
        }
        let mut sum = LinearExpr::default();
        for &b in &or_bools {
            sum.add_term(1, b);
        }
        builder.add_linear(sum, Comparator::Ge, LinearExpr::constant(1), &parent_bools);
    }

    Ok(())
}
