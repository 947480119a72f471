//! JSON Schema export and wire-format conversion for section-set problem
//! files.
//!
//! `section-solver-core`'s builder types carry `Arc<dyn Fn>` filter
//! predicates and so can't derive `JsonSchema` themselves (filters are a
//! code-level extension point, not something a JSON/YAML file expresses).
//! This crate defines a schema-friendly [`ProblemFile`] DTO that mirrors
//! everything a file *can* express, plus [`ProblemFile::into_parts`] to
//! turn one into a real [`SectionSetConstraint`] and candidate list.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use section_solver_core::config::SectionSetSolverConfig;
use section_solver_core::constraints::{
    AttributeConstraint, ConstraintType, ItemOrderingConstraint, SectionAssignmentConstraint,
    SectionConstraintHierarchy, SectionSetConstraint,
};
use section_solver_core::domain::{AttributeValue, Candidate, DomainObject};
use section_solver_core::error::SolverError;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AttributeValueSpec {
    Number(f64),
    Text(String),
    Object(HashMap<String, AttributeValueSpec>),
}

fn to_attribute_value(spec: AttributeValueSpec) -> AttributeValue {
    match spec {
        AttributeValueSpec::Number(n) => AttributeValue::Number(n),
        AttributeValueSpec::Text(t) => AttributeValue::Text(t),
        AttributeValueSpec::Object(map) => {
            AttributeValue::Object(map.into_iter().map(|(k, v)| (k, to_attribute_value(v))).collect())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DomainObjectSpec {
    pub uri: String,
    #[serde(default)]
    pub attributes: HashMap<String, AttributeValueSpec>,
}

fn to_domain_object(spec: DomainObjectSpec) -> DomainObject {
    DomainObject {
        uri: spec.uri,
        attributes: spec.attributes.into_iter().map(|(k, v)| (k, to_attribute_value(v))).collect(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ItemSpec {
    pub uri: String,
    #[serde(default)]
    pub attributes: HashMap<String, AttributeValueSpec>,
    /// Seeds the item's candidate score, as if a pipeline's unconditional
    /// scorer had already run.
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintTypeSpec {
    Eq,
    Leq,
    Geq,
    Less,
    Grtr,
    Am1,
}

impl From<ConstraintTypeSpec> for ConstraintType {
    fn from(spec: ConstraintTypeSpec) -> Self {
        match spec {
            ConstraintTypeSpec::Eq => ConstraintType::Eq,
            ConstraintTypeSpec::Leq => ConstraintType::Leq,
            ConstraintTypeSpec::Geq => ConstraintType::Geq,
            ConstraintTypeSpec::Less => ConstraintType::Less,
            ConstraintTypeSpec::Grtr => ConstraintType::Grtr,
            ConstraintTypeSpec::Am1 => ConstraintType::Am1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AttributeConstraintSpec {
    pub attribute_name: String,
    pub constraint_type: ConstraintTypeSpec,
    pub constraint_value: i64,
}

impl From<AttributeConstraintSpec> for AttributeConstraint {
    fn from(spec: AttributeConstraintSpec) -> Self {
        AttributeConstraint::new(spec.attribute_name, spec.constraint_type.into(), spec.constraint_value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CountConstraintSpec {
    pub constraint_type: ConstraintTypeSpec,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HierarchySpec {
    pub root_uri: String,
    #[serde(default)]
    pub dependency_and: Vec<HierarchySpec>,
    #[serde(default)]
    pub dependency_or: Vec<HierarchySpec>,
}

impl From<HierarchySpec> for SectionConstraintHierarchy {
    fn from(spec: HierarchySpec) -> Self {
        SectionConstraintHierarchy {
            root_uri: spec.root_uri,
            dependency_and: spec.dependency_and.into_iter().map(Into::into).collect(),
            dependency_or: spec.dependency_or.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SectionAssignmentSpec {
    pub constraint_type: ConstraintTypeSpec,
    pub section_a: String,
    pub section_b: String,
}

impl From<SectionAssignmentSpec> for SectionAssignmentConstraint {
    fn from(spec: SectionAssignmentSpec) -> Self {
        SectionAssignmentConstraint {
            constraint_type: spec.constraint_type.into(),
            section_a: spec.section_a,
            section_b: spec.section_b,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ItemOrderingSpec {
    pub constraint_type: ConstraintTypeSpec,
    pub independent_uri: String,
    pub dependent_uri: String,
}

impl From<ItemOrderingSpec> for ItemOrderingConstraint {
    fn from(spec: ItemOrderingSpec) -> Self {
        ItemOrderingConstraint {
            constraint_type: spec.constraint_type.into(),
            independent_uri: spec.independent_uri,
            dependent_uri: spec.dependent_uri,
        }
    }
}

fn default_scaling() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SolverConfigSpec {
    #[serde(default = "default_scaling")]
    pub scaling: i64,
    #[serde(default)]
    pub solver_time_budget_ms: Option<u64>,
    #[serde(default)]
    pub allow_infeasible_report: bool,
}

impl Default for SolverConfigSpec {
    fn default() -> Self {
        Self {
            scaling: default_scaling(),
            solver_time_budget_ms: None,
            allow_infeasible_report: false,
        }
    }
}

impl From<SolverConfigSpec> for SectionSetSolverConfig {
    fn from(spec: SolverConfigSpec) -> Self {
        SectionSetSolverConfig {
            scaling: spec.scaling,
            solver_time_budget_ms: spec.solver_time_budget_ms,
            allow_infeasible_report: spec.allow_infeasible_report,
        }
    }
}

/// The key used in `attribute_constraints`/`count_constraints` to mean
/// "every section currently registered" instead of one specific section,
/// mirroring the original builder's omitted-`target_uri` fan-out.
pub const ALL_SECTIONS_KEY: &str = "*";

fn target_uri(section_uri: &str) -> Option<&str> {
    if section_uri == ALL_SECTIONS_KEY {
        None
    } else {
        Some(section_uri)
    }
}

/// The on-disk shape of a problem file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProblemFile {
    pub sections: Vec<DomainObjectSpec>,
    pub items: Vec<ItemSpec>,
    /// Keyed by section URI, or [`ALL_SECTIONS_KEY`] to fan a constraint
    /// out over every registered section.
    #[serde(default)]
    pub attribute_constraints: HashMap<String, Vec<AttributeConstraintSpec>>,
    /// Keyed by section URI, or [`ALL_SECTIONS_KEY`] to fan a constraint
    /// out over every registered section.
    #[serde(default)]
    pub count_constraints: HashMap<String, Vec<CountConstraintSpec>>,
    #[serde(default)]
    pub hierarchies: Vec<HierarchySpec>,
    #[serde(default)]
    pub section_assignment_constraints: Vec<SectionAssignmentSpec>,
    #[serde(default)]
    pub item_ordering_constraints: Vec<ItemOrderingSpec>,
    #[serde(default)]
    pub required_item_assignments: HashMap<String, String>,
    #[serde(default)]
    pub config: SolverConfigSpec,
}

impl ProblemFile {
    /// Builds a [`SectionSetConstraint`] and the candidate list to solve
    /// it over. Fails the same way the builder does: an unknown section
    /// or item URI is a [`SolverError::UnknownReference`].
    pub fn into_parts(self) -> Result<(SectionSetConstraint, Vec<Candidate>), SolverError> {
        let sections: Vec<DomainObject> = self.sections.into_iter().map(to_domain_object).collect();
        let mut builder = SectionSetConstraint::new().set_sections(sections)?.with_config(self.config.into());

        for (section_uri, constraints) in self.attribute_constraints {
            for constraint in constraints {
                builder = builder.add_section_constraint(target_uri(&section_uri), constraint.into())?;
            }
        }
        for (section_uri, constraints) in self.count_constraints {
            for constraint in constraints {
                builder = builder.add_section_count_constraint(
                    target_uri(&section_uri),
                    constraint.constraint_type.into(),
                    constraint.count,
                )?;
            }
        }
        for hierarchy in self.hierarchies {
            builder = builder.add_section_hierarchy(hierarchy.into())?;
        }
        for sac in self.section_assignment_constraints {
            builder = builder.add_section_assignment_constraint(sac.into())?;
        }
        for ioc in self.item_ordering_constraints {
            builder = builder.add_item_ordering_constraint(ioc.into());
        }
        for (item_uri, section_uri) in self.required_item_assignments {
            builder = builder.add_required_item_assignment(item_uri, &section_uri)?;
        }

        let items = self
            .items
            .into_iter()
            .map(|item| {
                let mut candidate = Candidate::new(to_domain_object(DomainObjectSpec {
                    uri: item.uri,
                    attributes: item.attributes,
                }));
                candidate.applied_explanations.push("from problem file".to_string());
                candidate.applied_scores.push(item.score);
                candidate
            })
            .collect();

        Ok((builder, items))
    }
}

/// The JSON Schema for [`ProblemFile`], as a `serde_json::Value`.
pub fn problem_file_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(ProblemFile)).expect("schemars output always serializes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProblemFile {
        ProblemFile {
            sections: vec![DomainObjectSpec { uri: "section:a".into(), attributes: HashMap::new() }],
            items: vec![ItemSpec { uri: "item:1".into(), attributes: HashMap::new(), score: 1.0 }],
            attribute_constraints: HashMap::new(),
            count_constraints: HashMap::from([(
                "section:a".to_string(),
                vec![CountConstraintSpec { constraint_type: ConstraintTypeSpec::Leq, count: 1 }],
            )]),
            hierarchies: vec![],
            section_assignment_constraints: vec![],
            item_ordering_constraints: vec![],
            required_item_assignments: HashMap::new(),
            config: SolverConfigSpec::default(),
        }
    }

    #[test]
    fn sample_problem_validates_against_its_own_schema() {
        let schema = problem_file_schema();
        let value = serde_json::to_value(sample()).unwrap();
        let compiled = jsonschema::validator_for(&schema).expect("schema compiles");
        assert!(compiled.is_valid(&value), "sample problem file should satisfy its own schema");
    }

    #[test]
    fn into_parts_builds_a_solvable_constraint() {
        let (constraint, items) = sample().into_parts().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].domain_object.uri, "item:1");
        assert_eq!(constraint.section_count(), 1);
    }

    #[test]
    fn all_sections_key_fans_a_count_constraint_out() {
        let mut problem = sample();
        problem.sections.push(DomainObjectSpec { uri: "section:b".into(), attributes: HashMap::new() });
        problem.count_constraints = HashMap::from([(
            ALL_SECTIONS_KEY.to_string(),
            vec![CountConstraintSpec { constraint_type: ConstraintTypeSpec::Leq, count: 3 }],
        )]);

        let (constraint, _items) = problem.into_parts().unwrap();
        assert_eq!(constraint.section_count(), 2);
    }

    #[test]
    fn unknown_section_reference_fails_conversion() {
        let mut problem = sample();
        problem.count_constraints = HashMap::from([(
            "section:missing".to_string(),
            vec![CountConstraintSpec { constraint_type: ConstraintTypeSpec::Leq, count: 1 }],
        )]);
        let err = problem.into_parts().unwrap_err();
        assert!(matches!(err, SolverError::UnknownReference { .. }));
    }
}
