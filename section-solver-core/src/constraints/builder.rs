//! The section-set constraint builder: a fluent API that accumulates a
//! constraint graph over a fixed set of sections, later handed to the
//! model compiler together with a ranked candidate list.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::SectionSetSolverConfig;
use crate::domain::{DomainObject, Uri};
use crate::error::SolverError;

use super::types::{
    AttributeConstraint, ConstraintType, ItemOrderingConstraint, SectionAssignmentConstraint,
    SectionConstraintHierarchy, ITEM_COUNT_ATTRIBUTE,
};

/// A filter predicate deciding whether an item may ever be assigned to a
/// section. Stored as `Arc` so the same predicate can be shared across
/// clones of the builder during test fixture construction.
pub type AssignmentFilter = Arc<dyn Fn(&DomainObject) -> bool + Send + Sync>;

/// Accumulates a section-set constraint graph.
///
/// [`SectionSetConstraint::set_sections`] must be called before any other
/// mutator: every later method resolves its section URI argument
/// immediately against the registered section list and fails fast with
/// [`SolverError::UnknownReference`] if it isn't there yet. Item URIs (used
/// by ordering constraints and required assignments) aren't known until
/// `compile` sees the candidate list, so those are validated at compile
/// time instead.
#[derive(Clone)]
pub struct SectionSetConstraint {
    pub(crate) sections: Vec<DomainObject>,
    pub(crate) uri_to_index: HashMap<Uri, usize>,
    pub(crate) targeted_section_constraints: HashMap<usize, Vec<AttributeConstraint>>,
    pub(crate) assignment_count_constraints: HashMap<usize, Vec<AttributeConstraint>>,
    pub(crate) hierarchies: Vec<SectionConstraintHierarchy>,
    pub(crate) section_assignment_filter: HashMap<usize, AssignmentFilter>,
    pub(crate) allow_invalid_assignment: HashSet<usize>,
    pub(crate) section_assignment_constraints: Vec<SectionAssignmentConstraint>,
    pub(crate) item_ordering_constraints: Vec<ItemOrderingConstraint>,
    pub(crate) required_item_assignments: HashMap<Uri, Uri>,
    pub(crate) config: SectionSetSolverConfig,
}

impl std::fmt::Debug for SectionSetConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionSetConstraint")
            .field("sections", &self.sections)
            .field("uri_to_index", &self.uri_to_index)
            .field("targeted_section_constraints", &self.targeted_section_constraints)
            .field("assignment_count_constraints", &self.assignment_count_constraints)
            .field("hierarchies", &self.hierarchies)
            .field(
                "section_assignment_filter",
                &self.section_assignment_filter.keys().collect::<Vec<_>>(),
            )
            .field("allow_invalid_assignment", &self.allow_invalid_assignment)
            .field("section_assignment_constraints", &self.section_assignment_constraints)
            .field("item_ordering_constraints", &self.item_ordering_constraints)
            .field("required_item_assignments", &self.required_item_assignments)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for SectionSetConstraint {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
            uri_to_index: HashMap::new(),
            targeted_section_constraints: HashMap::new(),
            assignment_count_constraints: HashMap::new(),
            hierarchies: Vec::new(),
            section_assignment_filter: HashMap::new(),
            allow_invalid_assignment: HashSet::new(),
            section_assignment_constraints: Vec::new(),
            item_ordering_constraints: Vec::new(),
            required_item_assignments: HashMap::new(),
            config: SectionSetSolverConfig::default(),
        }
    }
}

impl SectionSetConstraint {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of registered sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Registers the ordered list of sections. Must be called exactly once,
    /// before any other mutator.
    pub fn set_sections(mut self, sections: Vec<DomainObject>) -> Result<Self, SolverError> {
        if !self.uri_to_index.is_empty() {
            return Err(SolverError::InvalidConfiguration(
                "set_sections may only be called once".to_string(),
            ));
        }
        self.uri_to_index = sections
            .iter()
            .enumerate()
            .map(|(i, s)| (s.uri.clone(), i))
            .collect();
        if self.uri_to_index.len() != sections.len() {
            return Err(SolverError::InvalidConfiguration(
                "section URIs must be unique".to_string(),
            ));
        }
        self.sections = sections;
        Ok(self)
    }

    pub fn with_config(mut self, config: SectionSetSolverConfig) -> Self {
        self.config = config;
        self
    }

    fn section_index(&self, section_uri: &str) -> Result<usize, SolverError> {
        self.uri_to_index
            .get(section_uri)
            .copied()
            .ok_or_else(|| SolverError::UnknownReference {
                uri: section_uri.to_string(),
            })
    }

    fn require_sections_set(&self) -> Result<(), SolverError> {
        if self.sections.is_empty() {
            Err(SolverError::InvalidConfiguration(
                "set_sections must be called before adding constraints".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    /// Adds an attribute-sum threshold over a section's assigned items. A
    /// `None` target fans the constraint out over every section currently
    /// registered, matching the original's "no target means every section"
    /// behavior.
    pub fn add_section_constraint(
        mut self,
        target_uri: Option<&str>,
        constraint: AttributeConstraint,
    ) -> Result<Self, SolverError> {
        self.require_sections_set()?;
        match target_uri {
            Some(section_uri) => {
                let idx = self.section_index(section_uri)?;
                self.targeted_section_constraints.entry(idx).or_default().push(constraint);
            }
            None => {
                for idx in self.uri_to_index.values().copied().collect::<Vec<_>>() {
                    self.targeted_section_constraints.entry(idx).or_default().push(constraint.clone());
                }
            }
        }
        Ok(self)
    }

    /// Convenience wrapper over [`Self::add_section_constraint`] for a
    /// plain count threshold (using the synthetic item-count attribute). A
    /// `None` target fans out over every section currently registered.
    pub fn add_section_count_constraint(
        mut self,
        target_uri: Option<&str>,
        constraint_type: ConstraintType,
        count: i64,
    ) -> Result<Self, SolverError> {
        self.require_sections_set()?;
        match target_uri {
            Some(section_uri) => {
                let idx = self.section_index(section_uri)?;
                self.assignment_count_constraints.entry(idx).or_default().push(
                    AttributeConstraint::new(ITEM_COUNT_ATTRIBUTE, constraint_type, count),
                );
            }
            None => {
                for idx in self.uri_to_index.values().copied().collect::<Vec<_>>() {
                    self.assignment_count_constraints.entry(idx).or_default().push(
                        AttributeConstraint::new(ITEM_COUNT_ATTRIBUTE, constraint_type, count),
                    );
                }
            }
        }
        Ok(self)
    }

    /// Adds a hierarchy rooted somewhere in the section tree; its
    /// enforcement booleans are additive with any other hierarchy that
    /// reaches the same section.
    pub fn add_section_hierarchy(mut self, hierarchy: SectionConstraintHierarchy) -> Result<Self, SolverError> {
        self.require_sections_set()?;
        self.validate_hierarchy_uris(&hierarchy)?;
        self.hierarchies.push(hierarchy);
        Ok(self)
    }

    fn validate_hierarchy_uris(&self, node: &SectionConstraintHierarchy) -> Result<(), SolverError> {
        self.section_index(&node.root_uri)?;
        for child in node.dependency_and.iter().chain(node.dependency_or.iter()) {
            self.validate_hierarchy_uris(child)?;
        }
        Ok(())
    }

    /// Restricts which items may ever be assigned to `section_uri`.
    pub fn set_section_assignment_filter<F>(mut self, section_uri: &str, filter: F) -> Result<Self, SolverError>
    where
        F: Fn(&DomainObject) -> bool + Send + Sync + 'static,
    {
        self.require_sections_set()?;
        let idx = self.section_index(section_uri)?;
        self.section_assignment_filter.insert(idx, Arc::new(filter));
        Ok(self)
    }

    /// Disables filter gating for `section_uri` (every item is a legal
    /// assignment target there, regardless of any filter set above).
    pub fn allow_invalid_assignment_to_section(mut self, section_uri: &str) -> Result<Self, SolverError> {
        self.require_sections_set()?;
        let idx = self.section_index(section_uri)?;
        self.allow_invalid_assignment.insert(idx);
        Ok(self)
    }

    /// Adds a cross-section relation between two sections' assignment
    /// indicators for the same item (for [`ConstraintType::Am1`], "not
    /// both").
    pub fn add_section_assignment_constraint(
        mut self,
        constraint: SectionAssignmentConstraint,
    ) -> Result<Self, SolverError> {
        self.require_sections_set()?;
        self.section_index(&constraint.section_a)?;
        self.section_index(&constraint.section_b)?;
        self.section_assignment_constraints.push(constraint);
        Ok(self)
    }

    /// Adds a positional ordering constraint between two items. Item URIs
    /// aren't known until `compile` sees the candidate list, so this can't
    /// validate them yet.
    pub fn add_item_ordering_constraint(mut self, constraint: ItemOrderingConstraint) -> Self {
        self.item_ordering_constraints.push(constraint);
        self
    }

    /// Pins an item to a specific section, bypassing that section's
    /// filter.
    pub fn add_required_item_assignment(
        mut self,
        item_uri: impl Into<Uri>,
        section_uri: &str,
    ) -> Result<Self, SolverError> {
        self.require_sections_set()?;
        self.section_index(section_uri)?;
        self.required_item_assignments.insert(item_uri.into(), section_uri.to_string());
        Ok(self)
    }

    /// Whether items are gated by a filter for this section index, taking
    /// [`Self::allow_invalid_assignment_to_section`] into account. No
    /// filter registered means every item is allowed.
    pub(crate) fn is_allowed(&self, section_idx: usize, object: &DomainObject) -> bool {
        if self.allow_invalid_assignment.contains(&section_idx) {
            return true;
        }
        match self.section_assignment_filter.get(&section_idx) {
            Some(filter) => filter(object),
            None => true,
        }
    }
}
