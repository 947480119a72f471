//! Constraint value types shared by the builder and the compiler.

use serde::{Deserialize, Serialize};

use crate::domain::Uri;

/// The relation a constraint enforces between a measured quantity and a
/// threshold (or, for [`ConstraintType::Am1`], between two section
/// assignment indicators).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintType {
    /// Exactly equal.
    Eq,
    /// Less than or equal to.
    Leq,
    /// Greater than or equal to.
    Geq,
    /// Strictly less than (item ordering only).
    Less,
    /// Strictly greater than (item ordering only).
    Grtr,
    /// At most one of two sections may hold the item.
    Am1,
}

impl ConstraintType {
    /// `true` for the comparison relations usable in a plain linear
    /// constraint (everything but [`ConstraintType::Am1`], which compiles
    /// to its own dedicated sum-to-one-or-fewer shape).
    pub fn is_comparison(self) -> bool {
        !matches!(self, ConstraintType::Am1)
    }

    /// `true` for the two strict orderings, which need the selection-gated
    /// boolean channel rather than a bare linear constraint.
    pub fn is_strict(self) -> bool {
        matches!(self, ConstraintType::Less | ConstraintType::Grtr)
    }
}

/// A threshold on the sum of an attribute (or, when `attribute_name` is the
/// synthetic item-count attribute, on the number of items assigned) over a
/// section's assigned items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeConstraint {
    pub attribute_name: String,
    pub constraint_type: ConstraintType,
    pub constraint_value: i64,
}

impl AttributeConstraint {
    pub fn new(attribute_name: impl Into<String>, constraint_type: ConstraintType, constraint_value: i64) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            constraint_type,
            constraint_value,
        }
    }
}

/// The synthetic attribute name used for item-count (rather than
/// attribute-sum) constraints.
pub const ITEM_COUNT_ATTRIBUTE: &str = "__item_count";

/// A relation between two sections' assignment indicators for the same
/// item — "an item in A may not also be in B" ([`ConstraintType::Am1`]) or
/// a direct comparison of the two indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionAssignmentConstraint {
    pub constraint_type: ConstraintType,
    pub section_a: Uri,
    pub section_b: Uri,
}

/// A positional relation between two items, read as a sequence across
/// sections ("A must come strictly before B").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemOrderingConstraint {
    pub constraint_type: ConstraintType,
    pub independent_uri: Uri,
    pub dependent_uri: Uri,
}

/// A node in the AND/OR enforcement tree rooted at a section.
///
/// A bare leaf (`dependency_and` and `dependency_or` both empty) enforces
/// its section's constraints whenever every boolean accumulated on the
/// path from the tree's root holds. An `AND` group requires every child's
/// enforcement boolean to hold; an `OR` group requires at least one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionConstraintHierarchy {
    pub root_uri: Uri,
    #[serde(default)]
    pub dependency_and: Vec<SectionConstraintHierarchy>,
    #[serde(default)]
    pub dependency_or: Vec<SectionConstraintHierarchy>,
}

impl SectionConstraintHierarchy {
    pub fn leaf(root_uri: impl Into<Uri>) -> Self {
        Self {
            root_uri: root_uri.into(),
            dependency_and: Vec::new(),
            dependency_or: Vec::new(),
        }
    }

    pub fn with_and(mut self, child: SectionConstraintHierarchy) -> Self {
        self.dependency_and.push(child);
        self
    }

    pub fn with_or(mut self, child: SectionConstraintHierarchy) -> Self {
        self.dependency_or.push(child);
        self
    }
}
