//! Constraint value types and the fluent section-set constraint builder.

mod builder;
mod types;

pub use builder::{AssignmentFilter, SectionSetConstraint};
pub use types::{
    AttributeConstraint, ConstraintType, ItemOrderingConstraint, SectionAssignmentConstraint,
    SectionConstraintHierarchy, ITEM_COUNT_ATTRIBUTE,
};
