//! Dotted-path attribute resolution against a [`DomainObject`].
//!
//! `"availability.morning"` walks one level into a nested
//! [`AttributeValue::Object`] before resolving a [`AttributeValue::Number`]
//! leaf. Anything else (a missing segment, a `Text` leaf, a path that still
//! points at an `Object`) is a [`SolverError::MissingAttribute`] — the
//! constraint layer treats "present but not numeric" the same as "absent",
//! since neither can contribute to a linear sum.

use crate::domain::{AttributeValue, DomainObject};
use crate::error::SolverError;

/// Resolves `dotted_name` against `object`'s attributes and returns the
/// numeric leaf value, or `None` if the path doesn't resolve to a number.
pub fn resolve_numeric(object: &DomainObject, dotted_name: &str) -> Option<f64> {
    let mut segments = dotted_name.split('.');
    let first = segments.next()?;
    let mut current = object.attributes.get(first)?;
    for segment in segments {
        match current {
            AttributeValue::Object(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    match current {
        AttributeValue::Number(n) => Some(*n),
        _ => None,
    }
}

/// Same as [`resolve_numeric`] but converts a miss into the crate's
/// standard missing-attribute error, tagged with the offending item.
pub fn numeric_attribute(object: &DomainObject, dotted_name: &str) -> Result<f64, SolverError> {
    resolve_numeric(object, dotted_name).ok_or_else(|| SolverError::MissingAttribute {
        item_uri: object.uri.clone(),
        attribute: dotted_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn nested_object() -> DomainObject {
        let mut inner = HashMap::new();
        inner.insert("morning".to_string(), AttributeValue::Number(1.0));
        let mut attrs = HashMap::new();
        attrs.insert("availability".to_string(), AttributeValue::Object(inner));
        attrs.insert("score".to_string(), AttributeValue::Number(4.0));
        attrs.insert("name".to_string(), AttributeValue::Text("a".to_string()));
        DomainObject {
            uri: "item:1".to_string(),
            attributes: attrs,
        }
    }

    #[test]
    fn resolves_top_level_number() {
        assert_eq!(resolve_numeric(&nested_object(), "score"), Some(4.0));
    }

    #[test]
    fn resolves_nested_number() {
        assert_eq!(
            resolve_numeric(&nested_object(), "availability.morning"),
            Some(1.0)
        );
    }

    #[test]
    fn missing_path_is_none() {
        assert_eq!(resolve_numeric(&nested_object(), "availability.evening"), None);
        assert_eq!(resolve_numeric(&nested_object(), "nope"), None);
    }

    #[test]
    fn text_leaf_is_not_numeric() {
        assert_eq!(resolve_numeric(&nested_object(), "name"), None);
    }

    #[test]
    fn numeric_attribute_errors_carry_item_and_path() {
        let err = numeric_attribute(&nested_object(), "nope").unwrap_err();
        match err {
            SolverError::MissingAttribute { item_uri, attribute } => {
                assert_eq!(item_uri, "item:1");
                assert_eq!(attribute, "nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
