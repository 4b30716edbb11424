//! Per-node metadata.
//!
//! Every key is optional: an absent key is distinct from any value it could
//! hold, which is what lets [`Meta::merge`] tell "not mentioned" apart from
//! "explicitly set to false".

use crate::tree::Node;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A type label attached to a node (e.g. `int`, `float`, `vec4`).
///
/// The set of labels is defined by the backend; the core only compares them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Type of integer literals.
    pub fn int() -> Self {
        Self::new("int")
    }

    /// Type of float literals.
    pub fn float() -> Self {
        Self::new("float")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Metadata attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Meta {
    /// Inferred or declared type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<TypeTag>,
    /// Whether this symbol occurrence is a binding site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<bool>,
    /// The variable this expression defines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defines: Option<String>,
    /// Set on the earliest occurrence of each assigned variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_appearance: Option<bool>,
    /// Node whose type stands in for this node's type.
    #[cfg_attr(
        feature = "sexpr",
        serde(
            skip_serializing_if = "Option::is_none",
            with = "crate::sexpr::numeric_value"
        )
    )]
    #[cfg_attr(not(feature = "sexpr"), serde(skip))]
    pub numeric_value: Option<Box<Node>>,
}

impl Meta {
    pub fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.assignment.is_none()
            && self.defines.is_none()
            && self.first_appearance.is_none()
            && self.numeric_value.is_none()
    }

    /// Union of `old` and `new`; keys present in `new` win.
    pub fn merge(old: Meta, new: Meta) -> Meta {
        Meta {
            tag: new.tag.or(old.tag),
            assignment: new.assignment.or(old.assignment),
            defines: new.defines.or(old.defines),
            first_appearance: new.first_appearance.or(old.first_appearance),
            numeric_value: new.numeric_value.or(old.numeric_value),
        }
    }

    pub fn tagged(tag: TypeTag) -> Self {
        Self {
            tag: Some(tag),
            ..Self::default()
        }
    }

    pub fn assignment() -> Self {
        Self {
            assignment: Some(true),
            ..Self::default()
        }
    }

    pub fn defining(variable: impl Into<String>) -> Self {
        Self {
            defines: Some(variable.into()),
            ..Self::default()
        }
    }

    pub fn is_assignment(&self) -> bool {
        self.assignment == Some(true)
    }

    pub fn is_first_appearance(&self) -> bool {
        self.first_appearance == Some(true)
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(tag) = &self.tag {
            parts.push(format!("tag={tag}"));
        }
        if let Some(assignment) = self.assignment {
            parts.push(format!("assignment={assignment}"));
        }
        if let Some(defines) = &self.defines {
            parts.push(format!("defines={defines}"));
        }
        if let Some(first) = self.first_appearance {
            parts.push(format!("first-appearance={first}"));
        }
        if let Some(value) = &self.numeric_value {
            parts.push(format!("numeric-value={value}"));
        }
        write!(f, "{{{}}}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_new_keys() {
        let old = Meta {
            tag: Some(TypeTag::int()),
            assignment: Some(true),
            ..Meta::default()
        };
        let new = Meta {
            tag: Some(TypeTag::float()),
            defines: Some("x".into()),
            ..Meta::default()
        };

        let merged = Meta::merge(old, new);
        assert_eq!(merged.tag, Some(TypeTag::float()));
        assert_eq!(merged.assignment, Some(true));
        assert_eq!(merged.defines.as_deref(), Some("x"));
    }

    #[test]
    fn test_explicit_false_overrides() {
        let old = Meta::assignment();
        let new = Meta {
            assignment: Some(false),
            ..Meta::default()
        };

        assert_eq!(Meta::merge(old, new).assignment, Some(false));
    }

    #[test]
    fn test_display_lists_present_keys() {
        let meta = Meta {
            tag: Some(TypeTag::int()),
            defines: Some("x".into()),
            ..Meta::default()
        };
        assert_eq!(meta.to_string(), "{tag=int, defines=x}");
        assert_eq!(Meta::default().to_string(), "{}");
        assert!(Meta::default().is_empty());
    }
}
