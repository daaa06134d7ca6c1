//! Declared type references
//!
//! A [`TypeRef`] is what a member *declares* it holds: a scalar kind, a
//! temporal shape, a registered named type, a single-element-typed list or a
//! transparent choice wrapper. The runtime value may diverge (subtype
//! substitution); the divergence is what the substitution tracker records.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::name::TypeName;

/// Scalar kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScalarKind {
    /// Boolean
    Bool,
    /// 32-bit integer
    Int,
    /// 64-bit integer
    Long,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// Abstract numeric request: the concrete kind is inferred from the
    /// literal (integer-valued vs decimal-valued)
    Number,
    /// Text
    Text,
}

/// Temporal shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemporalKind {
    /// Date only
    Date,
    /// Date and time, no offset
    DateTime,
    /// Date and time with a UTC offset
    Offset,
    /// UTC instant
    Instant,
    /// Abstract temporal request: best-fit shape chosen from the source's
    /// calendar representation
    Any,
}

/// A declared member type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeRef {
    /// Scalar leaf
    Scalar(ScalarKind),
    /// Temporal leaf
    Temporal(TemporalKind),
    /// Registered struct or enum type
    Named(TypeName),
    /// Single-element-typed container
    List(Box<TypeRef>),
    /// Transparent tag+payload wrapper for a substitution group member
    Choice(Box<TypeRef>),
}

impl TypeRef {
    /// Text scalar
    #[must_use]
    pub fn text() -> Self {
        Self::Scalar(ScalarKind::Text)
    }

    /// 32-bit integer scalar
    #[must_use]
    pub fn int() -> Self {
        Self::Scalar(ScalarKind::Int)
    }

    /// 64-bit integer scalar
    #[must_use]
    pub fn long() -> Self {
        Self::Scalar(ScalarKind::Long)
    }

    /// 64-bit float scalar
    #[must_use]
    pub fn double() -> Self {
        Self::Scalar(ScalarKind::Double)
    }

    /// Boolean scalar
    #[must_use]
    pub fn bool() -> Self {
        Self::Scalar(ScalarKind::Bool)
    }

    /// Named type reference
    #[must_use]
    pub fn named(name: impl Into<TypeName>) -> Self {
        Self::Named(name.into())
    }

    /// List of `element`
    #[must_use]
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    /// Choice wrapper around `payload`
    #[must_use]
    pub fn choice(payload: Self) -> Self {
        Self::Choice(Box::new(payload))
    }

    /// True for container references
    #[inline]
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Declared element type of a container reference
    #[inline]
    #[must_use]
    pub fn element(&self) -> Option<&Self> {
        match self {
            Self::List(element) => Some(element),
            _ => None,
        }
    }

    /// Named type, when this reference is (or wraps) one
    #[must_use]
    pub fn type_name(&self) -> Option<&TypeName> {
        match self {
            Self::Named(name) => Some(name),
            Self::List(inner) | Self::Choice(inner) => inner.type_name(),
            _ => None,
        }
    }
}

impl Display for ScalarKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Number => "Number",
            Self::Text => "Text",
        };
        write!(f, "{text}")
    }
}

impl Display for TemporalKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Offset => "OffsetDateTime",
            Self::Instant => "Instant",
            Self::Any => "Temporal",
        };
        write!(f, "{text}")
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::Temporal(kind) => write!(f, "{kind}"),
            Self::Named(name) => write!(f, "{name}"),
            Self::List(element) => write!(f, "List<{element}>"),
            Self::Choice(payload) => write!(f, "Choice<{payload}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_nests_containers() {
        let ty = TypeRef::list(TypeRef::choice(TypeRef::named("Animal")));
        assert_eq!(ty.to_string(), "List<Choice<Animal>>");
    }

    #[test]
    fn type_name_unwraps_containers() {
        let ty = TypeRef::list(TypeRef::named("Phone"));
        assert_eq!(ty.type_name().unwrap().as_str(), "Phone");
        assert!(TypeRef::text().type_name().is_none());
    }
}
