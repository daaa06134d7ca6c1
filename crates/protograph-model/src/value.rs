//! Dynamic values forming the object graph

use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use serde::Serialize;

use crate::name::TypeName;
use crate::temporal::Temporal;

/// A node of the object graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer (stores both `Int` and `Long` declared kinds)
    Int(i64),
    /// Floating point (stores both `Float` and `Double` declared kinds)
    Float(f64),
    /// Text
    Text(String),
    /// Temporal in one of the four shapes
    Temporal(Temporal),
    /// Enum variant
    Enum(EnumValue),
    /// Ordered container of values
    List(Vec<Value>),
    /// Struct instance
    Struct(StructValue),
    /// Transparent choice wrapper
    Choice(ChoiceBox),
}

/// A variant of a registered enum type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    /// The enum type
    pub type_name: TypeName,
    /// The selected variant
    pub variant: String,
}

/// A struct instance: runtime type plus named fields
///
/// Fields are keyed by the canonical member name and are created in member
/// order at construction time, with containers pre-created empty (hosts
/// provide containers; the navigator never fabricates one).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructValue {
    /// Runtime type of this instance
    pub type_name: TypeName,
    fields: IndexMap<String, Value>,
}

/// The transparent tag+payload holder representing one member of a
/// substitution group
///
/// Navigable only through its single `value` pseudo-member; its tag is what
/// the payload serializes as.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceBox {
    /// External tag of this wrapper
    pub tag: String,
    /// The wrapped payload
    pub payload: Box<Value>,
}

impl StructValue {
    /// Create an instance with no fields yet
    #[must_use]
    pub fn new(type_name: TypeName) -> Self {
        Self {
            type_name,
            fields: IndexMap::new(),
        }
    }

    /// Read a field
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Mutable access to a field
    #[inline]
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Write a field
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Iterate fields in member order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Value {
    /// True for [`Value::Null`]
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Runtime kind key used for converter lookup and diagnostics
    ///
    /// Structured kinds include their type name (`Struct:Employee`); leaves
    /// are bare (`Text`, `Temporal:Date`).
    #[must_use]
    pub fn kind_key(&self) -> String {
        match self {
            Self::Null => "Null".to_string(),
            Self::Bool(_) => "Bool".to_string(),
            Self::Int(_) => "Int".to_string(),
            Self::Float(_) => "Float".to_string(),
            Self::Text(_) => "Text".to_string(),
            Self::Temporal(t) => format!("Temporal:{}", t.kind()),
            Self::Enum(e) => format!("Enum:{}", e.type_name),
            Self::List(_) => "List".to_string(),
            Self::Struct(s) => format!("Struct:{}", s.type_name),
            Self::Choice(_) => "Choice".to_string(),
        }
    }
}

impl Display for Value {
    /// Generic stringification, used by the to-text coercion rule and the
    /// audit trail
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Temporal(t) => write!(f, "{t}"),
            Self::Enum(e) => write!(f, "{}", e.variant),
            Self::List(_) | Self::Struct(_) | Self::Choice(_) => {
                let rendered =
                    serde_json::to_string(self).unwrap_or_else(|_| "<unrenderable>".to_string());
                write!(f, "{rendered}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_keys_carry_type_names() {
        let value = Value::Struct(StructValue::new(TypeName::new("Employee")));
        assert_eq!(value.kind_key(), "Struct:Employee");
        assert_eq!(Value::Text("x".into()).kind_key(), "Text");
    }

    #[test]
    fn display_renders_scalars_plainly() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(1234.3).to_string(), "1234.3");
        assert_eq!(Value::Text("bob".into()).to_string(), "bob");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn struct_fields_preserve_member_order() {
        let mut s = StructValue::new(TypeName::new("T"));
        s.set_field("b", Value::Int(1));
        s.set_field("a", Value::Int(2));
        let names: Vec<_> = s.fields().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
