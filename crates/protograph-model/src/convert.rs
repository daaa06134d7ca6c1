//! Type coercion
//!
//! Converts a loosely-typed input value to a member's declared type. Rules
//! are tried in a fixed order:
//!
//! 1. identity, when the declared type already accepts the runtime shape
//!    (enum text lookup sits directly behind this, as enum members are
//!    immutable leaves set from their variant names)
//! 2. a registered converter for the exact (runtime kind, target) pair
//! 3. numeric kind adjustment when lossless (range-checked)
//! 4. anything to text via generic stringification
//! 5. text to the abstract numeric kind, integer- vs decimal-valued by the
//!    presence of a fractional part
//! 6. text to a specific scalar kind, including the extended boolean forms
//! 7. text to a temporal shape selected by digit mask
//! 8. temporal shape to temporal shape through calendar fields, with
//!    best-fit when the target is the abstract temporal request

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ModelError;
use crate::number;
use crate::registry::{Schema, TypeDef, TypeKind};
use crate::temporal::{parse_temporal, Temporal};
use crate::types::{ScalarKind, TemporalKind, TypeRef};
use crate::value::{EnumValue, Value};

/// Converter closure: returns `None` when it declines the pair
pub type ConverterFn = Arc<dyn Fn(&Value, &TypeRef) -> Option<Value> + Send + Sync>;

/// Registry of exact-pair converters
///
/// Keys pair the runtime kind of the source value with the rendered target
/// type, e.g. `Text-to-Instant`.
#[derive(Default)]
pub struct Coercions {
    converters: HashMap<String, ConverterFn>,
}

impl Coercions {
    /// The registry key for a (runtime kind, target) pair
    #[must_use]
    pub fn key(from_kind: &str, target: &TypeRef) -> String {
        format!("{from_kind}-to-{target}")
    }

    /// Register a converter for an exact pair
    pub fn register<F>(&mut self, from_kind: &str, target: &TypeRef, convert: F)
    where
        F: Fn(&Value, &TypeRef) -> Option<Value> + Send + Sync + 'static,
    {
        self.converters
            .insert(Self::key(from_kind, target), Arc::new(convert));
    }

    fn try_registered(&self, value: &Value, target: &TypeRef) -> Option<Value> {
        let key = Self::key(&value.kind_key(), target);
        self.converters
            .get(&key)
            .and_then(|convert| convert.as_ref()(value, target))
    }
}

impl fmt::Debug for Coercions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.converters.keys().collect();
        keys.sort();
        f.debug_struct("Coercions").field("converters", &keys).finish()
    }
}

/// Run the coercion chain
pub(crate) fn apply(
    schema: &Schema,
    value: Value,
    target: &TypeRef,
    path: &str,
) -> Result<Value, ModelError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    // (1) identity
    if accepts(schema, target, &value) {
        return Ok(value);
    }

    // Enum variant lookup from text
    if let TypeRef::Named(name) = target {
        if let Ok(def) = schema.type_def(name.as_str()) {
            if def.kind() == TypeKind::Enum {
                return enum_from_text(&def, &value, target, path);
            }
        }
    }

    // (2) registered exact-pair converter
    if let Some(converted) = schema.coercions().try_registered(&value, target) {
        return Ok(converted);
    }

    let from = value.kind_key();
    let converted = match (&value, target) {
        // (4) generic stringification
        (_, TypeRef::Scalar(ScalarKind::Text)) => Some(Value::Text(value.to_string())),
        // (5) abstract numeric request
        (Value::Text(text), TypeRef::Scalar(ScalarKind::Number)) => number_from_text(text),
        // (6) specific scalar kinds
        (Value::Text(text), TypeRef::Scalar(kind)) => scalar_from_text(text, *kind),
        // (7) temporal by digit mask
        (Value::Text(text), TypeRef::Temporal(kind)) => temporal_from_text(text, *kind),
        // (8) shape-to-shape via calendar fields
        (Value::Temporal(temporal), TypeRef::Temporal(kind)) => {
            Temporal::from_calendar(temporal.to_calendar(), *kind).map(Value::Temporal)
        }
        _ => None,
    };

    converted.ok_or_else(|| ModelError::Conversion {
        from,
        to: target.to_string(),
        path: path.to_string(),
    })
}

/// Identity rule: does the declared type already accept this runtime shape?
///
/// Lossless numeric adjustments (rule 3) are folded in here: an `Int` value
/// satisfies an `Int` declaration only within 32-bit range, and always
/// satisfies a `Long` one.
fn accepts(schema: &Schema, target: &TypeRef, value: &Value) -> bool {
    match (target, value) {
        (TypeRef::Scalar(ScalarKind::Bool), Value::Bool(_)) => true,
        (TypeRef::Scalar(ScalarKind::Int), Value::Int(i)) => i32::try_from(*i).is_ok(),
        (TypeRef::Scalar(ScalarKind::Long), Value::Int(_)) => true,
        (TypeRef::Scalar(ScalarKind::Float | ScalarKind::Double), Value::Float(_)) => true,
        (TypeRef::Scalar(ScalarKind::Number), Value::Int(_) | Value::Float(_)) => true,
        (TypeRef::Scalar(ScalarKind::Text), Value::Text(_)) => true,
        (TypeRef::Temporal(TemporalKind::Any), Value::Temporal(_)) => true,
        (TypeRef::Temporal(kind), Value::Temporal(t)) => t.kind() == *kind,
        (TypeRef::Named(name), Value::Enum(e)) => e.type_name.key() == name.key(),
        (TypeRef::Named(name), Value::Struct(s)) => schema.is_subtype(&s.type_name, name),
        (TypeRef::List(_), Value::List(_)) => true,
        (TypeRef::Choice(_), Value::Choice(_)) => true,
        _ => false,
    }
}

fn enum_from_text(
    def: &TypeDef,
    value: &Value,
    target: &TypeRef,
    path: &str,
) -> Result<Value, ModelError> {
    let conversion_error = || ModelError::Conversion {
        from: value.kind_key(),
        to: target.to_string(),
        path: path.to_string(),
    };
    let Value::Text(text) = value else {
        return Err(conversion_error());
    };
    def.variants()
        .iter()
        .find(|v| *v == text)
        .map(|variant| {
            Value::Enum(EnumValue {
                type_name: def.name().clone(),
                variant: variant.clone(),
            })
        })
        .ok_or_else(conversion_error)
}

fn number_from_text(text: &str) -> Option<Value> {
    let shape = number::classify(text)?;
    if shape.is_decimal() {
        text.parse::<f64>().ok().map(Value::Float)
    } else {
        text.parse::<i64>().ok().map(Value::Int)
    }
}

fn scalar_from_text(text: &str, kind: ScalarKind) -> Option<Value> {
    match kind {
        ScalarKind::Bool => parse_boolean(text).map(Value::Bool),
        ScalarKind::Int => text
            .parse::<i32>()
            .ok()
            .map(|i| Value::Int(i64::from(i))),
        ScalarKind::Long => text.parse::<i64>().ok().map(Value::Int),
        ScalarKind::Float | ScalarKind::Double => text.parse::<f64>().ok().map(Value::Float),
        // Text is identity, Number is rule 5; neither reaches here
        ScalarKind::Text | ScalarKind::Number => None,
    }
}

fn temporal_from_text(text: &str, kind: TemporalKind) -> Option<Value> {
    let parsed = parse_temporal(text).ok()?;
    if kind == TemporalKind::Any || parsed.kind() == kind {
        return Some(Value::Temporal(parsed));
    }
    Temporal::from_calendar(parsed.to_calendar(), kind).map(Value::Temporal)
}

/// Parse the extended boolean text forms
///
/// Accepts `TRUE/T/YES/Y/PLUS` and `FALSE/F/NO/N/MINUS`, case-insensitive.
#[must_use]
pub fn parse_boolean(text: &str) -> Option<bool> {
    match text.to_uppercase().as_str() {
        "TRUE" | "T" | "YES" | "Y" | "PLUS" => Some(true),
        "FALSE" | "F" | "NO" | "N" | "MINUS" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn schema() -> Arc<Schema> {
        Schema::builder()
            .register(TypeDef::structure("Animal").member("id", TypeRef::int()).build())
            .register(
                TypeDef::structure("Penguin")
                    .extends("Animal")
                    .member("fishPerDay", TypeRef::int())
                    .build(),
            )
            .register(TypeDef::enumeration("Mood", ["HAPPY", "GRUMPY"]))
            .build()
    }

    #[test]
    fn identity_accepts_subtypes() {
        let schema = schema();
        let penguin = schema.construct(&TypeRef::named("Penguin")).unwrap();
        let converted = schema
            .convert(penguin.clone(), &TypeRef::named("Animal"), "pet")
            .unwrap();
        assert_eq!(converted, penguin);
    }

    #[test]
    fn text_parses_per_target_kind() {
        let schema = schema();
        assert_eq!(
            schema.convert("999".into(), &TypeRef::int(), "p").unwrap(),
            Value::Int(999)
        );
        assert_eq!(
            schema.convert("1234.30".into(), &TypeRef::double(), "p").unwrap(),
            Value::Float(1234.30)
        );
        assert_eq!(
            schema.convert("y".into(), &TypeRef::bool(), "p").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            schema.convert("MINUS".into(), &TypeRef::bool(), "p").unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn abstract_number_infers_kind_from_the_literal() {
        let schema = schema();
        let number = TypeRef::Scalar(ScalarKind::Number);
        assert_eq!(schema.convert("42".into(), &number, "p").unwrap(), Value::Int(42));
        assert_eq!(
            schema.convert("42.5".into(), &number, "p").unwrap(),
            Value::Float(42.5)
        );
    }

    #[test]
    fn int_range_is_checked() {
        let schema = schema();
        assert!(schema
            .convert(Value::Int(i64::from(i32::MAX) + 1), &TypeRef::int(), "p")
            .is_err());
        assert_eq!(
            schema
                .convert(Value::Int(7), &TypeRef::long(), "p")
                .unwrap(),
            Value::Int(7)
        );
    }

    #[test]
    fn anything_renders_to_text() {
        let schema = schema();
        assert_eq!(
            schema.convert(Value::Int(42), &TypeRef::text(), "p").unwrap(),
            Value::Text("42".to_string())
        );
    }

    #[test]
    fn text_to_temporal_honors_the_requested_shape() {
        let schema = schema();
        let date = schema
            .convert(
                "2011-12-03T10:15:30Z".into(),
                &TypeRef::Temporal(TemporalKind::Date),
                "p",
            )
            .unwrap();
        assert_eq!(date.to_string(), "2011-12-03");

        let any = schema
            .convert(
                "2011-12-03".into(),
                &TypeRef::Temporal(TemporalKind::Any),
                "p",
            )
            .unwrap();
        let Value::Temporal(t) = any else { panic!() };
        assert_eq!(t.kind(), TemporalKind::Date);
    }

    #[test]
    fn enum_variants_parse_from_exact_text() {
        let schema = schema();
        let mood = schema
            .convert("HAPPY".into(), &TypeRef::named("Mood"), "p")
            .unwrap();
        let Value::Enum(e) = mood else { panic!() };
        assert_eq!(e.variant, "HAPPY");

        assert!(schema
            .convert("happy".into(), &TypeRef::named("Mood"), "p")
            .is_err());
    }

    #[test]
    fn registered_converters_win_over_the_fallback_chain() {
        let schema = Schema::builder()
            .converter("Text", &TypeRef::int(), |value, _| {
                let Value::Text(text) = value else { return None };
                text.strip_prefix('#').and_then(|n| n.parse().ok()).map(Value::Int)
            })
            .build();
        assert_eq!(
            schema.convert("#7".into(), &TypeRef::int(), "p").unwrap(),
            Value::Int(7)
        );
    }

    #[test]
    fn failure_names_both_types_and_the_path() {
        let schema = schema();
        let err = schema
            .convert("soon".into(), &TypeRef::Temporal(TemporalKind::Date), "a.b.when")
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Text"));
        assert!(text.contains("Date"));
        assert!(text.contains("a.b.when"));
    }
}
