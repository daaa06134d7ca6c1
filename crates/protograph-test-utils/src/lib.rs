//! Testing utilities for the protograph workspace
//!
//! Shared schema fixtures (an employee domain and a zoo domain with
//! substitutable subtypes) plus small helpers.

#![allow(missing_docs)]

use std::sync::Arc;

use protograph_model::{
    Factory, MemberDescriptor, Schema, TemporalKind, TypeDef, TypeRef, TypeName, Value,
};

/// Initialize test logging once; safe to call from every test
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The employee domain: a root type with scalar, temporal, nested and
/// collection members
///
/// ```text
/// Employee { name, salary, id, active, hired, address, phones[] }
/// Address  { city, street }
/// Phone    { localNumber, areaCode }
/// ```
#[must_use]
pub fn employee_schema() -> Arc<Schema> {
    Schema::builder()
        .register(
            TypeDef::structure("Employee")
                .with(MemberDescriptor::new("name", TypeRef::text()).rank(1).required())
                .with(MemberDescriptor::new("salary", TypeRef::double()).rank(2))
                .with(MemberDescriptor::new("address", TypeRef::named("Address")).rank(3))
                .with(
                    MemberDescriptor::new("phones", TypeRef::list(TypeRef::named("Phone")))
                        .rank(4),
                )
                .member("id", TypeRef::int())
                .member("active", TypeRef::bool())
                .member("hired", TypeRef::Temporal(TemporalKind::Date))
                .build(),
        )
        .register(
            TypeDef::structure("Address")
                .member("city", TypeRef::text())
                .member("street", TypeRef::text())
                .build(),
        )
        .register(
            TypeDef::structure("Phone")
                .member("localNumber", TypeRef::text())
                .member("areaCode", TypeRef::text())
                .build(),
        )
        .build()
}

/// The zoo domain: subtype substitution over a heterogeneous list, a
/// choice-wrapped member, an enum, a back-reference member and a factory
///
/// ```text
/// Zoo      { name, mood, mascot: Animal, animals: [Animal], star: Choice<Animal>, href }
/// Animal   { id, nickname }
/// Penguin  : Animal { fishPerDay }
/// Dolphin  : Animal { length }
/// ```
#[must_use]
pub fn zoo_schema() -> Arc<Schema> {
    Schema::builder()
        .register(
            TypeDef::structure("Zoo")
                .with(MemberDescriptor::new("name", TypeRef::text()).rank(1))
                .member("mood", TypeRef::named("Mood"))
                .with(
                    MemberDescriptor::new("mascot", TypeRef::named("Animal"))
                        .variant_tag("Penguin", "penguin")
                        .variant_tag("Dolphin", "dolphin"),
                )
                .with(
                    MemberDescriptor::new("animals", TypeRef::list(TypeRef::named("Animal")))
                        .variant_tag("Penguin", "penguin")
                        .variant_tag("Dolphin", "dolphin"),
                )
                .with(MemberDescriptor::new(
                    "star",
                    TypeRef::choice(TypeRef::named("Animal")),
                ))
                .with(MemberDescriptor::new("href", TypeRef::named("Animal")).back_reference())
                .build(),
        )
        .register(
            TypeDef::structure("Animal")
                .member("id", TypeRef::int())
                .member("nickname", TypeRef::text())
                .build(),
        )
        .register(
            TypeDef::structure("Penguin")
                .extends("Animal")
                .member("fishPerDay", TypeRef::int())
                .build(),
        )
        .register(
            TypeDef::structure("Dolphin")
                .extends("Animal")
                .member("length", TypeRef::int())
                .build(),
        )
        .register(TypeDef::enumeration("Mood", ["HAPPY", "GRUMPY"]))
        .factory("Penguin", "hungry", Factory::plain(hungry_penguin))
        .build()
}

fn hungry_penguin() -> Value {
    let mut penguin = match zoo_types_only().construct(&TypeRef::named("Penguin")) {
        Ok(Value::Struct(penguin)) => penguin,
        _ => unreachable!("Penguin is a registered struct"),
    };
    penguin.set_field("fishPerDay", Value::Int(10));
    Value::Struct(penguin)
}

// A factory cannot capture the schema it is registered into, so it builds
// against a private registry holding the same type definitions
fn zoo_types_only() -> Arc<Schema> {
    Schema::builder()
        .register(
            TypeDef::structure("Animal")
                .member("id", TypeRef::int())
                .member("nickname", TypeRef::text())
                .build(),
        )
        .register(
            TypeDef::structure("Penguin")
                .extends("Animal")
                .member("fishPerDay", TypeRef::int())
                .build(),
        )
        .build()
}

/// Shorthand for a registered type name
#[must_use]
pub fn type_name(name: &str) -> TypeName {
    TypeName::new(name)
}
