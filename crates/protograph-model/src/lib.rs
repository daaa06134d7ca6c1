//! Protograph value model
//!
//! The registry-typed half of the directive builder: declared types, member
//! introspection, dynamic values, type coercion and construction
//! strategies.
//!
//! # Core concepts
//!
//! - [`Schema`]: the immutable context object holding every registered
//!   [`TypeDef`], the converter registry and the factory registry; built
//!   once via [`SchemaBuilder`] and shared across sessions
//! - [`MemberDescriptor`]: introspected metadata for one settable member
//!   (declared type, external name, required flag, ordering rank)
//! - [`Value`]: a node of the object graph, from scalars to structs, lists
//!   and transparent [`ChoiceBox`] wrappers
//! - [`Coercions`]: the ordered coercion rule chain converting directive
//!   text into declared member types
//! - [`Factories`]: named construction strategies selectable per path
//!
//! Member tables are computed per type on first access and cached
//! process-wide; the cache is safe for concurrent first-access and
//! immutable afterwards.

#![warn(unreachable_pub)]

mod convert;
mod descriptor;
mod dump;
mod error;
mod factory;
mod name;
mod number;
mod registry;
mod temporal;
mod types;
mod value;

pub use convert::{parse_boolean, Coercions, ConverterFn};
pub use descriptor::{Access, MemberDescriptor, Rank};
pub use dump::render;
pub use error::ModelError;
pub use factory::{Factories, Factory};
pub use name::TypeName;
pub use number::{classify, strip_trailing_zeros, NumberShape};
pub use registry::{MemberTable, Schema, SchemaBuilder, TypeDef, TypeDefBuilder, TypeKind};
pub use temporal::{parse_temporal, CalendarFields, Temporal};
pub use types::{ScalarKind, TemporalKind, TypeRef};
pub use value::{ChoiceBox, EnumValue, StructValue, Value};
