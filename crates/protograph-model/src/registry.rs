//! Type registration and member introspection
//!
//! Types are declared once through [`SchemaBuilder`] and shared as an
//! immutable [`Schema`] — the single context object the navigator and
//! processor work against (no process-wide mutable statics).
//!
//! Member tables are built on first access and cached in a concurrent map:
//! many sessions may race the first build of a type, but the entry is
//! inserted exactly once and never invalidated afterwards.

use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::convert;
use crate::convert::Coercions;
use crate::descriptor::{Access, MemberDescriptor};
use crate::error::ModelError;
use crate::factory::Factories;
use crate::name::TypeName;
use crate::types::TypeRef;
use crate::value::{ChoiceBox, StructValue, Value};

/// Whether a registered type is a struct or an enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Structured type with members
    Struct,
    /// Closed set of named variants; an immutable leaf
    Enum,
}

/// A registered type definition
#[derive(Debug, Clone)]
pub struct TypeDef {
    name: TypeName,
    kind: TypeKind,
    parent: Option<TypeName>,
    members: Vec<MemberDescriptor>,
    variants: Vec<String>,
}

impl TypeDef {
    /// Start building a struct type
    #[must_use]
    pub fn structure(name: impl Into<TypeName>) -> TypeDefBuilder {
        TypeDefBuilder {
            name: name.into(),
            parent: None,
            members: Vec::new(),
        }
    }

    /// Define an enum type from its variants
    #[must_use]
    pub fn enumeration(
        name: impl Into<TypeName>,
        variants: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Enum,
            parent: None,
            members: Vec::new(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// Type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// Struct or enum
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Parent type, for subtype chains
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&TypeName> {
        self.parent.as_ref()
    }

    /// Enum variants (empty for structs)
    #[inline]
    #[must_use]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }
}

/// Fluent builder for struct [`TypeDef`]s
#[derive(Debug)]
pub struct TypeDefBuilder {
    name: TypeName,
    parent: Option<TypeName>,
    members: Vec<MemberDescriptor>,
}

impl TypeDefBuilder {
    /// Declare a parent type; members are inherited and the subtype becomes
    /// eligible for substitution wherever the parent is declared
    #[must_use]
    pub fn extends(mut self, parent: impl Into<TypeName>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Add a read/write member with default metadata
    #[must_use]
    pub fn member(self, name: impl Into<String>, declared: TypeRef) -> Self {
        self.with(MemberDescriptor::new(name, declared))
    }

    /// Add a fully-specified member descriptor
    ///
    /// A duplicate member name is a configuration warning; the first
    /// registration wins.
    #[must_use]
    pub fn with(mut self, descriptor: MemberDescriptor) -> Self {
        let key = descriptor.name().to_uppercase();
        if self.members.iter().any(|m| m.name().to_uppercase() == key) {
            warn!(
                type_name = %self.name,
                member = descriptor.name(),
                "duplicate member registration; retaining the first"
            );
            return self;
        }
        self.members.push(descriptor);
        self
    }

    /// Register a member from an accessor method name
    ///
    /// A recognized `get`/`is`/`set` prefix (case-insensitive, optional
    /// underscore) is stripped and the first remaining letter lowercased to
    /// derive the member name; `get`/`is` contribute a getter, `set` a
    /// setter. A getter and setter registered under the same derived name
    /// merge into one read/write member whose declared type comes from the
    /// getter when both are present. Duplicate getters or setters warn and
    /// keep the first.
    #[must_use]
    pub fn accessor(mut self, method: &str, declared: TypeRef) -> Self {
        let Some((is_getter, member_name)) = split_accessor(method) else {
            warn!(
                type_name = %self.name,
                method,
                "method name has no recognized accessor prefix; ignoring"
            );
            return self;
        };

        let key = member_name.to_uppercase();
        if let Some(existing) = self
            .members
            .iter_mut()
            .find(|m| m.name().to_uppercase() == key)
        {
            match (existing.access(), is_getter) {
                (Access::ReadOnly, false) => existing.set_access(Access::ReadWrite),
                (Access::WriteOnly, true) => {
                    // The getter's type takes precedence over the setter's
                    existing.set_access(Access::ReadWrite);
                    existing.set_declared(declared);
                }
                _ => {
                    warn!(
                        type_name = %self.name,
                        member = %member_name,
                        accessor = if is_getter { "getter" } else { "setter" },
                        "duplicate accessor; retaining the first"
                    );
                }
            }
            return self;
        }

        let descriptor = if is_getter {
            MemberDescriptor::new(member_name, declared).read_only()
        } else {
            MemberDescriptor::new(member_name, declared).write_only()
        };
        self.members.push(descriptor);
        self
    }

    /// Finish the definition
    #[must_use]
    pub fn build(self) -> TypeDef {
        TypeDef {
            name: self.name,
            kind: TypeKind::Struct,
            parent: self.parent,
            members: self.members,
            variants: Vec::new(),
        }
    }
}

fn split_accessor(method: &str) -> Option<(bool, String)> {
    for (prefix, is_getter) in [("get", true), ("is", true), ("set", false)] {
        if method.len() > prefix.len() && method[..prefix.len()].eq_ignore_ascii_case(prefix) {
            let rest = &method[prefix.len()..];
            let rest = rest.strip_prefix('_').unwrap_or(rest);
            let mut chars = rest.chars();
            let Some(first) = chars.next() else { continue };
            let name: String = first.to_lowercase().chain(chars).collect();
            return Some((is_getter, name));
        }
    }
    None
}

/// Ordered, case-insensitively keyed member table of one host type
///
/// Inherited members are merged in (subtype definitions override by name)
/// and the result is sorted by rank, unordered members last.
#[derive(Debug)]
pub struct MemberTable {
    type_name: TypeName,
    members: IndexMap<String, MemberDescriptor>,
}

impl MemberTable {
    /// Case-insensitive member lookup
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.get(&name.to_uppercase())
    }

    /// Members in serialization order
    pub fn iter(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.members.values()
    }

    /// Host type
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Render the table for diagnostics, one member per line
    #[must_use]
    pub fn dump(&self) -> String {
        let mut lines: Vec<String> = self
            .members
            .values()
            .map(|m| {
                format!(
                    "  {}: {}{}{}",
                    m.name(),
                    m.declared(),
                    if m.is_required() { " (required)" } else { "" },
                    match m.access() {
                        Access::ReadWrite => "",
                        Access::ReadOnly => " (read-only)",
                        Access::WriteOnly => " (write-only)",
                    }
                )
            })
            .collect();
        lines.insert(0, format!("members of [{}]:", self.type_name));
        lines.join("\n")
    }
}

/// The immutable type/conversion/construction context shared by every
/// session
#[derive(Debug)]
pub struct Schema {
    types: HashMap<String, Arc<TypeDef>>,
    tables: DashMap<String, Arc<MemberTable>>,
    coercions: Coercions,
    factories: Factories,
}

/// Builder for [`Schema`]
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    types: HashMap<String, Arc<TypeDef>>,
    coercions: Coercions,
    factories: Factories,
}

impl SchemaBuilder {
    /// Register a type definition
    ///
    /// Re-registering a name is a configuration warning; the first
    /// definition wins.
    #[must_use]
    pub fn register(mut self, def: TypeDef) -> Self {
        let key = def.name().key();
        if self.types.contains_key(&key) {
            warn!(type_name = %def.name(), "duplicate type registration; retaining the first");
            return self;
        }
        self.types.insert(key, Arc::new(def));
        self
    }

    /// Register an exact-pair converter (see [`Coercions::register`])
    #[must_use]
    pub fn converter<F>(mut self, from_kind: &str, target: &TypeRef, convert: F) -> Self
    where
        F: Fn(&Value, &TypeRef) -> Option<Value> + Send + Sync + 'static,
    {
        self.coercions.register(from_kind, target, convert);
        self
    }

    /// Register a named construction factory (see [`Factories::register`])
    #[must_use]
    pub fn factory(
        mut self,
        type_name: impl Into<String>,
        method: impl Into<String>,
        factory: crate::factory::Factory,
    ) -> Self {
        self.factories.register(type_name, method, factory);
        self
    }

    /// Finish and freeze the schema
    #[must_use]
    pub fn build(self) -> Arc<Schema> {
        Arc::new(Schema {
            types: self.types,
            tables: DashMap::new(),
            coercions: self.coercions,
            factories: self.factories,
        })
    }
}

impl Schema {
    /// Start building a schema
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Look up a type definition by name (case-insensitive)
    ///
    /// # Errors
    /// [`ModelError::UnknownType`] when the name is not registered.
    pub fn type_def(&self, name: &str) -> Result<Arc<TypeDef>, ModelError> {
        self.types
            .get(&name.to_uppercase())
            .cloned()
            .ok_or_else(|| ModelError::UnknownType {
                name: name.to_string(),
            })
    }

    /// True when the name is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(&name.to_uppercase())
    }

    /// Member table of a type, built on first access and cached
    ///
    /// # Errors
    /// [`ModelError::UnknownType`] for unregistered types or parents.
    pub fn describe(&self, type_name: &TypeName) -> Result<Arc<MemberTable>, ModelError> {
        let key = type_name.key();
        if let Some(table) = self.tables.get(&key) {
            return Ok(table.clone());
        }
        let def = self.type_def(type_name.as_str())?;
        let table = Arc::new(self.build_table(&def)?);
        // Concurrent first-access may race the build; the entry API keeps
        // exactly one winner and the table is immutable from here on.
        let entry = self.tables.entry(key).or_insert(table);
        Ok(entry.clone())
    }

    /// Find a member of a type, case-insensitively, across its parent chain
    ///
    /// # Errors
    /// [`ModelError::MemberNotFound`] with a dump of every member the type
    /// does expose.
    pub fn member(&self, type_name: &TypeName, name: &str) -> Result<MemberDescriptor, ModelError> {
        let table = self.describe(type_name)?;
        table
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::MemberNotFound {
                type_name: type_name.to_string(),
                member: name.to_string(),
                known: table.dump(),
            })
    }

    /// True when `candidate` is `base` or a registered subtype of it
    #[must_use]
    pub fn is_subtype(&self, candidate: &TypeName, base: &TypeName) -> bool {
        let mut current = candidate.clone();
        let mut seen = HashSet::new();
        loop {
            if current.key() == base.key() {
                return true;
            }
            if !seen.insert(current.key()) {
                return false; // parent cycle
            }
            match self.types.get(&current.key()).and_then(|d| d.parent().cloned()) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// True when the declared type is an immutable leaf (scalar, temporal
    /// or registered enum)
    #[must_use]
    pub fn is_leaf(&self, declared: &TypeRef) -> bool {
        match declared {
            TypeRef::Scalar(_) | TypeRef::Temporal(_) => true,
            TypeRef::Named(name) => self
                .types
                .get(&name.key())
                .is_some_and(|def| def.kind() == TypeKind::Enum),
            TypeRef::List(_) | TypeRef::Choice(_) => false,
        }
    }

    /// Default-construct an empty value of the declared type
    ///
    /// Structs materialize with every container member already holding an
    /// empty list and every other member null. Leaves and bare containers
    /// cannot be constructed.
    ///
    /// # Errors
    /// [`ModelError::Construction`] for leaves, bare containers and unknown
    /// types.
    pub fn construct(&self, declared: &TypeRef) -> Result<Value, ModelError> {
        match declared {
            TypeRef::Named(name) => {
                let def = self.type_def(name.as_str())?;
                match def.kind() {
                    TypeKind::Enum => Err(ModelError::construction(
                        name.as_str(),
                        "enums are immutable leaves",
                    )),
                    TypeKind::Struct => {
                        let table = self.describe(name)?;
                        let mut value = StructValue::new(def.name().clone());
                        for member in table.iter() {
                            let initial = if member.is_collection() {
                                Value::List(Vec::new())
                            } else {
                                Value::Null
                            };
                            value.set_field(member.name(), initial);
                        }
                        Ok(Value::Struct(value))
                    }
                }
            }
            TypeRef::Scalar(kind) => Err(ModelError::construction(
                kind.to_string(),
                "scalar leaves cannot be constructed",
            )),
            TypeRef::Temporal(kind) => Err(ModelError::construction(
                kind.to_string(),
                "temporal leaves cannot be constructed",
            )),
            TypeRef::List(_) => Err(ModelError::construction(
                declared.to_string(),
                "containers are provided by host types",
            )),
            TypeRef::Choice(payload) => {
                let tag = payload
                    .type_name()
                    .map_or_else(|| "value".to_string(), TypeName::default_tag);
                self.construct_choice(payload, tag)
            }
        }
    }

    /// Construct a choice wrapper holding a fresh payload of `payload_type`
    ///
    /// # Errors
    /// [`ModelError::Construction`] when the payload cannot be built.
    pub fn construct_choice(
        &self,
        payload_type: &TypeRef,
        tag: impl Into<String>,
    ) -> Result<Value, ModelError> {
        let payload = self.construct(payload_type)?;
        Ok(Value::Choice(ChoiceBox {
            tag: tag.into(),
            payload: Box::new(payload),
        }))
    }

    /// Convert a value to a declared type (see the coercion rules in
    /// [`Coercions`])
    ///
    /// # Errors
    /// [`ModelError::Conversion`] when no rule applies.
    pub fn convert(&self, value: Value, target: &TypeRef, path: &str) -> Result<Value, ModelError> {
        convert::apply(self, value, target, path)
    }

    /// The converter registry
    #[inline]
    #[must_use]
    pub fn coercions(&self) -> &Coercions {
        &self.coercions
    }

    /// The construction-strategy registry
    #[inline]
    #[must_use]
    pub fn factories(&self) -> &Factories {
        &self.factories
    }

    fn build_table(&self, def: &TypeDef) -> Result<MemberTable, ModelError> {
        // Walk to the root ancestor so parents contribute first and
        // subtypes override by name
        let mut chain = vec![self.type_def(def.name().as_str())?];
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(def.name().key());
        while let Some(parent) = chain.last().expect("chain is non-empty").parent().cloned() {
            if !seen.insert(parent.key()) {
                return Err(ModelError::Configuration(format!(
                    "type parent cycle through [{parent}]"
                )));
            }
            chain.push(self.type_def(parent.as_str())?);
        }

        let mut merged: IndexMap<String, MemberDescriptor> = IndexMap::new();
        for ancestor in chain.iter().rev() {
            for member in &ancestor.members {
                merged.insert(member.name().to_uppercase(), member.clone());
            }
        }

        let mut ordered: Vec<(String, MemberDescriptor)> = merged.into_iter().collect();
        ordered.sort_by_key(|(_, m)| m.ordering());
        Ok(MemberTable {
            type_name: def.name().clone(),
            members: ordered.into_iter().collect(),
        })
    }
}
