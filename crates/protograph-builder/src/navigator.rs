//! Path-driven graph navigation and mutation
//!
//! A [`GraphNavigator`] owns one root value and walks [`Path`]s against it,
//! creating missing intermediate nodes on demand, honoring per-path type
//! and construction overrides, and recording substitutions whenever a
//! followed value's runtime type diverges from its declared type.
//!
//! One navigator serves exactly one build session and is not safe for
//! concurrent use; only the schema behind it is shared.

use std::collections::BTreeMap;
use std::sync::Arc;

use protograph_model::{
    Factory, MemberDescriptor, ModelError, Schema, TypeKind, TypeName, TypeRef, Value,
};
use protograph_path::Path;

use crate::error::BuildError;
use crate::substitution::SubstitutionLog;

/// Session object navigating and mutating one object graph
#[derive(Debug)]
pub struct GraphNavigator {
    schema: Arc<Schema>,
    root_type: TypeName,
    root: Value,
    type_overrides: BTreeMap<Path, TypeName>,
    construction_overrides: BTreeMap<Path, String>,
    substitutions: SubstitutionLog,
    comments: BTreeMap<Path, String>,
}

impl GraphNavigator {
    /// Create a session over a fresh instance of the named root type
    ///
    /// # Errors
    /// [`ModelError::UnknownType`] for unregistered names,
    /// [`BuildError::Configuration`] when the name is not a struct, and
    /// construction failures of the root instance (fatal to a run).
    pub fn new(schema: Arc<Schema>, root_type: &str) -> Result<Self, BuildError> {
        let def = schema.type_def(root_type)?;
        if def.kind() != TypeKind::Struct {
            return Err(BuildError::Configuration(format!(
                "root type [{root_type}] must be a struct"
            )));
        }
        let root_type = def.name().clone();
        let root = schema.construct(&TypeRef::Named(root_type.clone()))?;
        Ok(Self {
            schema,
            root_type,
            root,
            type_overrides: BTreeMap::new(),
            construction_overrides: BTreeMap::new(),
            substitutions: SubstitutionLog::new(),
            comments: BTreeMap::new(),
        })
    }

    /// The schema this session runs against
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Root type name
    #[inline]
    #[must_use]
    pub fn root_type(&self) -> &TypeName {
        &self.root_type
    }

    /// The root value
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Consume the session, keeping the built graph
    #[inline]
    #[must_use]
    pub fn into_root(self) -> Value {
        self.root
    }

    /// Read the raw value at `path`, instantiating missing intermediates
    ///
    /// Step names in `path` are normalized to their canonical member names
    /// as a side effect, also on failure.
    ///
    /// # Errors
    /// Member lookup, follow and read-access failures.
    pub fn get_by_path(&mut self, path: &mut Path) -> Result<Value, BuildError> {
        let schema = Arc::clone(&self.schema);
        let (host, declared) = Self::resolve_host(
            &schema,
            &mut self.root,
            &self.root_type,
            &self.type_overrides,
            &self.construction_overrides,
            &mut self.substitutions,
            path,
        )?;
        let descriptor = Self::final_descriptor(&schema, host, &declared, path)?;
        if !descriptor.readable() {
            return Err(BuildError::NotReadable {
                member: descriptor.name().to_string(),
            });
        }
        Ok(Self::read_member(host, &descriptor))
    }

    /// Read the value at `path`, coercing when the raw value does not
    /// already satisfy `expected`
    ///
    /// # Errors
    /// As [`GraphNavigator::get_by_path`], plus conversion failures.
    pub fn get_by_path_as(
        &mut self,
        path: &mut Path,
        expected: &TypeRef,
    ) -> Result<Value, BuildError> {
        let raw = self.get_by_path(path)?;
        self.schema
            .convert(raw, expected, &path.to_string())
            .map_err(Into::into)
    }

    /// Set the member at `path`, coercing `value` to its declared type
    ///
    /// Missing intermediate nodes are instantiated on the way. Returns the
    /// coerced value actually stored.
    ///
    /// # Errors
    /// Member lookup, follow, conversion and write-access failures.
    pub fn set_by_path(&mut self, path: &mut Path, value: Value) -> Result<Value, BuildError> {
        let schema = Arc::clone(&self.schema);
        let (host, declared) = Self::resolve_host(
            &schema,
            &mut self.root,
            &self.root_type,
            &self.type_overrides,
            &self.construction_overrides,
            &mut self.substitutions,
            path,
        )?;
        let descriptor = Self::final_descriptor(&schema, host, &declared, path)?;
        if !descriptor.writable() {
            return Err(BuildError::NotWritable {
                member: descriptor.name().to_string(),
            });
        }
        let coerced = schema.convert(value, descriptor.declared(), &path.to_string())?;
        match host {
            Value::Struct(host) => host.set_field(descriptor.name(), coerced.clone()),
            Value::Choice(host) => *host.payload = coerced.clone(),
            _ => unreachable!("hosts are structs or choice wrappers"),
        }
        Ok(coerced)
    }

    /// Override the construction type for `path`
    ///
    /// Registered at an unindexed list path, the override applies to every
    /// subsequently appended element unless a more specific indexed
    /// override exists. The path is validated (and normalized) against the
    /// graph first.
    ///
    /// # Errors
    /// Path validation failures and [`ModelError::UnknownType`].
    pub fn set_type_override(
        &mut self,
        path: &mut Path,
        type_name: &str,
    ) -> Result<TypeName, BuildError> {
        self.validate(path)?;
        let def = self.schema.type_def(type_name)?;
        let name = def.name().clone();
        self.type_overrides.insert(path.clone(), name.clone());
        Ok(name)
    }

    /// Override the construction strategy for `path`
    ///
    /// `reference` is a `TypeName.methodName` factory reference, resolved
    /// case-insensitively; missing or ambiguous references are
    /// configuration errors (fatal to a run).
    ///
    /// # Errors
    /// Path validation failures and [`ModelError::Configuration`].
    pub fn set_construction_override(
        &mut self,
        path: &mut Path,
        reference: &str,
    ) -> Result<String, BuildError> {
        self.validate(path)?;
        let (canonical, _) = self.schema.factories().resolve(reference)?;
        self.construction_overrides.insert(path.clone(), canonical.clone());
        Ok(canonical)
    }

    /// Attach free text to `path`
    ///
    /// # Errors
    /// Path validation failures.
    pub fn set_comment(&mut self, path: &mut Path, text: &str) -> Result<(), BuildError> {
        self.validate(path)?;
        self.comments.insert(path.clone(), text.to_string());
        Ok(())
    }

    /// Recorded comments, keyed by graph path
    #[inline]
    #[must_use]
    pub fn comments(&self) -> &BTreeMap<Path, String> {
        &self.comments
    }

    /// The substitution log of this session
    #[inline]
    #[must_use]
    pub fn substitutions(&self) -> &SubstitutionLog {
        &self.substitutions
    }

    /// Comments relocated onto their external document paths
    ///
    /// Substitutions are applied first (their keys carry member names),
    /// then remaining external names are swapped in, then the result is
    /// re-keyed as a document path.
    #[must_use]
    pub fn doc_comments(&mut self) -> BTreeMap<Path, String> {
        let substitutions = &mut self.substitutions;
        self.comments
            .iter()
            .map(|(path, text)| {
                let substituted = substitutions.apply(path);
                (substituted.with_external_names().to_doc(), text.clone())
            })
            .collect()
    }

    // Walk every step (normalizing names) and follow all but the last,
    // returning the host of the final step together with the declared type
    // context of that host.
    #[allow(clippy::too_many_arguments)]
    fn resolve_host<'a>(
        schema: &Schema,
        root: &'a mut Value,
        root_type: &TypeName,
        type_overrides: &BTreeMap<Path, TypeName>,
        construction_overrides: &BTreeMap<Path, String>,
        substitutions: &mut SubstitutionLog,
        path: &mut Path,
    ) -> Result<(&'a mut Value, TypeRef), BuildError> {
        let mut current = root;
        let mut declared = TypeRef::Named(root_type.clone());
        for step in 0..path.len() - 1 {
            let descriptor = Self::descriptor_at(schema, current, &declared, path, step)?;
            current = Self::follow(
                schema,
                current,
                &descriptor,
                path,
                step,
                type_overrides,
                construction_overrides,
                substitutions,
            )?;
            declared = match descriptor.element() {
                Some(element) => element.clone(),
                None => descriptor.declared().clone(),
            };
        }
        Ok((current, declared))
    }

    // Walk the full path for validation only (overrides, comments): the
    // final member must exist and names are normalized in place.
    fn validate(&mut self, path: &mut Path) -> Result<(), BuildError> {
        let schema = Arc::clone(&self.schema);
        let (host, declared) = Self::resolve_host(
            &schema,
            &mut self.root,
            &self.root_type,
            &self.type_overrides,
            &self.construction_overrides,
            &mut self.substitutions,
            path,
        )?;
        Self::final_descriptor(&schema, host, &declared, path).map(|_| ())
    }

    // Descriptor of the final step against the resolved host
    fn final_descriptor(
        schema: &Schema,
        host: &Value,
        declared: &TypeRef,
        path: &mut Path,
    ) -> Result<MemberDescriptor, BuildError> {
        Self::descriptor_at(schema, host, declared, path, path.len() - 1)
    }

    // Look up the member named by step `step` on the host, normalizing the
    // step's name and external name to the descriptor's canonical values.
    // Choice wrappers expose a single `value` pseudo-member whose declared
    // type is the wrapper's payload type.
    fn descriptor_at(
        schema: &Schema,
        host: &Value,
        declared: &TypeRef,
        path: &mut Path,
        step: usize,
    ) -> Result<MemberDescriptor, BuildError> {
        match host {
            Value::Struct(host) => {
                let descriptor = schema.member(&host.type_name, path.step(step).name())?;
                path.set_name(step, descriptor.name());
                path.set_external(step, Some(descriptor.external_name().to_string()));
                Ok(descriptor)
            }
            Value::Choice(host) => {
                if !path.step(step).name().eq_ignore_ascii_case("value") {
                    return Err(ModelError::MemberNotFound {
                        type_name: format!("Choice[{}]", host.tag),
                        member: path.step(step).name().to_string(),
                        known: "members of a choice wrapper:\n  value".to_string(),
                    }
                    .into());
                }
                let payload_type = match declared {
                    TypeRef::Choice(inner) => (**inner).clone(),
                    _ => runtime_type_of(&host.payload),
                };
                path.set_name(step, "value");
                path.set_external(step, Some("value".to_string()));
                Ok(MemberDescriptor::new("value", payload_type))
            }
            other => Err(BuildError::NotFollowable {
                member: path.step(step).name().to_string(),
                declared: other.kind_key(),
            }),
        }
    }

    // Descend one step: fetch the member value, constructing it (or a new
    // list element) when absent, honoring overrides, then run substitution
    // detection on the result.
    #[allow(clippy::too_many_arguments)]
    fn follow<'a>(
        schema: &Schema,
        host: &'a mut Value,
        descriptor: &MemberDescriptor,
        path: &mut Path,
        step: usize,
        type_overrides: &BTreeMap<Path, TypeName>,
        construction_overrides: &BTreeMap<Path, String>,
        substitutions: &mut SubstitutionLog,
    ) -> Result<&'a mut Value, BuildError> {
        // Immutable leaves cannot be containers of further steps
        if schema.is_leaf(descriptor.declared()) {
            return Err(BuildError::NotFollowable {
                member: descriptor.name().to_string(),
                declared: descriptor.declared().to_string(),
            });
        }

        // Per-path overrides: the exact indexed path first, then the same
        // path with its trailing index stripped (all-elements override)
        let exact = path.prefix(step + 1)?;
        let stripped = {
            let mut p = exact.clone();
            p.set_index(step, None);
            p
        };
        let type_override = type_overrides
            .get(&exact)
            .or_else(|| type_overrides.get(&stripped));
        let factory = match construction_overrides
            .get(&exact)
            .or_else(|| construction_overrides.get(&stripped))
        {
            Some(reference) => Some(schema.factories().resolve(reference)?.1),
            None => None,
        };

        let slot: &mut Value = match host {
            Value::Struct(host) => {
                let host_type = host.type_name.to_string();
                host.field_mut(descriptor.name())
                    .ok_or_else(|| ModelError::Construction {
                        type_name: host_type,
                        reason: format!("instance is missing field [{}]", descriptor.name()),
                    })?
            }
            Value::Choice(host) => &mut *host.payload,
            other => {
                return Err(BuildError::NotFollowable {
                    member: descriptor.name().to_string(),
                    declared: other.kind_key(),
                })
            }
        };

        let result: &mut Value = if descriptor.is_collection() {
            // Containers come from the host; this layer never fabricates one
            let element_type = descriptor
                .element()
                .expect("collection descriptors carry an element type");
            let Value::List(items) = slot else {
                return Err(ModelError::Construction {
                    type_name: element_type.to_string(),
                    reason: format!(
                        "container member [{}] holds no container instance",
                        descriptor.name()
                    ),
                }
                .into());
            };
            let Some(index) = path.step(step).index() else {
                return Err(BuildError::MissingIndex {
                    member: descriptor.name().to_string(),
                });
            };
            let position = index as usize;
            if position < items.len() {
                &mut items[position]
            } else if position == items.len() {
                let element = Self::construct_member(
                    schema,
                    descriptor,
                    element_type,
                    type_override,
                    factory,
                )?;
                items.push(element);
                items.last_mut().expect("just pushed")
            } else {
                return Err(BuildError::IndexOutOfRange {
                    member: descriptor.name().to_string(),
                    index,
                    len: items.len(),
                });
            }
        } else {
            if slot.is_null() {
                *slot = Self::construct_member(
                    schema,
                    descriptor,
                    descriptor.declared(),
                    type_override,
                    factory,
                )?;
            }
            slot
        };

        Self::detect_substitution(descriptor, result, path, step, substitutions);
        Ok(result)
    }

    // Build an empty member value of the effective type via the effective
    // strategy
    fn construct_member(
        schema: &Schema,
        descriptor: &MemberDescriptor,
        declared: &TypeRef,
        type_override: Option<&TypeName>,
        factory: Option<&Factory>,
    ) -> Result<Value, BuildError> {
        if let TypeRef::Choice(inner) = declared {
            let payload_type = Self::effective_type(schema, inner, type_override)?;
            let tag = match payload_type.type_name() {
                Some(name) if inner.type_name() != Some(name) => {
                    descriptor.substitution_tag(name)
                }
                _ => descriptor.external_name().to_string(),
            };
            return match factory {
                Some(Factory::Plain(build)) => Ok(build.as_ref()()),
                Some(Factory::Wrapping(wrap)) => Ok(wrap.as_ref()(schema.construct(&payload_type)?)),
                None => Ok(schema.construct_choice(&payload_type, tag)?),
            };
        }

        let effective = Self::effective_type(schema, declared, type_override)?;
        match factory {
            Some(Factory::Plain(build)) => Ok(build.as_ref()()),
            Some(Factory::Wrapping(_)) => Err(ModelError::Construction {
                type_name: effective.to_string(),
                reason: "wrapping factories only apply to choice members".to_string(),
            }
            .into()),
            None => Ok(schema.construct(&effective)?),
        }
    }

    // The effective construction type: the override when present (it must
    // name the declared type or a registered subtype), else the declared
    // type
    fn effective_type(
        schema: &Schema,
        declared: &TypeRef,
        type_override: Option<&TypeName>,
    ) -> Result<TypeRef, BuildError> {
        let Some(requested) = type_override else {
            return Ok(declared.clone());
        };
        let Some(base) = declared.type_name() else {
            return Err(ModelError::Construction {
                type_name: requested.to_string(),
                reason: format!("declared type [{declared}] cannot be overridden"),
            }
            .into());
        };
        if !schema.is_subtype(requested, base) {
            return Err(ModelError::Construction {
                type_name: requested.to_string(),
                reason: format!("not a registered subtype of [{base}]"),
            }
            .into());
        }
        Ok(TypeRef::Named(requested.clone()))
    }

    // Substitution detection: a followed struct whose runtime type differs
    // from the declared (element) type records a type substitution; a
    // followed choice wrapper records an element substitution one step
    // further down, where its payload lives.
    fn detect_substitution(
        descriptor: &MemberDescriptor,
        value: &Value,
        path: &Path,
        step: usize,
        substitutions: &mut SubstitutionLog,
    ) {
        match value {
            Value::Choice(wrapper) => {
                let next_is_payload = path
                    .steps()
                    .get(step + 1)
                    .is_some_and(|s| s.name().eq_ignore_ascii_case("value"));
                if next_is_payload {
                    substitutions.record_element(path, step, &wrapper.tag);
                }
            }
            Value::Struct(instance) => {
                if descriptor.is_back_reference() {
                    return;
                }
                let declared_name = if descriptor.is_collection() {
                    descriptor.element().and_then(TypeRef::type_name)
                } else {
                    descriptor.declared().type_name()
                };
                let Some(declared_name) = declared_name else {
                    return;
                };
                if instance.type_name.key() != declared_name.key() {
                    let tag = descriptor.substitution_tag(&instance.type_name);
                    substitutions.record_type(path, step, &tag);
                }
            }
            _ => {}
        }
    }

    fn read_member(host: &Value, descriptor: &MemberDescriptor) -> Value {
        match host {
            Value::Struct(host) => host
                .field(descriptor.name())
                .cloned()
                .unwrap_or(Value::Null),
            Value::Choice(host) => (*host.payload).clone(),
            _ => Value::Null,
        }
    }
}

fn runtime_type_of(value: &Value) -> TypeRef {
    use protograph_model::ScalarKind;
    match value {
        Value::Struct(s) => TypeRef::Named(s.type_name.clone()),
        Value::Enum(e) => TypeRef::Named(e.type_name.clone()),
        Value::Bool(_) => TypeRef::Scalar(ScalarKind::Bool),
        Value::Int(_) => TypeRef::Scalar(ScalarKind::Long),
        Value::Float(_) => TypeRef::Scalar(ScalarKind::Double),
        Value::Temporal(t) => TypeRef::Temporal(t.kind()),
        _ => TypeRef::Scalar(ScalarKind::Text),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use protograph_model::ScalarKind;
    use protograph_path::PathKind;
    use protograph_test_utils::{employee_schema, type_name, zoo_schema};

    use super::*;

    fn node(text: &str) -> Path {
        Path::parse(PathKind::Node, text).unwrap()
    }

    fn employee() -> GraphNavigator {
        GraphNavigator::new(employee_schema(), "Employee").unwrap()
    }

    fn zoo() -> GraphNavigator {
        GraphNavigator::new(zoo_schema(), "Zoo").unwrap()
    }

    #[test]
    fn set_then_get_returns_the_coerced_value() {
        let mut nav = employee();
        let stored = nav
            .set_by_path(&mut node("salary"), Value::Text("1234.30".into()))
            .unwrap();
        assert_eq!(stored, Value::Float(1234.30));
        assert_eq!(nav.get_by_path(&mut node("salary")).unwrap(), Value::Float(1234.30));
    }

    #[test]
    fn typed_get_applies_coercion() {
        let mut nav = employee();
        nav.set_by_path(&mut node("id"), Value::Text("99".into())).unwrap();
        let as_text = nav
            .get_by_path_as(&mut node("id"), &TypeRef::text())
            .unwrap();
        assert_eq!(as_text, Value::Text("99".to_string()));
    }

    #[test]
    fn intermediate_nodes_are_created_on_demand() {
        let mut nav = employee();
        nav.set_by_path(&mut node("address.city"), Value::Text("New York".into()))
            .unwrap();
        assert_eq!(
            nav.get_by_path(&mut node("address.city")).unwrap(),
            Value::Text("New York".to_string())
        );
        let Value::Struct(root) = nav.root() else { panic!() };
        assert!(matches!(root.field("address"), Some(Value::Struct(_))));
    }

    #[test]
    fn step_names_normalize_to_canonical_case() {
        let mut nav = employee();
        let mut path = node("ADDRESS.CITY");
        nav.set_by_path(&mut path, Value::Text("New York".into())).unwrap();
        assert_eq!(path.to_string(), "address.city");
    }

    #[test]
    fn normalization_commits_even_when_the_directive_fails() {
        let mut nav = employee();
        let mut path = node("ADDRESS.bogus");
        let err = nav
            .set_by_path(&mut path, Value::Text("x".into()))
            .unwrap_err();
        assert!(matches!(err, BuildError::Model(ModelError::MemberNotFound { .. })));
        assert_eq!(path.to_string(), "address.bogus");
    }

    #[test]
    fn unknown_member_reports_the_member_dump() {
        let mut nav = employee();
        let err = nav
            .set_by_path(&mut node("honey"), Value::Text("abc".into()))
            .unwrap_err();
        let BuildError::Model(ModelError::MemberNotFound { known, .. }) = err else {
            panic!("expected MemberNotFound");
        };
        assert!(known.contains("salary"));
        assert!(known.contains("phones"));
    }

    #[test]
    fn scalar_members_cannot_be_followed() {
        let mut nav = employee();
        let err = nav
            .set_by_path(&mut node("name.first"), Value::Text("b".into()))
            .unwrap_err();
        assert!(matches!(err, BuildError::NotFollowable { .. }));
    }

    #[test]
    fn list_appends_are_contiguous() {
        let mut nav = employee();
        nav.set_by_path(&mut node("phones[0].localNumber"), Value::Text("999".into()))
            .unwrap();
        // Same index resolves to the same element, no duplication
        nav.set_by_path(&mut node("phones[0].areaCode"), Value::Text("212".into()))
            .unwrap();
        nav.set_by_path(&mut node("phones[1].localNumber"), Value::Text("555".into()))
            .unwrap();

        let Value::Struct(root) = nav.root() else { panic!() };
        let Some(Value::List(phones)) = root.field("phones") else { panic!() };
        assert_eq!(phones.len(), 2);

        let err = nav
            .set_by_path(&mut node("phones[5].localNumber"), Value::Text("1".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::IndexOutOfRange { index: 5, len: 2, .. }
        ));
    }

    #[test]
    fn collections_require_an_index() {
        let mut nav = employee();
        let err = nav
            .set_by_path(&mut node("phones.localNumber"), Value::Text("1".into()))
            .unwrap_err();
        assert!(matches!(err, BuildError::MissingIndex { .. }));
    }

    #[test]
    fn a_nulled_container_is_a_construction_error() {
        let mut nav = employee();
        nav.set_by_path(&mut node("phones"), Value::Null).unwrap();
        let err = nav
            .set_by_path(&mut node("phones[0].localNumber"), Value::Text("1".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Model(ModelError::Construction { .. })
        ));
    }

    #[test]
    fn type_overrides_construct_subtypes() {
        let mut nav = zoo();
        nav.set_type_override(&mut node("mascot"), "Penguin").unwrap();
        nav.set_by_path(&mut node("mascot.fishPerDay"), Value::Text("5".into()))
            .unwrap();
        let Value::Struct(root) = nav.root() else { panic!() };
        let Some(Value::Struct(mascot)) = root.field("mascot") else { panic!() };
        assert_eq!(mascot.type_name, type_name("Penguin"));
    }

    #[test]
    fn unindexed_list_override_applies_to_every_element() {
        let mut nav = zoo();
        nav.set_type_override(&mut node("animals"), "Dolphin").unwrap();
        nav.set_type_override(&mut node("animals[1]"), "Penguin").unwrap();
        nav.set_by_path(&mut node("animals[0].id"), Value::Text("1".into()))
            .unwrap();
        nav.set_by_path(&mut node("animals[1].id"), Value::Text("2".into()))
            .unwrap();
        nav.set_by_path(&mut node("animals[2].id"), Value::Text("3".into()))
            .unwrap();

        let Value::Struct(root) = nav.root() else { panic!() };
        let Some(Value::List(animals)) = root.field("animals") else { panic!() };
        let types: Vec<&TypeName> = animals
            .iter()
            .map(|a| match a {
                Value::Struct(s) => &s.type_name,
                other => panic!("unexpected element {other:?}"),
            })
            .collect();
        assert_eq!(
            types,
            vec![&type_name("Dolphin"), &type_name("Penguin"), &type_name("Dolphin")]
        );
    }

    #[test]
    fn overrides_must_name_a_subtype() {
        let mut nav = zoo();
        nav.set_type_override(&mut node("mascot"), "Zoo").unwrap();
        let err = nav
            .set_by_path(&mut node("mascot.id"), Value::Text("1".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Model(ModelError::Construction { .. })
        ));
    }

    #[test]
    fn substitution_is_recorded_for_overridden_members() {
        let mut nav = zoo();
        nav.set_type_override(&mut node("mascot"), "Penguin").unwrap();
        nav.set_by_path(&mut node("mascot.id"), Value::Text("1".into()))
            .unwrap();
        let records = nav.substitutions().records();
        let value = records.get(&node("mascot")).unwrap();
        assert_eq!(value.to_string(), "penguin");
    }

    #[test]
    fn back_reference_members_do_not_record_substitutions() {
        let mut nav = zoo();
        nav.set_type_override(&mut node("href"), "Penguin").unwrap();
        nav.set_by_path(&mut node("href.id"), Value::Text("1".into()))
            .unwrap();
        assert!(nav.substitutions().is_empty());
    }

    #[test]
    fn choice_members_record_element_substitutions() {
        let mut nav = zoo();
        nav.set_type_override(&mut node("star"), "Penguin").unwrap();
        nav.set_by_path(&mut node("star.value.nickname"), Value::Text("Charles".into()))
            .unwrap();
        let records = nav.substitutions().records();
        let value = records.get(&node("star.value")).unwrap();
        assert_eq!(value.to_string(), "penguin");
    }

    #[test]
    fn comments_relocate_onto_substituted_doc_paths() {
        let mut nav = zoo();
        nav.set_type_override(&mut node("mascot"), "Penguin").unwrap();
        nav.set_comment(&mut node("mascot.nickname"), "the boss").unwrap();
        nav.set_by_path(&mut node("mascot.nickname"), Value::Text("Charles".into()))
            .unwrap();

        let docs = nav.doc_comments();
        let doc_path = Path::parse(PathKind::Doc, "penguin/nickname").unwrap();
        assert_eq!(docs.get(&doc_path), Some(&"the boss".to_string()));
    }

    #[test]
    fn construction_overrides_use_registered_factories() {
        let mut nav = zoo();
        nav.set_construction_override(&mut node("mascot"), "penguin.HUNGRY")
            .unwrap();
        nav.set_by_path(&mut node("mascot.nickname"), Value::Text("Pingu".into()))
            .unwrap();
        assert_eq!(
            nav.get_by_path(&mut node("mascot.fishPerDay")).unwrap(),
            Value::Int(10)
        );
    }

    #[test]
    fn unknown_factory_references_are_configuration_errors() {
        let mut nav = zoo();
        let err = nav
            .set_construction_override(&mut node("mascot"), "Penguin.vanished")
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn enum_members_parse_variants_exactly() {
        let mut nav = zoo();
        nav.set_by_path(&mut node("mood"), Value::Text("HAPPY".into()))
            .unwrap();
        let Value::Enum(mood) = nav.get_by_path(&mut node("mood")).unwrap() else {
            panic!("expected an enum value");
        };
        assert_eq!(mood.variant, "HAPPY");

        let err = nav
            .set_by_path(&mut node("mood"), Value::Text("sleepy".into()))
            .unwrap_err();
        assert!(matches!(err, BuildError::Model(ModelError::Conversion { .. })));
    }

    #[test]
    fn temporal_members_accept_masked_text() {
        let mut nav = employee();
        nav.set_by_path(&mut node("hired"), Value::Text("2011-12-03".into()))
            .unwrap();
        assert_eq!(
            nav.get_by_path_as(&mut node("hired"), &TypeRef::Scalar(ScalarKind::Text))
                .unwrap(),
            Value::Text("2011-12-03".to_string())
        );
    }
}
