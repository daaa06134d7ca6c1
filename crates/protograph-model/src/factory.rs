//! Construction-strategy registry
//!
//! A factory is a named closure producing an empty value; directives select
//! one by a `TypeName.methodName` reference. This replaces reflective
//! factory-method lookup with explicit registration: only what is
//! registered can be selected.

use std::fmt;
use std::sync::Arc;

use crate::error::ModelError;
use crate::value::Value;

/// A registered construction strategy
#[derive(Clone)]
pub enum Factory {
    /// Zero-argument factory producing a complete value
    Plain(Arc<dyn Fn() -> Value + Send + Sync>),
    /// One-argument factory wrapping an already-constructed payload
    /// (choice wrappers)
    Wrapping(Arc<dyn Fn(Value) -> Value + Send + Sync>),
}

impl Factory {
    /// Zero-argument factory from a closure
    #[must_use]
    pub fn plain(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self::Plain(Arc::new(f))
    }

    /// One-argument wrapping factory from a closure
    #[must_use]
    pub fn wrapping(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Self::Wrapping(Arc::new(f))
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Factory::Plain"),
            Self::Wrapping(_) => f.write_str("Factory::Wrapping"),
        }
    }
}

struct FactoryEntry {
    type_name: String,
    method: String,
    factory: Factory,
}

/// Registry of named construction strategies
#[derive(Default)]
pub struct Factories {
    entries: Vec<FactoryEntry>,
}

impl Factories {
    /// Register a factory under `TypeName.methodName`
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        method: impl Into<String>,
        factory: Factory,
    ) {
        self.entries.push(FactoryEntry {
            type_name: type_name.into(),
            method: method.into(),
            factory,
        });
    }

    /// Resolve a `TypeName.methodName` reference, case-insensitively
    ///
    /// Returns the canonical reference text together with the factory.
    ///
    /// # Errors
    /// [`ModelError::Configuration`] for a malformed reference, no match,
    /// or more than one match.
    pub fn resolve(&self, reference: &str) -> Result<(String, &Factory), ModelError> {
        let Some((type_name, method)) = reference.split_once('.') else {
            return Err(ModelError::Configuration(format!(
                "factory reference [{reference}] must be TypeName.methodName"
            )));
        };
        let type_name = type_name.trim();
        let method = method.trim();

        let matches: Vec<&FactoryEntry> = self
            .entries
            .iter()
            .filter(|e| {
                e.type_name.eq_ignore_ascii_case(type_name) && e.method.eq_ignore_ascii_case(method)
            })
            .collect();

        match matches.as_slice() {
            [] => Err(ModelError::Configuration(format!(
                "no factory registered for [{reference}]"
            ))),
            [entry] => Ok((
                format!("{}.{}", entry.type_name, entry.method),
                &entry.factory,
            )),
            _ => Err(ModelError::Configuration(format!(
                "ambiguous factory reference [{reference}]: {} matches",
                matches.len()
            ))),
        }
    }
}

impl fmt::Debug for Factories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("{}.{}", e.type_name, e.method))
            .collect();
        f.debug_struct("Factories").field("entries", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_case_insensitively() {
        let mut factories = Factories::default();
        factories.register("Order", "empty", Factory::plain(|| Value::Null));
        let (canonical, _) = factories.resolve("order.EMPTY").unwrap();
        assert_eq!(canonical, "Order.empty");
    }

    #[test]
    fn missing_and_ambiguous_references_are_configuration_errors() {
        let mut factories = Factories::default();
        factories.register("Order", "empty", Factory::plain(|| Value::Null));
        factories.register("ORDER", "Empty", Factory::plain(|| Value::Null));

        assert!(matches!(
            factories.resolve("Order.vanished"),
            Err(ModelError::Configuration(_))
        ));
        assert!(matches!(
            factories.resolve("order.empty"),
            Err(ModelError::Configuration(_))
        ));
        assert!(matches!(
            factories.resolve("not-a-reference"),
            Err(ModelError::Configuration(_))
        ));
    }
}
