//! Single step of a qualified path

use std::fmt::{self, Display, Formatter};

use crate::PathKind;

/// One step of a [`Path`](crate::Path): a name, an optional list index and an
/// optional external (serialization) name.
///
/// The external name is recorded as a side effect of host-type normalization
/// and never participates in canonical comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    name: String,
    index: Option<u32>,
    external: Option<String>,
}

impl Step {
    /// Create an unindexed step
    ///
    /// Step names must be non-empty; this is enforced at parse time and
    /// asserted here for structurally-built paths.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "step names must be non-empty");
        Self {
            name,
            index: None,
            external: None,
        }
    }

    /// Create an indexed step
    #[must_use]
    pub fn indexed(name: impl Into<String>, index: u32) -> Self {
        let mut step = Self::new(name);
        step.index = Some(index);
        step
    }

    /// Step name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// List index, if the step is indexed
    #[inline]
    #[must_use]
    pub fn index(&self) -> Option<u32> {
        self.index
    }

    /// External (serialization) name, if one has been recorded
    #[inline]
    #[must_use]
    pub fn external(&self) -> Option<&str> {
        self.external.as_deref()
    }

    /// Check if the step carries an index
    #[inline]
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        debug_assert!(!name.is_empty(), "step names must be non-empty");
        self.name = name;
    }

    pub(crate) fn set_index(&mut self, index: Option<u32>) {
        self.index = index;
    }

    pub(crate) fn set_external(&mut self, external: Option<String>) {
        self.external = external;
    }

    /// Canonical comparison form of this step for the given path kind
    ///
    /// Names are uppercased and indices are zero-padded to width 3.
    /// `Node` paths render unindexed steps bare; `Doc` paths map a missing
    /// index to `[000]`.
    #[must_use]
    pub fn canonical(&self, kind: PathKind) -> String {
        match (kind, self.index) {
            (PathKind::Node, None) => self.name.to_uppercase(),
            (PathKind::Node, Some(i)) | (PathKind::Doc, Some(i)) => {
                format!("{}[{i:03}]", self.name.to_uppercase())
            }
            (PathKind::Doc, None) => format!("{}[000]", self.name.to_uppercase()),
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}]", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_uppercases_and_pads() {
        let step = Step::indexed("phones", 2);
        assert_eq!(step.canonical(PathKind::Node), "PHONES[002]");
        assert_eq!(step.canonical(PathKind::Doc), "PHONES[002]");
    }

    #[test]
    fn canonical_unindexed_differs_by_kind() {
        let step = Step::new("name");
        assert_eq!(step.canonical(PathKind::Node), "NAME");
        assert_eq!(step.canonical(PathKind::Doc), "NAME[000]");
    }

    #[test]
    fn display_renders_original_case() {
        assert_eq!(Step::indexed("Phones", 0).to_string(), "Phones[0]");
        assert_eq!(Step::new("city").to_string(), "city");
    }
}
