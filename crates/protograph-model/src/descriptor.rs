//! Member descriptors
//!
//! A [`MemberDescriptor`] is the introspected record of one settable member
//! of a host type: its canonical name, declared type, external
//! (serialization) name, required flag, ordering rank and substitution
//! metadata.

use serde::Serialize;
use tracing::warn;

use crate::name::TypeName;
use crate::types::TypeRef;

/// How a member may be accessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Access {
    /// Getter and setter both present
    ReadWrite,
    /// Getter only
    ReadOnly,
    /// Setter only
    WriteOnly,
}

/// Serialization ordering rank
///
/// Ranked members sort by rank; unranked members sort last, amongst
/// themselves in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Rank {
    /// Explicit position in the serialized form
    Ordered(u32),
    /// No declared position; sorts after every ordered member
    Unordered,
}

/// Introspected metadata for one member of a host type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberDescriptor {
    name: String,
    declared: TypeRef,
    external_name: Option<String>,
    required: bool,
    rank: Rank,
    access: Access,
    variant_tags: Vec<(TypeName, String)>,
    back_reference: bool,
}

impl MemberDescriptor {
    /// Create a read/write member with defaults (external name = member
    /// name, not required, unordered)
    #[must_use]
    pub fn new(name: impl Into<String>, declared: TypeRef) -> Self {
        Self {
            name: name.into(),
            declared,
            external_name: None,
            required: false,
            rank: Rank::Unordered,
            access: Access::ReadWrite,
            variant_tags: Vec::new(),
            back_reference: false,
        }
    }

    /// Mark the member as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the serialization rank
    #[must_use]
    pub fn rank(mut self, rank: u32) -> Self {
        self.rank = Rank::Ordered(rank);
        self
    }

    /// Set an external (serialization) name differing from the member name
    #[must_use]
    pub fn external(mut self, name: impl Into<String>) -> Self {
        self.external_name = Some(name.into());
        self
    }

    /// Register the external tag a substituting type serializes under
    #[must_use]
    pub fn variant_tag(mut self, type_name: impl Into<TypeName>, tag: impl Into<String>) -> Self {
        self.variant_tags.push((type_name.into(), tag.into()));
        self
    }

    /// Exempt this member from substitution recording (href-like
    /// back-reference aliases)
    #[must_use]
    pub fn back_reference(mut self) -> Self {
        self.back_reference = true;
        self
    }

    /// Restrict to read-only access
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.access = Access::ReadOnly;
        self
    }

    /// Restrict to write-only access
    #[must_use]
    pub fn write_only(mut self) -> Self {
        self.access = Access::WriteOnly;
        self
    }

    /// Canonical member name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared value type
    #[inline]
    #[must_use]
    pub fn declared(&self) -> &TypeRef {
        &self.declared
    }

    /// External name, defaulting to the member name
    #[inline]
    #[must_use]
    pub fn external_name(&self) -> &str {
        self.external_name.as_deref().unwrap_or(&self.name)
    }

    /// Required flag
    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Serialization rank
    #[inline]
    #[must_use]
    pub fn ordering(&self) -> Rank {
        self.rank
    }

    /// Access mode
    #[inline]
    #[must_use]
    pub fn access(&self) -> Access {
        self.access
    }

    /// True when the declared type is a container
    #[inline]
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.declared.is_list()
    }

    /// Declared element type, for container members
    #[inline]
    #[must_use]
    pub fn element(&self) -> Option<&TypeRef> {
        self.declared.element()
    }

    /// True when a getter exists
    #[inline]
    #[must_use]
    pub fn readable(&self) -> bool {
        matches!(self.access, Access::ReadWrite | Access::ReadOnly)
    }

    /// True when a setter exists
    #[inline]
    #[must_use]
    pub fn writable(&self) -> bool {
        matches!(self.access, Access::ReadWrite | Access::WriteOnly)
    }

    /// True when substitution recording is suppressed for this member
    #[inline]
    #[must_use]
    pub fn is_back_reference(&self) -> bool {
        self.back_reference
    }

    /// External tag for a substituting runtime type
    ///
    /// Falls back to the lower-camel bare type name when no variant tag was
    /// registered, logging the gap.
    #[must_use]
    pub fn substitution_tag(&self, runtime: &TypeName) -> String {
        match self
            .variant_tags
            .iter()
            .find(|(name, _)| name == runtime)
            .map(|(_, tag)| tag.clone())
        {
            Some(tag) => tag,
            None => {
                warn!(
                    member = %self.name,
                    runtime = %runtime,
                    "no variant tag registered for substitution; using the bare type name"
                );
                runtime.default_tag()
            }
        }
    }

    pub(crate) fn set_access(&mut self, access: Access) {
        self.access = access;
    }

    pub(crate) fn set_declared(&mut self, declared: TypeRef) {
        self.declared = declared;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_members_sort_before_unordered() {
        assert!(Rank::Ordered(7) < Rank::Unordered);
        assert!(Rank::Ordered(1) < Rank::Ordered(2));
    }

    #[test]
    fn external_name_defaults_to_member_name() {
        let plain = MemberDescriptor::new("city", TypeRef::text());
        assert_eq!(plain.external_name(), "city");
        let renamed = MemberDescriptor::new("city", TypeRef::text()).external("town");
        assert_eq!(renamed.external_name(), "town");
    }

    #[test]
    fn substitution_tag_prefers_registered_variants() {
        let member = MemberDescriptor::new("pet", TypeRef::named("Animal"))
            .variant_tag("Penguin", "penguinPet");
        assert_eq!(member.substitution_tag(&TypeName::new("Penguin")), "penguinPet");
        assert_eq!(member.substitution_tag(&TypeName::new("Dolphin")), "dolphin");
    }

    #[test]
    fn collection_members_expose_their_element_type() {
        let member = MemberDescriptor::new("phones", TypeRef::list(TypeRef::named("Phone")));
        assert!(member.is_collection());
        assert_eq!(member.element().unwrap().to_string(), "Phone");
    }
}
