//! Error types for navigation and directive processing
//!
//! Most failures are recoverable per directive: they are logged, audited as
//! failures and processing continues. Path syntax and configuration
//! failures (including unresolvable construction overrides) abort the whole
//! run; [`BuildError::is_fatal`] encodes the split.

use protograph_model::ModelError;
use protograph_path::PathError;

/// Main builder error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    /// Malformed path text; never recovered
    #[error(transparent)]
    Path(#[from] PathError),

    /// Model-layer failure (unknown member/type, conversion, construction)
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Attempt to descend through an enum or scalar leaf
    #[error("member [{member}] is a [{declared}] leaf and cannot be followed")]
    NotFollowable {
        /// The leaf member
        member: String,
        /// Its declared type
        declared: String,
    },

    /// Non-contiguous list index
    #[error("index [{index}] out of range for [{member}]: list has {len} elements and indices must be contiguous")]
    IndexOutOfRange {
        /// The container member
        member: String,
        /// The requested index
        index: u32,
        /// Current list length
        len: usize,
    },

    /// Container member addressed without an index
    #[error("member [{member}] is a container and must be addressed with an index")]
    MissingIndex {
        /// The container member
        member: String,
    },

    /// Write attempted on a member with no setter
    #[error("no setter defined for member [{member}]")]
    NotWritable {
        /// The member
        member: String,
    },

    /// Read attempted on a member with no getter
    #[error("no getter defined for member [{member}]")]
    NotReadable {
        /// The member
        member: String,
    },

    /// Deferred-value function failure
    #[error("function [{name}] failed: {reason}")]
    Function {
        /// The function name as written
        name: String,
        /// Why it failed
        reason: String,
    },

    /// Run-level misconfiguration (root directive missing, malformed or
    /// duplicated); always fatal
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl BuildError {
    /// True when the error aborts the whole run instead of failing a single
    /// directive
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Path(_) | Self::Configuration(_) | Self::Model(ModelError::Configuration(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatality_split_matches_the_taxonomy() {
        assert!(BuildError::Configuration("x".into()).is_fatal());
        assert!(BuildError::Model(ModelError::Configuration("x".into())).is_fatal());
        assert!(!BuildError::NotWritable { member: "m".into() }.is_fatal());
        assert!(!BuildError::Model(ModelError::UnknownType { name: "T".into() }).is_fatal());
        assert!(!BuildError::IndexOutOfRange {
            member: "m".into(),
            index: 3,
            len: 1
        }
        .is_fatal());
    }
}
