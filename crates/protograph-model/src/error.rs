//! Error types for the value model
//!
//! Covers member lookup, type coercion, construction and registry
//! configuration failures. Navigation errors (index contracts, leaf
//! descent) live in the builder crate.

/// Main model error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Type name not present in the registry
    #[error("unknown type [{name}]")]
    UnknownType {
        /// The unresolved type name
        name: String,
    },

    /// Member name not found on a host type
    ///
    /// Carries a dump of every member the host type does expose, so a typo
    /// in a directive can be diagnosed from the log alone.
    #[error("member [{member}] does not exist in [{type_name}]\n{known}")]
    MemberNotFound {
        /// The host type searched
        type_name: String,
        /// The requested member name
        member: String,
        /// Dump of all known members of the host type
        known: String,
    },

    /// No coercion rule converts the value to the target type
    #[error("no conversion from {from} to {to} at [{path}]")]
    Conversion {
        /// Runtime kind of the source value
        from: String,
        /// The declared target type
        to: String,
        /// Context path of the conversion request
        path: String,
    },

    /// A value of the requested type cannot be built
    #[error("cannot construct [{type_name}]: {reason}")]
    Construction {
        /// The type that failed to construct
        type_name: String,
        /// Why construction failed
        reason: String,
    },

    /// Registry misconfiguration (bad factory reference, duplicate entries)
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ModelError {
    pub(crate) fn construction(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Construction {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}
