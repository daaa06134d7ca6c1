//! Error types for path parsing and structural operations

/// Errors raised by [`Path`](crate::Path) construction and algebra
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Malformed path text (empty segment, unmatched bracket, bad index)
    #[error("malformed path [{text}]: {reason}")]
    Syntax {
        /// The offending path text
        text: String,
        /// What was wrong with it
        reason: String,
    },

    /// Step range outside the path bounds
    #[error("step range {begin}..{end} invalid for path of {len} steps")]
    Range {
        /// Requested begin step (inclusive)
        begin: usize,
        /// Requested end step (exclusive)
        end: usize,
        /// Number of steps in the path
        len: usize,
    },

    /// Relative resolution asked to ascend past the start of the path
    #[error("cannot resolve [{relative}] relative to [{path}]")]
    Ascent {
        /// The relative path text
        relative: String,
        /// The path resolution was attempted against
        path: String,
    },
}

impl PathError {
    pub(crate) fn syntax(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Syntax {
            text: text.into(),
            reason: reason.into(),
        }
    }
}
