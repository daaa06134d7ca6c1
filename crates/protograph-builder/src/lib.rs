//! Protograph builder
//!
//! Builds a nested, strongly-typed object graph from a flat sequence of
//! `path=value` directives, and tracks how the graph's declared shape
//! diverges from its actual, polymorphically substituted shape so that
//! metadata attached to declared paths relocates onto the real
//! serialization paths.
//!
//! # Core concepts
//!
//! - [`GraphNavigator`]: one build session over one root value; gets and
//!   sets members by path, lazily instantiating intermediate nodes and
//!   honoring per-path type and construction overrides
//! - [`SubstitutionLog`]: records and compresses path-to-path rewrites
//!   caused by runtime subtype substitution
//! - [`DirectiveProcessor`]: consumes a [`SourceItem`] stream, routes each
//!   directive and emits an audit trail through an [`AuditSink`]
//! - [`Functions`]: deferred-value functions (`!qualified.name(args)`)
//!   whose results replace directive values
//!
//! # Example
//!
//! ```ignore
//! let processor = DirectiveProcessor::new(schema);
//! let mut audit: Vec<String> = Vec::new();
//! let items = [
//!     SourceItem::pair("root", "Employee", 1),
//!     SourceItem::pair("name", "bob", 2),
//!     SourceItem::pair("address.city", "New York", 3),
//! ];
//! let navigator = processor.run(items, &mut audit)?;
//! ```

#![warn(unreachable_pub)]

mod error;
mod functions;
mod navigator;
mod processor;
mod substitution;

pub use error::BuildError;
pub use functions::{resolve_argument_path, FunctionCall, Functions, PropertyFunction};
pub use navigator::GraphNavigator;
pub use processor::{
    AuditSink, DirectiveProcessor, SourceItem, WriteSink, COMMENT_SUFFIX, FACTORY_SUFFIX,
    ROOT_DIRECTIVE, TYPE_SUFFIX,
};
pub use substitution::SubstitutionLog;
