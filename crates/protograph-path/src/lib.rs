//! Protograph path algebra
//!
//! A [`Path`] is an ordered sequence of [`Step`]s (`{name, optional index}`)
//! addressing a location in a nested object graph, parsed from dotted text
//! such as `phones[0].localNumber`.
//!
//! # Core concepts
//!
//! - [`Path`]: immutable-after-construction value type; parsing, rendering,
//!   sub-paths, splice-replacement, joining and relative resolution
//! - [`Step`]: one path component, with an optional external name recorded
//!   during host-type normalization
//! - [`PathKind`]: the graph (`.`) and document (`/`) dialects, which differ
//!   in how an unindexed step compares
//!
//! Comparison, hashing and ordering all use the *canonical key*: names
//! uppercased, indices zero-padded to width 3. Two paths are equal exactly
//! when their canonical keys match.
//!
//! # Example
//!
//! ```
//! use protograph_path::{Path, PathKind};
//!
//! let path = Path::parse(PathKind::Node, "address.city").unwrap();
//! let sibling = path.resolve(".postcode").unwrap();
//! assert_eq!(sibling.to_string(), "address.postcode");
//! ```

mod error;
mod path;
mod step;

pub use error::PathError;
pub use path::{Path, PathKind};
pub use step::Step;
