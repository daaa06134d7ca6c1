//! Qualified paths: parsing, rendering and structural algebra

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use once_cell::unsync::OnceCell;

use crate::error::PathError;
use crate::step::Step;

/// The two path dialects
///
/// `Node` paths address members of an object graph (`a.b[2].c`). `Doc` paths
/// address the external document rendition (`a/b[2]/c`) and compare an
/// unindexed step as index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathKind {
    /// Object-graph path, `.` delimited
    Node,
    /// Document path, `/` delimited
    Doc,
}

impl PathKind {
    /// Delimiter character for this kind
    #[inline]
    #[must_use]
    pub fn delimiter(self) -> char {
        match self {
            Self::Node => '.',
            Self::Doc => '/',
        }
    }
}

/// An ordered sequence of [`Step`]s addressing a location in an object graph
///
/// A path's identity for equality, ordering and hashing is its *canonical
/// key*: uppercased names with width-3 zero-padded indices, joined by the
/// kind's delimiter. The key is computed lazily and invalidated whenever a
/// step is mutated in place (name normalization during host resolution).
///
/// Known limitation: the fixed index padding means indices of 1000 and above
/// do not order correctly against smaller indices. This is inherited
/// behavior and is deliberately not fixed here.
#[derive(Debug, Clone)]
pub struct Path {
    kind: PathKind,
    steps: Vec<Step>,
    key: OnceCell<String>,
}

impl Path {
    /// Parse a delimited path string
    ///
    /// Each segment is `name` or `name[index]`.
    ///
    /// # Errors
    /// [`PathError::Syntax`] on an empty segment, an unmatched bracket,
    /// trailing text after a bracket, or a non-integer index.
    pub fn parse(kind: PathKind, text: &str) -> Result<Self, PathError> {
        let mut steps = Vec::new();
        for segment in text.split(kind.delimiter()) {
            steps.push(parse_segment(text, segment)?);
        }
        Ok(Self::from_steps(kind, steps))
    }

    /// Build a path from pre-constructed steps
    ///
    /// Paths are never empty; callers must supply at least one step.
    #[must_use]
    pub fn from_steps(kind: PathKind, steps: Vec<Step>) -> Self {
        debug_assert!(!steps.is_empty(), "paths must have at least one step");
        Self {
            kind,
            steps,
            key: OnceCell::new(),
        }
    }

    /// Path kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> PathKind {
        self.kind
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when the path has no steps (never, for parsed paths)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// All steps
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Step at position `i`
    ///
    /// # Panics
    /// If `i` is out of bounds.
    #[inline]
    #[must_use]
    pub fn step(&self, i: usize) -> &Step {
        &self.steps[i]
    }

    /// Final step
    #[must_use]
    pub fn last(&self) -> &Step {
        self.steps.last().expect("paths are never empty")
    }

    /// Overwrite the name of step `i`, invalidating the canonical key
    pub fn set_name(&mut self, i: usize, name: impl Into<String>) {
        self.steps[i].set_name(name);
        self.key.take();
    }

    /// Overwrite the index of step `i`, invalidating the canonical key
    pub fn set_index(&mut self, i: usize, index: Option<u32>) {
        self.steps[i].set_index(index);
        self.key.take();
    }

    /// Record the external name of step `i`
    ///
    /// External names do not participate in comparison, so the canonical key
    /// stays valid.
    pub fn set_external(&mut self, i: usize, external: Option<String>) {
        self.steps[i].set_external(external);
    }

    /// The canonical comparison key
    #[must_use]
    pub fn canonical_key(&self) -> &str {
        self.key.get_or_init(|| {
            let parts: Vec<String> = self
                .steps
                .iter()
                .map(|s| s.canonical(self.kind))
                .collect();
            parts.join(&self.kind.delimiter().to_string())
        })
    }

    /// Sub-path covering steps `begin..end` (end exclusive)
    ///
    /// # Errors
    /// [`PathError::Range`] if the range is empty, inverted or out of bounds.
    pub fn sub_path(&self, begin: usize, end: usize) -> Result<Self, PathError> {
        if begin >= end || end > self.steps.len() {
            return Err(PathError::Range {
                begin,
                end,
                len: self.steps.len(),
            });
        }
        Ok(Self::from_steps(self.kind, self.steps[begin..end].to_vec()))
    }

    /// Sub-path covering the first `len` steps
    ///
    /// # Errors
    /// [`PathError::Range`] if `len` is zero or exceeds the path length.
    pub fn prefix(&self, len: usize) -> Result<Self, PathError> {
        self.sub_path(0, len)
    }

    /// Resolve a relative path string against this path
    ///
    /// `relative` must begin with one or more delimiters: N leading
    /// delimiters ascend N-1 steps from the end, then the remainder is
    /// appended. `a.b.c`.resolve(`.x`) is `a.b.x`; `a.b.c`.resolve(`..x`)
    /// is `a.x`.
    ///
    /// # Errors
    /// [`PathError::Syntax`] when `relative` does not start with a
    /// delimiter, [`PathError::Ascent`] when the ascent exceeds the path
    /// depth.
    pub fn resolve(&self, relative: &str) -> Result<Self, PathError> {
        let delimiter = self.kind.delimiter();
        let back = relative.chars().take_while(|c| *c == delimiter).count();
        if back == 0 {
            return Err(PathError::syntax(
                relative,
                format!("relative paths must begin with '{delimiter}'"),
            ));
        }
        if back > self.len() - 1 {
            return Err(PathError::Ascent {
                relative: relative.to_string(),
                path: self.to_string(),
            });
        }
        let remainder = Self::parse(self.kind, &relative[back..])?;
        let mut steps = self.steps[..self.len() - back].to_vec();
        steps.extend(remainder.steps);
        Ok(Self::from_steps(self.kind, steps))
    }

    /// Replace the first contiguous run of steps canonically equal to
    /// `target` with `replacement`'s steps
    ///
    /// Operates on the step array, not on rendered text, so a run can never
    /// match across step boundaries. Returns a clone of `self` when `target`
    /// does not occur.
    #[must_use]
    pub fn replace(&self, target: &Self, replacement: &Self) -> Self {
        debug_assert_eq!(self.kind, target.kind, "replace requires same-kind paths");
        debug_assert_eq!(self.kind, replacement.kind);
        match self.find_run(target) {
            Some(at) => {
                let mut steps = self.steps[..at].to_vec();
                steps.extend(replacement.steps.iter().cloned());
                steps.extend(self.steps[at + target.len()..].iter().cloned());
                Self::from_steps(self.kind, steps)
            }
            None => self.clone(),
        }
    }

    /// Concatenate several same-kind paths
    ///
    /// # Panics
    /// If `parts` is empty (debug builds also check kind homogeneity).
    #[must_use]
    pub fn join(parts: &[&Self]) -> Self {
        let first = parts.first().expect("join requires at least one path");
        debug_assert!(parts.iter().all(|p| p.kind == first.kind));
        let steps = parts
            .iter()
            .flat_map(|p| p.steps.iter().cloned())
            .collect();
        Self::from_steps(first.kind, steps)
    }

    /// True when `prefix`'s steps canonically equal this path's leading steps
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        prefix.len() <= self.len()
            && self
                .steps
                .iter()
                .zip(&prefix.steps)
                .all(|(a, b)| a.canonical(self.kind) == b.canonical(self.kind))
    }

    /// Clone with each step's name swapped for its external name, where set
    #[must_use]
    pub fn with_external_names(&self) -> Self {
        let steps = self
            .steps
            .iter()
            .map(|s| {
                let mut step = s.clone();
                if let Some(external) = s.external() {
                    let external = external.to_string();
                    step.set_name(external);
                    step.set_external(None);
                }
                step
            })
            .collect();
        Self::from_steps(self.kind, steps)
    }

    /// Re-key this path as a document path
    #[must_use]
    pub fn to_doc(&self) -> Self {
        Self::from_steps(PathKind::Doc, self.steps.clone())
    }

    fn find_run(&self, target: &Self) -> Option<usize> {
        if target.len() > self.len() {
            return None;
        }
        let window = target.len();
        (0..=self.len() - window).find(|&at| {
            self.steps[at..at + window]
                .iter()
                .zip(&target.steps)
                .all(|(a, b)| a.canonical(self.kind) == b.canonical(self.kind))
        })
    }
}

fn parse_segment(text: &str, segment: &str) -> Result<Step, PathError> {
    let open = segment.find('[');
    let close = segment.find(']');
    match (open, close) {
        (None, None) => {
            if segment.is_empty() {
                Err(PathError::syntax(text, "empty step name"))
            } else {
                Ok(Step::new(segment))
            }
        }
        (Some(open), Some(close)) if close > open => {
            let name = &segment[..open];
            if name.is_empty() {
                return Err(PathError::syntax(text, "empty step name"));
            }
            if close != segment.len() - 1 {
                return Err(PathError::syntax(
                    text,
                    format!("unexpected text after index in [{segment}]"),
                ));
            }
            let index: u32 = segment[open + 1..close].parse().map_err(|_| {
                PathError::syntax(text, format!("non-integer index in [{segment}]"))
            })?;
            Ok(Step::indexed(name, index))
        }
        _ => Err(PathError::syntax(
            text,
            format!("unmatched bracket in [{segment}]"),
        )),
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", self.kind.delimiter())?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(PathKind::Node, s)
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.canonical_key() == other.canonical_key()
    }
}

impl Eq for Path {}

impl PartialOrd for Path {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Path {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_key()
            .cmp(other.canonical_key())
            .then_with(|| self.kind.cmp(&other.kind))
    }
}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn node(text: &str) -> Path {
        Path::parse(PathKind::Node, text).unwrap()
    }

    #[test]
    fn parse_and_render_round_trip() {
        for text in ["a", "a.b", "a.b[2]", "alpha[0].beta.gamma[12]"] {
            assert_eq!(node(text).to_string(), text);
        }
    }

    #[test]
    fn parse_rejects_malformed_segments() {
        for text in ["a..b", "", "a.b[2", "a.b2]", "a.b[x]", "a.b[1]c"] {
            assert!(matches!(
                Path::parse(PathKind::Node, text),
                Err(PathError::Syntax { .. })
            ));
        }
    }

    #[test]
    fn canonical_equality_ignores_case_and_padding() {
        assert_eq!(node("a.b[2]"), node("A.B[002]"));
        assert_ne!(node("a.b[2]"), node("a.b[3]"));
    }

    #[test]
    fn doc_paths_compare_missing_index_as_zero() {
        let a = Path::parse(PathKind::Doc, "a/b").unwrap();
        let b = Path::parse(PathKind::Doc, "a/b[0]").unwrap();
        assert_eq!(a, b);
        assert_ne!(node("a.b"), node("a.b[0]"));
    }

    #[test]
    fn canonical_key_recomputed_after_mutation() {
        let mut path = node("a.b");
        assert_eq!(path.canonical_key(), "A.B");
        path.set_name(1, "city");
        assert_eq!(path.canonical_key(), "A.CITY");
        path.set_index(1, Some(7));
        assert_eq!(path.canonical_key(), "A.CITY[007]");
    }

    #[test]
    fn sub_path_slices_steps() {
        let path = node("a.b[1].c.d");
        assert_eq!(path.sub_path(1, 3).unwrap().to_string(), "b[1].c");
        assert_eq!(path.prefix(2).unwrap().to_string(), "a.b[1]");
        assert!(matches!(path.sub_path(2, 2), Err(PathError::Range { .. })));
        assert!(matches!(path.sub_path(0, 9), Err(PathError::Range { .. })));
    }

    #[test]
    fn resolve_ascends_and_appends() {
        let path = node("a.b.c");
        assert_eq!(path.resolve(".x").unwrap().to_string(), "a.b.x");
        assert_eq!(path.resolve("..x").unwrap().to_string(), "a.x");
        assert_eq!(path.resolve("..x.y[1]").unwrap().to_string(), "a.x.y[1]");
        assert!(matches!(
            path.resolve("......x"),
            Err(PathError::Ascent { .. })
        ));
        assert!(matches!(path.resolve("x"), Err(PathError::Syntax { .. })));
    }

    #[test]
    fn replace_splices_a_step_run() {
        let path = node("a.b.c.d");
        let replaced = path.replace(&node("B.C"), &node("x[1]"));
        assert_eq!(replaced.to_string(), "a.x[1].d");
    }

    #[test]
    fn replace_without_match_returns_clone() {
        let path = node("a.b.c");
        assert_eq!(path.replace(&node("z"), &node("x")), path);
    }

    #[test]
    fn replace_does_not_match_across_step_boundaries() {
        // "A.B" must not match inside the single step "ab", nor "B" inside
        // "bc"
        let path = node("ab.c");
        assert_eq!(path.replace(&node("a.b"), &node("x")), path);
        let path = node("a.bc");
        assert_eq!(path.replace(&node("b"), &node("x")), path);
    }

    #[test]
    fn join_concatenates() {
        let joined = Path::join(&[&node("a.b"), &node("c[0]"), &node("d")]);
        assert_eq!(joined.to_string(), "a.b.c[0].d");
    }

    #[test]
    fn starts_with_is_structural() {
        assert!(node("a.b.c").starts_with(&node("A.B")));
        assert!(!node("a.bc").starts_with(&node("a.b")));
        assert!(!node("a").starts_with(&node("a.b")));
    }

    #[test]
    fn external_names_swap_into_a_clone() {
        let mut path = node("a.b");
        path.set_external(1, Some("bee".to_string()));
        let swapped = path.with_external_names();
        assert_eq!(swapped.to_string(), "a.bee");
        assert_eq!(path.to_string(), "a.b");
    }

    proptest! {
        #[test]
        fn well_formed_text_round_trips(
            segs in prop::collection::vec(("[a-z][a-zA-Z0-9]{0,8}", prop::option::of(0u32..400)), 1..6)
        ) {
            let text = segs
                .iter()
                .map(|(name, idx)| match idx {
                    Some(i) => format!("{name}[{i}]"),
                    None => name.clone(),
                })
                .collect::<Vec<_>>()
                .join(".");
            prop_assert_eq!(node(&text).to_string(), text);
        }
    }
}
