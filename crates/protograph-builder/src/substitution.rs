//! Substitution tracking
//!
//! Records how the graph's declared shape diverges from its actual,
//! polymorphically substituted shape, as path-to-path rewrites. The raw
//! records are compressed on demand so that any path needs only one rewrite
//! pass; adding a record invalidates the compressed form (it is recomputed,
//! never patched).

use std::collections::BTreeMap;

use protograph_path::{Path, PathKind, Step};
use tracing::debug;

/// Session-scoped log of path substitutions
#[derive(Debug, Default)]
pub struct SubstitutionLog {
    records: BTreeMap<Path, Path>,
    compressed: Option<BTreeMap<Path, Path>>,
}

impl SubstitutionLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw records, keyed canonically ascending
    #[inline]
    #[must_use]
    pub fn records(&self) -> &BTreeMap<Path, Path> {
        &self.records
    }

    /// True when nothing has been recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record a type substitution at step `step` of `path`
    ///
    /// The key is the sub-path up to and including the step; the
    /// replacement swaps the final step for the substituting type's
    /// external `tag`. First record per key wins.
    pub fn record_type(&mut self, path: &Path, step: usize, tag: &str) {
        let Ok(key) = path.sub_path(0, step + 1) else {
            return;
        };
        if self.records.contains_key(&key) {
            return;
        }
        let index = path.step(step).index();
        let value = self.substitution_path(&key, step, index, tag);
        debug!(key = %key, substituted = %value, "type substitution");
        self.records.insert(key, value);
        self.compressed = None;
    }

    /// Record an element substitution through a choice wrapper at step
    /// `step`
    ///
    /// The payload lives one level below the wrapper, so the key extends
    /// one step further down the path (the wrapper's `value` pseudo-member)
    /// and the replacement's final step carries the wrapper's own tag.
    pub fn record_element(&mut self, path: &Path, step: usize, tag: &str) {
        let Ok(key) = path.sub_path(0, step + 2) else {
            return;
        };
        debug_assert!(
            key.last().name().eq_ignore_ascii_case("value"),
            "element substitutions key through the wrapper payload"
        );
        if self.records.contains_key(&key) {
            return;
        }
        let index = path.step(step).index();
        let value = self.substitution_path(&key, step, index, tag);
        debug!(key = %key, substituted = %value, "element substitution");
        self.records.insert(key, value);
        self.compressed = None;
    }

    /// Rewrite `path` onto its substituted form (one pass over the
    /// compressed records)
    #[must_use]
    pub fn apply(&mut self, path: &Path) -> Path {
        Self::apply_with(path, self.compressed())
    }

    /// The compressed records, rebuilt if stale
    pub fn compressed(&mut self) -> &BTreeMap<Path, Path> {
        self.compressed
            .get_or_insert_with(|| Self::compress(&self.records))
    }

    /// Compress a record set
    ///
    /// Processes records in canonical-ascending key order, applying every
    /// already-compressed record to both the key and the value of each new
    /// one, so chained substitutions resolve in a single later pass.
    #[must_use]
    pub fn compress(source: &BTreeMap<Path, Path>) -> BTreeMap<Path, Path> {
        let mut target: BTreeMap<Path, Path> = BTreeMap::new();
        for (new_key, new_value) in source {
            let mut key = new_key.clone();
            let mut value = new_value.clone();
            for (applied_key, applied_value) in &target {
                if key.starts_with(applied_key) {
                    key = key.replace(applied_key, applied_value);
                    value = value.replace(applied_key, applied_value);
                }
            }
            target.insert(key, value);
        }
        target
    }

    /// Rewrite `path` against an already-compressed record set
    #[must_use]
    pub fn apply_with(path: &Path, compressed: &BTreeMap<Path, Path>) -> Path {
        let mut target = path.clone();
        for (key, value) in compressed {
            if target.starts_with(key) {
                target = target.replace(key, value);
            }
        }
        target
    }

    // The replacement path: the key's stub plus one tag step at the
    // substitution position
    fn substitution_path(&self, key: &Path, step: usize, index: Option<u32>, tag: &str) -> Path {
        let tag_step = match index {
            Some(i) => Step::indexed(tag, self.substitution_index(key, step, i, tag)),
            None => Step::new(tag),
        };
        let mut steps = key.steps()[..step].to_vec();
        steps.push(tag_step);
        Path::from_steps(PathKind::Node, steps)
    }

    // Renumbering for substituted list positions: walk every prior index at
    // the same nominal position; each prior record with the same tag
    // (case-insensitive) advances the candidate to its substituted index
    // plus one. Heterogeneous sequences substituting to alternating tags
    // keep correct per-tag numbering. This is a narrow heuristic, kept
    // exactly as-is.
    fn substitution_index(&self, key: &Path, step: usize, index: u32, tag: &str) -> u32 {
        let mut result = 0;
        let mut probe = key.clone();
        for prior in 0..index {
            probe.set_index(step, Some(prior));
            if let Some(previous) = self.records.get(&probe) {
                let last = previous.last();
                if last.name().eq_ignore_ascii_case(tag) {
                    result = last.index().map_or(0, |i| i + 1);
                }
            }
        }
        if result != index {
            debug!(
                result,
                index,
                key = %key,
                "substituted index diverges from the nominal index"
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn node(text: &str) -> Path {
        Path::parse(PathKind::Node, text).unwrap()
    }

    #[test]
    fn compress_then_apply_resolves_chained_substitutions() {
        let mut records = BTreeMap::new();
        records.insert(node("a.b.c.d"), node("a.b.x"));
        records.insert(node("a.b.c.d.e.f"), node("a.b.c.d.e.y"));
        let compressed = SubstitutionLog::compress(&records);

        assert_eq!(
            SubstitutionLog::apply_with(&node("a.b.c.d.m.n"), &compressed).to_string(),
            "a.b.x.m.n"
        );
        assert_eq!(
            SubstitutionLog::apply_with(&node("a.b.c.d.e.f.g.h"), &compressed).to_string(),
            "a.b.x.e.y.g.h"
        );
    }

    #[test]
    fn first_record_per_key_wins() {
        let mut log = SubstitutionLog::new();
        let path = node("zoo.mascot.id");
        log.record_type(&path, 1, "penguin");
        log.record_type(&path, 1, "dolphin");
        assert_eq!(log.records().len(), 1);
        assert_eq!(
            log.records().get(&node("zoo.mascot")).unwrap().to_string(),
            "zoo.penguin"
        );
    }

    #[test]
    fn unindexed_substitutions_stay_unindexed() {
        let mut log = SubstitutionLog::new();
        log.record_type(&node("zoo.mascot.id"), 1, "penguin");
        let value = log.records().get(&node("zoo.mascot")).unwrap();
        assert!(value.last().index().is_none());
    }

    #[test]
    fn alternating_tags_renumber_per_tag() {
        let mut log = SubstitutionLog::new();
        // animals[0] -> b, animals[1] -> c, animals[2] -> b again
        log.record_type(&node("zoo.animals[0].id"), 1, "bear");
        log.record_type(&node("zoo.animals[1].id"), 1, "cat");
        log.record_type(&node("zoo.animals[2].id"), 1, "bear");

        let get = |k: &str| log.records().get(&node(k)).unwrap().to_string();
        assert_eq!(get("zoo.animals[0]"), "zoo.bear[0]");
        assert_eq!(get("zoo.animals[1]"), "zoo.cat[0]");
        assert_eq!(get("zoo.animals[2]"), "zoo.bear[1]");
    }

    #[test]
    fn homogeneous_tags_keep_sequential_numbering() {
        let mut log = SubstitutionLog::new();
        for i in 0..3 {
            let path = node(&format!("zoo.animals[{i}].id"));
            log.record_type(&path, 1, "dolphin");
        }
        let value = log.records().get(&node("zoo.animals[2]")).unwrap();
        assert_eq!(value.to_string(), "zoo.dolphin[2]");
    }

    #[test]
    fn element_substitution_keys_through_the_wrapper() {
        let mut log = SubstitutionLog::new();
        log.record_element(&node("order.item.value.title"), 1, "book");
        let value = log.records().get(&node("order.item.value")).unwrap();
        assert_eq!(value.to_string(), "order.book");
    }

    #[test]
    fn adding_a_record_invalidates_the_compressed_form() {
        let mut log = SubstitutionLog::new();
        log.record_type(&node("a.b.c"), 1, "x");
        assert_eq!(log.apply(&node("a.b.c")).to_string(), "a.x.c");
        log.record_type(&node("a.b.c.d"), 2, "y");
        assert_eq!(log.apply(&node("a.b.c.d")).to_string(), "a.x.y.d");
    }
}
