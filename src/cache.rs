//! Interval-indexed variant store with a merged coverage set.

use crate::interval::ContigInterval;
use crate::variant::{Variant, VariantContext, VariantKey};
use std::collections::{BTreeMap, HashMap};

/// Records per contig, sorted by position, plus the ranges known to be
/// completely loaded.
#[derive(Debug, Default)]
pub struct VariantCache {
    records: HashMap<String, BTreeMap<VariantKey, VariantContext>>,
    coverage: HashMap<String, Vec<ContigInterval>>,
    complete: bool,
}

impl VariantCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding the whole data set; every range counts as covered.
    pub fn complete(contexts: Vec<VariantContext>) -> Self {
        let mut cache = Self::new();
        cache.insert_records(contexts);
        cache.complete = true;
        cache
    }

    pub fn len(&self) -> usize {
        self.records.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_covered(&self, range: &ContigInterval) -> bool {
        self.complete || self.gaps(range).is_empty()
    }

    /// Sub-ranges of `range` not yet loaded.
    pub fn gaps(&self, range: &ContigInterval) -> Vec<ContigInterval> {
        if self.complete {
            return Vec::new();
        }
        range.subtract(self.coverage(range.contig()))
    }

    pub fn coverage(&self, contig: &str) -> &[ContigInterval] {
        self.coverage.get(contig).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Merge a fetched batch and mark `range` as loaded. Both happen under
    /// the caller's write lock, so readers see either none or all of it.
    pub fn merge(&mut self, range: &ContigInterval, contexts: Vec<VariantContext>) -> usize {
        let added = self.insert_records(contexts);
        self.mark_covered(range);
        added
    }

    pub fn variants_in(&self, range: &ContigInterval) -> Vec<Variant> {
        self.scan(range).map(|ctx| ctx.variant.clone()).collect()
    }

    pub fn contexts_in(&self, range: &ContigInterval) -> Vec<VariantContext> {
        self.scan(range).cloned().collect()
    }

    fn scan<'a>(&'a self, range: &ContigInterval) -> impl Iterator<Item = &'a VariantContext> + 'a {
        let lower = (range.start(), String::new(), String::new());
        let upper = (range.stop(), String::new(), String::new());
        self.records
            .get(range.contig())
            .into_iter()
            .flat_map(move |by_pos| by_pos.range(lower.clone()..upper.clone()).map(|(_, ctx)| ctx))
    }

    /// Insert records, skipping identities already present.
    fn insert_records(&mut self, contexts: Vec<VariantContext>) -> usize {
        let mut added = 0;
        for ctx in contexts {
            let by_pos = self.records.entry(ctx.variant.contig.clone()).or_default();
            if let std::collections::btree_map::Entry::Vacant(slot) = by_pos.entry(ctx.variant.key()) {
                slot.insert(ctx);
                added += 1;
            }
        }
        added
    }

    fn mark_covered(&mut self, range: &ContigInterval) {
        if range.is_empty() {
            return;
        }
        let covered = self.coverage.entry(range.contig().to_string()).or_default();
        let mut merged = range.clone();
        covered.retain(|existing| match merged.union(existing) {
            Some(joined) => {
                merged = joined;
                false
            }
            None => true,
        });
        let at = covered.partition_point(|c| c.start() < merged.start());
        covered.insert(at, merged);
    }
}
