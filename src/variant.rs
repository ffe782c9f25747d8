//! Variant records and per-sample genotype calls.

use crate::interval::ContigInterval;
use serde::{Deserialize, Serialize};

/// Allele index used for a no-call (`.` in VCF).
pub const NO_CALL: i32 = -1;

/// One genomic difference from the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub contig: String,
    /// 0-based position.
    pub position: u64,
    #[serde(rename = "ref")]
    pub reference: String,
    /// First alternate allele.
    pub alt: String,
    pub id: Option<String>,
    /// Opaque source record (the VCF line for file-backed sources), kept for
    /// presentation only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw: String,
}

/// Key used to de-duplicate records loaded more than once.
pub type VariantKey = (u64, String, String);

impl Variant {
    pub fn interval(&self) -> ContigInterval {
        ContigInterval::point(self.contig.clone(), self.position)
    }

    pub fn intersects(&self, range: &ContigInterval) -> bool {
        self.contig == range.contig() && range.contains_position(self.position)
    }

    pub fn key(&self) -> VariantKey {
        (self.position, self.reference.clone(), self.alt.clone())
    }
}

/// One sample's genotype at a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub call_set_name: String,
    pub genotype: Vec<i32>,
}

/// A variant with its calls, ordered by the owning source's sample list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantContext {
    pub variant: Variant,
    pub calls: Vec<Call>,
}

impl VariantContext {
    pub fn new(variant: Variant, calls: Vec<Call>) -> Self {
        Self { variant, calls }
    }

    pub fn intersects(&self, range: &ContigInterval) -> bool {
        self.variant.intersects(range)
    }

    pub fn call_set_names(&self) -> Vec<String> {
        self.calls.iter().map(|c| c.call_set_name.clone()).collect()
    }

    /// Reorder calls to follow `names`. Fails, handing the context back, when
    /// the call set names are not a permutation of `names`.
    pub fn reindexed(mut self, names: &[String]) -> std::result::Result<Self, Self> {
        if self.calls.len() != names.len() {
            return Err(self);
        }
        let mut ordered = Vec::with_capacity(names.len());
        for name in names {
            match self.calls.iter().position(|c| &c.call_set_name == name) {
                Some(idx) => ordered.push(self.calls.swap_remove(idx)),
                None => {
                    self.calls.extend(ordered);
                    return Err(self);
                }
            }
        }
        self.calls = ordered;
        Ok(self)
    }
}
