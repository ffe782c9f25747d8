//! Half-open genomic intervals.
//!
//! Coordinates are 0-based; `start` is inclusive and `stop` exclusive, so a
//! variant at position `p` occupies `[p, p + 1)`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable `[start, stop)` span on a named contig.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ContigInterval {
    contig: String,
    start: u64,
    stop: u64,
}

impl ContigInterval {
    pub fn new(contig: impl Into<String>, start: u64, stop: u64) -> Result<Self> {
        let contig = contig.into();
        if stop < start {
            return Err(Error::InvalidRange(format!(
                "{}: stop {} is before start {}",
                contig, stop, start
            )));
        }
        Ok(Self {
            contig,
            start,
            stop,
        })
    }

    /// The single-base interval `[position, position + 1)`.
    pub fn point(contig: impl Into<String>, position: u64) -> Self {
        Self {
            contig: contig.into(),
            start: position,
            stop: position.saturating_add(1),
        }
    }

    pub fn contig(&self) -> &str {
        &self.contig
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn stop(&self) -> u64 {
        self.stop
    }

    pub fn len(&self) -> u64 {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    pub fn intersects(&self, other: &ContigInterval) -> bool {
        self.contig == other.contig && self.start < other.stop && other.start < self.stop
    }

    /// True if `other` lies entirely within `self`.
    pub fn contains(&self, other: &ContigInterval) -> bool {
        self.contig == other.contig && self.start <= other.start && other.stop <= self.stop
    }

    pub fn contains_position(&self, position: u64) -> bool {
        self.start <= position && position < self.stop
    }

    /// Overlapping or directly adjacent on the same contig.
    pub fn touches(&self, other: &ContigInterval) -> bool {
        self.contig == other.contig && self.start <= other.stop && other.start <= self.stop
    }

    /// Union of two touching intervals; `None` when they are disjoint or on
    /// different contigs.
    pub fn union(&self, other: &ContigInterval) -> Option<ContigInterval> {
        if !self.touches(other) {
            return None;
        }
        Some(ContigInterval {
            contig: self.contig.clone(),
            start: self.start.min(other.start),
            stop: self.stop.max(other.stop),
        })
    }

    /// The parts of `self` not covered by any of `others`, in ascending order.
    pub fn subtract<'a, I>(&self, others: I) -> Vec<ContigInterval>
    where
        I: IntoIterator<Item = &'a ContigInterval>,
    {
        let mut cuts: Vec<(u64, u64)> = others
            .into_iter()
            .filter(|o| !o.is_empty() && o.intersects(self))
            .map(|o| (o.start, o.stop))
            .collect();
        cuts.sort_unstable();

        let mut gaps = Vec::new();
        let mut cursor = self.start;
        for (start, stop) in cuts {
            if start > cursor {
                gaps.push(self.with_bounds(cursor, start.min(self.stop)));
            }
            cursor = cursor.max(stop);
            if cursor >= self.stop {
                break;
            }
        }
        if cursor < self.stop {
            gaps.push(self.with_bounds(cursor, self.stop));
        }
        gaps
    }

    fn with_bounds(&self, start: u64, stop: u64) -> ContigInterval {
        ContigInterval {
            contig: self.contig.clone(),
            start,
            stop,
        }
    }
}

impl fmt::Display for ContigInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.stop)
    }
}

impl<'de> Deserialize<'de> for ContigInterval {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let range = GenomeRange::deserialize(deserializer)?;
        ContigInterval::try_from(range).map_err(serde::de::Error::custom)
    }
}

/// Range object handed in by consumers (e.g. a browser's current view).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeRange {
    pub contig: String,
    pub start: u64,
    pub stop: u64,
}

impl TryFrom<GenomeRange> for ContigInterval {
    type Error = Error;

    fn try_from(range: GenomeRange) -> Result<Self> {
        ContigInterval::new(range.contig, range.start, range.stop)
    }
}

impl From<&ContigInterval> for GenomeRange {
    fn from(interval: &ContigInterval) -> Self {
        GenomeRange {
            contig: interval.contig.clone(),
            start: interval.start,
            stop: interval.stop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(contig: &str, start: u64, stop: u64) -> ContigInterval {
        ContigInterval::new(contig, start, stop).unwrap()
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        assert!(matches!(
            ContigInterval::new("20", 10, 5),
            Err(Error::InvalidRange(_))
        ));
        assert!(ContigInterval::new("20", 5, 5).is_ok());
    }

    #[test]
    fn test_intersects_matches_half_open_rule() {
        let cases = [
            ((0, 10), (5, 15)),
            ((0, 10), (10, 20)),
            ((10, 20), (0, 10)),
            ((0, 10), (9, 10)),
            ((3, 4), (0, 100)),
            ((0, 1), (1, 2)),
            ((50, 60), (10, 20)),
        ];
        for ((a0, a1), (b0, b1)) in cases {
            let a = iv("20", a0, a1);
            let b = iv("20", b0, b1);
            assert_eq!(a.intersects(&b), a0 < b1 && b0 < a1, "{} vs {}", a, b);
            assert_eq!(a.intersects(&b), b.intersects(&a));
        }
    }

    #[test]
    fn test_intersects_requires_same_contig() {
        assert!(!iv("20", 0, 100).intersects(&iv("21", 0, 100)));
        // contig names are case-sensitive
        assert!(!iv("chrX", 0, 100).intersects(&iv("chrx", 0, 100)));
    }

    #[test]
    fn test_contains() {
        let outer = iv("20", 100, 200);
        assert!(outer.contains(&iv("20", 100, 200)));
        assert!(outer.contains(&iv("20", 150, 160)));
        assert!(!outer.contains(&iv("20", 150, 201)));
        assert!(!outer.contains(&iv("1", 150, 160)));
        assert!(outer.contains_position(100));
        assert!(!outer.contains_position(200));
    }

    #[test]
    fn test_union_of_adjacent_and_overlapping() {
        assert_eq!(
            iv("20", 0, 10).union(&iv("20", 10, 20)),
            Some(iv("20", 0, 20))
        );
        assert_eq!(
            iv("20", 5, 30).union(&iv("20", 0, 10)),
            Some(iv("20", 0, 30))
        );
        assert_eq!(iv("20", 0, 10).union(&iv("20", 11, 20)), None);
        assert_eq!(iv("20", 0, 10).union(&iv("21", 5, 20)), None);
    }

    #[test]
    fn test_subtract_leaves_gaps() {
        let range = iv("20", 0, 100);
        let covered = [iv("20", 10, 20), iv("20", 15, 40), iv("20", 90, 120), iv("21", 0, 100)];
        assert_eq!(
            range.subtract(&covered),
            vec![iv("20", 0, 10), iv("20", 40, 90)]
        );
    }

    #[test]
    fn test_subtract_fully_covered() {
        let range = iv("20", 10, 20);
        assert!(range.subtract(&[iv("20", 0, 50)]).is_empty());
        assert_eq!(range.subtract(std::iter::empty::<&ContigInterval>()), vec![range.clone()]);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: ContigInterval =
            serde_json::from_str(r#"{"contig":"20","start":1,"stop":5}"#).unwrap();
        assert_eq!(ok, iv("20", 1, 5));
        assert!(serde_json::from_str::<ContigInterval>(r#"{"contig":"20","start":9,"stop":5}"#).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(iv("20", 63799, 69094).to_string(), "20:63799-69094");
    }
}
