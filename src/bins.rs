//! Hierarchical genomic bin scheme.
//!
//! Features are indexed by the smallest bin that fully contains them. Bins at
//! the finest level span 2^14 bp; every coarser level groups 2^3 bins of the
//! level below. The store assigns bins with [`bin_for_interval`] and the
//! annotator enumerates candidate bins with [`search_spans`], so both sides
//! share the constants defined here.

use std::iter::successors;
use std::ops::RangeInclusive;

/// Bin identifier (level offset already applied).
pub type Bin = u64;

/// Number of levels in the scheme.
pub const BIN_LEVELS: usize = 7;

/// Shift applied to a coordinate to get its finest-level bin index.
pub const BIN_FIRST_SHIFT: u32 = 14;

/// Shift applied to a bin index to get its index at the next coarser level.
pub const BIN_NEXT_SHIFT: u32 = 3;

/// Identifier offset of each level, finest first.
pub const BIN_OFFSETS: [Bin; BIN_LEVELS] = [
    32768 + 4096 + 512 + 64 + 8 + 1,
    4096 + 512 + 64 + 8 + 1,
    512 + 64 + 8 + 1,
    64 + 8 + 1,
    8 + 1,
    1,
    0,
];

/// Smallest bin fully containing the 0-based half-open interval `[start, end)`.
///
/// Intervals too large for every level fall back to the single coarsest bin.
pub fn bin_for_interval(start: i64, end: i64) -> Bin {
    let mut first = (start.max(0) as u64) >> BIN_FIRST_SHIFT;
    let mut last = ((end - 1).max(start).max(0) as u64) >> BIN_FIRST_SHIFT;

    for offset in BIN_OFFSETS {
        if first == last {
            return offset + first;
        }
        first >>= BIN_NEXT_SHIFT;
        last >>= BIN_NEXT_SHIFT;
    }

    BIN_OFFSETS[BIN_LEVELS - 1]
}

/// Level of a bin identifier, 0 being the finest.
pub fn bin_level(bin: Bin) -> usize {
    BIN_OFFSETS
        .iter()
        .position(|&offset| bin >= offset)
        .unwrap_or(BIN_LEVELS - 1)
}

/// The bin one level coarser that contains `bin`, or `None` at the top level.
pub fn parent_bin(bin: Bin) -> Option<Bin> {
    let level = bin_level(bin);
    if level + 1 >= BIN_LEVELS {
        return None;
    }
    let index = bin - BIN_OFFSETS[level];
    Some((index >> BIN_NEXT_SHIFT) + BIN_OFFSETS[level + 1])
}

/// A contiguous run of bins at one level of the scheme.
///
/// `first` and `last` are level-local indices; [`BinSpan::bins`] applies the
/// level offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinSpan {
    pub level: usize,
    pub first: u64,
    pub last: u64,
}

impl BinSpan {
    /// Finest-level span covering `[pos - radius, pos + radius]`.
    pub fn finest(pos: i64, radius: i64) -> Self {
        let lo = pos.saturating_sub(radius).max(0) as u64;
        let hi = pos.saturating_add(radius).max(0) as u64;
        BinSpan {
            level: 0,
            first: lo >> BIN_FIRST_SHIFT,
            last: hi >> BIN_FIRST_SHIFT,
        }
    }

    /// Bin identifiers of this span, ascending.
    pub fn bins(&self) -> RangeInclusive<Bin> {
        let offset = BIN_OFFSETS[self.level];
        (self.first + offset)..=(self.last + offset)
    }

    /// The span covering the same region one level up.
    pub fn coarser(&self) -> Option<BinSpan> {
        if self.level + 1 >= BIN_LEVELS {
            return None;
        }
        Some(BinSpan {
            level: self.level + 1,
            first: self.first >> BIN_NEXT_SHIFT,
            last: self.last >> BIN_NEXT_SHIFT,
        })
    }
}

/// Spans to query for a 0-based position and search radius, finest level first.
pub fn search_spans(pos: i64, radius: i64) -> impl Iterator<Item = BinSpan> {
    successors(Some(BinSpan::finest(pos, radius)), BinSpan::coarser)
}

/// Every candidate bin for a position, in query order.
pub fn candidate_bins(pos: i64, radius: i64) -> impl Iterator<Item = Bin> {
    search_spans(pos, radius).flat_map(|span| span.bins())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_consistent() {
        // Each level's offset is the previous offset plus its bin count.
        for level in 0..BIN_LEVELS - 1 {
            let width = BIN_OFFSETS[level] - BIN_OFFSETS[level + 1];
            assert_eq!(width, 1 << (BIN_NEXT_SHIFT * (BIN_LEVELS - 2 - level) as u32));
        }
        assert_eq!(BIN_OFFSETS[0], 37449);
    }

    #[test]
    fn test_bin_for_small_interval() {
        assert_eq!(bin_for_interval(0, 100), 37449);
        assert_eq!(bin_for_interval(16384, 16400), 37450);
    }

    #[test]
    fn test_bin_for_interval_crossing_boundary() {
        // Crosses the first 16kb boundary, lands at level 1.
        assert_eq!(bin_for_interval(16000, 17000), 4681);
        // Exactly touching the boundary does not cross it.
        assert_eq!(bin_for_interval(16000, 16384), 37449);
    }

    #[test]
    fn test_huge_interval_uses_top_bin() {
        assert_eq!(bin_for_interval(0, 1 << 40), 0);
    }

    #[test]
    fn test_search_spans_walk_all_levels() {
        let spans: Vec<BinSpan> = search_spans(16383, 2).collect();
        assert_eq!(spans.len(), BIN_LEVELS);
        assert_eq!(spans[0].bins(), 37449..=37450);
        assert_eq!(spans[1].bins(), 4681..=4681);
        assert_eq!(spans[6].bins(), 0..=0);
    }

    #[test]
    fn test_search_clamps_at_chromosome_start() {
        let spans: Vec<BinSpan> = search_spans(1, 10).collect();
        assert_eq!(spans[0].first, 0);
        assert_eq!(spans[0].last, 0);
    }

    #[test]
    fn test_search_radius_saturates() {
        let span = BinSpan::finest(100, i64::MAX);
        assert_eq!(span.first, 0);
        assert_eq!(span.last, (i64::MAX as u64) >> BIN_FIRST_SHIFT);
    }

    #[test]
    fn test_parent_bin() {
        assert_eq!(parent_bin(37449), Some(4681));
        assert_eq!(parent_bin(37449 + 8), Some(4682));
        assert_eq!(parent_bin(9), Some(1));
        assert_eq!(parent_bin(1), Some(0));
        assert_eq!(parent_bin(0), None);
        assert_eq!(bin_level(37449), 0);
        assert_eq!(bin_level(4681), 1);
        assert_eq!(bin_level(0), 6);
    }

    #[test]
    fn test_feature_bin_is_always_searched() {
        let intervals = [(0, 100), (16000, 17000), (100_000, 400_000), (5_000_000, 90_000_000)];
        for (start, end) in intervals {
            let bin = bin_for_interval(start, end);
            for pos in [start, (start + end) / 2, end - 1] {
                assert!(
                    candidate_bins(pos, 0).any(|b| b == bin),
                    "bin {} not searched for pos {}",
                    bin,
                    pos
                );
            }
        }
    }

    #[test]
    fn test_coarser_matches_parent_bin() {
        let span = BinSpan::finest(1_234_567, 0);
        let parent = span.coarser().unwrap();
        assert_eq!(parent_bin(*span.bins().start()), Some(*parent.bins().start()));
    }
}
