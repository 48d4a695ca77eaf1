//! Core data structures for spliceanno.
//!
//! This module contains the fundamental types shared by the feature store,
//! the splice-region classifier and the per-variant aggregator.

use std::fmt;

/// Strand orientation for genomic features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Positive,
    Negative,
}

/// Error type for converting a strand character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrandError;

impl fmt::Display for ParseStrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid strand: expected '+' or '-'")
    }
}

impl std::error::Error for ParseStrandError {}

impl TryFrom<char> for Strand {
    type Error = ParseStrandError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '+' => Ok(Strand::Positive),
            '-' => Ok(Strand::Negative),
            _ => Err(ParseStrandError),
        }
    }
}

impl Strand {
    /// Convert strand to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Positive => "+",
            Strand::Negative => "-",
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Relationship between a variant and the splice structure of one transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpliceAnnotation {
    NonSpliceRegion,
    Exonic,
    Intronic,
    SplicingExonic,
    SplicingIntronic,
}

impl SpliceAnnotation {
    /// Convert the annotation to its output label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpliceAnnotation::NonSpliceRegion => "non_splice_region",
            SpliceAnnotation::Exonic => "exonic",
            SpliceAnnotation::Intronic => "intronic",
            SpliceAnnotation::SplicingExonic => "splicing_exonic",
            SpliceAnnotation::SplicingIntronic => "splicing_intronic",
        }
    }

    /// Whether this annotation contributes to a variant's output lists.
    pub fn is_splice_relevant(&self) -> bool {
        !matches!(self, SpliceAnnotation::NonSpliceRegion)
    }
}

impl fmt::Display for SpliceAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An exon within a transcript.
///
/// Coordinates are 1-based and inclusive. The strand is the raw character
/// of the parent transcript as it appeared in the annotation file; it is
/// validated when the transcript is classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exon {
    pub start: i64,
    pub end: i64,
    pub strand: char,
}

impl Exon {
    /// Create a new exon with start and end coordinates.
    pub fn new(start: i64, end: i64, strand: char) -> Self {
        Exon { start, end, strand }
    }

    /// Whether a 1-based coordinate falls inside the exon.
    pub fn contains(&self, pos: i64) -> bool {
        pos >= self.start && pos <= self.end
    }
}

/// A single-position variant.
///
/// `start` is the 0-based position from the variant record and `end` is
/// `start + 1`, which doubles as the 1-based working coordinate compared
/// against exon boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
}

impl Variant {
    /// Create a variant from a chromosome and 0-based position.
    pub fn new(chrom: String, pos0: i64) -> Self {
        Variant {
            chrom,
            start: pos0,
            end: pos0 + 1,
        }
    }

    /// The 1-based coordinate used for all exon comparisons.
    pub fn coordinate(&self) -> i64 {
        self.end
    }
}

/// Coordinate range within which a variant may affect splicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CisEffectWindow {
    pub start: i64,
    pub end: i64,
}

impl CisEffectWindow {
    /// A window covering only the variant itself.
    pub fn for_variant(variant: &Variant) -> Self {
        CisEffectWindow {
            start: variant.start,
            end: variant.end,
        }
    }

    /// Extend the window so that it covers `pos`. Never narrows.
    pub fn include(&mut self, pos: i64) {
        if pos < self.start {
            self.start = pos;
        }
        if pos > self.end {
            self.end = pos;
        }
    }

    /// Extend the window to cover another window.
    pub fn merge(&mut self, other: &CisEffectWindow) {
        self.include(other.start);
        self.include(other.end);
    }
}

/// Outcome of classifying one variant against one transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub annotation: SpliceAnnotation,
    /// Minimum distance to the relevant exon boundaries, -1 when not splice relevant.
    pub score: i64,
    /// Set only for `SplicingExonic` and `SplicingIntronic`.
    pub cis_window: Option<CisEffectWindow>,
}

impl Classification {
    /// The "nothing to report" result.
    pub fn non_splice_region() -> Self {
        Classification {
            annotation: SpliceAnnotation::NonSpliceRegion,
            score: -1,
            cis_window: None,
        }
    }

    pub fn new(annotation: SpliceAnnotation, score: i64) -> Self {
        Classification {
            annotation,
            score,
            cis_window: None,
        }
    }
}
