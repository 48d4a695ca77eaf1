//! Splice-region classification of a variant against one transcript.
//!
//! Exons are always sorted by ascending start, whatever the strand. Both
//! strand procedures visit the exons in transcription order: ascending on
//! the `+` strand, descending on the `-` strand. At each exon the same four
//! boundary cases are checked in the same order, so a `-` transcript gives
//! the mirror image of the `+` result, cis-effect window included.
//!
//! ```text
//!   + strand:   exon i-1           exon i            exon i+1
//!              |========|......|==========|......|========|
//!                             ^start   end^
//!                   acceptor side       donor side
//! ```

use crate::annotator::cis::cis_effect_window;
use crate::config::AnnotateConfig;
use crate::error::AnnotateError;
use crate::types::{Classification, Exon, SpliceAnnotation, Strand, Variant};

/// Classify a variant against a transcript's exons.
///
/// `exons` must be sorted by ascending start; the scan stops at the first
/// exon lying beyond the intronic radius of the variant in transcription
/// direction. The strand is read from the first exon and must be `+` or `-`.
pub fn classify(
    exons: &[Exon],
    variant: &Variant,
    config: &AnnotateConfig,
) -> Result<Classification, AnnotateError> {
    let Some(first) = exons.first() else {
        return Ok(Classification::non_splice_region());
    };

    let strand =
        Strand::try_from(first.strand).map_err(|_| AnnotateError::UnknownStrand(first.strand))?;

    Ok(match strand {
        Strand::Positive => classify_positive(exons, variant, config),
        Strand::Negative => classify_negative(exons, variant, config),
    })
}

/// `+` strand: lowest exon first.
fn classify_positive(exons: &[Exon], variant: &Variant, config: &AnnotateConfig) -> Classification {
    let pos = variant.coordinate();
    if outside_transcript(exons, pos) {
        return Classification::non_splice_region();
    }

    for i in 0..exons.len() {
        let intron = exons.get(i + 1).map(|next| (&exons[i], next));
        if let Some(hit) = whole_space(&exons[i], intron, pos, config) {
            return hit;
        }
        if starts_beyond_reach(&exons[i], pos, config) {
            break;
        }

        if let Some(mut hit) = boundary_hit(exons, i, pos, config) {
            hit.cis_window = Some(cis_effect_window(exons, Strand::Positive, i, variant));
            return hit;
        }
    }

    Classification::non_splice_region()
}

/// `-` strand: highest exon first.
fn classify_negative(exons: &[Exon], variant: &Variant, config: &AnnotateConfig) -> Classification {
    let pos = variant.coordinate();
    if outside_transcript(exons, pos) {
        return Classification::non_splice_region();
    }

    for i in (0..exons.len()).rev() {
        let intron = i.checked_sub(1).map(|prev| (&exons[prev], &exons[i]));
        if let Some(hit) = whole_space(&exons[i], intron, pos, config) {
            return hit;
        }
        if ends_beyond_reach(&exons[i], pos, config) {
            break;
        }

        if let Some(mut hit) = boundary_hit(exons, i, pos, config) {
            hit.cis_window = Some(cis_effect_window(exons, Strand::Negative, i, variant));
            return hit;
        }
    }

    Classification::non_splice_region()
}

/// The four boundary cases of exon `i`, start side first.
fn boundary_hit(
    exons: &[Exon],
    i: usize,
    pos: i64,
    config: &AnnotateConfig,
) -> Option<Classification> {
    exonic_near_start(exons, i, pos, config)
        .or_else(|| intronic_near_start(exons, i, pos, config))
        .or_else(|| exonic_near_end(exons, i, pos, config))
        .or_else(|| intronic_near_end(exons, i, pos, config))
}

/// Variant lies before the first exon or after the last one.
fn outside_transcript(exons: &[Exon], pos: i64) -> bool {
    match (exons.first(), exons.last()) {
        (Some(first), Some(last)) => pos < first.start || pos > last.end,
        _ => true,
    }
}

/// Ascending scan: exon `i` and every later exon start too far right.
fn starts_beyond_reach(exon: &Exon, pos: i64, config: &AnnotateConfig) -> bool {
    exon.start.saturating_sub(config.intronic_min_distance) > pos
}

/// Descending scan: exon `i` and every earlier exon end too far left.
fn ends_beyond_reach(exon: &Exon, pos: i64, config: &AnnotateConfig) -> bool {
    exon.end.saturating_add(config.intronic_min_distance) < pos
}

fn exonic_score(exon: &Exon, pos: i64) -> i64 {
    (pos - exon.start).min(exon.end - pos)
}

fn intronic_score(left: &Exon, right: &Exon, pos: i64) -> i64 {
    (pos - left.end).min(right.start - pos)
}

/// Whole-exon and whole-intron modes.
///
/// `intron` is the intron following `exon` in transcription direction, as
/// its (lower, upper) flanking exons.
fn whole_space(
    exon: &Exon,
    intron: Option<(&Exon, &Exon)>,
    pos: i64,
    config: &AnnotateConfig,
) -> Option<Classification> {
    if config.all_exonic_space && exon.contains(pos) {
        return Some(Classification::new(
            SpliceAnnotation::Exonic,
            exonic_score(exon, pos),
        ));
    }

    if config.all_intronic_space {
        if let Some((lower, upper)) = intron {
            if pos > lower.end && pos < upper.start {
                return Some(Classification::new(
                    SpliceAnnotation::Intronic,
                    intronic_score(lower, upper, pos),
                ));
            }
        }
    }

    None
}

/// Inside exon `i`, close to its start, and exon `i` is not the lowest exon.
fn exonic_near_start(
    exons: &[Exon],
    i: usize,
    pos: i64,
    config: &AnnotateConfig,
) -> Option<Classification> {
    let exon = &exons[i];
    if i != 0 && exon.contains(pos) && pos - exon.start <= config.exonic_min_distance {
        return Some(Classification::new(
            SpliceAnnotation::SplicingExonic,
            exonic_score(exon, pos),
        ));
    }
    None
}

/// In the intron before exon `i`, close to its start, not inside exon `i - 1`.
fn intronic_near_start(
    exons: &[Exon],
    i: usize,
    pos: i64,
    config: &AnnotateConfig,
) -> Option<Classification> {
    let exon = &exons[i];
    let prev = &exons[i.checked_sub(1)?];
    if pos < exon.start && exon.start - pos <= config.intronic_min_distance && pos > prev.end {
        return Some(Classification::new(
            SpliceAnnotation::SplicingIntronic,
            intronic_score(prev, exon, pos),
        ));
    }
    None
}

/// Inside exon `i`, close to its end, and exon `i` is not the highest exon.
fn exonic_near_end(
    exons: &[Exon],
    i: usize,
    pos: i64,
    config: &AnnotateConfig,
) -> Option<Classification> {
    let exon = &exons[i];
    if i + 1 != exons.len() && exon.contains(pos) && exon.end - pos <= config.exonic_min_distance
    {
        return Some(Classification::new(
            SpliceAnnotation::SplicingExonic,
            exonic_score(exon, pos),
        ));
    }
    None
}

/// In the intron after exon `i`, close to its end, not inside exon `i + 1`.
fn intronic_near_end(
    exons: &[Exon],
    i: usize,
    pos: i64,
    config: &AnnotateConfig,
) -> Option<Classification> {
    let exon = &exons[i];
    let next = exons.get(i + 1)?;
    if pos > exon.end && pos - exon.end <= config.intronic_min_distance && pos < next.start {
        return Some(Classification::new(
            SpliceAnnotation::SplicingIntronic,
            intronic_score(exon, next, pos),
        ));
    }
    None
}
