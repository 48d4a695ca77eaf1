//! Cis-effect limits of a splice-relevant variant.
//!
//! The window spans from the 5' end of the neighbouring exon upstream in the
//! transcript to the 3' end of the neighbouring exon downstream, i.e. the
//! nearest acceptor and donor sites whose usage the variant could change.
//! Neighbours are taken by ascending genomic index, so which of `i - 1` and
//! `i + 1` is upstream depends on the strand.

use crate::types::{CisEffectWindow, Exon, Strand, Variant};

/// 5' boundary of an exon in transcription direction.
fn five_prime(exon: &Exon, strand: Strand) -> i64 {
    match strand {
        Strand::Positive => exon.start,
        Strand::Negative => exon.end,
    }
}

/// 3' boundary of an exon in transcription direction.
fn three_prime(exon: &Exon, strand: Strand) -> i64 {
    match strand {
        Strand::Positive => exon.end,
        Strand::Negative => exon.start,
    }
}

/// Widen `window` to the neighbours of exon `index`.
///
/// At the first or last exon the missing neighbour is the exon itself.
pub fn extend_cis_effect_window(
    window: &mut CisEffectWindow,
    exons: &[Exon],
    strand: Strand,
    index: usize,
) {
    if exons.is_empty() {
        return;
    }
    let last = exons.len() - 1;
    let index = index.min(last);
    let lower = &exons[index.saturating_sub(1)];
    let upper = &exons[(index + 1).min(last)];

    let (upstream, downstream) = match strand {
        Strand::Positive => (lower, upper),
        Strand::Negative => (upper, lower),
    };

    window.include(five_prime(upstream, strand));
    window.include(three_prime(downstream, strand));
}

/// Cis-effect window of `variant` when exon `index` is the one implicated.
pub fn cis_effect_window(
    exons: &[Exon],
    strand: Strand,
    index: usize,
    variant: &Variant,
) -> CisEffectWindow {
    let mut window = CisEffectWindow::for_variant(variant);
    extend_cis_effect_window(&mut window, exons, strand, index);
    window
}
