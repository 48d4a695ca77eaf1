//! Per-variant aggregation over all candidate transcripts.
//!
//! Candidate transcripts come from the bin index, finest level first and
//! ascending bin within a level. That traversal order is the order of the
//! output lists, which keeps re-runs byte-identical.

use indexmap::IndexSet;
use std::fmt::Display;

use crate::annotator::splice::classify;
use crate::bins::candidate_bins;
use crate::config::AnnotateConfig;
use crate::error::AnnotateError;
use crate::store::GenomeFeatureStore;
use crate::types::{CisEffectWindow, Classification, SpliceAnnotation, Variant};

/// Value written for a list with no entries.
pub const MISSING_VALUE: &str = "NA";

/// A variant with every splice-relevant transcript it touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedVariant {
    pub variant: Variant,
    /// Unique genes, first-seen order.
    pub genes: IndexSet<String>,
    pub transcripts: Vec<String>,
    /// Parallel to `transcripts`.
    pub distances: Vec<i64>,
    /// Parallel to `transcripts`.
    pub annotations: Vec<SpliceAnnotation>,
    /// Union of the cis-effect windows of all splicing hits.
    pub cis_window: CisEffectWindow,
}

impl AnnotatedVariant {
    /// An annotation with no transcript recorded yet.
    pub fn new(variant: Variant) -> Self {
        let cis_window = CisEffectWindow::for_variant(&variant);
        AnnotatedVariant {
            variant,
            genes: IndexSet::new(),
            transcripts: Vec::new(),
            distances: Vec::new(),
            annotations: Vec::new(),
            cis_window,
        }
    }

    /// Record one splice-relevant transcript.
    pub fn push(&mut self, gene_id: &str, transcript_id: &str, classification: &Classification) {
        if !self.genes.contains(gene_id) {
            self.genes.insert(gene_id.to_string());
        }
        self.transcripts.push(transcript_id.to_string());
        self.distances.push(classification.score);
        self.annotations.push(classification.annotation);
        if let Some(window) = &classification.cis_window {
            self.cis_window.merge(window);
        }
    }

    /// Whether any transcript was recorded.
    pub fn is_splice_relevant(&self) -> bool {
        !self.transcripts.is_empty()
    }

    pub fn genes_field(&self) -> String {
        join_or_missing(&self.genes)
    }

    pub fn transcripts_field(&self) -> String {
        join_or_missing(&self.transcripts)
    }

    pub fn distances_field(&self) -> String {
        join_or_missing(&self.distances)
    }

    pub fn annotations_field(&self) -> String {
        join_or_missing(&self.annotations)
    }
}

/// Comma-join the items, or `NA` when there are none.
fn join_or_missing<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    let joined = items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(",");
    if joined.is_empty() {
        MISSING_VALUE.to_string()
    } else {
        joined
    }
}

/// Annotate one variant against every transcript near it.
///
/// Fails only when the store holds a transcript without exons or a
/// transcript whose strand cannot be classified.
pub fn annotate_variant(
    variant: &Variant,
    store: &GenomeFeatureStore,
    config: &AnnotateConfig,
) -> Result<AnnotatedVariant, AnnotateError> {
    let mut annotated = AnnotatedVariant::new(variant.clone());

    for bin in candidate_bins(variant.start, config.search_radius()) {
        for transcript_id in store.transcripts_from_bin(&variant.chrom, bin) {
            let exons = store.exons_for_transcript(transcript_id);
            if exons.is_empty() {
                return Err(AnnotateError::MissingExons(transcript_id.clone()));
            }

            if config.skip_single_exon_transcripts && exons.len() == 1 {
                continue;
            }

            let classification = classify(exons, variant, config)?;
            if !classification.annotation.is_splice_relevant() {
                continue;
            }

            let gene_id = store
                .gene_for_transcript(transcript_id)
                .ok_or_else(|| AnnotateError::MissingExons(transcript_id.clone()))?;

            log::trace!(
                "{}:{} {} {} {} {}",
                variant.chrom,
                variant.end,
                gene_id,
                transcript_id,
                classification.annotation,
                classification.score
            );
            annotated.push(gene_id, transcript_id, &classification);
        }
    }

    Ok(annotated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Exon;

    fn store_with(transcripts: &[(&str, &str, char, &[(i64, i64)])]) -> GenomeFeatureStore {
        let mut store = GenomeFeatureStore::new();
        for &(gene, transcript, strand, exons) in transcripts {
            for &(start, end) in exons {
                store.add_exon("chr1", gene, transcript, Exon::new(start, end, strand));
            }
        }
        store.finalize();
        store
    }

    fn at(coordinate: i64) -> Variant {
        Variant::new("chr1".to_string(), coordinate - 1)
    }

    #[test]
    fn test_empty_annotation_uses_sentinel() {
        let annotated = AnnotatedVariant::new(at(10));
        assert!(!annotated.is_splice_relevant());
        assert_eq!(annotated.genes_field(), "NA");
        assert_eq!(annotated.transcripts_field(), "NA");
        assert_eq!(annotated.distances_field(), "NA");
        assert_eq!(annotated.annotations_field(), "NA");
    }

    #[test]
    fn test_genes_are_deduplicated() {
        let store = store_with(&[
            ("G1", "T1", '+', &[(100, 200), (300, 400)]),
            ("G1", "T2", '+', &[(50, 200), (350, 500)]),
        ]);
        let annotated = annotate_variant(&at(199), &store, &AnnotateConfig::default()).unwrap();
        assert_eq!(annotated.genes_field(), "G1");
        assert_eq!(annotated.transcripts_field(), "T1,T2");
        assert_eq!(annotated.distances_field(), "1,1");
        assert_eq!(annotated.annotations_field(), "splicing_exonic,splicing_exonic");
    }

    #[test]
    fn test_non_splice_transcripts_are_left_out() {
        let store = store_with(&[
            ("G1", "T1", '+', &[(100, 200), (300, 400)]),
            ("G2", "T2", '-', &[(100, 180), (300, 400)]),
        ]);
        let annotated = annotate_variant(&at(202), &store, &AnnotateConfig::default()).unwrap();
        assert_eq!(annotated.genes_field(), "G1");
        assert_eq!(annotated.transcripts_field(), "T1");
        assert_eq!(annotated.distances_field(), "2");
        assert_eq!(annotated.annotations_field(), "splicing_intronic");
    }

    #[test]
    fn test_single_exon_transcripts_skipped_by_default() {
        let store = store_with(&[("G1", "T1", '+', &[(100, 200)])]);
        let config = AnnotateConfig {
            all_exonic_space: true,
            ..AnnotateConfig::default()
        };
        let annotated = annotate_variant(&at(150), &store, &config).unwrap();
        assert!(!annotated.is_splice_relevant());

        let config = AnnotateConfig {
            skip_single_exon_transcripts: false,
            ..config
        };
        let annotated = annotate_variant(&at(150), &store, &config).unwrap();
        assert_eq!(annotated.transcripts_field(), "T1");
        assert_eq!(annotated.annotations_field(), "exonic");
        assert_eq!(annotated.distances_field(), "50");
    }

    #[test]
    fn test_missing_exons_is_fatal() {
        let mut store = GenomeFeatureStore::new();
        store.add_transcript("chr1", "G1", "T1");
        store.finalize();
        let err = annotate_variant(&at(150), &store, &AnnotateConfig::default()).unwrap_err();
        assert_eq!(err, AnnotateError::MissingExons("T1".to_string()));
    }

    #[test]
    fn test_unknown_strand_is_fatal() {
        let store = store_with(&[("G1", "T1", '.', &[(100, 200), (300, 400)])]);
        let err = annotate_variant(&at(150), &store, &AnnotateConfig::default()).unwrap_err();
        assert_eq!(err, AnnotateError::UnknownStrand('.'));
    }

    #[test]
    fn test_other_chromosome_is_ignored() {
        let store = store_with(&[("G1", "T1", '+', &[(100, 200), (300, 400)])]);
        let variant = Variant::new("chr2".to_string(), 198);
        let annotated = annotate_variant(&variant, &store, &AnnotateConfig::default()).unwrap();
        assert!(!annotated.is_splice_relevant());
    }

    #[test]
    fn test_cis_windows_are_merged() {
        let store = store_with(&[
            ("G1", "T1", '+', &[(100, 200), (300, 400)]),
            ("G2", "T2", '-', &[(150, 200), (260, 700), (800, 900)]),
        ]);
        let annotated = annotate_variant(&at(199), &store, &AnnotateConfig::default()).unwrap();
        assert_eq!(annotated.genes_field(), "G1,G2");
        assert_eq!(annotated.distances_field(), "1,1");
        assert_eq!(annotated.cis_window, CisEffectWindow { start: 100, end: 700 });
    }
}
