//! Transcript and exon store indexed by genomic bin.
//!
//! Transcripts are registered exon by exon while the annotation file is
//! read, then [`GenomeFeatureStore::finalize`] sorts every exon list by
//! ascending start and assigns each transcript to the bin of its span.

use ahash::AHashMap;
use indexmap::IndexMap;

use crate::bins::{bin_for_interval, Bin};
use crate::types::Exon;

/// A transcript model as held by the store.
#[derive(Debug, Clone)]
pub struct TranscriptRecord {
    pub transcript_id: String,
    pub gene_id: String,
    pub chrom: String,
    /// Sorted by ascending start once the store is finalized.
    pub exons: Vec<Exon>,
}

impl TranscriptRecord {
    /// Create a new transcript with no exons.
    pub fn new(transcript_id: String, gene_id: String, chrom: String) -> Self {
        TranscriptRecord {
            transcript_id,
            gene_id,
            chrom,
            exons: Vec::new(),
        }
    }

    /// 0-based half-open span covered by the exons.
    pub fn span(&self) -> Option<(i64, i64)> {
        let start = self.exons.iter().map(|e| e.start).min()?;
        let end = self.exons.iter().map(|e| e.end).max()?;
        Some((start - 1, end))
    }

    pub fn is_single_exon(&self) -> bool {
        self.exons.len() == 1
    }
}

/// Summary counts reported after loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub chromosomes: usize,
    pub genes: usize,
    pub transcripts: usize,
    pub single_exon_transcripts: usize,
    pub exons: usize,
}

/// Read-only index of transcripts by chromosome and bin.
#[derive(Debug, Clone, Default)]
pub struct GenomeFeatureStore {
    /// Transcripts in order of first appearance.
    transcripts: IndexMap<String, TranscriptRecord>,
    /// chrom -> bin -> transcript ids, in order of first appearance.
    bins: AHashMap<String, AHashMap<Bin, Vec<String>>>,
}

impl GenomeFeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transcript so that it is known even before any exon is added.
    pub fn add_transcript(&mut self, chrom: &str, gene_id: &str, transcript_id: &str) {
        if !self.transcripts.contains_key(transcript_id) {
            self.transcripts.insert(
                transcript_id.to_string(),
                TranscriptRecord::new(
                    transcript_id.to_string(),
                    gene_id.to_string(),
                    chrom.to_string(),
                ),
            );
        }
    }

    /// Add an exon, creating its transcript on first sight.
    pub fn add_exon(&mut self, chrom: &str, gene_id: &str, transcript_id: &str, exon: Exon) {
        self.add_transcript(chrom, gene_id, transcript_id);
        if let Some(record) = self.transcripts.get_mut(transcript_id) {
            record.exons.push(exon);
        }
    }

    /// Sort exon lists and rebuild the bin index.
    ///
    /// Must be called after the last exon is added and before any lookup.
    pub fn finalize(&mut self) {
        self.bins.clear();
        for record in self.transcripts.values_mut() {
            record.exons.sort_by_key(|e| (e.start, e.end));

            // Transcripts without exons still get indexed so that lookups
            // surface them; annotation treats that as a data error.
            let bin = match record.span() {
                Some((start, end)) => bin_for_interval(start, end),
                None => 0,
            };
            self.bins
                .entry(record.chrom.clone())
                .or_default()
                .entry(bin)
                .or_default()
                .push(record.transcript_id.clone());
        }
    }

    /// Transcripts assigned to exactly this bin.
    pub fn transcripts_from_bin(&self, chrom: &str, bin: Bin) -> &[String] {
        self.bins
            .get(chrom)
            .and_then(|by_bin| by_bin.get(&bin))
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Exons of a transcript, sorted by ascending start. Empty when unknown.
    pub fn exons_for_transcript(&self, transcript_id: &str) -> &[Exon] {
        self.transcripts
            .get(transcript_id)
            .map(|t| t.exons.as_slice())
            .unwrap_or(&[])
    }

    pub fn gene_for_transcript(&self, transcript_id: &str) -> Option<&str> {
        self.transcripts
            .get(transcript_id)
            .map(|t| t.gene_id.as_str())
    }

    pub fn contains_chrom(&self, chrom: &str) -> bool {
        self.bins.contains_key(chrom)
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        let mut genes: Vec<&str> = self
            .transcripts
            .values()
            .map(|t| t.gene_id.as_str())
            .collect();
        genes.sort_unstable();
        genes.dedup();

        StoreStats {
            chromosomes: self.bins.len(),
            genes: genes.len(),
            transcripts: self.transcripts.len(),
            single_exon_transcripts: self
                .transcripts
                .values()
                .filter(|t| t.is_single_exon())
                .count(),
            exons: self.transcripts.values().map(|t| t.exons.len()).sum(),
        }
    }
}
