//! Configuration and defaults for spliceanno.
//!
//! This module contains the configuration structures that control how
//! variants are classified against transcript models. Both are built once
//! from the command line and only ever borrowed afterwards.

/// Default maximum distance into an exon for a splice-relevant variant.
pub const DEFAULT_EXONIC_MIN_DISTANCE: i64 = 3;

/// Default maximum distance into an intron for a splice-relevant variant.
pub const DEFAULT_INTRONIC_MIN_DISTANCE: i64 = 2;

/// Largest accepted exonic or intronic distance.
pub const MAX_MIN_DISTANCE: i64 = u32::MAX as i64;

/// Configuration for the splice-region classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotateConfig {
    /// Maximum distance from an exon boundary, on the intron side.
    pub intronic_min_distance: i64,
    /// Maximum distance from an exon boundary, on the exon side.
    pub exonic_min_distance: i64,
    /// Report any variant inside an intron of the transcript.
    pub all_intronic_space: bool,
    /// Report any variant inside an exon of the transcript.
    pub all_exonic_space: bool,
    /// Ignore transcripts made of a single exon.
    pub skip_single_exon_transcripts: bool,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        AnnotateConfig {
            intronic_min_distance: DEFAULT_INTRONIC_MIN_DISTANCE,
            exonic_min_distance: DEFAULT_EXONIC_MIN_DISTANCE,
            all_intronic_space: false,
            all_exonic_space: false,
            skip_single_exon_transcripts: true,
        }
    }
}

impl AnnotateConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest score a proximity-mode classification can produce.
    pub fn max_proximity_score(&self) -> i64 {
        self.exonic_min_distance.max(self.intronic_min_distance)
    }

    /// Radius around a variant used when enumerating candidate bins.
    pub fn search_radius(&self) -> i64 {
        self.intronic_min_distance
    }
}

/// GTF attribute names used to identify genes and transcripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GtfTags {
    pub gene_id: String,
    pub transcript_id: String,
}

impl Default for GtfTags {
    fn default() -> Self {
        GtfTags {
            gene_id: "gene_id".to_string(),
            transcript_id: "transcript_id".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnnotateConfig::default();
        assert_eq!(config.intronic_min_distance, 2);
        assert_eq!(config.exonic_min_distance, 3);
        assert!(!config.all_intronic_space);
        assert!(!config.all_exonic_space);
        assert!(config.skip_single_exon_transcripts);
    }

    #[test]
    fn test_max_proximity_score() {
        let mut config = AnnotateConfig::new();
        assert_eq!(config.max_proximity_score(), 3);

        config.intronic_min_distance = 10;
        assert_eq!(config.max_proximity_score(), 10);
        assert_eq!(config.search_radius(), 10);
    }

    #[test]
    fn test_default_tags() {
        let tags = GtfTags::default();
        assert_eq!(tags.gene_id, "gene_id");
        assert_eq!(tags.transcript_id, "transcript_id");
    }
}
