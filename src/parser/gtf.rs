//! GTF file parser with gzip support.
//!
//! Reads the `exon` features of a GTF (Gene Transfer Format) annotation
//! into a [`GenomeFeatureStore`]. Other feature types are ignored: the
//! store only needs exon coordinates grouped by transcript.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufRead;
use std::path::Path;

use crate::config::GtfTags;
use crate::parser::util::create_buffered_reader;
use crate::store::GenomeFeatureStore;
use crate::types::Exon;

/// Parse a GTF file into a finalized feature store.
///
/// Supports both plain text and gzip-compressed GTF files.
pub fn parse_gtf(path: &Path, tags: &GtfTags) -> Result<GenomeFeatureStore> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open GTF file {}", path.display()))?;
    let reader = create_buffered_reader(file, path);

    parse_gtf_reader(reader, tags)
}

/// Parse GTF data from a reader.
pub fn parse_gtf_reader<R: BufRead>(reader: R, tags: &GtfTags) -> Result<GenomeFeatureStore> {
    let mut store = GenomeFeatureStore::new();
    let mut skipped = 0usize;

    for (idx, line_result) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line_result.context("Failed to read GTF line")?;

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 9 {
            continue;
        }

        if fields[2] != "exon" {
            continue;
        }

        let chrom = fields[0];
        let start: i64 = fields[3]
            .parse()
            .with_context(|| format!("Failed to parse start coordinate on GTF line {}", line_number))?;
        let end: i64 = fields[4]
            .parse()
            .with_context(|| format!("Failed to parse end coordinate on GTF line {}", line_number))?;
        // Validated when the transcript is classified.
        let strand = fields[6].chars().next().unwrap_or('.');
        let attributes = fields[8];

        let (Some(gene_id), Some(transcript_id)) = (
            extract_attribute(attributes, &tags.gene_id),
            extract_attribute(attributes, &tags.transcript_id),
        ) else {
            log::warn!(
                "GTF line {}: exon without {} or {}, skipped",
                line_number,
                tags.gene_id,
                tags.transcript_id
            );
            skipped += 1;
            continue;
        };

        store.add_exon(chrom, &gene_id, &transcript_id, Exon::new(start, end, strand));
    }

    if skipped > 0 {
        log::warn!("Skipped {} GTF exon lines without identifiers", skipped);
    }

    store.finalize();
    Ok(store)
}

/// Extract an attribute value from the GTF attributes string.
///
/// GTF attributes are in the format: key "value"; key "value"; ...
fn extract_attribute(attributes: &str, key: &str) -> Option<String> {
    attributes
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            let (name, value) = pair.split_once(' ')?;
            if name != key {
                return None;
            }
            Some(value.trim().trim_matches('"').to_string())
        })
}
