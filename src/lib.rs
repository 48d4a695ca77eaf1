//! spliceanno - Splice-region annotation of genomic variants.
//!
//! This library classifies variants (from VCF files) against transcript
//! models (from GTF files) and reports, per variant, the genes and
//! transcripts whose splice junctions the variant may affect.
//!
//! # Features
//!
//! - Parse GTF and VCF files (with gzip support)
//! - Index transcripts with a hierarchical genomic bin scheme
//! - Classify variants as exonic/intronic splice-region hits, strand-aware
//! - Compute the cis-effect window spanned by neighbouring exons
//! - Aggregate per-transcript results into four VCF INFO fields
//!
//! # Example
//!
//! ```ignore
//! use spliceanno::annotator::annotate_variant;
//! use spliceanno::config::{AnnotateConfig, GtfTags};
//! use spliceanno::parser::{parse_gtf, VcfReader};
//! use std::path::Path;
//!
//! let config = AnnotateConfig::default();
//! let store = parse_gtf(Path::new("annotations.gtf"), &GtfTags::default())?;
//! let mut reader = VcfReader::new(Path::new("variants.vcf"))?;
//!
//! while let Some(record) = reader.read_record()? {
//!     let annotated = annotate_variant(&record.variant(), &store, &config)?;
//!     println!("{}", annotated.genes_field());
//! }
//! ```

pub mod annotator;
pub mod bins;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod store;
pub mod types;

pub use annotator::{annotate_variant, classify, AnnotatedVariant};
pub use config::{AnnotateConfig, GtfTags};
pub use error::AnnotateError;
pub use store::GenomeFeatureStore;
pub use types::{CisEffectWindow, Classification, Exon, SpliceAnnotation, Strand, Variant};
