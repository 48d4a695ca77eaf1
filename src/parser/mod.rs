//! Parsers for genomic file formats.

pub mod gtf;
pub mod util;
pub mod vcf;

pub use gtf::{parse_gtf, parse_gtf_reader};
pub use vcf::{VcfHeader, VcfReader, VcfRecord};
