//! Output formatting for annotated VCF records.
//!
//! The annotation is written as four INFO keys. The header gains their
//! declarations right before the `#CHROM` line.

use anyhow::Result;

use std::io::Write;

use crate::annotator::AnnotatedVariant;
use crate::parser::vcf::{declares_info, VcfHeader, VcfRecord};

/// INFO keys written for every record, in output order.
pub const INFO_KEYS: [&str; 4] = ["genes", "transcripts", "distances", "annotations"];

/// Header declarations for [`INFO_KEYS`].
pub const INFO_HEADER_LINES: [&str; 4] = [
    "##INFO=<ID=genes,Number=1,Type=String,Description=\"The Variant falls in the splice region of these genes\">",
    "##INFO=<ID=transcripts,Number=1,Type=String,Description=\"The Variant falls in the splice region of these transcripts\">",
    "##INFO=<ID=distances,Number=1,Type=String,Description=\"Vector of Min(Distance from start/end of exon in the transcript.)\">",
    "##INFO=<ID=annotations,Number=1,Type=String,Description=\"Does the variant fall in exonic/intronic splicing related space in the transcript.\">",
];

/// Write the input header with the annotation INFO declarations added.
///
/// Declarations already present in the input are replaced.
pub fn write_header<W: Write>(writer: &mut W, header: &VcfHeader) -> Result<()> {
    for line in &header.meta {
        let redeclared = INFO_KEYS.iter().any(|key| declares_info(line, key));
        if !redeclared {
            writeln!(writer, "{}", line)?;
        }
    }
    for line in INFO_HEADER_LINES {
        writeln!(writer, "{}", line)?;
    }
    writeln!(writer, "{}", header.columns)?;

    Ok(())
}

/// Rewrite an INFO column with the given key/value pairs.
///
/// Existing entries for these keys are dropped, other entries keep their
/// order, and the new pairs are appended.
pub fn update_info(info: &str, updates: &[(&str, String)]) -> String {
    let mut entries: Vec<String> = info
        .split(';')
        .filter(|entry| !entry.is_empty() && *entry != ".")
        .filter(|entry| {
            let key = entry.split('=').next().unwrap_or("");
            !updates.iter().any(|(update_key, _)| *update_key == key)
        })
        .map(str::to_string)
        .collect();

    for (key, value) in updates {
        entries.push(format!("{}={}", key, value));
    }

    if entries.is_empty() {
        ".".to_string()
    } else {
        entries.join(";")
    }
}

/// Format a record with its annotation as an output line.
pub fn format_output_line(record: &VcfRecord, annotated: &AnnotatedVariant) -> String {
    let updates = [
        (INFO_KEYS[0], annotated.genes_field()),
        (INFO_KEYS[1], annotated.transcripts_field()),
        (INFO_KEYS[2], annotated.distances_field()),
        (INFO_KEYS[3], annotated.annotations_field()),
    ];

    let mut record = record.clone();
    record.set_info(update_info(record.info(), &updates));
    record.to_line()
}
