//! VCF reader with gzip support.
//!
//! Only the parts of VCF the annotator touches are interpreted: the header
//! is kept verbatim, and each record exposes its chromosome, position and
//! INFO column. Everything else is passed through unchanged.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::BufRead;
use std::path::Path;

use crate::parser::util::create_buffered_reader;
use crate::types::Variant;

/// Minimum number of columns in a VCF data line (CHROM .. INFO).
pub const MIN_VCF_COLUMNS: usize = 8;

const CHROM_COLUMN: usize = 0;
const POS_COLUMN: usize = 1;
const INFO_COLUMN: usize = 7;

/// Header lines of a VCF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfHeader {
    /// `##` meta-information lines, in file order.
    pub meta: Vec<String>,
    /// The `#CHROM ...` column header line.
    pub columns: String,
}

/// Whether a meta line declares the INFO field `id`.
pub fn declares_info(line: &str, id: &str) -> bool {
    line.strip_prefix("##INFO=<ID=")
        .and_then(|rest| rest.strip_prefix(id))
        .is_some_and(|rest| rest.starts_with(',') || rest.starts_with('>'))
}

/// One VCF data line split into columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfRecord {
    fields: Vec<String>,
    /// 1-based line number in the input, for diagnostics.
    pub line_number: usize,
}

impl VcfRecord {
    /// Parse a data line.
    pub fn parse(line: &str, line_number: usize) -> Result<Self> {
        let fields: Vec<String> = line.split('\t').map(str::to_string).collect();
        if fields.len() < MIN_VCF_COLUMNS {
            bail!(
                "VCF line {}: expected at least {} columns, found {}",
                line_number,
                MIN_VCF_COLUMNS,
                fields.len()
            );
        }

        let record = VcfRecord {
            fields,
            line_number,
        };
        let pos = record.pos1()?;
        if pos < 1 {
            bail!("VCF line {}: position must be at least 1", line_number);
        }
        Ok(record)
    }

    pub fn chrom(&self) -> &str {
        &self.fields[CHROM_COLUMN]
    }

    /// The 1-based POS column.
    fn pos1(&self) -> Result<i64> {
        self.fields[POS_COLUMN]
            .parse()
            .with_context(|| format!("VCF line {}: invalid position", self.line_number))
    }

    /// 0-based position of the record.
    pub fn pos0(&self) -> i64 {
        // Validated in `parse`.
        self.fields[POS_COLUMN].parse::<i64>().unwrap_or(1) - 1
    }

    /// The variant as seen by the annotator.
    pub fn variant(&self) -> Variant {
        Variant::new(self.chrom().to_string(), self.pos0())
    }

    pub fn info(&self) -> &str {
        &self.fields[INFO_COLUMN]
    }

    pub fn set_info(&mut self, info: String) {
        self.fields[INFO_COLUMN] = info;
    }

    /// The record as a tab-separated line, without newline.
    pub fn to_line(&self) -> String {
        self.fields.join("\t")
    }
}

/// Streaming VCF reader for chunked processing.
pub struct VcfReader {
    reader: Box<dyn BufRead + Send>,
    header: VcfHeader,
    line_number: usize,
}

impl VcfReader {
    /// Open a VCF file (supports .gz) and read its header.
    pub fn new(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open VCF file {}", path.display()))?;
        let reader = create_buffered_reader(file, path);
        Self::from_reader(reader)
    }

    /// Read the header from an already opened reader.
    pub fn from_reader(mut reader: Box<dyn BufRead + Send>) -> Result<Self> {
        let mut meta = Vec::new();
        let mut line = String::new();
        let mut line_number = 0;

        let columns = loop {
            line.clear();
            let bytes_read = reader
                .read_line(&mut line)
                .context("Failed to read VCF header")?;
            if bytes_read == 0 {
                bail!("Malformed VCF header: missing #CHROM line");
            }
            line_number += 1;

            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.starts_with("##") {
                meta.push(trimmed.to_string());
            } else if trimmed.starts_with("#CHROM") {
                break trimmed.to_string();
            } else {
                bail!(
                    "Malformed VCF header: unexpected line {} before #CHROM",
                    line_number
                );
            }
        };

        Ok(VcfReader {
            reader,
            header: VcfHeader { meta, columns },
            line_number,
        })
    }

    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    /// Read the next record, `None` at end of file.
    pub fn read_record(&mut self) -> Result<Option<VcfRecord>> {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = self
                .reader
                .read_line(&mut line)
                .context("Failed to read VCF line")?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            // Skip empty lines
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() {
                continue;
            }
            return VcfRecord::parse(trimmed, self.line_number).map(Some);
        }
    }

    /// Read the next chunk of records.
    ///
    /// Returns `None` when EOF is reached. Records are returned in file order.
    pub fn read_chunk(&mut self, size: usize) -> Result<Option<Vec<VcfRecord>>> {
        let mut records = Vec::with_capacity(size);
        while records.len() < size {
            match self.read_record()? {
                Some(record) => records.push(record),
                None => break,
            }
        }

        if records.is_empty() {
            Ok(None)
        } else {
            Ok(Some(records))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    const VCF: &str = "##fileformat=VCFv4.2\n\
##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Depth\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
chr1\t199\t.\tA\tG\t.\tPASS\tDP=10\n\
\n\
chr1\t250\trs1\tC\tT\t50\tPASS\t.\n";

    fn reader_for(content: &'static str) -> Result<VcfReader> {
        VcfReader::from_reader(Box::new(BufReader::new(Cursor::new(content))))
    }

    #[test]
    fn test_read_header_and_records() {
        let mut reader = reader_for(VCF).unwrap();
        assert_eq!(reader.header().meta.len(), 2);
        assert!(reader.header().columns.starts_with("#CHROM\tPOS"));
        assert!(declares_info(&reader.header().meta[1], "DP"));
        assert!(!declares_info(&reader.header().meta[1], "D"));
        assert!(!declares_info(&reader.header().meta[0], "DP"));

        let first = reader.read_record().unwrap().unwrap();
        assert_eq!(first.chrom(), "chr1");
        assert_eq!(first.pos0(), 198);
        assert_eq!(first.variant().coordinate(), 199);
        assert_eq!(first.info(), "DP=10");
        assert_eq!(first.line_number, 4);

        let second = reader.read_record().unwrap().unwrap();
        assert_eq!(second.pos0(), 249);
        assert_eq!(second.line_number, 6);

        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_read_chunk() {
        let mut reader = reader_for(VCF).unwrap();
        let chunk = reader.read_chunk(1).unwrap().unwrap();
        assert_eq!(chunk.len(), 1);
        let chunk = reader.read_chunk(10).unwrap().unwrap();
        assert_eq!(chunk.len(), 1);
        assert!(reader.read_chunk(10).unwrap().is_none());
    }

    #[test]
    fn test_missing_chrom_line() {
        let err = reader_for("##fileformat=VCFv4.2\n").err().unwrap();
        assert!(err.to_string().contains("#CHROM"));
    }

    #[test]
    fn test_data_before_header() {
        assert!(reader_for("chr1\t1\t.\tA\tG\t.\t.\t.\n").is_err());
    }

    #[test]
    fn test_short_record_is_an_error() {
        let err = VcfRecord::parse("chr1\t10\t.\tA", 7).unwrap_err();
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn test_bad_position_is_an_error() {
        assert!(VcfRecord::parse("chr1\tabc\t.\tA\tG\t.\t.\t.", 1).is_err());
        assert!(VcfRecord::parse("chr1\t0\t.\tA\tG\t.\t.\t.", 1).is_err());
    }

    #[test]
    fn test_record_round_trip_keeps_columns() {
        let line = "chr1\t10\t.\tA\tG\t.\tPASS\t.\tGT\t0/1";
        let mut record = VcfRecord::parse(line, 1).unwrap();
        assert_eq!(record.to_line(), line);
        record.set_info("genes=NA".to_string());
        assert_eq!(record.to_line(), "chr1\t10\t.\tA\tG\t.\tPASS\tgenes=NA\tGT\t0/1");
    }
}
