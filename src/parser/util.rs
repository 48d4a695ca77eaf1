//! Utility functions for opening inputs and outputs.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

fn is_gzip_path(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".gz")
}

/// Creates a buffered reader that automatically handles gzip-compressed files.
///
/// This function checks if the file path ends with ".gz" and wraps the file
/// in a GzDecoder if so. Otherwise, it returns a plain buffered reader.
pub fn create_buffered_reader(file: File, path: &Path) -> Box<dyn BufRead + Send> {
    if is_gzip_path(path) {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    }
}

/// Creates a buffered writer for `path`, or for stdout when no path is given.
///
/// Paths ending in ".gz" are gzip-compressed.
pub fn create_writer(path: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            if is_gzip_path(path) {
                Ok(Box::new(BufWriter::new(GzEncoder::new(
                    file,
                    Compression::default(),
                ))))
            } else {
                Ok(Box::new(BufWriter::new(file)))
            }
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}
