//! Error types for the annotation core.

use thiserror::Error;

/// Fatal conditions raised while annotating a variant.
///
/// Neither kind is recoverable: both mean the loaded feature data cannot be
/// classified, so the run driver aborts on the first occurrence.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnnotateError {
    /// A transcript's strand is neither `+` nor `-`.
    #[error("unknown strand '{0}'")]
    UnknownStrand(char),

    /// The feature store lists a transcript without any exons.
    #[error("no exons for transcript {0}")]
    MissingExons(String),
}
