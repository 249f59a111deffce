use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Recoverable failures surfaced by the registry, the pool selection and the
/// quiz session. None of them leave state half-updated.
#[derive(Debug, Error)]
pub enum DrillError {
    #[error("open word book {name} failed: {source}")]
    SourceUnreadable {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("open manifest {} failed: {source}", path.display())]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown word book: {0}")]
    UnknownSelection(String),

    #[error("invalid range [{from}, {to})")]
    InvalidRange { from: String, to: String },

    #[error("max attempts must be a positive number, got {0}")]
    InvalidMaxAttempts(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("session already finished")]
    SessionFinished,
}
