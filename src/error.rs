//! Error types for nanopore QC analysis

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, QcError>;

/// Errors raised while loading index files or computing statistics
#[derive(Debug, Error)]
pub enum QcError {
    /// A listed file or directory does not exist or cannot be opened
    #[error("Cannot open {}: {source}", path.display())]
    NotFound {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// I/O error after the file was opened
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed row or unusable file name
    #[error("Invalid index format in {} at line {line}: {msg}", path.display())]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// 1-based line number (0 when the problem is the file name itself)
        line: usize,
        /// Error message
        msg: String,
    },

    /// Standard error and confidence interval are undefined for a single read
    #[error("Sample {sample} (filtered={filtered}) has a single read; standard error and CI are undefined")]
    DegenerateSample {
        /// Sample name
        sample: String,
        /// Filter state of the group
        filtered: bool,
    },

    /// Summary requested for a group without records
    #[error("Cannot summarize an empty group")]
    EmptyGroup,

    /// Not enough data to fit a model
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Invalid analysis parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QcError {
    pub(crate) fn not_found(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QcError::NotFound {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, msg: impl Into<String>) -> Self {
        QcError::Parse {
            path: path.into(),
            line,
            msg: msg.into(),
        }
    }
}
