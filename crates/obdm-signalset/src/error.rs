//! Errors raised while loading signalset documents.
//!
//! Both variants are per-document: whether a failing document skips the
//! vehicle or aborts the batch is the caller's policy, not the parser's.

use std::path::PathBuf;

use thiserror::Error;

/// A signalset document could not be loaded.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read from disk.
    #[error("failed to read signalset {path}: {source}")]
    Read {
        /// Path to the unreadable document.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file was read but is not a valid signalset document.
    #[error("failed to parse signalset {path}: {source}")]
    Parse {
        /// Path to the malformed document.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}
