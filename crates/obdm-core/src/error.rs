//! Error types shared across the matrix pipeline core.
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations. Per-stage policy (skip a vehicle vs. abort the batch)
//! lives with the caller, not here.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed while producing canonical bytes.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
