//! Error types for Synheart Vitality
//!
//! The scoring pipeline itself never fails; these errors only surface at the
//! JSON, FFI and CLI boundaries.

use thiserror::Error;

/// Errors that can occur while decoding snapshots or encoding results
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse snapshot: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
