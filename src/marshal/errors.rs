//! Marshaling errors

use std::io;

use thiserror::Error;

pub type MarshalResult<T> = Result<T, MarshalError>;

#[derive(Debug, Error)]
pub enum MarshalError {
    /// The backend failed while producing rows
    #[error("Row fetch failed: {0}")]
    Fetch(String),

    /// A cell could not be decoded as its column's kind
    #[error("Cannot decode column {column}: {reason}")]
    Decode { column: String, reason: String },

    /// JSON encoding failed
    #[error("Encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The sink stopped accepting chunks
    #[error("Sink write failed: {0}")]
    Sink(#[from] io::Error),
}
