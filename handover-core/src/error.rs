//! Error types for the handover-core crate.

use std::result;
use thiserror::Error;

/// Core handover error types.
#[derive(Debug, Error)]
pub enum Error {
    /// Error related to serialization/deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Error related to validation failures.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error related to parsing operations.
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Custom Result type for handover-core operations.
pub type Result<T> = result::Result<T, Error>;
