//! Error types for cauchy-erasure

use std::io;
use thiserror::Error;

use crate::codec::CodecStatus;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cauchy-erasure
#[derive(Error, Debug)]
pub enum Error {
    // Construction errors
    #[error("Invalid share count: {data_shares} must be within 1..={limit}")]
    InvalidShareCount { data_shares: usize, limit: usize },

    #[error("Field cardinality {requested} exceeds field limit {limit}")]
    FieldLimit { requested: usize, limit: usize },

    // Encoding errors
    #[error("Invalid row length: {0}")]
    InvalidRowLength(usize),

    #[error("Block length mismatch: expected {expected} bytes, got {got}")]
    BlockLength { expected: usize, got: usize },

    #[error("Encode limit reached: all {limit} rows have been emitted")]
    EncodeLimit { limit: usize },

    // Decoding errors
    #[error("Expected {expected} row indices, got {got}")]
    IndexCount { expected: usize, got: usize },

    #[error("Row index {index} out of range (limit {limit})")]
    RowIndexOutOfRange { index: usize, limit: usize },

    #[error("Duplicate row index: {0}")]
    DuplicateRowIndex(usize),

    #[error("Encode submatrix is singular: zero pivot at row {0}")]
    SingularMatrix(usize),

    // Field errors
    #[error("Division by zero in finite field")]
    DivisionByZero,

    #[error("Matrix dimension mismatch: {0}")]
    DimensionMismatch(String),

    // Stripe errors
    #[error("Not enough shards to reconstruct: need {required}, have {available}")]
    NotEnoughShards { available: usize, required: usize },

    #[error("Expected {expected} shards, got {got}")]
    ShardCount { expected: usize, got: usize },

    #[error("Shard {index} has length {got}, expected {expected}")]
    ShardLength {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error("Erasure decoding failed: {0}")]
    ErasureDecode(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// The codec status category this error belongs to, if it is a codec fault
    ///
    /// Row and block length faults depend on the operation that raised them,
    /// so the codec records those itself and this returns `None`. Division by
    /// zero is a field fault that construction and decoding can both hit, so
    /// it has no category either.
    pub fn status(&self) -> Option<CodecStatus> {
        match self {
            Error::InvalidShareCount { .. } | Error::FieldLimit { .. } => {
                Some(CodecStatus::ConstructionError)
            }
            Error::EncodeLimit { .. } => Some(CodecStatus::EncodingError),
            Error::IndexCount { .. }
            | Error::RowIndexOutOfRange { .. }
            | Error::DuplicateRowIndex(_)
            | Error::SingularMatrix(_)
            | Error::NotEnoughShards { .. }
            | Error::ShardCount { .. }
            | Error::ShardLength { .. }
            | Error::ErasureDecode(_) => Some(CodecStatus::DecodingError),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
