//! Strict decoding errors

use thiserror::Error;

/// RLP decoding error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RlpError {
    /// Zero-length input
    #[error("empty input")]
    Empty,

    /// Structural error from the underlying decoder
    #[error("rlp: {0:?}")]
    Decoder(rlp::DecoderError),

    /// Bytes left over after the top-level item
    #[error("{extra} trailing bytes after rlp item")]
    TrailingBytes {
        /// Number of unconsumed bytes
        extra: usize,
    },

    /// Expected a list, found a byte string
    #[error("expected rlp list for {0}")]
    ExpectedList(&'static str),

    /// Expected a byte string, found a list
    #[error("expected rlp string for {0}")]
    ExpectedData(&'static str),

    /// List has the wrong number of items
    #[error("expected {expected} fields, got {got}")]
    FieldCount {
        /// Required item count
        expected: usize,
        /// Actual item count
        got: usize,
    },

    /// Integer not in minimal big-endian form
    #[error("malformed integer in {field}: {reason}")]
    MalformedInteger {
        /// Field name
        field: &'static str,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Field with a value outside its domain (length, width)
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },
}

impl From<rlp::DecoderError> for RlpError {
    fn from(err: rlp::DecoderError) -> Self {
        RlpError::Decoder(err)
    }
}
