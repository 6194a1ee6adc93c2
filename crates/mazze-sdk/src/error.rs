//! SDK error types

use std::time::Duration;

use mazze_types::TxError;
use thiserror::Error;

use crate::pending::Checkpoint;

/// SDK error type
#[derive(Debug, Error)]
pub enum SdkError {
    /// Type string could not be parsed
    #[error("Invalid type `{offending}` in `{input}`")]
    TypeParse {
        /// Whole input
        input: String,
        /// Substring the parser stopped at
        offending: String,
    },

    /// Wrong number of values for a tuple, array or parameter list
    #[error("Expected {expected} values, got {got}")]
    EncodeArity {
        /// Number of parameters
        expected: usize,
        /// Number of values supplied
        got: usize,
    },

    /// Value does not fit the declared width
    #[error("Value {value} out of range for {kind}")]
    EncodeRange {
        /// Canonical type
        kind: String,
        /// Offending value
        value: String,
    },

    /// Buffer ended before the decoder was done
    #[error("Insufficient data: need {needed} bytes, have {available}")]
    DecodeUnderflow {
        /// Bytes required
        needed: usize,
        /// Bytes present
        available: usize,
    },

    /// Integer field in a raw transaction not in minimal form
    #[error("Malformed integer in {field}: {reason}")]
    MalformedInteger {
        /// Field name
        field: &'static str,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Signature missing, malformed, or not recoverable
    #[error("Signature recovery failed: {0}")]
    SignatureRecovery(String),

    /// Checkpoint not reached before the deadline
    #[error("Timed out waiting for {checkpoint:?} after {elapsed:?}")]
    ConfirmationTimeout {
        /// Checkpoint being waited for
        checkpoint: Checkpoint,
        /// Time spent waiting
        elapsed: Duration,
    },

    /// Wait aborted by the caller
    #[error("Cancelled")]
    Cancelled,

    /// Tracking stopped after an earlier unrecoverable error
    #[error("Transaction tracking failed: {0}")]
    Failed(String),

    /// Operation not valid in the current tracking state
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    /// Error reported by the node
    #[error("RPC error: {code} - {message}")]
    RemoteRpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },

    /// Transport/network error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Node answered with something that does not parse
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Invalid hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Invalid unit amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Other ABI misuse (type mismatch, unknown name, bad payload)
    #[error("ABI error: {0}")]
    Abi(String),
}

impl SdkError {
    /// Whether a confirmation wait should retry after this error
    pub fn is_transient(&self) -> bool {
        matches!(self, SdkError::RemoteRpc { .. } | SdkError::Transport(_))
    }
}

impl From<hex::FromHexError> for SdkError {
    fn from(e: hex::FromHexError) -> Self {
        SdkError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<mazze_crypto::CryptoError> for SdkError {
    fn from(e: mazze_crypto::CryptoError) -> Self {
        match e {
            mazze_crypto::CryptoError::InvalidPrivateKey => {
                SdkError::InvalidPrivateKey(e.to_string())
            }
            other => SdkError::SignatureRecovery(other.to_string()),
        }
    }
}

impl From<mazze_primitives::AddressError> for SdkError {
    fn from(e: mazze_primitives::AddressError) -> Self {
        SdkError::InvalidAddress(e.to_string())
    }
}

impl From<mazze_primitives::HashError> for SdkError {
    fn from(e: mazze_primitives::HashError) -> Self {
        SdkError::InvalidHex(e.to_string())
    }
}

impl From<TxError> for SdkError {
    fn from(e: TxError) -> Self {
        match e {
            TxError::MalformedInteger { field, reason } => {
                SdkError::MalformedInteger { field, reason }
            }
            TxError::SignatureRecovery(msg) => SdkError::SignatureRecovery(msg),
            TxError::MissingSignature | TxError::InvalidV { .. } => {
                SdkError::SignatureRecovery(e.to_string())
            }
            other => SdkError::Serialization(other.to_string()),
        }
    }
}
