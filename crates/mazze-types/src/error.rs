//! Transaction codec errors

use mazze_crypto::CryptoError;
use mazze_rlp::RlpError;
use thiserror::Error;

/// Transaction encoding, decoding or signature error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TxError {
    /// Structural RLP problem (arity, trailing bytes, bad field)
    #[error("rlp: {0}")]
    Rlp(RlpError),

    /// Integer field not in minimal form
    #[error("malformed integer in {field}: {reason}")]
    MalformedInteger {
        /// Field name
        field: &'static str,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Leading byte that names no known layout
    #[error("unknown transaction type: 0x{0:02x}")]
    UnknownType(u8),

    /// Operation needs a signature the transaction does not carry
    #[error("transaction is not signed")]
    MissingSignature,

    /// `v` inconsistent with the layout (and chain id, for legacy)
    #[error("invalid v value {v} for chain id {chain_id}")]
    InvalidV {
        /// Encoded v
        v: u64,
        /// Transaction chain id
        chain_id: u32,
    },

    /// Signing failed or the signature does not recover to a key
    #[error("signature recovery failed: {0}")]
    SignatureRecovery(String),
}

impl From<RlpError> for TxError {
    fn from(err: RlpError) -> Self {
        match err {
            RlpError::MalformedInteger { field, reason } => {
                TxError::MalformedInteger { field, reason }
            }
            other => TxError::Rlp(other),
        }
    }
}

impl From<CryptoError> for TxError {
    fn from(err: CryptoError) -> Self {
        TxError::SignatureRecovery(err.to_string())
    }
}
