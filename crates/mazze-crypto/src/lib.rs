//! # mazze-crypto
//!
//! Cryptographic primitives for Mazze clients.
//!
//! - Keccak-256 hashing
//! - Deterministic ECDSA signing/verification (secp256k1)
//! - Public key recovery
//! - Account address derivation
//! - Plain message signatures

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod message;
mod signature;

pub use error::CryptoError;
pub use hash::{keccak256, keccak256_concat};
pub use message::Message;
pub use signature::{
    private_key_from_bytes, public_key_to_address, public_key_to_bytes, recover_public_key, sign,
    verify, PrivateKey, PublicKey, Signature,
};
