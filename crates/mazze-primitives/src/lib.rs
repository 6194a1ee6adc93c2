//! # mazze-primitives
//!
//! Fixed-size value types shared by the Mazze client crates: addresses with
//! their checksummed base32 text form, 32-byte hashes, and 256-bit integers.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod base32;
mod hash;

pub use address::{Address, AddressError, AddressKind};
pub use base32::{
    decode_base32, encode_base32, encode_base32_verbose, network_prefix, MAINNET_ID, TESTNET_ID,
};
pub use hash::{HashError, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;
