//! 20-byte account address with Mazze kind classification

use std::fmt;
use thiserror::Error;

/// Address parsing error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
    /// Base32 text has no `prefix:` part or an unknown prefix
    #[error("invalid network prefix: {0}")]
    InvalidPrefix(String),
    /// Character outside the base32 alphabet
    #[error("invalid base32 character: {0:?}")]
    InvalidCharacter(char),
    /// Checksum mismatch
    #[error("base32 checksum mismatch")]
    InvalidChecksum,
    /// Version byte other than zero, or a malformed payload
    #[error("invalid base32 payload: {0}")]
    InvalidPayload(String),
}

/// Account kind, encoded in the leading nibble of the address
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// All-zero address
    Null,
    /// Builtin/internal contract (`0x0...`)
    Builtin,
    /// Externally owned account (`0x1...`)
    User,
    /// Contract account (`0x8...`)
    Contract,
    /// Any other leading nibble (foreign or EVM-space address)
    Unknown,
}

impl AddressKind {
    /// Lowercase name used in verbose address text
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressKind::Null => "null",
            AddressKind::Builtin => "builtin",
            AddressKind::User => "user",
            AddressKind::Contract => "contract",
            AddressKind::Unknown => "unknown",
        }
    }
}

/// 20-byte account address
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Size of address in bytes
    pub const LEN: usize = 20;

    /// Zero address (0x0000...0000)
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create address from bytes
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Create address from slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        if slice.len() != 20 {
            return Err(AddressError::InvalidLength(slice.len()));
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(slice);
        Ok(Address(bytes))
    }

    /// Parse address from hex string (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Parse either hex (`0x...`) or base32 (`net1990:...`) text.
    ///
    /// The network id carried by base32 text is discarded; use
    /// [`crate::decode_base32`] when it matters.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        if s.contains(':') {
            crate::base32::decode_base32(s).map(|(_, address)| address)
        } else {
            Self::from_hex(s)
        }
    }

    /// Get as byte slice
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Check if this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Classify by leading nibble
    pub fn kind(&self) -> AddressKind {
        if self.is_zero() {
            return AddressKind::Null;
        }
        match self.0[0] >> 4 {
            0x0 => AddressKind::Builtin,
            0x1 => AddressKind::User,
            0x8 => AddressKind::Contract,
            _ => AddressKind::Unknown,
        }
    }

    /// True for the builtin, user, and contract ranges (leading nibble 0, 1 or 8)
    pub fn is_native(&self) -> bool {
        matches!(self.0[0] >> 4, 0x0 | 0x1 | 0x8)
    }

    /// Force the leading nibble to the user range
    pub fn to_user(mut self) -> Self {
        self.0[0] = (self.0[0] & 0x0f) | 0x10;
        self
    }

    /// Convert to hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "rlp")]
mod rlp_impl {
    use super::*;
    use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

    impl Encodable for Address {
        fn rlp_append(&self, s: &mut RlpStream) {
            s.encoder().encode_value(&self.0);
        }
    }

    impl Decodable for Address {
        fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
            rlp.decoder().decode_value(|bytes| {
                Address::from_slice(bytes).map_err(|_| DecoderError::RlpInvalidLength)
            })
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Address {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    /// Accepts hex and base32 text; nodes report base32 in RPC payloads.
    impl<'de> Deserialize<'de> for Address {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Address::parse(&s).map_err(de::Error::custom)
        }
    }
}
