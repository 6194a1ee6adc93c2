//! Address rendering for decoded values

use mazze_primitives::{encode_base32, Address};
use serde_json::Value;

use super::types::Token;
use crate::SdkError;

/// Renders and parses addresses for one network
///
/// Addresses in the builtin, user and contract ranges render as base32 text
/// when a network id is configured. Everything else renders as hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddressCoder {
    network_id: Option<u32>,
}

impl AddressCoder {
    /// Coder for an optional network
    pub fn new(network_id: Option<u32>) -> Self {
        Self { network_id }
    }

    /// Coder that always renders hex
    pub fn hex() -> Self {
        Self { network_id: None }
    }

    /// Configured network id
    pub fn network_id(&self) -> Option<u32> {
        self.network_id
    }

    /// Text form of an address
    pub fn format(&self, address: &Address) -> String {
        match self.network_id {
            Some(id) if address.is_native() => encode_base32(address, id),
            _ => address.to_hex(),
        }
    }

    /// Parse hex or base32 text
    ///
    /// Base32 text for a different network than the configured one is rejected.
    pub fn parse(&self, text: &str) -> Result<Address, SdkError> {
        if text.contains(':') {
            let (network_id, address) = mazze_primitives::decode_base32(text)?;
            if let Some(expected) = self.network_id {
                if expected != network_id {
                    return Err(SdkError::InvalidAddress(format!(
                        "{} belongs to network {}, expected {}",
                        text, network_id, expected
                    )));
                }
            }
            return Ok(address);
        }
        Ok(Address::from_hex(text)?)
    }
}

impl Token {
    /// JSON rendering for display
    ///
    /// Integers become decimal strings, byte strings `0x` hex, addresses go
    /// through `coder`.
    pub fn to_json(&self, coder: &AddressCoder) -> Value {
        match self {
            Token::Address(addr) => Value::String(coder.format(addr)),
            Token::Uint(value) => Value::String(value.to_string()),
            Token::Int(value) => Value::String(value.to_string()),
            Token::Bool(b) => Value::Bool(*b),
            Token::Bytes(data) | Token::FixedBytes(data) => {
                Value::String(format!("0x{}", hex::encode(data)))
            }
            Token::String(s) => Value::String(s.clone()),
            Token::Array(tokens) | Token::FixedArray(tokens) | Token::Tuple(tokens) => {
                Value::Array(tokens.iter().map(|t| t.to_json(coder)).collect())
            }
        }
    }
}
