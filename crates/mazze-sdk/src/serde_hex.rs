//! Hex quantity parsing and serde adapters for RPC payloads

use bytes::Bytes;
use mazze_primitives::U256;
use serde::{de, Deserialize, Deserializer};

use crate::SdkError;

pub(crate) fn parse_hex_u64(s: &str) -> Result<u64, SdkError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| SdkError::InvalidHex(format!("{}: {}", s, e)))
}

pub(crate) fn parse_hex_u256(s: &str) -> Result<U256, SdkError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() || digits.len() > 64 {
        return Err(SdkError::InvalidHex(s.to_string()));
    }
    U256::from_str_radix(digits, 16).map_err(|_| SdkError::InvalidHex(s.to_string()))
}

pub(crate) fn parse_hex_bytes(s: &str) -> Result<Bytes, SdkError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return Ok(Bytes::new());
    }
    Ok(Bytes::from(hex::decode(digits)?))
}

/// `0x` quantity for U256
pub(crate) fn quantity(value: &U256) -> String {
    format!("0x{:x}", value)
}

pub(crate) fn de_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let s = String::deserialize(d)?;
    parse_hex_u64(&s).map_err(de::Error::custom)
}

pub(crate) fn de_opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Option::<String>::deserialize(d)?
        .map(|s| parse_hex_u64(&s).map_err(de::Error::custom))
        .transpose()
}

pub(crate) fn de_u256<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
    let s = String::deserialize(d)?;
    parse_hex_u256(&s).map_err(de::Error::custom)
}

pub(crate) fn de_opt_u256<'de, D: Deserializer<'de>>(d: D) -> Result<Option<U256>, D::Error> {
    Option::<String>::deserialize(d)?
        .map(|s| parse_hex_u256(&s).map_err(de::Error::custom))
        .transpose()
}

pub(crate) fn de_bytes<'de, D: Deserializer<'de>>(d: D) -> Result<Bytes, D::Error> {
    let s = Option::<String>::deserialize(d)?.unwrap_or_default();
    parse_hex_bytes(&s).map_err(de::Error::custom)
}
