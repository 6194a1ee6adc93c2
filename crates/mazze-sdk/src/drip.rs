//! Unit conversion between drip, gdrip and MAZZE

use mazze_primitives::U256;
use std::fmt;

use crate::serde_hex::parse_hex_u256;
use crate::SdkError;

const MAZZE_DECIMALS: usize = 18;
const GDRIP_DECIMALS: usize = 9;

/// Amount in drip, the smallest unit (1 MAZZE = 10^18 drip)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Drip(pub U256);

impl Drip {
    /// Parse a decimal MAZZE amount such as `"3.14"`
    pub fn from_mazze(text: &str) -> Result<Self, SdkError> {
        parse_decimal(text, MAZZE_DECIMALS).map(Drip)
    }

    /// Parse a decimal gdrip amount (1 gdrip = 10^9 drip)
    pub fn from_gdrip(text: &str) -> Result<Self, SdkError> {
        parse_decimal(text, GDRIP_DECIMALS).map(Drip)
    }

    /// Parse an integer drip amount, decimal or `0x` hex
    pub fn from_drip(text: &str) -> Result<Self, SdkError> {
        parse_decimal(text, 0).map(Drip)
    }

    /// Amount in drip
    pub fn value(&self) -> U256 {
        self.0
    }

    /// Decimal MAZZE text with trailing zeros trimmed
    pub fn to_mazze(&self) -> String {
        format_decimal(self.0, MAZZE_DECIMALS)
    }

    /// Decimal gdrip text with trailing zeros trimmed
    pub fn to_gdrip(&self) -> String {
        format_decimal(self.0, GDRIP_DECIMALS)
    }
}

impl From<U256> for Drip {
    fn from(value: U256) -> Self {
        Drip(value)
    }
}

impl From<u64> for Drip {
    fn from(value: u64) -> Self {
        Drip(U256::from(value))
    }
}

impl fmt::Display for Drip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn invalid(text: &str) -> SdkError {
    SdkError::InvalidAmount(text.to_string())
}

fn parse_decimal(text: &str, decimals: usize) -> Result<U256, SdkError> {
    let text = text.trim();
    if text.starts_with("0x") || text.starts_with("0X") {
        let drip = parse_hex_u256(&text[2..]).map_err(|_| invalid(text))?;
        let scale = U256::from(10).pow(U256::from(decimals));
        return drip.checked_mul(scale).ok_or_else(|| invalid(text));
    }

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid(text));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(text));
    }
    if fraction.len() > decimals {
        return Err(SdkError::InvalidAmount(format!(
            "{} has more than {} fractional digits",
            text, decimals
        )));
    }

    let digits = format!("{}{}{}", whole, fraction, "0".repeat(decimals - fraction.len()));
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(digits).map_err(|_| invalid(text))
}

fn format_decimal(value: U256, decimals: usize) -> String {
    let digits = value.to_string();
    if decimals == 0 {
        return digits;
    }
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}
