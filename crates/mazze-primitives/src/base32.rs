//! Checksummed base32 address text.
//!
//! `<prefix>:<body>` where the prefix names the network (`mazze`, `mazzetest`,
//! `net<id>`) and the body packs a version byte plus the 20 address bytes into
//! 5-bit words followed by an 8-word checksum. The verbose form upper-cases
//! everything and inserts a `TYPE.<KIND>` section.

use crate::address::{Address, AddressError};

/// Network id rendered with the `mazze` prefix
pub const MAINNET_ID: u32 = 9999;

/// Network id rendered with the `mazzetest` prefix
pub const TESTNET_ID: u32 = 1;

const ALPHABET: &[u8; 32] = b"abcdefghjkmnprstuvwxyz0123456789";
const VERSION_BYTE: u8 = 0x00;
const BODY_WORDS: usize = 34;
const CHECKSUM_WORDS: usize = 8;

/// Text prefix for a network id
pub fn network_prefix(network_id: u32) -> String {
    match network_id {
        MAINNET_ID => "mazze".to_string(),
        TESTNET_ID => "mazzetest".to_string(),
        id => format!("net{}", id),
    }
}

fn parse_prefix(prefix: &str) -> Result<u32, AddressError> {
    match prefix {
        "mazze" => Ok(MAINNET_ID),
        "mazzetest" => Ok(TESTNET_ID),
        other => {
            let id = other
                .strip_prefix("net")
                .filter(|digits| !digits.starts_with('0'))
                .and_then(|digits| digits.parse::<u32>().ok())
                .ok_or_else(|| AddressError::InvalidPrefix(prefix.to_string()))?;
            if id == MAINNET_ID || id == TESTNET_ID {
                return Err(AddressError::InvalidPrefix(prefix.to_string()));
            }
            Ok(id)
        }
    }
}

fn polymod(words: impl IntoIterator<Item = u8>) -> u64 {
    let mut c: u64 = 1;
    for d in words {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(d);
        if c0 & 0x01 != 0 {
            c ^= 0x98_f2bc_8e61;
        }
        if c0 & 0x02 != 0 {
            c ^= 0x79_b76d_99e2;
        }
        if c0 & 0x04 != 0 {
            c ^= 0xf3_3e5f_b3c4;
        }
        if c0 & 0x08 != 0 {
            c ^= 0xae_2eab_e2a8;
        }
        if c0 & 0x10 != 0 {
            c ^= 0x1e_4f43_e470;
        }
    }
    c ^ 1
}

fn checksum(prefix: &str, body: &[u8]) -> u64 {
    let prefix_words = prefix.bytes().map(|b| b & 0x1f);
    polymod(
        prefix_words
            .chain(std::iter::once(0))
            .chain(body.iter().copied())
            .chain(std::iter::repeat(0).take(CHECKSUM_WORDS)),
    )
}

/// Regroup bits, padding the tail with zeros when `pad` is set
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max = (1u32 << to) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);
    for &value in data {
        acc = (acc << from) | u32::from(value);
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max) != 0 {
        return None;
    }
    Some(out)
}

/// Encode an address as `<prefix>:<body>` for the given network
pub fn encode_base32(address: &Address, network_id: u32) -> String {
    let prefix = network_prefix(network_id);
    let mut payload = Vec::with_capacity(21);
    payload.push(VERSION_BYTE);
    payload.extend_from_slice(address.as_bytes());
    // 168 bits always regroup into 34 words
    let body = convert_bits(&payload, 8, 5, true).unwrap_or_default();
    let sum = checksum(&prefix, &body);

    let mut text = String::with_capacity(prefix.len() + 1 + BODY_WORDS + CHECKSUM_WORDS);
    text.push_str(&prefix);
    text.push(':');
    for word in body {
        text.push(ALPHABET[word as usize] as char);
    }
    for i in (0..CHECKSUM_WORDS).rev() {
        text.push(ALPHABET[((sum >> (5 * i)) & 0x1f) as usize] as char);
    }
    text
}

/// Verbose form: `NET1990:TYPE.USER:AASM...`
pub fn encode_base32_verbose(address: &Address, network_id: u32) -> String {
    let short = encode_base32(address, network_id);
    let (prefix, body) = short.split_once(':').unwrap_or(("", &short));
    format!(
        "{}:TYPE.{}:{}",
        prefix.to_uppercase(),
        address.kind().as_str().to_uppercase(),
        body.to_uppercase()
    )
}

/// Decode base32 text into `(network_id, address)`
pub fn decode_base32(text: &str) -> Result<(u32, Address), AddressError> {
    let has_lower = text.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = text.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(AddressError::InvalidPayload("mixed case".to_string()));
    }
    let lower = text.to_ascii_lowercase();

    let parts: Vec<&str> = lower.split(':').collect();
    let (prefix, kind, body) = match parts.as_slice() {
        [prefix, body] => (*prefix, None, *body),
        [prefix, kind, body] => (*prefix, Some(*kind), *body),
        _ => return Err(AddressError::InvalidPrefix(text.to_string())),
    };
    let network_id = parse_prefix(prefix)?;

    if body.len() != BODY_WORDS + CHECKSUM_WORDS {
        return Err(AddressError::InvalidPayload(format!(
            "expected {} characters, got {}",
            BODY_WORDS + CHECKSUM_WORDS,
            body.len()
        )));
    }

    let mut words = Vec::with_capacity(body.len());
    for c in body.chars() {
        let index = ALPHABET
            .iter()
            .position(|&a| a as char == c)
            .ok_or(AddressError::InvalidCharacter(c))?;
        words.push(index as u8);
    }

    let (body_words, checksum_words) = words.split_at(BODY_WORDS);
    let expected = checksum_words
        .iter()
        .fold(0u64, |acc, &w| (acc << 5) | u64::from(w));
    if checksum(prefix, body_words) != expected {
        return Err(AddressError::InvalidChecksum);
    }

    let payload = convert_bits(body_words, 5, 8, false)
        .ok_or_else(|| AddressError::InvalidPayload("non-zero padding".to_string()))?;
    if payload.first() != Some(&VERSION_BYTE) {
        return Err(AddressError::InvalidPayload("unknown version byte".to_string()));
    }
    let address = Address::from_slice(&payload[1..])?;

    if let Some(kind) = kind {
        let expected_kind = format!("type.{}", address.kind().as_str());
        if kind != expected_kind {
            return Err(AddressError::InvalidPayload(format!(
                "type section {} does not match {}",
                kind, expected_kind
            )));
        }
    }

    Ok((network_id, address))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Address {
        Address::from_hex("0x1cad0b19bb29d4674531d6f115237e16afce377c").unwrap()
    }

    // ==================== Encoding ====================

    #[test]
    fn test_encode_testnet() {
        assert_eq!(
            encode_base32(&user(), TESTNET_ID),
            "mazzetest:aasm4c231py7j34fghntcfkdt2nm9xv1tum0f0a8zw"
        );
    }

    #[test]
    fn test_encode_mainnet_and_custom() {
        assert_eq!(
            encode_base32(&user(), MAINNET_ID),
            "mazze:aasm4c231py7j34fghntcfkdt2nm9xv1tu4513y52z"
        );
        assert_eq!(
            encode_base32(&user(), 1990),
            "net1990:aasm4c231py7j34fghntcfkdt2nm9xv1tuekv0su6j"
        );
    }

    #[test]
    fn test_encode_builtin_and_zero() {
        let builtin = Address::from_hex("0x0888000000000000000000000000000000000000").unwrap();
        assert_eq!(
            encode_base32(&builtin, 1990),
            "net1990:aaejuaaaaaaaaaaaaaaaaaaaaaaaaaaaaamag1r7j0"
        );
        assert_eq!(
            encode_base32(&Address::ZERO, 1990),
            "net1990:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaeee8sf6h"
        );
    }

    #[test]
    fn test_encode_verbose() {
        assert_eq!(
            encode_base32_verbose(&user(), 1990),
            "NET1990:TYPE.USER:AASM4C231PY7J34FGHNTCFKDT2NM9XV1TUEKV0SU6J"
        );
    }

    // ==================== Decoding ====================

    #[test]
    fn test_decode_roundtrip() {
        for id in [TESTNET_ID, MAINNET_ID, 1990, 2] {
            let text = encode_base32(&user(), id);
            assert_eq!(decode_base32(&text).unwrap(), (id, user()));
        }
    }

    #[test]
    fn test_decode_verbose_and_uppercase() {
        let verbose = encode_base32_verbose(&user(), 1990);
        assert_eq!(decode_base32(&verbose).unwrap(), (1990, user()));
        let upper = "MAZZETEST:AASM4C231PY7J34FGHNTCFKDT2NM9XV1TUM0F0A8ZW";
        assert_eq!(decode_base32(upper).unwrap(), (TESTNET_ID, user()));
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let text = "mazzetest:aasm4c231py7j34fghntcfkdt2nm9xv1tum0f0a8zx";
        assert_eq!(decode_base32(text), Err(AddressError::InvalidChecksum));
    }

    #[test]
    fn test_decode_rejects_wrong_prefix_for_checksum() {
        let text = "net1990:aasm4c231py7j34fghntcfkdt2nm9xv1tum0f0a8zw";
        assert_eq!(decode_base32(text), Err(AddressError::InvalidChecksum));
    }

    #[test]
    fn test_decode_rejects_bad_prefix() {
        assert!(matches!(
            decode_base32("net1:aasm4c231py7j34fghntcfkdt2nm9xv1tum0f0a8zw"),
            Err(AddressError::InvalidPrefix(_))
        ));
        assert!(matches!(
            decode_base32("bitcoin:aasm4c231py7j34fghntcfkdt2nm9xv1tum0f0a8zw"),
            Err(AddressError::InvalidPrefix(_))
        ));
        assert!(matches!(
            decode_base32("aasm4c231py7j34fghntcfkdt2nm9xv1tum0f0a8zw"),
            Err(AddressError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_character() {
        // 'o' is not in the alphabet
        let text = "mazzetest:oasm4c231py7j34fghntcfkdt2nm9xv1tum0f0a8zw";
        assert_eq!(decode_base32(text), Err(AddressError::InvalidCharacter('o')));
    }

    #[test]
    fn test_decode_rejects_mixed_case() {
        let text = "mazzetest:AAsm4c231py7j34fghntcfkdt2nm9xv1tum0f0a8zw";
        assert!(matches!(decode_base32(text), Err(AddressError::InvalidPayload(_))));
    }

    #[test]
    fn test_decode_rejects_mismatched_type_section() {
        let text = "NET1990:TYPE.CONTRACT:AASM4C231PY7J34FGHNTCFKDT2NM9XV1TUEKV0SU6J";
        assert!(matches!(decode_base32(text), Err(AddressError::InvalidPayload(_))));
    }
}
