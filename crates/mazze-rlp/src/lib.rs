//! # mazze-rlp
//!
//! RLP (Recursive Length Prefix) encoding/decoding for Mazze transactions.
//!
//! Encoding goes through the `rlp` crate. Decoding of transaction fields goes
//! through [`ListReader`], which is stricter than `rlp` itself: integers must
//! be minimal, lists must have the exact arity, and no bytes may trail the
//! top-level item.
//!
//! ## RLP Encoding Rules
//!
//! - Single byte `[0x00, 0x7f]`: itself
//! - Short string (0-55 bytes): `0x80 + len` + data
//! - Long string (>55 bytes): `0xb7 + len_of_len` + len + data
//! - Short list (0-55 bytes payload): `0xc0 + len` + items
//! - Long list (>55 bytes payload): `0xf7 + len_of_len` + len + items

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod reader;

pub use error::RlpError;
pub use reader::ListReader;

// Re-export rlp crate for direct use
pub use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

use mazze_primitives::Address;

/// Encode a value to RLP bytes
pub fn encode<T: Encodable>(value: &T) -> Vec<u8> {
    rlp::encode(value).to_vec()
}

/// Decode RLP bytes to a value
pub fn decode<T: Decodable>(data: &[u8]) -> Result<T, DecoderError> {
    rlp::decode(data)
}

/// Append an optional address; `None` becomes the empty string
pub fn append_optional_address(stream: &mut RlpStream, address: Option<&Address>) {
    match address {
        Some(address) => {
            stream.append(address);
        }
        None => {
            stream.append_empty_data();
        }
    }
}

/// Append a byte string
pub fn append_bytes(stream: &mut RlpStream, data: &[u8]) {
    stream.append(&data);
}

/// Append a 32-byte word as a minimal integer (signature r/s)
pub fn append_word(stream: &mut RlpStream, word: &[u8; 32]) {
    let start = word.iter().position(|&b| b != 0).unwrap_or(32);
    stream.append(&&word[start..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazze_primitives::{H256, U256};

    // ==================== Encoding ====================

    #[test]
    fn test_yellow_paper_examples() {
        assert_eq!(rlp::encode(&"dog").to_vec(), vec![0x83, b'd', b'o', b'g']);

        let mut stream = RlpStream::new_list(2);
        stream.append(&"cat");
        stream.append(&"dog");
        assert_eq!(
            stream.out().to_vec(),
            vec![0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g']
        );

        assert_eq!(encode(&0u64), vec![0x80]);
        assert_eq!(encode(&15u64), vec![0x0f]);
        assert_eq!(encode(&1024u64), vec![0x82, 0x04, 0x00]);
        assert_eq!(encode(&U256::zero()), vec![0x80]);
    }

    #[test]
    fn test_long_string_header() {
        let data = vec![0x61u8; 56];
        let mut stream = RlpStream::new();
        append_bytes(&mut stream, &data);
        let out = stream.out();
        assert_eq!(&out[..2], &[0xb8, 56]);
        assert_eq!(out.len(), 58);
    }

    #[test]
    fn test_optional_address() {
        let mut stream = RlpStream::new_list(2);
        append_optional_address(&mut stream, None);
        append_optional_address(&mut stream, Some(&Address::from_bytes([0x42; 20])));
        let out = stream.out();
        assert_eq!(out[0], 0xc0 + 22);
        assert_eq!(out[1], 0x80);
        assert_eq!(out[2], 0x94);
    }

    #[test]
    fn test_append_word_strips_leading_zeros() {
        let mut word = [0u8; 32];
        word[31] = 0x7f;
        let mut stream = RlpStream::new();
        append_word(&mut stream, &word);
        assert_eq!(stream.out().to_vec(), vec![0x7f]);

        let mut stream = RlpStream::new();
        append_word(&mut stream, &[0u8; 32]);
        assert_eq!(stream.out().to_vec(), vec![0x80]);
    }

    #[test]
    fn test_bytes_and_words_count_as_list_items() {
        let mut word = [0u8; 32];
        word[30] = 0x01;
        word[31] = 0x02;
        let mut stream = RlpStream::new_list(3);
        append_bytes(&mut stream, b"ab");
        append_word(&mut stream, &word);
        append_bytes(&mut stream, &[]);
        assert!(stream.is_finished());
        assert_eq!(
            stream.out().to_vec(),
            vec![0xc7, 0x82, b'a', b'b', 0x82, 0x01, 0x02, 0x80]
        );
    }

    // ==================== Strict reader ====================

    #[test]
    fn test_reader_reads_fields_in_order() {
        let mut stream = RlpStream::new_list(5);
        stream.append(&1990u64);
        stream.append(&U256::from(100u64));
        append_optional_address(&mut stream, None);
        append_bytes(&mut stream, b"Hello");
        stream.append(&H256::from_bytes([0x11; 32]));
        let out = stream.out();

        let mut reader = ListReader::from_bytes(&out, 5).unwrap();
        assert_eq!(reader.u64("chainId").unwrap(), 1990);
        assert_eq!(reader.u256("value").unwrap(), U256::from(100u64));
        assert_eq!(reader.optional_address("to").unwrap(), None);
        assert_eq!(&reader.bytes("data").unwrap()[..], b"Hello");
        assert_eq!(reader.h256("key").unwrap(), H256::from_bytes([0x11; 32]));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_reader_rejects_leading_zero() {
        // [0x820001] : 2-byte string 0x0001
        let data = [0xc3, 0x82, 0x00, 0x01];
        let mut reader = ListReader::from_bytes(&data, 1).unwrap();
        assert!(matches!(
            reader.u64("nonce"),
            Err(RlpError::MalformedInteger { field: "nonce", .. })
        ));
    }

    #[test]
    fn test_reader_rejects_wrapped_small_byte() {
        // 0x05 must be encoded as itself, not 0x8105
        let data = [0xc2, 0x81, 0x05];
        let mut reader = ListReader::from_bytes(&data, 1).unwrap();
        assert!(reader.u64("nonce").is_err());
    }

    #[test]
    fn test_reader_rejects_single_zero_byte_integer() {
        // zero must be the empty string, not 0x00
        let data = [0xc1, 0x00];
        let mut reader = ListReader::from_bytes(&data, 1).unwrap();
        assert!(matches!(
            reader.u64("nonce"),
            Err(RlpError::MalformedInteger { .. })
        ));
    }

    #[test]
    fn test_reader_rejects_wide_integers() {
        let data = [0xca, 0x89, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        let mut reader = ListReader::from_bytes(&data, 1).unwrap();
        assert!(matches!(
            reader.u64("gas"),
            Err(RlpError::InvalidField { field: "gas", .. })
        ));
    }

    #[test]
    fn test_reader_arity_and_trailing_bytes() {
        let data = [0xc2, 0x01, 0x02];
        assert_eq!(
            ListReader::from_bytes(&data, 3).err(),
            Some(RlpError::FieldCount { expected: 3, got: 2 })
        );
        let trailing = [0xc2, 0x01, 0x02, 0x03];
        assert_eq!(
            ListReader::from_bytes(&trailing, 2).err(),
            Some(RlpError::TrailingBytes { extra: 1 })
        );
        assert_eq!(ListReader::from_bytes(&[], 0).err(), Some(RlpError::Empty));
        assert_eq!(
            ListReader::from_bytes(&[0x83, b'd', b'o', b'g'], 1).err(),
            Some(RlpError::ExpectedList("transaction"))
        );
    }

    #[test]
    fn test_reader_bad_address_length() {
        let data = [0xc3, 0x82, 0x12, 0x34];
        let mut reader = ListReader::from_bytes(&data, 1).unwrap();
        assert!(matches!(
            reader.optional_address("to"),
            Err(RlpError::InvalidField { field: "to", .. })
        ));
    }

    #[test]
    fn test_reader_truncated_input() {
        // header claims 5 payload bytes, only 2 present
        let data = [0xc5, 0x01, 0x02];
        assert!(ListReader::from_bytes(&data, 2).is_err());
    }
}
