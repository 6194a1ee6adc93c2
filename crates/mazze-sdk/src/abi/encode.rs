//! ABI encoding

use mazze_primitives::U256;

use super::types::{ParamType, Token, MAX_FIXED_SIZE};
use crate::SdkError;

/// Encode tokens against their declared types
///
/// Fails with `EncodeArity` when the counts differ, `EncodeRange` when a value
/// does not fit its declared width, and `Abi` on a token/type mismatch.
///
/// A `bytesN` value shorter than `N` is right-padded with zeros, so it decodes
/// back as the full `N` bytes.
pub fn encode(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, SdkError> {
    if types.len() != tokens.len() {
        return Err(SdkError::EncodeArity {
            expected: types.len(),
            got: tokens.len(),
        });
    }
    encode_sequence(types.iter().zip(tokens))
}

/// Encode function call (selector + params)
pub fn encode_function_call(
    selector: [u8; 4],
    types: &[ParamType],
    tokens: &[Token],
) -> Result<Vec<u8>, SdkError> {
    let mut result = selector.to_vec();
    result.extend(encode(types, tokens)?);
    Ok(result)
}

/// Head/tail layout of a tuple
///
/// Pass one sums the head widths to find where the tail starts. Pass two
/// writes static values inline and, for each dynamic value, the offset of its
/// tail section followed by the section itself.
fn encode_sequence<'a, I>(items: I) -> Result<Vec<u8>, SdkError>
where
    I: Iterator<Item = (&'a ParamType, &'a Token)> + Clone,
{
    let head_size = items
        .clone()
        .try_fold(0usize, |acc, (ty, _)| acc.checked_add(ty.head_length()?))
        .ok_or_else(|| SdkError::Abi("type layout too large".to_string()))?;

    let mut head = Vec::with_capacity(head_size.min(MAX_FIXED_SIZE));
    let mut tail = Vec::new();

    for (param_type, token) in items {
        if param_type.is_dynamic() {
            let offset = head_size + tail.len();
            head.extend_from_slice(&word(U256::from(offset)));
            tail.extend(encode_token(param_type, token)?);
        } else {
            head.extend(encode_token(param_type, token)?);
        }
    }

    head.extend(tail);
    Ok(head)
}

/// Encode a single token
fn encode_token(param_type: &ParamType, token: &Token) -> Result<Vec<u8>, SdkError> {
    match (param_type, token) {
        (ParamType::Address, Token::Address(addr)) => {
            let mut buf = [0u8; 32];
            buf[12..32].copy_from_slice(addr.as_bytes());
            Ok(buf.to_vec())
        }
        (ParamType::Uint(bits), Token::Uint(value)) => {
            if value.bits() > *bits {
                return Err(out_of_range(param_type, value));
            }
            Ok(word(*value).to_vec())
        }
        (ParamType::Int(bits), Token::Int(value)) => {
            if !value.fits(*bits) {
                return Err(out_of_range(param_type, value));
            }
            Ok(word(value.to_word()).to_vec())
        }
        (ParamType::Bool, Token::Bool(b)) => Ok(word(U256::from(*b as u8)).to_vec()),
        (ParamType::FixedBytes(size), Token::FixedBytes(data)) => {
            if data.len() > *size {
                return Err(out_of_range(param_type, &format!("0x{}", hex::encode(data))));
            }
            let mut buf = [0u8; 32];
            buf[..data.len()].copy_from_slice(data);
            Ok(buf.to_vec())
        }
        (ParamType::Bytes, Token::Bytes(data)) => Ok(encode_bytes(data)),
        (ParamType::String, Token::String(s)) => Ok(encode_bytes(s.as_bytes())),
        (ParamType::Array(inner), Token::Array(tokens)) => {
            let mut result = word(U256::from(tokens.len())).to_vec();
            result.extend(encode_sequence(std::iter::repeat(&**inner).zip(tokens))?);
            Ok(result)
        }
        (ParamType::FixedArray(inner, size), Token::FixedArray(tokens) | Token::Array(tokens)) => {
            if tokens.len() != *size {
                return Err(SdkError::EncodeArity {
                    expected: *size,
                    got: tokens.len(),
                });
            }
            encode_sequence(std::iter::repeat(&**inner).zip(tokens))
        }
        (ParamType::Tuple(types), Token::Tuple(tokens)) => encode(types, tokens),
        (expected, token) => Err(SdkError::Abi(format!(
            "cannot encode {} value as {}",
            token.kind_name(),
            expected
        ))),
    }
}

/// In-place encoding used to hash dynamic indexed event arguments
///
/// Elements are padded to 32 bytes with no length prefixes or offsets.
pub(crate) fn encode_in_place(param_type: &ParamType, token: &Token) -> Result<Vec<u8>, SdkError> {
    match (param_type, token) {
        (ParamType::Bytes, Token::Bytes(data)) => Ok(data.clone()),
        (ParamType::String, Token::String(s)) => Ok(s.as_bytes().to_vec()),
        (ParamType::Array(inner) | ParamType::FixedArray(inner, _), Token::Array(tokens) | Token::FixedArray(tokens)) => {
            let mut out = Vec::new();
            for token in tokens {
                out.extend(encode_in_place_padded(inner, token)?);
            }
            Ok(out)
        }
        (ParamType::Tuple(types), Token::Tuple(tokens)) => {
            if types.len() != tokens.len() {
                return Err(SdkError::EncodeArity {
                    expected: types.len(),
                    got: tokens.len(),
                });
            }
            let mut out = Vec::new();
            for (ty, token) in types.iter().zip(tokens) {
                out.extend(encode_in_place_padded(ty, token)?);
            }
            Ok(out)
        }
        _ => encode_token(param_type, token),
    }
}

fn encode_in_place_padded(param_type: &ParamType, token: &Token) -> Result<Vec<u8>, SdkError> {
    let mut out = encode_in_place(param_type, token)?;
    out.resize(out.len().div_ceil(32) * 32, 0);
    Ok(out)
}

fn out_of_range(param_type: &ParamType, value: &dyn std::fmt::Display) -> SdkError {
    SdkError::EncodeRange {
        kind: param_type.canonical(),
        value: value.to_string(),
    }
}

/// Convert U256 to 32-byte big-endian array
pub(crate) fn word(value: U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes
}

/// Encode dynamic bytes
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut result = word(U256::from(data.len())).to_vec();

    let padded_len = data.len().div_ceil(32) * 32;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    result.extend(padded);

    result
}

/// Compute function selector (first 4 bytes of keccak256(signature))
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = mazze_crypto::keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{parse_type, I256};
    use mazze_primitives::Address;

    fn encode_one(ty: &str, token: Token) -> Result<Vec<u8>, SdkError> {
        encode(&[parse_type(ty).unwrap()], &[token])
    }

    // ==================== Static ====================

    #[test]
    fn test_encode_address() {
        let addr = Address::from_hex("0x1cad0b19bb29d4674531d6f115237e16afce377c").unwrap();
        let encoded = encode_one("address", Token::Address(addr)).unwrap();

        assert_eq!(encoded.len(), 32);
        assert_eq!(&encoded[..12], &[0u8; 12]);
        assert_eq!(&encoded[12..32], addr.as_bytes());
    }

    #[test]
    fn test_encode_uint_range() {
        let encoded = encode_one("uint8", Token::Uint(U256::from(255))).unwrap();
        assert_eq!(encoded[31], 255);

        let err = encode_one("uint8", Token::Uint(U256::from(256))).unwrap_err();
        assert!(matches!(err, SdkError::EncodeRange { ref kind, ref value } if kind == "uint8" && value == "256"));

        assert!(encode_one("uint256", Token::Uint(U256::MAX)).is_ok());
    }

    #[test]
    fn test_encode_int() {
        let encoded = encode_one("int8", Token::Int(I256::from_i128(-1))).unwrap();
        assert_eq!(encoded, vec![0xff; 32]);

        let encoded = encode_one("int16", Token::Int(I256::from_i128(-2))).unwrap();
        assert_eq!(encoded[31], 0xfe);
        assert_eq!(encoded[0], 0xff);

        assert!(encode_one("int8", Token::Int(I256::from_i128(-128))).is_ok());
        assert!(matches!(
            encode_one("int8", Token::Int(I256::from_i128(128))),
            Err(SdkError::EncodeRange { .. })
        ));
    }

    #[test]
    fn test_encode_bool() {
        assert_eq!(encode_one("bool", Token::Bool(true)).unwrap()[31], 1);
        assert_eq!(encode_one("bool", Token::Bool(false)).unwrap(), vec![0u8; 32]);
    }

    #[test]
    fn test_encode_fixed_bytes() {
        let encoded = encode_one("bytes2", Token::FixedBytes(vec![0xab, 0xcd])).unwrap();
        assert_eq!(&encoded[..2], &[0xab, 0xcd]);
        assert_eq!(&encoded[2..], &[0u8; 30]);

        assert!(matches!(
            encode_one("bytes1", Token::FixedBytes(vec![1, 2])),
            Err(SdkError::EncodeRange { .. })
        ));
    }

    #[test]
    fn test_encode_short_fixed_bytes_pads() {
        let ty = parse_type("bytes4").unwrap();
        let encoded = encode(&[ty.clone()], &[Token::FixedBytes(vec![0xab])]).unwrap();
        assert_eq!(&encoded[..4], &[0xab, 0, 0, 0]);
        assert_eq!(
            crate::abi::decode(&[ty], &encoded).unwrap(),
            vec![Token::FixedBytes(vec![0xab, 0, 0, 0])]
        );
    }

    #[test]
    fn test_encode_oversized_layout_is_an_error() {
        let huge = ParamType::FixedArray(
            Box::new(ParamType::FixedArray(Box::new(ParamType::Uint(256)), 1 << 59)),
            64,
        );
        let err = encode(&[huge], &[Token::FixedArray(vec![])]).unwrap_err();
        assert!(matches!(err, SdkError::Abi(_)));
    }

    // ==================== Dynamic ====================

    #[test]
    fn test_encode_dynamic_bytes() {
        let data = vec![0x01, 0x02, 0x03];
        let encoded = encode_one("bytes", Token::Bytes(data.clone())).unwrap();

        assert_eq!(encoded.len(), 96);
        assert_eq!(encoded[31], 32);
        assert_eq!(encoded[63], 3);
        assert_eq!(&encoded[64..67], &data[..]);
    }

    #[test]
    fn test_encode_string_array() {
        // f(string[]) with ["one", "two"]
        let encoded = encode_one(
            "string[]",
            Token::Array(vec![Token::string("one"), Token::string("two")]),
        )
        .unwrap();
        let expected = concat!(
            "0000000000000000000000000000000000000000000000000000000000000020",
            "0000000000000000000000000000000000000000000000000000000000000002",
            "0000000000000000000000000000000000000000000000000000000000000040",
            "0000000000000000000000000000000000000000000000000000000000000080",
            "0000000000000000000000000000000000000000000000000000000000000003",
            "6f6e650000000000000000000000000000000000000000000000000000000000",
            "0000000000000000000000000000000000000000000000000000000000000003",
            "74776f0000000000000000000000000000000000000000000000000000000000",
        );
        assert_eq!(hex::encode(encoded), expected);
    }

    #[test]
    fn test_encode_mixed_offsets() {
        // (uint256, bytes, uint256[2]) : head is 1 + 1 + 2 words
        let types = [
            ParamType::Uint(256),
            ParamType::Bytes,
            ParamType::FixedArray(Box::new(ParamType::Uint(256)), 2),
        ];
        let tokens = [
            Token::Uint(U256::from(7)),
            Token::Bytes(vec![0xaa]),
            Token::FixedArray(vec![Token::Uint(U256::one()), Token::Uint(U256::from(2))]),
        ];
        let encoded = encode(&types, &tokens).unwrap();
        assert_eq!(encoded.len(), 32 * 6);
        assert_eq!(encoded[63], 128);
        assert_eq!(encoded[95], 1);
        assert_eq!(encoded[127], 2);
        assert_eq!(encoded[159], 1);
        assert_eq!(encoded[160], 0xaa);
    }

    // ==================== Errors ====================

    #[test]
    fn test_encode_arity() {
        let err = encode(&[ParamType::Bool, ParamType::Bool], &[Token::Bool(true)]).unwrap_err();
        assert!(matches!(err, SdkError::EncodeArity { expected: 2, got: 1 }));

        let err = encode_one("uint8[2]", Token::FixedArray(vec![Token::Uint(U256::one())])).unwrap_err();
        assert!(matches!(err, SdkError::EncodeArity { expected: 2, got: 1 }));
    }

    #[test]
    fn test_encode_mismatch() {
        let err = encode_one("address", Token::Bool(true)).unwrap_err();
        assert!(matches!(err, SdkError::Abi(_)));
    }

    #[test]
    fn test_function_selector() {
        assert_eq!(function_selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(function_selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);

        let hash = mazze_crypto::keccak256(b"transfer(address,uint256)");
        assert_eq!(function_selector("transfer(address,uint256)"), hash.as_bytes()[..4]);
    }

    #[test]
    fn test_encode_function_call() {
        let to = Address::from_hex("0x1cad0b19bb29d4674531d6f115237e16afce377c").unwrap();
        let selector = function_selector("transfer(address,uint256)");
        let encoded = encode_function_call(
            selector,
            &[ParamType::Address, ParamType::Uint(256)],
            &[Token::Address(to), Token::Uint(U256::from(1000))],
        )
        .unwrap();

        assert_eq!(encoded.len(), 68);
        assert_eq!(&encoded[..4], &selector);
    }
}
