//! ABI decoding
//!
//! Offsets are relative to the start of the enclosing tuple or array body, so
//! nested dynamic values resolve against their own section.

use mazze_primitives::{Address, U256};

use super::types::{I256, ParamType, Token};
use crate::SdkError;

/// Decode tokens from ABI-encoded data
///
/// Each 32-byte word may be read at most once over the whole decode, which
/// every canonical encoding satisfies. Offsets that alias earlier sections
/// fail once the reads outnumber the words in `data`.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, SdkError> {
    Decoder::new(data).sequence(types.iter(), 0)
}

/// Decode function return data
pub fn decode_output(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, SdkError> {
    decode(types, data)
}

struct Decoder<'a> {
    data: &'a [u8],
    /// Words left to read
    budget: usize,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            budget: data.len() / 32,
        }
    }

    fn sequence<'t, I>(&mut self, types: I, base: usize) -> Result<Vec<Token>, SdkError>
    where
        I: Iterator<Item = &'t ParamType>,
    {
        let mut tokens = Vec::new();
        let mut head = base;

        for param_type in types {
            let width = if param_type.is_dynamic() {
                let offset = self.offset(head)?;
                let start = base.checked_add(offset).ok_or_else(|| self.underflow(usize::MAX))?;
                tokens.push(self.body(param_type, start)?);
                32
            } else {
                tokens.push(self.body(param_type, head)?);
                param_type.head_length().ok_or_else(|| self.underflow(usize::MAX))?
            };
            head = head.checked_add(width).ok_or_else(|| self.underflow(usize::MAX))?;
        }

        Ok(tokens)
    }

    /// Decode the value whose encoding starts at `pos`
    fn body(&mut self, param_type: &ParamType, pos: usize) -> Result<Token, SdkError> {
        match param_type {
            ParamType::Address => {
                let word = self.word(pos)?;
                let mut addr_bytes = [0u8; 20];
                addr_bytes.copy_from_slice(&word[12..32]);
                Ok(Token::Address(Address::from_bytes(addr_bytes)))
            }
            ParamType::Uint(bits) => {
                let value = U256::from_big_endian(self.word(pos)?);
                if value.bits() > *bits {
                    return Err(dirty(param_type));
                }
                Ok(Token::Uint(value))
            }
            ParamType::Int(bits) => {
                let value = U256::from_big_endian(self.word(pos)?);
                if *bits < 256 {
                    let negative = value.bit(bits - 1);
                    let high = value >> *bits;
                    let expected = if negative { U256::MAX >> *bits } else { U256::zero() };
                    if high != expected {
                        return Err(dirty(param_type));
                    }
                }
                Ok(Token::Int(I256::from_word(value)))
            }
            ParamType::Bool => {
                let word = self.word(pos)?;
                if word[..31].iter().any(|b| *b != 0) || word[31] > 1 {
                    return Err(dirty(param_type));
                }
                Ok(Token::Bool(word[31] == 1))
            }
            ParamType::FixedBytes(size) => {
                let word = self.word(pos)?;
                Ok(Token::FixedBytes(word[..*size].to_vec()))
            }
            ParamType::Bytes => Ok(Token::Bytes(self.bytes(pos)?.to_vec())),
            ParamType::String => {
                let bytes = self.bytes(pos)?;
                let s = String::from_utf8(bytes.to_vec())
                    .map_err(|e| SdkError::Abi(format!("Invalid UTF-8: {}", e)))?;
                Ok(Token::String(s))
            }
            ParamType::Array(inner) => {
                let len = self.offset(pos)?;
                let body = pos + 32;
                // each element takes at least one word
                let needed = len
                    .checked_mul(32)
                    .and_then(|n| n.checked_add(body))
                    .ok_or_else(|| self.underflow(usize::MAX))?;
                if needed > self.data.len() {
                    return Err(self.underflow(needed));
                }
                let tokens = self.sequence(std::iter::repeat(&**inner).take(len), body)?;
                Ok(Token::Array(tokens))
            }
            ParamType::FixedArray(inner, size) => {
                let tokens = self.sequence(std::iter::repeat(&**inner).take(*size), pos)?;
                Ok(Token::FixedArray(tokens))
            }
            ParamType::Tuple(types) => Ok(Token::Tuple(self.sequence(types.iter(), pos)?)),
        }
    }

    fn word(&mut self, pos: usize) -> Result<&'a [u8; 32], SdkError> {
        let data = self.data;
        let end = pos.checked_add(32).ok_or_else(|| self.underflow(usize::MAX))?;
        let word = data
            .get(pos..end)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| self.underflow(end))?;
        self.budget = self.budget.checked_sub(1).ok_or_else(|| {
            SdkError::Abi(format!(
                "offsets revisit data: more than {} words read",
                data.len() / 32
            ))
        })?;
        Ok(word)
    }

    /// Word that must be a length or offset within the buffer
    fn offset(&mut self, pos: usize) -> Result<usize, SdkError> {
        let value = U256::from_big_endian(self.word(pos)?);
        if value > U256::from(self.data.len()) {
            return Err(SdkError::DecodeUnderflow {
                needed: value.low_u64() as usize,
                available: self.data.len(),
            });
        }
        Ok(value.as_usize())
    }

    fn bytes(&mut self, pos: usize) -> Result<&'a [u8], SdkError> {
        let len = self.offset(pos)?;
        let start = pos + 32;
        let end = start.checked_add(len).ok_or_else(|| self.underflow(usize::MAX))?;
        self.data.get(start..end).ok_or_else(|| self.underflow(end))
    }

    fn underflow(&self, needed: usize) -> SdkError {
        underflow(needed, self.data)
    }
}

fn underflow(needed: usize, data: &[u8]) -> SdkError {
    SdkError::DecodeUnderflow {
        needed,
        available: data.len(),
    }
}

fn dirty(param_type: &ParamType) -> SdkError {
    SdkError::Abi(format!("word is not a valid {}", param_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{encode, parse_type};

    fn decode_one(ty: &str, data: &[u8]) -> Result<Token, SdkError> {
        decode(&[parse_type(ty).unwrap()], data).map(|mut tokens| tokens.remove(0))
    }

    // ==================== Static ====================

    #[test]
    fn test_decode_address() {
        let addr = Address::from_hex("0x1cad0b19bb29d4674531d6f115237e16afce377c").unwrap();
        let mut encoded = [0u8; 32];
        encoded[12..32].copy_from_slice(addr.as_bytes());

        assert_eq!(decode_one("address", &encoded).unwrap(), Token::Address(addr));
    }

    #[test]
    fn test_decode_uint_dirty_bits() {
        let mut encoded = [0u8; 32];
        encoded[31] = 100;
        assert_eq!(decode_one("uint8", &encoded).unwrap(), Token::Uint(U256::from(100)));

        encoded[30] = 1;
        assert!(matches!(decode_one("uint8", &encoded), Err(SdkError::Abi(_))));
        assert!(decode_one("uint16", &encoded).is_ok());
    }

    #[test]
    fn test_decode_int_sign_extension() {
        assert_eq!(decode_one("int8", &[0xff; 32]).unwrap(), Token::Int(I256::from_i128(-1)));

        let mut encoded = [0u8; 32];
        encoded[31] = 0x80;
        // 0x80 without sign extension is not a valid int8
        assert!(decode_one("int8", &encoded).is_err());
        assert_eq!(decode_one("int16", &encoded).unwrap(), Token::Int(I256::from_i128(128)));

        let mut negative = [0xffu8; 32];
        negative[31] = 0x80;
        assert_eq!(decode_one("int8", &negative).unwrap(), Token::Int(I256::from_i128(-128)));
    }

    #[test]
    fn test_decode_bool() {
        let mut encoded = [0u8; 32];
        assert_eq!(decode_one("bool", &encoded).unwrap(), Token::Bool(false));
        encoded[31] = 1;
        assert_eq!(decode_one("bool", &encoded).unwrap(), Token::Bool(true));
        encoded[31] = 2;
        assert!(decode_one("bool", &encoded).is_err());
    }

    #[test]
    fn test_decode_bytes32() {
        let data = [0x42u8; 32];
        assert_eq!(decode_one("bytes32", &data).unwrap(), Token::FixedBytes(data.to_vec()));
        assert_eq!(decode_one("bytes2", &data).unwrap(), Token::FixedBytes(vec![0x42, 0x42]));
    }

    // ==================== Dynamic ====================

    #[test]
    fn test_decode_string() {
        let mut encoded = vec![0u8; 96];
        encoded[31] = 32;
        encoded[63] = 5;
        encoded[64..69].copy_from_slice(b"hello");

        assert_eq!(decode_one("string", &encoded).unwrap(), Token::string("hello"));
    }

    #[test]
    fn test_decode_nested_offsets_are_relative() {
        let ty = parse_type("(uint8,string)[]").unwrap();
        let token = Token::Array(vec![
            Token::Tuple(vec![Token::Uint(U256::from(1)), Token::string("a")]),
            Token::Tuple(vec![Token::Uint(U256::from(2)), Token::string("bc")]),
        ]);
        let encoded = encode(&[ty.clone()], &[token.clone()]).unwrap();
        assert_eq!(decode(&[ty], &encoded).unwrap(), vec![token]);
    }

    #[test]
    fn test_decode_multiple_params() {
        let addr = Address::from_hex("0x1cad0b19bb29d4674531d6f115237e16afce377c").unwrap();

        let mut encoded = [0u8; 64];
        encoded[12..32].copy_from_slice(addr.as_bytes());
        encoded[63] = 100;

        let tokens = decode(&[ParamType::Address, ParamType::Uint(256)], &encoded).unwrap();
        assert_eq!(tokens, vec![Token::Address(addr), Token::Uint(U256::from(100))]);
    }

    // ==================== Underflow ====================

    #[test]
    fn test_decode_insufficient_data() {
        let result = decode(&[ParamType::Uint(256)], &[0u8; 16]);
        assert!(matches!(result, Err(SdkError::DecodeUnderflow { needed: 32, available: 16 })));
    }

    #[test]
    fn test_decode_truncated_tail() {
        let mut encoded = vec![0u8; 64];
        encoded[31] = 32;
        encoded[63] = 10;
        assert!(matches!(decode_one("bytes", &encoded), Err(SdkError::DecodeUnderflow { .. })));
    }

    // ==================== Aliased offsets ====================

    /// Nested `uint256[]...[]` where every element offset points at the same
    /// next-level array
    fn aliased_arrays(levels: usize, fanout: usize) -> (ParamType, Vec<u8>) {
        let mut ty = ParamType::Uint(256);
        for _ in 0..levels {
            ty = ParamType::Array(Box::new(ty));
        }
        let mut words = vec![U256::from(32)];
        for level in 0..levels {
            words.push(U256::from(fanout));
            let element = if level + 1 == levels { U256::one() } else { U256::from(fanout * 32) };
            words.extend(std::iter::repeat(element).take(fanout));
        }
        let mut data = Vec::with_capacity(words.len() * 32);
        for value in words {
            let mut word = [0u8; 32];
            value.to_big_endian(&mut word);
            data.extend_from_slice(&word);
        }
        (ty, data)
    }

    #[test]
    fn test_decode_rejects_shared_tails() {
        let (ty, data) = aliased_arrays(2, 2);
        assert!(matches!(decode(&[ty], &data), Err(SdkError::Abi(_))));
    }

    #[test]
    fn test_decode_aliasing_does_not_blow_up() {
        let (ty, data) = aliased_arrays(6, 10);
        assert!(data.len() < 2600);
        assert!(matches!(decode(&[ty], &data), Err(SdkError::Abi(_))));
    }

    #[test]
    fn test_decode_nested_arrays_within_budget() {
        let ty = parse_type("uint256[][]").unwrap();
        let row = |values: &[u64]| {
            Token::Array(values.iter().map(|v| Token::Uint(U256::from(*v))).collect())
        };
        let token = Token::Array(vec![row(&[1, 2]), row(&[]), row(&[3])]);
        let encoded = encode(&[ty.clone()], &[token.clone()]).unwrap();
        assert_eq!(decode(&[ty], &encoded).unwrap(), vec![token]);
    }

    #[test]
    fn test_decode_huge_array_length() {
        let mut encoded = vec![0u8; 64];
        encoded[31] = 32;
        encoded[62] = 0x01;
        assert!(matches!(
            decode_one("uint256[]", &encoded),
            Err(SdkError::DecodeUnderflow { .. })
        ));
    }
}
