//! ABI type definitions

use std::fmt;

use mazze_primitives::{Address, H256, U256};

/// Solidity ABI token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Address (20 bytes)
    Address(Address),
    /// Unsigned integer (8-256 bits)
    Uint(U256),
    /// Signed integer (8-256 bits)
    Int(I256),
    /// Boolean
    Bool(bool),
    /// Dynamic bytes
    Bytes(Vec<u8>),
    /// Fixed-size bytes (1-32)
    FixedBytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Dynamic array
    Array(Vec<Token>),
    /// Fixed-size array
    FixedArray(Vec<Token>),
    /// Tuple (struct)
    Tuple(Vec<Token>),
}

/// Signed 256-bit integer as sign and magnitude
///
/// Zero is always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I256 {
    /// Absolute value
    pub abs: U256,
    /// Sign (true if negative)
    pub negative: bool,
}

impl I256 {
    /// Create a new I256
    pub fn new(abs: U256, negative: bool) -> Self {
        Self {
            abs,
            negative: negative && !abs.is_zero(),
        }
    }

    /// Create from i128
    pub fn from_i128(value: i128) -> Self {
        Self::new(U256::from(value.unsigned_abs()), value < 0)
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }

    /// Whether the value fits a two's complement integer of `bits` bits
    pub fn fits(&self, bits: usize) -> bool {
        if bits == 0 || bits > 256 {
            return false;
        }
        let limit = U256::one() << (bits - 1);
        if self.negative {
            self.abs <= limit
        } else {
            self.abs < limit
        }
    }

    /// Two's complement word
    pub fn to_word(&self) -> U256 {
        if self.negative {
            (!self.abs).overflowing_add(U256::one()).0
        } else {
            self.abs
        }
    }

    /// Read a two's complement word
    pub fn from_word(word: U256) -> Self {
        if word.bit(255) {
            Self::new((!word).overflowing_add(U256::one()).0, true)
        } else {
            Self::new(word, false)
        }
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}

/// Largest fixed-size layout a parsed type may describe, in bytes
pub const MAX_FIXED_SIZE: usize = 1 << 24;

/// Solidity parameter types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Address
    Address,
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit size
    Int(usize),
    /// Boolean
    Bool,
    /// Dynamic bytes
    Bytes,
    /// Fixed-size bytes (size 1-32)
    FixedBytes(usize),
    /// UTF-8 string
    String,
    /// Dynamic array
    Array(Box<ParamType>),
    /// Fixed-size array
    FixedArray(Box<ParamType>, usize),
    /// Tuple
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Check if this type is dynamic (variable length)
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(types) => types.iter().any(|t| t.is_dynamic()),
            _ => false,
        }
    }

    /// Bytes occupied in the head of an enclosing tuple, `None` on overflow
    pub fn head_length(&self) -> Option<usize> {
        if self.is_dynamic() {
            return Some(32);
        }
        match self {
            ParamType::FixedArray(inner, size) => inner.head_length()?.checked_mul(*size),
            ParamType::Tuple(types) => types
                .iter()
                .try_fold(0usize, |acc, ty| acc.checked_add(ty.head_length()?)),
            _ => Some(32),
        }
    }

    /// Every fixed-size part of the layout stays within [`MAX_FIXED_SIZE`]
    pub fn is_bounded(&self) -> bool {
        self.fixed_width().map_or(false, |width| width <= MAX_FIXED_SIZE)
    }

    /// Widest fixed-size section, each fixed array element taking at least a word
    fn fixed_width(&self) -> Option<usize> {
        match self {
            ParamType::Array(inner) => inner
                .fixed_width()
                .filter(|&width| width <= MAX_FIXED_SIZE)
                .map(|_| 32),
            ParamType::FixedArray(inner, size) => {
                let element = inner.fixed_width()?;
                let slot = if inner.is_dynamic() { 32 } else { element.max(32) };
                slot.checked_mul(*size).map(|width| width.max(element))
            }
            ParamType::Tuple(types) => types
                .iter()
                .try_fold(0usize, |acc, ty| acc.checked_add(ty.fixed_width()?)),
            _ => Some(32),
        }
    }

    /// Canonical spelling used in signatures (`tuple(..)` becomes `(..)`)
    pub fn canonical(&self) -> String {
        match self {
            ParamType::Address => "address".to_string(),
            ParamType::Uint(bits) => format!("uint{}", bits),
            ParamType::Int(bits) => format!("int{}", bits),
            ParamType::Bool => "bool".to_string(),
            ParamType::Bytes => "bytes".to_string(),
            ParamType::FixedBytes(size) => format!("bytes{}", size),
            ParamType::String => "string".to_string(),
            ParamType::Array(inner) => format!("{}[]", inner.canonical()),
            ParamType::FixedArray(inner, size) => format!("{}[{}]", inner.canonical(), size),
            ParamType::Tuple(types) => format!("({})", join_canonical(types)),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Comma-joined canonical types
pub(crate) fn join_canonical(types: &[ParamType]) -> String {
    types
        .iter()
        .map(ParamType::canonical)
        .collect::<Vec<_>>()
        .join(",")
}

/// Named parameter of a function, event, or tuple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name, empty when unnamed
    pub name: String,
    /// Parameter type
    pub kind: ParamType,
    /// Event parameter stored as a topic
    pub indexed: bool,
    /// Named tuple members when `kind` is a tuple or an array of tuples
    pub components: Vec<Param>,
}

impl Param {
    /// Unnamed, unindexed parameter
    pub fn new(kind: ParamType) -> Self {
        Self {
            name: String::new(),
            kind,
            indexed: false,
            components: Vec::new(),
        }
    }

    /// Named parameter
    pub fn named(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            ..Self::new(kind)
        }
    }
}

/// Types of a parameter list
pub(crate) fn param_types(params: &[Param]) -> Vec<ParamType> {
    params.iter().map(|p| p.kind.clone()).collect()
}

impl Token {
    /// Create a uint256 from u128
    pub fn uint256_from_u128(value: u128) -> Self {
        Token::Uint(U256::from(value))
    }

    /// Create a string token
    pub fn string(s: impl Into<String>) -> Self {
        Token::String(s.into())
    }

    /// Create a bytes32 token
    pub fn bytes32(data: H256) -> Self {
        Token::FixedBytes(data.as_bytes().to_vec())
    }

    /// Short name of the token variant, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Address(_) => "address",
            Token::Uint(_) => "uint",
            Token::Int(_) => "int",
            Token::Bool(_) => "bool",
            Token::Bytes(_) => "bytes",
            Token::FixedBytes(_) => "fixed bytes",
            Token::String(_) => "string",
            Token::Array(_) => "array",
            Token::FixedArray(_) => "fixed array",
            Token::Tuple(_) => "tuple",
        }
    }

    /// Address value, if this is an address token
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Token::Address(addr) => Some(addr),
            _ => None,
        }
    }

    /// Unsigned value, if this is a uint token
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Token::Uint(value) => Some(*value),
            _ => None,
        }
    }

    /// Bool value, if this is a bool token
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Token::Bool(value) => Some(*value),
            _ => None,
        }
    }
}
