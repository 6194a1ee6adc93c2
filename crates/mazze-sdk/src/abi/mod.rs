//! Solidity ABI codec
//!
//! - Type strings parse into [`ParamType`] trees by recursive descent
//! - [`encode`] and [`decode`] implement the head/tail layout
//! - [`FunctionCoder`] and [`EventCoder`] add selectors, topics and names
//! - [`Fragment`] reads human-readable ABI lines, [`parse_json_abi`] reads JSON ABI
//!
//! # Example
//!
//! ```rust
//! use mazze_sdk::abi::{decode, encode, function_selector, parse_type, Token};
//! use mazze_primitives::{Address, U256};
//!
//! let types = [parse_type("address").unwrap(), parse_type("uint256").unwrap()];
//! let data = encode(&types, &[Token::Address(Address::ZERO), Token::Uint(U256::from(1000))]).unwrap();
//! assert_eq!(function_selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
//! assert_eq!(decode(&types, &data).unwrap()[1], Token::Uint(U256::from(1000)));
//! ```

mod address;
mod decode;
mod encode;
mod event;
mod fragment;
mod function;
mod json;
mod parser;
mod types;

pub use address::AddressCoder;
pub use decode::{decode, decode_output};
pub use encode::{encode, encode_function_call, function_selector};
pub use event::{DecodedEvent, EventCoder};
pub use fragment::Fragment;
pub use function::{decode_revert_reason, FunctionCoder, RevertReason, StateMutability};
pub use json::parse_json_abi;
pub use parser::{parse_type, parse_types};
pub use types::{Param, ParamType, Token, I256, MAX_FIXED_SIZE};
