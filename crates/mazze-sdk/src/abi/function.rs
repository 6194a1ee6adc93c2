//! Function coder: selector, call data and return values

use mazze_primitives::U256;

use super::decode::decode;
use super::encode::{encode_function_call, function_selector};
use super::types::{join_canonical, param_types, Param, Token};
use crate::SdkError;

/// Declared state mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateMutability {
    /// Reads nothing
    Pure,
    /// Reads state
    View,
    /// Writes state
    #[default]
    NonPayable,
    /// Writes state and accepts value
    Payable,
}

impl StateMutability {
    /// Parse the JSON/fragment keyword
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "pure" => Some(StateMutability::Pure),
            "view" => Some(StateMutability::View),
            "nonpayable" => Some(StateMutability::NonPayable),
            "payable" => Some(StateMutability::Payable),
            _ => None,
        }
    }

    /// Calls that do not need a transaction
    pub fn is_read_only(&self) -> bool {
        matches!(self, StateMutability::Pure | StateMutability::View)
    }
}

/// Encoder/decoder for one contract function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCoder {
    /// Function name
    pub name: String,
    /// Input parameters
    pub inputs: Vec<Param>,
    /// Output parameters
    pub outputs: Vec<Param>,
    /// State mutability
    pub state_mutability: StateMutability,
}

impl FunctionCoder {
    /// Build a coder from its parts
    pub fn new(name: impl Into<String>, inputs: Vec<Param>, outputs: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            state_mutability: StateMutability::default(),
        }
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, join_canonical(&param_types(&self.inputs)))
    }

    /// First four bytes of `keccak256(signature)`
    pub fn selector(&self) -> [u8; 4] {
        function_selector(&self.signature())
    }

    /// Selector followed by the encoded arguments
    pub fn encode_call(&self, args: &[Token]) -> Result<Vec<u8>, SdkError> {
        if args.len() != self.inputs.len() {
            return Err(SdkError::EncodeArity {
                expected: self.inputs.len(),
                got: args.len(),
            });
        }
        encode_function_call(self.selector(), &param_types(&self.inputs), args)
    }

    /// Inverse of [`encode_call`](Self::encode_call)
    pub fn decode_call(&self, data: &[u8]) -> Result<Vec<Token>, SdkError> {
        let selector = data.get(..4).ok_or(SdkError::DecodeUnderflow {
            needed: 4,
            available: data.len(),
        })?;
        if selector != self.selector() {
            return Err(SdkError::Abi(format!(
                "selector 0x{} does not match {}",
                hex::encode(selector),
                self.signature()
            )));
        }
        decode(&param_types(&self.inputs), &data[4..])
    }

    /// Decode return data
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>, SdkError> {
        decode(&param_types(&self.outputs), data)
    }
}

const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Reason carried by reverted call output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    /// `Error(string)`
    Error(String),
    /// `Panic(uint256)`
    Panic(U256),
}

impl std::fmt::Display for RevertReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevertReason::Error(msg) => write!(f, "{}", msg),
            RevertReason::Panic(code) => write!(f, "panic code 0x{:x}", code),
        }
    }
}

/// Decode an `Error(string)` or `Panic(uint256)` revert payload
pub fn decode_revert_reason(data: &[u8]) -> Option<RevertReason> {
    let (selector, body) = (data.get(..4)?, data.get(4..)?);
    if selector == ERROR_SELECTOR {
        match decode(&[super::ParamType::String], body).ok()?.pop()? {
            Token::String(msg) => Some(RevertReason::Error(msg)),
            _ => None,
        }
    } else if selector == PANIC_SELECTOR {
        match decode(&[super::ParamType::Uint(256)], body).ok()?.pop()? {
            Token::Uint(code) => Some(RevertReason::Panic(code)),
            _ => None,
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::ParamType;
    use mazze_primitives::Address;

    fn transfer() -> FunctionCoder {
        FunctionCoder::new(
            "transfer",
            vec![
                Param::named("to", ParamType::Address),
                Param::named("amount", ParamType::Uint(256)),
            ],
            vec![Param::new(ParamType::Bool)],
        )
    }

    #[test]
    fn test_signature_and_selector() {
        let f = transfer();
        assert_eq!(f.signature(), "transfer(address,uint256)");
        assert_eq!(f.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_encode_decode_call() {
        let f = transfer();
        let to = Address::from_hex("0x1cad0b19bb29d4674531d6f115237e16afce377c").unwrap();
        let args = vec![Token::Address(to), Token::Uint(U256::from(1000))];
        let data = f.encode_call(&args).unwrap();
        assert_eq!(data.len(), 68);
        assert_eq!(f.decode_call(&data).unwrap(), args);
    }

    #[test]
    fn test_encode_call_arity() {
        let err = transfer().encode_call(&[Token::Bool(true)]).unwrap_err();
        assert!(matches!(err, SdkError::EncodeArity { expected: 2, got: 1 }));
    }

    #[test]
    fn test_decode_call_wrong_selector() {
        let f = transfer();
        assert!(matches!(f.decode_call(&[0, 0]), Err(SdkError::DecodeUnderflow { .. })));
        assert!(matches!(f.decode_call(&[0u8; 68]), Err(SdkError::Abi(_))));
    }

    #[test]
    fn test_decode_output() {
        let mut data = [0u8; 32];
        data[31] = 1;
        assert_eq!(transfer().decode_output(&data).unwrap(), vec![Token::Bool(true)]);
    }

    #[test]
    fn test_revert_reason() {
        let data = hex::decode(concat!(
            "08c379a0",
            "0000000000000000000000000000000000000000000000000000000000000020",
            "000000000000000000000000000000000000000000000000000000000000000e",
            "6e6f7420617574686f72697a6564000000000000000000000000000000000000",
        ))
        .unwrap();
        assert_eq!(
            decode_revert_reason(&data),
            Some(RevertReason::Error("not authorized".to_string()))
        );

        let mut panic = PANIC_SELECTOR.to_vec();
        panic.extend([0u8; 31]);
        panic.push(0x11);
        assert_eq!(decode_revert_reason(&panic), Some(RevertReason::Panic(U256::from(0x11))));
        assert_eq!(decode_revert_reason(&panic).unwrap().to_string(), "panic code 0x11");

        assert_eq!(decode_revert_reason(&[0x01, 0x02]), None);
        assert_eq!(decode_revert_reason(&[0u8; 36]), None);
    }
}
