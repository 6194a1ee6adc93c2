//! Contract interaction helpers
//!
//! A [`Contract`] is a set of function and event coders with an optional
//! address. Calls go through [`ContractMethod`], which encodes arguments and
//! either runs a read-only call or produces a [`TransactionRequest`].

mod internal;

pub use internal::{internal_contract, INTERNAL_CONTRACTS};

use bytes::Bytes;
use mazze_primitives::{Address, H256};
use mazze_types::Log;

use crate::abi::{
    encode, parse_json_abi, DecodedEvent, EventCoder, Fragment, FunctionCoder, Param, Token,
};
use crate::client::MazzeClient;
use crate::types::{CallRequest, Epoch, LogFilter, TransactionRequest};
use crate::SdkError;

/// Contract helper for encoding/decoding function calls and logs
#[derive(Debug, Clone, Default)]
pub struct Contract {
    address: Option<Address>,
    functions: Vec<FunctionCoder>,
    events: Vec<EventCoder>,
    constructor: Vec<Param>,
}

impl Contract {
    /// Empty contract with no address
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parsed fragments
    pub fn from_fragments(fragments: impl IntoIterator<Item = Fragment>) -> Self {
        let mut contract = Self::new();
        for fragment in fragments {
            match fragment {
                Fragment::Function(function) => contract.functions.push(function),
                Fragment::Event(event) => contract.events.push(event),
                Fragment::Constructor(inputs) => contract.constructor = inputs,
            }
        }
        contract
    }

    /// Build from human-readable fragment lines
    pub fn from_human_readable(lines: &[&str]) -> Result<Self, SdkError> {
        let fragments = lines
            .iter()
            .map(|line| Fragment::parse(line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_fragments(fragments))
    }

    /// Build from a JSON ABI
    pub fn from_json(json: &str) -> Result<Self, SdkError> {
        Ok(Self::from_fragments(parse_json_abi(json)?))
    }

    /// Attach an address
    pub fn at(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Get the contract address
    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    /// All functions
    pub fn functions(&self) -> &[FunctionCoder] {
        &self.functions
    }

    /// All events
    pub fn events(&self) -> &[EventCoder] {
        &self.events
    }

    /// Look up a function by name or full signature
    ///
    /// A bare name must be unambiguous; overloads need the signature.
    pub fn function(&self, name: &str) -> Result<&FunctionCoder, SdkError> {
        if name.contains('(') {
            return self
                .functions
                .iter()
                .find(|f| f.signature() == name)
                .ok_or_else(|| SdkError::Abi(format!("Unknown function: {}", name)));
        }

        let mut matches = self.functions.iter().filter(|f| f.name == name);
        match (matches.next(), matches.next()) {
            (Some(function), None) => Ok(function),
            (Some(_), Some(_)) => Err(SdkError::Abi(format!(
                "Ambiguous function {}, use the full signature",
                name
            ))),
            (None, _) => Err(SdkError::Abi(format!("Unknown function: {}", name))),
        }
    }

    /// Look up an event by name or full signature
    pub fn event(&self, name: &str) -> Result<&EventCoder, SdkError> {
        self.events
            .iter()
            .find(|e| e.name == name || e.signature() == name)
            .ok_or_else(|| SdkError::Abi(format!("Unknown event: {}", name)))
    }

    /// Callable handle for one function
    pub fn method(&self, name: &str) -> Result<ContractMethod<'_>, SdkError> {
        Ok(ContractMethod {
            contract: self,
            function: self.function(name)?,
        })
    }

    /// Encode a function call
    pub fn encode_call(&self, name: &str, args: &[Token]) -> Result<Bytes, SdkError> {
        Ok(Bytes::from(self.function(name)?.encode_call(args)?))
    }

    /// Decode function output
    pub fn decode_output(&self, name: &str, data: &[u8]) -> Result<Vec<Token>, SdkError> {
        self.function(name)?.decode_output(data)
    }

    /// Find the function for call data by selector and decode its arguments
    pub fn decode_call(&self, data: &[u8]) -> Result<(&FunctionCoder, Vec<Token>), SdkError> {
        let selector = data
            .get(..4)
            .ok_or(SdkError::DecodeUnderflow { needed: 4, available: data.len() })?;
        let function = self
            .functions
            .iter()
            .find(|f| f.selector() == selector)
            .ok_or_else(|| SdkError::Abi(format!("Unknown selector 0x{}", hex::encode(selector))))?;
        Ok((function, function.decode_call(data)?))
    }

    /// Decode a log by its first topic
    ///
    /// Anonymous events are tried in declaration order when no signature matches.
    pub fn decode_log(&self, log: &Log) -> Result<DecodedEvent, SdkError> {
        if let Some(topic0) = log.topic0() {
            if let Some(event) = self.events.iter().find(|e| !e.anonymous && e.topic() == *topic0) {
                return event.decode_log(log);
            }
        }
        self.events
            .iter()
            .filter(|e| e.anonymous)
            .find_map(|e| e.decode_log(log).ok())
            .ok_or_else(|| SdkError::Abi("No event matches log".to_string()))
    }

    /// Filter for one event, `None` arguments match anything
    pub fn log_filter(&self, event: &str, args: &[Option<Token>]) -> Result<LogFilter, SdkError> {
        let topics = self.event(event)?.encode_topics(args)?;
        Ok(LogFilter {
            address: self.address.into_iter().collect(),
            topics: topics.into_iter().map(|t| t.map(|h| vec![h])).collect(),
            ..Default::default()
        })
    }

    /// Read-only call request
    pub fn call_request(&self, name: &str, args: &[Token]) -> Result<CallRequest, SdkError> {
        Ok(CallRequest {
            to: Some(self.require_address()?),
            data: Some(self.encode_call(name, args)?),
            ..Default::default()
        })
    }

    /// Deployment data: bytecode followed by encoded constructor arguments
    pub fn encode_deploy(&self, bytecode: &[u8], args: &[Token]) -> Result<Bytes, SdkError> {
        let types: Vec<_> = self.constructor.iter().map(|p| p.kind.clone()).collect();
        let mut data = bytecode.to_vec();
        data.extend(encode(&types, args)?);
        Ok(Bytes::from(data))
    }

    fn require_address(&self) -> Result<Address, SdkError> {
        self.address
            .ok_or(SdkError::InvalidState("contract has no address"))
    }
}

/// One function of a [`Contract`], ready to call
#[derive(Debug, Clone, Copy)]
pub struct ContractMethod<'a> {
    contract: &'a Contract,
    function: &'a FunctionCoder,
}

impl ContractMethod<'_> {
    /// Function coder
    pub fn function(&self) -> &FunctionCoder {
        self.function
    }

    /// Call data for `args`
    pub fn encode(&self, args: &[Token]) -> Result<Bytes, SdkError> {
        Ok(Bytes::from(self.function.encode_call(args)?))
    }

    /// Run a read-only call and decode the outputs
    pub async fn call(
        &self,
        client: &MazzeClient,
        args: &[Token],
        epoch: Epoch,
    ) -> Result<Vec<Token>, SdkError> {
        let request = CallRequest {
            to: Some(self.contract.require_address()?),
            data: Some(self.encode(args)?),
            ..Default::default()
        };
        let output = client.call(&request, epoch).await?;
        self.function.decode_output(&output)
    }

    /// Unpopulated transaction calling this function
    pub fn transaction(&self, args: &[Token]) -> Result<TransactionRequest, SdkError> {
        Ok(TransactionRequest {
            to: Some(self.contract.require_address()?),
            data: self.encode(args)?,
            ..Default::default()
        })
    }
}

/// ERC20 token interface at `address`
pub fn erc20(address: Address) -> Contract {
    let mut contract = Contract::new().at(address);
    for line in ERC20_ABI {
        if let Ok(fragment) = Fragment::parse(line) {
            match fragment {
                Fragment::Function(f) => contract.functions.push(f),
                Fragment::Event(e) => contract.events.push(e),
                Fragment::Constructor(_) => {}
            }
        }
    }
    contract
}

const ERC20_ABI: &[&str] = &[
    "function name() view returns (string)",
    "function symbol() view returns (string)",
    "function decimals() view returns (uint8)",
    "function totalSupply() view returns (uint256)",
    "function balanceOf(address owner) view returns (uint256)",
    "function transfer(address to, uint256 value) returns (bool)",
    "function allowance(address owner, address spender) view returns (uint256)",
    "function approve(address spender, uint256 value) returns (bool)",
    "function transferFrom(address from, address to, uint256 value) returns (bool)",
    "event Transfer(address indexed from, address indexed to, uint256 value)",
    "event Approval(address indexed owner, address indexed spender, uint256 value)",
];

/// Topic of an event signature
pub fn event_topic(signature: &str) -> H256 {
    mazze_crypto::keccak256(signature.as_bytes())
}
