//! ABI encode/decode commands

use clap::Subcommand;
use mazze_sdk::abi::{
    decode, encode, parse_type, parse_types, AddressCoder, Fragment, FunctionCoder, ParamType,
    Token,
};
use serde_json::Value;

use super::offline_network_id;
use crate::{
    args::{parse_hex, tokens_from_args},
    config::Config,
    output::Output,
    CliError,
};

/// ABI subcommands
#[derive(Debug, Subcommand)]
pub enum AbiCommand {
    /// Encode values; a function signature yields call data with its selector
    Encode {
        /// `name(type,...)` for call data, or `type,...` / `(type,...)` for bare values
        signature: String,
        /// Values, JSON arrays for array and tuple types
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Decode hex data against types or a function signature
    Decode {
        /// `name(type,...)` for call data, or `type,...` / `(type,...)` for bare values
        types: String,
        /// Hex data
        data: String,
    },
}

impl AbiCommand {
    pub fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        let coder = AddressCoder::new(Some(offline_network_id(config)));
        let out = match self {
            AbiCommand::Encode { signature, args } => {
                encode_values(&signature, &args, &coder, json)?
            }
            AbiCommand::Decode { types, data } => decode_values(&types, &data, &coder, json)?,
        };
        out.print();
        Ok(())
    }
}

/// What a signature argument describes
enum Layout {
    Function(FunctionCoder),
    Values(Vec<ParamType>),
}

fn layout(text: &str) -> Result<Layout, CliError> {
    let trimmed = text.trim();
    if trimmed.starts_with('(') && trimmed.ends_with(')') {
        if let Ok(ParamType::Tuple(members)) = parse_type(trimmed) {
            return Ok(Layout::Values(members));
        }
    }
    let named = trimmed
        .find('(')
        .map_or(false, |open| !trimmed[..open].trim().is_empty());
    if named && parse_types(trimmed).is_err() {
        return match Fragment::parse(trimmed)? {
            Fragment::Function(function) => Ok(Layout::Function(function)),
            _ => Err(CliError::InvalidInput(format!("not a function signature: {}", text))),
        };
    }
    if trimmed.is_empty() {
        return Ok(Layout::Values(Vec::new()));
    }
    Ok(Layout::Values(parse_types(trimmed)?))
}

fn input_types(function: &FunctionCoder) -> Vec<ParamType> {
    function.inputs.iter().map(|p| p.kind.clone()).collect()
}

fn encode_values(
    signature: &str,
    args: &[String],
    coder: &AddressCoder,
    json: bool,
) -> Result<Output, CliError> {
    match layout(signature)? {
        Layout::Function(function) => {
            let tokens = tokens_from_args(&input_types(&function), args, coder)?;
            let data = function.encode_call(&tokens)?;
            Ok(Output::new(json)
                .field("signature", function.signature())
                .field("selector", format!("0x{}", hex::encode(function.selector())))
                .field("data", format!("0x{}", hex::encode(data))))
        }
        Layout::Values(types) => {
            let tokens = tokens_from_args(&types, args, coder)?;
            let data = encode(&types, &tokens)?;
            Ok(Output::new(json).field("data", format!("0x{}", hex::encode(data))))
        }
    }
}

fn decode_values(
    types: &str,
    data: &str,
    coder: &AddressCoder,
    json: bool,
) -> Result<Output, CliError> {
    let bytes = parse_hex(data)?;
    let (signature, tokens) = match layout(types)? {
        Layout::Function(function) => (Some(function.signature()), function.decode_call(&bytes)?),
        Layout::Values(types) => (None, decode(&types, &bytes)?),
    };
    let values = Value::Array(tokens.iter().map(|t: &Token| t.to_json(coder)).collect());

    let out = Output::new(json);
    let out = match signature {
        Some(signature) => out.field("signature", signature),
        None => out,
    };
    let message = serde_json::to_string_pretty(&values)?;
    Ok(out.field_value("values", values).message(&message))
}
