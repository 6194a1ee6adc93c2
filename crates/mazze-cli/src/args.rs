//! Parsing of command-line values into ABI tokens and numbers

use mazze_primitives::U256;
use mazze_sdk::abi::{AddressCoder, ParamType, Token, I256};
use serde_json::Value;

use crate::CliError;

/// Decode `0x`-prefixed or bare hex
pub fn parse_hex(text: &str) -> Result<Vec<u8>, CliError> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|e| CliError::InvalidHex(format!("{}: {}", text, e)))
}

/// Parse a decimal or `0x` hex unsigned integer
pub fn parse_u256(text: &str) -> Result<U256, CliError> {
    let parsed = match text.strip_prefix("0x") {
        Some(digits) => U256::from_str_radix(digits, 16).ok(),
        None => U256::from_dec_str(text).ok(),
    };
    parsed.ok_or_else(|| CliError::InvalidInput(format!("not an integer: {}", text)))
}

/// Turn one command-line argument into a JSON value
///
/// Arguments starting with `[` are read as JSON arrays so arrays and tuples
/// can be passed inline; everything else is a plain string.
pub fn arg_value(arg: &str) -> Result<Value, CliError> {
    if arg.trim_start().starts_with('[') {
        Ok(serde_json::from_str(arg)?)
    } else {
        Ok(Value::String(arg.to_string()))
    }
}

/// Build a token of type `kind` from a JSON value
pub fn token_from_value(
    kind: &ParamType,
    value: &Value,
    coder: &AddressCoder,
) -> Result<Token, CliError> {
    let mismatch = || CliError::InvalidInput(format!("cannot read {} as {}", value, kind));

    match kind {
        ParamType::Address => {
            let text = value.as_str().ok_or_else(mismatch)?;
            coder
                .parse(text)
                .map(Token::Address)
                .map_err(|e| CliError::InvalidAddress(e.to_string()))
        }
        ParamType::Uint(_) => {
            let text = scalar_text(value).ok_or_else(mismatch)?;
            Ok(Token::Uint(parse_u256(&text)?))
        }
        ParamType::Int(_) => {
            let text = scalar_text(value).ok_or_else(mismatch)?;
            let (negative, digits) = match text.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, text.as_str()),
            };
            Ok(Token::Int(I256::new(parse_u256(digits)?, negative)))
        }
        ParamType::Bool => match value {
            Value::Bool(b) => Ok(Token::Bool(*b)),
            Value::String(s) if s == "true" => Ok(Token::Bool(true)),
            Value::String(s) if s == "false" => Ok(Token::Bool(false)),
            _ => Err(mismatch()),
        },
        ParamType::Bytes => Ok(Token::Bytes(parse_hex(value.as_str().ok_or_else(mismatch)?)?)),
        ParamType::FixedBytes(_) => Ok(Token::FixedBytes(parse_hex(
            value.as_str().ok_or_else(mismatch)?,
        )?)),
        ParamType::String => Ok(Token::String(value.as_str().ok_or_else(mismatch)?.to_string())),
        ParamType::Array(inner) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            Ok(Token::Array(tokens_of(inner, items, coder)?))
        }
        ParamType::FixedArray(inner, size) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            if items.len() != *size {
                return Err(CliError::InvalidInput(format!(
                    "{} expects {} elements, got {}",
                    kind,
                    size,
                    items.len()
                )));
            }
            Ok(Token::FixedArray(tokens_of(inner, items, coder)?))
        }
        ParamType::Tuple(kinds) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            if items.len() != kinds.len() {
                return Err(mismatch());
            }
            kinds
                .iter()
                .zip(items)
                .map(|(k, v)| token_from_value(k, v, coder))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::Tuple)
        }
    }
}

/// Build tokens for `kinds` from raw command-line arguments
pub fn tokens_from_args(
    kinds: &[ParamType],
    args: &[String],
    coder: &AddressCoder,
) -> Result<Vec<Token>, CliError> {
    if kinds.len() != args.len() {
        return Err(CliError::InvalidInput(format!(
            "expected {} arguments, got {}",
            kinds.len(),
            args.len()
        )));
    }
    kinds
        .iter()
        .zip(args)
        .map(|(kind, arg)| token_from_value(kind, &arg_value(arg)?, coder))
        .collect()
}

fn tokens_of(
    kind: &ParamType,
    items: &[Value],
    coder: &AddressCoder,
) -> Result<Vec<Token>, CliError> {
    items.iter().map(|v| token_from_value(kind, v, coder)).collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
