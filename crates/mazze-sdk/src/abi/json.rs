//! JSON ABI loading

use serde::Deserialize;

use super::event::EventCoder;
use super::fragment::Fragment;
use super::function::{FunctionCoder, StateMutability};
use super::parser::parse_type;
use super::types::{Param, ParamType};
use crate::SdkError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonItem {
    #[serde(rename = "type", default = "default_item_type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<JsonParam>,
    #[serde(default)]
    outputs: Vec<JsonParam>,
    #[serde(default)]
    state_mutability: Option<String>,
    #[serde(default)]
    constant: bool,
    #[serde(default)]
    payable: bool,
    #[serde(default)]
    anonymous: bool,
}

#[derive(Debug, Deserialize)]
struct JsonParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    components: Vec<JsonParam>,
    #[serde(default)]
    indexed: bool,
}

fn default_item_type() -> String {
    "function".to_string()
}

/// Parse a JSON ABI array
///
/// `fallback`, `receive` and `error` entries are skipped.
pub fn parse_json_abi(json: &str) -> Result<Vec<Fragment>, SdkError> {
    let items: Vec<JsonItem> = serde_json::from_str(json)?;
    let mut fragments = Vec::with_capacity(items.len());

    for item in items {
        match item.kind.as_str() {
            "function" => {
                let mut function =
                    FunctionCoder::new(item.name, params(&item.inputs)?, params(&item.outputs)?);
                function.state_mutability = match item.state_mutability.as_deref() {
                    Some(word) => StateMutability::from_keyword(word).ok_or_else(|| {
                        SdkError::Abi(format!("unknown state mutability {}", word))
                    })?,
                    None if item.constant => StateMutability::View,
                    None if item.payable => StateMutability::Payable,
                    None => StateMutability::NonPayable,
                };
                fragments.push(Fragment::Function(function));
            }
            "event" => fragments.push(Fragment::Event(EventCoder::new(
                item.name,
                params(&item.inputs)?,
                item.anonymous,
            ))),
            "constructor" => fragments.push(Fragment::Constructor(params(&item.inputs)?)),
            _ => {}
        }
    }
    Ok(fragments)
}

fn params(list: &[JsonParam]) -> Result<Vec<Param>, SdkError> {
    list.iter().map(param).collect()
}

fn param(json: &JsonParam) -> Result<Param, SdkError> {
    let components = params(&json.components)?;
    let kind = match json.kind.strip_prefix("tuple") {
        Some(suffix) => {
            let tuple = ParamType::Tuple(components.iter().map(|p| p.kind.clone()).collect());
            parse_type(&format!("{}{}", tuple.canonical(), suffix))?
        }
        None => parse_type(&json.kind)?,
    };
    Ok(Param {
        name: json.name.clone(),
        kind,
        indexed: json.indexed,
        components,
    })
}
