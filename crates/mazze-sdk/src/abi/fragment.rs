//! Human-readable ABI fragments
//!
//! ```text
//! function transfer(address to, uint256 amount) external returns (bool)
//! event Transfer(address indexed from, address indexed to, uint256 value)
//! constructor(string name, uint8 decimals)
//! ```

use super::event::EventCoder;
use super::function::{FunctionCoder, StateMutability};
use super::parser::Cursor;
use super::types::Param;
use crate::SdkError;

/// Visibility keywords skipped after the parameter list
const SKIPPED_KEYWORDS: &[&str] = &["public", "external", "internal", "private", "virtual", "override"];

/// One parsed ABI entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Callable function
    Function(FunctionCoder),
    /// Event
    Event(EventCoder),
    /// Constructor inputs
    Constructor(Vec<Param>),
}

impl Fragment {
    /// Parse one human-readable fragment
    ///
    /// A fragment with no leading keyword is read as a function.
    pub fn parse(text: &str) -> Result<Self, SdkError> {
        let mut cursor = Cursor::new(text);
        let keyword = cursor.peek_word();
        let fragment = match keyword {
            "event" => {
                cursor.word();
                Fragment::Event(parse_event(&mut cursor)?)
            }
            "constructor" => {
                cursor.word();
                let inputs = cursor.param_list(true)?;
                skip_trailing(&mut cursor)?;
                Fragment::Constructor(inputs)
            }
            "function" => {
                cursor.word();
                Fragment::Function(parse_function(&mut cursor)?)
            }
            _ => Fragment::Function(parse_function(&mut cursor)?),
        };
        cursor.skip_ws();
        if !cursor.at_end() {
            return Err(cursor.error_here());
        }
        Ok(fragment)
    }
}

fn name(cursor: &mut Cursor<'_>) -> Result<String, SdkError> {
    let name = cursor.word();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(cursor.error_here());
    }
    Ok(name.to_string())
}

fn parse_function(cursor: &mut Cursor<'_>) -> Result<FunctionCoder, SdkError> {
    let name = name(cursor)?;
    let inputs = cursor.param_list(true)?;
    let mut function = FunctionCoder::new(name, inputs, Vec::new());

    loop {
        let word = cursor.peek_word();
        if word == "returns" {
            cursor.word();
            function.outputs = cursor.param_list(true)?;
        } else if let Some(mutability) = StateMutability::from_keyword(word) {
            cursor.word();
            function.state_mutability = mutability;
        } else if SKIPPED_KEYWORDS.contains(&word) {
            cursor.word();
        } else {
            break;
        }
    }
    Ok(function)
}

fn parse_event(cursor: &mut Cursor<'_>) -> Result<EventCoder, SdkError> {
    let name = name(cursor)?;
    let inputs = cursor.param_list(true)?;
    let anonymous = cursor.peek_word() == "anonymous";
    if anonymous {
        cursor.word();
    }
    Ok(EventCoder::new(name, inputs, anonymous))
}

fn skip_trailing(cursor: &mut Cursor<'_>) -> Result<(), SdkError> {
    loop {
        let word = cursor.peek_word();
        if word.is_empty() {
            return Ok(());
        }
        if SKIPPED_KEYWORDS.contains(&word) || word == "payable" {
            cursor.word();
        } else {
            return Err(cursor.error_here());
        }
    }
}
