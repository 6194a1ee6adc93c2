//! Recursive-descent parser for type strings and parameter lists
//!
//! ```text
//! type    := base suffix*
//! base    := elementary | "(" params ")" | "tuple" "(" params ")"
//! suffix  := "[" digits? "]"
//! params  := ( param ( "," param )* )?
//! param   := type word*          -- words: "indexed", a name, or a skipped modifier
//! ```

use super::types::{Param, ParamType};
use crate::SdkError;

/// Modifiers accepted and ignored after a parameter type
const PARAM_MODIFIERS: &[&str] = &["memory", "calldata", "storage", "payable"];

/// Parse a type string such as `uint256`, `address[]` or `(uint8,bytes)[3]`
pub fn parse_type(input: &str) -> Result<ParamType, SdkError> {
    let mut cursor = Cursor::new(input);
    let param = cursor.param(false)?;
    cursor.skip_ws();
    if !cursor.at_end() {
        return Err(cursor.error_here());
    }
    Ok(param.kind)
}

/// Parse a comma separated type list such as `address,uint256`
pub fn parse_types(input: &str) -> Result<Vec<ParamType>, SdkError> {
    let mut cursor = Cursor::new(input);
    let params = cursor.params_until_end(false)?;
    Ok(params.into_iter().map(|p| p.kind).collect())
}

/// Character cursor shared by the type and fragment parsers
pub(crate) struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub(crate) fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume `c` after optional whitespace
    pub(crate) fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, c: char) -> Result<(), SdkError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error_here())
        }
    }

    /// Identifier made of `[A-Za-z0-9_$]`, possibly empty
    pub(crate) fn word(&mut self) -> &'a str {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// Look at the next word without consuming it
    pub(crate) fn peek_word(&self) -> &'a str {
        let rest = self.rest().trim_start();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        &rest[..len]
    }

    /// Error naming the token at the current position
    pub(crate) fn error_here(&self) -> SdkError {
        self.error_at(self.pos)
    }

    fn error_at(&self, start: usize) -> SdkError {
        let rest = self.src[start..].trim_start();
        let end = rest
            .find(|c: char| c == ',' || c == ')' || c.is_whitespace())
            .filter(|&i| i > 0)
            .unwrap_or(rest.len());
        let offending = if rest.is_empty() {
            "<end of input>".to_string()
        } else {
            rest[..end].to_string()
        };
        SdkError::TypeParse {
            input: self.src.to_string(),
            offending,
        }
    }

    /// Parameter list between parentheses, cursor positioned before `(`
    pub(crate) fn param_list(&mut self, named: bool) -> Result<Vec<Param>, SdkError> {
        self.expect('(')?;
        let mut params = Vec::new();
        if self.eat(')') {
            return Ok(params);
        }
        loop {
            params.push(self.param(named)?);
            if self.eat(',') {
                continue;
            }
            self.expect(')')?;
            return Ok(params);
        }
    }

    /// Comma separated parameters running to the end of input
    fn params_until_end(&mut self, named: bool) -> Result<Vec<Param>, SdkError> {
        let mut params = Vec::new();
        self.skip_ws();
        if self.at_end() {
            return Ok(params);
        }
        loop {
            params.push(self.param(named)?);
            if self.eat(',') {
                continue;
            }
            self.skip_ws();
            if self.at_end() {
                return Ok(params);
            }
            return Err(self.error_here());
        }
    }

    /// One parameter; with `named`, trailing `indexed`, modifiers and a name are accepted
    pub(crate) fn param(&mut self, named: bool) -> Result<Param, SdkError> {
        self.skip_ws();
        let start = self.pos;
        let (mut kind, components) = if self.peek() == Some('(') {
            let components = self.param_list(named)?;
            (tuple_of(&components), components)
        } else {
            let word = self.word();
            if word == "tuple" && self.peek_after_ws() == Some('(') {
                let components = self.param_list(named)?;
                (tuple_of(&components), components)
            } else {
                let kind = elementary(word).ok_or_else(|| self.error_at(start))?;
                (kind, Vec::new())
            }
        };

        while self.peek_after_ws() == Some('[') {
            self.eat('[');
            let digits = self.word();
            kind = if digits.is_empty() {
                ParamType::Array(Box::new(kind))
            } else {
                let size = digits
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n > 0 && digits.bytes().all(|b| b.is_ascii_digit()))
                    .ok_or_else(|| self.error_at(start))?;
                ParamType::FixedArray(Box::new(kind), size)
            };
            self.expect(']')?;
        }
        if !kind.is_bounded() {
            return Err(self.error_at(start));
        }

        let mut param = Param {
            name: String::new(),
            kind,
            indexed: false,
            components,
        };
        if !named {
            return Ok(param);
        }

        loop {
            let word = self.peek_word();
            if word.is_empty() {
                break;
            }
            if word == "indexed" {
                param.indexed = true;
            } else if PARAM_MODIFIERS.contains(&word) {
                // skipped
            } else if param.name.is_empty() {
                param.name = word.to_string();
            } else {
                return Err(self.error_here());
            }
            self.word();
        }
        Ok(param)
    }

    fn peek_after_ws(&self) -> Option<char> {
        self.rest().trim_start().chars().next()
    }
}

fn tuple_of(components: &[Param]) -> ParamType {
    ParamType::Tuple(components.iter().map(|p| p.kind.clone()).collect())
}

/// Elementary type from its name
fn elementary(word: &str) -> Option<ParamType> {
    match word {
        "address" => return Some(ParamType::Address),
        "bool" => return Some(ParamType::Bool),
        "string" => return Some(ParamType::String),
        "bytes" => return Some(ParamType::Bytes),
        "uint" => return Some(ParamType::Uint(256)),
        "int" => return Some(ParamType::Int(256)),
        _ => {}
    }

    if let Some(bits) = word.strip_prefix("uint") {
        return int_width(bits).map(ParamType::Uint);
    }
    if let Some(bits) = word.strip_prefix("int") {
        return int_width(bits).map(ParamType::Int);
    }
    if let Some(size) = word.strip_prefix("bytes") {
        return decimal(size)
            .filter(|n| (1..=32).contains(n))
            .map(ParamType::FixedBytes);
    }
    None
}

fn int_width(digits: &str) -> Option<usize> {
    decimal(digits).filter(|n| *n % 8 == 0 && (8..=256).contains(n))
}

/// Decimal without sign or leading zeros
fn decimal(digits: &str) -> Option<usize> {
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offending(err: SdkError) -> String {
        match err {
            SdkError::TypeParse { offending, .. } => offending,
            other => panic!("unexpected error {other:?}"),
        }
    }

    // ==================== Elementary ====================

    #[test]
    fn test_parse_elementary() {
        assert_eq!(parse_type("address").unwrap(), ParamType::Address);
        assert_eq!(parse_type("uint256").unwrap(), ParamType::Uint(256));
        assert_eq!(parse_type("uint").unwrap(), ParamType::Uint(256));
        assert_eq!(parse_type("int").unwrap(), ParamType::Int(256));
        assert_eq!(parse_type("uint8").unwrap(), ParamType::Uint(8));
        assert_eq!(parse_type("int24").unwrap(), ParamType::Int(24));
        assert_eq!(parse_type("bool").unwrap(), ParamType::Bool);
        assert_eq!(parse_type("bytes").unwrap(), ParamType::Bytes);
        assert_eq!(parse_type("bytes1").unwrap(), ParamType::FixedBytes(1));
        assert_eq!(parse_type("bytes32").unwrap(), ParamType::FixedBytes(32));
        assert_eq!(parse_type("string").unwrap(), ParamType::String);
    }

    #[test]
    fn test_reject_bad_widths() {
        for bad in ["uint7", "uint264", "uint0", "uint08", "int9", "bytes0", "bytes33", "bytes01"] {
            assert_eq!(offending(parse_type(bad).unwrap_err()), bad, "{bad}");
        }
    }

    #[test]
    fn test_reject_unknown() {
        assert_eq!(offending(parse_type("uint256[]x").unwrap_err()), "x");
        assert_eq!(offending(parse_type("(uint8,foo)").unwrap_err()), "foo");
        assert_eq!(offending(parse_type("").unwrap_err()), "<end of input>");
        assert!(parse_type("(uint8").is_err());
        assert!(parse_type("uint8[").is_err());
        assert!(parse_type("uint8[0]").is_err());
        assert!(parse_type("tuple").is_err());
    }

    // ==================== Composite ====================

    #[test]
    fn test_parse_arrays() {
        assert_eq!(
            parse_type("address[]").unwrap(),
            ParamType::Array(Box::new(ParamType::Address))
        );
        assert_eq!(
            parse_type("uint8[2][]").unwrap(),
            ParamType::Array(Box::new(ParamType::FixedArray(Box::new(ParamType::Uint(8)), 2)))
        );
    }

    #[test]
    fn test_parse_tuples() {
        let expected = ParamType::FixedArray(
            Box::new(ParamType::Tuple(vec![ParamType::Uint(8), ParamType::Bytes])),
            3,
        );
        assert_eq!(parse_type("(uint8,bytes)[3]").unwrap(), expected);
        assert_eq!(parse_type("tuple(uint8, bytes)[3]").unwrap(), expected);
        assert_eq!(parse_type(" ( uint8 , bytes ) [3] ").unwrap(), expected);
        assert_eq!(parse_type("()").unwrap(), ParamType::Tuple(vec![]));
    }

    #[test]
    fn test_reject_oversized_fixed_arrays() {
        let text = "uint256[576460752303423488][64]";
        assert_eq!(offending(parse_type(text).unwrap_err()), text);
        assert!(matches!(
            parse_type("(bool,bytes32[1048576])[]"),
            Err(SdkError::TypeParse { .. })
        ));
        assert!(parse_types("uint8, string[18446744073709551615]").is_err());
        assert!(parse_type("uint256[524288]").is_ok());
    }

    #[test]
    fn test_canonical_round_trip() {
        for text in ["(uint16,uint256[3])[]", "bytes32[2][]", "((address,bool),string)"] {
            assert_eq!(parse_type(text).unwrap().canonical(), text);
        }
    }

    #[test]
    fn test_parse_types_list() {
        assert_eq!(
            parse_types("address, uint256").unwrap(),
            vec![ParamType::Address, ParamType::Uint(256)]
        );
        assert!(parse_types("").unwrap().is_empty());
        assert!(parse_types("address uint256").is_err());
    }

    // ==================== Named params ====================

    #[test]
    fn test_named_param() {
        let mut cursor = Cursor::new("tuple(uint16 topic, uint256[3] votes)[] memory vote_info");
        let param = cursor.param(true).unwrap();
        assert_eq!(param.name, "vote_info");
        assert_eq!(param.kind.canonical(), "(uint16,uint256[3])[]");
        assert_eq!(param.components[0].name, "topic");
        assert_eq!(param.components[1].name, "votes");

        let mut cursor = Cursor::new("address indexed from");
        let param = cursor.param(true).unwrap();
        assert!(param.indexed);
        assert_eq!(param.name, "from");
    }
}
