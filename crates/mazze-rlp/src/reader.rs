//! Field-by-field reader over an RLP list with canonical-form checks

use crate::RlpError;
use bytes::Bytes;
use mazze_primitives::{Address, H256, U256};
use rlp::Rlp;

/// Sequential reader over the items of one RLP list.
///
/// Every integer accessor rejects non-minimal encodings: a leading zero byte,
/// or a single byte below `0x80` wrapped in a string header.
pub struct ListReader<'a> {
    list: Rlp<'a>,
    len: usize,
    index: usize,
}

impl<'a> ListReader<'a> {
    /// Open a top-level list that must span `data` exactly
    pub fn from_bytes(data: &'a [u8], expected: usize) -> Result<Self, RlpError> {
        if data.is_empty() {
            return Err(RlpError::Empty);
        }
        let list = Rlp::new(data);
        let info = list.payload_info()?;
        let consumed = info.header_len + info.value_len;
        if consumed < data.len() {
            return Err(RlpError::TrailingBytes {
                extra: data.len() - consumed,
            });
        }
        Self::nested(list, "transaction", Some(expected))
    }

    /// Open a nested list item, optionally checking its arity
    pub fn nested(
        list: Rlp<'a>,
        field: &'static str,
        expected: Option<usize>,
    ) -> Result<Self, RlpError> {
        if !list.is_list() {
            return Err(RlpError::ExpectedList(field));
        }
        let len = list.item_count()?;
        if let Some(expected) = expected {
            if len != expected {
                return Err(RlpError::FieldCount { expected, got: len });
            }
        }
        Ok(ListReader {
            list,
            len,
            index: 0,
        })
    }

    /// Number of items in the list
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for an empty list
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Items not yet consumed
    pub fn remaining(&self) -> usize {
        self.len - self.index
    }

    fn next_item(&mut self, field: &'static str) -> Result<Rlp<'a>, RlpError> {
        if self.index >= self.len {
            return Err(RlpError::FieldCount {
                expected: self.index + 1,
                got: self.len,
            });
        }
        let item = self.list.at(self.index).map_err(|e| match e {
            rlp::DecoderError::RlpIsTooShort => RlpError::InvalidField {
                field,
                reason: "truncated".to_string(),
            },
            other => RlpError::Decoder(other),
        })?;
        self.index += 1;
        Ok(item)
    }

    fn next_data(&mut self, field: &'static str) -> Result<(Rlp<'a>, &'a [u8]), RlpError> {
        let item = self.next_item(field)?;
        if !item.is_data() {
            return Err(RlpError::ExpectedData(field));
        }
        let data = item.data()?;
        Ok((item, data))
    }

    /// Minimal big-endian integer bytes, at most `max_len` long
    fn next_uint(&mut self, field: &'static str, max_len: usize) -> Result<&'a [u8], RlpError> {
        let (item, data) = self.next_data(field)?;
        let raw = item.as_raw();
        if raw.first().map_or(false, |&b| b >= 0x80) && data.len() == 1 && data[0] < 0x80 {
            return Err(RlpError::MalformedInteger {
                field,
                reason: "single byte below 0x80 must not carry a header",
            });
        }
        if data.first() == Some(&0) {
            return Err(RlpError::MalformedInteger {
                field,
                reason: "leading zero byte",
            });
        }
        if data.len() > max_len {
            return Err(RlpError::InvalidField {
                field,
                reason: format!("integer wider than {} bytes", max_len),
            });
        }
        Ok(data)
    }

    /// Read a canonical integer that fits in `u64`
    pub fn u64(&mut self, field: &'static str) -> Result<u64, RlpError> {
        let data = self.next_uint(field, 8)?;
        Ok(data.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    /// Read a canonical integer that fits in 256 bits
    pub fn u256(&mut self, field: &'static str) -> Result<U256, RlpError> {
        let data = self.next_uint(field, 32)?;
        Ok(U256::from_big_endian(data))
    }

    /// Read a canonical integer as a left-padded 32-byte word (signature r/s)
    pub fn word(&mut self, field: &'static str) -> Result<[u8; 32], RlpError> {
        let data = self.next_uint(field, 32)?;
        let mut out = [0u8; 32];
        out[32 - data.len()..].copy_from_slice(data);
        Ok(out)
    }

    /// Read an arbitrary byte string
    pub fn bytes(&mut self, field: &'static str) -> Result<Bytes, RlpError> {
        let (_, data) = self.next_data(field)?;
        Ok(Bytes::copy_from_slice(data))
    }

    /// Read a 20-byte address
    pub fn address(&mut self, field: &'static str) -> Result<Address, RlpError> {
        let (_, data) = self.next_data(field)?;
        Address::from_slice(data).map_err(|e| RlpError::InvalidField {
            field,
            reason: e.to_string(),
        })
    }

    /// Read an address where the empty string means "absent"
    pub fn optional_address(&mut self, field: &'static str) -> Result<Option<Address>, RlpError> {
        let (_, data) = self.next_data(field)?;
        if data.is_empty() {
            return Ok(None);
        }
        Address::from_slice(data)
            .map(Some)
            .map_err(|e| RlpError::InvalidField {
                field,
                reason: e.to_string(),
            })
    }

    /// Read a 32-byte hash
    pub fn h256(&mut self, field: &'static str) -> Result<H256, RlpError> {
        let (_, data) = self.next_data(field)?;
        H256::from_slice(data).map_err(|e| RlpError::InvalidField {
            field,
            reason: e.to_string(),
        })
    }

    /// Descend into a nested list
    pub fn list(
        &mut self,
        field: &'static str,
        expected: Option<usize>,
    ) -> Result<ListReader<'a>, RlpError> {
        let item = self.next_item(field)?;
        ListReader::nested(item, field, expected)
    }
}
