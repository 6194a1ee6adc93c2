//! Event coder: topics and log decoding

use mazze_crypto::keccak256;
use mazze_primitives::H256;
use mazze_types::Log;

use super::decode::decode;
use super::encode::{encode, encode_in_place};
use super::types::{join_canonical, param_types, Param, ParamType, Token};
use crate::SdkError;

/// Encoder/decoder for one contract event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCoder {
    /// Event name
    pub name: String,
    /// Parameters in declaration order
    pub inputs: Vec<Param>,
    /// Anonymous events carry no signature topic
    pub anonymous: bool,
}

/// Log decoded against its event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    /// Event name
    pub name: String,
    /// Canonical signature
    pub signature: String,
    /// `(name, value)` in declaration order
    pub params: Vec<(String, Token)>,
}

impl DecodedEvent {
    /// Value of a named parameter
    pub fn get(&self, name: &str) -> Option<&Token> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Values in declaration order
    pub fn values(&self) -> Vec<Token> {
        self.params.iter().map(|(_, t)| t.clone()).collect()
    }
}

impl EventCoder {
    /// Build a coder from its parts
    pub fn new(name: impl Into<String>, inputs: Vec<Param>, anonymous: bool) -> Self {
        Self {
            name: name.into(),
            inputs,
            anonymous,
        }
    }

    /// Canonical signature, e.g. `Transfer(address,address,uint256)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, join_canonical(&param_types(&self.inputs)))
    }

    /// `keccak256(signature)`
    pub fn topic(&self) -> H256 {
        keccak256(self.signature().as_bytes())
    }

    fn indexed(&self) -> impl Iterator<Item = &Param> {
        self.inputs.iter().filter(|p| p.indexed)
    }

    /// Topics for a log filter, one optional value per indexed parameter
    ///
    /// `None` leaves the position open. The signature topic is prepended for
    /// non-anonymous events.
    pub fn encode_topics(&self, args: &[Option<Token>]) -> Result<Vec<Option<H256>>, SdkError> {
        let indexed: Vec<&Param> = self.indexed().collect();
        if args.len() != indexed.len() {
            return Err(SdkError::EncodeArity {
                expected: indexed.len(),
                got: args.len(),
            });
        }

        let mut topics = Vec::with_capacity(args.len() + 1);
        if !self.anonymous {
            topics.push(Some(self.topic()));
        }
        for (param, arg) in indexed.into_iter().zip(args) {
            topics.push(match arg {
                Some(token) => Some(encode_topic(&param.kind, token)?),
                None => None,
            });
        }
        Ok(topics)
    }

    /// Decode a log emitted by this event
    ///
    /// Indexed dynamic values only survive as their hash and decode to
    /// `Token::FixedBytes` of that hash.
    pub fn decode_log(&self, log: &Log) -> Result<DecodedEvent, SdkError> {
        let mut topics = log.topics.iter();
        if !self.anonymous {
            match topics.next() {
                Some(topic) if *topic == self.topic() => {}
                _ => {
                    return Err(SdkError::Abi(format!(
                        "log topic does not match {}",
                        self.signature()
                    )))
                }
            }
        }

        let indexed_count = self.indexed().count();
        if topics.len() != indexed_count {
            return Err(SdkError::Abi(format!(
                "{} expects {} indexed topics, log has {}",
                self.signature(),
                indexed_count,
                topics.len()
            )));
        }

        let data_types: Vec<ParamType> = self
            .inputs
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.kind.clone())
            .collect();
        let mut data_values = decode(&data_types, &log.data)?.into_iter();

        let mut params = Vec::with_capacity(self.inputs.len());
        for param in &self.inputs {
            let value = if param.indexed {
                let topic = topics.next().ok_or(SdkError::DecodeUnderflow {
                    needed: indexed_count,
                    available: log.topics.len(),
                })?;
                decode_topic(&param.kind, topic)?
            } else {
                data_values.next().ok_or(SdkError::DecodeUnderflow {
                    needed: data_types.len(),
                    available: 0,
                })?
            };
            params.push((param.name.clone(), value));
        }

        Ok(DecodedEvent {
            name: self.name.clone(),
            signature: self.signature(),
            params,
        })
    }
}

/// Encode one indexed argument as a topic
fn encode_topic(kind: &ParamType, token: &Token) -> Result<H256, SdkError> {
    if kind.is_dynamic() || matches!(kind, ParamType::Tuple(_) | ParamType::FixedArray(..)) {
        Ok(keccak256(&encode_in_place(kind, token)?))
    } else {
        let word = encode(std::slice::from_ref(kind), std::slice::from_ref(token))?;
        H256::from_slice(&word).map_err(|e| SdkError::Abi(e.to_string()))
    }
}

fn decode_topic(kind: &ParamType, topic: &H256) -> Result<Token, SdkError> {
    if kind.is_dynamic() || matches!(kind, ParamType::Tuple(_) | ParamType::FixedArray(..)) {
        Ok(Token::FixedBytes(topic.as_bytes().to_vec()))
    } else {
        decode(std::slice::from_ref(kind), topic.as_bytes())?
            .pop()
            .ok_or_else(|| SdkError::Abi("empty topic decode".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use mazze_primitives::{Address, U256};

    fn transfer_event() -> EventCoder {
        let mut from = Param::named("from", ParamType::Address);
        from.indexed = true;
        let mut to = Param::named("to", ParamType::Address);
        to.indexed = true;
        EventCoder::new(
            "Transfer",
            vec![from, to, Param::named("value", ParamType::Uint(256))],
            false,
        )
    }

    #[test]
    fn test_event_topic() {
        assert_eq!(
            transfer_event().topic().to_hex(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn test_encode_topics_wildcards() {
        let event = transfer_event();
        let to = Address::from_bytes([0x11; 20]);
        let topics = event.encode_topics(&[None, Some(Token::Address(to))]).unwrap();
        assert_eq!(topics.len(), 3);
        assert_eq!(topics[0], Some(event.topic()));
        assert_eq!(topics[1], None);
        assert_eq!(topics[2], Some(H256::from_address(&to)));

        assert!(matches!(
            event.encode_topics(&[None]),
            Err(SdkError::EncodeArity { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_encode_dynamic_topic_is_hashed() {
        let mut name = Param::named("name", ParamType::String);
        name.indexed = true;
        let event = EventCoder::new("Named", vec![name], true);
        let topics = event.encode_topics(&[Some(Token::string("mazze"))]).unwrap();
        assert_eq!(topics, vec![Some(keccak256(b"mazze"))]);
    }

    #[test]
    fn test_decode_log() {
        let event = transfer_event();
        let from = Address::from_bytes([0x10; 20]);
        let to = Address::from_bytes([0x11; 20]);
        let mut data = [0u8; 32];
        data[31] = 42;
        let log = Log::new(
            Address::from_bytes([0x80; 20]),
            vec![event.topic(), H256::from_address(&from), H256::from_address(&to)],
            Bytes::copy_from_slice(&data),
        );

        let decoded = event.decode_log(&log).unwrap();
        assert_eq!(decoded.name, "Transfer");
        assert_eq!(decoded.get("from"), Some(&Token::Address(from)));
        assert_eq!(decoded.get("to"), Some(&Token::Address(to)));
        assert_eq!(decoded.get("value"), Some(&Token::Uint(U256::from(42))));
    }

    #[test]
    fn test_decode_log_rejects_other_event() {
        let event = transfer_event();
        let log = Log::new(Address::ZERO, vec![H256::ZERO], Bytes::new());
        assert!(matches!(event.decode_log(&log), Err(SdkError::Abi(_))));

        let log = Log::new(Address::ZERO, vec![event.topic()], Bytes::new());
        assert!(matches!(event.decode_log(&log), Err(SdkError::Abi(_))));
    }
}
