//! Transaction types and their wire codec
//!
//! Three layouts share one envelope. Legacy transactions are a bare RLP list;
//! typed transactions prefix the list with their type byte.
//!
//! | type | signed field list |
//! |------|-------------------|
//! | 0 | `[nonce, gasPrice, gas, to, value, storageLimit, epochHeight, chainId, data, v, r, s]` |
//! | 1 | `0x01 ∥ [chainId, nonce, gasPrice, gas, to, value, storageLimit, epochHeight, data, accessList, v, r, s]` |
//! | 2 | `0x02 ∥ [chainId, nonce, maxPriorityFeePerGas, maxFeePerGas, gas, to, value, storageLimit, epochHeight, data, accessList, v, r, s]` |
//!
//! The signing hash is the keccak of the same encoding without `v, r, s`.

use crate::TxError;
use bytes::Bytes;
use mazze_crypto::{
    keccak256, public_key_to_address, recover_public_key, sign, verify, PrivateKey, PublicKey,
    Signature,
};
use mazze_primitives::{Address, H256, U256};
use mazze_rlp::{
    append_bytes, append_optional_address, append_word, ListReader, RlpError, RlpStream,
};

/// Transaction type identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TxType {
    /// Untyped transaction
    #[default]
    Legacy = 0,
    /// Access list transaction
    AccessList = 1,
    /// Fee market transaction
    DynamicFee = 2,
}

impl TxType {
    /// Map a discriminant to a type
    pub fn from_byte(byte: u8) -> Result<Self, TxError> {
        match byte {
            0 => Ok(TxType::Legacy),
            1 => Ok(TxType::AccessList),
            2 => Ok(TxType::DynamicFee),
            other => Err(TxError::UnknownType(other)),
        }
    }
}

/// Access list item (address + storage keys)
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AccessListItem {
    /// Account address
    pub address: Address,
    /// Storage keys
    pub storage_keys: Vec<H256>,
}

/// Legacy transaction (type 0)
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LegacyTx {
    /// Sender nonce
    pub nonce: U256,
    /// Gas price in drip
    pub gas_price: U256,
    /// Gas limit
    pub gas: U256,
    /// Recipient (None for contract creation)
    pub to: Option<Address>,
    /// Value in drip
    pub value: U256,
    /// Storage collateral limit in bytes
    pub storage_limit: u64,
    /// Epoch the transaction is valid around
    pub epoch_height: u64,
    /// Chain id
    pub chain_id: u32,
    /// Input data
    pub data: Bytes,
}

/// Access list transaction (type 1)
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AccessListTx {
    /// Chain id
    pub chain_id: u32,
    /// Sender nonce
    pub nonce: U256,
    /// Gas price in drip
    pub gas_price: U256,
    /// Gas limit
    pub gas: U256,
    /// Recipient (None for contract creation)
    pub to: Option<Address>,
    /// Value in drip
    pub value: U256,
    /// Storage collateral limit in bytes
    pub storage_limit: u64,
    /// Epoch the transaction is valid around
    pub epoch_height: u64,
    /// Input data
    pub data: Bytes,
    /// Access list
    pub access_list: Vec<AccessListItem>,
}

/// Fee market transaction (type 2)
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DynamicFeeTx {
    /// Chain id
    pub chain_id: u32,
    /// Sender nonce
    pub nonce: U256,
    /// Max priority fee per gas (tip)
    pub max_priority_fee_per_gas: U256,
    /// Max fee per gas
    pub max_fee_per_gas: U256,
    /// Gas limit
    pub gas: U256,
    /// Recipient (None for contract creation)
    pub to: Option<Address>,
    /// Value in drip
    pub value: U256,
    /// Storage collateral limit in bytes
    pub storage_limit: u64,
    /// Epoch the transaction is valid around
    pub epoch_height: u64,
    /// Input data
    pub data: Bytes,
    /// Access list
    pub access_list: Vec<AccessListItem>,
}

/// Transaction body (unsigned fields)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionBody {
    /// Type 0
    Legacy(LegacyTx),
    /// Type 1
    AccessList(AccessListTx),
    /// Type 2
    DynamicFee(DynamicFeeTx),
}

impl From<LegacyTx> for TransactionBody {
    fn from(tx: LegacyTx) -> Self {
        TransactionBody::Legacy(tx)
    }
}

impl From<AccessListTx> for TransactionBody {
    fn from(tx: AccessListTx) -> Self {
        TransactionBody::AccessList(tx)
    }
}

impl From<DynamicFeeTx> for TransactionBody {
    fn from(tx: DynamicFeeTx) -> Self {
        TransactionBody::DynamicFee(tx)
    }
}

/// Signature components as carried on the wire
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxSignature {
    /// `recoveryId + 2 * chainId + 35` for legacy, `recoveryId` for typed
    pub v: u64,
    /// R component
    pub r: H256,
    /// S component
    pub s: H256,
}

impl TxSignature {
    /// Create a new signature
    pub fn new(v: u64, r: H256, s: H256) -> Self {
        Self { v, r, s }
    }

    /// Check if signature is non-trivial (non-zero r and s)
    pub fn is_valid(&self) -> bool {
        !self.r.is_zero() && !self.s.is_zero()
    }
}

/// A transaction with an optional signature
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Unsigned fields
    pub body: TransactionBody,
    /// Signature, once signed
    pub signature: Option<TxSignature>,
}

macro_rules! body_field {
    ($self:ident, $field:ident) => {
        match &$self.body {
            TransactionBody::Legacy(tx) => &tx.$field,
            TransactionBody::AccessList(tx) => &tx.$field,
            TransactionBody::DynamicFee(tx) => &tx.$field,
        }
    };
}

impl Transaction {
    /// Wrap an unsigned body
    pub fn new(body: impl Into<TransactionBody>) -> Self {
        Transaction {
            body: body.into(),
            signature: None,
        }
    }

    /// Layout discriminant
    pub fn tx_type(&self) -> TxType {
        match &self.body {
            TransactionBody::Legacy(_) => TxType::Legacy,
            TransactionBody::AccessList(_) => TxType::AccessList,
            TransactionBody::DynamicFee(_) => TxType::DynamicFee,
        }
    }

    // ==================== Accessors ====================

    /// Sender nonce
    pub fn nonce(&self) -> U256 {
        *body_field!(self, nonce)
    }

    /// Gas limit
    pub fn gas(&self) -> U256 {
        *body_field!(self, gas)
    }

    /// Recipient, `None` for contract creation
    pub fn to(&self) -> Option<&Address> {
        body_field!(self, to).as_ref()
    }

    /// Value in drip
    pub fn value(&self) -> U256 {
        *body_field!(self, value)
    }

    /// Input data
    pub fn data(&self) -> &Bytes {
        body_field!(self, data)
    }

    /// Storage collateral limit
    pub fn storage_limit(&self) -> u64 {
        *body_field!(self, storage_limit)
    }

    /// Epoch height
    pub fn epoch_height(&self) -> u64 {
        *body_field!(self, epoch_height)
    }

    /// Chain id
    pub fn chain_id(&self) -> u32 {
        *body_field!(self, chain_id)
    }

    /// Gas price, for the layouts that carry one
    pub fn gas_price(&self) -> Option<U256> {
        match &self.body {
            TransactionBody::Legacy(tx) => Some(tx.gas_price),
            TransactionBody::AccessList(tx) => Some(tx.gas_price),
            TransactionBody::DynamicFee(_) => None,
        }
    }

    /// Access list (empty for legacy)
    pub fn access_list(&self) -> &[AccessListItem] {
        match &self.body {
            TransactionBody::Legacy(_) => &[],
            TransactionBody::AccessList(tx) => &tx.access_list,
            TransactionBody::DynamicFee(tx) => &tx.access_list,
        }
    }

    /// Check if this is a contract creation transaction
    pub fn is_contract_creation(&self) -> bool {
        self.to().is_none()
    }

    // ==================== Encoding ====================

    fn unsigned_field_count(&self) -> usize {
        match self.body {
            TransactionBody::Legacy(_) => 9,
            TransactionBody::AccessList(_) => 10,
            TransactionBody::DynamicFee(_) => 11,
        }
    }

    fn append_body(&self, s: &mut RlpStream) {
        match &self.body {
            TransactionBody::Legacy(tx) => {
                s.append(&tx.nonce);
                s.append(&tx.gas_price);
                s.append(&tx.gas);
                append_optional_address(s, tx.to.as_ref());
                s.append(&tx.value);
                s.append(&tx.storage_limit);
                s.append(&tx.epoch_height);
                s.append(&tx.chain_id);
                append_bytes(s, &tx.data);
            }
            TransactionBody::AccessList(tx) => {
                s.append(&tx.chain_id);
                s.append(&tx.nonce);
                s.append(&tx.gas_price);
                s.append(&tx.gas);
                append_optional_address(s, tx.to.as_ref());
                s.append(&tx.value);
                s.append(&tx.storage_limit);
                s.append(&tx.epoch_height);
                append_bytes(s, &tx.data);
                append_access_list(s, &tx.access_list);
            }
            TransactionBody::DynamicFee(tx) => {
                s.append(&tx.chain_id);
                s.append(&tx.nonce);
                s.append(&tx.max_priority_fee_per_gas);
                s.append(&tx.max_fee_per_gas);
                s.append(&tx.gas);
                append_optional_address(s, tx.to.as_ref());
                s.append(&tx.value);
                s.append(&tx.storage_limit);
                s.append(&tx.epoch_height);
                append_bytes(s, &tx.data);
                append_access_list(s, &tx.access_list);
            }
        }
    }

    fn encode(&self, with_signature: bool) -> Vec<u8> {
        let count = self.unsigned_field_count() + if with_signature { 3 } else { 0 };
        let mut s = RlpStream::new_list(count);
        self.append_body(&mut s);
        if with_signature {
            match &self.signature {
                Some(sig) => {
                    s.append(&sig.v);
                    append_word(&mut s, sig.r.as_bytes());
                    append_word(&mut s, sig.s.as_bytes());
                }
                None => {
                    s.append_empty_data();
                    s.append_empty_data();
                    s.append_empty_data();
                }
            }
        }
        let payload = s.out();
        match self.tx_type() {
            TxType::Legacy => payload.to_vec(),
            typed => {
                let mut out = Vec::with_capacity(1 + payload.len());
                out.push(typed as u8);
                out.extend_from_slice(&payload);
                out
            }
        }
    }

    /// Hash the signature commits to
    pub fn signing_hash(&self) -> H256 {
        keccak256(&self.encode(false))
    }

    /// Wire bytes; unsigned transactions carry empty `v, r, s`
    pub fn serialize(&self) -> Vec<u8> {
        self.encode(true)
    }

    /// Transaction hash, `keccak256(serialize())`
    pub fn hash(&self) -> H256 {
        keccak256(&self.serialize())
    }

    // ==================== Signing ====================

    /// Sign in place; replaces any existing signature
    pub fn sign(&mut self, private_key: &PrivateKey) -> Result<&TxSignature, TxError> {
        let signature = sign(&self.signing_hash(), private_key)?;
        let recovery_id = u64::from(signature.v);
        let v = match self.tx_type() {
            TxType::Legacy => recovery_id + u64::from(self.chain_id()) * 2 + 35,
            _ => recovery_id,
        };
        let signature = TxSignature {
            v,
            r: H256::from_bytes(signature.r),
            s: H256::from_bytes(signature.s),
        };
        Ok(self.signature.insert(signature))
    }

    /// Raw recovery id (0 or 1) with the chain id folding removed
    pub fn recovery_id(&self) -> Result<u8, TxError> {
        let sig = self.signature.as_ref().ok_or(TxError::MissingSignature)?;
        let chain_id = self.chain_id();
        let base = match self.tx_type() {
            TxType::Legacy => u64::from(chain_id) * 2 + 35,
            _ => 0,
        };
        match sig.v.checked_sub(base) {
            Some(id @ 0..=1) => Ok(id as u8),
            _ => Err(TxError::InvalidV { v: sig.v, chain_id }),
        }
    }

    fn crypto_signature(&self) -> Result<Signature, TxError> {
        let sig = self.signature.as_ref().ok_or(TxError::MissingSignature)?;
        Ok(Signature::new(
            *sig.r.as_bytes(),
            *sig.s.as_bytes(),
            self.recovery_id()?,
        ))
    }

    /// Recover the signer's public key
    pub fn recover(&self) -> Result<PublicKey, TxError> {
        let signature = self.crypto_signature()?;
        Ok(recover_public_key(&self.signing_hash(), &signature)?)
    }

    /// Signer address, `None` when unsigned or unrecoverable
    pub fn sender(&self) -> Option<Address> {
        self.recover().ok().map(|key| public_key_to_address(&key))
    }

    /// Check the signature against the key it recovers to (rejects high-s)
    pub fn verify(&self) -> Result<bool, TxError> {
        let signature = self.crypto_signature()?;
        let key = self.recover()?;
        Ok(verify(&self.signing_hash(), &signature, &key)?)
    }

    // ==================== Decoding ====================

    /// Parse wire bytes. The signature is not checked.
    pub fn decode_raw(data: &[u8]) -> Result<Self, TxError> {
        let first = *data.first().ok_or(RlpError::Empty)?;
        match first {
            0xc0..=0xff => Self::decode_legacy(data),
            _ => match TxType::from_byte(first)? {
                TxType::AccessList => Self::decode_access_list(&data[1..]),
                TxType::DynamicFee => Self::decode_dynamic_fee(&data[1..]),
                TxType::Legacy => Err(TxError::UnknownType(first)),
            },
        }
    }

    fn decode_legacy(data: &[u8]) -> Result<Self, TxError> {
        let mut r = ListReader::from_bytes(data, 12)?;
        let body = LegacyTx {
            nonce: r.u256("nonce")?,
            gas_price: r.u256("gasPrice")?,
            gas: r.u256("gas")?,
            to: r.optional_address("to")?,
            value: r.u256("value")?,
            storage_limit: r.u64("storageLimit")?,
            epoch_height: r.u64("epochHeight")?,
            chain_id: read_chain_id(&mut r)?,
            data: r.bytes("data")?,
        };
        Ok(Transaction {
            body: body.into(),
            signature: read_signature(&mut r)?,
        })
    }

    fn decode_access_list(data: &[u8]) -> Result<Self, TxError> {
        let mut r = ListReader::from_bytes(data, 13)?;
        let body = AccessListTx {
            chain_id: read_chain_id(&mut r)?,
            nonce: r.u256("nonce")?,
            gas_price: r.u256("gasPrice")?,
            gas: r.u256("gas")?,
            to: r.optional_address("to")?,
            value: r.u256("value")?,
            storage_limit: r.u64("storageLimit")?,
            epoch_height: r.u64("epochHeight")?,
            data: r.bytes("data")?,
            access_list: read_access_list(&mut r)?,
        };
        Ok(Transaction {
            body: body.into(),
            signature: read_signature(&mut r)?,
        })
    }

    fn decode_dynamic_fee(data: &[u8]) -> Result<Self, TxError> {
        let mut r = ListReader::from_bytes(data, 14)?;
        let body = DynamicFeeTx {
            chain_id: read_chain_id(&mut r)?,
            nonce: r.u256("nonce")?,
            max_priority_fee_per_gas: r.u256("maxPriorityFeePerGas")?,
            max_fee_per_gas: r.u256("maxFeePerGas")?,
            gas: r.u256("gas")?,
            to: r.optional_address("to")?,
            value: r.u256("value")?,
            storage_limit: r.u64("storageLimit")?,
            epoch_height: r.u64("epochHeight")?,
            data: r.bytes("data")?,
            access_list: read_access_list(&mut r)?,
        };
        Ok(Transaction {
            body: body.into(),
            signature: read_signature(&mut r)?,
        })
    }
}

fn append_access_list(s: &mut RlpStream, list: &[AccessListItem]) {
    s.begin_list(list.len());
    for item in list {
        s.begin_list(2);
        s.append(&item.address);
        s.begin_list(item.storage_keys.len());
        for key in &item.storage_keys {
            s.append(key);
        }
    }
}

fn read_access_list(reader: &mut ListReader<'_>) -> Result<Vec<AccessListItem>, RlpError> {
    let mut list = reader.list("accessList", None)?;
    let mut items = Vec::with_capacity(list.len());
    while list.remaining() > 0 {
        let mut entry = list.list("accessList item", Some(2))?;
        let address = entry.address("accessList address")?;
        let mut keys = entry.list("storageKeys", None)?;
        let mut storage_keys = Vec::with_capacity(keys.len());
        while keys.remaining() > 0 {
            storage_keys.push(keys.h256("storageKey")?);
        }
        items.push(AccessListItem {
            address,
            storage_keys,
        });
    }
    Ok(items)
}

fn read_chain_id(reader: &mut ListReader<'_>) -> Result<u32, RlpError> {
    let chain_id = reader.u64("chainId")?;
    u32::try_from(chain_id).map_err(|_| RlpError::InvalidField {
        field: "chainId",
        reason: format!("{} does not fit in 32 bits", chain_id),
    })
}

/// All-empty `v, r, s` is an unsigned transaction
fn read_signature(reader: &mut ListReader<'_>) -> Result<Option<TxSignature>, RlpError> {
    let v = reader.u64("v")?;
    let r = H256::from_bytes(reader.word("r")?);
    let s = H256::from_bytes(reader.word("s")?);
    if v == 0 && r.is_zero() && s.is_zero() {
        return Ok(None);
    }
    Ok(Some(TxSignature { v, r, s }))
}
