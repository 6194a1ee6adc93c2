//! RPC request and response types

use bytes::Bytes;
use mazze_primitives::{Address, H256, U256};
use mazze_types::{
    AccessListItem, AccessListTx, DynamicFeeTx, LegacyTx, Log, Receipt, Transaction, TxOutcome,
    TxType,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::abi::AddressCoder;
use crate::serde_hex::{de_bytes, de_opt_u256, de_opt_u64, de_u256, de_u64, quantity};
use crate::SdkError;

/// Epoch selector for RPC queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Epoch {
    /// Epoch number
    Number(u64),
    /// Genesis
    Earliest,
    /// Latest checkpoint
    LatestCheckpoint,
    /// Latest finalized epoch
    LatestFinalized,
    /// Latest confirmed epoch
    LatestConfirmed,
    /// Latest executed epoch
    #[default]
    LatestState,
    /// Latest mined epoch, possibly not yet executed
    LatestMined,
}

impl Serialize for Epoch {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Epoch::Number(n) => serializer.serialize_str(&format!("0x{:x}", n)),
            Epoch::Earliest => serializer.serialize_str("earliest"),
            Epoch::LatestCheckpoint => serializer.serialize_str("latest_checkpoint"),
            Epoch::LatestFinalized => serializer.serialize_str("latest_finalized"),
            Epoch::LatestConfirmed => serializer.serialize_str("latest_confirmed"),
            Epoch::LatestState => serializer.serialize_str("latest_state"),
            Epoch::LatestMined => serializer.serialize_str("latest_mined"),
        }
    }
}

/// Call request for `mazze_call` and `mazze_estimateGasAndCollateral`
#[derive(Debug, Clone, Default)]
pub struct CallRequest {
    /// Sender address
    pub from: Option<Address>,
    /// Recipient address
    pub to: Option<Address>,
    /// Gas limit
    pub gas: Option<U256>,
    /// Gas price
    pub gas_price: Option<U256>,
    /// Value to transfer
    pub value: Option<U256>,
    /// Input data
    pub data: Option<Bytes>,
    /// Sender nonce
    pub nonce: Option<U256>,
    /// Storage collateral limit
    pub storage_limit: Option<u64>,
}

impl CallRequest {
    /// JSON object with absent fields omitted and addresses rendered by `coder`
    pub fn to_value(&self, coder: &AddressCoder) -> Value {
        let mut map = Map::new();

        if let Some(from) = &self.from {
            map.insert("from".into(), Value::String(coder.format(from)));
        }
        if let Some(to) = &self.to {
            map.insert("to".into(), Value::String(coder.format(to)));
        }
        if let Some(gas) = &self.gas {
            map.insert("gas".into(), Value::String(quantity(gas)));
        }
        if let Some(gas_price) = &self.gas_price {
            map.insert("gasPrice".into(), Value::String(quantity(gas_price)));
        }
        if let Some(value) = &self.value {
            map.insert("value".into(), Value::String(quantity(value)));
        }
        if let Some(data) = &self.data {
            map.insert("data".into(), Value::String(format!("0x{}", hex::encode(data))));
        }
        if let Some(nonce) = &self.nonce {
            map.insert("nonce".into(), Value::String(quantity(nonce)));
        }
        if let Some(limit) = self.storage_limit {
            map.insert("storageLimit".into(), Value::String(format!("0x{:x}", limit)));
        }

        Value::Object(map)
    }
}

/// Transaction fields before population and signing
#[derive(Debug, Clone, Default)]
pub struct TransactionRequest {
    /// Layout; inferred when `None`
    pub tx_type: Option<TxType>,
    /// Sender, used for nonce lookup and estimation
    pub from: Option<Address>,
    /// Recipient (None for contract creation)
    pub to: Option<Address>,
    /// Sender nonce
    pub nonce: Option<U256>,
    /// Gas price (types 0 and 1)
    pub gas_price: Option<U256>,
    /// Max fee per gas (type 2)
    pub max_fee_per_gas: Option<U256>,
    /// Max priority fee per gas (type 2)
    pub max_priority_fee_per_gas: Option<U256>,
    /// Gas limit
    pub gas: Option<U256>,
    /// Storage collateral limit
    pub storage_limit: Option<u64>,
    /// Epoch height
    pub epoch_height: Option<u64>,
    /// Chain id
    pub chain_id: Option<u32>,
    /// Value to transfer
    pub value: U256,
    /// Input data
    pub data: Bytes,
    /// Access list (types 1 and 2)
    pub access_list: Option<Vec<AccessListItem>>,
}

impl TransactionRequest {
    /// Layout this request will produce
    pub fn resolved_type(&self) -> TxType {
        match self.tx_type {
            Some(tx_type) => tx_type,
            None if self.max_fee_per_gas.is_some() || self.max_priority_fee_per_gas.is_some() => {
                TxType::DynamicFee
            }
            None if self.access_list.is_some() => TxType::AccessList,
            None => TxType::Legacy,
        }
    }

    /// Build the unsigned transaction; every field of the layout must be set
    pub fn into_transaction(self) -> Result<Transaction, SdkError> {
        let tx_type = self.resolved_type();
        let nonce = self.nonce.ok_or(SdkError::MissingField("nonce"))?;
        let gas = self.gas.ok_or(SdkError::MissingField("gas"))?;
        let storage_limit = self.storage_limit.ok_or(SdkError::MissingField("storageLimit"))?;
        let epoch_height = self.epoch_height.ok_or(SdkError::MissingField("epochHeight"))?;
        let chain_id = self.chain_id.ok_or(SdkError::MissingField("chainId"))?;

        let tx = match tx_type {
            TxType::Legacy => Transaction::new(LegacyTx {
                nonce,
                gas_price: self.gas_price.ok_or(SdkError::MissingField("gasPrice"))?,
                gas,
                to: self.to,
                value: self.value,
                storage_limit,
                epoch_height,
                chain_id,
                data: self.data,
            }),
            TxType::AccessList => Transaction::new(AccessListTx {
                chain_id,
                nonce,
                gas_price: self.gas_price.ok_or(SdkError::MissingField("gasPrice"))?,
                gas,
                to: self.to,
                value: self.value,
                storage_limit,
                epoch_height,
                data: self.data,
                access_list: self.access_list.unwrap_or_default(),
            }),
            TxType::DynamicFee => Transaction::new(DynamicFeeTx {
                chain_id,
                nonce,
                max_priority_fee_per_gas: self
                    .max_priority_fee_per_gas
                    .ok_or(SdkError::MissingField("maxPriorityFeePerGas"))?,
                max_fee_per_gas: self
                    .max_fee_per_gas
                    .ok_or(SdkError::MissingField("maxFeePerGas"))?,
                gas,
                to: self.to,
                value: self.value,
                storage_limit,
                epoch_height,
                data: self.data,
                access_list: self.access_list.unwrap_or_default(),
            }),
        };
        Ok(tx)
    }
}

/// Transaction as returned by `mazze_getTransactionByHash`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcTransaction {
    /// Transaction hash
    pub hash: H256,
    /// Sender nonce
    #[serde(deserialize_with = "de_u256")]
    pub nonce: U256,
    /// Containing block, once packed
    pub block_hash: Option<H256>,
    /// Position in the block, once packed
    #[serde(deserialize_with = "de_opt_u64")]
    pub transaction_index: Option<u64>,
    /// Sender
    pub from: Address,
    /// Recipient
    pub to: Option<Address>,
    /// Value
    #[serde(deserialize_with = "de_u256")]
    pub value: U256,
    /// Gas price (types 0 and 1)
    #[serde(deserialize_with = "de_opt_u256")]
    pub gas_price: Option<U256>,
    /// Gas limit
    #[serde(deserialize_with = "de_u256")]
    pub gas: U256,
    /// Contract created, once executed
    pub contract_created: Option<Address>,
    /// Input data
    #[serde(deserialize_with = "de_bytes")]
    pub data: Bytes,
    /// Execution status, once executed
    #[serde(deserialize_with = "de_opt_u64")]
    pub status: Option<u64>,
}

/// Log as returned by the node
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcLog {
    /// Emitting contract
    pub address: Address,
    /// Topics
    pub topics: Vec<H256>,
    /// Data
    #[serde(deserialize_with = "de_bytes")]
    pub data: Bytes,
    /// Containing block
    pub block_hash: Option<H256>,
    /// Containing epoch
    #[serde(deserialize_with = "de_opt_u64")]
    pub epoch_number: Option<u64>,
    /// Emitting transaction
    pub transaction_hash: Option<H256>,
    /// Position in the block
    #[serde(deserialize_with = "de_opt_u64")]
    pub log_index: Option<u64>,
}

impl From<RpcLog> for Log {
    fn from(log: RpcLog) -> Self {
        Log {
            address: log.address,
            topics: log.topics,
            data: log.data,
            block_hash: log.block_hash,
            epoch_number: log.epoch_number,
            transaction_hash: log.transaction_hash,
            log_index: log.log_index,
        }
    }
}

/// Receipt as returned by `mazze_getTransactionReceipt`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    /// Transaction hash
    pub transaction_hash: H256,
    /// Position in the block
    #[serde(deserialize_with = "de_u64")]
    pub index: u64,
    /// Containing block
    pub block_hash: H256,
    /// Executing epoch
    #[serde(deserialize_with = "de_u64")]
    pub epoch_number: u64,
    /// Sender
    pub from: Address,
    /// Recipient
    #[serde(default)]
    pub to: Option<Address>,
    /// Gas used
    #[serde(deserialize_with = "de_u256")]
    pub gas_used: U256,
    /// Fee charged
    #[serde(deserialize_with = "de_u256")]
    pub gas_fee: U256,
    /// Storage collateral
    #[serde(default, deserialize_with = "de_opt_u256")]
    pub storage_collateralized: Option<U256>,
    /// 0 success, 1 failure, 2 skipped; null until executed
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub outcome_status: Option<u64>,
    /// Contract created
    #[serde(default)]
    pub contract_created: Option<Address>,
    /// Logs
    #[serde(default)]
    pub logs: Vec<RpcLog>,
    /// Error message for failed or skipped execution
    #[serde(default)]
    pub tx_exec_error_msg: Option<String>,
}

impl TryFrom<RpcReceipt> for Receipt {
    type Error = SdkError;

    fn try_from(receipt: RpcReceipt) -> Result<Self, Self::Error> {
        let code = receipt
            .outcome_status
            .ok_or(SdkError::MissingField("outcomeStatus"))?;
        let outcome = TxOutcome::from_code(code)
            .ok_or_else(|| SdkError::MalformedResponse(format!("unknown outcome status {}", code)))?;
        Ok(Receipt {
            transaction_hash: receipt.transaction_hash,
            index: receipt.index,
            block_hash: receipt.block_hash,
            epoch_number: receipt.epoch_number,
            from: receipt.from,
            to: receipt.to,
            gas_used: receipt.gas_used,
            gas_fee: receipt.gas_fee,
            storage_collateralized: receipt.storage_collateralized.unwrap_or_default(),
            outcome,
            contract_created: receipt.contract_created,
            logs: receipt.logs.into_iter().map(Log::from).collect(),
            tx_exec_error_msg: receipt.tx_exec_error_msg,
        })
    }
}

/// Node status from `mazze_getStatus`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Chain id used for signing
    #[serde(deserialize_with = "de_u64")]
    pub chain_id: u64,
    /// Network id used for address text
    #[serde(deserialize_with = "de_u64")]
    pub network_id: u64,
    /// Latest mined epoch
    #[serde(deserialize_with = "de_u64")]
    pub epoch_number: u64,
    /// Block count
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub block_number: Option<u64>,
    /// Pending pool size
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub pending_tx_number: Option<u64>,
    /// Latest checkpoint epoch
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub latest_checkpoint: Option<u64>,
    /// Latest confirmed epoch
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub latest_confirmed: Option<u64>,
    /// Latest executed epoch
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub latest_state: Option<u64>,
    /// Latest finalized epoch
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub latest_finalized: Option<u64>,
}

/// Result of `mazze_estimateGasAndCollateral`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    /// Gas the call used
    #[serde(deserialize_with = "de_u256")]
    pub gas_used: U256,
    /// Suggested gas limit
    #[serde(deserialize_with = "de_u256")]
    pub gas_limit: U256,
    /// Storage collateral in bytes
    #[serde(deserialize_with = "de_u256")]
    pub storage_collateralized: U256,
}

/// Block fields the client reads
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockSummary {
    /// Block hash
    pub hash: H256,
    /// Epoch, once executed
    #[serde(deserialize_with = "de_opt_u64")]
    pub epoch_number: Option<u64>,
    /// Base fee; absent before the fee market
    #[serde(deserialize_with = "de_opt_u256")]
    pub base_fee_per_gas: Option<U256>,
}

/// Filter for `mazze_getLogs`
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    /// First epoch
    pub from_epoch: Option<Epoch>,
    /// Last epoch
    pub to_epoch: Option<Epoch>,
    /// Restrict to blocks; exclusive with the epoch range
    pub block_hashes: Option<Vec<H256>>,
    /// Emitting contracts
    pub address: Vec<Address>,
    /// Topic positions; `None` matches anything, several hashes match any of them
    pub topics: Vec<Option<Vec<H256>>>,
    /// Maximum number of logs
    pub limit: Option<u64>,
}

impl LogFilter {
    /// JSON object for the node
    pub fn to_value(&self, coder: &AddressCoder) -> Result<Value, SdkError> {
        if self.block_hashes.is_some() && (self.from_epoch.is_some() || self.to_epoch.is_some()) {
            return Err(SdkError::InvalidState(
                "blockHashes cannot be combined with fromEpoch or toEpoch",
            ));
        }

        let mut map = Map::new();
        if let Some(from) = &self.from_epoch {
            map.insert("fromEpoch".into(), serde_json::to_value(from)?);
        }
        if let Some(to) = &self.to_epoch {
            map.insert("toEpoch".into(), serde_json::to_value(to)?);
        }
        if let Some(hashes) = &self.block_hashes {
            map.insert("blockHashes".into(), serde_json::to_value(hashes)?);
        }
        if !self.address.is_empty() {
            let addresses = self.address.iter().map(|a| Value::String(coder.format(a))).collect();
            map.insert("address".into(), Value::Array(addresses));
        }
        if !self.topics.is_empty() {
            let topics = self
                .topics
                .iter()
                .map(|position| match position {
                    None => Value::Null,
                    Some(hashes) if hashes.len() == 1 => Value::String(hashes[0].to_hex()),
                    Some(hashes) => {
                        Value::Array(hashes.iter().map(|h| Value::String(h.to_hex())).collect())
                    }
                })
                .collect();
            map.insert("topics".into(), Value::Array(topics));
        }
        if let Some(limit) = self.limit {
            map.insert("limit".into(), Value::String(format!("0x{:x}", limit)));
        }
        Ok(Value::Object(map))
    }
}
