//! Execution outcome, receipts and logs

use bytes::Bytes;
use mazze_primitives::{Address, H256, U256};

/// Execution outcome reported in a receipt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TxOutcome {
    /// Executed successfully
    Success = 0,
    /// Executed and reverted; fees were charged
    Failure = 1,
    /// Not executed (e.g. nonce or balance check failed at execution)
    Skipped = 2,
}

impl TxOutcome {
    /// Map the numeric `outcomeStatus` field
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(TxOutcome::Success),
            1 => Some(TxOutcome::Failure),
            2 => Some(TxOutcome::Skipped),
            _ => None,
        }
    }

    /// Check for success
    pub fn is_success(&self) -> bool {
        matches!(self, TxOutcome::Success)
    }
}

/// Log entry emitted during transaction execution
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Log {
    /// Contract address that emitted the log
    pub address: Address,
    /// Log topics (indexed parameters)
    pub topics: Vec<H256>,
    /// Log data (non-indexed parameters)
    pub data: Bytes,
    /// Containing block, when known
    pub block_hash: Option<H256>,
    /// Containing epoch, when known
    pub epoch_number: Option<u64>,
    /// Emitting transaction, when known
    pub transaction_hash: Option<H256>,
    /// Position in the block, when known
    pub log_index: Option<u64>,
}

impl Log {
    /// Create a new log entry without chain position
    pub fn new(address: Address, topics: Vec<H256>, data: Bytes) -> Self {
        Self {
            address,
            topics,
            data,
            ..Default::default()
        }
    }

    /// Get the first topic (usually the event signature)
    pub fn topic0(&self) -> Option<&H256> {
        self.topics.first()
    }
}

/// Transaction receipt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// Transaction hash
    pub transaction_hash: H256,
    /// Position inside the block
    pub index: u64,
    /// Containing block
    pub block_hash: H256,
    /// Epoch the block was executed in
    pub epoch_number: u64,
    /// Sender
    pub from: Address,
    /// Recipient, `None` for contract creation
    pub to: Option<Address>,
    /// Gas used by this transaction
    pub gas_used: U256,
    /// Fee charged
    pub gas_fee: U256,
    /// Storage collateral charged, in bytes
    pub storage_collateralized: U256,
    /// Execution outcome
    pub outcome: TxOutcome,
    /// Contract created, if any
    pub contract_created: Option<Address>,
    /// Logs emitted by this transaction
    pub logs: Vec<Log>,
    /// Revert or skip message, when execution did not succeed
    pub tx_exec_error_msg: Option<String>,
}

impl Receipt {
    /// Check if transaction succeeded
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}
