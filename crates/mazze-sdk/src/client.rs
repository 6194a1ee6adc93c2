//! MazzeClient - main RPC client

use std::sync::Arc;

use bytes::Bytes;
use mazze_primitives::{Address, AddressKind, H256, U256};
use mazze_types::{Log, Transaction, TxType};
use serde_json::Value;
use tracing::debug;

use crate::abi::AddressCoder;
use crate::config::ConfirmationConfig;
use crate::pending::PendingTransaction;
use crate::serde_hex::{parse_hex_bytes, parse_hex_u256, parse_hex_u64};
use crate::transport::{deserialize_response, MockTransport, Transport};
use crate::types::{
    BlockSummary, CallRequest, Epoch, Estimate, LogFilter, RpcLog, RpcReceipt, RpcTransaction,
    Status, TransactionRequest,
};
use crate::SdkError;

#[cfg(feature = "http")]
use crate::config::ClientConfig;
#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// Gas for a plain value transfer between user accounts
const TRANSFER_GAS: u64 = 21_000;

/// Mazze client for RPC communication
pub struct MazzeClient {
    transport: Arc<dyn Transport>,
    network_id: Option<u32>,
    confirmation: ConfirmationConfig,
}

impl MazzeClient {
    /// Create a new client with HTTP transport
    ///
    /// The network id is read from the node.
    #[cfg(feature = "http")]
    pub async fn connect(url: &str) -> Result<Self, SdkError> {
        let mut client = Self::with_transport(HttpTransport::new(url));
        let status = client.get_status().await?;
        client.network_id = Some(network_id_from_status(&status)?);
        Ok(client)
    }

    /// Create a client from settings
    ///
    /// A configured network id skips the status round trip.
    #[cfg(feature = "http")]
    pub async fn from_config(config: &ClientConfig) -> Result<Self, SdkError> {
        let client = match config.network_id {
            Some(id) => Self::with_transport(HttpTransport::new(&config.url)).with_network_id(id),
            None => Self::connect(&config.url).await?,
        };
        Ok(client.with_confirmation(config.confirmation))
    }

    /// Create a new client with mock transport (for testing)
    pub fn new_mock() -> Self {
        Self {
            transport: Arc::new(MockTransport::new()),
            network_id: Some(1),
            confirmation: ConfirmationConfig::default(),
        }
    }

    /// Create a client with a custom transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            network_id: None,
            confirmation: ConfirmationConfig::default(),
        }
    }

    /// Set the network id used for address text
    pub fn with_network_id(mut self, network_id: u32) -> Self {
        self.network_id = Some(network_id);
        self
    }

    /// Set confirmation tracking settings
    pub fn with_confirmation(mut self, confirmation: ConfirmationConfig) -> Self {
        self.confirmation = confirmation;
        self
    }

    /// Network id, if known
    pub fn network_id(&self) -> Option<u32> {
        self.network_id
    }

    /// Address coder for this client's network
    pub fn address_coder(&self) -> AddressCoder {
        AddressCoder::new(self.network_id)
    }

    /// Shared transport
    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// Helper method to make RPC request and deserialize
    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, SdkError> {
        debug!(method, "rpc call");
        let value = self.transport.request_json(method, params).await?;
        deserialize_response(value)
    }

    fn address_param(&self, address: &Address) -> Value {
        Value::String(self.address_coder().format(address))
    }

    // ==================== Chain Info ====================

    /// Get node status
    pub async fn get_status(&self) -> Result<Status, SdkError> {
        self.request("mazze_getStatus", vec![]).await
    }

    /// Get the chain id used for signing
    pub async fn chain_id(&self) -> Result<u32, SdkError> {
        let status = self.get_status().await?;
        u32::try_from(status.chain_id)
            .map_err(|_| SdkError::MalformedResponse(format!("chain id {} too large", status.chain_id)))
    }

    /// Get the epoch number for a tag
    pub async fn epoch_number(&self, epoch: Epoch) -> Result<u64, SdkError> {
        let result: String = self
            .request("mazze_epochNumber", vec![serde_json::to_value(epoch)?])
            .await?;
        parse_hex_u64(&result)
    }

    /// Get the current gas price
    pub async fn gas_price(&self) -> Result<U256, SdkError> {
        let result: String = self.request("mazze_gasPrice", vec![]).await?;
        parse_hex_u256(&result)
    }

    /// Get the suggested priority fee
    pub async fn max_priority_fee_per_gas(&self) -> Result<U256, SdkError> {
        let result: String = self.request("mazze_maxPriorityFeePerGas", vec![]).await?;
        parse_hex_u256(&result)
    }

    // ==================== Account Queries ====================

    /// Get the balance of an address
    pub async fn get_balance(&self, address: &Address, epoch: Epoch) -> Result<U256, SdkError> {
        let result: String = self
            .request(
                "mazze_getBalance",
                vec![self.address_param(address), serde_json::to_value(epoch)?],
            )
            .await?;
        parse_hex_u256(&result)
    }

    /// Get the next nonce the node expects from an address
    pub async fn get_next_nonce(&self, address: &Address) -> Result<U256, SdkError> {
        let result: String = self
            .request("mazze_getNextNonce", vec![self.address_param(address)])
            .await?;
        parse_hex_u256(&result)
    }

    /// Get the code at an address
    pub async fn get_code(&self, address: &Address, epoch: Epoch) -> Result<Bytes, SdkError> {
        let result: String = self
            .request(
                "mazze_getCode",
                vec![self.address_param(address), serde_json::to_value(epoch)?],
            )
            .await?;
        parse_hex_bytes(&result)
    }

    // ==================== Block Queries ====================

    /// Get the pivot block of an epoch
    pub async fn get_block_by_epoch_number(
        &self,
        epoch: Epoch,
    ) -> Result<Option<BlockSummary>, SdkError> {
        self.request(
            "mazze_getBlockByEpochNumber",
            vec![serde_json::to_value(epoch)?, Value::Bool(false)],
        )
        .await
    }

    /// Get a block by hash
    pub async fn get_block_by_hash(&self, hash: &H256) -> Result<Option<BlockSummary>, SdkError> {
        self.request(
            "mazze_getBlockByHash",
            vec![Value::String(hash.to_hex()), Value::Bool(false)],
        )
        .await
    }

    /// Probability that a block's epoch assignment is later reverted
    ///
    /// `None` when the node no longer tracks the block.
    pub async fn get_confirmation_risk_by_hash(&self, hash: &H256) -> Result<Option<f64>, SdkError> {
        let value = self
            .transport
            .request_json(
                "mazze_getConfirmationRiskByHash",
                vec![Value::String(hash.to_hex())],
            )
            .await?;
        parse_risk(&value)
    }

    // ==================== Transaction Queries ====================

    /// Get a transaction by hash
    pub async fn get_transaction_by_hash(
        &self,
        hash: &H256,
    ) -> Result<Option<RpcTransaction>, SdkError> {
        self.request("mazze_getTransactionByHash", vec![Value::String(hash.to_hex())])
            .await
    }

    /// Get a transaction receipt
    pub async fn get_transaction_receipt(
        &self,
        hash: &H256,
    ) -> Result<Option<RpcReceipt>, SdkError> {
        self.request("mazze_getTransactionReceipt", vec![Value::String(hash.to_hex())])
            .await
    }

    // ==================== Transaction Submission ====================

    /// Send a raw transaction (serialized bytes)
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<PendingTransaction, SdkError> {
        let hex = format!("0x{}", hex::encode(raw));
        let result: String = self
            .request("mazze_sendRawTransaction", vec![Value::String(hex)])
            .await?;

        let hash = H256::from_hex(&result)?;
        Ok(self.pending(hash))
    }

    /// Send a signed transaction
    pub async fn send_transaction(&self, tx: &Transaction) -> Result<PendingTransaction, SdkError> {
        if tx.signature.is_none() {
            return Err(SdkError::SignatureRecovery("transaction is not signed".to_string()));
        }
        self.send_raw_transaction(&tx.serialize()).await
    }

    /// Track an already submitted transaction
    pub fn pending(&self, hash: H256) -> PendingTransaction {
        PendingTransaction::new(hash, self.transport.clone(), self.confirmation)
    }

    /// Fill every unset field of `request` from the node
    ///
    /// Plain transfers to user accounts get 21000 gas and no storage limit;
    /// everything else is estimated. A zero node gas price becomes 1 drip.
    pub async fn populate_transaction(
        &self,
        request: &mut TransactionRequest,
        from: &Address,
    ) -> Result<(), SdkError> {
        if request.from.is_none() {
            request.from = Some(*from);
        }
        if request.nonce.is_none() {
            request.nonce = Some(self.get_next_nonce(from).await?);
        }
        if request.chain_id.is_none() {
            request.chain_id = Some(match self.network_id {
                Some(id) => id,
                None => self.chain_id().await?,
            });
        }
        let epoch_height = match request.epoch_height {
            Some(height) => height,
            None => {
                let height = self.epoch_number(Epoch::LatestState).await?;
                request.epoch_height = Some(height);
                height
            }
        };

        let mut base_fee = None;
        let fee_fields_set =
            request.max_fee_per_gas.is_some() || request.max_priority_fee_per_gas.is_some();
        if request.tx_type.is_none() && !fee_fields_set {
            base_fee = self
                .get_block_by_epoch_number(Epoch::Number(epoch_height))
                .await?
                .and_then(|block| block.base_fee_per_gas);
            request.tx_type = Some(if base_fee.is_some() {
                TxType::DynamicFee
            } else if request.access_list.is_some() {
                TxType::AccessList
            } else {
                TxType::Legacy
            });
        }

        if request.gas.is_none() || request.storage_limit.is_none() {
            let plain_transfer = request.data.is_empty()
                && request.access_list.is_none()
                && matches!(request.to, Some(to) if to.kind() == AddressKind::User);
            let (gas, storage) = if plain_transfer {
                (U256::from(TRANSFER_GAS), 0)
            } else {
                let estimate = self
                    .estimate_gas_and_collateral(
                        &CallRequest {
                            from: Some(*from),
                            to: request.to,
                            value: Some(request.value),
                            data: Some(request.data.clone()),
                            nonce: request.nonce,
                            ..Default::default()
                        },
                        Epoch::LatestState,
                    )
                    .await?;
                let storage = u64::try_from(estimate.storage_collateralized).map_err(|_| {
                    SdkError::MalformedResponse("storage collateral exceeds u64".to_string())
                })?;
                (estimate.gas_used, storage)
            };
            if request.gas.is_none() {
                request.gas = Some(gas);
            }
            if request.storage_limit.is_none() {
                request.storage_limit = Some(storage);
            }
        }

        match request.resolved_type() {
            TxType::Legacy | TxType::AccessList => {
                if request.gas_price.is_none() {
                    request.gas_price = Some(self.node_gas_price().await?);
                }
            }
            TxType::DynamicFee => {
                if let Some(price) = request.gas_price.take() {
                    if fee_fields_set {
                        return Err(SdkError::InvalidState(
                            "`gasPrice` should not be set with `maxFeePerGas` or `maxPriorityFeePerGas`",
                        ));
                    }
                    request.max_fee_per_gas = Some(price);
                    request.max_priority_fee_per_gas = Some(price);
                } else {
                    let priority = match request.max_priority_fee_per_gas {
                        Some(priority) => priority,
                        None => self.max_priority_fee_per_gas().await?,
                    };
                    request.max_priority_fee_per_gas = Some(priority);
                    if request.max_fee_per_gas.is_none() {
                        let base_fee = match base_fee {
                            Some(fee) => fee,
                            None => self
                                .get_block_by_epoch_number(Epoch::Number(epoch_height))
                                .await?
                                .and_then(|block| block.base_fee_per_gas)
                                .unwrap_or_default(),
                        };
                        request.max_fee_per_gas =
                            Some(priority.saturating_add(base_fee.saturating_mul(U256::from(2))));
                    }
                }
                if request.max_fee_per_gas < request.max_priority_fee_per_gas {
                    return Err(SdkError::InvalidState(
                        "`maxFeePerGas` should not be less than `maxPriorityFeePerGas`",
                    ));
                }
            }
        }
        Ok(())
    }

    async fn node_gas_price(&self) -> Result<U256, SdkError> {
        let price = self.gas_price().await?;
        Ok(if price.is_zero() { U256::one() } else { price })
    }

    // ==================== Call & Estimation ====================

    /// Execute a call (read-only, does not create transaction)
    pub async fn call(&self, request: &CallRequest, epoch: Epoch) -> Result<Bytes, SdkError> {
        let result: String = self
            .request(
                "mazze_call",
                vec![request.to_value(&self.address_coder()), serde_json::to_value(epoch)?],
            )
            .await?;
        parse_hex_bytes(&result)
    }

    /// Estimate gas and storage collateral for a call
    pub async fn estimate_gas_and_collateral(
        &self,
        request: &CallRequest,
        epoch: Epoch,
    ) -> Result<Estimate, SdkError> {
        self.request(
            "mazze_estimateGasAndCollateral",
            vec![request.to_value(&self.address_coder()), serde_json::to_value(epoch)?],
        )
        .await
    }

    // ==================== Logs ====================

    /// Get logs matching a filter
    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, SdkError> {
        let filter = filter.to_value(&self.address_coder())?;
        let logs: Vec<RpcLog> = self.request("mazze_getLogs", vec![filter]).await?;
        Ok(logs.into_iter().map(Log::from).collect())
    }
}

impl std::fmt::Debug for MazzeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MazzeClient")
            .field("network_id", &self.network_id)
            .field("confirmation", &self.confirmation)
            .finish_non_exhaustive()
    }
}

// ==================== Helper Functions ====================

#[cfg(feature = "http")]
fn network_id_from_status(status: &Status) -> Result<u32, SdkError> {
    u32::try_from(status.network_id).map_err(|_| {
        SdkError::MalformedResponse(format!("network id {} too large", status.network_id))
    })
}

/// Risk is a fixed-point fraction of `2^256 - 1`
pub(crate) fn parse_risk(value: &Value) -> Result<Option<f64>, SdkError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => {
            let risk = parse_hex_u256(s)?;
            Ok(Some(u256_to_f64(risk) / u256_to_f64(U256::MAX)))
        }
        other => Err(SdkError::MalformedResponse(format!(
            "unexpected confirmation risk {}",
            other
        ))),
    }
}

fn u256_to_f64(value: U256) -> f64 {
    value
        .0
        .iter()
        .rev()
        .fold(0.0, |acc, limb| acc * 18_446_744_073_709_551_616.0 + *limb as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_risk() {
        assert_eq!(parse_risk(&Value::Null).unwrap(), None);
        assert_eq!(parse_risk(&Value::String("0x0".into())).unwrap(), Some(0.0));

        let max = format!("0x{:x}", U256::MAX);
        assert_eq!(parse_risk(&Value::String(max)).unwrap(), Some(1.0));

        let half = format!("0x{:x}", U256::MAX / 2);
        let risk = parse_risk(&Value::String(half)).unwrap().unwrap();
        assert!((risk - 0.5).abs() < 1e-12);

        assert!(parse_risk(&Value::Bool(true)).is_err());
    }

    #[tokio::test]
    async fn test_mock_client_status() {
        let client = MazzeClient::new_mock();
        let status = client.get_status().await.unwrap();
        assert_eq!(status.network_id, 1);
        assert_eq!(status.epoch_number, 0x100);
        assert_eq!(client.epoch_number(Epoch::LatestState).await.unwrap(), 0x100);
    }
}
