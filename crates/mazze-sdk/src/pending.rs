//! Confirmation tracking for submitted transactions
//!
//! A [`PendingTransaction`] walks a transaction through
//! `Submitted -> Packed -> Mined -> Executed -> Confirmed` by polling the node.
//! Each `await_*` call runs whatever earlier checkpoints are still missing and
//! has its own deadline taken from [`ConfirmationConfig::timeout`].
//!
//! - A timeout leaves the state at the last reached checkpoint; waiting again is fine.
//! - Cancellation and non-transient errors move the state to [`Checkpoint::Failed`].
//! - Transient RPC errors are retried until the deadline.

use std::future::Future;
use std::sync::Arc;

use mazze_primitives::H256;
use mazze_types::Receipt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::client::parse_risk;
use crate::config::ConfirmationConfig;
use crate::subscription::LogNotification;
use crate::transport::{deserialize_response, Transport};
use crate::types::{RpcReceipt, RpcTransaction};
use crate::SdkError;

/// Tracking progress, in the order checkpoints are reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Checkpoint {
    /// Accepted by the node's pool
    Submitted,
    /// Included in a block
    Packed,
    /// Receipt available
    Mined,
    /// Execution outcome known
    Executed,
    /// Revert risk below threshold
    Confirmed,
    /// Tracking stopped
    Failed,
}

impl Checkpoint {
    /// Whether no further progress is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Checkpoint::Confirmed | Checkpoint::Failed)
    }
}

/// Emitted when the chain reverts past the epoch a transaction was mined in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevertSignal {
    /// Transaction hash
    pub hash: H256,
    /// Epoch recorded when the transaction was mined
    pub epoch: u64,
    /// First invalidated epoch
    pub revert_to: u64,
}

/// Cancels every wait on one [`PendingTransaction`]
#[derive(Debug, Clone)]
pub struct CancelHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Abort current and future waits
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

/// A submitted transaction being tracked towards confirmation
pub struct PendingTransaction {
    hash: H256,
    transport: Arc<dyn Transport>,
    config: ConfirmationConfig,
    state: Checkpoint,
    block_hash: Option<H256>,
    epoch: Option<u64>,
    failure: Option<String>,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
}

impl PendingTransaction {
    /// Track `hash` through `transport`
    pub fn new(hash: H256, transport: Arc<dyn Transport>, config: ConfirmationConfig) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        Self {
            hash,
            transport,
            config,
            state: Checkpoint::Submitted,
            block_hash: None,
            epoch: None,
            failure: None,
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
        }
    }

    /// Transaction hash
    pub fn hash(&self) -> H256 {
        self.hash
    }

    /// Last checkpoint reached
    pub fn checkpoint(&self) -> Checkpoint {
        self.state
    }

    /// Containing block, once packed
    pub fn block_hash(&self) -> Option<H256> {
        self.block_hash
    }

    /// Executing epoch, once mined
    pub fn epoch(&self) -> Option<u64> {
        self.epoch
    }

    /// Settings in use
    pub fn config(&self) -> &ConfirmationConfig {
        &self.config
    }

    /// Handle that cancels waits from another task
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            sender: self.cancel_tx.clone(),
        }
    }

    /// Cancel all waits
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    /// Wait until the transaction is in a block
    pub async fn await_packed(&mut self) -> Result<RpcTransaction, SdkError> {
        let (started, deadline) = self.window();
        let result = self.packed(started, deadline).await;
        self.settle(result)
    }

    /// Wait until the receipt is available
    pub async fn await_mined(&mut self) -> Result<RpcReceipt, SdkError> {
        let (started, deadline) = self.window();
        let result = self.mined(started, deadline).await;
        self.settle(result)
    }

    /// Wait until the execution outcome is known
    ///
    /// A failed or skipped outcome is returned in the receipt, not as an error.
    pub async fn await_executed(&mut self) -> Result<Receipt, SdkError> {
        let (started, deadline) = self.window();
        let result = self.executed(started, deadline).await;
        self.settle(result)
    }

    /// Wait until the containing block's revert risk drops below the threshold
    pub async fn await_confirmed(&mut self) -> Result<Receipt, SdkError> {
        let (started, deadline) = self.window();
        let result = self.confirmed(started, deadline).await;
        self.settle(result)
    }

    /// Wait for a revert notification that invalidates the mined epoch
    ///
    /// Notifications reverting to a later epoch than the one recorded at
    /// `Mined` are skipped. Requires the `Mined` checkpoint.
    pub async fn next_revert(
        &mut self,
        notifications: &mut broadcast::Receiver<LogNotification>,
    ) -> Result<RevertSignal, SdkError> {
        self.ensure_live()?;
        let epoch = match self.epoch {
            Some(epoch) if self.state >= Checkpoint::Mined => epoch,
            _ => return Err(SdkError::InvalidState("transaction has not been mined")),
        };

        let mut cancel = self.cancel_rx.clone();
        loop {
            if *cancel.borrow() {
                return self.settle(Err(SdkError::Cancelled));
            }

            tokio::select! {
                received = notifications.recv() => match received {
                    Ok(LogNotification::Revert(revert)) if revert.revert_to <= epoch => {
                        warn!(hash = %self.hash.to_hex(), epoch, revert_to = revert.revert_to, "mined epoch reverted");
                        return Ok(RevertSignal {
                            hash: self.hash,
                            epoch,
                            revert_to: revert.revert_to,
                        });
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "revert listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(SdkError::Transport("notification channel closed".to_string()));
                    }
                },
                _ = cancel.changed() => {}
            }
        }
    }

    // ==================== Checkpoints ====================

    async fn packed(&mut self, started: Instant, deadline: Instant) -> Result<RpcTransaction, SdkError> {
        self.ensure_live()?;
        let transport = self.transport.clone();
        let hash = self.hash;
        let tx = self
            .poll(Checkpoint::Packed, started, deadline, move || {
                let transport = transport.clone();
                async move {
                    let tx: Option<RpcTransaction> =
                        fetch(transport.as_ref(), "mazze_getTransactionByHash", &hash).await?;
                    Ok(tx.filter(|tx| tx.block_hash.is_some()))
                }
            })
            .await?;

        self.block_hash = tx.block_hash;
        self.advance(Checkpoint::Packed);
        Ok(tx)
    }

    async fn mined(&mut self, started: Instant, deadline: Instant) -> Result<RpcReceipt, SdkError> {
        if self.state < Checkpoint::Packed {
            self.packed(started, deadline).await?;
        }
        self.ensure_live()?;
        let receipt = self
            .poll(Checkpoint::Mined, started, deadline, self.receipt_probe(false))
            .await?;

        self.block_hash = Some(receipt.block_hash);
        self.epoch = Some(receipt.epoch_number);
        self.advance(Checkpoint::Mined);
        Ok(receipt)
    }

    async fn executed(&mut self, started: Instant, deadline: Instant) -> Result<Receipt, SdkError> {
        let mut receipt = self.mined(started, deadline).await?;
        if receipt.outcome_status.is_none() {
            receipt = self
                .poll(Checkpoint::Executed, started, deadline, self.receipt_probe(true))
                .await?;
        }

        let receipt = Receipt::try_from(receipt)?;
        self.epoch = Some(receipt.epoch_number);
        self.advance(Checkpoint::Executed);
        Ok(receipt)
    }

    async fn confirmed(&mut self, started: Instant, deadline: Instant) -> Result<Receipt, SdkError> {
        let receipt = self.executed(started, deadline).await?;
        let transport = self.transport.clone();
        let block_hash = receipt.block_hash;
        let threshold = self.config.risk_threshold;
        self.poll(Checkpoint::Confirmed, started, deadline, move || {
            let transport = transport.clone();
            async move {
                let value = transport
                    .request_json(
                        "mazze_getConfirmationRiskByHash",
                        vec![Value::String(block_hash.to_hex())],
                    )
                    .await?;
                // null: block too old to be tracked, i.e. past any revert window
                let risk = parse_risk(&value)?.unwrap_or(0.0);
                debug!(block = %block_hash.to_hex(), risk, "confirmation risk");
                Ok((risk < threshold).then_some(()))
            }
        })
        .await?;

        self.advance(Checkpoint::Confirmed);
        Ok(receipt)
    }

    // ==================== Polling ====================

    fn window(&self) -> (Instant, Instant) {
        let started = Instant::now();
        (started, started + self.config.timeout)
    }

    fn receipt_probe(
        &self,
        require_outcome: bool,
    ) -> impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = Result<Option<RpcReceipt>, SdkError>> + Send>>
    {
        let transport = self.transport.clone();
        let hash = self.hash;
        move || {
            let transport = transport.clone();
            Box::pin(async move {
                let receipt: Option<RpcReceipt> =
                    fetch(transport.as_ref(), "mazze_getTransactionReceipt", &hash).await?;
                Ok(receipt.filter(|r| !require_outcome || r.outcome_status.is_some()))
            })
        }
    }

    /// Run `probe` every poll interval until it yields a value
    async fn poll<T, F, Fut>(
        &self,
        checkpoint: Checkpoint,
        started: Instant,
        deadline: Instant,
        mut probe: F,
    ) -> Result<T, SdkError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, SdkError>>,
    {
        let mut cancel = self.cancel_rx.clone();
        let mut attempt: u32 = 0;

        loop {
            if *cancel.borrow() {
                return Err(SdkError::Cancelled);
            }

            attempt += 1;
            match probe().await {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {
                    debug!(hash = %self.hash.to_hex(), ?checkpoint, attempt, "checkpoint not reached");
                }
                Err(e) if e.is_transient() => {
                    warn!(hash = %self.hash.to_hex(), ?checkpoint, attempt, error = %e, "retrying after rpc error");
                }
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(SdkError::ConfirmationTimeout {
                    checkpoint,
                    elapsed: now - started,
                });
            }

            let wait = self.config.poll_interval.min(deadline - now);
            tokio::select! {
                _ = sleep(wait) => {}
                _ = cancel.changed() => {}
            }
        }
    }

    // ==================== State ====================

    fn advance(&mut self, checkpoint: Checkpoint) {
        if checkpoint > self.state {
            info!(hash = %self.hash.to_hex(), ?checkpoint, "checkpoint reached");
            self.state = checkpoint;
        }
    }

    fn ensure_live(&self) -> Result<(), SdkError> {
        if self.state != Checkpoint::Failed {
            return Ok(());
        }
        if *self.cancel_rx.borrow() {
            return Err(SdkError::Cancelled);
        }
        Err(SdkError::Failed(
            self.failure.clone().unwrap_or_else(|| "unknown error".to_string()),
        ))
    }

    fn settle<T>(&mut self, result: Result<T, SdkError>) -> Result<T, SdkError> {
        match &result {
            Err(SdkError::ConfirmationTimeout { checkpoint, elapsed }) => {
                warn!(hash = %self.hash.to_hex(), ?checkpoint, ?elapsed, "confirmation timed out");
            }
            Err(SdkError::Failed(_)) | Ok(_) => {}
            Err(e) => {
                if self.state != Checkpoint::Failed {
                    warn!(hash = %self.hash.to_hex(), error = %e, "tracking failed");
                    self.failure = Some(e.to_string());
                    self.state = Checkpoint::Failed;
                }
            }
        }
        result
    }
}

impl std::fmt::Debug for PendingTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("hash", &self.hash)
            .field("state", &self.state)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

/// `null` results map to `None`
async fn fetch<T: DeserializeOwned>(
    transport: &dyn Transport,
    method: &str,
    hash: &H256,
) -> Result<Option<T>, SdkError> {
    let value = transport
        .request_json(method, vec![Value::String(hash.to_hex())])
        .await?;
    if value.is_null() {
        return Ok(None);
    }
    deserialize_response(value).map(Some)
}
