//! Log and revert notifications from a node subscription
//!
//! The node pushes `mazze_subscription` messages for a `logs` subscription.
//! Each message carries either a log or a `{ "revertTo": epoch }` marker.
//! [`LogSubscription`] parses those payloads and fans them out over a
//! `broadcast` channel so several pending transactions can watch for reverts.

use mazze_types::Log;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::serde_hex::de_u64;
use crate::transport::deserialize_response;
use crate::types::RpcLog;
use crate::SdkError;

/// Chain reorganisation marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertNotification {
    /// Logs from this epoch onwards are invalid
    #[serde(deserialize_with = "de_u64")]
    pub revert_to: u64,
}

/// One subscription payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogNotification {
    /// New log
    Log(Log),
    /// Reorganisation back to an epoch
    Revert(RevertNotification),
}

/// Parse a subscription payload, with or without the `mazze_subscription` envelope
pub fn parse_notification(message: &Value) -> Result<LogNotification, SdkError> {
    let payload = match message.get("params").and_then(|p| p.get("result")) {
        Some(result) => result,
        None => message,
    };

    if payload.get("revertTo").is_some() {
        let revert: RevertNotification = deserialize_response(payload.clone())?;
        return Ok(LogNotification::Revert(revert));
    }

    let log: RpcLog = deserialize_response(payload.clone())?;
    Ok(LogNotification::Log(log.into()))
}

/// Fan-out point for subscription payloads
#[derive(Debug, Clone)]
pub struct LogSubscription {
    sender: broadcast::Sender<LogNotification>,
}

impl LogSubscription {
    /// Create a subscription buffering up to `capacity` notifications per receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// New receiver for notifications published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LogNotification> {
        self.sender.subscribe()
    }

    /// Parse and publish one raw message
    pub fn handle_message(&self, message: &Value) -> Result<LogNotification, SdkError> {
        let notification = parse_notification(message)?;
        if self.sender.send(notification.clone()).is_err() {
            debug!("notification dropped, no receivers");
        }
        Ok(notification)
    }

    /// Publish every message from `messages` until the channel closes
    pub fn forward(&self, mut messages: mpsc::Receiver<Value>) -> JoinHandle<()> {
        let subscription = self.clone();
        tokio::spawn(async move {
            while let Some(message) = messages.recv().await {
                if let Err(e) = subscription.handle_message(&message) {
                    warn!(error = %e, "unparseable subscription message");
                }
            }
            debug!("subscription source closed");
        })
    }
}

impl Default for LogSubscription {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_revert_envelope() {
        let message = json!({
            "jsonrpc": "2.0",
            "method": "mazze_subscription",
            "params": {"subscription": "0x1", "result": {"revertTo": "0x2a"}}
        });
        assert_eq!(
            parse_notification(&message).unwrap(),
            LogNotification::Revert(RevertNotification { revert_to: 42 })
        );
    }

    #[test]
    fn test_parse_log() {
        let message = json!({
            "address": "0x8cad0b19bb29d4674531d6f115237e16afce377c",
            "topics": ["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
            "data": "0x01",
            "epochNumber": "0x10"
        });
        let LogNotification::Log(log) = parse_notification(&message).unwrap() else {
            panic!("expected log");
        };
        assert_eq!(log.epoch_number, Some(16));
        assert_eq!(log.data.as_ref(), &[0x01]);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_notification(&json!({"revertTo": "zz"})).is_err());
        assert!(parse_notification(&json!("nope")).is_err());
    }

    #[tokio::test]
    async fn test_forward_publishes() {
        let subscription = LogSubscription::new(8);
        let mut receiver = subscription.subscribe();
        let (tx, rx) = mpsc::channel(8);
        let task = subscription.forward(rx);

        tx.send(json!({"bad": true, "topics": 5})).await.unwrap();
        tx.send(json!({"revertTo": "0x5"})).await.unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(
            receiver.recv().await.unwrap(),
            LogNotification::Revert(RevertNotification { revert_to: 5 })
        );
    }
}
