//! Client and confirmation settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default node endpoint
pub const DEFAULT_RPC_URL: &str = "http://localhost:12537";

/// Polling and threshold settings for [`PendingTransaction`](crate::PendingTransaction)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Delay between polls
    #[serde(with = "millis")]
    pub poll_interval: Duration,
    /// Deadline for each await call
    #[serde(with = "millis")]
    pub timeout: Duration,
    /// Revert risk below which a block counts as confirmed
    pub risk_threshold: f64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(5 * 60),
            risk_threshold: 1e-8,
        }
    }
}

/// Connection settings for [`MazzeClient`](crate::MazzeClient)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// JSON-RPC endpoint
    pub url: String,
    /// Network id for address text; fetched from the node when unset
    pub network_id: Option<u32>,
    /// Confirmation tracking
    pub confirmation: ConfirmationConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            network_id: None,
            confirmation: ConfirmationConfig::default(),
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
