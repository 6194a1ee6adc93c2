//! CLI subcommands

pub mod abi;
pub mod address;
pub mod risk;
pub mod tx;

use mazze_sdk::MazzeClient;

use crate::{config::Config, CliError};

/// Network id used when neither flag nor config names one
pub const DEFAULT_NETWORK_ID: u32 = mazze_primitives::TESTNET_ID;

/// Connect to the configured endpoint
pub async fn connect(config: &Config) -> Result<MazzeClient, CliError> {
    Ok(MazzeClient::from_config(&config.client_config()).await?)
}

/// Network id for offline commands
pub fn offline_network_id(config: &Config) -> u32 {
    config.network_id.unwrap_or(DEFAULT_NETWORK_ID)
}
