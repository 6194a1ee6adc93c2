//! Address derivation

use mazze_crypto::public_key_to_bytes;
use mazze_sdk::Wallet;

use super::offline_network_id;
use crate::{config::Config, output::Output, CliError};

/// Derive the address of a private key
pub fn execute(config: &Config, key: &str, json: bool) -> Result<(), CliError> {
    render(config, key, json)?.print();
    Ok(())
}

fn render(config: &Config, key: &str, json: bool) -> Result<Output, CliError> {
    let wallet =
        Wallet::from_private_key_hex(key).map_err(|e| CliError::InvalidKey(e.to_string()))?;
    let network_id = offline_network_id(config);

    Ok(Output::new(json)
        .field("address", wallet.address().to_hex())
        .field("base32", wallet.base32_address(network_id))
        .field_u64("network_id", network_id as u64)
        .field(
            "public_key",
            format!("0x{}", hex::encode(public_key_to_bytes(wallet.public_key()))),
        ))
}
