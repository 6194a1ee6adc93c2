//! Confirmation risk query

use mazze_primitives::H256;
use mazze_sdk::MazzeClient;

use crate::{config::Config, output::Output, CliError};

/// Print the confirmation risk of a block
pub async fn execute(config: &Config, block_hash: &str, json: bool) -> Result<(), CliError> {
    let client = super::connect(config).await?;
    query(&client, block_hash, json).await?.print();
    Ok(())
}

async fn query(client: &MazzeClient, block_hash: &str, json: bool) -> Result<Output, CliError> {
    let hash = H256::from_hex(block_hash).map_err(|e| CliError::InvalidHex(e.to_string()))?;
    let risk = client.get_confirmation_risk_by_hash(&hash).await?;

    let out = Output::new(json).field("block_hash", hash.to_hex());
    Ok(match risk {
        Some(risk) => out.field_value("risk", serde_json::json!(risk)),
        None => out.field_opt("risk", None::<String>).message("Block not found"),
    })
}
