//! Transaction commands

use clap::{Args, Subcommand, ValueEnum};
use mazze_primitives::{Address, H256};
use mazze_sdk::{
    abi::AddressCoder, Drip, MazzeClient, PendingTransaction, Receipt, Transaction,
    TransactionRequest, TxType, Wallet,
};
use tracing::info;

use super::offline_network_id;
use crate::{
    args::{parse_hex, parse_u256},
    config::Config,
    output::Output,
    CliError,
};

/// Transaction subcommands
#[derive(Debug, Subcommand)]
pub enum TxCommand {
    /// Sign a transaction offline; unset fields are read from the node with --populate
    Sign {
        #[command(flatten)]
        fields: TxFields,
        /// Fill missing fields from the node
        #[arg(long)]
        populate: bool,
    },
    /// Decode a raw signed transaction
    Decode {
        /// Raw transaction (hex)
        raw: String,
    },
    /// Populate, sign, send and track a transaction
    Send {
        #[command(flatten)]
        fields: TxFields,
        /// Checkpoint to wait for
        #[arg(long, value_enum, default_value = "executed")]
        wait: WaitFor,
    },
}

/// Transaction fields shared by `sign` and `send`
#[derive(Debug, Args)]
pub struct TxFields {
    /// Private key (hex)
    #[arg(short, long)]
    pub key: String,
    /// Recipient, hex or base32; omit to create a contract
    #[arg(short, long)]
    pub to: Option<String>,
    /// Amount in MAZZE
    #[arg(short, long, default_value = "0")]
    pub value: String,
    /// Call data or init code (hex)
    #[arg(short, long)]
    pub data: Option<String>,
    /// Nonce
    #[arg(long)]
    pub nonce: Option<String>,
    /// Gas price in drip
    #[arg(long)]
    pub gas_price: Option<String>,
    /// Max fee per gas in drip
    #[arg(long)]
    pub max_fee_per_gas: Option<String>,
    /// Max priority fee per gas in drip
    #[arg(long)]
    pub max_priority_fee_per_gas: Option<String>,
    /// Gas limit
    #[arg(long)]
    pub gas: Option<String>,
    /// Storage limit in bytes
    #[arg(long)]
    pub storage_limit: Option<u64>,
    /// Epoch height
    #[arg(long)]
    pub epoch_height: Option<u64>,
    /// Chain id
    #[arg(long)]
    pub chain_id: Option<u32>,
    /// Transaction layout; inferred from the fee fields when omitted
    #[arg(long = "type", value_enum)]
    pub tx_type: Option<Layout>,
}

/// Transaction layout names
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    /// Untyped transaction
    Legacy,
    /// Type 1
    AccessList,
    /// Type 2
    DynamicFee,
}

impl From<Layout> for TxType {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Legacy => TxType::Legacy,
            Layout::AccessList => TxType::AccessList,
            Layout::DynamicFee => TxType::DynamicFee,
        }
    }
}

/// Checkpoint names accepted by `--wait`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WaitFor {
    /// Return right after submission
    Submitted,
    /// Included in a block
    Packed,
    /// Block executed, receipt available
    Mined,
    /// Receipt carries an outcome
    Executed,
    /// Revert risk below threshold
    Confirmed,
}

impl TxCommand {
    pub async fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        match self {
            TxCommand::Sign { fields, populate } => {
                let client = if populate {
                    Some(super::connect(config).await?)
                } else {
                    None
                };
                let network_id = match &client {
                    Some(client) => client.network_id().unwrap_or(offline_network_id(config)),
                    None => offline_network_id(config),
                };
                sign(&fields, client.as_ref(), network_id, json).await?.print();
            }
            TxCommand::Decode { raw } => decode(&raw, offline_network_id(config), json)?.print(),
            TxCommand::Send { fields, wait } => {
                let client = super::connect(config).await?;
                send(&client, &fields, wait, json).await?.print();
            }
        }
        Ok(())
    }
}

impl TxFields {
    fn wallet(&self) -> Result<Wallet, CliError> {
        Wallet::from_private_key_hex(&self.key).map_err(|e| CliError::InvalidKey(e.to_string()))
    }

    /// Request with every field given on the command line
    fn request(&self, coder: &AddressCoder) -> Result<TransactionRequest, CliError> {
        let to = self
            .to
            .as_deref()
            .map(|text| coder.parse(text))
            .transpose()
            .map_err(|e| CliError::InvalidAddress(e.to_string()))?;
        let opt_u256 = |text: &Option<String>| text.as_deref().map(parse_u256).transpose();

        Ok(TransactionRequest {
            tx_type: self.tx_type.map(TxType::from),
            to,
            nonce: opt_u256(&self.nonce)?,
            gas_price: opt_u256(&self.gas_price)?,
            max_fee_per_gas: opt_u256(&self.max_fee_per_gas)?,
            max_priority_fee_per_gas: opt_u256(&self.max_priority_fee_per_gas)?,
            gas: opt_u256(&self.gas)?,
            storage_limit: self.storage_limit,
            epoch_height: self.epoch_height,
            chain_id: self.chain_id,
            value: Drip::from_mazze(&self.value)?.value(),
            data: match &self.data {
                Some(data) => parse_hex(data)?.into(),
                None => Default::default(),
            },
            access_list: match self.tx_type {
                Some(Layout::AccessList) | Some(Layout::DynamicFee) => Some(Vec::new()),
                _ => None,
            },
            ..Default::default()
        })
    }
}

/// Build and sign a transaction, filling gaps from `client` when given
async fn build_signed(
    fields: &TxFields,
    client: Option<&MazzeClient>,
    coder: &AddressCoder,
) -> Result<(Wallet, Transaction, H256), CliError> {
    let wallet = fields.wallet()?;
    let mut request = fields.request(coder)?;
    if let Some(client) = client {
        client.populate_transaction(&mut request, wallet.address()).await?;
    }
    let mut tx = request.into_transaction()?;
    let hash = wallet.sign_transaction(&mut tx)?;
    Ok((wallet, tx, hash))
}

async fn sign(
    fields: &TxFields,
    client: Option<&MazzeClient>,
    network_id: u32,
    json: bool,
) -> Result<Output, CliError> {
    let coder = AddressCoder::new(Some(network_id));
    let (wallet, tx, hash) = build_signed(fields, client, &coder).await?;

    Ok(Output::new(json)
        .field("from", coder.format(wallet.address()))
        .field("hash", hash.to_hex())
        .field("raw", format!("0x{}", hex::encode(tx.serialize()))))
}

fn decode(raw: &str, network_id: u32, json: bool) -> Result<Output, CliError> {
    let tx = Transaction::decode_raw(&parse_hex(raw)?).map_err(mazze_sdk::SdkError::from)?;
    let coder = AddressCoder::new(Some(network_id));
    let show = |address: &Address| coder.format(address);

    let mut out = Output::new(json)
        .field("type", format!("{:?}", tx.tx_type()))
        .field("hash", tx.hash().to_hex())
        .field_opt("from", tx.sender().as_ref().map(show))
        .field_opt("to", tx.to().map(show))
        .field("nonce", tx.nonce())
        .field("value", tx.value())
        .field("gas", tx.gas());
    out = match tx.gas_price() {
        Some(price) => out.field("gas_price", price),
        None => out,
    };
    if let mazze_types::TransactionBody::DynamicFee(body) = &tx.body {
        out = out
            .field("max_fee_per_gas", body.max_fee_per_gas)
            .field("max_priority_fee_per_gas", body.max_priority_fee_per_gas);
    }
    Ok(out
        .field_u64("storage_limit", tx.storage_limit())
        .field_u64("epoch_height", tx.epoch_height())
        .field_u64("chain_id", tx.chain_id() as u64)
        .field("data", format!("0x{}", hex::encode(tx.data()))))
}

async fn send(
    client: &MazzeClient,
    fields: &TxFields,
    wait: WaitFor,
    json: bool,
) -> Result<Output, CliError> {
    let coder = client.address_coder();
    let (wallet, tx, _) = build_signed(fields, Some(client), &coder).await?;
    let mut pending = client.send_transaction(&tx).await?;
    info!(hash = %pending.hash(), from = %wallet.address(), "transaction submitted");

    let receipt = track(&mut pending, wait).await?;
    let out = Output::new(json)
        .field("hash", pending.hash().to_hex())
        .field("checkpoint", format!("{:?}", pending.checkpoint()))
        .field_opt("block_hash", pending.block_hash().map(|h| h.to_hex()))
        .field_opt("epoch", pending.epoch());
    Ok(match receipt {
        Some(receipt) => receipt_fields(out, &receipt, &coder),
        None => out,
    })
}

async fn track(
    pending: &mut PendingTransaction,
    wait: WaitFor,
) -> Result<Option<Receipt>, CliError> {
    let receipt = match wait {
        WaitFor::Submitted => None,
        WaitFor::Packed => {
            pending.await_packed().await?;
            None
        }
        WaitFor::Mined => {
            pending.await_mined().await?;
            None
        }
        WaitFor::Executed => Some(pending.await_executed().await?),
        WaitFor::Confirmed => Some(pending.await_confirmed().await?),
    };
    Ok(receipt)
}

fn receipt_fields(out: Output, receipt: &Receipt, coder: &AddressCoder) -> Output {
    out.field("outcome", format!("{:?}", receipt.outcome))
        .field("gas_used", receipt.gas_used)
        .field("gas_fee", receipt.gas_fee)
        .field("storage_collateralized", receipt.storage_collateralized)
        .field_opt(
            "contract_created",
            receipt.contract_created.as_ref().map(|a| coder.format(a)),
        )
        .field_opt("error", receipt.tx_exec_error_msg.clone())
        .field_u64("logs", receipt.logs.len() as u64)
}
