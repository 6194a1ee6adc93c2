//! # mazze-cli
//!
//! Command-line interface for Mazze client tooling.
//!
//! ## Usage
//!
//! ```bash
//! # Keys and addresses
//! mazze address 0x0123...
//!
//! # ABI
//! mazze abi encode "transfer(address,uint256)" mazzetest:aasm4c... 1000
//! mazze abi decode "address,uint256" 0x...
//!
//! # Transactions
//! mazze tx sign --key 0x... --to 0x... --nonce 0 --gas-price 1 --gas 21000 \
//!     --storage-limit 0 --epoch-height 0 --chain-id 1
//! mazze tx decode 0xf866...
//! mazze tx send --key 0x... --to mazzetest:... --value 0.5 --wait confirmed
//!
//! # Block confirmation risk
//! mazze risk 0x...
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod args;
mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// Mazze CLI
#[derive(Parser, Debug)]
#[command(name = "mazze")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// RPC endpoint URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Network id for base32 addresses
    #[arg(long, global = true)]
    network_id: Option<u32>,

    /// Log filter, used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Derive the address of a private key
    Address {
        /// Private key (hex)
        key: String,
    },
    /// ABI encoding and decoding
    #[command(subcommand)]
    Abi(commands::abi::AbiCommand),
    /// Sign, decode and send transactions
    #[command(subcommand)]
    Tx(commands::tx::TxCommand),
    /// Query the confirmation risk of a block
    Risk {
        /// Block hash
        block_hash: String,
    },
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set RPC URL
        #[arg(long)]
        set_rpc: Option<String>,
        /// Set network id
        #[arg(long)]
        set_network_id: Option<u32>,
    },
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    let result = run(cli.command, cli.rpc_url, cli.network_id, cli.json).await;

    if let Err(e) = result {
        if cli.json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    rpc_url: Option<String>,
    network_id: Option<u32>,
    json: bool,
) -> Result<(), CliError> {
    let stored = Config::load()?;
    let mut config = stored.clone();
    if let Some(rpc_url) = rpc_url {
        config.rpc_url = rpc_url;
    }
    if network_id.is_some() {
        config.network_id = network_id;
    }

    match command {
        Commands::Address { key } => commands::address::execute(&config, &key, json),
        Commands::Abi(cmd) => cmd.execute(&config, json),
        Commands::Tx(cmd) => cmd.execute(&config, json).await,
        Commands::Risk { block_hash } => commands::risk::execute(&config, &block_hash, json).await,
        Commands::Config {
            show,
            set_rpc,
            set_network_id,
        } => handle_config(stored, &config, show, set_rpc, set_network_id, json),
    }
}

/// Persist `--set-*` changes onto the stored file, or print the effective config
fn handle_config(
    mut stored: Config,
    effective: &Config,
    show: bool,
    set_rpc: Option<String>,
    set_network_id: Option<u32>,
    json: bool,
) -> Result<(), CliError> {
    let mut modified = false;

    if let Some(rpc) = set_rpc {
        stored.rpc_url = rpc;
        modified = true;
    }

    if let Some(network_id) = set_network_id {
        stored.network_id = Some(network_id);
        modified = true;
    }

    if modified {
        let path = stored.save()?;
        Output::new(json)
            .field("status", "saved")
            .field("path", path.display())
            .message("Configuration saved")
            .print();
    } else if show {
        let confirmation = &effective.confirmation;
        Output::new(json)
            .field("rpc_url", &effective.rpc_url)
            .field_opt("network_id", effective.network_id)
            .field_u64("poll_interval_ms", confirmation.poll_interval.as_millis() as u64)
            .field_u64("timeout_ms", confirmation.timeout.as_millis() as u64)
            .field_value("risk_threshold", serde_json::json!(confirmation.risk_threshold))
            .print();
    } else {
        Output::new(json)
            .message("Use --show to display config, or --set-rpc/--set-network-id to modify")
            .print();
    }

    Ok(())
}
