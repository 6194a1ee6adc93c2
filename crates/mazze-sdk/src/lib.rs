//! # mazze-sdk
//!
//! Rust SDK for the Mazze network.
//!
//! ## Features
//!
//! - **ABI**: Solidity ABI type parser, encoder and decoder, function and event coders
//! - **Contract**: Contract helpers from human-readable or JSON ABI, builtin contracts
//! - **MazzeClient**: RPC client and transaction population
//! - **PendingTransaction**: Confirmation tracking from submission to confirmation
//! - **Wallet**: Account management and transaction signing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mazze_sdk::{Drip, MazzeClient, TransactionRequest, Wallet};
//! use mazze_primitives::Address;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MazzeClient::connect("http://localhost:12537").await?;
//!     let wallet = Wallet::from_private_key_hex(
//!         "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef",
//!     )?;
//!
//!     let mut request = TransactionRequest {
//!         to: Some(Address::from_hex("0x1cad0b19bb29d4674531d6f115237e16afce377c")?),
//!         value: Drip::from_mazze("0.5")?.value(),
//!         ..Default::default()
//!     };
//!     client.populate_transaction(&mut request, wallet.address()).await?;
//!
//!     let mut tx = request.into_transaction()?;
//!     wallet.sign_transaction(&mut tx)?;
//!
//!     let mut pending = client.send_transaction(&tx).await?;
//!     let receipt = pending.await_executed().await?;
//!     println!("outcome: {:?}", receipt.outcome);
//!     Ok(())
//! }
//! ```
//!
//! ## Contract Interaction
//!
//! ```rust,no_run
//! use mazze_sdk::{contract, abi::Token, Epoch, MazzeClient};
//! use mazze_primitives::Address;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MazzeClient::new_mock();
//!
//!     let token = contract::erc20(Address::from_hex("0x8cad0b19bb29d4674531d6f115237e16afce377c")?);
//!     let owner = Address::from_hex("0x1cad0b19bb29d4674531d6f115237e16afce377c")?;
//!     let balance = token
//!         .method("balanceOf")?
//!         .call(&client, &[Token::Address(owner)], Epoch::LatestState)
//!         .await?;
//!     println!("Balance: {:?}", balance);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
mod client;
mod config;
pub mod contract;
mod drip;
mod error;
mod pending;
mod serde_hex;
mod subscription;
mod transport;
pub mod types;
mod wallet;

// Re-export main types
pub use client::MazzeClient;
pub use config::{ClientConfig, ConfirmationConfig, DEFAULT_RPC_URL};
pub use drip::Drip;
pub use error::SdkError;
pub use pending::{CancelHandle, Checkpoint, PendingTransaction, RevertSignal};
pub use subscription::{parse_notification, LogNotification, LogSubscription, RevertNotification};
pub use transport::{deserialize_response, MockTransport};
pub use types::{CallRequest, Epoch, LogFilter, TransactionRequest};
pub use wallet::Wallet;

/// Re-export Transport trait for custom implementations
pub use transport::Transport;

#[cfg(feature = "http")]
pub use transport::HttpTransport;

// Re-export primitives for convenience
pub use mazze_primitives::{Address, H256, U256};
pub use mazze_types::{Log, Receipt, Transaction, TxOutcome, TxType};
