//! # mazze-types
//!
//! Transaction and receipt types for Mazze clients.
//!
//! This crate provides:
//! - [`Transaction`] - the three wire layouts, signing and recovery
//! - [`Receipt`] - execution results as reported by a node
//! - [`Log`] - event log entries

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
pub mod receipt;
pub mod transaction;

pub use error::TxError;
pub use receipt::{Log, Receipt, TxOutcome};
pub use transaction::{
    AccessListItem, AccessListTx, DynamicFeeTx, LegacyTx, Transaction, TransactionBody,
    TxSignature, TxType,
};
