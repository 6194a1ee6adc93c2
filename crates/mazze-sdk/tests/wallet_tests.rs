//! Wallet signing tests against fixed vectors

use mazze_primitives::{MAINNET_ID, TESTNET_ID};
use mazze_sdk::{Address, Transaction, TransactionRequest, TxType, Wallet, U256};

const TEST_KEY: &str = "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
const SENDER: &str = "0x1cad0b19bb29d4674531d6f115237e16afce377c";
const LEGACY_RAW: &str = "f86680018252089401234567890123456789012345678901234567898080808207c680820fafa0b3dbe68f41de2dc6145ad7f8b42e2881d920a26e099f83ef5cf41f675c2a8975a06bfd035046277cb3f323b06003e5501547b0a6efc07ec58e5b48658bd41c3e2b";

fn wallet() -> Wallet {
    Wallet::from_private_key_hex(TEST_KEY).unwrap()
}

fn legacy_request() -> TransactionRequest {
    TransactionRequest {
        to: Some(Address::from_hex("0x0123456789012345678901234567890123456789").unwrap()),
        nonce: Some(U256::zero()),
        gas_price: Some(U256::one()),
        gas: Some(U256::from(21000)),
        storage_limit: Some(0),
        epoch_height: Some(0),
        chain_id: Some(1990),
        ..Default::default()
    }
}

// ==================== Addresses ====================

#[test]
fn test_base32_addresses() {
    let wallet = wallet();
    assert_eq!(wallet.address().to_hex(), SENDER);
    assert_eq!(
        wallet.base32_address(TESTNET_ID),
        "mazzetest:aasm4c231py7j34fghntcfkdt2nm9xv1tum0f0a8zw"
    );
    assert_eq!(
        wallet.base32_address(MAINNET_ID),
        "mazze:aasm4c231py7j34fghntcfkdt2nm9xv1tu4513y52z"
    );
    assert_eq!(
        wallet.base32_address(1990),
        "net1990:aasm4c231py7j34fghntcfkdt2nm9xv1tuekv0su6j"
    );
}

// ==================== Transactions ====================

#[test]
fn test_sign_legacy_fixture() {
    let mut tx = legacy_request().into_transaction().unwrap();
    let hash = wallet().sign_transaction(&mut tx).unwrap();

    assert_eq!(hex::encode(tx.serialize()), LEGACY_RAW);
    assert_eq!(
        hash.to_hex(),
        "0x01943fcd450ed105d46d75386799e5f416b4dfcef90f77db36f67c8c9d190b8e"
    );
}

#[test]
fn test_signing_is_deterministic() {
    let wallet = wallet();
    let mut a = legacy_request().into_transaction().unwrap();
    let mut b = legacy_request().into_transaction().unwrap();
    wallet.sign_transaction(&mut a).unwrap();
    wallet.sign_transaction(&mut b).unwrap();
    assert_eq!(a.signature, b.signature);
}

#[test]
fn test_sign_then_recover_each_layout() {
    let wallet = wallet();
    for request in [
        legacy_request(),
        TransactionRequest {
            access_list: Some(Vec::new()),
            ..legacy_request()
        },
        TransactionRequest {
            gas_price: None,
            max_fee_per_gas: Some(U256::from(100)),
            max_priority_fee_per_gas: Some(U256::from(2)),
            ..legacy_request()
        },
    ] {
        let expected = request.resolved_type();
        let mut tx = request.into_transaction().unwrap();
        wallet.sign_transaction(&mut tx).unwrap();

        let decoded = Transaction::decode_raw(&tx.serialize()).unwrap();
        assert_eq!(decoded.tx_type(), expected);
        assert_eq!(decoded.sender(), Some(*wallet.address()));
        assert!(decoded.verify().unwrap());
    }
}

#[test]
fn test_contract_creation_has_no_recipient() {
    let mut tx = TransactionRequest {
        to: None,
        data: vec![0x60, 0x80, 0x60, 0x40].into(),
        ..legacy_request()
    }
    .into_transaction()
    .unwrap();
    wallet().sign_transaction(&mut tx).unwrap();

    let decoded = Transaction::decode_raw(&tx.serialize()).unwrap();
    assert_eq!(decoded.tx_type(), TxType::Legacy);
    assert!(decoded.to().is_none());
    assert!(decoded.is_contract_creation());
}

// ==================== Messages ====================

#[test]
fn test_sign_message_recovers_signer() {
    let wallet = wallet();
    let message = wallet.sign_message("Hello World").unwrap();
    assert_eq!(message.message(), "Hello World");
    assert_eq!(message.from(), Some(*wallet.address()));

    let signature = message.signature().unwrap();
    assert_eq!(signature.to_hex().len(), 2 + 65 * 2);
    assert!(signature.v <= 1);
}
