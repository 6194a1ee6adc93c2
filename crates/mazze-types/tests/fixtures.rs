//! Byte-exact wire fixtures for the three transaction layouts

use bytes::Bytes;
use mazze_crypto::{private_key_from_bytes, PrivateKey};
use mazze_primitives::{Address, H256, U256};
use mazze_types::{
    AccessListItem, AccessListTx, DynamicFeeTx, LegacyTx, Transaction, TxError, TxType,
};

const SENDER: &str = "0x1cad0b19bb29d4674531d6f115237e16afce377c";

fn test_key() -> PrivateKey {
    let bytes = hex::decode("0123456789abcdef".repeat(4)).unwrap();
    private_key_from_bytes(&bytes).unwrap()
}

fn legacy(to: Option<Address>) -> Transaction {
    Transaction::new(LegacyTx {
        nonce: U256::zero(),
        gas_price: U256::one(),
        gas: U256::from(21000u64),
        to,
        value: U256::zero(),
        storage_limit: 0,
        epoch_height: 0,
        chain_id: 1990,
        data: Bytes::new(),
    })
}

fn typed_to() -> Address {
    Address::from_hex("0x19578cf3c71eab48cf810c78b5175d5c9e6ef441").unwrap()
}

fn access_list() -> Vec<AccessListItem> {
    vec![AccessListItem {
        address: typed_to(),
        storage_keys: vec![H256::from_hex(&"1234567890abcdef".repeat(4)).unwrap()],
    }]
}

fn hundred() -> U256 {
    U256::from(100u64)
}

// ==================== Legacy ====================

const LEGACY_RAW: &str = "f86680018252089401234567890123456789012345678901234567898080808207c680820fafa0b3dbe68f41de2dc6145ad7f8b42e2881d920a26e099f83ef5cf41f675c2a8975a06bfd035046277cb3f323b06003e5501547b0a6efc07ec58e5b48658bd41c3e2b";

#[test]
fn legacy_sign_and_serialize() {
    let to = Address::from_hex("0x0123456789012345678901234567890123456789").unwrap();
    let mut tx = legacy(Some(to));
    let sig = tx.sign(&test_key()).unwrap().clone();

    assert_eq!(sig.v, 4015);
    assert_eq!(hex::encode(tx.serialize()), LEGACY_RAW);
    assert_eq!(
        hex::encode(tx.hash().as_bytes()),
        "01943fcd450ed105d46d75386799e5f416b4dfcef90f77db36f67c8c9d190b8e"
    );
    assert_eq!(tx.recovery_id().unwrap(), 0);
    assert_eq!(tx.sender().unwrap().to_hex(), SENDER);
    assert!(tx.verify().unwrap());
}

#[test]
fn legacy_decode_raw() {
    let raw = hex::decode(LEGACY_RAW).unwrap();
    let tx = Transaction::decode_raw(&raw).unwrap();

    assert_eq!(tx.tx_type(), TxType::Legacy);
    assert_eq!(tx.gas(), U256::from(21000u64));
    assert_eq!(tx.chain_id(), 1990);
    assert_eq!(tx.signature.as_ref().unwrap().v, 4015);
    assert_eq!(tx.sender().unwrap().to_hex(), SENDER);
    assert_eq!(tx.serialize(), raw);
}

#[test]
fn legacy_signing_is_deterministic() {
    let mut a = legacy(None);
    let mut b = legacy(None);
    a.sign(&test_key()).unwrap();
    b.sign(&test_key()).unwrap();
    assert_eq!(a.signature, b.signature);
}

// ==================== Contract creation ====================

#[test]
fn contract_creation_roundtrip() {
    let mut tx = legacy(None);
    tx.sign(&test_key()).unwrap();
    let raw = tx.serialize();
    assert_eq!(
        hex::encode(&raw),
        "f8528001825208808080808207c680820fafa07b806d41a34960b2cf7aea5698693f700e08b9f72af0620382479f7e73685112a07820abd84a50964a0549119ef3d1dec51e745d669b09bc3259f860f9c5102267"
    );

    let decoded = Transaction::decode_raw(&raw).unwrap();
    assert_eq!(decoded.to(), None);
    assert!(decoded.is_contract_creation());
    assert_eq!(decoded, tx);
}

// ==================== Access list (type 1) ====================

const ACCESS_LIST_RAW: &str = "01f8a88207c66464649419578cf3c71eab48cf810c78b5175d5c9e6ef4416464648c48656c6c6f2c20576f726c64f838f79419578cf3c71eab48cf810c78b5175d5c9e6ef441e1a01234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef80a0cc31ec7dcd0156820edb8401a53f16a07db7258e2d1d1bdb280b426e75bd9117a0270f4a1eebc6678d892f93a3ed0b2cebf1f78f4d6fcbb8c6c6e36662f2a14e17";

fn access_list_tx() -> Transaction {
    Transaction::new(AccessListTx {
        chain_id: 1990,
        nonce: hundred(),
        gas_price: hundred(),
        gas: hundred(),
        to: Some(typed_to()),
        value: hundred(),
        storage_limit: 100,
        epoch_height: 100,
        data: Bytes::from_static(b"Hello, World"),
        access_list: access_list(),
    })
}

#[test]
fn access_list_sign_and_serialize() {
    let mut tx = access_list_tx();
    assert_eq!(
        hex::encode(tx.signing_hash().as_bytes()),
        "16838af6318e56dd953352eb8ce330a119ba90fff4b77bbd4ecf4dfe9f432e34"
    );
    tx.sign(&test_key()).unwrap();
    assert_eq!(tx.signature.as_ref().unwrap().v, 0);
    assert_eq!(hex::encode(tx.serialize()), ACCESS_LIST_RAW);
}

#[test]
fn access_list_decode_raw() {
    let raw = hex::decode(ACCESS_LIST_RAW).unwrap();
    let tx = Transaction::decode_raw(&raw).unwrap();
    assert_eq!(tx.tx_type(), TxType::AccessList);
    assert_eq!(tx.access_list(), access_list().as_slice());
    assert_eq!(&tx.data()[..], b"Hello, World");
    assert_eq!(tx.sender().unwrap().to_hex(), SENDER);
}

// ==================== Fee market (type 2) ====================

const DYNAMIC_FEE_RAW: &str = "02f8a98207c6646464649419578cf3c71eab48cf810c78b5175d5c9e6ef4416464648c48656c6c6f2c20576f726c64f838f79419578cf3c71eab48cf810c78b5175d5c9e6ef441e1a01234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef80a0b0e4baef51bd2c434d5ecc79c1e2147b600187713875037bd650992cfcdaefada0541108a9b9a5da7765098afa8f59208d0cce0aec9dd3cbe1db11519b94e73c8f";

fn dynamic_fee_tx() -> Transaction {
    Transaction::new(DynamicFeeTx {
        chain_id: 1990,
        nonce: hundred(),
        max_priority_fee_per_gas: hundred(),
        max_fee_per_gas: hundred(),
        gas: hundred(),
        to: Some(typed_to()),
        value: hundred(),
        storage_limit: 100,
        epoch_height: 100,
        data: Bytes::from_static(b"Hello, World"),
        access_list: access_list(),
    })
}

#[test]
fn dynamic_fee_sign_and_serialize() {
    let mut tx = dynamic_fee_tx();
    assert_eq!(
        hex::encode(tx.signing_hash().as_bytes()),
        "23ae222fd7db62feaec705366f75743b89a7fd869d755596e68f6226ae9d05f6"
    );
    tx.sign(&test_key()).unwrap();
    assert_eq!(hex::encode(tx.serialize()), DYNAMIC_FEE_RAW);
}

#[test]
fn dynamic_fee_decode_raw() {
    let raw = hex::decode(DYNAMIC_FEE_RAW).unwrap();
    let tx = Transaction::decode_raw(&raw).unwrap();
    assert_eq!(tx.tx_type(), TxType::DynamicFee);
    let mut expected = dynamic_fee_tx();
    expected.sign(&test_key()).unwrap();
    assert_eq!(tx, expected);
    assert!(tx.verify().unwrap());
}

// ==================== Rejections ====================

#[test]
fn decode_rejects_non_canonical_nonce() {
    // legacy list with nonce 0x00 instead of 0x80
    let mut raw = hex::decode(LEGACY_RAW).unwrap();
    assert_eq!(raw[2], 0x80);
    raw[2] = 0x00;
    assert!(matches!(
        Transaction::decode_raw(&raw),
        Err(TxError::MalformedInteger { field: "nonce", .. })
    ));
}

#[test]
fn decode_rejects_short_to() {
    // to = 0x821234, two bytes
    let body = hex::decode("d280018252088212348080808207c680808080").unwrap();
    assert!(matches!(
        Transaction::decode_raw(&body),
        Err(TxError::Rlp(_))
    ));
}

#[test]
fn tampered_signature_recovers_different_sender() {
    let raw = hex::decode(LEGACY_RAW).unwrap();
    let mut tx = Transaction::decode_raw(&raw).unwrap();
    if let Some(sig) = tx.signature.as_mut() {
        sig.v += 1;
    }
    assert_ne!(tx.sender().map(|a| a.to_hex()), Some(SENDER.to_string()));
}
