//! Wallet and account management

use mazze_crypto::{public_key_to_address, sign, Message, PrivateKey, PublicKey, Signature};
use mazze_primitives::{encode_base32, Address, H256};
use mazze_types::Transaction;
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::SdkError;

/// Wallet for managing private keys and signing
///
/// Note: Clone is intentionally not implemented to prevent accidental key duplication.
/// Use `from_private_key` to create a new wallet with the same key if needed.
pub struct Wallet {
    private_key: PrivateKey,
    address: Address,
}

impl Wallet {
    /// Create a new random wallet
    pub fn new_random() -> Self {
        let private_key = SigningKey::random(&mut OsRng);
        let address = public_key_to_address(private_key.verifying_key());

        Self {
            private_key,
            address,
        }
    }

    /// Create a wallet from a 32-byte private key
    pub fn from_private_key(key: &[u8; 32]) -> Result<Self, SdkError> {
        let private_key = SigningKey::from_slice(key)
            .map_err(|e| SdkError::InvalidPrivateKey(e.to_string()))?;
        let address = public_key_to_address(private_key.verifying_key());

        Ok(Self {
            private_key,
            address,
        })
    }

    /// Create a wallet from a hex-encoded private key
    ///
    /// Accepts both with and without "0x" prefix.
    pub fn from_private_key_hex(hex: &str) -> Result<Self, SdkError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut bytes = hex::decode(hex)?;
        if bytes.len() != 32 {
            let len = bytes.len();
            bytes.zeroize();
            return Err(SdkError::InvalidPrivateKey(format!(
                "Expected 32 bytes, got {}",
                len
            )));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        bytes.zeroize();

        let result = Self::from_private_key(&key);
        key.zeroize();
        result
    }

    /// Get the wallet's address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Address text for a network
    pub fn base32_address(&self, network_id: u32) -> String {
        encode_base32(&self.address, network_id)
    }

    /// Get the wallet's public key
    pub fn public_key(&self) -> &PublicKey {
        self.private_key.verifying_key()
    }

    /// Sign a 32-byte hash
    pub fn sign_hash(&self, hash: &H256) -> Result<Signature, SdkError> {
        Ok(sign(hash, &self.private_key)?)
    }

    /// Sign a transaction in place and return its hash
    pub fn sign_transaction(&self, tx: &mut Transaction) -> Result<H256, SdkError> {
        tx.sign(&self.private_key)?;
        Ok(tx.hash())
    }

    /// Sign a plain text message (`keccak256(text)`)
    pub fn sign_message(&self, text: &str) -> Result<Message, SdkError> {
        let mut message = Message::new(text);
        message.sign(&self.private_key)?;
        Ok(message)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn test_wallet_random() {
        let wallet = Wallet::new_random();
        assert_ne!(wallet.address(), &Address::ZERO);
        assert!(wallet.address().to_hex().starts_with("0x1"));
    }

    #[test]
    fn test_wallet_from_hex() {
        let wallet = Wallet::from_private_key_hex(TEST_KEY).unwrap();
        assert_eq!(
            wallet.address().to_hex(),
            "0x1cad0b19bb29d4674531d6f115237e16afce377c"
        );
        assert_eq!(
            wallet.base32_address(1),
            "mazzetest:aasm4c231py7j34fghntcfkdt2nm9xv1tum0f0a8zw"
        );
    }

    #[test]
    fn test_wallet_from_hex_no_prefix() {
        let wallet = Wallet::from_private_key_hex(&TEST_KEY[2..]).unwrap();
        assert_eq!(
            wallet.address().to_hex(),
            "0x1cad0b19bb29d4674531d6f115237e16afce377c"
        );
    }

    #[test]
    fn test_wallet_invalid_keys() {
        assert!(matches!(
            Wallet::from_private_key_hex("0x1234"),
            Err(SdkError::InvalidPrivateKey(_))
        ));
        assert!(matches!(Wallet::from_private_key_hex("0xzz"), Err(SdkError::InvalidHex(_))));
        assert!(Wallet::from_private_key(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_wallet_sign_message() {
        let wallet = Wallet::from_private_key_hex(TEST_KEY).unwrap();
        let message = wallet.sign_message("Hello World").unwrap();
        assert_eq!(message.from(), Some(*wallet.address()));
    }

    #[test]
    fn test_wallet_debug_hides_key() {
        let wallet = Wallet::new_random();
        let debug = format!("{:?}", wallet);
        assert!(debug.contains("Wallet"));
        assert!(debug.contains("address"));
        assert!(!debug.contains("private_key"));
    }
}
