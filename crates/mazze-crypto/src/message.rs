//! Plain text message signing

use crate::signature::{public_key_to_address, recover_public_key, sign, PrivateKey, PublicKey};
use crate::{keccak256, CryptoError, Signature};
use mazze_primitives::{Address, H256};

/// Text message with an optional signature over `keccak256(text)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    message: String,
    hash: H256,
    signature: Option<Signature>,
}

impl Message {
    /// Wrap a text message
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let hash = keccak256(message.as_bytes());
        Message {
            message,
            hash,
            signature: None,
        }
    }

    /// Attach an existing signature, e.g. one received over the wire
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Sign an arbitrary 32-byte hash
    pub fn sign_hash(private_key: &PrivateKey, hash: &H256) -> Result<Signature, CryptoError> {
        sign(hash, private_key)
    }

    /// Recover the signer's public key from a signature over `hash`
    pub fn recover(signature: &Signature, hash: &H256) -> Result<PublicKey, CryptoError> {
        recover_public_key(hash, signature)
    }

    /// Sign this message in place
    pub fn sign(&mut self, private_key: &PrivateKey) -> Result<&Signature, CryptoError> {
        let signature = Self::sign_hash(private_key, &self.hash)?;
        Ok(self.signature.insert(signature))
    }

    /// Message text
    pub fn message(&self) -> &str {
        &self.message
    }

    /// `keccak256(text)`
    pub fn hash(&self) -> &H256 {
        &self.hash
    }

    /// Signature, if signed
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Signer address, `None` when unsigned or unrecoverable
    pub fn from(&self) -> Option<Address> {
        let signature = self.signature.as_ref()?;
        Self::recover(signature, &self.hash)
            .ok()
            .map(|key| public_key_to_address(&key))
    }

    /// r component
    pub fn r(&self) -> Option<[u8; 32]> {
        self.signature.as_ref().map(|sig| sig.r)
    }

    /// s component
    pub fn s(&self) -> Option<[u8; 32]> {
        self.signature.as_ref().map(|sig| sig.s)
    }

    /// Recovery id
    pub fn v(&self) -> Option<u8> {
        self.signature.as_ref().map(|sig| sig.v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::private_key_from_bytes;

    fn test_key() -> PrivateKey {
        let bytes = hex::decode("0123456789abcdef".repeat(4)).unwrap();
        private_key_from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_sign_hello_world() {
        let mut msg = Message::new("Hello World");
        let sig = msg.sign(&test_key()).unwrap().clone();
        assert_eq!(
            sig.to_hex(),
            "0x6e913e2b76459f19ebd269b82b51a70e912e909b2f5c002312efc27bcc280f3c\
             29134d382aad0dbd3f0ccc9f0eb8f1dbe3f90141d81574ebb6504156b0d7b95f01"
        );
        assert_eq!(msg.v(), Some(1));
        assert_eq!(
            msg.from().unwrap().to_hex(),
            "0x1cad0b19bb29d4674531d6f115237e16afce377c"
        );
    }

    #[test]
    fn test_unsigned_message_has_no_sender() {
        let msg = Message::new("Hello World");
        assert_eq!(msg.from(), None);
        assert_eq!(msg.r(), None);
        assert_eq!(msg.hash(), &keccak256(b"Hello World"));
    }

    #[test]
    fn test_garbage_signature_yields_none() {
        let msg = Message::new("x").with_signature(Signature::new([0u8; 32], [0u8; 32], 0));
        assert_eq!(msg.from(), None);
    }
}
