//! ECDSA signature operations using secp256k1

use crate::{keccak256, CryptoError};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use mazze_primitives::{Address, H256};
use std::cmp::Ordering;

/// Half of the secp256k1 curve order (n/2)
/// n/2 = 0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0
const SECP256K1_N_DIV_2: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Full secp256k1 curve order (n)
const SECP256K1_N: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Recoverable ECDSA signature.
///
/// `v` is the raw recovery id (0 or 1). Transaction layouts that fold extra
/// data into `v` do so at the transaction codec, not here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r component (32 bytes)
    pub r: [u8; 32],
    /// s component (32 bytes)
    pub s: [u8; 32],
    /// recovery id
    pub v: u8,
}

/// Public key
pub type PublicKey = VerifyingKey;

/// Private key (32 bytes)
pub type PrivateKey = SigningKey;

impl Signature {
    /// Create signature from r, s, v components
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Signature { r, s, v }
    }

    /// Get recovery ID (0 or 1); tolerates the 27/28 convention on input
    pub fn recovery_id(&self) -> u8 {
        if self.v >= 27 {
            self.v - 27
        } else {
            self.v
        }
    }

    /// Convert to 65-byte representation (r || s || v)
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// Parse from 65-byte representation
    pub fn from_bytes(bytes: &[u8; 65]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Signature { r, s, v: bytes[64] }
    }

    /// `0x` + r ∥ s ∥ recovery id
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// Inverse of [`Signature::to_hex`]
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        let bytes: [u8; 65] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidSignature(format!("expected 65 bytes, got {}", bytes.len()))
        })?;
        let signature = Self::from_bytes(&bytes);
        if signature.recovery_id() > 1 {
            return Err(CryptoError::InvalidRecoveryId(signature.v));
        }
        Ok(signature)
    }

    /// Check if signature has low-s value
    pub fn is_low_s(&self) -> bool {
        self.s.cmp(&SECP256K1_N_DIV_2) != Ordering::Greater
    }

    fn to_k256(&self) -> Result<K256Signature, CryptoError> {
        let r: k256::FieldBytes = self.r.into();
        let s: k256::FieldBytes = self.s.into();
        K256Signature::from_scalars(r, s).map_err(|e| CryptoError::InvalidSignature(e.to_string()))
    }
}

/// n - s
fn subtract_from_n(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: u16 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_N[i] as u16)
            .wrapping_sub(s[i] as u16)
            .wrapping_sub(borrow);
        result[i] = diff as u8;
        borrow = if diff > 255 { 1 } else { 0 };
    }

    result
}

/// Load a private key from 32 raw bytes
pub fn private_key_from_bytes(bytes: &[u8]) -> Result<PrivateKey, CryptoError> {
    if bytes.len() != 32 {
        return Err(CryptoError::InvalidPrivateKey);
    }
    SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)
}

/// Sign a 32-byte hash (RFC 6979 nonces, low-s normalised)
pub fn sign(message_hash: &H256, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
    let (signature, mut recovery_id) = private_key
        .sign_prehash_recoverable(message_hash.as_bytes())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    let r_bytes: [u8; 32] = signature.r().to_bytes().into();
    let mut s_bytes: [u8; 32] = signature.s().to_bytes().into();

    // s > n/2: use n - s and flip the recovery id
    if s_bytes.cmp(&SECP256K1_N_DIV_2) == Ordering::Greater {
        s_bytes = subtract_from_n(&s_bytes);
        recovery_id = RecoveryId::try_from(recovery_id.to_byte() ^ 1).map_err(|_| {
            CryptoError::SigningFailed("invalid recovery id after normalization".to_string())
        })?;
    }

    Ok(Signature {
        r: r_bytes,
        s: s_bytes,
        v: recovery_id.to_byte(),
    })
}

/// Verify a signature against a message hash and public key
pub fn verify(
    message_hash: &H256,
    signature: &Signature,
    public_key: &PublicKey,
) -> Result<bool, CryptoError> {
    if !signature.is_low_s() {
        return Ok(false);
    }

    let k256_sig = signature.to_k256()?;

    use k256::ecdsa::signature::hazmat::PrehashVerifier;
    Ok(public_key
        .verify_prehash(message_hash.as_bytes(), &k256_sig)
        .is_ok())
}

/// Recover public key from signature and message hash
pub fn recover_public_key(
    message_hash: &H256,
    signature: &Signature,
) -> Result<PublicKey, CryptoError> {
    let k256_sig = signature.to_k256()?;

    let recovery_id = RecoveryId::try_from(signature.recovery_id())
        .map_err(|_| CryptoError::InvalidRecoveryId(signature.v))?;

    VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &k256_sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))
}

/// Uncompressed public key without the `0x04` tag (64 bytes, x ∥ y)
pub fn public_key_to_bytes(public_key: &PublicKey) -> [u8; 64] {
    let encoded = public_key.to_encoded_point(false);
    let mut out = [0u8; 64];
    out.copy_from_slice(&encoded.as_bytes()[1..]);
    out
}

/// Derive the user-space account address of a public key
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let hash = keccak256(&public_key_to_bytes(public_key));

    let mut addr_bytes = [0u8; 20];
    addr_bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(addr_bytes).to_user()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;
    use mazze_primitives::AddressKind;
    use rand::rngs::OsRng;

    fn test_key() -> PrivateKey {
        let bytes = hex::decode("0123456789abcdef".repeat(4)).unwrap();
        private_key_from_bytes(&bytes).unwrap()
    }

    // ==================== Fixed key ====================

    #[test]
    fn test_fixed_key_public_key_and_address() {
        let key = test_key();
        let public = public_key_to_bytes(key.verifying_key());
        assert_eq!(
            hex::encode(public),
            "4646ae5047316b4230d0086c8acec687f00b1cd9d1dc634f6cb358ac0a9a8fff\
             fe77b4dd0a4bfb95851f3b7355c781dd60f8418fc8a65d14907aff47c903a559"
        );
        let address = public_key_to_address(key.verifying_key());
        assert_eq!(address.to_hex(), "0x1cad0b19bb29d4674531d6f115237e16afce377c");
        assert_eq!(address.kind(), AddressKind::User);
    }

    #[test]
    fn test_fixed_key_deterministic_signature() {
        let hash =
            H256::from_hex("ac59f1e693c9005a1fa5fb17a089ac64c3ae19d07189d1073c43926e355576a9")
                .unwrap();
        let sig = sign(&hash, &test_key()).unwrap();
        assert_eq!(
            hex::encode(sig.r),
            "b3dbe68f41de2dc6145ad7f8b42e2881d920a26e099f83ef5cf41f675c2a8975"
        );
        assert_eq!(
            hex::encode(sig.s),
            "6bfd035046277cb3f323b06003e5501547b0a6efc07ec58e5b48658bd41c3e2b"
        );
        assert_eq!(sig.v, 0);
        assert_eq!(sign(&hash, &test_key()).unwrap(), sig);
    }

    // ==================== Sign / verify / recover ====================

    #[test]
    fn test_sign_and_verify() {
        let private_key = SigningKey::random(&mut OsRng);
        let message_hash = keccak256(b"test message");

        let signature = sign(&message_hash, &private_key).unwrap();
        assert!(signature.is_low_s());
        assert!(signature.v <= 1);
        assert!(verify(&message_hash, &signature, private_key.verifying_key()).unwrap());
    }

    #[test]
    fn test_recover_public_key() {
        let private_key = SigningKey::random(&mut OsRng);
        let message_hash = keccak256(b"test message");

        let signature = sign(&message_hash, &private_key).unwrap();
        let recovered = recover_public_key(&message_hash, &signature).unwrap();
        assert_eq!(private_key.verifying_key(), &recovered);
    }

    #[test]
    fn test_reject_high_s_signature() {
        let private_key = SigningKey::random(&mut OsRng);
        let message_hash = keccak256(b"test");

        let mut signature = sign(&message_hash, &private_key).unwrap();
        signature.s = [0xFF; 32];
        assert!(!verify(&message_hash, &signature, private_key.verifying_key()).unwrap());
    }

    #[test]
    fn test_recover_rejects_zero_signature() {
        let signature = Signature::new([0u8; 32], [0u8; 32], 0);
        assert!(matches!(
            recover_public_key(&keccak256(b"x"), &signature),
            Err(CryptoError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_invalid_private_key() {
        assert_eq!(
            private_key_from_bytes(&[0u8; 32]).unwrap_err(),
            CryptoError::InvalidPrivateKey
        );
        assert!(private_key_from_bytes(&[1u8; 31]).is_err());
        assert!(private_key_from_bytes(&[1u8; 33]).is_err());
        assert!(private_key_from_bytes(&[]).is_err());
    }

    // ==================== Hex form ====================

    #[test]
    fn test_signature_hex_roundtrip() {
        let sig = sign(&keccak256(b"hex"), &test_key()).unwrap();
        let text = sig.to_hex();
        assert_eq!(text.len(), 2 + 130);
        assert_eq!(Signature::from_hex(&text).unwrap(), sig);
    }

    #[test]
    fn test_signature_from_hex_errors() {
        assert!(matches!(
            Signature::from_hex("0x1234"),
            Err(CryptoError::InvalidSignature(_))
        ));
        let bad_v = format!("0x{}{}", "11".repeat(64), "05");
        assert_eq!(
            Signature::from_hex(&bad_v),
            Err(CryptoError::InvalidRecoveryId(5))
        );
    }
}
