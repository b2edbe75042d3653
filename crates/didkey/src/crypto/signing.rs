//! Signing and verification.
//!
//! Ed25519 signatures are deterministic (RFC 8032). P-256 and secp256k1
//! use ECDSA over SHA-256 with RFC 6979 nonces, so they are deterministic
//! too. ECDSA signatures are the fixed 64-byte `r || s` form.

use ed25519_dalek::SigningKey;

use crate::algorithm::KeyAlgorithm;
use crate::crypto::keys::{ed25519_verifying_key, KeyPair, PublicKey};
use crate::error::{DidKeyError, Result};

/// Sign a message with the key pair's algorithm.
pub fn sign(key_pair: &KeyPair, message: &[u8]) -> Result<Vec<u8>> {
    use p256::ecdsa::signature::Signer;

    match key_pair.algorithm() {
        KeyAlgorithm::Ed25519 => {
            let signing_key = SigningKey::from_bytes(key_pair.secret());
            Ok(signing_key.sign(message).to_bytes().to_vec())
        }
        KeyAlgorithm::P256 => {
            let signing_key = p256::ecdsa::SigningKey::from_slice(key_pair.secret())
                .map_err(|_| DidKeyError::KeyGenerationFailed("invalid P-256 secret".into()))?;
            let signature: p256::ecdsa::Signature = signing_key.sign(message);
            Ok(signature.to_bytes().to_vec())
        }
        KeyAlgorithm::Secp256k1 => {
            let signing_key = k256::ecdsa::SigningKey::from_slice(key_pair.secret()).map_err(|_| {
                DidKeyError::KeyGenerationFailed("invalid secp256k1 secret".into())
            })?;
            let signature: k256::ecdsa::Signature = signing_key.sign(message);
            Ok(signature.to_bytes().to_vec())
        }
        KeyAlgorithm::X25519 => Err(DidKeyError::UnsupportedAlgorithm(
            "X25519 keys cannot sign".into(),
        )),
    }
}

/// Verify a signature against a public key and message.
///
/// A signature of the wrong shape is reported as
/// [`DidKeyError::InvalidSignature`], the same as a mismatch; only an
/// unusable public key is [`DidKeyError::MalformedIdentifier`].
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &[u8]) -> Result<()> {
    use p256::ecdsa::signature::Verifier;

    match public_key.algorithm {
        KeyAlgorithm::Ed25519 => {
            let verifying_key = ed25519_verifying_key(&public_key.bytes)?;
            let signature = ed25519_dalek::Signature::from_slice(signature)
                .map_err(|_| DidKeyError::InvalidSignature)?;
            verifying_key
                .verify_strict(message, &signature)
                .map_err(|_| DidKeyError::InvalidSignature)
        }
        KeyAlgorithm::P256 => {
            let verifying_key = p256::ecdsa::VerifyingKey::from_sec1_bytes(&public_key.bytes)
                .map_err(|_| DidKeyError::MalformedIdentifier("invalid P-256 point".into()))?;
            let signature = p256::ecdsa::Signature::from_slice(signature)
                .map_err(|_| DidKeyError::InvalidSignature)?;
            verifying_key
                .verify(message, &signature)
                .map_err(|_| DidKeyError::InvalidSignature)
        }
        KeyAlgorithm::Secp256k1 => {
            let verifying_key = k256::ecdsa::VerifyingKey::from_sec1_bytes(&public_key.bytes)
                .map_err(|_| DidKeyError::MalformedIdentifier("invalid secp256k1 point".into()))?;
            let signature = k256::ecdsa::Signature::from_slice(signature)
                .map_err(|_| DidKeyError::InvalidSignature)?;
            verifying_key
                .verify(message, &signature)
                .map_err(|_| DidKeyError::InvalidSignature)
        }
        KeyAlgorithm::X25519 => Err(DidKeyError::UnsupportedAlgorithm(
            "X25519 keys cannot verify signatures".into(),
        )),
    }
}
