//! ECDH key agreement.
//!
//! X25519 uses `x25519-dalek`; P-256 and secp256k1 use the `ecdh` module of
//! their RustCrypto curve crates. Both sides of an agreement must use the
//! same algorithm. The raw 32-byte shared secret is returned in a
//! zeroizing buffer and must only be used as HKDF input.

use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::algorithm::KeyAlgorithm;
use crate::crypto::keys::{KeyPair, PublicKey};
use crate::error::{DidKeyError, Result};

/// Compute the shared secret between a local key pair and a peer public key.
pub fn diffie_hellman(local: &KeyPair, peer: &PublicKey) -> Result<Zeroizing<[u8; 32]>> {
    let algorithm = local.algorithm();
    if peer.algorithm != algorithm {
        return Err(DidKeyError::UnsupportedAlgorithm(format!(
            "cannot agree between {algorithm} and {}",
            peer.algorithm
        )));
    }

    let mut shared = Zeroizing::new([0u8; 32]);
    match algorithm {
        KeyAlgorithm::X25519 => {
            let peer_bytes: [u8; 32] = peer.bytes.as_slice().try_into().map_err(|_| {
                DidKeyError::MalformedIdentifier("X25519 key must be 32 bytes".into())
            })?;
            let secret = StaticSecret::from(*local.secret());
            let result = secret.diffie_hellman(&X25519PublicKey::from(peer_bytes));
            if !result.was_contributory() {
                return Err(DidKeyError::MalformedIdentifier(
                    "X25519 peer key is a low-order point".into(),
                ));
            }
            shared.copy_from_slice(result.as_bytes());
        }
        KeyAlgorithm::P256 => {
            let secret = p256::SecretKey::from_slice(local.secret())
                .map_err(|_| DidKeyError::KeyGenerationFailed("invalid P-256 secret".into()))?;
            let public = p256::PublicKey::from_sec1_bytes(&peer.bytes)
                .map_err(|_| DidKeyError::MalformedIdentifier("invalid P-256 point".into()))?;
            let result = p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
            shared.copy_from_slice(result.raw_secret_bytes());
        }
        KeyAlgorithm::Secp256k1 => {
            let secret = k256::SecretKey::from_slice(local.secret()).map_err(|_| {
                DidKeyError::KeyGenerationFailed("invalid secp256k1 secret".into())
            })?;
            let public = k256::PublicKey::from_sec1_bytes(&peer.bytes)
                .map_err(|_| DidKeyError::MalformedIdentifier("invalid secp256k1 point".into()))?;
            let result = k256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
            shared.copy_from_slice(result.raw_secret_bytes());
        }
        KeyAlgorithm::Ed25519 => {
            return Err(DidKeyError::UnsupportedAlgorithm(
                "Ed25519 keys cannot perform key agreement".into(),
            ))
        }
    }
    Ok(shared)
}
