//! Key pair generation for every supported algorithm.
//!
//! Ed25519 is used for signing, X25519 for Diffie-Hellman key agreement,
//! and the two NIST/SEC curves (P-256, secp256k1) for both. All four use a
//! 32-byte secret: an Ed25519 seed, an X25519 scalar (clamped on use), or a
//! big-endian ECDSA scalar in `[1, n)`.

use std::fmt;

use curve25519_dalek::edwards::CompressedEdwardsY;
use ed25519_dalek::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha2::{Digest, Sha512};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::{Zeroize, Zeroizing};

use crate::algorithm::KeyAlgorithm;
use crate::crypto::random::random_key_32;
use crate::error::{DidKeyError, Result};

/// Candidate secrets drawn before generation gives up.
pub const MAX_GENERATION_ATTEMPTS: usize = 8;

/// A complete key pair tagged with its algorithm.
///
/// The secret is zeroized on drop. A `KeyPair` is only ever constructed
/// from a secret whose public half has already been derived and checked.
pub struct KeyPair {
    algorithm: KeyAlgorithm,
    secret: [u8; 32],
    public: Vec<u8>,
}

impl KeyPair {
    /// Generate a new random key pair.
    ///
    /// Candidates that map to an invalid key (zero or out-of-range scalar,
    /// weak public point) are discarded and redrawn, at most
    /// [`MAX_GENERATION_ATTEMPTS`] times.
    pub fn generate(algorithm: KeyAlgorithm) -> Result<Self> {
        Self::generate_with(algorithm, random_key_32)
    }

    /// Generation loop over an arbitrary candidate source.
    fn generate_with(
        algorithm: KeyAlgorithm,
        mut draw: impl FnMut() -> Result<[u8; 32]>,
    ) -> Result<Self> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let seed = Zeroizing::new(draw()?);
            if let Some(public) = derive_public(algorithm, &seed) {
                log::debug!("generated {algorithm} key pair (attempt {attempt})");
                return Ok(Self {
                    algorithm,
                    secret: *seed,
                    public,
                });
            }
            log::debug!("rejected {algorithm} candidate secret (attempt {attempt})");
        }
        Err(DidKeyError::KeyGenerationFailed(format!(
            "no valid {algorithm} key after {MAX_GENERATION_ATTEMPTS} attempts"
        )))
    }

    /// Generate a key pair for an algorithm given by name.
    pub fn generate_named(name: &str) -> Result<Self> {
        Self::generate(name.parse()?)
    }

    /// Deterministically derive a key pair from a 32-byte seed.
    pub fn from_seed(algorithm: KeyAlgorithm, seed: &[u8]) -> Result<Self> {
        let secret: [u8; 32] = seed.try_into().map_err(|_| {
            DidKeyError::KeyGenerationFailed(format!(
                "seed must be {} bytes, got {}",
                algorithm.secret_key_len(),
                seed.len()
            ))
        })?;
        let secret = Zeroizing::new(secret);
        let public = derive_public(algorithm, &secret).ok_or_else(|| {
            DidKeyError::KeyGenerationFailed(format!("seed is not a valid {algorithm} secret"))
        })?;
        Ok(Self {
            algorithm,
            secret: *secret,
            public,
        })
    }

    /// Return the key algorithm.
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Return the encoded public key bytes.
    pub fn public_key_bytes(&self) -> &[u8] {
        &self.public
    }

    /// Return the algorithm-tagged public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            algorithm: self.algorithm,
            bytes: self.public.clone(),
        }
    }

    /// Return a copy of the secret bytes, zeroized when the copy drops.
    pub fn secret_key_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret)
    }

    pub(crate) fn secret(&self) -> &[u8; 32] {
        &self.secret
    }

    /// Derive the X25519 key-agreement pair of an Ed25519 key pair.
    ///
    /// The X25519 scalar is the low half of SHA-512(seed), the same scalar
    /// Ed25519 signs with, so the public half equals the Montgomery form of
    /// the Ed25519 public key.
    pub fn to_x25519(&self) -> Result<KeyPair> {
        match self.algorithm {
            KeyAlgorithm::X25519 => Self::from_seed(KeyAlgorithm::X25519, &self.secret),
            KeyAlgorithm::Ed25519 => {
                let mut digest = Sha512::digest(self.secret);
                let result = Self::from_seed(KeyAlgorithm::X25519, &digest[..32]);
                digest.as_mut_slice().zeroize();
                result
            }
            other => Err(DidKeyError::UnsupportedAlgorithm(format!(
                "{other} keys have no X25519 form"
            ))),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm)
            .field("public", &bs58::encode(&self.public).into_string())
            .finish_non_exhaustive()
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

/// An algorithm-tagged public key, as resolved from an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    pub algorithm: KeyAlgorithm,
    pub bytes: Vec<u8>,
}

impl PublicKey {
    /// Check that the bytes are a valid, non-degenerate point for the
    /// algorithm.
    pub fn validate(&self) -> Result<()> {
        if self.bytes.len() != self.algorithm.public_key_len() {
            return Err(DidKeyError::MalformedIdentifier(format!(
                "{} public key must be {} bytes",
                self.algorithm,
                self.algorithm.public_key_len()
            )));
        }
        let valid = match self.algorithm {
            KeyAlgorithm::Ed25519 => ed25519_verifying_key(&self.bytes)
                .map(|vk| !vk.is_weak())
                .unwrap_or(false),
            KeyAlgorithm::X25519 => self.bytes.iter().any(|&b| b != 0),
            KeyAlgorithm::P256 => p256::PublicKey::from_sec1_bytes(&self.bytes).is_ok(),
            KeyAlgorithm::Secp256k1 => k256::PublicKey::from_sec1_bytes(&self.bytes).is_ok(),
        };
        if valid {
            Ok(())
        } else {
            Err(DidKeyError::MalformedIdentifier(format!(
                "not a valid {} public key",
                self.algorithm
            )))
        }
    }

    /// Map an Ed25519 public key onto its X25519 (Montgomery) form.
    pub fn to_x25519(&self) -> Result<PublicKey> {
        match self.algorithm {
            KeyAlgorithm::X25519 => Ok(self.clone()),
            KeyAlgorithm::Ed25519 => {
                let edwards = CompressedEdwardsY::from_slice(&self.bytes)
                    .ok()
                    .and_then(|point| point.decompress())
                    .ok_or_else(|| {
                        DidKeyError::MalformedIdentifier("invalid Edwards point".into())
                    })?;
                Ok(PublicKey {
                    algorithm: KeyAlgorithm::X25519,
                    bytes: edwards.to_montgomery().to_bytes().to_vec(),
                })
            }
            other => Err(DidKeyError::UnsupportedAlgorithm(format!(
                "{other} keys have no X25519 form"
            ))),
        }
    }
}

pub(crate) fn ed25519_verifying_key(bytes: &[u8]) -> Result<VerifyingKey> {
    let array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| DidKeyError::MalformedIdentifier("Ed25519 key must be 32 bytes".into()))?;
    VerifyingKey::from_bytes(&array)
        .map_err(|e| DidKeyError::MalformedIdentifier(format!("invalid Ed25519 key: {e}")))
}

/// Derive the encoded public key for a candidate secret, or `None` if the
/// secret does not yield a usable key.
fn derive_public(algorithm: KeyAlgorithm, secret: &[u8; 32]) -> Option<Vec<u8>> {
    match algorithm {
        KeyAlgorithm::Ed25519 => {
            let verifying = SigningKey::from_bytes(secret).verifying_key();
            (!verifying.is_weak()).then(|| verifying.to_bytes().to_vec())
        }
        KeyAlgorithm::X25519 => {
            let public = X25519PublicKey::from(&StaticSecret::from(*secret));
            public
                .as_bytes()
                .iter()
                .any(|&b| b != 0)
                .then(|| public.as_bytes().to_vec())
        }
        KeyAlgorithm::P256 => p256::SecretKey::from_slice(secret)
            .ok()
            .map(|sk| sk.public_key().to_encoded_point(true).as_bytes().to_vec()),
        KeyAlgorithm::Secp256k1 => k256::SecretKey::from_slice(secret)
            .ok()
            .map(|sk| sk.public_key().to_encoded_point(true).as_bytes().to_vec()),
    }
}
