//! Supported key algorithms and their fixed encoding parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DidKeyError;

/// Key algorithm tag. Fixed for the life of a key pair; determines the
/// multicodec prefix, the public key length, and which operations the key
/// can take part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    #[serde(rename = "Ed25519")]
    Ed25519,
    #[serde(rename = "X25519")]
    X25519,
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "secp256k1")]
    Secp256k1,
}

impl KeyAlgorithm {
    /// All registered algorithms.
    pub const ALL: [KeyAlgorithm; 4] = [
        KeyAlgorithm::Ed25519,
        KeyAlgorithm::X25519,
        KeyAlgorithm::P256,
        KeyAlgorithm::Secp256k1,
    ];

    /// Multicodec code of the public key type.
    pub fn multicodec(self) -> u64 {
        match self {
            KeyAlgorithm::Ed25519 => 0xed,
            KeyAlgorithm::X25519 => 0xec,
            KeyAlgorithm::P256 => 0x1200,
            KeyAlgorithm::Secp256k1 => 0xe7,
        }
    }

    /// Look up the algorithm registered for a multicodec code.
    pub fn from_multicodec(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|alg| alg.multicodec() == code)
    }

    /// Length of the encoded public key. Elliptic-curve keys use SEC1
    /// compressed points.
    pub fn public_key_len(self) -> usize {
        match self {
            KeyAlgorithm::Ed25519 | KeyAlgorithm::X25519 => 32,
            KeyAlgorithm::P256 | KeyAlgorithm::Secp256k1 => 33,
        }
    }

    /// Length of the secret key (seed or scalar).
    pub fn secret_key_len(self) -> usize {
        32
    }

    /// Whether keys of this algorithm can produce signatures.
    pub fn can_sign(self) -> bool {
        !matches!(self, KeyAlgorithm::X25519)
    }

    /// Whether keys of this algorithm can take part in ECDH key agreement.
    pub fn can_agree(self) -> bool {
        !matches!(self, KeyAlgorithm::Ed25519)
    }

    /// Canonical name, as used in requests and DID documents.
    pub fn name(self) -> &'static str {
        match self {
            KeyAlgorithm::Ed25519 => "Ed25519",
            KeyAlgorithm::X25519 => "X25519",
            KeyAlgorithm::P256 => "P-256",
            KeyAlgorithm::Secp256k1 => "secp256k1",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = DidKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ed25519" => Ok(KeyAlgorithm::Ed25519),
            "x25519" => Ok(KeyAlgorithm::X25519),
            "p-256" | "p256" | "secp256r1" => Ok(KeyAlgorithm::P256),
            "secp256k1" | "k256" => Ok(KeyAlgorithm::Secp256k1),
            _ => Err(DidKeyError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}
