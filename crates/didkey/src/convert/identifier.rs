//! `did:key` identifiers and the conversions around them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::algorithm::KeyAlgorithm;
use crate::codec::{self, DID_KEY_SCHEME};
use crate::crypto::keys::{KeyPair, PublicKey};
use crate::error::{DidKeyError, Result};

/// A `did:key` identifier: `did:key:z<base58btc(multicodec || public key)>`.
///
/// Only constructible from a valid public key or by parsing text that
/// decodes to one, so every value round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DidKeyIdentifier(String);

impl DidKeyIdentifier {
    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The multibase-encoded key after the `did:key:` scheme.
    pub fn multibase(&self) -> &str {
        &self.0[DID_KEY_SCHEME.len()..]
    }

    /// Decode the algorithm and public key this identifier names.
    pub fn public_key(&self) -> Result<PublicKey> {
        let (algorithm, bytes) = codec::decode_identifier(&self.0)?;
        Ok(PublicKey { algorithm, bytes })
    }
}

impl fmt::Display for DidKeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DidKeyIdentifier {
    type Err = DidKeyError;

    fn from_str(s: &str) -> Result<Self> {
        let (algorithm, bytes) = codec::decode_identifier(s)?;
        // Normalise DID URLs (`did:key:z…#z…`) to the bare identifier.
        to_identifier(&bytes, algorithm)
    }
}

impl TryFrom<String> for DidKeyIdentifier {
    type Error = DidKeyError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DidKeyIdentifier> for String {
    fn from(id: DidKeyIdentifier) -> Self {
        id.0
    }
}

/// Format a public key as a `did:key` identifier.
pub fn to_identifier(public_key: &[u8], algorithm: KeyAlgorithm) -> Result<DidKeyIdentifier> {
    let encoded = codec::encode_public_key(algorithm, public_key)?;
    Ok(DidKeyIdentifier(format!("{DID_KEY_SCHEME}{encoded}")))
}

/// Parse a `did:key` identifier into its algorithm and public key bytes.
pub fn from_identifier(text: &str) -> Result<(KeyAlgorithm, Vec<u8>)> {
    codec::decode_identifier(text)
}

/// Resolve an identifier to a validated public key.
///
/// Pure: the key is read out of the identifier itself, no document is
/// fetched.
pub fn resolve_recipient(identifier: &str) -> Result<PublicKey> {
    let (algorithm, bytes) = codec::decode_identifier(identifier)?;
    let key = PublicKey { algorithm, bytes };
    key.validate()?;
    Ok(key)
}

impl KeyPair {
    /// The `did:key` identifier of this key pair.
    pub fn identifier(&self) -> DidKeyIdentifier {
        // Public key length is fixed at construction.
        let encoded = codec::encode_prefixed(self.algorithm(), self.public_key_bytes());
        DidKeyIdentifier(format!("{DID_KEY_SCHEME}{encoded}"))
    }
}

impl PublicKey {
    /// The `did:key` identifier of this public key.
    pub fn identifier(&self) -> Result<DidKeyIdentifier> {
        to_identifier(&self.bytes, self.algorithm)
    }
}
