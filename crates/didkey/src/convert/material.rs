//! Serializable key material for callers that hold keys outside the process.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::algorithm::KeyAlgorithm;
use crate::crypto::keys::KeyPair;
use crate::encoding::base64url;
use crate::error::{DidKeyError, Result};

/// A key pair in transportable form.
///
/// The secret is zeroized on drop. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    #[zeroize(skip)]
    pub algorithm: KeyAlgorithm,
    pub identifier: String,
    #[serde(with = "base64url")]
    pub public_key: Vec<u8>,
    #[serde(with = "base64url")]
    pub secret_key: Vec<u8>,
}

impl KeyMaterial {
    /// Export a key pair.
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        Self {
            algorithm: key_pair.algorithm(),
            identifier: key_pair.identifier().into(),
            public_key: key_pair.public_key_bytes().to_vec(),
            secret_key: key_pair.secret_key_bytes().to_vec(),
        }
    }

    /// Rebuild the key pair, checking that the stored public half matches
    /// the secret.
    pub fn to_key_pair(&self) -> Result<KeyPair> {
        let key_pair = KeyPair::from_seed(self.algorithm, &self.secret_key)?;
        if key_pair.public_key_bytes() != self.public_key.as_slice()
            || key_pair.identifier().as_str() != self.identifier
        {
            return Err(DidKeyError::MalformedIdentifier(
                "key material does not match its secret key".into(),
            ));
        }
        Ok(key_pair)
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algorithm", &self.algorithm)
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}
