//! Signed messages.
//!
//! A signed message carries the payload, the signature over the payload
//! bytes, and the signer's identifier. The signature algorithm is implied
//! by the identifier, so a verifier needs nothing else.

use serde::{Deserialize, Serialize};

use crate::convert::identifier::{resolve_recipient, DidKeyIdentifier};
use crate::crypto::keys::KeyPair;
use crate::crypto::signing;
use crate::encoding::base64url;
use crate::error::{DidKeyError, Result};

/// A payload plus its detached signature and the signer's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    #[serde(with = "base64url")]
    pub payload: Vec<u8>,
    #[serde(with = "base64url")]
    pub signature: Vec<u8>,
    pub signer: String,
}

impl SignedMessage {
    /// The signer as a parsed identifier.
    pub fn signer_identifier(&self) -> Result<DidKeyIdentifier> {
        self.signer.parse()
    }

    /// See [`verify`].
    pub fn verify(&self) -> Result<()> {
        verify(self)
    }

    /// `true` iff [`verify`] succeeds.
    pub fn is_valid(&self) -> bool {
        verify(self).is_ok()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Sign `payload` with a signing-capable key pair.
pub fn sign(payload: &[u8], signer: &KeyPair) -> Result<SignedMessage> {
    if !signer.algorithm().can_sign() {
        return Err(DidKeyError::UnsupportedAlgorithm(format!(
            "{} keys cannot sign",
            signer.algorithm()
        )));
    }
    let signature = signing::sign(signer, payload)?;
    let signer = signer.identifier();
    log::debug!("signed {} bytes as {signer}", payload.len());
    Ok(SignedMessage {
        payload: payload.to_vec(),
        signature,
        signer: signer.into(),
    })
}

/// Check the signature against the key named by `message.signer`.
///
/// An unparseable signer is [`DidKeyError::MalformedIdentifier`]; a
/// signer that cannot sign is [`DidKeyError::UnsupportedAlgorithm`]; any
/// mismatch is [`DidKeyError::InvalidSignature`].
pub fn verify(message: &SignedMessage) -> Result<()> {
    let key = resolve_recipient(&message.signer)?;
    if !key.algorithm.can_sign() {
        return Err(DidKeyError::UnsupportedAlgorithm(format!(
            "{} keys cannot sign",
            key.algorithm
        )));
    }
    signing::verify(&key, &message.payload, &message.signature)
}
