//! Authenticated encryption of a payload to one or more recipients.
//!
//! The sealed form follows the JWE general JSON layout: one protected
//! header, one content ciphertext, and a recipient entry per key. Each
//! entry carries its own ephemeral public key, so recipients on different
//! curves can share one message.
//!
//! Key wrapping:
//! - anonymous (`ECDH-ES+C20PKW`): `Z = ECDH(epk, recipient)`
//! - authenticated (`ECDH-1PU+C20PKW`):
//!   `Z = ECDH(epk, recipient) || ECDH(sender, recipient)`
//!
//! `KEK = HKDF-SHA256(Z, alg || epk || kid || skid)` and the content key is
//! wrapped under it with ChaCha20-Poly1305. The header's `apv` commits to
//! the full recipient list, and the header itself is the content AAD.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::convert::identifier::{resolve_recipient, DidKeyIdentifier};
use crate::crypto::agreement::diffie_hellman;
use crate::crypto::derivation::{derive_key, key_wrap_context};
use crate::crypto::encryption::{
    decrypt_content, encrypt_content, unwrap_key, wrap_key, ContentEncryption, SealedContent,
};
use crate::crypto::keys::{KeyPair, PublicKey};
use crate::crypto::random::random_key_32;
use crate::encoding::{b64url_decode, b64url_encode, base64url};
use crate::error::{DidKeyError, Result};

/// Media type placed in the protected header.
pub const ENCRYPTED_MEDIA_TYPE: &str = "application/didcomm-encrypted+json";

/// Key management algorithm, named as in the JWE `alg` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyWrapAlgorithm {
    /// Anonymous sender.
    #[serde(rename = "ECDH-ES+C20PKW")]
    EcdhEs,
    /// Authenticated sender.
    #[serde(rename = "ECDH-1PU+C20PKW")]
    Ecdh1Pu,
}

impl KeyWrapAlgorithm {
    fn label(self) -> &'static str {
        match self {
            KeyWrapAlgorithm::EcdhEs => "ECDH-ES+C20PKW",
            KeyWrapAlgorithm::Ecdh1Pu => "ECDH-1PU+C20PKW",
        }
    }
}

/// Options controlling [`pack`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackOptions {
    #[serde(default)]
    pub content_encryption: ContentEncryption,
}

/// Integrity-protected header, carried base64url-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedHeader {
    pub typ: String,
    pub alg: KeyWrapAlgorithm,
    pub enc: ContentEncryption,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skid: Option<String>,
    pub apv: String,
}

/// One recipient's wrapped copy of the content key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientEntry {
    pub kid: String,
    #[serde(with = "base64url")]
    pub encrypted_key: Vec<u8>,
    #[serde(with = "base64url")]
    pub epk: Vec<u8>,
}

/// An encrypted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedMessage {
    pub protected: String,
    pub recipients: Vec<RecipientEntry>,
    #[serde(with = "base64url")]
    pub iv: Vec<u8>,
    #[serde(with = "base64url")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "base64url")]
    pub tag: Vec<u8>,
}

impl SealedMessage {
    /// Decode the protected header.
    pub fn header(&self) -> Result<ProtectedHeader> {
        let bytes = b64url_decode(&self.protected)
            .map_err(|e| DidKeyError::Serialization(format!("protected header: {e}")))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Identifiers of every recipient, in entry order.
    pub fn recipient_ids(&self) -> impl Iterator<Item = &str> {
        self.recipients.iter().map(|r| r.kid.as_str())
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Result of a successful [`unpack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedMessage {
    pub plaintext: Vec<u8>,
    /// The authenticated sender, or `None` for anonymous messages.
    pub sender: Option<DidKeyIdentifier>,
}

/// Encrypt `plaintext` to every identifier in `recipients`.
///
/// With a `sender`, recipients can authenticate who packed the message;
/// without one the message is anonymous. Repeated recipients are collapsed
/// to their first occurrence.
pub fn pack<S: AsRef<str>>(
    plaintext: &[u8],
    sender: Option<&KeyPair>,
    recipients: &[S],
    options: &PackOptions,
) -> Result<SealedMessage> {
    if recipients.is_empty() {
        return Err(DidKeyError::NoRecipients);
    }

    let mut resolved: Vec<(String, PublicKey)> = Vec::with_capacity(recipients.len());
    for recipient in recipients {
        let key = resolve_recipient(recipient.as_ref())?;
        if !key.algorithm.can_agree() {
            return Err(DidKeyError::UnsupportedAlgorithm(format!(
                "recipient {} is a {} key, which cannot be encrypted to",
                recipient.as_ref(),
                key.algorithm
            )));
        }
        if let Some(sender) = sender {
            if sender.algorithm() != key.algorithm {
                return Err(DidKeyError::UnsupportedAlgorithm(format!(
                    "sender key is {}, recipient key is {}",
                    sender.algorithm(),
                    key.algorithm
                )));
            }
        }
        let kid = key.identifier()?.to_string();
        if !resolved.iter().any(|(existing, _)| *existing == kid) {
            resolved.push((kid, key));
        }
    }

    let skid = sender.map(|s| s.identifier().to_string());
    let alg = if sender.is_some() {
        KeyWrapAlgorithm::Ecdh1Pu
    } else {
        KeyWrapAlgorithm::EcdhEs
    };
    let header = ProtectedHeader {
        typ: ENCRYPTED_MEDIA_TYPE.to_string(),
        alg,
        enc: options.content_encryption,
        skid: skid.clone(),
        apv: recipients_digest(resolved.iter().map(|(kid, _)| kid.as_str())),
    };
    let protected = b64url_encode(&serde_json::to_vec(&header)?);

    let cek = Zeroizing::new(random_key_32()?);
    let content = encrypt_content(
        options.content_encryption,
        &cek,
        protected.as_bytes(),
        plaintext,
    )?;

    let mut entries = Vec::with_capacity(resolved.len());
    for (kid, key) in &resolved {
        let ephemeral = KeyPair::generate(key.algorithm)?;
        let mut ikm = Zeroizing::new(diffie_hellman(&ephemeral, key)?.to_vec());
        if let Some(sender) = sender {
            ikm.extend_from_slice(diffie_hellman(sender, key)?.as_slice());
        }
        let epk = ephemeral.public_key_bytes().to_vec();
        let info = key_wrap_context(alg.label(), &epk, kid, skid.as_deref());
        let kek = derive_key(&ikm, &info)?;
        entries.push(RecipientEntry {
            kid: kid.clone(),
            encrypted_key: wrap_key(&kek, &cek, kid.as_bytes())?,
            epk,
        });
    }

    log::debug!(
        "packed {} bytes to {} recipient(s), {}",
        plaintext.len(),
        entries.len(),
        if sender.is_some() { "authenticated" } else { "anonymous" }
    );

    Ok(SealedMessage {
        protected,
        recipients: entries,
        iv: content.iv,
        ciphertext: content.ciphertext,
        tag: content.tag,
    })
}

/// Decrypt a sealed message with one recipient's key pair.
///
/// Fails with [`DidKeyError::NoMatchingRecipient`] if the key pair is not
/// addressed. Once an entry is found, every failure (header, key
/// agreement, unwrap, or content tag) is reported as the single
/// [`DidKeyError::AuthenticationFailed`].
pub fn unpack(sealed: &SealedMessage, recipient: &KeyPair) -> Result<UnpackedMessage> {
    let kid = recipient.identifier();
    let entry = sealed
        .recipients
        .iter()
        .find(|entry| entry.kid == kid.as_str())
        .ok_or(DidKeyError::NoMatchingRecipient)?;

    open(sealed, entry, recipient).map_err(|e| {
        log::debug!("unpack for {kid} rejected: {e}");
        DidKeyError::AuthenticationFailed
    })
}

fn open(
    sealed: &SealedMessage,
    entry: &RecipientEntry,
    recipient: &KeyPair,
) -> Result<UnpackedMessage> {
    let header = sealed.header()?;
    if header.apv != recipients_digest(sealed.recipient_ids()) {
        return Err(DidKeyError::AuthenticationFailed);
    }

    let sender = match (&header.alg, &header.skid) {
        (KeyWrapAlgorithm::Ecdh1Pu, Some(skid)) => {
            let id: DidKeyIdentifier = skid.parse()?;
            let key = resolve_recipient(skid)?;
            Some((id, key))
        }
        (KeyWrapAlgorithm::EcdhEs, None) => None,
        _ => return Err(DidKeyError::AuthenticationFailed),
    };

    let epk = PublicKey {
        algorithm: recipient.algorithm(),
        bytes: entry.epk.clone(),
    };
    epk.validate()?;

    let mut ikm = Zeroizing::new(diffie_hellman(recipient, &epk)?.to_vec());
    if let Some((_, sender_key)) = &sender {
        ikm.extend_from_slice(diffie_hellman(recipient, sender_key)?.as_slice());
    }
    let info = key_wrap_context(
        header.alg.label(),
        &entry.epk,
        &entry.kid,
        header.skid.as_deref(),
    );
    let kek = derive_key(&ikm, &info)?;
    let cek = unwrap_key(&kek, &entry.encrypted_key, entry.kid.as_bytes())?;

    let content = SealedContent {
        iv: sealed.iv.clone(),
        ciphertext: sealed.ciphertext.clone(),
        tag: sealed.tag.clone(),
    };
    let plaintext = decrypt_content(header.enc, &cek, sealed.protected.as_bytes(), &content)?;

    log::debug!("unpacked {} bytes for {}", plaintext.len(), entry.kid);
    Ok(UnpackedMessage {
        plaintext,
        sender: sender.map(|(id, _)| id),
    })
}

/// `apv`: base64url(SHA-256(kid_1 "." kid_2 "." …)).
fn recipients_digest<'a>(kids: impl Iterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for (i, kid) in kids.enumerate() {
        if i > 0 {
            hasher.update(b".");
        }
        hasher.update(kid.as_bytes());
    }
    b64url_encode(&hasher.finalize())
}
