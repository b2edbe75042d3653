//! Authenticated encryption for packed messages.
//!
//! Content is sealed with XChaCha20-Poly1305 (default) or AES-256-GCM under
//! a random content-encryption key (CEK). The CEK is wrapped per recipient
//! with ChaCha20-Poly1305 under a single-use key-encryption key (KEK), so a
//! fixed all-zero nonce is safe for the wrap.
//!
//! Every decryption failure collapses into
//! [`DidKeyError::AuthenticationFailed`].

use aes_gcm::Aes256Gcm;
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, XChaCha20Poly1305,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::random::{random_nonce_12, random_nonce_24};
use crate::error::{DidKeyError, Result};

/// Poly1305 and GHASH tags are both 16 bytes.
pub const TAG_LEN: usize = 16;

/// Length of a wrapped 32-byte content key.
pub const WRAPPED_KEY_LEN: usize = 32 + TAG_LEN;

const WRAP_NONCE: [u8; 12] = [0u8; 12];

/// Content encryption algorithm, named as in the JWE `enc` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentEncryption {
    #[default]
    #[serde(rename = "XC20P")]
    XChaCha20Poly1305,
    #[serde(rename = "A256GCM")]
    Aes256Gcm,
}

impl ContentEncryption {
    /// Nonce length used by the cipher.
    pub fn nonce_len(self) -> usize {
        match self {
            ContentEncryption::XChaCha20Poly1305 => 24,
            ContentEncryption::Aes256Gcm => 12,
        }
    }
}

/// Output of content encryption.
#[derive(Debug, Clone)]
pub struct SealedContent {
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Encrypt `plaintext` under `cek`, authenticating `aad`.
pub fn encrypt_content(
    enc: ContentEncryption,
    cek: &[u8; 32],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<SealedContent> {
    let payload = Payload { msg: plaintext, aad };
    let (iv, mut ciphertext) = match enc {
        ContentEncryption::XChaCha20Poly1305 => {
            let iv = random_nonce_24()?;
            let cipher = XChaCha20Poly1305::new(cek.into());
            let out = cipher
                .encrypt((&iv).into(), payload)
                .map_err(|e| DidKeyError::Serialization(format!("content encrypt: {e}")))?;
            (iv.to_vec(), out)
        }
        ContentEncryption::Aes256Gcm => {
            let iv = random_nonce_12()?;
            let cipher = Aes256Gcm::new(cek.into());
            let out = cipher
                .encrypt((&iv).into(), payload)
                .map_err(|e| DidKeyError::Serialization(format!("content encrypt: {e}")))?;
            (iv.to_vec(), out)
        }
    };
    let tag = ciphertext.split_off(ciphertext.len() - TAG_LEN);
    Ok(SealedContent {
        iv,
        ciphertext,
        tag,
    })
}

/// Decrypt and authenticate content sealed by [`encrypt_content`].
pub fn decrypt_content(
    enc: ContentEncryption,
    cek: &[u8; 32],
    aad: &[u8],
    sealed: &SealedContent,
) -> Result<Vec<u8>> {
    if sealed.iv.len() != enc.nonce_len() || sealed.tag.len() != TAG_LEN {
        return Err(DidKeyError::AuthenticationFailed);
    }
    let mut combined = Vec::with_capacity(sealed.ciphertext.len() + TAG_LEN);
    combined.extend_from_slice(&sealed.ciphertext);
    combined.extend_from_slice(&sealed.tag);
    let payload = Payload {
        msg: &combined,
        aad,
    };
    let result = match enc {
        ContentEncryption::XChaCha20Poly1305 => {
            XChaCha20Poly1305::new(cek.into()).decrypt(sealed.iv.as_slice().into(), payload)
        }
        ContentEncryption::Aes256Gcm => {
            Aes256Gcm::new(cek.into()).decrypt(sealed.iv.as_slice().into(), payload)
        }
    };
    result.map_err(|_| DidKeyError::AuthenticationFailed)
}

/// Wrap a content key under a single-use key-encryption key.
pub fn wrap_key(kek: &[u8; 32], cek: &[u8; 32], aad: &[u8]) -> Result<Vec<u8>> {
    ChaCha20Poly1305::new(kek.into())
        .encrypt((&WRAP_NONCE).into(), Payload { msg: cek, aad })
        .map_err(|e| DidKeyError::Serialization(format!("key wrap: {e}")))
}

/// Unwrap a content key. Any failure is an authentication failure.
pub fn unwrap_key(kek: &[u8; 32], wrapped: &[u8], aad: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    if wrapped.len() != WRAPPED_KEY_LEN {
        return Err(DidKeyError::AuthenticationFailed);
    }
    let plain = Zeroizing::new(
        ChaCha20Poly1305::new(kek.into())
            .decrypt((&WRAP_NONCE).into(), Payload { msg: wrapped, aad })
            .map_err(|_| DidKeyError::AuthenticationFailed)?,
    );
    let mut cek = Zeroizing::new([0u8; 32]);
    cek.copy_from_slice(&plain);
    Ok(cek)
}
