//! Key derivation using HKDF-SHA256.
//!
//! Derives single-use key-encryption keys from ECDH shared secrets. The
//! `info` input binds each derived key to the algorithm label, the
//! ephemeral public key, the recipient, and (for authenticated packing) the
//! sender, so no two recipient entries ever share a wrapping key.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{DidKeyError, Result};

/// Domain-separation prefix for every derived key.
const CONTEXT_PREFIX: &str = "didkey/v1";

/// Derive a 32-byte key from input keying material and context.
///
/// Uses HKDF-SHA256 (RFC 5869) with no salt.
pub fn derive_key(ikm: &[u8], info: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    let hk = Hkdf::<Sha256>::new(None, ikm);
    let mut output = Zeroizing::new([0u8; 32]);
    hk.expand(info, output.as_mut())
        .map_err(|e| DidKeyError::KeyGenerationFailed(format!("HKDF expand failed: {e}")))?;
    Ok(output)
}

/// Build the HKDF info for wrapping a content key to one recipient.
///
/// Variable-length fields are length-prefixed so distinct inputs can never
/// serialize to the same context.
pub fn key_wrap_context(alg: &str, epk: &[u8], recipient_kid: &str, sender_kid: Option<&str>) -> Vec<u8> {
    let mut info = Vec::with_capacity(128);
    for field in [
        CONTEXT_PREFIX.as_bytes(),
        alg.as_bytes(),
        epk,
        recipient_kid.as_bytes(),
        sender_kid.unwrap_or_default().as_bytes(),
    ] {
        info.extend_from_slice(&(field.len() as u32).to_be_bytes());
        info.extend_from_slice(field);
    }
    info
}
