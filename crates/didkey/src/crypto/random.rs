//! Secure random number generation.
//!
//! Draws from the operating system's cryptographic random source via
//! `rand::rngs::OsRng`. The OS source is thread-safe by construction, so no
//! locking happens here. A failed read surfaces as
//! [`DidKeyError::EntropyUnavailable`] instead of a panic.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{DidKeyError, Result};

/// Fill a buffer with cryptographically secure random bytes.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| DidKeyError::EntropyUnavailable(e.to_string()))
}

/// Generate a fixed-size array of cryptographically secure random bytes.
pub fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    fill_random(&mut buf)?;
    Ok(buf)
}

/// Generate a random 32-byte key (content-encryption keys, seeds).
pub fn random_key_32() -> Result<[u8; 32]> {
    random_bytes()
}

/// Generate a random 24-byte nonce (for XChaCha20-Poly1305).
pub fn random_nonce_24() -> Result<[u8; 24]> {
    random_bytes()
}

/// Generate a random 12-byte nonce (for AES-256-GCM).
pub fn random_nonce_12() -> Result<[u8; 12]> {
    random_bytes()
}
