//! Cryptographic primitives for didkey.
//!
//! This module provides:
//! - Key pair generation for Ed25519, X25519, P-256 and secp256k1
//! - ECDH key agreement
//! - HKDF-SHA256 key derivation
//! - XChaCha20-Poly1305 / AES-256-GCM content encryption and key wrapping
//! - Ed25519 and ECDSA signing and verification
//! - Cryptographically secure random number generation

pub mod agreement;
pub mod derivation;
pub mod encryption;
pub mod keys;
pub mod random;
pub mod signing;
