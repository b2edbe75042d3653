//! Multicodec and multibase encoding of public keys.
//!
//! A did:key public key is encoded as
//! `z` + base58btc(varint(multicodec) || raw public key bytes). This module
//! owns that encoding and its strict inverse; it knows nothing about key
//! generation or message formats.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::algorithm::KeyAlgorithm;
use crate::error::{DidKeyError, Result};

/// Scheme prefix of a did:key identifier.
pub const DID_KEY_SCHEME: &str = "did:key:";

/// Multibase marker for base58-btc.
pub const MULTIBASE_BASE58BTC: char = 'z';

/// Longest unsigned varint we accept (enough for a u64).
const MAX_VARINT_LEN: usize = 9;

/// Multibase-encoded public key, e.g. `z6Mk…`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedKey(String);

impl EncodedKey {
    /// Borrow the multibase text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the multibase text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode `value` as an unsigned LEB128 varint.
pub fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(2);
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

/// Decode an unsigned LEB128 varint from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed. Truncated,
/// overlong, and non-minimal encodings are rejected.
pub fn decode_varint(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if i >= MAX_VARINT_LEN {
            return Err(DidKeyError::MalformedIdentifier(
                "multicodec varint too long".into(),
            ));
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            if byte == 0 && i > 0 {
                return Err(DidKeyError::MalformedIdentifier(
                    "multicodec varint not minimally encoded".into(),
                ));
            }
            return Ok((value, i + 1));
        }
    }
    Err(DidKeyError::MalformedIdentifier(
        "truncated multicodec varint".into(),
    ))
}

/// Prefix `bytes` with the algorithm's multicodec varint and encode as
/// base58-btc multibase.
pub fn encode_public_key(alg: KeyAlgorithm, bytes: &[u8]) -> Result<EncodedKey> {
    if bytes.len() != alg.public_key_len() {
        return Err(DidKeyError::MalformedIdentifier(format!(
            "{alg} public key must be {} bytes, got {}",
            alg.public_key_len(),
            bytes.len()
        )));
    }
    Ok(encode_prefixed(alg, bytes))
}

/// Encode a public key whose length the caller has already checked.
pub(crate) fn encode_prefixed(alg: KeyAlgorithm, bytes: &[u8]) -> EncodedKey {
    let mut data = encode_varint(alg.multicodec());
    data.extend_from_slice(bytes);
    let encoded = bs58::encode(data).into_string();
    EncodedKey(format!("{MULTIBASE_BASE58BTC}{encoded}"))
}

/// Decode a bare multibase key (`z…`) into its algorithm and raw bytes.
pub fn decode_multibase(text: &str) -> Result<(KeyAlgorithm, Vec<u8>)> {
    let body = text
        .strip_prefix(MULTIBASE_BASE58BTC)
        .ok_or_else(|| DidKeyError::MalformedIdentifier("expected base58btc multibase 'z'".into()))?;

    let data = bs58::decode(body)
        .into_vec()
        .map_err(|e| DidKeyError::MalformedIdentifier(format!("invalid base58btc: {e}")))?;

    let (code, read) = decode_varint(&data)?;
    let alg = KeyAlgorithm::from_multicodec(code).ok_or_else(|| {
        DidKeyError::MalformedIdentifier(format!("unknown multicodec 0x{code:x}"))
    })?;

    let key = &data[read..];
    if key.len() != alg.public_key_len() {
        return Err(DidKeyError::MalformedIdentifier(format!(
            "{alg} public key must be {} bytes, got {}",
            alg.public_key_len(),
            key.len()
        )));
    }
    Ok((alg, key.to_vec()))
}

/// Decode a `did:key` identifier (optionally a DID URL whose fragment names
/// the same key) into its algorithm and raw public key bytes.
pub fn decode_identifier(text: &str) -> Result<(KeyAlgorithm, Vec<u8>)> {
    let rest = text
        .strip_prefix(DID_KEY_SCHEME)
        .ok_or_else(|| DidKeyError::MalformedIdentifier("missing did:key: scheme".into()))?;

    let method_id = match rest.split_once('#') {
        Some((id, fragment)) => {
            if fragment != id {
                return Err(DidKeyError::MalformedIdentifier(
                    "fragment does not name the identifier's key".into(),
                ));
            }
            id
        }
        None => rest,
    };

    decode_multibase(method_id)
}
