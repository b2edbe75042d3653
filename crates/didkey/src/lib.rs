//! didkey: cryptographic core of a `did:key` identity provider.
//!
//! Generates key pairs, encodes their public halves as `did:key`
//! identifiers, expands identifiers into DID documents, and provides
//! DIDComm-style authenticated encryption (pack/unpack) and signing
//! (sign/verify). The [`boundary`] module exposes all of it as a JSON
//! request/response seam for host-language bindings.
//!
//! Every operation is synchronous and stateless, and is safe to call
//! from many threads at once.

pub mod algorithm;
pub mod boundary;
pub mod codec;
pub mod convert;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod message;

// Re-export primary types
pub use algorithm::KeyAlgorithm;
pub use codec::{decode_identifier, encode_public_key, EncodedKey};
pub use error::{DidKeyError, ErrorCode, Result};

pub use convert::{
    from_identifier, resolve_document, resolve_recipient, to_document, to_identifier, DidDocument,
    DidKeyIdentifier, DocumentConfig, KeyMaterial,
};
pub use crypto::encryption::ContentEncryption;
pub use crypto::keys::{KeyPair, PublicKey};

pub use message::{
    pack, sign, unpack, verify, PackOptions, SealedMessage, SignedMessage, UnpackedMessage,
};
