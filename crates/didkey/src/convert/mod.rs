//! Conversions between raw keys, `did:key` identifiers, and DID documents.

pub mod document;
pub mod identifier;
pub mod material;

pub use document::{resolve_document, to_document, DidDocument, DocumentConfig};
pub use identifier::{from_identifier, resolve_recipient, to_identifier, DidKeyIdentifier};
pub use material::KeyMaterial;
