//! Message-level operations: sealed (encrypted) and signed messages.

pub mod pack;
pub mod sign;

pub use pack::{
    pack, unpack, KeyWrapAlgorithm, PackOptions, ProtectedHeader, RecipientEntry, SealedMessage,
    UnpackedMessage,
};
pub use sign::{sign, verify, SignedMessage};
