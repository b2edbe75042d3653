//! Error types for didkey.
//!
//! Every operation returns one of a flat set of error kinds. Errors are
//! propagated without panicking and never carry private key material.

use serde::{Deserialize, Serialize};

/// Error kinds covering all core operations.
#[derive(Debug, thiserror::Error)]
pub enum DidKeyError {
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    #[error("Entropy unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    #[error("No recipients supplied")]
    NoRecipients,

    #[error("Key pair is not among the message recipients")]
    NoMatchingRecipient,

    #[error("Message authentication failed")]
    AuthenticationFailed,

    #[error("Signature verification failed")]
    InvalidSignature,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Stable, serializable error code exposed across the call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    UnsupportedAlgorithm,
    MalformedIdentifier,
    EntropyUnavailable,
    KeyGenerationFailed,
    NoRecipients,
    NoMatchingRecipient,
    AuthenticationFailed,
    InvalidSignature,
    InvalidRequest,
}

impl DidKeyError {
    /// Map this error onto its boundary code.
    pub fn code(&self) -> ErrorCode {
        match self {
            DidKeyError::UnsupportedAlgorithm(_) => ErrorCode::UnsupportedAlgorithm,
            DidKeyError::MalformedIdentifier(_) => ErrorCode::MalformedIdentifier,
            DidKeyError::EntropyUnavailable(_) => ErrorCode::EntropyUnavailable,
            DidKeyError::KeyGenerationFailed(_) => ErrorCode::KeyGenerationFailed,
            DidKeyError::NoRecipients => ErrorCode::NoRecipients,
            DidKeyError::NoMatchingRecipient => ErrorCode::NoMatchingRecipient,
            DidKeyError::AuthenticationFailed => ErrorCode::AuthenticationFailed,
            DidKeyError::InvalidSignature => ErrorCode::InvalidSignature,
            DidKeyError::Serialization(_) => ErrorCode::InvalidRequest,
        }
    }
}

impl From<serde_json::Error> for DidKeyError {
    fn from(e: serde_json::Error) -> Self {
        DidKeyError::Serialization(e.to_string())
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, DidKeyError>;
