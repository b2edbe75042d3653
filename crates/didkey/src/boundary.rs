//! Request/response seam for host-language bindings.
//!
//! A request is a JSON object tagged by `"op"`; every request produces
//! exactly one JSON response:
//!
//! ```json
//! { "status": "ok", "result": { ... } }
//! { "status": "error", "code": "NoMatchingRecipient", "message": "..." }
//! ```
//!
//! Binary fields are unpadded base64url. Secret inputs are zeroized before
//! the call returns.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::algorithm::KeyAlgorithm;
use crate::convert::{
    resolve_document, resolve_recipient, to_identifier, DocumentConfig, KeyMaterial,
};
use crate::crypto::keys::KeyPair;
use crate::encoding::{b64url_decode, base64url};
use crate::error::{DidKeyError, ErrorCode, Result};
use crate::message::{self, PackOptions, SealedMessage, SignedMessage};

/// A typed boundary request.
#[derive(Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Generate a key pair; with `seed` (base64url, 32 bytes) derive it.
    Generate {
        algorithm: String,
        #[serde(default)]
        seed: Option<String>,
    },
    /// Format a raw public key as an identifier.
    Identifier {
        algorithm: String,
        #[serde(with = "base64url")]
        public_key: Vec<u8>,
    },
    /// Decode an identifier to its algorithm and public key.
    Resolve { identifier: String },
    /// Expand an identifier into a DID document.
    Document {
        identifier: String,
        #[serde(default)]
        config: DocumentConfig,
    },
    Pack {
        #[serde(with = "base64url")]
        plaintext: Vec<u8>,
        #[serde(default)]
        sender: Option<KeyMaterial>,
        recipients: Vec<String>,
        #[serde(default)]
        options: PackOptions,
    },
    Unpack {
        message: SealedMessage,
        recipient: KeyMaterial,
    },
    Sign {
        #[serde(with = "base64url")]
        payload: Vec<u8>,
        signer: KeyMaterial,
    },
    Verify { message: SignedMessage },
}

/// A boundary response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok { result: serde_json::Value },
    Error { code: ErrorCode, message: String },
}

impl Response {
    fn from_result(result: Result<serde_json::Value>) -> Self {
        match result {
            Ok(result) => Response::Ok { result },
            Err(e) => Response::Error {
                code: e.code(),
                message: e.to_string(),
            },
        }
    }
}

#[derive(Serialize)]
struct ResolvedKey {
    algorithm: KeyAlgorithm,
    #[serde(with = "base64url")]
    public_key: Vec<u8>,
}

#[derive(Serialize)]
struct Unpacked {
    #[serde(with = "base64url")]
    plaintext: Vec<u8>,
    sender: Option<String>,
}

/// Dispatch a typed request.
pub fn handle(request: Request) -> Result<serde_json::Value> {
    match request {
        Request::Generate {
            algorithm,
            mut seed,
        } => {
            let algorithm: KeyAlgorithm = algorithm.parse()?;
            let decoded = seed.as_deref().map(decode_secret).transpose();
            seed.zeroize();
            let key_pair = match decoded? {
                Some(seed) => KeyPair::from_seed(algorithm, &seed)?,
                None => KeyPair::generate(algorithm)?,
            };
            to_value(&KeyMaterial::from_key_pair(&key_pair))
        }
        Request::Identifier {
            algorithm,
            public_key,
        } => {
            let id = to_identifier(&public_key, algorithm.parse()?)?;
            Ok(serde_json::json!({ "identifier": id }))
        }
        Request::Resolve { identifier } => {
            let key = resolve_recipient(&identifier)?;
            to_value(&ResolvedKey {
                algorithm: key.algorithm,
                public_key: key.bytes,
            })
        }
        Request::Document { identifier, config } => {
            to_value(&resolve_document(&identifier, &config)?)
        }
        Request::Pack {
            plaintext,
            sender,
            recipients,
            options,
        } => {
            let sender = sender.as_ref().map(KeyMaterial::to_key_pair).transpose()?;
            to_value(&message::pack(
                &plaintext,
                sender.as_ref(),
                &recipients,
                &options,
            )?)
        }
        Request::Unpack {
            message: sealed,
            recipient,
        } => {
            let recipient = recipient.to_key_pair()?;
            let opened = message::unpack(&sealed, &recipient)?;
            to_value(&Unpacked {
                plaintext: opened.plaintext,
                sender: opened.sender.map(String::from),
            })
        }
        Request::Sign { payload, signer } => {
            to_value(&message::sign(&payload, &signer.to_key_pair()?)?)
        }
        Request::Verify { message: signed } => {
            message::verify(&signed)?;
            Ok(serde_json::json!({ "valid": true }))
        }
    }
}

/// Parse, dispatch, and serialize one request. Never fails: malformed
/// requests produce an `InvalidRequest` error response.
pub fn handle_json(request: &str) -> String {
    let response = match serde_json::from_str::<Request>(request) {
        Ok(request) => {
            log::debug!("boundary request: {}", op_name(&request));
            Response::from_result(handle(request))
        }
        Err(e) => Response::Error {
            code: ErrorCode::InvalidRequest,
            message: format!("invalid request: {e}"),
        },
    };
    serde_json::to_string(&response).unwrap_or_else(|_| {
        r#"{"status":"error","code":"InvalidRequest","message":"response serialization failed"}"#
            .to_string()
    })
}

fn op_name(request: &Request) -> &'static str {
    match request {
        Request::Generate { .. } => "generate",
        Request::Identifier { .. } => "identifier",
        Request::Resolve { .. } => "resolve",
        Request::Document { .. } => "document",
        Request::Pack { .. } => "pack",
        Request::Unpack { .. } => "unpack",
        Request::Sign { .. } => "sign",
        Request::Verify { .. } => "verify",
    }
}

fn decode_secret(text: &str) -> Result<Zeroizing<Vec<u8>>> {
    b64url_decode(text)
        .map(Zeroizing::new)
        .map_err(|e| DidKeyError::KeyGenerationFailed(format!("seed is not base64url: {e}")))
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}
