//! DID document expansion for `did:key` identifiers.
//!
//! A did:key document is derived entirely from the identifier. Signing
//! keys are listed under the authentication and assertion relationships;
//! key-agreement keys under `keyAgreement`. An Ed25519 identity also gets
//! a second verification method for its derived X25519 key, which is what
//! other parties encrypt to.

use p256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};

use crate::algorithm::KeyAlgorithm;
use crate::convert::identifier::DidKeyIdentifier;
use crate::crypto::keys::PublicKey;
use crate::encoding::b64url_encode;
use crate::error::{DidKeyError, Result};

const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";
const MULTIKEY_CONTEXT: &str = "https://w3id.org/security/multikey/v1";
const JWS_2020_CONTEXT: &str = "https://w3id.org/security/suites/jws-2020/v1";

/// Options for document expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Publish keys as `JsonWebKey2020` / `publicKeyJwk` instead of
    /// `Multikey` / `publicKeyMultibase`.
    #[serde(default)]
    pub use_jose_format: bool,
}

/// Public key in JWK form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

/// How a verification method publishes its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyFormat {
    #[serde(rename = "publicKeyMultibase")]
    Multibase(String),
    #[serde(rename = "publicKeyJwk")]
    Jwk(Jwk),
}

/// A verification method entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: String,
    pub controller: String,
    #[serde(flatten)]
    pub public_key: KeyFormat,
}

/// A DID document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    pub verification_method: Vec<VerificationMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_delegation: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_invocation: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_agreement: Vec<String>,
}

impl DidDocument {
    /// Look up a verification method by its full id.
    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == id)
    }
}

/// Expand an identifier into its DID document.
pub fn to_document(identifier: &DidKeyIdentifier, config: &DocumentConfig) -> Result<DidDocument> {
    let did = identifier.as_str().to_string();
    let key = identifier.public_key()?;
    key.validate()?;

    let primary = verification_method(&did, &key, config)?;
    let primary_id = primary.id.clone();
    let mut methods = vec![primary];

    let signing = if key.algorithm.can_sign() {
        vec![primary_id.clone()]
    } else {
        Vec::new()
    };

    let key_agreement = match key.algorithm {
        KeyAlgorithm::Ed25519 => {
            let derived = verification_method(&did, &key.to_x25519()?, config)?;
            let derived_id = derived.id.clone();
            methods.push(derived);
            vec![derived_id]
        }
        _ => vec![primary_id],
    };

    let suite_context = if config.use_jose_format {
        JWS_2020_CONTEXT
    } else {
        MULTIKEY_CONTEXT
    };

    log::debug!(
        "expanded {did} into {} verification method(s)",
        methods.len()
    );

    Ok(DidDocument {
        context: vec![DID_CONTEXT.to_string(), suite_context.to_string()],
        id: did,
        verification_method: methods,
        authentication: signing.clone(),
        assertion_method: signing.clone(),
        capability_delegation: signing.clone(),
        capability_invocation: signing,
        key_agreement,
    })
}

/// Parse an identifier and expand it into its DID document.
pub fn resolve_document(text: &str, config: &DocumentConfig) -> Result<DidDocument> {
    to_document(&text.parse()?, config)
}

fn verification_method(
    controller: &str,
    key: &PublicKey,
    config: &DocumentConfig,
) -> Result<VerificationMethod> {
    let identifier = key.identifier()?;
    let multibase = identifier.multibase().to_string();
    let (key_type, public_key) = if config.use_jose_format {
        ("JsonWebKey2020", KeyFormat::Jwk(to_jwk(key)?))
    } else {
        ("Multikey", KeyFormat::Multibase(multibase.clone()))
    };
    Ok(VerificationMethod {
        id: format!("{controller}#{multibase}"),
        key_type: key_type.to_string(),
        controller: controller.to_string(),
        public_key,
    })
}

/// Render a public key as a JWK.
pub fn to_jwk(key: &PublicKey) -> Result<Jwk> {
    let okp = |crv: &str| Jwk {
        kty: "OKP".into(),
        crv: crv.into(),
        x: b64url_encode(&key.bytes),
        y: None,
    };
    match key.algorithm {
        KeyAlgorithm::Ed25519 => Ok(okp("Ed25519")),
        KeyAlgorithm::X25519 => Ok(okp("X25519")),
        KeyAlgorithm::P256 => {
            let point = p256::PublicKey::from_sec1_bytes(&key.bytes)
                .map_err(|_| DidKeyError::MalformedIdentifier("invalid P-256 point".into()))?
                .to_encoded_point(false);
            ec_jwk("P-256", point.x().map(|x| x.as_slice()), point.y().map(|y| y.as_slice()))
        }
        KeyAlgorithm::Secp256k1 => {
            let point = k256::PublicKey::from_sec1_bytes(&key.bytes)
                .map_err(|_| DidKeyError::MalformedIdentifier("invalid secp256k1 point".into()))?
                .to_encoded_point(false);
            ec_jwk("secp256k1", point.x().map(|x| x.as_slice()), point.y().map(|y| y.as_slice()))
        }
    }
}

fn ec_jwk(crv: &str, x: Option<&[u8]>, y: Option<&[u8]>) -> Result<Jwk> {
    match (x, y) {
        (Some(x), Some(y)) => Ok(Jwk {
            kty: "EC".into(),
            crv: crv.into(),
            x: b64url_encode(x),
            y: Some(b64url_encode(y)),
        }),
        _ => Err(DidKeyError::MalformedIdentifier(format!(
            "{crv} point at infinity has no coordinates"
        ))),
    }
}
