//! Integration test: full end-to-end workflow.
//!
//! Tests the complete lifecycle:
//! 1. Generate key pairs and derive identifiers
//! 2. Decode identifiers back into keys and documents
//! 3. Pack a message to several recipients and unpack it
//! 4. Sign a payload and verify it, then tamper with it

use didkey::{
    from_identifier, pack, resolve_document, resolve_recipient, sign, to_identifier, unpack,
    ContentEncryption, DidKeyError, DocumentConfig, KeyAlgorithm, KeyPair, PackOptions,
    SealedMessage, SignedMessage,
};

#[test]
fn full_workflow_generate_pack_sign() {
    // ── Step 1: Generate key pairs ──────────────────────────────────────
    let alice_signing = KeyPair::generate(KeyAlgorithm::Ed25519).expect("ed25519 generation");
    let alice = alice_signing.to_x25519().expect("ed25519 has an x25519 form");
    let bob = KeyPair::generate(KeyAlgorithm::X25519).expect("x25519 generation");
    let carol = KeyPair::generate(KeyAlgorithm::X25519).expect("x25519 generation");

    let alice_did = alice_signing.identifier();
    assert!(alice_did.as_str().starts_with("did:key:z6Mk"));
    assert!(alice.identifier().as_str().starts_with("did:key:z6LS"));

    // ── Step 2: Identifier round trip and document ──────────────────────
    let (alg, public_key) = from_identifier(alice_did.as_str()).expect("decodes");
    assert_eq!(alg, KeyAlgorithm::Ed25519);
    assert_eq!(public_key, alice_signing.public_key_bytes());

    let doc = resolve_document(alice_did.as_str(), &DocumentConfig::default()).expect("document");
    assert_eq!(
        doc.key_agreement,
        vec![format!("{alice_did}#{}", alice.identifier().multibase())],
        "the document advertises the derived X25519 key"
    );

    // ── Step 3: Pack to Bob and Carol, authenticated as Alice ───────────
    let plaintext = b"Hello, World!";
    assert_eq!(plaintext.len(), 13);
    let recipients = [bob.identifier().to_string(), carol.identifier().to_string()];
    let sealed = pack(plaintext, Some(&alice), &recipients, &PackOptions::default())
        .expect("pack should succeed");
    assert_eq!(sealed.recipients.len(), 2);

    // Through JSON, as it would travel.
    let wire = sealed.to_json().unwrap();
    let received = SealedMessage::from_json(&wire).unwrap();

    for recipient in [&bob, &carol] {
        let opened = unpack(&received, recipient).expect("each recipient can unpack");
        assert_eq!(opened.plaintext, plaintext);
        assert_eq!(opened.sender.as_ref(), Some(&alice.identifier()));
    }

    // ── Step 4: Sign and verify ─────────────────────────────────────────
    let signed = sign(b"release v1.0", &alice_signing).expect("sign");
    let wire = signed.to_json().unwrap();
    let mut received = SignedMessage::from_json(&wire).unwrap();
    assert!(received.verify().is_ok());
    assert!(received.verify().is_ok(), "verification is idempotent");

    received.payload[0] ^= 0x20;
    assert!(matches!(received.verify(), Err(DidKeyError::InvalidSignature)));
}

#[test]
fn scenario_ed25519_identifier_decodes() {
    let kp = KeyPair::generate(KeyAlgorithm::Ed25519).unwrap();
    let (alg, bytes) = from_identifier(kp.identifier().as_str()).unwrap();
    assert_eq!(alg, KeyAlgorithm::Ed25519);
    assert_eq!(bytes.len(), 32);
}

#[test]
fn scenario_thirteen_bytes_two_recipients() {
    let bob = KeyPair::generate(KeyAlgorithm::X25519).unwrap();
    let carol = KeyPair::generate(KeyAlgorithm::X25519).unwrap();
    let sealed = pack(
        b"13 byte text!",
        None,
        &[bob.identifier().as_str(), carol.identifier().as_str()],
        &PackOptions::default(),
    )
    .unwrap();
    let from_bob = unpack(&sealed, &bob).unwrap();
    let from_carol = unpack(&sealed, &carol).unwrap();
    assert_eq!(from_bob.plaintext, b"13 byte text!");
    assert_eq!(from_bob, from_carol);
    assert!(from_bob.sender.is_none());
}

#[test]
fn scenario_sign_then_mutate_payload() {
    let kp = KeyPair::generate(KeyAlgorithm::Ed25519).unwrap();
    let mut signed = sign(b"payload", &kp).unwrap();
    assert!(signed.is_valid());
    signed.payload[3] = b'X';
    assert!(matches!(signed.verify(), Err(DidKeyError::InvalidSignature)));
}

#[test]
fn scenario_unknown_algorithm() {
    let result = KeyPair::generate_named("unknown-alg");
    assert!(matches!(result, Err(DidKeyError::UnsupportedAlgorithm(_))));
}

#[test]
fn known_test_vector() {
    let seed = bs58::decode("6Lx39RyWn3syuozAe2WiPdAYn1ctMx17t8yrBMGFBmZy")
        .into_vec()
        .unwrap();
    let kp = KeyPair::from_seed(KeyAlgorithm::Ed25519, &seed).unwrap();
    assert_eq!(
        kp.identifier().as_str(),
        "did:key:z6Mkk7yqnGF3YwTrLpqrW6PGsKci7dNqh1CjnvMbzrMerSeL"
    );
    assert_eq!(
        kp.to_x25519().unwrap().identifier().as_str(),
        "did:key:z6LSrdqo4M24WRDJj1h2hXxgtDTyzjjKCiyapYVgrhwZAySn"
    );
    let expected = to_identifier(kp.public_key_bytes(), KeyAlgorithm::Ed25519).unwrap();
    assert_eq!(kp.identifier(), expected);
}

#[test]
fn every_curve_end_to_end() {
    for alg in [KeyAlgorithm::P256, KeyAlgorithm::Secp256k1] {
        let a = KeyPair::generate(alg).unwrap();
        let b = KeyPair::generate(alg).unwrap();

        let resolved = resolve_recipient(b.identifier().as_str()).unwrap();
        assert_eq!(resolved.algorithm, alg);
        assert_eq!(resolved.bytes.len(), 33);

        let options = PackOptions {
            content_encryption: ContentEncryption::Aes256Gcm,
        };
        let sealed = pack(b"curve", Some(&a), &[b.identifier().as_str()], &options).unwrap();
        assert_eq!(unpack(&sealed, &b).unwrap().plaintext, b"curve");

        assert!(sign(b"curve", &a).unwrap().is_valid(), "{alg}");
    }
}
