//! Edge case tests: tampering, malformed identifiers, odd payload sizes,
//! recipient handling, and the JSON boundary.

use didkey::boundary::handle_json;
use didkey::codec::encode_varint;
use didkey::{
    decode_identifier, encode_public_key, from_identifier, pack, resolve_recipient, sign, unpack,
    ContentEncryption, DidKeyError, KeyAlgorithm, KeyPair, PackOptions, SignedMessage,
};

fn x25519() -> KeyPair {
    KeyPair::generate(KeyAlgorithm::X25519).unwrap()
}

// === Tamper sensitivity ===

#[test]
fn edge_every_ciphertext_and_tag_bit_flip_fails() {
    for enc in [ContentEncryption::XChaCha20Poly1305, ContentEncryption::Aes256Gcm] {
        let recipient = x25519();
        let options = PackOptions {
            content_encryption: enc,
        };
        let sealed = pack(b"tamper me", None, &[recipient.identifier().as_str()], &options).unwrap();

        for byte in 0..sealed.ciphertext.len() {
            for bit in 0..8 {
                let mut tampered = sealed.clone();
                tampered.ciphertext[byte] ^= 1 << bit;
                assert!(
                    matches!(unpack(&tampered, &recipient), Err(DidKeyError::AuthenticationFailed)),
                    "ciphertext byte {byte} bit {bit} ({enc:?})"
                );
            }
        }
        for byte in 0..sealed.tag.len() {
            for bit in 0..8 {
                let mut tampered = sealed.clone();
                tampered.tag[byte] ^= 1 << bit;
                assert!(
                    matches!(unpack(&tampered, &recipient), Err(DidKeyError::AuthenticationFailed)),
                    "tag byte {byte} bit {bit} ({enc:?})"
                );
            }
        }
    }
}

#[test]
fn edge_tampered_iv_wrapped_key_and_epk_fail_alike() {
    let recipient = x25519();
    let sealed = pack(b"x", None, &[recipient.identifier().as_str()], &PackOptions::default()).unwrap();

    let mut iv = sealed.clone();
    iv.iv[0] ^= 1;
    let mut wrapped = sealed.clone();
    wrapped.recipients[0].encrypted_key[5] ^= 1;
    let mut epk = sealed.clone();
    epk.recipients[0].epk[7] ^= 1;
    let mut truncated = sealed.clone();
    truncated.tag.pop();
    let mut header = sealed.clone();
    header.protected.push('A');

    for (name, message) in [
        ("iv", iv),
        ("wrapped key", wrapped),
        ("epk", epk),
        ("truncated tag", truncated),
        ("header", header),
    ] {
        assert!(
            matches!(unpack(&message, &recipient), Err(DidKeyError::AuthenticationFailed)),
            "{name} tampering should be an authentication failure"
        );
    }
}

#[test]
fn edge_renamed_recipient_entry_is_not_a_match() {
    let bob = x25519();
    let eve = x25519();
    let mut sealed = pack(b"x", None, &[bob.identifier().as_str()], &PackOptions::default()).unwrap();
    sealed.recipients[0].kid = eve.identifier().to_string();
    assert!(matches!(unpack(&sealed, &bob), Err(DidKeyError::NoMatchingRecipient)));
    assert!(matches!(unpack(&sealed, &eve), Err(DidKeyError::AuthenticationFailed)));
}

// === Payload sizes ===

#[test]
fn edge_empty_and_large_payloads() {
    let recipient = x25519();
    let id = recipient.identifier().to_string();
    for size in [0usize, 1, 64 * 1024, 1024 * 1024] {
        let payload: Vec<u8> = (0..size).map(|i| (i * 31 % 256) as u8).collect();
        let sealed = pack(&payload, None, &[&id], &PackOptions::default()).unwrap();
        assert_eq!(sealed.ciphertext.len(), size);
        assert_eq!(unpack(&sealed, &recipient).unwrap().plaintext, payload);
    }
}

// === Identifiers ===

#[test]
fn edge_identifier_round_trip_every_algorithm() {
    for alg in KeyAlgorithm::ALL {
        for _ in 0..20 {
            let kp = KeyPair::generate(alg).unwrap();
            assert_eq!(kp.public_key_bytes().len(), alg.public_key_len());
            let (decoded_alg, bytes) = from_identifier(kp.identifier().as_str()).unwrap();
            assert_eq!(decoded_alg, alg);
            assert_eq!(bytes, kp.public_key_bytes());
        }
    }
}

#[test]
fn edge_codec_round_trip_arbitrary_bytes() {
    for alg in KeyAlgorithm::ALL {
        for fill in [0x00u8, 0x01, 0x7f, 0x80, 0xff] {
            let bytes = vec![fill; alg.public_key_len()];
            let encoded = encode_public_key(alg, &bytes).unwrap();
            let decoded = decode_identifier(&format!("did:key:{encoded}")).unwrap();
            assert_eq!(decoded, (alg, bytes));
        }
    }
}

#[test]
fn edge_structurally_valid_but_invalid_points_rejected_on_resolve() {
    // All-zero X25519 and an off-curve P-256 x-coordinate.
    let zero_x = encode_public_key(KeyAlgorithm::X25519, &[0u8; 32]).unwrap();
    let mut p256 = vec![0x02u8];
    p256.extend_from_slice(&[0xffu8; 32]);
    let bad_p256 = encode_public_key(KeyAlgorithm::P256, &p256).unwrap();

    for encoded in [zero_x, bad_p256] {
        let id = format!("did:key:{encoded}");
        assert!(decode_identifier(&id).is_ok(), "structure is fine");
        assert!(
            matches!(resolve_recipient(&id), Err(DidKeyError::MalformedIdentifier(_))),
            "{id} should not resolve"
        );
    }
}

#[test]
fn edge_trailing_bytes_after_key_rejected() {
    let mut data = encode_varint(0xed);
    data.extend_from_slice(&[9u8; 33]);
    let id = format!("did:key:z{}", bs58::encode(data).into_string());
    assert!(matches!(
        decode_identifier(&id),
        Err(DidKeyError::MalformedIdentifier(_))
    ));
}

// === Signatures ===

#[test]
fn edge_signature_replaced_with_other_algorithm_signature() {
    let ed = KeyPair::generate(KeyAlgorithm::Ed25519).unwrap();
    let p = KeyPair::generate(KeyAlgorithm::P256).unwrap();
    let mut signed = sign(b"cross", &ed).unwrap();
    signed.signature = sign(b"cross", &p).unwrap().signature;
    assert!(matches!(signed.verify(), Err(DidKeyError::InvalidSignature)));
}

#[test]
fn edge_x25519_signer_is_unsupported_on_verify() {
    let ed = KeyPair::generate(KeyAlgorithm::Ed25519).unwrap();
    let mut signed = sign(b"x", &ed).unwrap();
    signed.signer = x25519().identifier().to_string();
    assert!(matches!(
        signed.verify(),
        Err(DidKeyError::UnsupportedAlgorithm(_))
    ));
}

#[test]
fn edge_signed_message_with_bad_base64_fails_to_parse() {
    let json = r#"{"payload":"***","signature":"","signer":"did:key:z"}"#;
    assert!(SignedMessage::from_json(json).is_err());
}

// === Boundary ===

#[test]
fn edge_boundary_missing_fields_are_invalid_requests() {
    for request in [
        r#"{}"#,
        r#"{"op":"generate"}"#,
        r#"{"op":"pack","plaintext":"aGk"}"#,
        r#"{"op":"sign","payload":"aGk","signer":{"algorithm":"Ed25519"}}"#,
        r#"{"op":"verify","message":{"payload":"!!","signature":"","signer":""}}"#,
    ] {
        let response: serde_json::Value = serde_json::from_str(&handle_json(request)).unwrap();
        assert_eq!(response["status"], "error", "{request}");
        assert_eq!(response["code"], "InvalidRequest", "{request}");
    }
}

#[test]
fn edge_boundary_seed_of_wrong_length() {
    let response: serde_json::Value = serde_json::from_str(&handle_json(
        r#"{"op":"generate","algorithm":"Ed25519","seed":"AAAA"}"#,
    ))
    .unwrap();
    assert_eq!(response["code"], "KeyGenerationFailed");
}
