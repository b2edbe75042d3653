//! Integration tests for the CLI binary.
//!
//! This test is registered as a [[test]] in the didkey-cli crate so that
//! CARGO_BIN_EXE_didkey is available.

use std::path::Path;
use std::process::{Command, Output};

/// Get a Command pointing to the `didkey` binary.
fn didkey_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_didkey"))
}

fn run(args: &[&str]) -> Output {
    didkey_binary()
        .args(args)
        .output()
        .expect("failed to execute didkey")
}

fn run_ok(args: &[&str]) -> Output {
    let output = run(args);
    assert!(
        output.status.success(),
        "didkey {args:?} should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn generate(dir: &Path, name: &str, algorithm: &str) -> (String, String) {
    let path = dir.join(format!("{name}.json"));
    let path = path.to_str().unwrap().to_string();
    run_ok(&["generate", "--algorithm", algorithm, "--output", &path]);
    let material: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let id = material["identifier"].as_str().unwrap().to_string();
    (path, id)
}

#[test]
fn cli_responds_to_help() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Usage") && stdout.contains("pack"),
        "didkey --help output should list subcommands, got: {stdout}"
    );
}

#[test]
fn cli_responds_to_version() {
    let output = run(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("didkey"), "got: {stdout}");
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    assert!(!run(&["--nonexistent-flag"]).status.success());
}

#[test]
fn cli_generate_from_known_seed() {
    let seed = "8f2bbd6bd1a0d82c8d1d1ec7b5e7dcbf8d45e0c2a1bb3ec8b1b07ad5f7b9a1e3";
    let a = run_ok(&["generate", "--seed", seed]);
    let b = run_ok(&["generate", "--seed", seed]);
    assert_eq!(a.stdout, b.stdout, "seeded generation is deterministic");
    let material: serde_json::Value = serde_json::from_slice(&a.stdout).unwrap();
    assert!(material["identifier"]
        .as_str()
        .unwrap()
        .starts_with("did:key:z6Mk"));
}

#[test]
fn cli_generate_unknown_algorithm_fails() {
    let output = run(&["generate", "--algorithm", "unknown-alg"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported algorithm"), "got: {stderr}");
}

#[test]
fn cli_resolve_known_identifier() {
    let output = run_ok(&[
        "resolve",
        "did:key:z6Mkk7yqnGF3YwTrLpqrW6PGsKci7dNqh1CjnvMbzrMerSeL",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ed25519"));
}

#[test]
fn cli_resolve_malformed_identifier_fails() {
    assert!(!run(&["resolve", "did:key:nope"]).status.success());
}

#[test]
fn cli_document_lists_key_agreement() {
    let output = run_ok(&[
        "document",
        "did:key:z6Mkk7yqnGF3YwTrLpqrW6PGsKci7dNqh1CjnvMbzrMerSeL",
    ]);
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        doc["keyAgreement"][0],
        "did:key:z6Mkk7yqnGF3YwTrLpqrW6PGsKci7dNqh1CjnvMbzrMerSeL#z6LSrdqo4M24WRDJj1h2hXxgtDTyzjjKCiyapYVgrhwZAySn"
    );
}

#[test]
fn cli_sign_and_verify() {
    let dir = tempfile::tempdir().unwrap();
    let (key, id) = generate(dir.path(), "signer", "ed25519");
    let signed = dir.path().join("signed.json");
    let signed = signed.to_str().unwrap();

    run_ok(&["sign", "--key", &key, "--message", "hello", "--output", signed]);
    let output = run_ok(&["verify", signed]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("valid") && stdout.contains(&id));
    assert!(stdout.contains("Ed25519"), "{stdout}");

    let mut message: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(signed).unwrap()).unwrap();
    message["payload"] = serde_json::json!("aGVsbG9v");
    std::fs::write(signed, message.to_string()).unwrap();
    assert!(!run(&["verify", signed]).status.success());
}

#[test]
fn cli_pack_and_unpack() {
    let dir = tempfile::tempdir().unwrap();
    let (alice_key, alice_id) = generate(dir.path(), "alice", "x25519");
    let (bob_key, bob_id) = generate(dir.path(), "bob", "x25519");
    let (eve_key, _) = generate(dir.path(), "eve", "x25519");
    let sealed = dir.path().join("sealed.json");
    let sealed = sealed.to_str().unwrap();

    run_ok(&[
        "pack", "--to", &bob_id, "--from", &alice_key, "--enc", "a256gcm", "--message",
        "Hello, World!", "--output", sealed,
    ]);

    let output = run_ok(&["unpack", "--key", &bob_key, sealed]);
    assert_eq!(output.stdout, b"Hello, World!");
    assert!(String::from_utf8_lossy(&output.stderr).contains(&alice_id));

    let output = run(&["unpack", "--key", &eve_key, sealed]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not among the message recipients"));
}

#[test]
fn cli_pack_to_signing_only_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, ed_id) = generate(dir.path(), "ed", "ed25519");
    assert!(!run(&["pack", "--to", &ed_id, "--message", "x"]).status.success());
}
