//! didkey CLI: `didkey` command.
//!
//! Generate did:key key pairs, resolve identifiers and DID documents, and
//! pack, unpack, sign, and verify messages from the command line. Keys are
//! stored as JSON key files; messages are read and written as JSON.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use didkey::{
    resolve_document, resolve_recipient, ContentEncryption, DocumentConfig, KeyAlgorithm,
    KeyMaterial, KeyPair, PackOptions, SealedMessage, SignedMessage,
};

// ── CLI structure ─────────────────────────────────────────────────────────────

/// didkey: did:key identities and DIDComm-style messages.
#[derive(Parser, Debug)]
#[command(
    name = "didkey",
    about = "did:key identity and messaging CLI",
    version,
    long_about = "didkey: did:key identity and messaging CLI\n\nGenerate key pairs, resolve did:key identifiers and documents,\nand pack, unpack, sign, and verify messages."
)]
struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a key pair and write it as a JSON key file
    Generate {
        /// Key algorithm (ed25519, x25519, p-256, secp256k1)
        #[arg(long, short, default_value = "ed25519")]
        algorithm: String,

        /// Derive from a 32-byte seed (hex) instead of fresh randomness
        #[arg(long)]
        seed: Option<String>,

        /// Output file path (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Decode an identifier into its algorithm and public key
    Resolve {
        /// did:key identifier
        identifier: String,
    },

    /// Print the DID document of an identifier
    Document {
        /// did:key identifier
        identifier: String,

        /// Publish keys as JsonWebKey2020 instead of Multikey
        #[arg(long)]
        jose: bool,
    },

    /// Sign a payload
    Sign {
        /// Signer key file
        #[arg(long, short)]
        key: PathBuf,

        #[command(flatten)]
        input: PayloadInput,

        /// Output file path (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Verify a signed message file
    Verify {
        /// Signed message JSON file
        message: PathBuf,
    },

    /// Encrypt a payload to one or more recipients
    Pack {
        /// Recipient identifier (repeatable)
        #[arg(long = "to", required = true)]
        recipients: Vec<String>,

        /// Sender key file; omit for an anonymous message
        #[arg(long)]
        from: Option<PathBuf>,

        /// Content encryption algorithm
        #[arg(long, value_enum, default_value_t = Encryption::Xc20p)]
        enc: Encryption,

        #[command(flatten)]
        input: PayloadInput,

        /// Output file path (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Decrypt a sealed message file
    Unpack {
        /// Recipient key file
        #[arg(long, short)]
        key: PathBuf,

        /// Sealed message JSON file
        message: PathBuf,

        /// Write the plaintext here (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct PayloadInput {
    /// Payload given inline
    #[arg(long, short, conflicts_with = "input")]
    message: Option<String>,

    /// Payload read from a file (default: stdin)
    #[arg(long, short)]
    input: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Encryption {
    /// XChaCha20-Poly1305
    Xc20p,
    /// AES-256-GCM
    A256gcm,
}

impl From<Encryption> for ContentEncryption {
    fn from(enc: Encryption) -> Self {
        match enc {
            Encryption::Xc20p => ContentEncryption::XChaCha20Poly1305,
            Encryption::A256gcm => ContentEncryption::Aes256Gcm,
        }
    }
}

// ── Main entry point ──────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = match cli.command {
        Commands::Generate {
            algorithm,
            seed,
            output,
        } => cmd_generate(&algorithm, seed.as_deref(), output.as_deref()),
        Commands::Resolve { identifier } => cmd_resolve(&identifier),
        Commands::Document { identifier, jose } => cmd_document(&identifier, jose),
        Commands::Sign { key, input, output } => cmd_sign(&key, &input, output.as_deref()),
        Commands::Verify { message } => cmd_verify(&message),
        Commands::Pack {
            recipients,
            from,
            enc,
            input,
            output,
        } => cmd_pack(
            &recipients,
            from.as_deref(),
            enc.into(),
            &input,
            output.as_deref(),
        ),
        Commands::Unpack {
            key,
            message,
            output,
        } => cmd_unpack(&key, &message, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

// ── I/O helpers ───────────────────────────────────────────────────────────────

fn read_payload(input: &PayloadInput) -> Result<Vec<u8>> {
    if let Some(message) = &input.message {
        return Ok(message.as_bytes().to_vec());
    }
    if let Some(path) = &input.input {
        return std::fs::read(path).with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buf = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buf)
        .context("failed to read payload from stdin")?;
    Ok(buf)
}

fn write_output(output: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn write_json<T: serde::Serialize>(output: Option<&Path>, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    write_output(output, json.as_bytes())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn load_key(path: &Path) -> Result<KeyPair> {
    let material: KeyMaterial = read_json(path)?;
    material
        .to_key_pair()
        .with_context(|| format!("invalid key file {}", path.display()))
}

// ── Command implementations ───────────────────────────────────────────────────

/// `didkey generate [--algorithm ALG] [--seed HEX] [--output FILE]`
fn cmd_generate(algorithm: &str, seed: Option<&str>, output: Option<&Path>) -> Result<()> {
    let algorithm: KeyAlgorithm = algorithm.parse()?;
    let key_pair = match seed {
        Some(seed) => {
            let seed = zeroize::Zeroizing::new(
                hex::decode(seed.trim()).map_err(|e| anyhow!("seed is not valid hex: {e}"))?,
            );
            KeyPair::from_seed(algorithm, &seed)?
        }
        None => KeyPair::generate(algorithm)?,
    };
    log::info!("generated {algorithm} key {}", key_pair.identifier());
    write_json(output, &KeyMaterial::from_key_pair(&key_pair))?;
    if let Some(path) = output {
        eprintln!("{}", key_pair.identifier());
        eprintln!("  Key file: {}", path.display());
    }
    Ok(())
}

/// `didkey resolve ID`
fn cmd_resolve(identifier: &str) -> Result<()> {
    let key = resolve_recipient(identifier)?;
    println!("Identifier: {identifier}");
    println!("  Algorithm:  {}", key.algorithm);
    println!("  Public Key: {}", hex::encode(&key.bytes));
    println!(
        "  Capabilities: {}{}",
        if key.algorithm.can_sign() { "sign " } else { "" },
        if key.algorithm.can_agree() { "agree" } else { "" }
    );
    Ok(())
}

/// `didkey document ID [--jose]`
fn cmd_document(identifier: &str, jose: bool) -> Result<()> {
    let config = DocumentConfig {
        use_jose_format: jose,
    };
    write_json(None, &resolve_document(identifier, &config)?)
}

/// `didkey sign --key FILE [--message TEXT | --input FILE]`
fn cmd_sign(key: &Path, input: &PayloadInput, output: Option<&Path>) -> Result<()> {
    let signer = load_key(key)?;
    let payload = read_payload(input)?;
    let signed = didkey::sign(&payload, &signer)?;
    write_json(output, &signed)
}

/// `didkey verify FILE`
fn cmd_verify(message: &Path) -> Result<()> {
    let signed: SignedMessage = read_json(message)?;
    match signed.verify() {
        Ok(()) => {
            let signer = signed.signer_identifier()?;
            println!("Signature: valid");
            println!("  Signer:    {signer}");
            println!("  Algorithm: {}", signer.public_key()?.algorithm);
            Ok(())
        }
        Err(e) => bail!("signature: INVALID ({e})"),
    }
}

/// `didkey pack --to ID... [--from FILE] [--enc ENC]`
fn cmd_pack(
    recipients: &[String],
    from: Option<&Path>,
    enc: ContentEncryption,
    input: &PayloadInput,
    output: Option<&Path>,
) -> Result<()> {
    let sender = from.map(load_key).transpose()?;
    let payload = read_payload(input)?;
    let options = PackOptions {
        content_encryption: enc,
    };
    let sealed = didkey::pack(&payload, sender.as_ref(), recipients, &options)?;
    write_json(output, &sealed)
}

/// `didkey unpack --key FILE MESSAGE`
fn cmd_unpack(key: &Path, message: &Path, output: Option<&Path>) -> Result<()> {
    let recipient = load_key(key)?;
    let sealed: SealedMessage = read_json(message)?;
    let opened = didkey::unpack(&sealed, &recipient)?;
    match &opened.sender {
        Some(sender) => eprintln!("Sender: {sender}"),
        None => eprintln!("Sender: anonymous"),
    }
    write_output(output, &opened.plaintext)
}
