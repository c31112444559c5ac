//! Minimal CLI for exercising a keychain directly from the shell. Grounded on
//! the teacher's `main.rs` (env_logger setup) and `cli.rs` (clap derive
//! subcommands) — ambient CLI/build glue per spec.md §1's "out of scope"
//! list, kept intentionally small since the CLI itself is not part of the
//! core.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use log::error;
use sector_keychain::{Keychain, KeychainConfig, SectorKey};

fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

#[derive(Parser, Debug)]
#[command(
    name = "keychain-cli",
    version,
    about = "Inspect and poke a BinaryHashMap keychain directory",
    arg_required_else_help = true
)]
struct Cli {
    /// Directory holding the keychain's index + hashmap files.
    #[arg(long, default_value = "./keychain-data")]
    base_path: PathBuf,

    #[arg(long, default_value_t = 65536)]
    total_buckets: u32,

    #[arg(long, default_value_t = 4)]
    max_hashmaps: u32,

    #[arg(long, default_value_t = 16)]
    key_length: u32,

    #[arg(long, default_value_t = 32)]
    sector_key_bytes: u32,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write `payload` (hex) for `key` (utf-8).
    Put { key: String, payload_hex: String },
    /// Look up `key` and print its payload as hex.
    Get { key: String },
    /// Tombstone `key`.
    Erase { key: String },
    /// Revive a tombstoned `key`.
    Restore { key: String },
    /// Flush all open handles.
    Flush,
}

fn open_keychain(cli: &Cli) -> Result<Keychain> {
    let cfg = KeychainConfig::builder(&cli.base_path)
        .total_buckets(cli.total_buckets)
        .max_hashmaps(cli.max_hashmaps)
        .key_length(cli.key_length)
        .sector_key_bytes(cli.sector_key_bytes)
        .build();
    Ok(Keychain::open(cfg)?)
}

fn hex_decode(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(anyhow!("hex payload must have an even number of digits"));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| anyhow!(e)))
        .collect()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let kc = open_keychain(&cli)?;

    match &cli.cmd {
        Command::Put { key, payload_hex } => {
            let payload = hex_decode(payload_hex)?;
            if payload.len() != cli.sector_key_bytes as usize {
                return Err(anyhow!(
                    "payload is {} bytes, expected {}",
                    payload.len(),
                    cli.sector_key_bytes
                ));
            }
            kc.put(SectorKey::new(key.clone().into_bytes(), payload))?;
            println!("OK");
        }
        Command::Get { key } => {
            let sk = kc.get(key.as_bytes())?;
            println!("{}", hex_encode(&sk.payload));
        }
        Command::Erase { key } => {
            kc.erase(key.as_bytes())?;
            println!("OK");
        }
        Command::Restore { key } => {
            kc.restore(key.as_bytes())?;
            println!("OK");
        }
        Command::Flush => {
            kc.flush()?;
            println!("OK");
        }
    }
    Ok(())
}

fn main() {
    init_logger();
    if let Err(e) = run() {
        error!("{:?}", e);
        std::process::exit(1);
    }
}
