//! Error taxonomy for the keychain's public surface (spec.md §7).
//!
//! The core's *internal* helpers (index-file setup, stripe parsing) lean on
//! `anyhow::Result` the way the teacher crate's `dir.rs`/`pager/io.rs` do, since
//! those are not part of the contract callers see. Everything that crosses the
//! `Keychain` operation boundary is converted into this closed enum instead, so
//! callers can match on NotFound vs KeychainFull vs IoError without downcasting.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeychainError {
    /// Lookup exhausted every probe (or the primary bloom rejected the key outright).
    #[error("key not found")]
    NotFound,

    /// Put could not find a free or matching slot within `max_hashmaps` probes.
    #[error("keychain full for this bucket")]
    KeychainFull,

    /// Put/Get/Erase/Restore called with a zero-length raw key.
    #[error("key must not be empty")]
    EmptyKey,

    /// Underlying filesystem failure (open/seek/read/write/flush).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KeychainError>;

impl From<anyhow::Error> for KeychainError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<std::io::Error>() {
            Ok(io_err) => KeychainError::Io(io_err),
            Err(e) => KeychainError::Io(std::io::Error::other(e.to_string())),
        }
    }
}
