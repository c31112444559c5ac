//! A persistent, on-disk keychain mapping arbitrary byte keys to fixed-size
//! sector-key records: the index layer of a sector-based storage engine.
//!
//! The core is the BinaryHashMap keychain — a bucketed hashmap with per-bucket
//! probing across a small number of hashmap files, backed by a two-level
//! Bloom filter (one per bucket in the index file, one per record slot) to
//! eliminate most disk reads on a miss. See [`Keychain`] for the four
//! operations (Get/Put/Erase/Restore) plus Flush.

pub mod bloom;
pub mod compress;
pub mod config;
pub mod error;
pub mod handle_cache;
pub mod hash;
pub mod hashmap_file;
pub mod index_file;
pub mod keychain;
pub mod record;
pub mod sector_key;

pub use config::{KeychainConfig, KeychainConfigBuilder};
pub use error::{KeychainError, Result};
pub use keychain::Keychain;
pub use record::RecordState;
pub use sector_key::SectorKey;
