//! Keychain configuration: the immutable input bundle from spec.md §3.
//!
//! Mirrors the teacher crate's `QuiverConfig`/`DbBuilder` split: a plain data
//! struct plus a fluent builder. Unlike `QuiverConfig::from_env()`, this crate
//! takes no environment fallback — spec.md §1 treats configuration as an input
//! bundle owned by the higher-layer sector database, not something the keychain
//! core parses for itself.

use std::fmt;
use std::path::{Path, PathBuf};

/// Top-level configuration for the BinaryHashMap keychain.
#[derive(Clone, Debug)]
pub struct KeychainConfig {
    /// Directory for the index file and hashmap files.
    pub base_path: PathBuf,
    /// Number of buckets per hashmap file.
    pub total_buckets: u32,
    /// Maximum number of hashmap files (probe depth).
    pub max_hashmaps: u32,
    /// Primary (index-file) bloom filter size, in bits.
    pub primary_bloom_bits: u32,
    /// Primary bloom filter hash count.
    pub primary_bloom_hashes: u32,
    /// Secondary (per-record) bloom filter size, in bits.
    pub secondary_bloom_bits: u32,
    /// Secondary bloom filter hash count.
    pub secondary_bloom_hashes: u32,
    /// Compressed-key length in bytes (e.g. 16).
    pub key_length: u32,
    /// Serialized length of an opaque SectorKey payload.
    pub sector_key_bytes: u32,
    /// Bounded LRU capacity for open hashmap-file handles.
    pub file_handle_cache_size: usize,
}

impl KeychainConfig {
    pub fn builder(base_path: impl Into<PathBuf>) -> KeychainConfigBuilder {
        KeychainConfigBuilder::new(base_path)
    }

    /// Size in bytes of the primary bloom bit-vector, rounded up to whole bytes.
    pub fn primary_bloom_size_bytes(&self) -> u32 {
        (self.primary_bloom_bits + 7) / 8
    }

    /// Size in bytes of the secondary bloom bit-vector, rounded up to whole bytes.
    pub fn secondary_bloom_size_bytes(&self) -> u32 {
        (self.secondary_bloom_bits + 7) / 8
    }

    /// Stride of a bucket's slot in the index file: primary bloom bits + 2-byte
    /// `current_file` hint (spec.md §3).
    pub fn index_stride(&self) -> u64 {
        self.primary_bloom_size_bytes() as u64 + 2
    }

    /// Stride of a bucket's slot in each hashmap file: state byte + compressed
    /// key + 2-byte current-file mirror + secondary bloom + sector-key payload
    /// (spec.md §3).
    pub fn record_stride(&self) -> u64 {
        1 + self.key_length as u64
            + 2
            + self.secondary_bloom_size_bytes() as u64
            + self.sector_key_bytes as u64
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Validate the bundle; called once by `Keychain::open`.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.total_buckets == 0 {
            return Err("total_buckets must be > 0".into());
        }
        if self.max_hashmaps == 0 {
            return Err("max_hashmaps must be > 0".into());
        }
        if self.max_hashmaps > u32::from(u16::MAX) {
            return Err("max_hashmaps must fit in 16 bits".into());
        }
        if self.key_length == 0 {
            return Err("key_length must be > 0".into());
        }
        if self.primary_bloom_bits == 0 || self.primary_bloom_hashes == 0 {
            return Err("primary bloom bits/hashes must be > 0".into());
        }
        if self.secondary_bloom_bits == 0 || self.secondary_bloom_hashes == 0 {
            return Err("secondary bloom bits/hashes must be > 0".into());
        }
        if self.sector_key_bytes == 0 {
            return Err("sector_key_bytes must be > 0".into());
        }
        if self.file_handle_cache_size == 0 {
            return Err("file_handle_cache_size must be > 0".into());
        }
        Ok(())
    }
}

impl fmt::Display for KeychainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KeychainConfig {{ base_path: {}, total_buckets: {}, max_hashmaps: {}, \
             key_length: {}, sector_key_bytes: {}, index_stride: {}, record_stride: {} }}",
            self.base_path.display(),
            self.total_buckets,
            self.max_hashmaps,
            self.key_length,
            self.sector_key_bytes,
            self.index_stride(),
            self.record_stride(),
        )
    }
}

/// Fluent builder for [`KeychainConfig`], with the same defaults the test
/// scenarios in spec.md §8 assume.
#[derive(Clone, Debug)]
pub struct KeychainConfigBuilder {
    cfg: KeychainConfig,
}

impl KeychainConfigBuilder {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            cfg: KeychainConfig {
                base_path: base_path.into(),
                total_buckets: 256 * 256,
                max_hashmaps: 4,
                primary_bloom_bits: 64,
                primary_bloom_hashes: 3,
                secondary_bloom_bits: 32,
                secondary_bloom_hashes: 2,
                key_length: 16,
                sector_key_bytes: 32,
                file_handle_cache_size: 16,
            },
        }
    }

    pub fn total_buckets(mut self, n: u32) -> Self {
        self.cfg.total_buckets = n;
        self
    }

    pub fn max_hashmaps(mut self, n: u32) -> Self {
        self.cfg.max_hashmaps = n;
        self
    }

    pub fn primary_bloom(mut self, bits: u32, hashes: u32) -> Self {
        self.cfg.primary_bloom_bits = bits;
        self.cfg.primary_bloom_hashes = hashes;
        self
    }

    pub fn secondary_bloom(mut self, bits: u32, hashes: u32) -> Self {
        self.cfg.secondary_bloom_bits = bits;
        self.cfg.secondary_bloom_hashes = hashes;
        self
    }

    pub fn key_length(mut self, n: u32) -> Self {
        self.cfg.key_length = n;
        self
    }

    pub fn sector_key_bytes(mut self, n: u32) -> Self {
        self.cfg.sector_key_bytes = n;
        self
    }

    pub fn file_handle_cache_size(mut self, n: usize) -> Self {
        self.cfg.file_handle_cache_size = n;
        self
    }

    pub fn build(self) -> KeychainConfig {
        self.cfg
    }
}
