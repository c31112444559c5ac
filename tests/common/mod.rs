//! Shared integration-test helpers. Hand-rolled unique-directory helper,
//! mirroring the teacher crate's `tests/smoke.rs` (`pid + nanosecond
//! timestamp under std::env::temp_dir()`) rather than pulling in `tempfile`
//! for the library's own test suite.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sector_keychain::{KeychainConfig, KeychainConfigBuilder};

#[allow(dead_code)]
pub fn unique_root(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "sector-keychain-test-{}-{}-{}",
        std::process::id(),
        tag,
        nanos
    ));
    std::fs::create_dir_all(&dir).expect("create test dir");
    dir
}

/// Config matching spec.md §8's concrete end-to-end scenarios:
/// total_buckets=16, max_hashmaps=4, key_length=4, sector_key_bytes=8,
/// primary bloom 64 bits / 3 hashes, secondary bloom 32 bits / 2 hashes.
#[allow(dead_code)]
pub fn scenario_config(root: &std::path::Path) -> KeychainConfig {
    builder(root).build()
}

#[allow(dead_code)]
pub fn builder(root: &std::path::Path) -> KeychainConfigBuilder {
    KeychainConfig::builder(root)
        .total_buckets(16)
        .max_hashmaps(4)
        .primary_bloom(64, 3)
        .secondary_bloom(32, 2)
        .key_length(4)
        .sector_key_bytes(8)
}

#[allow(dead_code)]
pub fn payload(byte: u8) -> Vec<u8> {
    vec![byte; 8]
}
