//! Bucket indexer (spec.md §4.2).
//!
//! Grounded on the teacher's `hash.rs`: same "pure function from key bytes to
//! bucket id" shape (`bucket_of_key`/`bucket_index`), but the reduction itself
//! is the spec's own algorithm rather than `twox_hash` — the compressed key's
//! first 8 bytes, read little-endian, reduced modulo `total_buckets`. No
//! re-hashing: ties are broken by the natural modular reduction.
//!
//! When `key_length` is configured below 8 (spec.md §8's own worked example
//! uses `key_length=4`), the window wraps around the compressed key the same
//! way the bloom filters' hash windows do (spec.md §4.3) rather than reading
//! out of bounds.

use crate::bloom::wrapped_u64_window;

/// Map a non-empty compressed key to a bucket id in `[0, total_buckets)`.
#[inline]
pub fn bucket_of(compressed_key: &[u8], total_buckets: u32) -> u32 {
    debug_assert!(total_buckets > 0, "total_buckets must be > 0");
    let h = wrapped_u64_window(compressed_key, 0);
    (h % u64::from(total_buckets)) as u32
}
