//! Keychain operations (spec.md §4.6): Get / Put / Erase / Restore / Flush,
//! plus `open()` performing the Initialize step (spec.md §4.6/§4.9).
//!
//! Grounded on the teacher's `db/core.rs` + `db/kv.rs`: a single struct owning
//! its on-disk handles behind one coarse mutex, with the public operations as
//! inherent methods rather than a trait object (spec.md §9: no base-class
//! inheritance — a future variant would be a sibling type, not a subclass).

use std::path::Path;
use std::sync::Mutex;

use log::{debug, info, warn};

use crate::compress::compress_key;
use crate::config::KeychainConfig;
use crate::error::{KeychainError, Result};
use crate::handle_cache::FileHandleCache;
use crate::hash::bucket_of;
use crate::hashmap_file::{self, ensure_created as ensure_hashmap_created};
use crate::index_file::IndexFile;
use crate::record::{check_hashmap_available, Record, RecordState};
use crate::sector_key::SectorKey;

/// Everything that lives behind the keychain's single mutex: the always-open
/// index handle and the bounded LRU of hashmap-file handles (spec.md §5).
struct KeychainState {
    index: IndexFile,
    cache: FileHandleCache,
}

/// The BinaryHashMap keychain core.
pub struct Keychain {
    config: KeychainConfig,
    state: Mutex<KeychainState>,
}

impl Keychain {
    /// Open (creating on first use) the keychain at `config.base_path`.
    /// Performs spec.md §4.6's Initialize step: creates the directory, the
    /// index file (preallocated, zeroed), and hashmap file 0 (preallocated,
    /// zeroed) if any are missing.
    pub fn open(config: KeychainConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| KeychainError::Io(std::io::Error::other(e)))?;

        std::fs::create_dir_all(&config.base_path)?;
        IndexFile::ensure_created(&config.base_path, &config)?;
        ensure_hashmap_created(&config.base_path, 0, &config)?;
        info!(
            "keychain initialized at {} ({} buckets, {} hashmap files max)",
            config.base_path.display(),
            config.total_buckets,
            config.max_hashmaps
        );

        let index = IndexFile::open(&config.base_path)?;
        let cache = FileHandleCache::new(config.file_handle_cache_size, &config.base_path);
        Ok(Self {
            config,
            state: Mutex::new(KeychainState { index, cache }),
        })
    }

    pub fn config(&self) -> &KeychainConfig {
        &self.config
    }

    /// Get(raw_key) -> SectorKey (spec.md §4.6 Get).
    pub fn get(&self, raw_key: &[u8]) -> Result<SectorKey> {
        let ck = compress_key(raw_key, self.config.key_length as usize)?;
        let bucket = bucket_of(&ck, self.config.total_buckets);

        let mut state = self.lock();
        let stripe = state.index.read_stripe(bucket, &self.config)?;
        if !stripe.primary_bloom_contains(&ck, self.config.primary_bloom_hashes) {
            return Err(KeychainError::NotFound);
        }

        let probe_limit = (stripe.current_file as u32).min(self.config.max_hashmaps);
        for f in 0..probe_limit {
            let rec = match hashmap_file::read_record(&mut state.cache, f as u16, bucket, &self.config)
            {
                Ok((rec, corrupt)) => {
                    if corrupt {
                        warn!("corrupt record at hashmap file {} bucket {}", f, bucket);
                        continue;
                    }
                    rec
                }
                Err(e) => return Err(e.into()),
            };

            if !rec.secondary_bloom_contains(&ck, self.config.secondary_bloom_hashes) {
                continue;
            }
            if rec.compressed_key != ck {
                continue;
            }
            match rec.state {
                RecordState::Ready => {
                    return Ok(SectorKey::new(raw_key.to_vec(), rec.sector_key_payload));
                }
                RecordState::Erased | RecordState::Archive => continue,
                RecordState::Empty => continue,
            }
        }
        Err(KeychainError::NotFound)
    }

    /// Put(sector_key) -> () (spec.md §4.6 Put).
    pub fn put(&self, sector_key: SectorKey) -> Result<()> {
        sector_key.validate(self.config.sector_key_bytes as usize)?;
        let ck = compress_key(&sector_key.key, self.config.key_length as usize)?;
        let bucket = bucket_of(&ck, self.config.total_buckets);

        let mut state = self.lock();
        let mut stripe = state.index.read_stripe(bucket, &self.config)?;
        if !stripe.primary_bloom_contains(&ck, self.config.primary_bloom_hashes) {
            stripe.primary_bloom_insert(&ck, self.config.primary_bloom_hashes);
        }
        let hint = stripe.current_file;

        let mut written = false;
        for f in 0..self.config.max_hashmaps {
            let (mut rec, corrupt) =
                hashmap_file::read_record(&mut state.cache, f as u16, bucket, &self.config)?;
            if corrupt {
                warn!("corrupt record at hashmap file {} bucket {}", f, bucket);
            }

            let is_overwrite = matches!(rec.state, RecordState::Ready | RecordState::Erased)
                && rec.compressed_key == ck;
            if is_overwrite {
                rec.state = RecordState::Ready;
                rec.sector_key_payload = sector_key.payload.clone();
                rec.secondary_bloom_insert(&ck, self.config.secondary_bloom_hashes);
                hashmap_file::write_record(&mut state.cache, f as u16, bucket, &rec, &self.config)?;
                written = true;
                break;
            }

            if check_hashmap_available(rec.state, hint, f) {
                let mut new_rec = Record::empty(&self.config);
                new_rec.state = RecordState::Ready;
                new_rec.compressed_key = ck.clone();
                new_rec.current_file = (f + 1) as u16;
                new_rec.secondary_bloom_insert(&ck, self.config.secondary_bloom_hashes);
                new_rec.sector_key_payload = sector_key.payload.clone();
                hashmap_file::write_record(
                    &mut state.cache,
                    f as u16,
                    bucket,
                    &new_rec,
                    &self.config,
                )?;
                stripe.current_file = stripe.current_file.max((f + 1) as u16);
                written = true;
                break;
            }
        }

        if !written {
            return Err(KeychainError::KeychainFull);
        }

        state.index.write_stripe(bucket, &stripe, &self.config)?;
        Ok(())
    }

    /// Erase(raw_key) -> () (spec.md §4.6 Erase). Bloom bits are intentionally
    /// left untouched.
    pub fn erase(&self, raw_key: &[u8]) -> Result<()> {
        let ck = compress_key(raw_key, self.config.key_length as usize)?;
        let bucket = bucket_of(&ck, self.config.total_buckets);

        let mut state = self.lock();
        let stripe = state.index.read_stripe(bucket, &self.config)?;
        if !stripe.primary_bloom_contains(&ck, self.config.primary_bloom_hashes) {
            return Err(KeychainError::NotFound);
        }

        let probe_limit = (stripe.current_file as u32).min(self.config.max_hashmaps);
        for f in 0..probe_limit {
            let (mut rec, corrupt) =
                hashmap_file::read_record(&mut state.cache, f as u16, bucket, &self.config)?;
            if corrupt {
                warn!("corrupt record at hashmap file {} bucket {}", f, bucket);
                continue;
            }
            if !rec.secondary_bloom_contains(&ck, self.config.secondary_bloom_hashes) {
                continue;
            }
            if rec.compressed_key != ck {
                continue;
            }
            if rec.state == RecordState::Ready {
                rec.state = RecordState::Erased;
                hashmap_file::write_record(&mut state.cache, f as u16, bucket, &rec, &self.config)?;
                debug!("erased bucket {} at hashmap file {}", bucket, f);
                return Ok(());
            }
        }
        Err(KeychainError::NotFound)
    }

    /// Restore(raw_key) -> () (spec.md §4.6 Restore): revive the first
    /// matching ERASED record back to READY.
    pub fn restore(&self, raw_key: &[u8]) -> Result<()> {
        let ck = compress_key(raw_key, self.config.key_length as usize)?;
        let bucket = bucket_of(&ck, self.config.total_buckets);

        let mut state = self.lock();
        let stripe = state.index.read_stripe(bucket, &self.config)?;
        if !stripe.primary_bloom_contains(&ck, self.config.primary_bloom_hashes) {
            return Err(KeychainError::NotFound);
        }

        let probe_limit = (stripe.current_file as u32).min(self.config.max_hashmaps);
        for f in 0..probe_limit {
            let (mut rec, corrupt) =
                hashmap_file::read_record(&mut state.cache, f as u16, bucket, &self.config)?;
            if corrupt {
                warn!("corrupt record at hashmap file {} bucket {}", f, bucket);
                continue;
            }
            if !rec.secondary_bloom_contains(&ck, self.config.secondary_bloom_hashes) {
                continue;
            }
            if rec.compressed_key != ck {
                continue;
            }
            if rec.state == RecordState::Erased {
                rec.state = RecordState::Ready;
                hashmap_file::write_record(&mut state.cache, f as u16, bucket, &rec, &self.config)?;
                debug!("restored bucket {} at hashmap file {}", bucket, f);
                return Ok(());
            }
        }
        Err(KeychainError::NotFound)
    }

    /// Flush() -> () (spec.md §4.6 Flush): flush the index handle and every
    /// cached hashmap-file handle. Safe to call concurrently with other
    /// operations; it takes the same mutex.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.lock();
        state.index.flush()?;
        state.cache.flush_all()?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        self.config.base_path()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, KeychainState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
