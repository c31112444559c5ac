//! Index file (spec.md §4.6/§6): a single file holding, per bucket, the
//! primary bloom stripe plus a 2-byte `current_file` hint.
//!
//! Grounded on the teacher's `dir.rs`: one metadata file living at
//! `base_path/_index.0`, addressed by `bucket * index_stride`, kept open for
//! the keychain's lifetime (per spec.md §4.6, unlike the bounded hashmap-file
//! LRU). Unlike `dir.rs`'s CRC + atomic tmp-rename scheme, spec.md §4.8
//! explicitly prescribes in-place whole-stripe writes with no header/CRC —
//! bloom bits are monotone, so a torn write only ever costs an extra false
//! positive, never a wrong answer.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::bloom::BloomFilter;
use crate::config::KeychainConfig;

pub const INDEX_FILE_NAME: &str = "_index.0";

/// One bucket's stripe in the index file: primary bloom bits plus the
/// bucket's `current_file` hint.
#[derive(Clone, Debug)]
pub struct IndexStripe {
    pub primary_bloom: Vec<u8>,
    pub current_file: u16,
}

impl IndexStripe {
    pub fn empty(cfg: &KeychainConfig) -> Self {
        Self {
            primary_bloom: vec![0u8; cfg.primary_bloom_size_bytes() as usize],
            current_file: 0,
        }
    }

    fn encode(&self, cfg: &KeychainConfig) -> Vec<u8> {
        let mut buf = vec![0u8; cfg.index_stride() as usize];
        let bloom_len = cfg.primary_bloom_size_bytes() as usize;
        buf[0..bloom_len].copy_from_slice(&self.primary_bloom);
        byteorder::LittleEndian::write_u16(&mut buf[bloom_len..bloom_len + 2], self.current_file);
        buf
    }

    fn decode(buf: &[u8], cfg: &KeychainConfig) -> Self {
        let bloom_len = cfg.primary_bloom_size_bytes() as usize;
        Self {
            primary_bloom: buf[0..bloom_len].to_vec(),
            current_file: byteorder::LittleEndian::read_u16(&buf[bloom_len..bloom_len + 2]),
        }
    }

    pub fn primary_bloom_contains(&self, compressed_key: &[u8], hashes: u32) -> bool {
        let mut bits = self.primary_bloom.clone();
        BloomFilter::new(&mut bits, hashes).contains(compressed_key)
    }

    pub fn primary_bloom_insert(&mut self, compressed_key: &[u8], hashes: u32) {
        let mut bits = std::mem::take(&mut self.primary_bloom);
        BloomFilter::new(&mut bits, hashes).insert(compressed_key);
        self.primary_bloom = bits;
    }
}

use byteorder::ByteOrder;

/// Handle to `base_path/_index.0`, open read/write for the keychain's
/// lifetime.
pub struct IndexFile {
    file: File,
}

impl IndexFile {
    /// Create the index file with `total_buckets * index_stride` zeroed bytes,
    /// if it does not already exist. No-op if it does (spec.md §4.6
    /// Initialize).
    pub fn ensure_created(base_path: &Path, cfg: &KeychainConfig) -> std::io::Result<()> {
        let path = Self::path(base_path);
        if path.exists() {
            return Ok(());
        }
        let f = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&path)?;
        let len = cfg.total_buckets as u64 * cfg.index_stride();
        f.set_len(len)?;
        f.sync_all()?;
        Ok(())
    }

    pub fn open(base_path: &Path) -> std::io::Result<Self> {
        let path = Self::path(base_path);
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        Ok(Self { file })
    }

    pub fn path(base_path: &Path) -> PathBuf {
        base_path.join(INDEX_FILE_NAME)
    }

    pub fn read_stripe(&mut self, bucket: u32, cfg: &KeychainConfig) -> std::io::Result<IndexStripe> {
        let off = bucket as u64 * cfg.index_stride();
        self.file.seek(SeekFrom::Start(off))?;
        let mut buf = vec![0u8; cfg.index_stride() as usize];
        self.file.read_exact(&mut buf)?;
        Ok(IndexStripe::decode(&buf, cfg))
    }

    pub fn write_stripe(
        &mut self,
        bucket: u32,
        stripe: &IndexStripe,
        cfg: &KeychainConfig,
    ) -> std::io::Result<()> {
        let off = bucket as u64 * cfg.index_stride();
        self.file.seek(SeekFrom::Start(off))?;
        self.file.write_all(&stripe.encode(cfg))?;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.file.sync_all()
    }
}
