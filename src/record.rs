//! Record codec (spec.md §4.5): packs/unpacks a single bucket-slot record —
//! `{state, compressed_key, current_file, secondary_bloom, sector_key_payload}`.
//!
//! Grounded on the teacher's in-page record layouts (`page_rh/table.rs`,
//! `page_rh/header.rs`): fixed-width little-endian fields at known offsets,
//! encoded/decoded with `byteorder` rather than `bincode`/`serde`, matching
//! the rest of the on-disk formats in this pack.

use byteorder::{ByteOrder, LittleEndian};

use crate::bloom::BloomFilter;
use crate::config::KeychainConfig;

/// A bucket-slot's lifecycle state (spec.md §3/§4.7).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordState {
    Empty = 0,
    Ready = 1,
    Erased = 2,
    Archive = 3,
}

impl RecordState {
    fn from_u8(b: u8) -> Option<Self> {
        match b {
            0 => Some(RecordState::Empty),
            1 => Some(RecordState::Ready),
            2 => Some(RecordState::Erased),
            3 => Some(RecordState::Archive),
            _ => None,
        }
    }
}

/// A single hashmap-file slot, decoded.
#[derive(Clone, Debug)]
pub struct Record {
    pub state: RecordState,
    pub compressed_key: Vec<u8>,
    /// Mirror of the index stripe's `current_file` hint at write time
    /// (spec.md's Open Questions resolve this as per-slot, not per-bucket).
    pub current_file: u16,
    pub secondary_bloom: Vec<u8>,
    pub sector_key_payload: Vec<u8>,
}

impl Record {
    /// A freshly-zeroed (EMPTY) slot for a config's record_stride.
    pub fn empty(cfg: &KeychainConfig) -> Self {
        Self {
            state: RecordState::Empty,
            compressed_key: vec![0u8; cfg.key_length as usize],
            current_file: 0,
            secondary_bloom: vec![0u8; cfg.secondary_bloom_size_bytes() as usize],
            sector_key_payload: vec![0u8; cfg.sector_key_bytes as usize],
        }
    }

    /// Encode this record into a fresh `record_stride`-byte buffer.
    pub fn encode(&self, cfg: &KeychainConfig) -> Vec<u8> {
        let mut buf = vec![0u8; cfg.record_stride() as usize];
        buf[0] = self.state as u8;
        let key_len = cfg.key_length as usize;
        buf[1..1 + key_len].copy_from_slice(&self.compressed_key);
        let cf_off = 1 + key_len;
        LittleEndian::write_u16(&mut buf[cf_off..cf_off + 2], self.current_file);
        let bloom_off = cf_off + 2;
        let bloom_len = cfg.secondary_bloom_size_bytes() as usize;
        buf[bloom_off..bloom_off + bloom_len].copy_from_slice(&self.secondary_bloom);
        let payload_off = bloom_off + bloom_len;
        buf[payload_off..payload_off + self.sector_key_payload.len()]
            .copy_from_slice(&self.sector_key_payload);
        buf
    }

    /// Decode a `record_stride`-byte slot. A slot whose state byte is not one
    /// of EMPTY/READY/ERASED/ARCHIVE is corrupt; per spec.md §4.8 this is
    /// treated as an EMPTY-like "not found" slot by the caller (the corrupt
    /// record is still returned here so the keychain layer can log it, but its
    /// `state` comes back as `Empty` so probing and availability checks behave
    /// safely).
    pub fn decode(buf: &[u8], cfg: &KeychainConfig) -> (Self, bool) {
        let key_len = cfg.key_length as usize;
        let cf_off = 1 + key_len;
        let bloom_off = cf_off + 2;
        let bloom_len = cfg.secondary_bloom_size_bytes() as usize;
        let payload_off = bloom_off + bloom_len;

        let (state, corrupt) = match RecordState::from_u8(buf[0]) {
            Some(s) => (s, false),
            None => (RecordState::Empty, true),
        };

        let rec = Record {
            state,
            compressed_key: buf[1..1 + key_len].to_vec(),
            current_file: LittleEndian::read_u16(&buf[cf_off..cf_off + 2]),
            secondary_bloom: buf[bloom_off..bloom_off + bloom_len].to_vec(),
            sector_key_payload: buf[payload_off..payload_off + cfg.sector_key_bytes as usize]
                .to_vec(),
        };
        (rec, corrupt)
    }

    /// True iff this key's bits are all set in the record's secondary bloom.
    /// A `false` reply lets the prober skip the slot without comparing keys.
    pub fn secondary_bloom_contains(&self, compressed_key: &[u8], hashes: u32) -> bool {
        let mut bits = self.secondary_bloom.clone();
        BloomFilter::new(&mut bits, hashes).contains(compressed_key)
    }

    /// Set this key's bits in the record's secondary bloom (set-only; Erase
    /// never clears them, per spec.md §4.3).
    pub fn secondary_bloom_insert(&mut self, compressed_key: &[u8], hashes: u32) {
        let mut bits = std::mem::take(&mut self.secondary_bloom);
        BloomFilter::new(&mut bits, hashes).insert(compressed_key);
        self.secondary_bloom = bits;
    }
}

/// `check_hashmap_available(f, buf)` from spec.md §4.5: true iff the slot is
/// EMPTY *and* the bucket's current-file hint shows no file at index >= f has
/// ever been used for this bucket (`hint <= f`, i.e. `hint < f + 1`).
pub fn check_hashmap_available(state: RecordState, bucket_hint: u16, f: u32) -> bool {
    state == RecordState::Empty && u32::from(bucket_hint) <= f
}
