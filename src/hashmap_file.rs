//! Hashmap files (spec.md §4.6/§6): N files, each holding `total_buckets`
//! records, probed in file-index order on collision.
//!
//! Grounded on the teacher's `pager/core.rs` + `pager/io.rs` split: addressing
//! (`offset = bucket * record_stride`) lives here as a thin layer over the
//! file-handle cache, matching how the teacher separates "where is this page"
//! from "how do I physically read/write one".

use std::io::{Read, Seek, SeekFrom, Write};

use crate::config::KeychainConfig;
use crate::handle_cache::FileHandleCache;
use crate::record::Record;

/// Read the record at `(f, bucket)`. The slot is zeroed (EMPTY) if the
/// hashmap file doesn't contain that offset yet — the file-handle cache
/// creates hashmap files on demand but does not eagerly preallocate beyond
/// what `Keychain::open`'s `Initialize` step sets up.
pub fn read_record(
    cache: &mut FileHandleCache,
    f: u16,
    bucket: u32,
    cfg: &KeychainConfig,
) -> std::io::Result<(Record, bool)> {
    let stride = cfg.record_stride();
    let off = bucket as u64 * stride;
    cache.with_handle(f, |file| {
        let len = file.metadata()?.len();
        let mut buf = vec![0u8; stride as usize];
        if off + stride <= len {
            file.seek(SeekFrom::Start(off))?;
            file.read_exact(&mut buf)?;
        }
        // else: slot lies past EOF (file never preallocated this far) -> all-zero EMPTY record.
        Ok(Record::decode(&buf, cfg))
    })
}

/// Write `record` at `(f, bucket)` as a single whole-slot write (spec.md
/// §4.8: never a partial-record write, so a torn write can only ever look
/// like EMPTY/corrupt, not a different valid record).
pub fn write_record(
    cache: &mut FileHandleCache,
    f: u16,
    bucket: u32,
    record: &Record,
    cfg: &KeychainConfig,
) -> std::io::Result<()> {
    let stride = cfg.record_stride();
    let off = bucket as u64 * stride;
    let buf = record.encode(cfg);
    cache.with_handle(f, |file| {
        let len = file.metadata()?.len();
        if len < off + stride {
            file.set_len(off + stride)?;
        }
        file.seek(SeekFrom::Start(off))?;
        file.write_all(&buf)
    })
}

/// Preallocate `total_buckets * record_stride` zero bytes for hashmap file
/// `f`, if it does not already exist (spec.md §4.6 Initialize: "at minimum
/// file 0").
pub fn ensure_created(
    base_path: &std::path::Path,
    f: u16,
    cfg: &KeychainConfig,
) -> std::io::Result<()> {
    let path = FileHandleCache::hashmap_file_path(base_path, f);
    if path.exists() {
        return Ok(());
    }
    let file = std::fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&path)?;
    let len = cfg.total_buckets as u64 * cfg.record_stride();
    file.set_len(len)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordState;
    use std::path::PathBuf;

    fn cfg(base: &std::path::Path) -> KeychainConfig {
        KeychainConfig::builder(base)
            .total_buckets(16)
            .max_hashmaps(4)
            .primary_bloom(64, 3)
            .secondary_bloom(32, 2)
            .key_length(4)
            .sector_key_bytes(8)
            .build()
    }

    fn tmp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "keychain-hashmap-file-{}-{}",
            std::process::id(),
            tag
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn writes_and_reads_back_a_record() {
        let dir = tmp_dir("rw");
        let cfg = cfg(&dir);
        ensure_created(&dir, 0, &cfg).unwrap();
        let mut cache = FileHandleCache::new(4, &dir);

        let mut rec = Record::empty(&cfg);
        rec.state = RecordState::Ready;
        rec.compressed_key = vec![9, 9, 9, 9];
        rec.sector_key_payload = vec![1, 2, 3, 4, 5, 6, 7, 8];
        write_record(&mut cache, 0, 3, &rec, &cfg).unwrap();

        let (read_back, corrupt) = read_record(&mut cache, 0, 3, &cfg).unwrap();
        assert!(!corrupt);
        assert_eq!(read_back.state, RecordState::Ready);
        assert_eq!(read_back.compressed_key, vec![9, 9, 9, 9]);

        let (other, corrupt2) = read_record(&mut cache, 0, 4, &cfg).unwrap();
        assert!(!corrupt2);
        assert_eq!(other.state, RecordState::Empty);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
