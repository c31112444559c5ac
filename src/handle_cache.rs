//! File-handle cache (spec.md §4.4): a bounded LRU of open hashmap-file
//! handles, keyed by file index, with a mutex per handle.
//!
//! The intrusive doubly-linked-list LRU is adapted from the teacher's
//! `pager/cache.rs` `PageCache` (same head/tail-by-key bookkeeping), but holds
//! live `File` handles instead of copied page bytes, and evicts by flushing
//! and closing the handle rather than dropping a byte buffer. Per spec.md §4.4
//! and §5, the cache is only ever touched while the keychain's outer mutex is
//! held, so the per-handle `Mutex` here is never contended — it exists to
//! satisfy the spec's explicit requirement and to make a handle's borrow
//! self-contained.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

struct Entry {
    handle: Mutex<File>,
    prev: Option<u16>,
    next: Option<u16>,
}

/// Bounded LRU mapping hashmap-file index -> open read/write file handle.
pub struct FileHandleCache {
    cap: usize,
    base_path: PathBuf,
    map: HashMap<u16, Entry>,
    head: Option<u16>, // MRU
    tail: Option<u16>, // LRU
}

impl FileHandleCache {
    pub fn new(cap: usize, base_path: impl Into<PathBuf>) -> Self {
        Self {
            cap: cap.max(1),
            base_path: base_path.into(),
            map: HashMap::new(),
            head: None,
            tail: None,
        }
    }

    /// Path of hashmap file `f` under `base_path`: `_hashmap.NNNN` zero-padded
    /// to 4 digits (spec.md §6).
    pub fn hashmap_file_path(base_path: &Path, f: u16) -> PathBuf {
        base_path.join(format!("_hashmap.{:04}", f))
    }

    /// Run `op` against the open handle for hashmap file `f`, opening
    /// (creating if absent) and moving it to MRU first. Evicts the LRU handle
    /// (flush + close) if the cache is at capacity and `f` was not already
    /// cached.
    pub fn with_handle<R>(
        &mut self,
        f: u16,
        op: impl FnOnce(&mut File) -> io::Result<R>,
    ) -> io::Result<R> {
        if !self.map.contains_key(&f) {
            if self.map.len() >= self.cap {
                if let Some(victim) = self.tail {
                    self.evict(victim)?;
                }
            }
            let path = Self::hashmap_file_path(&self.base_path, f);
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(&path)?;
            self.map.insert(
                f,
                Entry {
                    handle: Mutex::new(file),
                    prev: None,
                    next: None,
                },
            );
            self.attach_front(f);
        } else {
            self.detach(f);
            self.attach_front(f);
        }

        let entry = self.map.get(&f).expect("just inserted or already present");
        let mut guard = entry
            .handle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        op(&mut guard)
    }

    /// Flush every cached handle. Used by `Keychain::flush`.
    pub fn flush_all(&mut self) -> io::Result<()> {
        for entry in self.map.values() {
            let mut guard = entry
                .handle
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.sync_all()?;
        }
        Ok(())
    }

    fn evict(&mut self, f: u16) -> io::Result<()> {
        self.detach(f);
        if let Some(entry) = self.map.remove(&f) {
            let mut guard = entry
                .handle
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.sync_all()?;
            // `guard` (and then the handle) is dropped here, closing the fd.
        }
        Ok(())
    }

    fn detach(&mut self, f: u16) {
        let (prev, next) = match self.map.get(&f) {
            Some(e) => (e.prev, e.next),
            None => return,
        };
        if self.head == Some(f) {
            self.head = next;
        }
        if self.tail == Some(f) {
            self.tail = prev;
        }
        if let Some(p) = prev {
            if let Some(pe) = self.map.get_mut(&p) {
                pe.next = next;
            }
        }
        if let Some(n) = next {
            if let Some(ne) = self.map.get_mut(&n) {
                ne.prev = prev;
            }
        }
        if let Some(e) = self.map.get_mut(&f) {
            e.prev = None;
            e.next = None;
        }
    }

    fn attach_front(&mut self, f: u16) {
        if self.head == Some(f) {
            return;
        }
        if let Some(e) = self.map.get_mut(&f) {
            e.prev = None;
            e.next = self.head;
        }
        if let Some(old_head) = self.head {
            if let Some(he) = self.map.get_mut(&old_head) {
                he.prev = Some(f);
            }
        }
        self.head = Some(f);
        if self.tail.is_none() {
            self.tail = Some(f);
        }
    }
}
