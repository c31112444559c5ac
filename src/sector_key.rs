//! SectorKey: the opaque payload type this core stores, owned in full by the
//! sector-database layer above (spec.md §6 / GLOSSARY). No teacher analog —
//! QuiverDB's own KV records are a different shape entirely; this is a novel
//! type scoped exactly to what spec.md §6 requires: a raw key used for
//! bucketing plus a fixed-length opaque payload.
//!
//! The core never interprets `payload` beyond its length. Per spec.md §6 the
//! payload's own first byte conventionally mirrors the slot's state, but that
//! is the caller's concern — `Record`'s `state` field (byte 0 of the slot) is
//! the core's authoritative state, per spec.md §3's clarification.

use crate::error::{KeychainError, Result};

/// A key plus its opaque, fixed-length payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectorKey {
    /// Arbitrary-length raw key bytes (compressed internally for bucketing).
    pub key: Vec<u8>,
    /// Opaque serialized payload; must be exactly `sector_key_bytes` long.
    pub payload: Vec<u8>,
}

impl SectorKey {
    pub fn new(key: impl Into<Vec<u8>>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
        }
    }

    pub(crate) fn validate(&self, sector_key_bytes: usize) -> Result<()> {
        if self.key.is_empty() {
            return Err(KeychainError::EmptyKey);
        }
        if self.payload.len() != sector_key_bytes {
            return Err(KeychainError::Io(std::io::Error::other(format!(
                "sector key payload length {} != configured {}",
                self.payload.len(),
                sector_key_bytes
            ))));
        }
        Ok(())
    }
}
