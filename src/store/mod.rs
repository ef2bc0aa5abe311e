//! Key/value blob storage with NotFound signaling and transparent
//! decompression of gzip-marked payloads.

mod disk;
mod mem;

pub use disk::DiskStore;
pub use mem::MemStore;

use std::io::Read;

use flate2::read::GzDecoder;
use thiserror::Error;

/// Gzip magic number; a payload starting with it carries the compression
/// marker and is decompressed before use.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Error)]
pub enum StoreError {
    /// The key has no object. Non-fatal: scoring skips the tile, tracking
    /// retries after backoff, aggregation omits the district.
    #[error("no object at {0:?}")]
    NotFound(String),

    /// Any other storage fault. Fatal, propagated without retry.
    #[error("storage failure at {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Access level for written objects. Index documents are public so the
/// result page can read them directly; everything else stays private.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// A fetched object, body still in its stored encoding.
#[derive(Debug, Clone)]
pub struct StoredObject {
    key: String,
    bytes: Vec<u8>,
}

impl StoredObject {
    pub(crate) fn new(key: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { key: key.into(), bytes }
    }

    /// Whether the payload carries the gzip compression marker.
    pub fn is_gzip(&self) -> bool {
        self.bytes.starts_with(&GZIP_MAGIC)
    }

    /// The payload, decompressed if it was marked compressed.
    pub fn into_bytes(self) -> std::io::Result<Vec<u8>> {
        if !self.is_gzip() {
            return Ok(self.bytes);
        }
        let mut decoder = GzDecoder::new(&self.bytes[..]);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }
}

/// Blob storage capability. Writers to distinct keys never conflict, and a
/// reader never observes a partially written object.
pub trait ObjectStore: Send + Sync {
    fn get(&self, key: &str) -> Result<StoredObject, StoreError>;

    fn put(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), StoreError>;

    /// Keys under a prefix, in lexicographic order.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}
