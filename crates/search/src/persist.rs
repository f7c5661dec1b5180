//! On-disk format for the BM25 index
//!
//! A persisted index is a single blob:
//! - 4 magic bytes `BM25`
//! - u32 little-endian format version
//! - MessagePack payload of the full index state
//!
//! Files are written atomically via temp + fsync + rename. Loading restores
//! postings, lengths, vocabulary, stored documents and parameters, so the
//! same queries score identically before and after a round trip.

use crate::index::Bm25Index;
use cyberrag_core::{Error, Result};
use std::path::Path;
use tracing::info;

/// Magic bytes for a persisted index
const INDEX_MAGIC: &[u8; 4] = b"BM25";
/// Current index format version
const INDEX_VERSION: u32 = 1;
/// Header length: magic + version
const HEADER_LEN: usize = 8;

/// File name used when an index is stored inside a directory
pub const INDEX_FILE_NAME: &str = "bm25_index.bin";

impl Bm25Index {
    /// Serialize the full index state to an opaque blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = rmp_serde::to_vec(self)?;

        let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
        buf.extend_from_slice(INDEX_MAGIC);
        buf.extend_from_slice(&INDEX_VERSION.to_le_bytes());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Reconstruct an index from a blob produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(Error::Corruption("index blob too small".to_string()));
        }
        if &buf[0..4] != INDEX_MAGIC {
            return Err(Error::Corruption("bad index magic".to_string()));
        }
        let mut version_bytes = [0u8; 4];
        version_bytes.copy_from_slice(&buf[4..HEADER_LEN]);
        let version = u32::from_le_bytes(version_bytes);
        if version != INDEX_VERSION {
            return Err(Error::Corruption(format!(
                "unsupported index version {}",
                version
            )));
        }
        let index: Bm25Index = rmp_serde::from_slice(&buf[HEADER_LEN..])?;
        Ok(index)
    }

    /// Write the index to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir)?;

        let buf = self.to_bytes()?;

        let tmp_path = path.with_extension("bin.tmp");
        {
            use std::io::Write;
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(&buf)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, path)?;

        info!(
            target: "cyberrag::search",
            path = %path.display(),
            docs = self.doc_count(),
            terms = self.vocabulary_size(),
            bytes = buf.len(),
            "BM25 index saved"
        );
        Ok(())
    }

    /// Load an index previously written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self> {
        let buf = std::fs::read(path)?;
        let index = Self::from_bytes(&buf)?;
        info!(
            target: "cyberrag::search",
            path = %path.display(),
            docs = index.doc_count(),
            terms = index.vocabulary_size(),
            "BM25 index loaded"
        );
        Ok(index)
    }
}

// ============================================================================
// Tests
// ============================================================================
