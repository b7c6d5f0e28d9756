//! On-disk lifecycle of the single active index.
//!
//! ## Persisted format
//!
//! ```text
//! magic "BKIX" (4) | version u16 LE | payload crc32 u32 LE | payload len u64 LE | payload
//! ```
//!
//! The payload is a bincode-encoded [`PersistedIndex`]. The header is
//! validated before the payload is ever decoded, so stale, truncated, or
//! foreign files are rejected with `IndexCorrupt` instead of being trusted.
//!
//! ## Atomic publish
//!
//! `build` writes the full file to `index.bin.tmp` in the index directory and
//! renames it over `index.bin`. A concurrent `load` therefore observes either
//! the previous complete index or the new complete index, never a partial one.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::embed::Embedder;
use crate::error::{EmbedError, IndexError};
use crate::index::{IndexEntry, IndexHandle, ScoredChunk};

const INDEX_MAGIC: [u8; 4] = *b"BKIX";
const INDEX_VERSION: u16 = 1;
const HEADER_LEN: usize = 4 + 2 + 4 + 8;

const INDEX_FILE: &str = "index.bin";
const INDEX_TMP: &str = "index.bin.tmp";

/// Serialized body of the index file.
#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    document_id: String,
    dimension: u32,
    entries: Vec<IndexEntry>,
}

/// Owns the well-known on-disk location of the active index.
#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    /// Create a store rooted at the given index directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// Cheap existence check: is there an index to query?
    pub fn exists(&self) -> bool {
        self.index_path().is_file()
    }

    /// Embed every chunk and persist a fresh index, atomically replacing any
    /// prior one. The chunk set always describes exactly one document.
    pub fn build(
        &self,
        embedder: &dyn Embedder,
        document_id: &str,
        chunks: &[String],
    ) -> Result<(), IndexError> {
        let dimension = embedder.dimension();
        tracing::info!(
            document = document_id,
            chunks = chunks.len(),
            dim = dimension,
            "building index"
        );

        let entries: Vec<IndexEntry> = chunks
            .par_iter()
            .map(|text| {
                let vector = embedder.embed(text)?;
                if vector.len() != dimension {
                    return Err(EmbedError::InvalidVector {
                        message: format!(
                            "expected {dimension} dims, got {} for a chunk",
                            vector.len()
                        ),
                    });
                }
                Ok(IndexEntry {
                    text: text.clone(),
                    vector,
                })
            })
            .collect::<Result<_, EmbedError>>()?;

        let persisted = PersistedIndex {
            document_id: document_id.to_string(),
            dimension: dimension as u32,
            entries,
        };
        let payload = bincode::serialize(&persisted).map_err(|e| IndexError::Serialization {
            message: format!("encode index: {e}"),
        })?;

        let mut file = Vec::with_capacity(HEADER_LEN + payload.len());
        file.extend_from_slice(&INDEX_MAGIC);
        file.extend_from_slice(&INDEX_VERSION.to_le_bytes());
        file.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        file.extend_from_slice(&(payload.len() as u64).to_le_bytes());
        file.extend_from_slice(&payload);

        std::fs::create_dir_all(&self.dir).map_err(|e| IndexError::Io { source: e })?;
        let tmp = self.dir.join(INDEX_TMP);
        std::fs::write(&tmp, &file).map_err(|e| IndexError::Io { source: e })?;
        std::fs::rename(&tmp, self.index_path()).map_err(|e| IndexError::Io { source: e })?;

        tracing::debug!(bytes = file.len(), "index published");
        Ok(())
    }

    /// Load and validate the persisted index.
    ///
    /// Fails with `IndexNotFound` when no index exists and `IndexCorrupt`
    /// when the file cannot be validated (wrong magic, version, checksum,
    /// or structure). Corruption is recoverable by rebuilding.
    pub fn load(&self) -> Result<IndexHandle, IndexError> {
        let path = self.index_path();
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IndexError::NotFound);
            }
            Err(e) => return Err(IndexError::Io { source: e }),
        };

        let payload = validate_header(&data)?;
        let persisted: PersistedIndex =
            bincode::deserialize(payload).map_err(|e| IndexError::Corrupt {
                message: format!("payload decode failed: {e}"),
            })?;

        let dimension = persisted.dimension as usize;
        if dimension == 0 {
            return Err(IndexError::Corrupt {
                message: "zero vector dimension".into(),
            });
        }
        if let Some(bad) = persisted
            .entries
            .iter()
            .position(|e| e.vector.len() != dimension)
        {
            return Err(IndexError::Corrupt {
                message: format!("entry {bad} has wrong vector length"),
            });
        }

        Ok(IndexHandle {
            document_id: persisted.document_id,
            dimension,
            entries: persisted.entries,
        })
    }

    /// Convenience: load the index and query it in one step.
    pub fn query(
        &self,
        embedder: &dyn Embedder,
        text: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, IndexError> {
        self.load()?.query(embedder, text, k)
    }

    /// Id of the document the on-disk index was built from, or `None` when
    /// no index exists. Corruption is surfaced so callers can rebuild.
    pub fn active_document(&self) -> Result<Option<String>, IndexError> {
        match self.load() {
            Ok(handle) => Ok(Some(handle.document_id)),
            Err(IndexError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Directory this store persists into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Check magic, version, length, and checksum; return the payload slice.
fn validate_header(data: &[u8]) -> Result<&[u8], IndexError> {
    if data.len() < HEADER_LEN {
        return Err(IndexError::Corrupt {
            message: format!("file too short for header: {} bytes", data.len()),
        });
    }
    if data[0..4] != INDEX_MAGIC {
        return Err(IndexError::Corrupt {
            message: "bad magic: not a bibliomancer index".into(),
        });
    }
    let version = u16::from_le_bytes([data[4], data[5]]);
    if version != INDEX_VERSION {
        return Err(IndexError::Corrupt {
            message: format!("unsupported index version {version}"),
        });
    }
    let checksum = u32::from_le_bytes([data[6], data[7], data[8], data[9]]);
    let payload_len = u64::from_le_bytes([
        data[10], data[11], data[12], data[13], data[14], data[15], data[16], data[17],
    ]) as usize;

    let payload = &data[HEADER_LEN..];
    if payload.len() != payload_len {
        return Err(IndexError::Corrupt {
            message: format!(
                "payload length mismatch: header says {payload_len}, file has {}",
                payload.len()
            ),
        });
    }
    if crc32fast::hash(payload) != checksum {
        return Err(IndexError::Corrupt {
            message: "checksum mismatch".into(),
        });
    }
    Ok(payload)
}
