//! Durable storage of normalized book text and the loaded-book catalog.
//!
//! The cache keeps one text file per document id under `books/`, so
//! re-selecting a book or paginating it never re-fetches the source. The
//! catalog is a JSON file listing everything that has been loaded, in the
//! manner of a small library ledger.

use std::path::{Path, PathBuf};

use crate::error::SourceError;
use crate::source::DocumentRecord;

/// Normalized-text cache, one file per document id.
#[derive(Debug, Clone)]
pub struct BookCache {
    dir: PathBuf,
}

impl BookCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn text_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.txt"))
    }

    /// Whether normalized text for this document is cached.
    pub fn contains(&self, id: &str) -> bool {
        self.text_path(id).is_file()
    }

    /// Persist normalized text, atomically replacing any prior version.
    pub fn store(&self, id: &str, text: &str) -> Result<(), SourceError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| SourceError::Io { source: e })?;
        let tmp = self.dir.join(format!("{id}.txt.tmp"));
        std::fs::write(&tmp, text).map_err(|e| SourceError::Io { source: e })?;
        std::fs::rename(&tmp, self.text_path(id)).map_err(|e| SourceError::Io { source: e })?;
        tracing::debug!(id, chars = text.len(), "cached normalized text");
        Ok(())
    }

    /// Load cached normalized text, or `None` when absent.
    pub fn load(&self, id: &str) -> Result<Option<String>, SourceError> {
        match std::fs::read_to_string(self.text_path(id)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SourceError::Io { source: e }),
        }
    }
}

/// Persistent ledger of loaded documents, backed by `catalog.json`.
pub struct Catalog {
    path: PathBuf,
    records: Vec<DocumentRecord>,
}

impl Catalog {
    /// Open or create a catalog at the given file path.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let records = if path.exists() {
            let data = std::fs::read_to_string(path).map_err(|e| SourceError::CatalogIo {
                message: format!("read {}: {e}", path.display()),
            })?;
            serde_json::from_str(&data).map_err(|e| SourceError::CatalogIo {
                message: format!("parse {}: {e}", path.display()),
            })?
        } else {
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    fn flush(&self) -> Result<(), SourceError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SourceError::CatalogIo {
                message: format!("create dir {}: {e}", parent.display()),
            })?;
        }
        let json =
            serde_json::to_string_pretty(&self.records).map_err(|e| SourceError::CatalogIo {
                message: format!("serialize catalog: {e}"),
            })?;
        std::fs::write(&self.path, json).map_err(|e| SourceError::CatalogIo {
            message: format!("write {}: {e}", self.path.display()),
        })?;
        Ok(())
    }

    /// Insert or replace the record for a document id.
    pub fn upsert(&mut self, record: DocumentRecord) -> Result<(), SourceError> {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
        self.flush()
    }

    /// Look up a record by document id.
    pub fn get(&self, id: &str) -> Option<&DocumentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// All records, in load order.
    pub fn list(&self) -> &[DocumentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DocumentSource;
    use tempfile::TempDir;

    fn record(id: &str, title: &str) -> DocumentRecord {
        DocumentRecord {
            id: id.into(),
            title: title.into(),
            author: Some("Anonymous".into()),
            source: DocumentSource::Inline,
            char_count: 100,
            chunk_count: 2,
            loaded_at: 0,
        }
    }

    #[test]
    fn cache_stores_and_reloads_text() {
        let dir = TempDir::new().unwrap();
        let cache = BookCache::new(dir.path());

        assert!(!cache.contains("pg84"));
        assert_eq!(cache.load("pg84").unwrap(), None);

        cache.store("pg84", "the monster speaks").unwrap();
        assert!(cache.contains("pg84"));
        assert_eq!(
            cache.load("pg84").unwrap().as_deref(),
            Some("the monster speaks")
        );
    }

    #[test]
    fn cache_store_overwrites() {
        let dir = TempDir::new().unwrap();
        let cache = BookCache::new(dir.path());
        cache.store("id", "first").unwrap();
        cache.store("id", "second").unwrap();
        assert_eq!(cache.load("id").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn catalog_upsert_replaces_by_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        let mut catalog = Catalog::open(&path).unwrap();

        catalog.upsert(record("pg84", "Frankenstein")).unwrap();
        catalog.upsert(record("pg84", "Frankenstein; or, The Modern Prometheus")).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("pg84").unwrap().title.contains("Prometheus"));
    }

    #[test]
    fn catalog_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        {
            let mut catalog = Catalog::open(&path).unwrap();
            catalog.upsert(record("pg1342", "Pride and Prejudice")).unwrap();
        }
        let catalog = Catalog::open(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("pg1342").unwrap().title, "Pride and Prejudice");
    }
}
