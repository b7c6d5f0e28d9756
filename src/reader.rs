//! Reader facade: the top-level API tying the pipeline together.
//!
//! Owns the durable state (index store, text cache, catalog) and the two
//! model capabilities, and exposes the operations the presentation layer
//! needs: load a document, ask a question, render section pages.
//!
//! Loading is idempotent per document id: re-selecting the active book is a
//! no-op, a previously loaded book rebuilds its index from cached text
//! without refetching, and a new book replaces the index wholesale.

use std::path::Path;

use crate::config::BiblioConfig;
use crate::embed::Embedder;
use crate::error::{BiblioError, BiblioResult, IndexError};
use crate::index::IndexStore;
use crate::layout::{RenderedPage, SerifMetrics, section_pages};
use crate::paths::BiblioPaths;
use crate::qa::{self, Generator};
use crate::retrieve::{Retrieval, Retriever};
use crate::session::Session;
use crate::source::{
    BookCache, Catalog, DocumentRecord, DocumentSource, document_id, extract_text, fetch_book,
};
use crate::text::{chunk, normalize};

/// Answer returned when a question arrives before any book has been loaded.
/// This is a normal state, not an error.
pub const NO_DOCUMENT_MESSAGE: &str =
    "No book is loaded yet. Load one from the shelf or upload a file first.";

/// Result of a load operation.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub record: DocumentRecord,
    /// True when the cached normalized text was reused instead of refetching.
    pub reused_cache: bool,
}

/// Snapshot of reader state for the presentation layer.
#[derive(Debug, Clone)]
pub struct ReaderStatus {
    /// Record of the document the on-disk index was built from.
    pub active: Option<DocumentRecord>,
    /// Number of books in the catalog.
    pub known_books: usize,
    /// Whether an index exists on disk.
    pub index_exists: bool,
}

/// Top-level facade owning storage and capabilities.
pub struct Reader {
    config: BiblioConfig,
    store: IndexStore,
    cache: BookCache,
    catalog: Catalog,
    embedder: Box<dyn Embedder>,
    generator: Box<dyn Generator>,
}

impl Reader {
    /// Open a reader over the given directory layout.
    pub fn open(
        paths: &BiblioPaths,
        config: BiblioConfig,
        embedder: Box<dyn Embedder>,
        generator: Box<dyn Generator>,
    ) -> BiblioResult<Self> {
        paths.ensure_dirs()?;
        Ok(Self {
            config,
            store: IndexStore::new(paths.index_dir()),
            cache: BookCache::new(paths.books_dir()),
            catalog: Catalog::open(&paths.catalog_file())?,
            embedder,
            generator,
        })
    }

    /// Load a book from a URL, indexing it for questions.
    pub fn load_url(
        &mut self,
        session: &mut Session,
        url: &str,
        title: Option<String>,
        author: Option<String>,
    ) -> BiblioResult<LoadOutcome> {
        let id = document_id(url);
        if let Some(outcome) = self.reuse_cached(session, &id)? {
            return Ok(outcome);
        }

        let raw = fetch_book(url, self.config.fetch.timeout_secs)?;
        let normalized = normalize(&raw)?;
        let title = title.unwrap_or_else(|| derive_title(url, &id));
        self.install(
            session,
            id,
            DocumentSource::Url(url.to_string()),
            title,
            author,
            &normalized,
        )
    }

    /// Load a book from a local file (plain text or PDF).
    pub fn load_file(
        &mut self,
        session: &mut Session,
        path: &Path,
        title: Option<String>,
        author: Option<String>,
    ) -> BiblioResult<LoadOutcome> {
        let locator = path.display().to_string();
        let id = document_id(&locator);
        if let Some(outcome) = self.reuse_cached(session, &id)? {
            return Ok(outcome);
        }

        let raw = extract_text(path)?;
        let normalized = normalize(&raw)?;
        let title = title.unwrap_or_else(|| derive_title(&locator, &id));
        self.install(
            session,
            id,
            DocumentSource::File(locator),
            title,
            author,
            &normalized,
        )
    }

    /// Load a book from text handed in directly.
    pub fn load_inline(
        &mut self,
        session: &mut Session,
        text: &str,
        title: &str,
        author: Option<String>,
    ) -> BiblioResult<LoadOutcome> {
        let id = document_id(title);
        if let Some(outcome) = self.reuse_cached(session, &id)? {
            return Ok(outcome);
        }
        let normalized = normalize(text)?;
        self.install(
            session,
            id,
            DocumentSource::Inline,
            title.to_string(),
            author,
            &normalized,
        )
    }

    /// Answer a question about the active book.
    ///
    /// With no index on disk this returns [`NO_DOCUMENT_MESSAGE`] rather than
    /// failing. A corrupt index triggers one rebuild from the cached text
    /// before the error is surfaced.
    pub fn ask(&self, session: &mut Session, question: &str) -> BiblioResult<String> {
        let k = self.config.retrieval.top_k;
        let retriever = Retriever::new(&self.store, self.embedder.as_ref());

        let retrieval = match retriever.retrieve(question, k) {
            Err(BiblioError::Index(IndexError::Corrupt { message })) => {
                tracing::warn!(%message, "index corrupt; rebuilding from cached text");
                self.rebuild_from_cache(session)?;
                Retriever::new(&self.store, self.embedder.as_ref()).retrieve(question, k)?
            }
            other => other?,
        };

        match retrieval {
            Retrieval::NoDocument => Ok(NO_DOCUMENT_MESSAGE.to_string()),
            Retrieval::Passages(passages) => Ok(qa::answer(
                self.generator.as_ref(),
                &mut session.conversation,
                question,
                &passages,
            )?),
        }
    }

    /// Render one section of the active book as typeset pages.
    pub fn section_pages(
        &self,
        session: &Session,
        section: usize,
    ) -> BiblioResult<(Vec<RenderedPage>, usize)> {
        let id = match &session.active_document {
            Some(id) => id.clone(),
            None => self
                .store
                .active_document()?
                .ok_or(BiblioError::Index(IndexError::NotFound))?,
        };
        let text = self
            .cache
            .load(&id)?
            .ok_or(BiblioError::Index(IndexError::NotFound))?;

        let record = self.catalog.get(&id);
        let title = record.map(|r| r.title.clone()).unwrap_or_else(|| id.clone());
        let author = record
            .and_then(|r| r.author.clone())
            .unwrap_or_default();

        Ok(section_pages(&text, &title, &author, section, &SerifMetrics))
    }

    /// Current reader state.
    pub fn status(&self) -> BiblioResult<ReaderStatus> {
        let active = match self.store.active_document() {
            Ok(Some(id)) => self.catalog.get(&id).cloned(),
            Ok(None) => None,
            // A corrupt index still means "something is there"; report no
            // active record and let the next ask() trigger recovery.
            Err(IndexError::Corrupt { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        Ok(ReaderStatus {
            active,
            known_books: self.catalog.len(),
            index_exists: self.store.exists(),
        })
    }

    /// The loaded-book catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Cached normalized text for a document, if present.
    pub fn cached_text(&self, id: &str) -> BiblioResult<Option<String>> {
        Ok(self.cache.load(id)?)
    }

    /// Reuse cached normalized text for `id` when present.
    ///
    /// If the on-disk index already belongs to `id` this is a pure cache hit;
    /// otherwise the index is rebuilt from the cached text, replacing
    /// whatever was there.
    fn reuse_cached(
        &mut self,
        session: &mut Session,
        id: &str,
    ) -> BiblioResult<Option<LoadOutcome>> {
        if !self.cache.contains(id) {
            return Ok(None);
        }
        let Some(record) = self.catalog.get(id).cloned() else {
            return Ok(None);
        };

        let index_matches = match self.store.active_document() {
            Ok(Some(active)) => active == id,
            Ok(None) => false,
            Err(IndexError::Corrupt { message }) => {
                tracing::warn!(%message, "index corrupt; will rebuild");
                false
            }
            Err(e) => return Err(e.into()),
        };

        if !index_matches {
            let text = self.cache.load(id)?.ok_or_else(|| IndexError::Corrupt {
                message: format!("cached text for {id} disappeared"),
            })?;
            let chunks = chunk(
                &text,
                self.config.chunking.chunk_size,
                self.config.chunking.chunk_overlap,
            )?;
            self.store.build(self.embedder.as_ref(), id, &chunks)?;
        }

        tracing::info!(id, reindexed = !index_matches, "reusing cached book");
        session.activate(id);
        Ok(Some(LoadOutcome {
            record,
            reused_cache: true,
        }))
    }

    /// Normalize → cache → chunk → index → catalog, replacing prior state.
    fn install(
        &mut self,
        session: &mut Session,
        id: String,
        source: DocumentSource,
        title: String,
        author: Option<String>,
        normalized: &str,
    ) -> BiblioResult<LoadOutcome> {
        let chunks = chunk(
            normalized,
            self.config.chunking.chunk_size,
            self.config.chunking.chunk_overlap,
        )?;

        self.cache.store(&id, normalized)?;
        self.store.build(self.embedder.as_ref(), &id, &chunks)?;

        let record = DocumentRecord {
            id: id.clone(),
            title,
            author,
            source,
            char_count: normalized.chars().count(),
            chunk_count: chunks.len(),
            loaded_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        };
        self.catalog.upsert(record.clone())?;
        session.activate(&id);

        tracing::info!(
            id = %id,
            title = %record.title,
            chunks = record.chunk_count,
            "book loaded and indexed"
        );
        Ok(LoadOutcome {
            record,
            reused_cache: false,
        })
    }

    /// Rebuild the index for the session's document from cached text.
    fn rebuild_from_cache(&self, session: &Session) -> BiblioResult<()> {
        let id = session
            .active_document
            .clone()
            .or_else(|| self.catalog.list().last().map(|r| r.id.clone()))
            .ok_or(IndexError::Corrupt {
                message: "no cached document to rebuild from".into(),
            })?;
        let text = self.cache.load(&id)?.ok_or_else(|| IndexError::Corrupt {
            message: format!("no cached text for {id}"),
        })?;
        let chunks = chunk(
            &text,
            self.config.chunking.chunk_size,
            self.config.chunking.chunk_overlap,
        )?;
        self.store.build(self.embedder.as_ref(), &id, &chunks)?;
        tracing::info!(id = %id, "index rebuilt from cached text");
        Ok(())
    }
}

/// Derive a displayable title from a locator's last path segment.
fn derive_title(locator: &str, fallback: &str) -> String {
    let segment = locator
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(locator);
    let stem = segment
        .trim_end_matches(".txt")
        .trim_end_matches(".pdf")
        .replace(['-', '_'], " ");
    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .take(50)
        .collect();
    let cleaned = cleaned.trim().to_string();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::HashEmbedder;
    use crate::error::LlmError;
    use crate::qa::Generation;
    use tempfile::TempDir;

    struct EchoGenerator;

    impl Generator for EchoGenerator {
        fn generate(&self, _prompt: &str) -> Result<Generation, LlmError> {
            Ok(Generation::Answer("a grounded answer".into()))
        }
    }

    fn book_text(marker: &str) -> String {
        format!("{marker}.\n\n")
            + &"The ship sailed on through the long night, and the crew slept uneasily. "
                .repeat(30)
    }

    fn open_reader(dir: &TempDir) -> Reader {
        let paths = BiblioPaths::rooted_at(dir.path());
        Reader::open(
            &paths,
            BiblioConfig::default(),
            Box::new(HashEmbedder::default()),
            Box::new(EchoGenerator),
        )
        .unwrap()
    }

    #[test]
    fn ask_before_any_load_returns_sentinel_message() {
        let dir = TempDir::new().unwrap();
        let reader = open_reader(&dir);
        let mut session = Session::new();

        let answer = reader.ask(&mut session, "who is the captain?").unwrap();
        assert_eq!(answer, NO_DOCUMENT_MESSAGE);
        assert!(session.conversation.is_empty());
    }

    #[test]
    fn load_then_ask_answers_and_logs() {
        let dir = TempDir::new().unwrap();
        let mut reader = open_reader(&dir);
        let mut session = Session::new();

        let outcome = reader
            .load_inline(&mut session, &book_text("The captain was Ahab"), "Test Book", None)
            .unwrap();
        assert!(!outcome.reused_cache);
        assert!(outcome.record.chunk_count >= 1);
        assert_eq!(session.active_document.as_deref(), Some(outcome.record.id.as_str()));

        let answer = reader.ask(&mut session, "who was the captain?").unwrap();
        assert_eq!(answer, "a grounded answer");
        assert_eq!(session.conversation.len(), 1);
    }

    #[test]
    fn reselecting_the_same_book_reuses_the_cache() {
        let dir = TempDir::new().unwrap();
        let mut reader = open_reader(&dir);
        let mut session = Session::new();

        let text = book_text("A memorable opening line");
        reader.load_inline(&mut session, &text, "Same Book", None).unwrap();
        let again = reader
            .load_inline(&mut session, &text, "Same Book", None)
            .unwrap();
        assert!(again.reused_cache);
    }

    #[test]
    fn loading_a_new_book_replaces_the_index() {
        let dir = TempDir::new().unwrap();
        let mut reader = open_reader(&dir);
        let mut session = Session::new();

        reader
            .load_inline(&mut session, &book_text("Book one marker"), "Book One", None)
            .unwrap();
        reader
            .load_inline(&mut session, &book_text("Book two marker"), "Book Two", None)
            .unwrap();

        let status = reader.status().unwrap();
        assert_eq!(status.known_books, 2);
        assert_eq!(status.active.unwrap().title, "Book Two");
    }

    #[test]
    fn corrupt_index_recovers_from_cached_text() {
        let dir = TempDir::new().unwrap();
        let mut reader = open_reader(&dir);
        let mut session = Session::new();

        reader
            .load_inline(&mut session, &book_text("Recovery marker"), "Fragile Book", None)
            .unwrap();

        // Vandalize the index file.
        let index_path = dir.path().join("index").join("index.bin");
        std::fs::write(&index_path, b"garbage").unwrap();

        let answer = reader.ask(&mut session, "what happened?").unwrap();
        assert_eq!(answer, "a grounded answer");
    }

    #[test]
    fn section_pages_render_for_the_active_book() {
        let dir = TempDir::new().unwrap();
        let mut reader = open_reader(&dir);
        let mut session = Session::new();

        reader
            .load_inline(&mut session, &book_text("Pages marker"), "Paged Book", None)
            .unwrap();
        let (pages, total) = reader.section_pages(&session, 0).unwrap();
        assert_eq!(total, 1);
        assert!(!pages.is_empty());
    }

    #[test]
    fn derive_title_cleans_the_last_segment() {
        assert_eq!(
            derive_title("https://example.com/books/moby-dick.txt", "x"),
            "moby dick"
        );
        assert_eq!(derive_title("///", "fallback-id"), "fallback-id");
    }
}
