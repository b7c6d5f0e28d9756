//! Query-time retrieval: question in, relevant passages out.

use crate::embed::Embedder;
use crate::error::{BiblioResult, IndexError};
use crate::index::IndexStore;

/// Default number of passages supplied to the answer assembler.
pub const DEFAULT_TOP_K: usize = 4;

/// Outcome of a retrieval attempt.
///
/// `NoDocument` is a normal state, not an error: nothing has been indexed
/// yet, so there is nothing to retrieve from.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    /// No index exists; no book has been loaded.
    NoDocument,
    /// The most similar chunk texts, best first.
    Passages(Vec<String>),
}

/// Retrieves the top-k most similar chunks for a question.
pub struct Retriever<'a> {
    store: &'a IndexStore,
    embedder: &'a dyn Embedder,
}

impl<'a> Retriever<'a> {
    pub fn new(store: &'a IndexStore, embedder: &'a dyn Embedder) -> Self {
        Self { store, embedder }
    }

    /// Embed the question and return the `k` best chunk texts.
    ///
    /// Scores stay internal to ranking; callers only see text. A missing
    /// index yields [`Retrieval::NoDocument`] rather than an error.
    pub fn retrieve(&self, question: &str, k: usize) -> BiblioResult<Retrieval> {
        if !self.store.exists() {
            tracing::debug!("retrieve called with no index on disk");
            return Ok(Retrieval::NoDocument);
        }

        let handle = match self.store.load() {
            Ok(handle) => handle,
            // exists() raced a concurrent replace; treat like the index
            // never being there.
            Err(IndexError::NotFound) => return Ok(Retrieval::NoDocument),
            Err(e) => return Err(e.into()),
        };

        let hits = handle.query(self.embedder, question, k)?;
        tracing::debug!(hits = hits.len(), k, "retrieved passages");
        Ok(Retrieval::Passages(
            hits.into_iter().map(|h| h.text).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::HashEmbedder;
    use tempfile::TempDir;

    #[test]
    fn no_index_is_a_sentinel_not_an_error() {
        let dir = TempDir::new().unwrap();
        let store = IndexStore::new(dir.path());
        let embedder = HashEmbedder::default();
        let retriever = Retriever::new(&store, &embedder);

        let outcome = retriever.retrieve("who is the captain?", 4).unwrap();
        assert_eq!(outcome, Retrieval::NoDocument);
    }

    #[test]
    fn passages_come_back_in_rank_order() {
        let dir = TempDir::new().unwrap();
        let store = IndexStore::new(dir.path());
        let embedder = HashEmbedder::default();

        let chunks = vec![
            "the captain nailed a gold coin to the mast".to_string(),
            "breakfast was biscuits and salted pork".to_string(),
            "the gold coin would reward whoever sighted the whale".to_string(),
        ];
        store.build(&embedder, "doc", &chunks).unwrap();

        let retriever = Retriever::new(&store, &embedder);
        let outcome = retriever.retrieve("who gets the gold coin?", 2).unwrap();
        let Retrieval::Passages(passages) = outcome else {
            panic!("expected passages");
        };
        assert_eq!(passages.len(), 2);
        assert!(passages[0].contains("gold coin"));
    }
}
