//! Vector index over the chunks of one book.
//!
//! The index maps each chunk to its embedding and answers top-k similarity
//! queries. It is always rebuilt wholesale from a fresh chunk set, never
//! mutated incrementally, and at most one index exists on disk at a time.

pub mod store;

use serde::{Deserialize, Serialize};

use crate::embed::Embedder;
use crate::error::IndexError;

pub use store::IndexStore;

/// One chunk with its embedding, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct IndexEntry {
    pub text: String,
    pub vector: Vec<f32>,
}

/// A query hit: the chunk text and its similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub text: String,
    pub score: f32,
}

/// A loaded, validated index ready for queries.
#[derive(Debug)]
pub struct IndexHandle {
    pub(crate) document_id: String,
    pub(crate) dimension: usize,
    pub(crate) entries: Vec<IndexEntry>,
}

impl IndexHandle {
    /// Stable id of the document this index was built from.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embed `text` and return the `k` most similar chunks, best first.
    ///
    /// Ties are broken by original chunk order (first-seen wins), so results
    /// are fully deterministic.
    pub fn query(
        &self,
        embedder: &dyn Embedder,
        text: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, IndexError> {
        let query = embedder.embed(text)?;
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let scores: Vec<f32> = self
            .entries
            .iter()
            .map(|e| cosine_similarity(&query, &e.vector))
            .collect();

        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

        Ok(order
            .into_iter()
            .take(k)
            .map(|i| ScoredChunk {
                text: self.entries[i].text.clone(),
                score: scores[i],
            })
            .collect())
    }
}

/// Cosine similarity of two equal-length vectors. Zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::HashEmbedder;

    fn handle_from(texts: &[&str], embedder: &HashEmbedder) -> IndexHandle {
        IndexHandle {
            document_id: "test".into(),
            dimension: embedder.dimension(),
            entries: texts
                .iter()
                .map(|t| IndexEntry {
                    text: (*t).into(),
                    vector: embedder.embed(t).unwrap(),
                })
                .collect(),
        }
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn query_returns_best_match_first() {
        let embedder = HashEmbedder::default();
        let handle = handle_from(
            &[
                "the monster fled across the frozen ice",
                "tea was served precisely at four o'clock",
                "the creature crossed the ice toward the pole",
            ],
            &embedder,
        );

        let hits = handle
            .query(&embedder, "monster on the frozen ice", 2)
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].text.contains("ice"));
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn ties_break_by_chunk_order() {
        let embedder = HashEmbedder::default();
        // Identical chunks embed identically, so scores tie exactly.
        let handle = handle_from(&["same words here", "same words here"], &embedder);
        let hits = handle.query(&embedder, "same words here", 2).unwrap();
        assert_eq!(hits[0].score, hits[1].score);
        // first-seen wins: both texts equal, but order must be stable
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let small = HashEmbedder::new(8);
        let large = HashEmbedder::new(16);
        let handle = handle_from(&["a chunk of text"], &small);
        let err = handle.query(&large, "query", 1).unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 8,
                actual: 16
            }
        ));
    }

    #[test]
    fn k_larger_than_index_returns_everything() {
        let embedder = HashEmbedder::default();
        let handle = handle_from(&["one", "two"], &embedder);
        let hits = handle.query(&embedder, "one", 10).unwrap();
        assert_eq!(hits.len(), 2);
    }
}
