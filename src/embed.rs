//! Embedding capability boundary.
//!
//! The index never talks to a model directly; it goes through [`Embedder`].
//! Two implementations ship with the crate: `OllamaEmbedder` (in the `ollama`
//! module) for real semantic vectors, and [`HashEmbedder`], a deterministic
//! feature-hashing fallback that needs no network and keeps the whole
//! pipeline testable offline.

use crate::error::EmbedError;

/// A capability that turns a text span into a fixed-dimension vector.
///
/// Implementations must be deterministic enough that embedding the same text
/// twice ranks the same against a fixed index.
pub trait Embedder: Send + Sync {
    /// Dimension of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Embed a text span.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// Deterministic feature-hashing embedder.
///
/// Tokens are lowercased alphanumeric runs; each token hashes to a signed
/// bucket and the resulting vector is L2-normalized. Texts sharing vocabulary
/// land near each other, which is all retrieval needs for offline use and
/// tests. No model, no network, no randomness.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut acc = vec![0.0f32; self.dimension];
        let lower = text.to_lowercase();

        for token in lower.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            let h = crc32fast::hash(token.as_bytes());
            let bucket = (h >> 1) as usize % self.dimension;
            let sign = if h & 1 == 0 { 1.0 } else { -1.0 };
            acc[bucket] += sign;
        }

        let norm = acc.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut acc {
                *v /= norm;
            }
        }
        Ok(acc)
    }
}
