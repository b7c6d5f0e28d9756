//! Text processing: source normalization and embedding-oriented chunking.

pub mod chunker;
pub mod normalize;

pub use chunker::{ChunkIter, chunk};
pub use normalize::{MIN_TEXT_LEN, normalize};
