//! Overlapping fixed-size chunking for the embedding pipeline.
//!
//! The chunker slides a window of `size` characters over the text. Each chunk
//! after the first begins exactly `overlap` characters before the previous
//! chunk's end, so context at cut points appears in both neighbors. Within a
//! window the break position prefers a semantic boundary (paragraph, then
//! sentence, then word), choosing the candidate closest to the target size;
//! only when no boundary exists does it fall back to a hard character cut.

use crate::error::ChunkError;

/// Split `text` into overlapping chunks.
///
/// Requires `overlap < size`. Empty input yields an empty vector.
pub fn chunk(text: &str, size: usize, overlap: usize) -> Result<Vec<String>, ChunkError> {
    Ok(ChunkIter::new(text, size, overlap)?.collect())
}

/// Restartable iterator over the chunks of a text.
///
/// The sequence is finite and deterministic: the same input always produces
/// the same chunks. Construct a fresh iterator to restart.
pub struct ChunkIter {
    chars: Vec<char>,
    size: usize,
    overlap: usize,
    pos: usize,
    done: bool,
}

impl ChunkIter {
    /// Create a chunk iterator, validating the window configuration.
    pub fn new(text: &str, size: usize, overlap: usize) -> Result<Self, ChunkError> {
        if size == 0 || overlap >= size {
            return Err(ChunkError::InvalidConfiguration { size, overlap });
        }
        Ok(Self {
            chars: text.chars().collect(),
            size,
            overlap,
            pos: 0,
            done: false,
        })
    }

    /// Pick the end of the chunk starting at `start`.
    ///
    /// Candidates are searched in `(start + overlap, start + size]` so the
    /// next start (`end - overlap`) always advances past `start`. The latest
    /// candidate of the strongest boundary class wins; ties between classes
    /// are settled by class strength, not position.
    fn break_at(&self, start: usize) -> usize {
        let hard_end = (start + self.size).min(self.chars.len());
        if hard_end == self.chars.len() {
            return hard_end;
        }
        let floor = start + self.overlap + 1;

        let mut sentence = None;
        let mut word = None;
        for end in (floor..=hard_end).rev() {
            if end >= 2 && self.chars[end - 1] == '\n' && self.chars[end - 2] == '\n' {
                return end; // paragraph boundary, closest to target
            }
            if sentence.is_none()
                && end >= 2
                && self.chars[end - 1].is_whitespace()
                && matches!(self.chars[end - 2], '.' | '!' | '?')
            {
                sentence = Some(end);
            }
            if word.is_none() && self.chars[end - 1].is_whitespace() {
                word = Some(end);
            }
        }
        sentence.or(word).unwrap_or(hard_end)
    }
}

impl Iterator for ChunkIter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done || self.pos >= self.chars.len() {
            return None;
        }
        let start = self.pos;
        let end = self.break_at(start);
        let chunk: String = self.chars[start..end].iter().collect();

        if end == self.chars.len() {
            self.done = true;
        } else {
            self.pos = end - self.overlap;
        }
        Some(chunk)
    }
}
