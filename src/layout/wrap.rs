//! Word wrapping and line justification.
//!
//! Wrapping is greedy: words are packed onto a line while the measured width
//! fits. Justification distributes the leftover width of a line across its
//! inter-word gaps in whole pixels: the first `remainder` gaps get one extra
//! pixel, so no gap ever differs from another by more than one unit and the
//! line fills its target width exactly.

use crate::layout::metrics::{FontStyle, TextMetrics};

/// Measured width of words joined by single spaces.
pub fn line_width(words: &[&str], metrics: &dyn TextMetrics, style: FontStyle) -> u32 {
    let text: u32 = words.iter().map(|w| metrics.advance(w, style)).sum();
    let spaces = words.len().saturating_sub(1) as u32 * metrics.space_width(style);
    text + spaces
}

/// Greedily wrap `words` into lines no wider than `max_width`.
///
/// A single word wider than `max_width` still gets its own line; wrapping
/// never drops content and never loops.
pub fn wrap_words<'a>(
    words: &[&'a str],
    max_width: u32,
    metrics: &dyn TextMetrics,
    style: FontStyle,
) -> Vec<Vec<&'a str>> {
    let mut lines: Vec<Vec<&'a str>> = Vec::new();
    let mut current: Vec<&'a str> = Vec::new();

    for &word in words {
        let mut candidate = current.clone();
        candidate.push(word);
        if line_width(&candidate, metrics, style) <= max_width || current.is_empty() {
            current = candidate;
        } else {
            lines.push(current);
            current = vec![word];
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// X-offsets (relative to the line start) fully justifying `words` to
/// `target_width`.
///
/// Requires at least two words; last lines and single-word lines are left
/// aligned by the caller instead. If the words already overflow the target,
/// gaps collapse to zero rather than going negative.
pub fn justify_offsets(
    words: &[&str],
    target_width: u32,
    metrics: &dyn TextMetrics,
    style: FontStyle,
) -> Vec<u32> {
    debug_assert!(words.len() >= 2);
    let text_total: u32 = words.iter().map(|w| metrics.advance(w, style)).sum();
    let gap_total = target_width.saturating_sub(text_total);
    let gaps = (words.len() - 1) as u32;
    let base = gap_total / gaps;
    let extra = gap_total % gaps;

    let mut offsets = Vec::with_capacity(words.len());
    let mut x = 0u32;
    for (i, word) in words.iter().enumerate() {
        offsets.push(x);
        x += metrics.advance(word, style) + base;
        if (i as u32) < extra {
            x += 1;
        }
    }
    offsets
}
