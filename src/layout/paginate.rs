//! Greedy pagination of paragraphs into fixed-height pages.
//!
//! Each paragraph's rendered height is estimated up front (headings cost a
//! fixed decorative block, prose costs its wrapped line count) and pages are
//! filled greedily. A paragraph that would overflow a non-empty page starts
//! the next page; a paragraph taller than a whole page still gets placed,
//! alone, rather than being dropped or split.

use crate::layout::heading::is_chapter_heading;
use crate::layout::metrics::{FontStyle, TextMetrics};
use crate::layout::wrap::wrap_words;
use crate::layout::{
    FIRST_LINE_INDENT, HEADING_BLOCK_HEIGHT, LINE_HEIGHT, PARAGRAPH_SPACING, text_width,
    usable_height,
};

/// A paragraph as the paginator classified it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphBlock {
    /// Empty paragraph: contributes a half-line spacer.
    Blank,
    /// Structural heading, rendered with decoration.
    Heading(String),
    /// Prose, rendered wrapped and justified.
    Prose(String),
}

/// One page worth of blocks, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub blocks: Vec<ParagraphBlock>,
}

/// Split normalized text into paragraphs on blank-line boundaries.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect()
}

/// Classify one paragraph.
fn classify(paragraph: &str) -> ParagraphBlock {
    let trimmed = paragraph.trim();
    if trimmed.is_empty() {
        ParagraphBlock::Blank
    } else if is_chapter_heading(trimmed) {
        ParagraphBlock::Heading(trimmed.to_string())
    } else {
        ParagraphBlock::Prose(trimmed.to_string())
    }
}

/// Estimated rendered height of a block against the given wrap width.
pub fn block_height(block: &ParagraphBlock, wrap_width: u32, metrics: &dyn TextMetrics) -> u32 {
    match block {
        ParagraphBlock::Blank => LINE_HEIGHT / 2,
        ParagraphBlock::Heading(_) => HEADING_BLOCK_HEIGHT,
        ParagraphBlock::Prose(text) => {
            let words: Vec<&str> = text.split_whitespace().collect();
            let lines = wrap_words(&words, wrap_width, metrics, FontStyle::Body);
            lines.len() as u32 * LINE_HEIGHT + PARAGRAPH_SPACING
        }
    }
}

/// Pack `text` into pages bounded by the standard usable height.
pub fn paginate(text: &str, metrics: &dyn TextMetrics) -> Vec<Page> {
    paginate_into(text, metrics, text_width(), usable_height())
}

/// Pack `text` into pages with explicit dimensions.
///
/// Prose height is estimated against `page_width` minus the first-line
/// indent, matching how the renderer wraps. Deterministic: identical input
/// always yields the identical page split.
pub fn paginate_into(
    text: &str,
    metrics: &dyn TextMetrics,
    page_width: u32,
    usable_page_height: u32,
) -> Vec<Page> {
    let wrap_width = page_width.saturating_sub(FIRST_LINE_INDENT);
    let mut pages = Vec::new();
    let mut current: Vec<ParagraphBlock> = Vec::new();
    let mut current_height = 0u32;

    for paragraph in split_paragraphs(text) {
        let block = classify(&paragraph);
        let needed = block_height(&block, wrap_width, metrics);

        if current_height + needed > usable_page_height && !current.is_empty() {
            pages.push(Page {
                blocks: std::mem::take(&mut current),
            });
            current_height = 0;
        }

        current_height += needed;
        current.push(block);
    }

    if !current.is_empty() {
        pages.push(Page { blocks: current });
    }

    tracing::debug!(pages = pages.len(), "paginated text");
    pages
}
