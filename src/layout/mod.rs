//! Page layout engine: pagination, word wrap, justification, and rendering.
//!
//! The canvas is A4 at 96 dpi. The paginator packs paragraphs into pages by
//! estimated height; the renderer lays each page out as a display list of
//! positioned text runs and rules. Both are pure and deterministic:
//! identical input always yields identical output.

pub mod heading;
pub mod metrics;
pub mod paginate;
pub mod render;
pub mod wrap;

pub use heading::is_chapter_heading;
pub use metrics::{FontStyle, SerifMetrics, TextMetrics};
pub use paginate::{Page, ParagraphBlock, block_height, paginate, paginate_into, split_paragraphs};
pub use render::{DrawOp, RenderedPage, render_page, section_pages};
pub use wrap::{justify_offsets, line_width, wrap_words};

/// Canvas width in pixels (A4 at 96 dpi).
pub const PAGE_WIDTH: u32 = 794;
/// Canvas height in pixels (A4 at 96 dpi).
pub const PAGE_HEIGHT: u32 = 1123;
/// Left and right margin.
pub const MARGIN_X: u32 = 82;
/// Top margin.
pub const MARGIN_TOP: u32 = 88;
/// Bottom margin.
pub const MARGIN_BOTTOM: u32 = 80;
/// Body line height.
pub const LINE_HEIGHT: u32 = 30;
/// First-line indent for prose paragraphs.
pub const FIRST_LINE_INDENT: u32 = 22;
/// Vertical gap after a prose paragraph.
pub const PARAGRAPH_SPACING: u32 = 8;
/// Total vertical cost of a chapter heading: rule, gap, heading line, rule,
/// and trailing spacing.
pub const HEADING_BLOCK_HEIGHT: u32 = 18 + 14 + 34 + 20 + 30;
/// Character budget for the running header's author and title.
pub const HEADER_CHAR_BUDGET: usize = 38;
/// Characters of book text paginated per section.
pub const SECTION_CHARS: usize = 40_000;

/// Horizontal space available to body text.
pub const fn text_width() -> u32 {
    PAGE_WIDTH - 2 * MARGIN_X
}

/// Vertical space the paginator may fill on one page.
pub const fn usable_height() -> u32 {
    PAGE_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM - 30
}
