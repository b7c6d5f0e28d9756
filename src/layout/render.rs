//! Rendering a page into a display list.
//!
//! The renderer turns one [`Page`] into positioned draw operations on the
//! fixed canvas: a running header, the body blocks, and a footer. Rasterizing
//! the operations into pixels is the presentation layer's job; everything
//! that requires measurement (centering, justification, truncation) is
//! decided here.

use crate::layout::metrics::{FontStyle, TextMetrics};
use crate::layout::paginate::{Page, ParagraphBlock, paginate};
use crate::layout::wrap::{justify_offsets, wrap_words};
use crate::layout::{
    FIRST_LINE_INDENT, HEADER_CHAR_BUDGET, HEADING_BLOCK_HEIGHT, LINE_HEIGHT, MARGIN_BOTTOM,
    MARGIN_TOP, MARGIN_X, PAGE_HEIGHT, PAGE_WIDTH, PARAGRAPH_SPACING, SECTION_CHARS, text_width,
};

/// One drawing operation on the page canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    /// Horizontal rule from `x0` to `x1` at height `y`.
    Rule { x0: u32, x1: u32, y: u32 },
    /// A text run starting at `(x, y)`.
    Text {
        x: u32,
        y: u32,
        style: FontStyle,
        text: String,
    },
}

/// A fully laid-out page: fixed canvas dimensions plus its display list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub width: u32,
    pub height: u32,
    pub ops: Vec<DrawOp>,
}

fn truncate_chars(s: &str, budget: usize) -> String {
    s.chars().take(budget).collect()
}

/// Lay out one page with its header, body, and footer.
///
/// Body drawing stops silently once a line would cross into the bottom
/// margin. The paginator's estimates prevent that in the common case, but
/// the renderer defends independently against estimate drift.
pub fn render_page(
    page: &Page,
    title: &str,
    author: &str,
    page_number: usize,
    metrics: &dyn TextMetrics,
) -> RenderedPage {
    let mut ops = Vec::new();
    let body_width = text_width();

    // Running header: author left, title right, rule underneath.
    let hy = MARGIN_TOP - 34;
    ops.push(DrawOp::Rule {
        x0: MARGIN_X,
        x1: PAGE_WIDTH - MARGIN_X,
        y: hy + 20,
    });
    ops.push(DrawOp::Text {
        x: MARGIN_X,
        y: hy,
        style: FontStyle::Marginal,
        text: truncate_chars(author, HEADER_CHAR_BUDGET),
    });
    let title_text = truncate_chars(title, HEADER_CHAR_BUDGET);
    let title_w = metrics.advance(&title_text, FontStyle::Marginal);
    ops.push(DrawOp::Text {
        x: PAGE_WIDTH - MARGIN_X - title_w,
        y: hy,
        style: FontStyle::Marginal,
        text: title_text,
    });

    // Body blocks.
    let mut y = MARGIN_TOP;
    let line_limit = PAGE_HEIGHT - MARGIN_BOTTOM - 20;

    for block in &page.blocks {
        match block {
            ParagraphBlock::Blank => {
                y += LINE_HEIGHT / 2;
            }
            ParagraphBlock::Heading(text) => {
                if y + HEADING_BLOCK_HEIGHT > PAGE_HEIGHT - MARGIN_BOTTOM {
                    break; // page full
                }
                let inset = body_width * 20 / 100;
                let rule_x0 = MARGIN_X + inset;
                let rule_x1 = PAGE_WIDTH - MARGIN_X - inset;

                y += 18;
                ops.push(DrawOp::Rule {
                    x0: rule_x0,
                    x1: rule_x1,
                    y,
                });
                y += 14;
                let w = metrics.advance(text, FontStyle::Heading);
                ops.push(DrawOp::Text {
                    x: PAGE_WIDTH.saturating_sub(w) / 2,
                    y,
                    style: FontStyle::Heading,
                    text: text.clone(),
                });
                y += 34;
                ops.push(DrawOp::Rule {
                    x0: rule_x0,
                    x1: rule_x1,
                    y,
                });
                y += 20;
            }
            ParagraphBlock::Prose(text) => {
                let words: Vec<&str> = text.split_whitespace().collect();
                let lines = wrap_words(
                    &words,
                    body_width - FIRST_LINE_INDENT,
                    metrics,
                    FontStyle::Body,
                );
                let line_count = lines.len();
                for (i, line) in lines.iter().enumerate() {
                    if y + LINE_HEIGHT > line_limit {
                        break; // page full
                    }
                    let indent = if i == 0 { FIRST_LINE_INDENT } else { 0 };
                    let x = MARGIN_X + indent;
                    let target = body_width - indent;
                    let is_last = i == line_count - 1;

                    if is_last || line.len() == 1 {
                        ops.push(DrawOp::Text {
                            x,
                            y,
                            style: FontStyle::Body,
                            text: line.join(" "),
                        });
                    } else {
                        for (offset, word) in
                            justify_offsets(line, target, metrics, FontStyle::Body)
                                .into_iter()
                                .zip(line.iter())
                        {
                            ops.push(DrawOp::Text {
                                x: x + offset,
                                y,
                                style: FontStyle::Body,
                                text: (*word).to_string(),
                            });
                        }
                    }
                    y += LINE_HEIGHT;
                }
                y += PARAGRAPH_SPACING;
            }
        }
    }

    // Footer: rule plus centered page number.
    let fy = PAGE_HEIGHT - MARGIN_BOTTOM;
    ops.push(DrawOp::Rule {
        x0: MARGIN_X,
        x1: PAGE_WIDTH - MARGIN_X,
        y: fy - 10,
    });
    let number = page_number.to_string();
    let number_w = metrics.advance(&number, FontStyle::Marginal);
    ops.push(DrawOp::Text {
        x: PAGE_WIDTH.saturating_sub(number_w) / 2,
        y: fy - 4,
        style: FontStyle::Marginal,
        text: number,
    });

    RenderedPage {
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        ops,
    }
}

/// Slice `text` into fixed-size sections, paginate the selected one, and
/// render all its pages.
///
/// Returns the rendered pages and the total section count. The section index
/// is clamped; an empty section still yields one (blank) page so the reader
/// always has something to show.
pub fn section_pages(
    text: &str,
    title: &str,
    author: &str,
    section_index: usize,
    metrics: &dyn TextMetrics,
) -> (Vec<RenderedPage>, usize) {
    let total_chars = text.chars().count();
    let total_sections = total_chars.div_ceil(SECTION_CHARS).max(1);
    let section = section_index.min(total_sections - 1);

    let slice: String = text
        .chars()
        .skip(section * SECTION_CHARS)
        .take(SECTION_CHARS)
        .collect();

    let pages = paginate(&slice, metrics);
    let mut rendered: Vec<RenderedPage> = pages
        .iter()
        .enumerate()
        .map(|(i, page)| render_page(page, title, author, i + 1, metrics))
        .collect();

    if rendered.is_empty() {
        rendered.push(render_page(
            &Page { blocks: Vec::new() },
            title,
            author,
            1,
            metrics,
        ));
    }

    tracing::debug!(
        section,
        total_sections,
        pages = rendered.len(),
        "rendered section"
    );
    (rendered, total_sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::metrics::SerifMetrics;

    fn prose_page(text: &str) -> Page {
        Page {
            blocks: vec![ParagraphBlock::Prose(text.to_string())],
        }
    }

    fn texts_of(rendered: &RenderedPage) -> Vec<&str> {
        rendered
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Rule { .. } => None,
            })
            .collect()
    }

    #[test]
    fn canvas_has_fixed_dimensions() {
        let rendered = render_page(&prose_page("hello"), "Title", "Author", 1, &SerifMetrics);
        assert_eq!(rendered.width, PAGE_WIDTH);
        assert_eq!(rendered.height, PAGE_HEIGHT);
    }

    #[test]
    fn header_carries_author_left_and_title_right() {
        let rendered = render_page(&prose_page("hello"), "Moby-Dick", "Melville", 1, &SerifMetrics);
        let author_op = rendered.ops.iter().find_map(|op| match op {
            DrawOp::Text { x, text, .. } if text == "Melville" => Some(*x),
            _ => None,
        });
        assert_eq!(author_op, Some(MARGIN_X));

        let title_x = rendered
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { x, text, .. } if text == "Moby-Dick" => Some(*x),
                _ => None,
            })
            .unwrap();
        let title_w = SerifMetrics.advance("Moby-Dick", FontStyle::Marginal);
        assert_eq!(title_x + title_w, PAGE_WIDTH - MARGIN_X);
    }

    #[test]
    fn long_header_strings_are_truncated_to_budget() {
        let long = "An Extremely Long and Winding Subtitle That Never Seems to End At All";
        let rendered = render_page(&prose_page("hello"), long, long, 1, &SerifMetrics);
        for text in texts_of(&rendered) {
            assert!(text.chars().count() <= HEADER_CHAR_BUDGET || text == "hello");
        }
    }

    #[test]
    fn footer_centers_the_page_number() {
        let rendered = render_page(&prose_page("hello"), "T", "A", 42, &SerifMetrics);
        let (x, text) = rendered
            .ops
            .iter()
            .rev()
            .find_map(|op| match op {
                DrawOp::Text { x, text, .. } => Some((*x, text.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(text, "42");
        let w = SerifMetrics.advance("42", FontStyle::Marginal);
        assert_eq!(x, (PAGE_WIDTH - w) / 2);
    }

    #[test]
    fn heading_block_emits_two_rules_and_centered_text() {
        let page = Page {
            blocks: vec![ParagraphBlock::Heading("CHAPTER I".into())],
        };
        let rendered = render_page(&page, "T", "A", 1, &SerifMetrics);
        // header rule + 2 heading rules + footer rule
        let rules = rendered
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Rule { .. }))
            .count();
        assert_eq!(rules, 4);

        let heading_x = rendered
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { x, style, text, .. }
                    if *style == FontStyle::Heading && text == "CHAPTER I" =>
                {
                    Some(*x)
                }
                _ => None,
            })
            .unwrap();
        let w = SerifMetrics.advance("CHAPTER I", FontStyle::Heading);
        assert_eq!(heading_x, (PAGE_WIDTH - w) / 2);
    }

    #[test]
    fn first_line_is_indented_and_non_final_lines_justified() {
        let metrics = SerifMetrics;
        let text = "the quick brown fox jumps over the lazy dog again and again and then \
                    some more words to force several wrapped lines onto this page for sure \
                    because a single sentence of ordinary prose rarely needs more than two \
                    lines and this test wants at least three of them to inspect properly";
        let rendered = render_page(&prose_page(text), "T", "A", 1, &metrics);

        let body_ops: Vec<(u32, u32, &str)> = rendered
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, y, style, text } if *style == FontStyle::Body => {
                    Some((*x, *y, text.as_str()))
                }
                _ => None,
            })
            .collect();

        // First body line starts at the indent.
        let first_y = body_ops.iter().map(|(_, y, _)| *y).min().unwrap();
        let first_line_x = body_ops
            .iter()
            .filter(|(_, y, _)| *y == first_y)
            .map(|(x, _, _)| *x)
            .min()
            .unwrap();
        assert_eq!(first_line_x, MARGIN_X + FIRST_LINE_INDENT);

        // A justified (non-first, non-last) line ends exactly at the right margin.
        let mut ys: Vec<u32> = body_ops.iter().map(|(_, y, _)| *y).collect();
        ys.sort_unstable();
        ys.dedup();
        assert!(ys.len() >= 3, "need at least three wrapped lines");
        let mid_y = ys[1];
        let line_end = body_ops
            .iter()
            .filter(|(_, y, _)| *y == mid_y)
            .map(|(x, _, text)| x + metrics.advance(text, FontStyle::Body))
            .max()
            .unwrap();
        assert_eq!(line_end, MARGIN_X + text_width());
    }

    #[test]
    fn last_line_is_left_aligned_single_run() {
        let rendered = render_page(&prose_page("just one short line"), "T", "A", 1, &SerifMetrics);
        let body: Vec<&DrawOp> = rendered
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { style, .. } if *style == FontStyle::Body))
            .collect();
        assert_eq!(body.len(), 1);
        if let DrawOp::Text { x, text, .. } = body[0] {
            assert_eq!(*x, MARGIN_X + FIRST_LINE_INDENT);
            assert_eq!(text, "just one short line");
        }
    }

    #[test]
    fn overflowing_body_truncates_silently_above_footer() {
        let huge = "words keep coming and the page cannot hold them all forever ".repeat(80);
        let rendered = render_page(&prose_page(&huge), "T", "A", 1, &SerifMetrics);
        for op in &rendered.ops {
            if let DrawOp::Text { y, style, .. } = op {
                if *style == FontStyle::Body {
                    assert!(y + LINE_HEIGHT <= PAGE_HEIGHT - MARGIN_BOTTOM - 20);
                }
            }
        }
    }

    #[test]
    fn sections_split_and_clamp() {
        let text = "paragraph of reasonable length here\n\n".repeat(3000); // > 40k chars
        let (pages_a, total) = section_pages(&text, "T", "A", 0, &SerifMetrics);
        assert!(total > 1);
        assert!(!pages_a.is_empty());

        // Out-of-range index clamps to the last section.
        let (pages_last, total_again) = section_pages(&text, "T", "A", 999, &SerifMetrics);
        assert_eq!(total, total_again);
        assert!(!pages_last.is_empty());
    }

    #[test]
    fn empty_text_yields_one_blank_page() {
        let (pages, total) = section_pages("", "T", "A", 0, &SerifMetrics);
        assert_eq!(total, 1);
        assert_eq!(pages.len(), 1);
        // Header and footer are still present.
        assert!(pages[0].ops.len() >= 4);
    }

    #[test]
    fn rendering_is_deterministic() {
        let page = prose_page("the same page every time it is rendered");
        let a = render_page(&page, "T", "A", 7, &SerifMetrics);
        let b = render_page(&page, "T", "A", 7, &SerifMetrics);
        assert_eq!(a, b);
    }
}
