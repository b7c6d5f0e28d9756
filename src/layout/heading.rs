//! Chapter-heading classification.
//!
//! A fixed rule set distinguishes structural paragraphs (chapter, part, and
//! section markers) from prose. The rules are static configuration, exposed
//! as a pure predicate.

use std::sync::LazyLock;

use regex::Regex;

static HEADING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^(CHAPTER|Chapter|PART|Part|BOOK|Book|SECTION|Section)\s+[IVXLC\d]",
        r"^(CHAPTER|PART|BOOK|SECTION)\s+[A-Z]",
        r"^[IVX]+\.$",
        r"^\d+\.$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

/// Whether a paragraph is a structural heading rather than prose.
///
/// Matches explicit chapter/part/book/section markers, bare Roman or Arabic
/// numerals, and short all-caps lines (2–6 words).
pub fn is_chapter_heading(paragraph: &str) -> bool {
    let s = paragraph.trim();
    if s.is_empty() {
        return false;
    }
    if HEADING_PATTERNS.iter().any(|p| p.is_match(s)) {
        return true;
    }
    let word_count = s.split_whitespace().count();
    is_all_caps(s) && (2..=6).contains(&word_count) && s.len() > 3
}

/// True when the text has at least one letter and no lowercase letters.
fn is_all_caps(s: &str) -> bool {
    s.chars().any(|c| c.is_alphabetic()) && !s.chars().any(|c| c.is_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_markers_are_headings() {
        assert!(is_chapter_heading("Chapter 1"));
        assert!(is_chapter_heading("CHAPTER XII"));
        assert!(is_chapter_heading("Part IV"));
        assert!(is_chapter_heading("BOOK THE FIRST"));
        assert!(is_chapter_heading("SECTION A"));
    }

    #[test]
    fn bare_numerals_are_headings() {
        assert!(is_chapter_heading("IV."));
        assert!(is_chapter_heading("12."));
    }

    #[test]
    fn short_all_caps_lines_are_headings() {
        assert!(is_chapter_heading("CHAPTER ONE"));
        assert!(is_chapter_heading("THE CARPET-BAG"));
    }

    #[test]
    fn prose_is_not_a_heading() {
        assert!(!is_chapter_heading("it was a dark night and the wind howled"));
        assert!(!is_chapter_heading("The chapter ended abruptly."));
    }

    #[test]
    fn degenerate_cases_are_not_headings() {
        assert!(!is_chapter_heading(""));
        assert!(!is_chapter_heading("   "));
        // single all-caps word: too short a phrase to be structural
        assert!(!is_chapter_heading("STOP"));
        // long all-caps shouting is prose, not structure
        assert!(!is_chapter_heading("AND THEN THE SHIP WENT DOWN WITH ALL HANDS ABOARD THAT NIGHT"));
    }
}
