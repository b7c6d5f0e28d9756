//! Source text normalization.
//!
//! Raw book sources arrive with mixed line endings, trailing whitespace,
//! provenance banners, and the occasional HTML error page. `normalize` cleans
//! them into the canonical form the chunker and paginator expect: LF line
//! endings, at most one blank line between paragraphs, no trailing whitespace.
//!
//! Normalization is idempotent: `normalize(normalize(x)) == normalize(x)`.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::SourceError;

/// Minimum character count for a usable document. Anything shorter after
/// cleanup is almost certainly an error page, not a book.
pub const MIN_TEXT_LEN: usize = 1000;

static HTML_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:!doctype\s+html|html[\s>])").expect("static pattern"));

/// Project Gutenberg start banner. Everything before (and including) this
/// marker is licensing boilerplate.
static START_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\*\*\*\s*START OF (?:THE|THIS) PROJECT GUTENBERG EBOOK.*?\*\*\*")
        .expect("static pattern")
});

/// Project Gutenberg end banner. Everything from this marker on is boilerplate.
static END_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*\*\*\s*END OF (?:THE|THIS) PROJECT GUTENBERG EBOOK|End of (?:the )?Project Gutenberg")
        .expect("static pattern")
});

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static pattern"));

/// Clean raw source text into canonical form.
///
/// Steps, in order:
/// 1. Reject markup (`UnsupportedFormat`): an HTML page is not a usable
///    plain-text source.
/// 2. Unicode NFC normalization.
/// 3. Line-ending canonicalization (CRLF / lone CR → LF).
/// 4. Strip the Gutenberg start/end banners when present; text without
///    markers passes through unchanged (fail-open).
/// 5. Strip trailing whitespace per line, collapse 3+ consecutive newlines
///    to exactly 2, trim the ends.
/// 6. Reject results below [`MIN_TEXT_LEN`] chars (`ContentTooSmall`).
pub fn normalize(raw: &str) -> Result<String, SourceError> {
    if HTML_MARKUP.is_match(raw) {
        return Err(SourceError::UnsupportedFormat {
            hint: "HTML markup detected; expected plain text".into(),
        });
    }

    let text: String = raw.nfc().collect();
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let text = match START_MARKER.find(&text) {
        Some(m) => text[m.end()..].to_string(),
        None => text,
    };
    let text = match END_MARKER.find(&text) {
        Some(m) => text[..m.start()].to_string(),
        None => text,
    };

    let stripped: Vec<&str> = text.lines().map(str::trim_end).collect();
    let text = stripped.join("\n");
    let text = BLANK_RUNS.replace_all(&text, "\n\n").into_owned();
    let text = text.trim().to_string();

    let length = text.chars().count();
    if length < MIN_TEXT_LEN {
        return Err(SourceError::ContentTooSmall {
            length,
            minimum: MIN_TEXT_LEN,
        });
    }

    Ok(text)
}
