//! Deterministic text measurement.
//!
//! The layout engine never touches a real font rasterizer; it measures text
//! through the [`TextMetrics`] trait. [`SerifMetrics`] approximates a serif
//! face with a fixed per-character advance table, scaled per style, which
//! keeps wrap and pagination decisions exactly reproducible everywhere.

/// Text styles used on a page, each with a fixed point size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    /// Body prose, 17 px.
    Body,
    /// Chapter headings, 24 px bold.
    Heading,
    /// Running header and footer, 13 px.
    Marginal,
}

impl FontStyle {
    /// Nominal pixel size of this style.
    pub fn size(self) -> u32 {
        match self {
            FontStyle::Body => 17,
            FontStyle::Heading => 24,
            FontStyle::Marginal => 13,
        }
    }
}

/// Measures the advance width of text at a given style.
pub trait TextMetrics {
    /// Width in pixels of `text` drawn at `style`.
    fn advance(&self, text: &str, style: FontStyle) -> u32;

    /// Width of a single inter-word space at `style`.
    fn space_width(&self, style: FontStyle) -> u32 {
        self.advance(" ", style)
    }
}

/// Fixed advance table approximating a serif body face.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerifMetrics;

impl SerifMetrics {
    /// Per-character advance at body size (17 px).
    fn unit_advance(c: char) -> u32 {
        match c {
            ' ' => 4,
            'i' | 'j' | 'l' | '.' | ',' | ';' | ':' | '\'' | '!' | '|' | '`' => 5,
            'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '"' | '-' => 6,
            'm' | 'w' => 14,
            'M' | 'W' => 16,
            'I' => 6,
            'J' => 8,
            c if c.is_ascii_uppercase() => 12,
            c if c.is_ascii_digit() => 9,
            '—' => 17,
            _ => 9,
        }
    }
}

impl TextMetrics for SerifMetrics {
    fn advance(&self, text: &str, style: FontStyle) -> u32 {
        let units: u32 = text.chars().map(Self::unit_advance).sum();
        units * style.size() / FontStyle::Body.size()
    }
}
