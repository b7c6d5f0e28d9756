//! Network retrieval of remote book sources.
//!
//! Gutenberg locators are expanded into the known mirror paths before falling
//! back to the raw URL. Fetching is synchronous with a bounded timeout;
//! timeouts, HTTP errors, and decode problems surface as distinct errors so
//! callers can decide what is worth retrying.

use std::io::Read;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::SourceError;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("static pattern"));

/// Candidate URLs to try for a locator, most-preferred first.
///
/// Gutenberg books are mirrored under several path schemes; trying the known
/// ones avoids dead links in older catalog entries. Non-Gutenberg locators
/// are returned as-is.
pub fn candidate_urls(url: &str) -> Vec<String> {
    if url.contains("gutenberg") {
        if let Some(m) = DIGITS.find(url) {
            let id = m.as_str();
            let mut candidates = vec![
                format!("https://www.gutenberg.org/files/{id}/{id}-0.txt"),
                format!("https://www.gutenberg.org/files/{id}/{id}.txt"),
                format!("https://www.gutenberg.org/cache/epub/{id}/pg{id}.txt"),
            ];
            if !candidates.contains(&url.to_string()) {
                candidates.push(url.to_string());
            }
            return candidates;
        }
    }
    vec![url.to_string()]
}

/// Download a book and decode it to text.
///
/// Tries each candidate URL in order; the first 200 response wins. The body
/// is decoded using the charset named in Content-Type when present, falling
/// back to lossy UTF-8.
pub fn fetch_book(url: &str, timeout_secs: u64) -> Result<String, SourceError> {
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent("Mozilla/5.0 (compatible; bibliomancer)")
        .build();

    let mut last_err: Option<SourceError> = None;
    for candidate in candidate_urls(url) {
        tracing::debug!(url = %candidate, "fetching book source");
        match agent.get(&candidate).call() {
            Ok(response) => {
                let charset = response.charset().to_string();
                let mut body = Vec::new();
                response
                    .into_reader()
                    .read_to_end(&mut body)
                    .map_err(|e| SourceError::FetchFailed {
                        url: candidate.clone(),
                        message: format!("read body: {e}"),
                    })?;
                tracing::info!(url = %candidate, bytes = body.len(), "fetched book source");
                return Ok(decode_body(&body, &charset));
            }
            Err(e) => {
                last_err = Some(classify_error(&candidate, timeout_secs, e));
            }
        }
    }

    Err(last_err.unwrap_or_else(|| SourceError::FetchFailed {
        url: url.to_string(),
        message: "no candidate URLs".into(),
    }))
}

fn classify_error(url: &str, timeout_secs: u64, err: ureq::Error) -> SourceError {
    match err {
        ureq::Error::Status(code, _) => SourceError::FetchFailed {
            url: url.to_string(),
            message: format!("HTTP status {code}"),
        },
        ureq::Error::Transport(t)
            if t.kind() == ureq::ErrorKind::Io && t.to_string().contains("timed out") =>
        {
            SourceError::FetchTimeout {
                url: url.to_string(),
                timeout_secs,
            }
        }
        ureq::Error::Transport(t) => SourceError::FetchFailed {
            url: url.to_string(),
            message: t.to_string(),
        },
    }
}

/// Decode raw bytes using the server-declared charset, or lossy UTF-8.
fn decode_body(body: &[u8], charset: &str) -> String {
    if !charset.is_empty() {
        if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
            let (text, _, _) = encoding.decode(body);
            return text.into_owned();
        }
    }
    String::from_utf8_lossy(body).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gutenberg_url_expands_to_mirror_candidates() {
        let candidates = candidate_urls("https://www.gutenberg.org/ebooks/84");
        assert_eq!(candidates.len(), 4);
        assert_eq!(candidates[0], "https://www.gutenberg.org/files/84/84-0.txt");
        assert_eq!(
            candidates[2],
            "https://www.gutenberg.org/cache/epub/84/pg84.txt"
        );
        assert_eq!(candidates[3], "https://www.gutenberg.org/ebooks/84");
    }

    #[test]
    fn known_mirror_url_is_not_duplicated() {
        let url = "https://www.gutenberg.org/files/84/84-0.txt";
        let candidates = candidate_urls(url);
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0], url);
    }

    #[test]
    fn non_gutenberg_url_passes_through() {
        let candidates = candidate_urls("https://example.com/book.txt");
        assert_eq!(candidates, vec!["https://example.com/book.txt".to_string()]);
    }

    #[test]
    fn decode_honors_declared_charset() {
        // "café" in latin-1
        let bytes = [b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_body(&bytes, "iso-8859-1"), "café");
    }

    #[test]
    fn decode_falls_back_to_lossy_utf8() {
        let bytes = [b'o', b'k', 0xFF];
        let text = decode_body(&bytes, "");
        assert!(text.starts_with("ok"));
    }
}
