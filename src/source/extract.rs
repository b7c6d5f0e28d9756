//! Text extraction from local files.

use std::path::Path;

use crate::error::SourceError;

/// Extract raw text from a local file.
///
/// PDFs go through `pdf-extract`; everything else is read as (possibly
/// lossy) UTF-8 text. Validation of the result is the normalizer's job.
pub fn extract_text(path: &Path) -> Result<String, SourceError> {
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        tracing::debug!(path = %path.display(), "extracting PDF text");
        return pdf_extract::extract_text(path).map_err(|e| SourceError::ExtractFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| SourceError::Io { source: e })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_file_reads_through() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("book.txt");
        std::fs::write(&path, "Some book text.").unwrap();
        assert_eq!(extract_text(&path).unwrap(), "Some book text.");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = extract_text(Path::new("/nonexistent/book.txt")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn invalid_pdf_is_an_extract_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, "not actually a pdf").unwrap();
        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, SourceError::ExtractFailed { .. }));
    }
}
