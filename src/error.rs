//! Rich diagnostic error types for bibliomancer.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know exactly what went wrong
//! and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for bibliomancer.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source chains) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum BiblioError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Chunk(#[from] ChunkError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Qa(#[from] QaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] crate::paths::PathError),
}

// ---------------------------------------------------------------------------
// Source errors
// ---------------------------------------------------------------------------

/// Errors from fetching, extracting, and validating source documents.
#[derive(Debug, Error, Diagnostic)]
pub enum SourceError {
    #[error("fetch failed for \"{url}\": {message}")]
    #[diagnostic(
        code(biblio::source::fetch_failed),
        help(
            "The book could not be downloaded. Check that the URL is reachable \
             and the network is available, then retry."
        )
    )]
    FetchFailed { url: String, message: String },

    #[error("fetch timed out after {timeout_secs}s for \"{url}\"")]
    #[diagnostic(
        code(biblio::source::fetch_timeout),
        help("The server did not respond in time. Retry, or raise fetch_timeout_secs in config.toml.")
    )]
    FetchTimeout { url: String, timeout_secs: u64 },

    #[error("unsupported format: {hint}")]
    #[diagnostic(
        code(biblio::source::unsupported_format),
        help(
            "The source is not a plain-text document. For Project Gutenberg, \
             choose the \"Plain Text UTF-8\" edition rather than the HTML one."
        )
    )]
    UnsupportedFormat { hint: String },

    #[error("document too small: {length} chars after cleanup (minimum {minimum})")]
    #[diagnostic(
        code(biblio::source::content_too_small),
        help(
            "Almost no text survived normalization. The source was probably an \
             error page or an empty file, not a book. Try a different source."
        )
    )]
    ContentTooSmall { length: usize, minimum: usize },

    #[error("text extraction failed for \"{path}\": {message}")]
    #[diagnostic(
        code(biblio::source::extract_failed),
        help("The file could not be read as text. Verify it is a valid PDF or plain-text file.")
    )]
    ExtractFailed { path: String, message: String },

    #[error("catalog I/O error: {message}")]
    #[diagnostic(
        code(biblio::source::catalog_io),
        help(
            "Failed to read or write the book catalog. Check that the data \
             directory exists and has correct permissions."
        )
    )]
    CatalogIo { message: String },

    #[error("I/O error: {source}")]
    #[diagnostic(
        code(biblio::source::io),
        help("A filesystem operation failed. Check file paths and permissions.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Chunker errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ChunkError {
    #[error("invalid chunker configuration: overlap {overlap} must be smaller than size {size}")]
    #[diagnostic(
        code(biblio::chunk::invalid_configuration),
        help(
            "An overlap equal to or larger than the chunk size would never \
             advance through the text. Fix chunk_size/chunk_overlap in config.toml."
        )
    )]
    InvalidConfiguration { size: usize, overlap: usize },
}

// ---------------------------------------------------------------------------
// Embedding errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EmbedError {
    #[error("embedding backend error: {message}")]
    #[diagnostic(
        code(biblio::embed::backend),
        help("The embedding capability failed. Check that the backend is running and the model is pulled.")
    )]
    Backend { message: String },

    #[error("embedding backend returned an invalid vector: {message}")]
    #[diagnostic(
        code(biblio::embed::invalid_vector),
        help("The backend produced a vector of unexpected shape. Check the configured embedding model.")
    )]
    InvalidVector { message: String },
}

// ---------------------------------------------------------------------------
// Index errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum IndexError {
    #[error("no index found: no book has been indexed yet")]
    #[diagnostic(
        code(biblio::index::not_found),
        help("Load a book first with `biblio load <url-or-file>`, then ask again.")
    )]
    NotFound,

    #[error("index is corrupt: {message}")]
    #[diagnostic(
        code(biblio::index::corrupt),
        help(
            "The persisted index could not be validated. It will be rebuilt from \
             the cached book text if available; otherwise re-load the book."
        )
    )]
    Corrupt { message: String },

    #[error("dimension mismatch: index has {expected}-dim vectors, embedder produced {actual}")]
    #[diagnostic(
        code(biblio::index::dim_mismatch),
        help(
            "The on-disk index was built with a different embedding model. \
             Re-load the book to rebuild the index with the current embedder."
        )
    )]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(biblio::index::serde),
        help("Failed to serialize or deserialize index data. Re-load the book to rebuild.")
    )]
    Serialization { message: String },

    #[error("I/O error: {source}")]
    #[diagnostic(
        code(biblio::index::io),
        help(
            "A filesystem operation on the index directory failed. Check that it \
             exists, has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Embed(#[from] EmbedError),
}

// ---------------------------------------------------------------------------
// LLM errors
// ---------------------------------------------------------------------------

/// Errors from the language-model capability.
#[derive(Debug, Error, Diagnostic)]
pub enum LlmError {
    #[error("Ollama is not available at {url}")]
    #[diagnostic(
        code(biblio::llm::unavailable),
        help("Start Ollama with `ollama serve`, or point ollama.base_url elsewhere in config.toml.")
    )]
    Unavailable { url: String },

    #[error("Ollama request failed: {message}")]
    #[diagnostic(
        code(biblio::llm::request_failed),
        help("Check that Ollama is running and the model is pulled.")
    )]
    RequestFailed { message: String },

    #[error("failed to parse Ollama response: {message}")]
    #[diagnostic(
        code(biblio::llm::parse_error),
        help("The model returned an unexpected response format.")
    )]
    ParseError { message: String },

    #[error("Ollama request timed out after {timeout_secs}s")]
    #[diagnostic(
        code(biblio::llm::timeout),
        help("Increase ollama.timeout_secs in config.toml or use a smaller model.")
    )]
    Timeout { timeout_secs: u64 },
}

// ---------------------------------------------------------------------------
// Question-answering errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum QaError {
    #[error("generation failed: {message}")]
    #[diagnostic(
        code(biblio::qa::generation_failed),
        help(
            "The language model errored or returned an unusable result. The \
             question was recorded in the conversation; ask again once the model \
             is reachable."
        )
    )]
    GenerationFailed { message: String },
}

impl From<LlmError> for QaError {
    fn from(err: LlmError) -> Self {
        QaError::GenerationFailed {
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    #[diagnostic(
        code(biblio::config::read),
        help("Check that the file exists and is readable, or delete it to use defaults.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    #[diagnostic(
        code(biblio::config::parse),
        help("The file is not valid TOML for BiblioConfig. Fix the offending key or delete the file.")
    )]
    Parse { path: String, message: String },
}

/// Convenience alias for functions returning bibliomancer results.
pub type BiblioResult<T> = std::result::Result<T, BiblioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_converts_to_biblio_error() {
        let err = SourceError::ContentTooSmall {
            length: 12,
            minimum: 1000,
        };
        let top: BiblioError = err.into();
        assert!(matches!(
            top,
            BiblioError::Source(SourceError::ContentTooSmall { .. })
        ));
    }

    #[test]
    fn llm_error_becomes_generation_failed() {
        let err = LlmError::Timeout { timeout_secs: 30 };
        let qa: QaError = err.into();
        let QaError::GenerationFailed { message } = qa;
        assert!(message.contains("30"));
    }

    #[test]
    fn index_error_wraps_embed_error() {
        let embed = EmbedError::Backend {
            message: "connection refused".into(),
        };
        let index: IndexError = embed.into();
        assert!(matches!(index, IndexError::Embed(EmbedError::Backend { .. })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = IndexError::DimensionMismatch {
            expected: 384,
            actual: 768,
        };
        let msg = format!("{err}");
        assert!(msg.contains("384"));
        assert!(msg.contains("768"));
    }
}
