//! XDG-compliant path resolution for bibliomancer.
//!
//! All durable state lives under the XDG data directory: one `index/`
//! directory holding the single active vector index (replaced wholesale per
//! book), one `books/` directory caching normalized book text by document id,
//! and a `catalog.json` describing what has been loaded.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(biblio::paths::no_home),
        help("Set the HOME environment variable or ensure a valid user profile exists.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(biblio::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// XDG-compliant directories for bibliomancer.
#[derive(Debug, Clone)]
pub struct BiblioPaths {
    /// `$XDG_CONFIG_HOME/bibliomancer/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/bibliomancer/`
    pub data_dir: PathBuf,
    /// `$XDG_CACHE_HOME/bibliomancer/`
    pub cache_dir: PathBuf,
}

impl BiblioPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("bibliomancer");

        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/share"))
            .join("bibliomancer");

        let cache_dir = std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".cache"))
            .join("bibliomancer");

        Ok(Self {
            config_dir,
            data_dir,
            cache_dir,
        })
    }

    /// Build paths rooted at an explicit data directory (used by `--data-dir`
    /// and tests). Config and cache live beside the data.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_dir: root.join("config"),
            data_dir: root.clone(),
            cache_dir: root.join("cache"),
        }
    }

    /// Create all base directories. Idempotent.
    pub fn ensure_dirs(&self) -> PathResult<()> {
        for dir in [
            &self.config_dir,
            &self.data_dir,
            &self.cache_dir,
            &self.index_dir(),
            &self.books_dir(),
        ] {
            std::fs::create_dir_all(dir).map_err(|e| PathError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Directory holding the single active vector index.
    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join("index")
    }

    /// Directory caching normalized book text, one file per document id.
    pub fn books_dir(&self) -> PathBuf {
        self.data_dir.join("books")
    }

    /// Path to the book catalog file.
    pub fn catalog_file(&self) -> PathBuf {
        self.data_dir.join("catalog.json")
    }

    /// Path to the config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}
