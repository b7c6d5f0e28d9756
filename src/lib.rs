//! # bibliomancer
//!
//! Ask questions of public-domain books. A book source (Gutenberg URL, local
//! file, or pasted text) is normalized, split into overlapping chunks,
//! embedded, and persisted as a single on-disk vector index; questions are
//! answered by retrieving the most similar chunks and handing them to a
//! language model. Independently, the same text can be reflowed into typeset
//! pages with justified prose and decorated chapter headings.
//!
//! ## Architecture
//!
//! - **Text pipeline** (`text`): normalization and boundary-aware chunking
//! - **Index** (`index`): checksummed on-disk vector index, replaced wholesale per book
//! - **Retrieval** (`retrieve`): top-k similarity over the active index
//! - **QA** (`qa`): prompt assembly, normalized generation, conversation log
//! - **Layout** (`layout`): pagination, word wrap, justification, page rendering
//! - **Capabilities** (`embed`, `ollama`): embedding and generation behind traits
//!
//! ## Library usage
//!
//! ```no_run
//! use bibliomancer::config::BiblioConfig;
//! use bibliomancer::embed::HashEmbedder;
//! use bibliomancer::ollama::OllamaGenerator;
//! use bibliomancer::paths::BiblioPaths;
//! use bibliomancer::reader::Reader;
//! use bibliomancer::session::Session;
//!
//! let paths = BiblioPaths::resolve().unwrap();
//! let config = BiblioConfig::default();
//! let generator = Box::new(OllamaGenerator::new(config.ollama.clone()));
//! let mut reader = Reader::open(&paths, config, Box::new(HashEmbedder::default()), generator).unwrap();
//!
//! let mut session = Session::new();
//! reader
//!     .load_url(&mut session, "https://www.gutenberg.org/files/84/84-0.txt", None, None)
//!     .unwrap();
//! let answer = reader.ask(&mut session, "Who is the creature?").unwrap();
//! println!("{answer}");
//! ```

pub mod config;
pub mod embed;
pub mod error;
pub mod index;
pub mod layout;
pub mod ollama;
pub mod paths;
pub mod qa;
pub mod reader;
pub mod retrieve;
pub mod session;
pub mod shelf;
pub mod source;
pub mod text;
