//! bibliomancer CLI: load a book, ask it questions, read its pages.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;

use bibliomancer::config::BiblioConfig;
use bibliomancer::embed::{Embedder, HashEmbedder};
use bibliomancer::layout::DrawOp;
use bibliomancer::ollama::{OllamaEmbedder, OllamaGenerator, probe};
use bibliomancer::paths::BiblioPaths;
use bibliomancer::reader::Reader;
use bibliomancer::session::Session;
use bibliomancer::shelf;
use bibliomancer::source::estimate_reading_time;

#[derive(Parser)]
#[command(name = "biblio", version, about = "Ask questions of public-domain books")]
struct Cli {
    /// Data directory override (defaults to the XDG layout).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Skip Ollama and use the offline hashing embedder.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the curated shelf of classics.
    Shelf,

    /// Load and index a book by URL, local file, or shelf title.
    Load {
        /// URL, file path, or exact shelf title.
        locator: String,

        /// Override the detected title.
        #[arg(long)]
        title: Option<String>,

        /// Record the author.
        #[arg(long)]
        author: Option<String>,
    },

    /// Ask a question about the loaded book.
    Ask {
        /// The question text.
        question: String,
    },

    /// Render a section of the loaded book as typeset pages.
    Pages {
        /// Which 40,000-character section to render.
        #[arg(long, default_value = "0")]
        section: usize,
    },

    /// Show reader status and the loaded-book catalog.
    Info,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = match &cli.data_dir {
        Some(dir) => BiblioPaths::rooted_at(dir.clone()),
        None => BiblioPaths::resolve()?,
    };
    let config = BiblioConfig::load_or_default(&paths.config_file())?;

    let embedder: Box<dyn Embedder> = if cli.offline {
        Box::new(HashEmbedder::default())
    } else if probe(&config.ollama) {
        match OllamaEmbedder::connect(config.ollama.clone()) {
            Ok(embedder) => Box::new(embedder),
            Err(e) => {
                tracing::warn!(error = %e, "Ollama embedder unavailable, using offline embedder");
                Box::new(HashEmbedder::default())
            }
        }
    } else {
        tracing::warn!("Ollama not reachable, using offline embedder");
        Box::new(HashEmbedder::default())
    };
    let generator = Box::new(OllamaGenerator::new(config.ollama.clone()));

    let mut reader = Reader::open(&paths, config, embedder, generator)?;
    let mut session = Session::new();

    match cli.command {
        Commands::Shelf => {
            for genre in shelf::genres() {
                println!("{genre}:");
                for book in shelf::SHELF.iter().filter(|b| b.genre == genre) {
                    println!("  {} — {} ({})", book.title, book.author, book.year);
                    println!("      {}", book.summary);
                }
            }
        }

        Commands::Load {
            locator,
            title,
            author,
        } => {
            let outcome = if let Some(entry) = shelf::find_by_title(&locator) {
                reader.load_url(
                    &mut session,
                    entry.url,
                    Some(entry.title.to_string()),
                    Some(entry.author.to_string()),
                )?
            } else if locator.starts_with("http://") || locator.starts_with("https://") {
                reader.load_url(&mut session, &locator, title, author)?
            } else {
                reader.load_file(&mut session, &PathBuf::from(&locator), title, author)?
            };

            let record = &outcome.record;
            if outcome.reused_cache {
                println!("\"{}\" was already loaded; reusing its cache.", record.title);
            } else {
                println!(
                    "Loaded \"{}\": {} chunks indexed from {} characters.",
                    record.title, record.chunk_count, record.char_count
                );
            }
        }

        Commands::Ask { question } => {
            let answer = reader.ask(&mut session, &question)?;
            println!("{answer}");
        }

        Commands::Pages { section } => {
            let (pages, total) = reader.section_pages(&session, section)?;
            println!(
                "Section {} of {}: {} page(s)",
                section.min(total - 1) + 1,
                total,
                pages.len()
            );
            for (i, page) in pages.iter().enumerate() {
                let words = page
                    .ops
                    .iter()
                    .filter(|op| matches!(op, DrawOp::Text { .. }))
                    .count();
                println!("  page {:>3}: {} draw ops, {} text runs", i + 1, page.ops.len(), words);
            }
        }

        Commands::Info => {
            let status = reader.status()?;
            match &status.active {
                Some(record) => {
                    println!("Active book: {} ({})", record.title, record.id);
                    if let Some(author) = &record.author {
                        println!("  author: {author}");
                    }
                    println!("  chunks: {}", record.chunk_count);
                    println!("  source: {}", record.source);
                }
                None if status.index_exists => {
                    println!("An index exists but its book is not in the catalog.");
                }
                None => println!("No book loaded."),
            }
            if !reader.catalog().is_empty() {
                println!("\nKnown books:");
                for record in reader.catalog().list() {
                    println!("  {} — {} chars", record.title, record.char_count);
                }
            }
            if let Some(record) = &status.active {
                if let Some(text) = reader.cached_text(&record.id)? {
                    println!("\nEstimated reading time: {}", estimate_reading_time(&text));
                }
            }
        }
    }

    Ok(())
}
