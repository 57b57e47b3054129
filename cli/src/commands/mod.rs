pub mod context;
pub mod delete;
pub mod ingest;
pub mod list;
pub mod search;
pub mod stats;
pub mod utils;

pub use context::handle_context;
pub use delete::handle_delete;
pub use ingest::handle_ingest;
pub use list::handle_list;
pub use search::handle_search;
pub use stats::handle_stats;
pub use utils::resolve_config;

use clap::{Parser, Subcommand, ValueEnum};
use docret_config::EmbeddingBackend;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docret")]
#[command(about = "owner-scoped document retrieval over embedded text chunks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the record store and the vector index
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Embedding backend override
    #[arg(long, value_enum)]
    pub backend: Option<CliBackend>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest a text document for an owner
    Ingest {
        /// Owner the document belongs to
        #[arg(long)]
        owner: String,

        /// Document title; defaults to the file name
        #[arg(long)]
        title: Option<String>,

        /// File to ingest; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Search an owner's indexed chunks
    Search {
        /// The query string
        query: String,

        /// Owner whose documents are searched
        #[arg(long)]
        owner: String,

        /// Number of results
        #[arg(long)]
        top: Option<usize>,

        /// Minimum similarity score
        #[arg(long)]
        min_score: Option<f32>,

        /// Emit results as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Assemble a bounded context string for a query
    Context {
        /// The query string
        query: String,

        /// Owner whose documents are searched
        #[arg(long)]
        owner: String,

        /// Maximum characters of chunk content in the context
        #[arg(long)]
        max_chars: Option<usize>,
    },
    /// List an owner's documents
    List {
        /// Owner whose documents are listed
        #[arg(long)]
        owner: String,
    },
    /// Delete a document, its chunks and its index entries
    Delete {
        /// Document id
        id: u64,
    },
    /// Show record store and vector index statistics
    Stats,
}

/// Embedding backends selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliBackend {
    Openai,
    Ollama,
}

impl From<CliBackend> for EmbeddingBackend {
    fn from(value: CliBackend) -> Self {
        match value {
            CliBackend::Openai => EmbeddingBackend::OpenAi,
            CliBackend::Ollama => EmbeddingBackend::Ollama,
        }
    }
}
