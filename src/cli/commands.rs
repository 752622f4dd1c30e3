//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Ask questions about your PDF and Word documents")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize database schema and indexes
    Init {
        /// Skip creating the vector index (add it later by re-running init)
        #[arg(long)]
        skip_indexes: bool,
    },
    /// Start the HTTP API server
    Serve {
        /// Host to bind (default: server.host from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default: server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Disable CORS
        #[arg(long)]
        no_cors: bool,
    },
    /// Ingest a local PDF or Word file for a user
    Ingest {
        /// Path to a .pdf or .docx file
        file: PathBuf,
        /// Owner of the document
        #[arg(short, long)]
        user: String,
        /// Document name (default: file name without extension)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Ask a single question
    Ask {
        /// The question
        question: String,
        /// Whose documents to search
        #[arg(short, long)]
        user: String,
        /// Restrict the answer to one document
        #[arg(short, long)]
        doc: Option<String>,
        /// Number of chunks to retrieve (default: retrieval.top_k from config)
        #[arg(short)]
        k: Option<usize>,
        /// Print the chunks the answer was built from
        #[arg(long)]
        show_sources: bool,
    },
    /// Interactive question loop (type `exit` or `quit` to leave)
    Chat {
        /// Whose documents to search
        #[arg(short, long)]
        user: String,
        /// Restrict answers to one document
        #[arg(short, long)]
        doc: Option<String>,
    },
    /// List a user's documents
    Docs {
        #[arg(short, long)]
        user: String,
    },
    /// Remove a document and its chunks
    Remove {
        #[arg(short, long)]
        user: String,
        /// Document name
        #[arg(short, long)]
        doc: String,
    },
    /// Show index statistics
    Stats,
    /// Show current configuration
    Config,
}
