//! CLI module for Papyrus
//!
//! Provides command-line interface parsing for the papyrus binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Papyrus - verified literature search
///
/// Fans a research topic out to several LLM search agents and verifies
/// every suggested paper against OpenAlex, Semantic Scholar and Crossref.
#[derive(Parser, Debug)]
#[command(
    name = "papyrus",
    version,
    about = "Papyrus - verified literature search",
    long_about = "Fans a research topic out to several LLM search agents and verifies every\n\
                  suggested paper against OpenAlex, Semantic Scholar and Crossref.",
    after_help = "EXAMPLES:\n    \
                  papyrus init                                   # Write a default papyrus.toml\n    \
                  papyrus search \"sparse attention\"              # Search and print a table\n    \
                  papyrus search \"sparse attention\" --preprints  # Let preprint-aware agents include preprints\n    \
                  papyrus resolve --doi 10.1038/nature14539      # Verify a single DOI"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "papyrus.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// How search and resolve results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Table,
    /// JSON array of references
    Json,
    /// BibTeX entries
    Bibtex,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the literature for a topic and verify the results
    Search {
        /// Research topic or draft idea
        topic: String,

        /// Allow preprint-aware agents to return preprints
        #[arg(long)]
        preprints: bool,

        /// Extra context passed to every agent
        #[arg(long, default_value = "")]
        context: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Resolve a single citation against the bibliographic sources
    Resolve {
        /// DOI to resolve
        #[arg(long, conflicts_with = "title", required_unless_present = "title")]
        doi: Option<String>,

        /// Title to look up when no DOI is known
        #[arg(long)]
        title: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Write a default papyrus.toml
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Config {
        /// Validate the configuration and exit
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
