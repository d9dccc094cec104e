//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Spendie - log money in plain language
#[derive(Parser)]
#[command(name = "spendie")]
#[command(about = "Personal finance bot: record and query transactions in natural language", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Ledger database path
    #[arg(long, default_value = "spendie.db", global = true)]
    pub db: PathBuf,

    /// User whose ledger is read and written
    #[arg(long, default_value_t = 1, global = true)]
    pub user: i64,

    /// Inference config file (TOML); environment variables still win
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Handle one chat message (record a transaction or answer a question)
    Message {
        /// The message text, e.g. "papa ne 1200 diye"
        text: String,
    },

    /// Read messages from stdin, one per line
    Chat,

    /// Record a transaction from a payment screenshot
    Screenshot {
        /// Image file (or OCR transcript with --ocr)
        file: PathBuf,

        /// Optional description sent along with the screenshot
        #[arg(short, long)]
        caption: Option<String>,

        /// Treat the file as an OCR text transcript instead of an image
        #[arg(long)]
        ocr: bool,
    },

    /// Run the pipeline without touching the ledger and print JSON
    Parse {
        /// The message text
        text: String,
    },

    /// Show income, expense and net balance
    Balance,

    /// Show spending by category
    Categories,

    /// Show daily spending over recent days
    Patterns {
        /// Number of days to include (1 to 3650)
        #[arg(short, long, default_value = "7", value_parser = clap::value_parser!(u32).range(1..=3650))]
        days: u32,
    },

    /// Export the ledger as CSV
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete every transaction for the user
    DeleteAll {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Manage prompts
    Prompts {
        #[command(subcommand)]
        action: PromptsAction,
    },

    /// Check that the inference service is reachable
    Health,
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List prompts and their override status
    List,

    /// Show a prompt's content
    Show {
        /// Prompt id (e.g. rephrase, extract_query)
        id: String,
    },
}
