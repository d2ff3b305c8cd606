//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Storefront data-fetching CLI
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL (overrides config and STOREFRONT_API_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Credential store file (JSON)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the home feed
    Products {
        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Search products by keyword
    Search {
        /// Search keyword
        query: String,

        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Show one product
    Product {
        /// Product id
        id: u64,
    },

    /// List product categories
    Categories,

    /// Manage the stored auth token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

/// Paging options shared by listing commands
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct PagingArgs {
    /// Page to fetch (defaults to the configured initial page)
    #[arg(long)]
    pub page: Option<u32>,

    /// Items per page (defaults to the configured page size)
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Keep loading until the server reports no more pages
    #[arg(long)]
    pub all: bool,

    /// Page cap for --all
    #[arg(long, requires = "all")]
    pub max_pages: Option<u32>,
}

/// Token subcommands
#[derive(Subcommand, Debug)]
pub enum TokenAction {
    /// Store a bearer token
    Set {
        /// Token value
        value: String,
    },
    /// Remove the token and cached profile
    Clear,
    /// Show whether a token is stored
    Show,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
