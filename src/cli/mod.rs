//! CLI module
//!
//! Command-line interface over the catalog fetchers.
//!
//! # Commands
//!
//! - `products` - Page through the home feed
//! - `search` - Page through keyword search results
//! - `product` - Show one product
//! - `categories` - List product categories
//! - `token` - Set, clear or show the stored bearer token

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, PagingArgs, TokenAction};
pub use runner::Runner;
