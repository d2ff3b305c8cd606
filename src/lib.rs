// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Storefront Fetch
//!
//! Data-fetching core for a storefront client: an authenticated HTTP
//! transport, typed catalog fetchers and an infinite-scroll pagination
//! controller.
//!
//! ## Features
//!
//! - **Bearer Auth**: Token read from a pluggable credential store, evicted on 401
//! - **Error Taxonomy**: Every failure classified into one of seven kinds
//! - **Transport Retries**: Bounded re-sends when no response arrives
//! - **Envelope Decoding**: Nested `{data: ...}` and flat bodies, fail-closed
//! - **Pagination**: Deduplicating merge, one request in flight, retry with backoff
//! - **Localized Messages**: Vietnamese and English error strings
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storefront_fetch::{
//!     auth::Credentials, fetch::ProductCatalog, http::HttpClient, messages::Messages,
//!     pagination::{PaginationController, PaginationOptions},
//!     storage::MemoryStore, AppConfig, Result,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::load(None)?;
//!     let credentials = Credentials::new(Arc::new(MemoryStore::new()));
//!     let client = HttpClient::with_credentials(config.http_config(), credentials)?;
//!     let messages = Messages::new(config.locale);
//!     let catalog = ProductCatalog::new(Arc::new(client), messages);
//!
//!     let feed = PaginationController::new(catalog.home(), config.pagination_options(), messages);
//!     feed.refresh().await;
//!     feed.load_more().await;
//!
//!     for product in feed.state().items {
//!         println!("{} {}", product.id, product.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │            PaginationController / RequestController             │
//! │   refresh() load_more() reset()   state() subscribe()           │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────────────┬──────────────────┐
//! │   Fetchers   │           Transport           │     Storage      │
//! ├──────────────┼───────────────────────────────┼──────────────────┤
//! │ HomeListing  │ Bearer injection              │ MemoryStore      │
//! │ SearchListing│ Status classification         │ FileStore        │
//! │ FnFetcher    │ Network retries, 401 eviction │                  │
//! │ Envelope     │ Throttle                      │                  │
//! └──────────────┴───────────────────────────────┴──────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types and classification
pub mod error;

/// Common types and catalog models
pub mod types;

/// Credential storage
pub mod storage;

/// Bearer token handling
pub mod auth;

/// HTTP client with retry and throttling
pub mod http;

/// Resource fetchers and envelope decoding
pub mod fetch;

/// Infinite-scroll pagination controller
pub mod pagination;

/// Single-resource request controller
pub mod request;

/// Controller retry policy
pub mod retry;

/// Localized user-facing messages
pub mod messages;

/// Application configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::AppConfig;
pub use error::{Error, ErrorKind, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
