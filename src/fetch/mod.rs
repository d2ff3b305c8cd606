//! Resource fetchers
//!
//! Per-resource functions that call the HTTP client with typed parameters and
//! normalize the server's response envelope into a [`PageResult`].
//!
//! # Envelopes
//!
//! The backend wraps payloads inconsistently: sometimes `{"data": {...}}`,
//! sometimes flat. Decoding tries the nested shape first, then the flat one,
//! and fails closed with a validation error when neither carries a
//! `products` list.
//!
//! [`PageResult`]: crate::types::PageResult

mod catalog;
mod envelope;
mod fetcher;

pub use catalog::{endpoints, HomeListing, ProductCatalog, SearchListing};
pub use envelope::{decode_item, decode_page};
pub use fetcher::{FnFetcher, ResourceFetcher};
