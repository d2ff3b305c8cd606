//! Credential storage module
//!
//! Persisted key-value storage used for the bearer token and the cached
//! user profile. The rest of the crate only sees the [`CredentialStore`]
//! capability (get/set/remove); two implementations ship with it.
//!
//! # Overview
//!
//! - `MemoryStore` - process-local map, used in tests and ephemeral sessions
//! - `FileStore` - JSON file with atomic writes, used by the CLI

mod file;
mod store;

pub use file::FileStore;
pub use store::{CredentialStore, MemoryStore, StorageKey};

#[cfg(test)]
mod tests;
