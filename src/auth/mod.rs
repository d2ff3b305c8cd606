//! Authentication module
//!
//! Bearer-token injection and credential eviction on top of the
//! [`CredentialStore`](crate::storage::CredentialStore) capability.
//!
//! Login itself happens elsewhere; this module only reads the token that was
//! written there and clears it (with the cached profile) when the backend
//! answers 401.

mod credentials;

pub use credentials::Credentials;

#[cfg(test)]
mod tests;
