//! Credentials implementation
//!
//! Reads the bearer token for outbound requests and evicts stored
//! credentials on authentication failure.

use crate::error::Result;
use crate::storage::{CredentialStore, StorageKey};
use crate::types::UserProfile;
use reqwest::RequestBuilder;
use std::sync::Arc;
use tracing::{info, warn};

/// Handle on the stored credentials
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn CredentialStore>,
}

impl Credentials {
    /// Wrap a credential store
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Current bearer token, if one is stored
    ///
    /// A failing store read is logged and treated as "no token" so the
    /// request still goes out unauthenticated.
    pub async fn bearer_token(&self) -> Option<String> {
        match self.store.get(StorageKey::AuthToken.as_str()).await {
            Ok(Some(token)) if !token.trim().is_empty() => Some(token),
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to read auth token: {e}");
                None
            }
        }
    }

    /// Attach `Authorization: Bearer <token>` when a token is stored
    pub async fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match self.bearer_token().await {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Store a bearer token
    pub async fn set_token(&self, token: &str) -> Result<()> {
        self.store.set(StorageKey::AuthToken.as_str(), token).await
    }

    /// Cache the signed-in user's profile
    pub async fn set_profile(&self, profile: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.store.set(StorageKey::UserData.as_str(), &json).await
    }

    /// Cached user profile, if present and well-formed
    pub async fn profile(&self) -> Result<Option<UserProfile>> {
        match self.store.get(StorageKey::UserData.as_str()).await? {
            Some(json) => match serde_json::from_str(&json) {
                Ok(profile) => Ok(Some(profile)),
                Err(e) => {
                    warn!("Ignoring malformed cached profile: {e}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Delete the stored token and cached profile
    pub async fn evict(&self) -> Result<()> {
        self.store.remove(StorageKey::AuthToken.as_str()).await?;
        self.store.remove(StorageKey::UserData.as_str()).await?;
        info!("Stored credentials cleared");
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}
