//! Tests for the auth module

use super::*;
use crate::storage::{CredentialStore, MemoryStore, StorageKey};
use crate::types::UserProfile;
use std::sync::Arc;

fn credentials_with(store: &MemoryStore) -> Credentials {
    Credentials::new(Arc::new(store.clone()))
}

#[tokio::test]
async fn test_no_token() {
    let store = MemoryStore::new();
    let credentials = credentials_with(&store);
    assert!(credentials.bearer_token().await.is_none());

    let client = reqwest::Client::new();
    let req = credentials.apply(client.get("https://example.com/api")).await;
    let built = req.build().unwrap();
    assert!(built.headers().get("Authorization").is_none());
}

#[tokio::test]
async fn test_bearer_header_applied() {
    let store = MemoryStore::with_token("my-token");
    let credentials = credentials_with(&store);

    let client = reqwest::Client::new();
    let req = credentials.apply(client.get("https://example.com/api")).await;
    let built = req.build().unwrap();
    assert_eq!(
        built.headers().get("Authorization").unwrap(),
        "Bearer my-token"
    );
}

#[tokio::test]
async fn test_blank_token_ignored() {
    let store = MemoryStore::with_token("   ");
    let credentials = credentials_with(&store);
    assert!(credentials.bearer_token().await.is_none());
}

#[tokio::test]
async fn test_profile_roundtrip_and_evict() {
    let store = MemoryStore::new();
    let credentials = credentials_with(&store);

    credentials.set_token("abc").await.unwrap();
    credentials
        .set_profile(&UserProfile {
            id: 9,
            name: "Lan".to_string(),
            email: "lan@example.com".to_string(),
            phone: None,
            avatar: None,
        })
        .await
        .unwrap();

    let profile = credentials.profile().await.unwrap().unwrap();
    assert_eq!(profile.id, 9);

    credentials.evict().await.unwrap();
    assert!(credentials.bearer_token().await.is_none());
    assert!(credentials.profile().await.unwrap().is_none());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_malformed_profile_is_ignored() {
    let store = MemoryStore::new();
    store
        .set(StorageKey::UserData.as_str(), "{broken")
        .await
        .unwrap();

    let credentials = credentials_with(&store);
    assert!(credentials.profile().await.unwrap().is_none());
}
