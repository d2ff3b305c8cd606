//! Tests for the pagination module

use super::*;
use crate::auth::Credentials;
use crate::error::{Error, ErrorKind, Result};
use crate::fetch::{ProductCatalog, ResourceFetcher};
use crate::http::{HttpClient, HttpClientConfig};
use crate::messages::{Locale, Messages};
use crate::storage::{CredentialStore, MemoryStore, StorageKey};
use crate::types::{Identified, PageRequest, PageResult};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: u32,
}

impl Identified for Row {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

/// Fetcher that replays a queue of canned results
#[derive(Default)]
struct Scripted {
    responses: Mutex<VecDeque<Result<PageResult<Row>>>>,
    requests: Mutex<Vec<PageRequest>>,
    calls: AtomicUsize,
    latency: Duration,
}

impl Scripted {
    fn new(responses: Vec<Result<PageResult<Row>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceFetcher for Scripted {
    type Item = Row;

    async fn list(&self, request: PageRequest) -> Result<PageResult<Row>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(PageResult::new(Vec::new(), false)))
    }
}

fn page(ids: &[u32], has_more: bool) -> Result<PageResult<Row>> {
    Ok(PageResult::new(
        ids.iter().map(|&id| Row { id }).collect(),
        has_more,
    ))
}

fn server_error() -> Result<PageResult<Row>> {
    Err(Error::Server {
        status: 500,
        body: String::new(),
    })
}

fn options() -> PaginationOptions {
    PaginationOptions::default()
        .per_page(2)
        .retry(3, Duration::from_millis(10))
}

fn controller(fetcher: Arc<Scripted>) -> PaginationController<Arc<Scripted>> {
    PaginationController::new(fetcher, options(), Messages::new(Locale::En))
}

fn ids(state: &PaginationState<Row>) -> Vec<u32> {
    state.items.iter().map(|row| row.id).collect()
}

// ============================================================================
// Merge
// ============================================================================

#[test]
fn test_merge_unique_skips_known_ids() {
    let mut items = vec![Row { id: 1 }, Row { id: 2 }];
    let added = merge_unique(&mut items, vec![Row { id: 2 }, Row { id: 3 }]);

    assert_eq!(added, 1);
    assert_eq!(items, vec![Row { id: 1 }, Row { id: 2 }, Row { id: 3 }]);
}

#[test]
fn test_merge_unique_dedupes_within_page() {
    let mut items = Vec::new();
    let added = merge_unique(&mut items, vec![Row { id: 4 }, Row { id: 4 }, Row { id: 5 }]);

    assert_eq!(added, 2);
    assert_eq!(items, vec![Row { id: 4 }, Row { id: 5 }]);
}

#[test]
fn test_initial_state() {
    let state = PaginationState::<Row>::initial(1);
    assert!(state.items.is_empty());
    assert!(state.loading);
    assert!(!state.loading_more);
    assert!(state.error.is_none());
    assert_eq!(state.current_page, 1);
    assert!(state.has_more);
    assert_eq!(state.phase, Phase::Idle);
}

#[test]
fn test_options_defaults() {
    let options = PaginationOptions::default();
    assert_eq!(options.per_page, 25);
    assert_eq!(options.initial_page, 1);
    assert_eq!(options.retry.max_attempts, 3);
    assert_eq!(options.retry.delay, Duration::from_millis(500));
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn test_overlapping_pages_merge_by_id() {
    let fetcher = Arc::new(Scripted::new(vec![page(&[1, 2], true), page(&[2, 3], false)]));
    let controller = controller(fetcher.clone());

    let outcome = controller.refresh().await;
    assert_eq!(outcome, FetchOutcome::Loaded { page: 1, added: 2 });

    let outcome = controller.load_more().await;
    assert_eq!(outcome, FetchOutcome::Loaded { page: 2, added: 1 });

    let state = controller.state();
    assert_eq!(ids(&state), vec![1, 2, 3]);
    assert!(!state.has_more);
    assert_eq!(state.current_page, 2);
    assert_eq!(state.phase, Phase::Ready);
    assert!(!state.loading);
    assert!(!state.loading_more);

    let pages: Vec<u32> = fetcher.requests().iter().map(|r| r.page).collect();
    assert_eq!(pages, vec![1, 2]);
    assert!(fetcher.requests().iter().all(|r| r.per_page == 2));
}

#[tokio::test]
async fn test_refresh_replaces_list() {
    let fetcher = Arc::new(Scripted::new(vec![
        page(&[1, 2], true),
        page(&[3, 4], true),
        page(&[9], true),
    ]));
    let controller = controller(fetcher.clone());

    controller.refresh().await;
    controller.load_more().await;
    assert_eq!(ids(&controller.state()), vec![1, 2, 3, 4]);

    controller.refresh().await;
    let state = controller.state();
    assert_eq!(ids(&state), vec![9]);
    assert_eq!(state.current_page, 1);
}

#[tokio::test]
async fn test_concurrent_load_more_issues_one_request() {
    let fetcher = Arc::new(
        Scripted::new(vec![page(&[1, 2], true), page(&[3, 4], true)])
            .with_latency(Duration::from_millis(20)),
    );
    let controller = controller(fetcher.clone());
    controller.refresh().await;

    let (first, second) = tokio::join!(controller.load_more(), controller.load_more());

    assert_eq!(first, FetchOutcome::Loaded { page: 2, added: 2 });
    assert_eq!(second, FetchOutcome::Skipped(SkipReason::InFlight));
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(ids(&controller.state()), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_concurrent_refresh_issues_one_request() {
    let fetcher = Arc::new(
        Scripted::new(vec![page(&[1], false)]).with_latency(Duration::from_millis(20)),
    );
    let controller = controller(fetcher.clone());

    let (first, second) = tokio::join!(controller.refresh(), controller.refresh());

    assert!(first.is_loaded());
    assert_eq!(second, FetchOutcome::Skipped(SkipReason::InFlight));
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_load_more_noop_when_exhausted() {
    let fetcher = Arc::new(Scripted::new(vec![page(&[1], false)]));
    let controller = controller(fetcher.clone());
    controller.refresh().await;

    let outcome = controller.load_more().await;
    assert_eq!(outcome, FetchOutcome::Skipped(SkipReason::Exhausted));
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_load_more_noop_before_first_fetch() {
    let fetcher = Arc::new(Scripted::new(vec![page(&[1], true)]));
    let controller = controller(fetcher.clone());

    let outcome = controller.load_more().await;
    assert_eq!(outcome, FetchOutcome::Skipped(SkipReason::NotStarted));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_fetch_rejects_already_loaded_page() {
    let fetcher = Arc::new(Scripted::new(vec![page(&[1], true), page(&[2], true)]));
    let controller = controller(fetcher.clone());
    controller.refresh().await;
    controller.load_more().await;

    let outcome = controller.fetch(2, true).await;
    assert_eq!(outcome, FetchOutcome::Skipped(SkipReason::AlreadyLoaded));
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn test_invalid_page_is_a_validation_error() {
    let fetcher = Arc::new(Scripted::default());
    let controller = controller(fetcher.clone());

    let outcome = controller.fetch(0, false).await;
    match outcome {
        FetchOutcome::Failed(info) => assert_eq!(info.kind, ErrorKind::Validation),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(fetcher.calls(), 0);
    assert_eq!(controller.state().phase, Phase::Error);
}

#[tokio::test]
async fn test_invalid_page_leaves_running_fetch_state_alone() {
    let fetcher = Arc::new(
        Scripted::new(vec![page(&[1, 2], true)]).with_latency(Duration::from_millis(50)),
    );
    let controller = controller(fetcher.clone());

    let (refreshed, rejected) = tokio::join!(controller.refresh(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let outcome = controller.fetch(0, false).await;
        let state = controller.state();
        assert!(state.loading);
        assert_eq!(state.phase, Phase::Loading);
        assert!(state.error.is_none());
        outcome
    });

    match rejected {
        FetchOutcome::Failed(info) => assert_eq!(info.kind, ErrorKind::Validation),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(refreshed, FetchOutcome::Loaded { page: 1, added: 2 });
    assert_eq!(fetcher.calls(), 1);

    let state = controller.state();
    assert_eq!(state.phase, Phase::Ready);
    assert!(state.error.is_none());
    assert_eq!(ids(&state), vec![1, 2]);
}

#[tokio::test]
async fn test_total_is_tracked() {
    let first = PageResult::new(vec![Row { id: 1 }], true).with_total(3);
    let fetcher = Arc::new(Scripted::new(vec![Ok(first)]));
    let controller = controller(fetcher);

    controller.refresh().await;
    assert_eq!(controller.state().total, Some(3));
}

// ============================================================================
// Reset
// ============================================================================

#[tokio::test]
async fn test_reset_restores_initial_state() {
    let fetcher = Arc::new(Scripted::new(vec![page(&[1, 2], true), page(&[3], true)]));
    let controller = controller(fetcher.clone());
    controller.refresh().await;
    controller.load_more().await;

    controller.reset();

    assert_eq!(controller.state(), PaginationState::initial(1));
    assert_eq!(
        controller.load_more().await,
        FetchOutcome::Skipped(SkipReason::NotStarted)
    );
}

#[tokio::test]
async fn test_reset_discards_outstanding_fetch() {
    let fetcher = Arc::new(
        Scripted::new(vec![page(&[1, 2], true)]).with_latency(Duration::from_millis(40)),
    );
    let controller = controller(fetcher.clone());

    let (outcome, ()) = tokio::join!(controller.refresh(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.reset();
    });

    assert_eq!(outcome, FetchOutcome::Superseded);
    assert_eq!(controller.state(), PaginationState::initial(1));
}

#[tokio::test]
async fn test_dropped_fetch_releases_guard() {
    let fetcher = Arc::new(
        Scripted::new(vec![page(&[1], true), page(&[1], true)])
            .with_latency(Duration::from_millis(50)),
    );
    let controller = controller(fetcher.clone());

    let timed_out = tokio::time::timeout(Duration::from_millis(5), controller.refresh()).await;
    assert!(timed_out.is_err());

    let state = controller.state();
    assert!(!state.loading);
    assert!(!state.is_busy());

    assert!(controller.refresh().await.is_loaded());
    assert_eq!(fetcher.calls(), 2);
}

// ============================================================================
// Failures and Retries
// ============================================================================

#[tokio::test]
async fn test_server_error_retried_then_fails() {
    let fetcher = Arc::new(Scripted::new(vec![
        server_error(),
        server_error(),
        server_error(),
    ]));
    let controller = controller(fetcher.clone());

    let outcome = controller.refresh().await;

    assert_eq!(fetcher.calls(), 3);
    let state = controller.state();
    assert_eq!(state.phase, Phase::Error);
    assert!(!state.loading);
    let error = state.error.unwrap();
    assert_eq!(error.kind, ErrorKind::Server);
    assert_eq!(error.message, "Server error. Please try again later");
    assert_eq!(outcome, FetchOutcome::Failed(error));
}

#[tokio::test]
async fn test_server_error_recovers_on_retry() {
    let fetcher = Arc::new(Scripted::new(vec![server_error(), page(&[7], false)]));
    let controller = controller(fetcher.clone());

    let outcome = controller.refresh().await;

    assert_eq!(outcome, FetchOutcome::Loaded { page: 1, added: 1 });
    assert_eq!(fetcher.calls(), 2);
    assert!(controller.state().error.is_none());
}

#[tokio::test]
async fn test_unknown_error_is_retried() {
    let fetcher = Arc::new(Scripted::new(vec![
        Err(Error::Other("boom".into())),
        page(&[1], false),
    ]));
    let controller = controller(fetcher.clone());

    assert!(controller.refresh().await.is_loaded());
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn test_malformed_request_error_not_retried() {
    let builder_error = reqwest::Client::new()
        .get("not a url")
        .build()
        .unwrap_err();
    let fetcher = Arc::new(Scripted::new(vec![Err(Error::Http(builder_error))]));
    let controller = controller(fetcher.clone());

    let outcome = controller.refresh().await;

    assert_eq!(fetcher.calls(), 1);
    match outcome {
        FetchOutcome::Failed(info) => assert_eq!(info.kind, ErrorKind::Unknown),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_validation_error_not_retried() {
    let fetcher = Arc::new(Scripted::new(vec![Err(Error::validation_with_hint(
        "products missing",
        "Try again",
    ))]));
    let controller = controller(fetcher.clone());

    let outcome = controller.refresh().await;

    assert_eq!(fetcher.calls(), 1);
    match outcome {
        FetchOutcome::Failed(info) => assert_eq!(info.kind, ErrorKind::Validation),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_network_error_is_terminal() {
    let fetcher = Arc::new(Scripted::new(vec![Err(Error::network("connection refused"))]));
    let controller = controller(fetcher.clone());

    controller.refresh().await;

    assert_eq!(fetcher.calls(), 1);
    let error = controller.state().error.unwrap();
    assert_eq!(error.kind, ErrorKind::Network);
    assert_eq!(error.message, "No network connection");
}

#[tokio::test]
async fn test_failed_load_more_keeps_items() {
    let fetcher = Arc::new(Scripted::new(vec![page(&[1, 2], true), Err(Error::NotFound)]));
    let controller = controller(fetcher.clone());
    controller.refresh().await;

    let outcome = controller.load_more().await;

    assert!(matches!(outcome, FetchOutcome::Failed(_)));
    let state = controller.state();
    assert_eq!(ids(&state), vec![1, 2]);
    assert_eq!(state.current_page, 1);
    assert!(!state.loading_more);
    assert_eq!(state.phase, Phase::Error);
}

#[tokio::test]
async fn test_refresh_during_backoff_supersedes_retry() {
    let fetcher = Arc::new(Scripted::new(vec![server_error(), page(&[5, 6], true)]));
    let controller = PaginationController::new(
        fetcher.clone(),
        options().retry(3, Duration::from_millis(100)),
        Messages::new(Locale::En),
    );

    let (stale, fresh) = tokio::join!(controller.refresh(), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        controller.refresh().await
    });

    assert_eq!(stale, FetchOutcome::Superseded);
    assert_eq!(fresh, FetchOutcome::Loaded { page: 1, added: 2 });
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(ids(&controller.state()), vec![5, 6]);
}

#[tokio::test]
async fn test_unauthorized_evicts_credentials_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "expired"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = MemoryStore::with_token("stale-token");
    store
        .set(
            StorageKey::UserData.as_str(),
            &json!({"id": 1, "name": "An", "email": "an@example.com"}).to_string(),
        )
        .await
        .unwrap();

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .retry_delay(Duration::from_millis(10))
        .build();
    let client =
        HttpClient::with_credentials(config, Credentials::new(Arc::new(store.clone()))).unwrap();
    let catalog = ProductCatalog::new(Arc::new(client), Messages::new(Locale::En));
    let controller = PaginationController::new(
        catalog.home(),
        options(),
        Messages::new(Locale::En),
    );

    controller.refresh().await;

    let error = controller.state().error.unwrap();
    assert_eq!(error.kind, ErrorKind::Unauthorized);
    assert_eq!(error.message, "Your session has expired");
    assert!(store.get(StorageKey::AuthToken.as_str()).await.unwrap().is_none());
    assert!(store.get(StorageKey::UserData.as_str()).await.unwrap().is_none());
}

// ============================================================================
// Observation
// ============================================================================

#[tokio::test]
async fn test_subscribers_see_updates() {
    let fetcher = Arc::new(Scripted::new(vec![page(&[1, 2], true)]));
    let controller = controller(fetcher);
    let mut rx = controller.subscribe();
    assert!(!rx.has_changed().unwrap());

    controller.refresh().await;

    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert_eq!(ids(&state), vec![1, 2]);
    assert_eq!(state.phase, Phase::Ready);
}

#[tokio::test]
async fn test_load_all_until_exhausted() {
    let fetcher = Arc::new(Scripted::new(vec![
        page(&[1, 2], true),
        page(&[3, 4], true),
        page(&[5], false),
    ]));
    let controller = controller(fetcher.clone());

    let outcome = controller.load_all(None).await;

    assert_eq!(outcome, FetchOutcome::Loaded { page: 3, added: 1 });
    assert_eq!(ids(&controller.state()), vec![1, 2, 3, 4, 5]);
    assert_eq!(fetcher.calls(), 3);
}

#[tokio::test]
async fn test_load_all_respects_page_limit() {
    let fetcher = Arc::new(Scripted::new(vec![
        page(&[1, 2], true),
        page(&[3, 4], true),
        page(&[5], false),
    ]));
    let controller = controller(fetcher.clone());

    controller.load_all(Some(2)).await;

    let state = controller.state();
    assert_eq!(ids(&state), vec![1, 2, 3, 4]);
    assert!(state.has_more);
    assert_eq!(fetcher.calls(), 2);
}
