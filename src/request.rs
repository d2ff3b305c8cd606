//! Single-resource request controller
//!
//! The non-paginated counterpart of [`PaginationController`]: runs requests
//! with the same bounded retry policy and publishes `{data, loading, error}`
//! to observers. Requests may overlap; only the latest one started updates
//! the state.
//!
//! [`PaginationController`]: crate::pagination::PaginationController

use crate::error::Result;
use crate::messages::{ErrorInfo, Messages};
use crate::retry::RetryPolicy;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, error, warn};

/// Observable state of a single request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestState<T> {
    /// Last successful result
    pub data: Option<T>,
    /// A request is running
    pub loading: bool,
    /// Last terminal failure
    pub error: Option<ErrorInfo>,
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Tracks the outcome of the most recently started request
pub struct RequestController<T> {
    retry: RetryPolicy,
    messages: Messages,
    state: watch::Sender<RequestState<T>>,
    generation: AtomicU64,
}

impl<T: Clone + Send + Sync> RequestController<T> {
    /// Create a controller with no data
    pub fn new(retry: RetryPolicy, messages: Messages) -> Self {
        let (state, _) = watch::channel(RequestState::default());
        Self {
            retry,
            messages,
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> RequestState<T> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.state.subscribe()
    }

    /// Run `make_request`, retrying transient failures
    ///
    /// `make_request` is called once per attempt. On success the result
    /// replaces `data`; on a terminal failure `data` is kept and `error`
    /// carries the localized message. A newer `request` or a `reset` issued
    /// while this one runs wins, and the late outcome is only returned,
    /// never stored.
    pub async fn request<F, Fut>(&self, mut make_request: F) -> std::result::Result<T, ErrorInfo>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let mut attempt = 1;
        let outcome = loop {
            match make_request().await {
                Ok(data) => break Ok(data),
                Err(err) if self.retry.should_retry(&err, attempt) => {
                    warn!(attempt, error = %err, "Request failed, retrying");
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    error!(attempt, kind = %err.kind(), error = %err, "Request failed");
                    break Err(ErrorInfo::from_error(&err, &self.messages));
                }
            }
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding superseded request result");
            return outcome;
        }

        match &outcome {
            Ok(data) => self.state.send_modify(|state| {
                state.data = Some(data.clone());
                state.loading = false;
                state.error = None;
            }),
            Err(info) => self.state.send_modify(|state| {
                state.loading = false;
                state.error = Some(info.clone());
            }),
        }
        outcome
    }

    /// Clear data and error; a running request is superseded
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(RequestState::default());
    }

    /// Replace `data` directly, e.g. after a local edit
    pub fn set_data(&self, data: Option<T>) {
        self.state.send_modify(|state| state.data = data);
    }
}

impl<T> std::fmt::Debug for RequestController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestController")
            .field("retry", &self.retry)
            .field("messages", &self.messages)
            .finish_non_exhaustive()
    }
}
