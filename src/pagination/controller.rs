//! Pagination controller
//!
//! Drives a [`ResourceFetcher`] page by page, merging results into a
//! [`PaginationState`] that observers can watch.

use super::guard::{Admission, RequestGuard, Ticket};
use super::types::{FetchOutcome, PaginationOptions, PaginationState, Phase, SkipReason};
use crate::fetch::ResourceFetcher;
use crate::messages::{ErrorInfo, Messages};
use crate::types::{Identified, PageRequest};
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Infinite-scroll controller
///
/// At most one request is outstanding at a time. Transient failures are
/// retried whole according to the configured [`RetryPolicy`];
/// the in-flight marker is released while waiting, so a `refresh` or
/// `reset` issued during the wait takes over and the stale retry is
/// dropped.
///
/// [`RetryPolicy`]: crate::retry::RetryPolicy
pub struct PaginationController<F: ResourceFetcher> {
    fetcher: F,
    options: PaginationOptions,
    messages: Messages,
    state: watch::Sender<PaginationState<F::Item>>,
    guard: Mutex<RequestGuard>,
}

impl<F> PaginationController<F>
where
    F: ResourceFetcher,
    F::Item: Identified + Clone + Sync,
{
    /// Create a controller in the initial state; nothing is fetched yet
    pub fn new(fetcher: F, options: PaginationOptions, messages: Messages) -> Self {
        let (state, _) = watch::channel(PaginationState::initial(options.initial_page));
        Self {
            fetcher,
            options,
            messages,
            state,
            guard: Mutex::new(RequestGuard::new()),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> PaginationState<F::Item> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<PaginationState<F::Item>> {
        self.state.subscribe()
    }

    /// Controller settings
    pub fn options(&self) -> &PaginationOptions {
        &self.options
    }

    /// The wrapped fetcher
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch `page`, replacing the list or extending it
    ///
    /// Returns without a request when another fetch is outstanding, or when
    /// extending with a page that was already merged. An invalid page fails
    /// without a request and only records the error when nothing is running.
    pub async fn fetch(&self, page: u32, is_load_more: bool) -> FetchOutcome {
        let request = match PageRequest::new(page, self.options.per_page) {
            Ok(request) => request,
            Err(err) => {
                let info = ErrorInfo::from_error(&err, &self.messages);
                let busy = self.with_guard(|guard| guard.in_flight())
                    || self.state.borrow().is_busy();
                if busy {
                    debug!(page, error = %err, "Rejected fetch left the running one untouched");
                } else {
                    self.state.send_modify(|state| state.fail(info.clone()));
                }
                return FetchOutcome::Failed(info);
            }
        };

        let ticket = match self.with_guard(|guard| guard.try_begin(page, is_load_more)) {
            Admission::Admitted(ticket) => ticket,
            Admission::InFlight => {
                debug!(page, "Fetch skipped, another request is outstanding");
                return FetchOutcome::Skipped(SkipReason::InFlight);
            }
            Admission::AlreadyLoaded => {
                debug!(page, "Fetch skipped, page already loaded");
                return FetchOutcome::Skipped(SkipReason::AlreadyLoaded);
            }
        };

        let mut scope = FetchScope::new(&self.guard, &self.state, ticket);
        let mut attempt = 1;

        loop {
            self.state.send_modify(|state| state.begin(is_load_more));

            match self.fetcher.list(request).await {
                Ok(result) => {
                    scope.disarm();
                    if !self.with_guard(|guard| guard.complete(ticket, page)) {
                        debug!(page, "Discarding superseded page");
                        return FetchOutcome::Superseded;
                    }

                    let mut added = 0;
                    self.state.send_modify(|state| {
                        added = state.apply(page, is_load_more, result);
                    });
                    debug!(page, added, "Page merged");
                    return FetchOutcome::Loaded { page, added };
                }
                Err(err) if self.options.retry.should_retry(&err, attempt) => {
                    warn!(
                        page,
                        attempt,
                        max_attempts = self.options.retry.max_attempts,
                        error = %err,
                        "Fetch failed, retrying"
                    );
                    if !self.with_guard(|guard| guard.suspend(ticket)) {
                        scope.disarm();
                        return FetchOutcome::Superseded;
                    }

                    tokio::time::sleep(self.options.retry.delay).await;

                    if !self.with_guard(|guard| guard.resume(ticket)) {
                        scope.disarm();
                        debug!(page, "Retry superseded during backoff");
                        return FetchOutcome::Superseded;
                    }
                    attempt += 1;
                }
                Err(err) => {
                    scope.disarm();
                    error!(page, attempt, kind = %err.kind(), error = %err, "Fetch failed");
                    if !self.with_guard(|guard| guard.finish(ticket)) {
                        return FetchOutcome::Superseded;
                    }

                    let info = ErrorInfo::from_error(&err, &self.messages);
                    self.state.send_modify(|state| state.fail(info.clone()));
                    return FetchOutcome::Failed(info);
                }
            }
        }
    }

    /// Fetch the page after the current one
    ///
    /// A no-op before the first fetch, while a fetch is running, or once the
    /// server reported no more pages.
    pub async fn load_more(&self) -> FetchOutcome {
        let next = {
            let state = self.state.borrow();
            if state.phase == Phase::Idle {
                return FetchOutcome::Skipped(SkipReason::NotStarted);
            }
            if state.is_busy() {
                return FetchOutcome::Skipped(SkipReason::InFlight);
            }
            if !state.has_more {
                return FetchOutcome::Skipped(SkipReason::Exhausted);
            }
            state.current_page.saturating_add(1)
        };
        self.fetch(next, true).await
    }

    /// Reload from the initial page, replacing the list
    pub async fn refresh(&self) -> FetchOutcome {
        self.with_guard(RequestGuard::rewind);
        self.fetch(self.options.initial_page, false).await
    }

    /// Return to the initial state
    ///
    /// Any outstanding fetch or pending retry is superseded and its result
    /// discarded.
    pub fn reset(&self) {
        self.with_guard(RequestGuard::reset);
        self.state
            .send_replace(PaginationState::initial(self.options.initial_page));
        debug!("Pagination reset");
    }

    /// Refresh, then keep loading until the server reports no more pages
    ///
    /// `max_pages` caps the number of pages merged. Returns the outcome of
    /// the last fetch.
    pub async fn load_all(&self, max_pages: Option<u32>) -> FetchOutcome {
        let mut outcome = self.refresh().await;
        let mut pages = 1;

        while outcome.is_loaded() && self.state.borrow().has_more {
            if max_pages.is_some_and(|max| pages >= max) {
                info!(pages, "Page limit reached");
                break;
            }
            outcome = self.load_more().await;
            pages += 1;
        }
        outcome
    }

    fn with_guard<R>(&self, f: impl FnOnce(&mut RequestGuard) -> R) -> R {
        let mut guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<F: ResourceFetcher> std::fmt::Debug for PaginationController<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationController")
            .field("options", &self.options)
            .field("messages", &self.messages)
            .finish_non_exhaustive()
    }
}

/// Clears the guard and loading flags if a fetch future is dropped mid-way
struct FetchScope<'a, T> {
    guard: &'a Mutex<RequestGuard>,
    state: &'a watch::Sender<PaginationState<T>>,
    ticket: Ticket,
    armed: bool,
}

impl<'a, T> FetchScope<'a, T> {
    fn new(
        guard: &'a Mutex<RequestGuard>,
        state: &'a watch::Sender<PaginationState<T>>,
        ticket: Ticket,
    ) -> Self {
        Self {
            guard,
            state,
            ticket,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<T> Drop for FetchScope<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let released = self
            .guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finish(self.ticket);
        if released {
            self.state.send_modify(PaginationState::settle);
        }
    }
}
