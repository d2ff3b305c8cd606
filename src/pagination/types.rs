//! Pagination state and options
//!
//! The observable state of a paginated list and the rules for merging pages
//! into it.

use crate::messages::ErrorInfo;
use crate::retry::RetryPolicy;
use crate::types::{Identified, PageResult, DEFAULT_PAGE, DEFAULT_PER_PAGE};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

/// Where the controller is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing fetched since creation or the last reset
    #[default]
    Idle,
    /// Fetching a page that replaces the list
    Loading,
    /// Fetching a page that extends the list
    LoadingMore,
    /// Last fetch succeeded
    Ready,
    /// Last fetch failed
    Error,
}

/// Observable state of a paginated list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationState<T> {
    /// Accumulated items in page order, unique by id
    pub items: Vec<T>,
    /// A replacing fetch is running (also true before the first fetch)
    pub loading: bool,
    /// An extending fetch is running
    pub loading_more: bool,
    /// Last terminal failure
    pub error: Option<ErrorInfo>,
    /// Last page merged
    pub current_page: u32,
    /// Whether the server reported more pages
    pub has_more: bool,
    /// Total item count reported by the server
    pub total: Option<u64>,
    /// Lifecycle phase
    pub phase: Phase,
}

impl<T> PaginationState<T> {
    /// State before the first fetch
    pub fn initial(initial_page: u32) -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            loading_more: false,
            error: None,
            current_page: initial_page,
            has_more: true,
            total: None,
            phase: Phase::Idle,
        }
    }

    /// Whether a fetch is running
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Loading | Phase::LoadingMore)
    }

    pub(crate) fn begin(&mut self, is_load_more: bool) {
        self.loading = !is_load_more;
        self.loading_more = is_load_more;
        self.error = None;
        self.phase = if is_load_more {
            Phase::LoadingMore
        } else {
            Phase::Loading
        };
    }

    pub(crate) fn fail(&mut self, error: ErrorInfo) {
        self.loading = false;
        self.loading_more = false;
        self.error = Some(error);
        self.phase = Phase::Error;
    }

    /// Drop both loading flags without recording an outcome
    pub(crate) fn settle(&mut self) {
        self.loading = false;
        self.loading_more = false;
        if self.is_busy() {
            self.phase = if self.items.is_empty() {
                Phase::Idle
            } else {
                Phase::Ready
            };
        }
    }
}

impl<T: Identified> PaginationState<T> {
    /// Merge a fetched page; returns the number of items added
    pub(crate) fn apply(&mut self, page: u32, is_load_more: bool, result: PageResult<T>) -> usize {
        if !is_load_more {
            self.items.clear();
        }
        let added = merge_unique(&mut self.items, result.items);

        self.current_page = page;
        self.has_more = result.has_more;
        if result.total.is_some() {
            self.total = result.total;
        }
        self.loading = false;
        self.loading_more = false;
        self.error = None;
        self.phase = Phase::Ready;
        added
    }
}

impl<T> Default for PaginationState<T> {
    fn default() -> Self {
        Self::initial(DEFAULT_PAGE)
    }
}

/// Append `incoming` to `items`, skipping ids already present
///
/// Incoming order is preserved; the first occurrence of an id wins.
/// Returns the number of items appended.
pub fn merge_unique<T: Identified>(items: &mut Vec<T>, incoming: Vec<T>) -> usize {
    let mut seen: HashSet<T::Id> = items.iter().map(T::id).collect();
    let before = items.len();
    items.extend(incoming.into_iter().filter(|item| seen.insert(item.id())));
    items.len() - before
}

/// Controller settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOptions {
    /// Items per page
    pub per_page: u32,
    /// Page loaded by `refresh` and restored by `reset`
    pub initial_page: u32,
    /// Whole-fetch retry policy
    pub retry: RetryPolicy,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            initial_page: DEFAULT_PAGE,
            retry: RetryPolicy::default(),
        }
    }
}

impl PaginationOptions {
    /// Set the page size
    #[must_use]
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Set the initial page
    #[must_use]
    pub fn initial_page(mut self, page: u32) -> Self {
        self.initial_page = page;
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn retry(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.retry = RetryPolicy::new(max_attempts, delay);
        self
    }
}

/// Why a fetch request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another fetch is outstanding
    InFlight,
    /// The requested page was already merged
    AlreadyLoaded,
    /// The server reported no more pages
    Exhausted,
    /// Nothing has been loaded yet, so there is nothing to extend
    NotStarted,
}

/// What a fetch call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was merged
    Loaded {
        /// Page number
        page: u32,
        /// Items added after deduplication
        added: usize,
    },
    /// The call returned without a request
    Skipped(SkipReason),
    /// The fetch ended in the error state
    Failed(ErrorInfo),
    /// A reset or newer fetch took over; state was left alone
    Superseded,
}

impl FetchOutcome {
    /// Whether a page was merged
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}
