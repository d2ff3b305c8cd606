//! Pagination module
//!
//! Infinite-scroll controller over any [`ResourceFetcher`].
//!
//! # Overview
//!
//! The controller owns the paging state machine:
//!
//! ```text
//!  Idle ──fetch──▶ Loading ──ok──▶ Ready ──load_more──▶ LoadingMore ──ok──▶ Ready
//!                     │                                      │
//!                     └────────────err────▶ Error ◀───err────┘
//! ```
//!
//! At most one request is outstanding per controller; overlapping pages are
//! merged by item id so the accumulated list never holds duplicates.
//!
//! [`ResourceFetcher`]: crate::fetch::ResourceFetcher

mod controller;
mod guard;
mod types;

pub use controller::PaginationController;
pub use guard::{Admission, RequestGuard, Ticket};
pub use types::{merge_unique, FetchOutcome, PaginationOptions, PaginationState, Phase, SkipReason};

#[cfg(test)]
mod tests;
