//! Request guard
//!
//! Per-controller bookkeeping that suppresses concurrent and duplicate page
//! requests. Each admitted fetch gets a [`Ticket`]; `reset` and any newer
//! admission invalidate older tickets, so a fetch that was superseded while
//! it waited can tell and back off without touching state.

/// Proof of admission for one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Result of asking the guard to start a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The fetch may proceed
    Admitted(Ticket),
    /// Another fetch is outstanding
    InFlight,
    /// A load-more for a page that was already merged
    AlreadyLoaded,
}

/// In-flight and duplicate-page guard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestGuard {
    in_flight: bool,
    last_completed_page: u32,
    epoch: u64,
}

impl RequestGuard {
    /// Fresh guard
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a fetch is outstanding
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Highest page merged since the last reset or refresh
    pub fn last_completed_page(&self) -> u32 {
        self.last_completed_page
    }

    /// Try to start a fetch for `page`
    pub fn try_begin(&mut self, page: u32, is_load_more: bool) -> Admission {
        if self.in_flight {
            return Admission::InFlight;
        }
        if is_load_more && page <= self.last_completed_page {
            return Admission::AlreadyLoaded;
        }
        self.in_flight = true;
        self.epoch += 1;
        Admission::Admitted(Ticket(self.epoch))
    }

    /// Release the in-flight marker ahead of a backoff wait
    ///
    /// Returns false if the ticket is stale.
    pub fn suspend(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.in_flight = false;
        true
    }

    /// Re-acquire the in-flight marker after a backoff wait
    ///
    /// Fails if another fetch was admitted (or the guard was reset) in the
    /// meantime.
    pub fn resume(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) || self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Record a merged page and release the marker
    pub fn complete(&mut self, ticket: Ticket, page: u32) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.last_completed_page = page;
        self.in_flight = false;
        true
    }

    /// Release the marker after a terminal failure
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.in_flight = false;
        true
    }

    /// Allow the already-merged pages to be fetched again
    pub fn rewind(&mut self) {
        self.last_completed_page = 0;
    }

    /// Return to the pre-first-fetch condition, invalidating all tickets
    pub fn reset(&mut self) {
        self.in_flight = false;
        self.last_completed_page = 0;
        self.epoch += 1;
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.epoch == ticket.0
    }
}
