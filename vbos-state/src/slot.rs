//! Generation-tagged holders for fetched data.
//!
//! Every request for a slot takes a [`Ticket`]. Starting a new request
//! supersedes all earlier tickets, so a slow response to an old request can
//! never overwrite the result of a newer one, whatever order they finish in.

use crate::store::Store;
use log::debug;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Ticket {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSlot<T> {
    issued: u64,
    version: u64,
    loading: bool,
    value: Option<T>,
}

impl<T> Default for DataSlot<T> {
    fn default() -> Self {
        Self {
            issued: 0,
            version: 0,
            loading: false,
            value: None,
        }
    }
}

impl<T> DataSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding any in flight.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.loading = true;
        Ticket {
            generation: self.issued,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.generation == self.issued
    }

    /// Store `value` if `ticket` is the latest one issued. Stale results are
    /// dropped and false is returned.
    pub fn accept(&mut self, ticket: Ticket, value: T) -> bool {
        if !self.is_current(ticket) {
            debug!(
                "dropping stale result from request {} (latest is {})",
                ticket.generation, self.issued
            );
            return false;
        }
        self.value = Some(value);
        self.version += 1;
        self.loading = false;
        true
    }

    /// The latest request failed; the previous value stays. Returns false
    /// for a stale ticket.
    pub fn fail(&mut self, ticket: Ticket) -> bool {
        let current = self.is_current(ticket);
        if current {
            self.loading = false;
        }
        current
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Number of accepted results so far; bumps on every replacement.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Drop the value and supersede any request in flight.
    pub fn clear(&mut self) {
        self.issued += 1;
        self.loading = false;
        if self.value.take().is_some() {
            self.version += 1;
        }
    }
}

impl<T: Clone + PartialEq> Store<DataSlot<T>> {
    pub fn begin(&self) -> Ticket {
        self.modify(|slot| (slot.begin(), true))
    }

    pub fn accept(&self, ticket: Ticket, value: T) -> bool {
        self.modify(|slot| {
            let accepted = slot.accept(ticket, value);
            (accepted, accepted)
        })
    }

    pub fn fail(&self, ticket: Ticket) {
        self.modify(|slot| ((), slot.fail(ticket)))
    }
}
