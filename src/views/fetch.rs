//! Request tagging for out-of-order responses
//!
//! Every fetch a view issues gets a [`FetchTicket`] carrying a sequence
//! number and the parameters that triggered it. A response is committed
//! only if its ticket is the latest one issued; anything older is dropped.

use crate::api::ApiError;

/// Identifies one issued request and the parameters it was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket<P> {
    pub seq: u64,
    pub params: P,
}

/// A settled request, ready to be handed back to the view that issued it
#[derive(Debug, Clone)]
pub struct FetchResult<P, T> {
    pub ticket: FetchTicket<P>,
    pub result: Result<T, ApiError>,
}

impl<P, T> FetchResult<P, T> {
    pub fn new(ticket: FetchTicket<P>, result: Result<T, ApiError>) -> Self {
        Self { ticket, result }
    }
}

/// What a view did with a settled request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Data (or an error message) is now visible
    Committed,
    /// A newer request superseded this one
    Stale,
    /// The server answered 401; the caller must end the session
    Unauthorized,
}

/// Issues tickets and recognises the latest one
#[derive(Debug, Clone)]
pub struct FetchTracker<P> {
    issued: u64,
    pending: Option<FetchTicket<P>>,
}

impl<P> Default for FetchTracker<P> {
    fn default() -> Self {
        Self {
            issued: 0,
            pending: None,
        }
    }
}

impl<P: Clone + PartialEq> FetchTracker<P> {
    pub fn issue(&mut self, params: P) -> FetchTicket<P> {
        self.issued += 1;
        let ticket = FetchTicket {
            seq: self.issued,
            params,
        };
        self.pending = Some(ticket.clone());
        ticket
    }

    /// Accept `ticket` if it is the outstanding request, clearing it
    pub fn accept(&mut self, ticket: &FetchTicket<P>) -> bool {
        match &self.pending {
            Some(pending) if pending == ticket => {
                self.pending = None;
                true
            }
            _ => {
                tracing::debug!(seq = ticket.seq, "Dropping stale response");
                false
            }
        }
    }

    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }
}
