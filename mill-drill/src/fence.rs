//! Generation tokens.
//!
//! Each fetching transition advances a generation and carries the ticket it
//! got. When the fetch resolves, the result is applied only if the ticket is
//! still current; otherwise a newer transition has taken over and the result
//! is dropped. Nothing is cancelled.

use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct Generation(Cell<u64>);

impl Generation {
    /// Start a new generation; every earlier ticket becomes stale.
    pub fn advance(&self) -> Ticket {
        let next = self.0.get().wrapping_add(1);
        self.0.set(next);
        Ticket(next)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.0.get() == ticket.0
    }
}
