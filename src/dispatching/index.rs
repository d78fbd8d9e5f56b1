//! Ticket index.
//!
//! Owns every queued ticket, keyed by id. Server queues hold only ids, so
//! a lookup here always returns the one authoritative ticket; there is no
//! second copy to go stale when a ticket changes server or turn.

use std::collections::HashMap;

use crate::models::{Ticket, TicketId};

/// Id → ticket store with O(1) average access.
#[derive(Debug, Clone, Default)]
pub struct TicketIndex {
    tickets: HashMap<TicketId, Ticket>,
}

impl TicketIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a ticket under `id`, replacing any previous entry.
    ///
    /// Returns the replaced ticket, if there was one.
    pub fn put(&mut self, id: TicketId, ticket: Ticket) -> Option<Ticket> {
        self.tickets.insert(id, ticket)
    }

    /// Ticket for `id`.
    pub fn get(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.get(&id)
    }

    /// Mutable ticket for `id`.
    pub fn get_mut(&mut self, id: TicketId) -> Option<&mut Ticket> {
        self.tickets.get_mut(&id)
    }

    /// Removes and returns the ticket for `id`. No-op if absent.
    pub fn remove(&mut self, id: TicketId) -> Option<Ticket> {
        self.tickets.remove(&id)
    }

    /// Whether `id` is present.
    pub fn contains(&self, id: TicketId) -> bool {
        self.tickets.contains_key(&id)
    }

    /// Number of stored tickets.
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}
