//! Thread-safe engine handle.
//!
//! One `RwLock` guards the whole engine. Mutations hold the write lock for
//! their full duration, so readers never see a partially shifted queue or a
//! half-finished redistribution. Reads return owned copies so no lock
//! outlives the call.

use parking_lot::RwLock;
use std::sync::Arc;

use super::{DispatchEngine, DispatchOutcome, RedistributionReport};
use crate::error::DispatchError;
use crate::models::{ProcedureType, Server, Ticket, TicketId, TicketRequest};

/// Cloneable, shareable handle to a [`DispatchEngine`].
///
/// # Example
/// ```
/// use turnstile_dispatch::dispatching::SharedDispatchEngine;
/// use turnstile_dispatch::models::{ProcedureType, TicketRequest};
/// use turnstile_dispatch::DispatchEngine;
///
/// let shared = SharedDispatchEngine::new(DispatchEngine::standard_office());
/// let handle = shared.clone();
/// let t = handle.register(TicketRequest::new("Ana", ProcedureType::Payment)).unwrap();
/// assert_eq!(shared.lookup_by_id(t.id).map(|t| t.name), Some("Ana".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct SharedDispatchEngine {
    inner: Arc<RwLock<DispatchEngine>>,
}

impl SharedDispatchEngine {
    /// Wraps an engine.
    pub fn new(engine: DispatchEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    /// See [`DispatchEngine::register`].
    pub fn register(&self, request: TicketRequest) -> Result<Ticket, DispatchError> {
        self.inner.write().register(request)
    }

    /// See [`DispatchEngine::dispatch_next`].
    pub fn dispatch_next(&self, server_id: &str) -> Result<DispatchOutcome, DispatchError> {
        self.inner.write().dispatch_next(server_id)
    }

    /// See [`DispatchEngine::add_server`].
    pub fn add_server<I>(&self, id: &str, procedure_types: I) -> Result<(), DispatchError>
    where
        I: IntoIterator<Item = ProcedureType>,
    {
        self.inner.write().add_server(id, procedure_types)
    }

    /// See [`DispatchEngine::reactivate_server`].
    pub fn reactivate_server(&self, server_id: &str) -> Result<(), DispatchError> {
        self.inner.write().reactivate_server(server_id)
    }

    /// See [`DispatchEngine::redistribute`].
    pub fn redistribute(&self, server_id: &str) -> Result<RedistributionReport, DispatchError> {
        self.inner.write().redistribute(server_id)
    }

    /// Copy of a queued ticket.
    pub fn lookup_by_id(&self, id: TicketId) -> Option<Ticket> {
        self.inner.read().lookup_by_id(id).cloned()
    }

    /// Copy of the first queued ticket with this turn.
    pub fn lookup_by_turn(&self, turn: i64) -> Option<Ticket> {
        self.inner.read().lookup_by_turn(turn).cloned()
    }

    /// Copy of a server's current state.
    pub fn server(&self, id: &str) -> Option<Server> {
        self.inner.read().server(id).cloned()
    }

    /// Consistent copy of every queued ticket, in snapshot order.
    pub fn snapshot(&self) -> Vec<Ticket> {
        self.inner.read().snapshot().cloned().collect()
    }

    /// Runs `f` with exclusive access, as one atomic step.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut DispatchEngine) -> R) -> R {
        f(&mut self.inner.write())
    }
}
