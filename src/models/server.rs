//! Server (service window) model.
//!
//! A server handles a fixed set of procedure types, tracks when it will be
//! free again, and counts delay events. Servers are never removed from the
//! pool; they are deactivated and may be reactivated by an operator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{ProcedureType, ServerId};

/// A service window ("receptor").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Unique, stable server identifier.
    pub id: ServerId,
    /// Human-readable label.
    pub name: String,
    /// Procedure types this server handles.
    pub procedure_types: BTreeSet<ProcedureType>,
    /// No new service may start before this time (minutes).
    pub busy_until: i64,
    /// Delay events since the last reset.
    pub consecutive_delays: u32,
    /// Whether the server accepts new tickets.
    pub active: bool,
}

impl Server {
    /// Creates an active, idle server.
    pub fn new(id: impl Into<ServerId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            procedure_types: BTreeSet::new(),
            busy_until: 0,
            consecutive_delays: 0,
            active: true,
        }
    }

    /// Sets the display label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a handled procedure type.
    pub fn with_procedure(mut self, procedure_type: ProcedureType) -> Self {
        self.procedure_types.insert(procedure_type);
        self
    }

    /// Adds several handled procedure types.
    pub fn with_procedures<I>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = ProcedureType>,
    {
        self.procedure_types.extend(types);
        self
    }

    /// Whether this server handles the procedure type.
    pub fn handles(&self, procedure_type: ProcedureType) -> bool {
        self.procedure_types.contains(&procedure_type)
    }

    /// Whether the server is free to start work at `time`.
    #[inline]
    pub fn is_free_at(&self, time: i64) -> bool {
        self.busy_until <= time
    }
}
