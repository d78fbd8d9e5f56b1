//! Ticket model.
//!
//! A ticket is one client's request at the counter: who, what procedure,
//! how long it should take, and the turn it is scheduled for. Identity
//! fields are fixed at registration; the engine rewrites the scheduling
//! fields (turn on delay, server on redistribution).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::time::minutes_to_hhmm;
use super::ProcedureType;

/// Ticket identifier.
pub type TicketId = u64;

/// Server identifier.
pub type ServerId = String;

/// A queued client request.
///
/// # Time Representation
/// `scheduled_turn` is in integer minutes since midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique ticket identifier.
    pub id: TicketId,
    /// Client display name (not unique).
    pub name: String,
    /// Requested procedure.
    pub procedure_type: ProcedureType,
    /// Estimated service time (minutes, positive).
    pub estimated_duration: i64,
    /// Scheduled turn (minutes). Dispatch order key.
    pub scheduled_turn: i64,
    /// Turn assigned at registration, before any delay penalty.
    pub registered_turn: i64,
    /// Documents the client brought, in the order they were added.
    pub documents: Vec<String>,
    /// Server currently responsible for this ticket.
    pub assigned_server: ServerId,
}

impl Ticket {
    /// Scheduled turn rendered as `HH:MM`.
    pub fn turn_hhmm(&self) -> String {
        minutes_to_hhmm(self.scheduled_turn)
    }

    /// Minutes this ticket has been pushed back by delay penalties.
    pub fn accumulated_delay(&self) -> i64 {
        self.scheduled_turn.saturating_sub(self.registered_turn)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Turn {} | #{} | {} | {} | window {}",
            self.turn_hhmm(),
            self.id,
            self.name,
            self.procedure_type.code().to_ascii_uppercase(),
            self.assigned_server
        )
    }
}

/// Registration input.
///
/// The duration defaults to the procedure's standard duration; turn and
/// id are assigned by the engine unless supplied.
///
/// # Example
/// ```
/// use turnstile_dispatch::models::{ProcedureType, TicketRequest};
///
/// let req = TicketRequest::new("Ana", ProcedureType::Complex)
///     .with_turn(540)
///     .with_document("INE");
/// assert_eq!(req.estimated_duration, 20);
/// assert_eq!(req.requested_turn, Some(540));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRequest {
    /// Client display name.
    pub name: String,
    /// Requested procedure.
    pub procedure_type: ProcedureType,
    /// Estimated service time (minutes).
    pub estimated_duration: i64,
    /// Explicit turn. `None` = append after the server's last ticket.
    pub requested_turn: Option<i64>,
    /// Caller-supplied id. `None` = allocate from the engine counter.
    pub external_id: Option<TicketId>,
    /// Documents presented at registration.
    pub documents: Vec<String>,
}

impl TicketRequest {
    /// Creates a request with the procedure's standard duration.
    pub fn new(name: impl Into<String>, procedure_type: ProcedureType) -> Self {
        Self {
            name: name.into(),
            procedure_type,
            estimated_duration: procedure_type.standard_duration(),
            requested_turn: None,
            external_id: None,
            documents: Vec::new(),
        }
    }

    /// Sets the estimated duration (minutes).
    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.estimated_duration = minutes;
        self
    }

    /// Requests an explicit turn (minutes).
    pub fn with_turn(mut self, turn: i64) -> Self {
        self.requested_turn = Some(turn);
        self
    }

    /// Supplies an external ticket id.
    pub fn with_external_id(mut self, id: TicketId) -> Self {
        self.external_id = Some(id);
        self
    }

    /// Adds one document.
    pub fn with_document(mut self, name: impl Into<String>) -> Self {
        self.documents.push(name.into());
        self
    }

    /// Adds several documents.
    pub fn with_documents<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documents.extend(names.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ticket {
        Ticket {
            id: 1000,
            name: "Luis".into(),
            procedure_type: ProcedureType::Simple,
            estimated_duration: 10,
            scheduled_turn: 545,
            registered_turn: 535,
            documents: vec!["CURP".into()],
            assigned_server: "v2".into(),
        }
    }

    #[test]
    fn test_ticket_display() {
        assert_eq!(
            sample().to_string(),
            "Turn 09:05 | #1000 | Luis | SIMPLE | window v2"
        );
    }

    #[test]
    fn test_accumulated_delay() {
        assert_eq!(sample().accumulated_delay(), 10);
    }

    #[test]
    fn test_request_builder() {
        let req = TicketRequest::new("Eva", ProcedureType::Payment)
            .with_duration(7)
            .with_external_id(42)
            .with_documents(["Acta", "RFC"])
            .with_document("INE");

        assert_eq!(req.estimated_duration, 7);
        assert_eq!(req.external_id, Some(42));
        assert_eq!(req.requested_turn, None);
        assert_eq!(req.documents, vec!["Acta", "RFC", "INE"]);
    }
}
