//! Dispatch engine.
//!
//! Owns the server pool, the capability map, one turn-ordered queue per
//! server and the ticket index. Every mutation runs to completion inside a
//! single `&mut self` call, so a turn shift or a redistribution is never
//! observable half-done.
//!
//! # Algorithm
//!
//! Registration resolves a server through the capability map, falling back
//! to the first active server (and remembering that fallback). Dispatch pops
//! the lowest turn at one server; a ticket whose estimate exceeds the delay
//! threshold pushes every remaining turn at that server back by the penalty
//! and counts against the server. Past the tolerance the server is
//! deactivated and its queue is spread over the least-loaded active servers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::iter::Peekable;
use tracing::{debug, info, warn};

use super::{TicketIndex, TurnIter, TurnQueue};
use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::models::{ProcedureType, Server, ServerId, Ticket, TicketId, TicketRequest};

/// Result of one [`DispatchEngine::dispatch_next`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Server that was asked to dispatch.
    pub server_id: ServerId,
    /// Served ticket. `None` = the server's queue was empty.
    pub ticket: Option<Ticket>,
    /// Delay charged for this service (0 when on time).
    pub delay_minutes: i64,
    /// When service actually started (minutes).
    pub started_at: Option<i64>,
    /// Whether this dispatch pushed the server past its delay tolerance.
    pub server_deactivated: bool,
    /// Redistribution triggered by the deactivation, if any.
    pub redistribution: Option<RedistributionReport>,
}

impl DispatchOutcome {
    fn idle(server_id: ServerId) -> Self {
        Self {
            server_id,
            ticket: None,
            delay_minutes: 0,
            started_at: None,
            server_deactivated: false,
            redistribution: None,
        }
    }

    /// Whether a ticket was served.
    pub fn served(&self) -> bool {
        self.ticket.is_some()
    }

    /// Whether this service was a delay event.
    pub fn delayed(&self) -> bool {
        self.delay_minutes > 0
    }
}

/// One ticket moved by a redistribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedTicket {
    /// Moved ticket.
    pub ticket_id: TicketId,
    /// Server that now holds it.
    pub to: ServerId,
}

/// Outcome of moving a server's queue to its peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedistributionReport {
    /// Server whose queue was emptied.
    pub source: ServerId,
    /// Tickets moved, in the source's turn order.
    pub moved: Vec<MovedTicket>,
    /// Tickets left in place because no active server existed.
    pub stranded: usize,
}

impl RedistributionReport {
    /// Whether every ticket found a new server.
    pub fn is_complete(&self) -> bool {
        self.stranded == 0
    }
}

#[derive(Debug, Clone)]
struct ServerSlot {
    server: Server,
    queue: TurnQueue<TicketId>,
}

/// The turn scheduling and dispatch engine.
///
/// # Example
/// ```
/// use turnstile_dispatch::DispatchEngine;
/// use turnstile_dispatch::models::{ProcedureType, TicketRequest};
///
/// let mut engine = DispatchEngine::standard_office();
/// let ticket = engine
///     .register(TicketRequest::new("Ana", ProcedureType::BasicDocument))
///     .unwrap();
/// assert_eq!(ticket.assigned_server, "v1");
/// assert_eq!(ticket.id, 1000);
///
/// let outcome = engine.dispatch_next("v1").unwrap();
/// assert_eq!(outcome.ticket.map(|t| t.name), Some("Ana".to_string()));
/// assert_eq!(outcome.delay_minutes, 0);
/// ```
#[derive(Debug, Clone)]
pub struct DispatchEngine {
    config: DispatchConfig,
    slots: Vec<ServerSlot>,
    positions: HashMap<ServerId, usize>,
    capabilities: HashMap<ProcedureType, ServerId>,
    index: TicketIndex,
    /// `None` once the counter has passed `TicketId::MAX`.
    next_ticket_id: Option<TicketId>,
}

impl DispatchEngine {
    /// Creates an engine with default policy and no servers.
    pub fn new() -> Self {
        Self::with_config(DispatchConfig::default())
    }

    /// Creates an engine with the given policy and no servers.
    pub fn with_config(config: DispatchConfig) -> Self {
        Self {
            next_ticket_id: Some(config.first_ticket_id),
            config,
            slots: Vec::new(),
            positions: HashMap::new(),
            capabilities: HashMap::new(),
            index: TicketIndex::new(),
        }
    }

    /// Four-window office: `v1` basic documents, `v2` simple procedures,
    /// `v3` complex procedures, `v4` payments.
    pub fn standard_office() -> Self {
        let mut engine = Self::new();
        for server in standard_windows() {
            engine.insert_server(server);
        }
        engine
    }

    /// Active policy.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    // ======================== Server pool ========================

    /// Adds a server handling the given procedure types.
    pub fn add_server<I>(
        &mut self,
        id: impl Into<ServerId>,
        procedure_types: I,
    ) -> Result<(), DispatchError>
    where
        I: IntoIterator<Item = ProcedureType>,
    {
        self.register_server(Server::new(id).with_procedures(procedure_types))
    }

    /// Adds a fully specified server.
    ///
    /// Each procedure type the server handles is mapped to it unless an
    /// active server already covers that type.
    pub fn register_server(&mut self, server: Server) -> Result<(), DispatchError> {
        if self.positions.contains_key(&server.id) {
            return Err(DispatchError::DuplicateServer(server.id));
        }
        self.insert_server(server);
        Ok(())
    }

    fn insert_server(&mut self, server: Server) {
        for &ty in &server.procedure_types {
            let covered = self
                .capabilities
                .get(&ty)
                .and_then(|id| self.server(id))
                .is_some_and(|s| s.active);
            if !covered {
                self.capabilities.insert(ty, server.id.clone());
            }
        }
        debug!(server = %server.id, types = server.procedure_types.len(), "server added");
        self.positions.insert(server.id.clone(), self.slots.len());
        self.slots.push(ServerSlot {
            server,
            queue: TurnQueue::new(),
        });
    }

    /// Server by id.
    pub fn server(&self, id: &str) -> Option<&Server> {
        self.positions.get(id).map(|&pos| &self.slots[pos].server)
    }

    /// All servers, in registration order.
    pub fn servers(&self) -> impl Iterator<Item = &Server> + '_ {
        self.slots.iter().map(|slot| &slot.server)
    }

    /// Server currently mapped to a procedure type.
    pub fn capability(&self, procedure_type: ProcedureType) -> Option<&ServerId> {
        self.capabilities.get(&procedure_type)
    }

    /// Number of tickets queued at a server.
    pub fn queue_len(&self, server_id: &str) -> Result<usize, DispatchError> {
        let pos = self.position(server_id)?;
        Ok(self.slots[pos].queue.len())
    }

    /// Puts a server back into service and clears its delay counter.
    pub fn reactivate_server(&mut self, server_id: &str) -> Result<(), DispatchError> {
        let pos = self.position(server_id)?;
        let server = &mut self.slots[pos].server;
        server.active = true;
        server.consecutive_delays = 0;
        info!(server = %server.id, "server reactivated");
        Ok(())
    }

    /// Takes a server out of service and moves its queue to active peers.
    ///
    /// The server is deactivated even when no peer can take its tickets;
    /// check [`RedistributionReport::stranded`] and retry with
    /// [`redistribute`](Self::redistribute) once a server is available.
    pub fn deactivate_server(
        &mut self,
        server_id: &str,
    ) -> Result<RedistributionReport, DispatchError> {
        let pos = self.position(server_id)?;
        self.deactivate(pos);
        Ok(self.redistribute_from(pos))
    }

    /// Moves every ticket queued at `server_id` to the least-loaded active
    /// servers other than itself.
    ///
    /// # Errors
    /// [`DispatchError::NoActiveServer`] if tickets are queued and no other
    /// active server exists; the queue is left untouched.
    pub fn redistribute(
        &mut self,
        server_id: &str,
    ) -> Result<RedistributionReport, DispatchError> {
        let pos = self.position(server_id)?;
        let report = self.redistribute_from(pos);
        if report.is_complete() {
            Ok(report)
        } else {
            Err(DispatchError::NoActiveServer)
        }
    }

    // ======================== Registration ========================

    /// Registers a ticket from a procedure type code.
    ///
    /// `requested_turn` is used verbatim when present; otherwise the ticket
    /// is appended after the target server's last turn.
    ///
    /// # Errors
    /// `InvalidType`, `InvalidDuration`, `DuplicateTicket`, `NoActiveServer`,
    /// `TurnOverflow`, `TicketIdsExhausted`.
    pub fn register_ticket(
        &mut self,
        name: &str,
        procedure_type: &str,
        estimated_duration: i64,
        requested_turn: Option<i64>,
        external_id: Option<TicketId>,
    ) -> Result<Ticket, DispatchError> {
        let procedure_type: ProcedureType = procedure_type.parse()?;
        let mut request =
            TicketRequest::new(name, procedure_type).with_duration(estimated_duration);
        request.requested_turn = requested_turn;
        request.external_id = external_id;
        self.register(request)
    }

    /// Registers a ticket.
    ///
    /// On error nothing changes: no id is consumed and the capability map
    /// is not rewired.
    pub fn register(&mut self, request: TicketRequest) -> Result<Ticket, DispatchError> {
        if request.estimated_duration <= 0 {
            return Err(DispatchError::InvalidDuration(request.estimated_duration));
        }
        let id = match request.external_id {
            Some(id) if self.index.contains(id) => {
                return Err(DispatchError::DuplicateTicket(id));
            }
            Some(id) => id,
            None => self
                .next_ticket_id
                .ok_or(DispatchError::TicketIdsExhausted)?,
        };

        let (pos, fallback) = self.resolve_server(request.procedure_type)?;
        let slot = &self.slots[pos];
        let scheduled_turn = match (request.requested_turn, slot.queue.peek_tail()) {
            (Some(turn), _) => turn,
            (None, Some((tail_turn, _))) => tail_turn
                .checked_add(request.estimated_duration)
                .ok_or_else(|| DispatchError::TurnOverflow(slot.server.id.clone()))?,
            (None, None) => 0,
        };

        if fallback {
            let server_id = slot.server.id.clone();
            info!(
                procedure = %request.procedure_type,
                server = %server_id,
                "capability remapped to fallback server"
            );
            self.capabilities.insert(request.procedure_type, server_id);
        }
        self.next_ticket_id = match (self.next_ticket_id, id.checked_add(1)) {
            (Some(next), Some(after)) => Some(next.max(after)),
            _ => None,
        };

        let slot = &mut self.slots[pos];
        let ticket = Ticket {
            id,
            name: request.name,
            procedure_type: request.procedure_type,
            estimated_duration: request.estimated_duration,
            scheduled_turn,
            registered_turn: scheduled_turn,
            documents: request.documents,
            assigned_server: slot.server.id.clone(),
        };

        slot.queue.insert(scheduled_turn, id);
        self.index.put(id, ticket.clone());

        debug!(
            ticket_id = id,
            server = %ticket.assigned_server,
            turn = scheduled_turn,
            "ticket registered"
        );
        Ok(ticket)
    }

    /// Mapped server if active, else the first active server. The flag is
    /// set when the fallback should become the mapping for this type.
    fn resolve_server(
        &self,
        procedure_type: ProcedureType,
    ) -> Result<(usize, bool), DispatchError> {
        let mapped = self
            .capabilities
            .get(&procedure_type)
            .and_then(|id| self.positions.get(id).copied())
            .filter(|&pos| self.slots[pos].server.active);
        if let Some(pos) = mapped {
            return Ok((pos, false));
        }

        self.slots
            .iter()
            .position(|slot| slot.server.active)
            .map(|pos| (pos, true))
            .ok_or(DispatchError::NoActiveServer)
    }

    /// Appends a document to a queued ticket.
    pub fn attach_document(
        &mut self,
        ticket_id: TicketId,
        document: impl Into<String>,
    ) -> Result<&Ticket, DispatchError> {
        let ticket = self
            .index
            .get_mut(ticket_id)
            .ok_or(DispatchError::UnknownTicket(ticket_id))?;
        ticket.documents.push(document.into());
        Ok(ticket)
    }

    // ======================== Dispatch ========================

    /// Serves the lowest-turn ticket queued at `server_id`.
    ///
    /// An empty queue is not an error: the outcome carries no ticket and
    /// zero delay.
    ///
    /// # Errors
    /// `UnknownServer`, or `TurnOverflow` when the service end or the
    /// delay shift would leave the minute range; the ticket stays queued.
    pub fn dispatch_next(&mut self, server_id: &str) -> Result<DispatchOutcome, DispatchError> {
        let pos = self.position(server_id)?;
        let slot = &self.slots[pos];

        let Some((_, &ticket_id)) = slot.queue.peek_min() else {
            return Ok(DispatchOutcome::idle(slot.server.id.clone()));
        };
        let head = self
            .index
            .get(ticket_id)
            .ok_or(DispatchError::UnknownTicket(ticket_id))?;

        let server = &slot.server;
        let started_at = if server.is_free_at(head.scheduled_turn) {
            head.scheduled_turn
        } else {
            server.busy_until
        };
        let busy_until = started_at
            .checked_add(head.estimated_duration)
            .ok_or_else(|| DispatchError::TurnOverflow(server.id.clone()))?;
        let delayed = head.estimated_duration > self.config.delay_threshold_minutes;
        let penalty = self.config.delay_penalty_minutes;
        if delayed && !slot.queue.shift_fits(1, penalty) {
            return Err(DispatchError::TurnOverflow(server.id.clone()));
        }

        let ticket = self
            .index
            .remove(ticket_id)
            .ok_or(DispatchError::UnknownTicket(ticket_id))?;
        let slot = &mut self.slots[pos];
        slot.queue.pop_min();
        slot.server.busy_until = busy_until;

        let mut outcome = DispatchOutcome {
            server_id: slot.server.id.clone(),
            ticket: None,
            delay_minutes: 0,
            started_at: Some(started_at),
            server_deactivated: false,
            redistribution: None,
        };

        if delayed {
            outcome.delay_minutes = penalty;
            let shifted = self.shift_turns(pos, penalty);
            debug_assert!(shifted, "shift range checked before pop");

            // Stranded tickets drained at an inactive server do not count.
            let server = &mut self.slots[pos].server;
            if server.active {
                server.consecutive_delays = server.consecutive_delays.saturating_add(1);
                info!(
                    ticket_id,
                    server = %server.id,
                    delays = server.consecutive_delays,
                    penalty,
                    "delay event"
                );

                if server.consecutive_delays > self.config.delay_tolerance {
                    self.deactivate(pos);
                    outcome.server_deactivated = true;
                    outcome.redistribution = Some(self.redistribute_from(pos));
                }
            } else {
                info!(ticket_id, server = %server.id, penalty, "delay event at inactive server");
            }
        } else {
            debug!(
                ticket_id,
                server = %outcome.server_id,
                started_at,
                pushed_back = ticket.accumulated_delay(),
                "ticket served"
            );
        }

        outcome.ticket = Some(ticket);
        Ok(outcome)
    }

    fn deactivate(&mut self, pos: usize) {
        let server = &mut self.slots[pos].server;
        server.active = false;
        server.consecutive_delays = 0;
        info!(server = %server.id, "server deactivated");
    }

    /// Pushes every turn queued at `pos` back by `delta`, in the queue and
    /// in the index together. Nothing moves if any turn would overflow.
    fn shift_turns(&mut self, pos: usize, delta: i64) -> bool {
        let queue = &mut self.slots[pos].queue;
        if !queue.shift_all(delta) {
            warn!(server = %self.slots[pos].server.id, delta, "turn shift would overflow");
            return false;
        }
        for (_, &id) in queue.iter() {
            if let Some(ticket) = self.index.get_mut(id) {
                ticket.scheduled_turn = ticket.scheduled_turn.saturating_add(delta);
            }
        }
        true
    }

    fn redistribute_from(&mut self, source: usize) -> RedistributionReport {
        let source_id = self.slots[source].server.id.clone();
        let queued = self.slots[source].queue.len();
        let has_target = self
            .slots
            .iter()
            .enumerate()
            .any(|(pos, slot)| pos != source && slot.server.active);

        if queued > 0 && !has_target {
            warn!(
                server = %source_id,
                stranded = queued,
                "no active server to take queued tickets"
            );
            return RedistributionReport {
                source: source_id,
                moved: Vec::new(),
                stranded: queued,
            };
        }

        let mut moved = Vec::with_capacity(queued);
        while let Some(target) = self.least_loaded_active(source) {
            let Some((turn, id)) = self.slots[source].queue.pop_min() else {
                break;
            };
            let to = self.slots[target].server.id.clone();
            if let Some(ticket) = self.index.get_mut(id) {
                ticket.assigned_server = to.clone();
            }
            self.slots[target].queue.insert(turn, id);
            moved.push(MovedTicket { ticket_id: id, to });
        }

        if !moved.is_empty() {
            info!(server = %source_id, moved = moved.len(), "queue redistributed");
        }
        RedistributionReport {
            source: source_id,
            moved,
            stranded: 0,
        }
    }

    /// Active server with the shortest queue, excluding `exclude`. Ties go
    /// to the earliest registered.
    fn least_loaded_active(&self, exclude: usize) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(pos, slot)| *pos != exclude && slot.server.active)
            .min_by_key(|(_, slot)| slot.queue.len())
            .map(|(pos, _)| pos)
    }

    // ======================== Queries ========================

    /// Queued ticket by id.
    pub fn lookup_by_id(&self, id: TicketId) -> Option<&Ticket> {
        self.index.get(id)
    }

    /// First queued ticket with exactly this turn, in snapshot order.
    pub fn lookup_by_turn(&self, turn: i64) -> Option<&Ticket> {
        self.slots.iter().find_map(|slot| {
            slot.queue
                .iter()
                .take_while(|(t, _)| *t <= turn)
                .find(|(t, _)| *t == turn)
                .and_then(|(_, &id)| self.index.get(id))
        })
    }

    /// Queued tickets with this display name, in snapshot order.
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Ticket> + 'a {
        self.snapshot().filter(move |t| t.name == name)
    }

    /// All queued tickets in non-decreasing turn order. Equal turns go by
    /// server registration order, then arrival. Lazy and restartable
    /// (`Clone`).
    pub fn snapshot(&self) -> impl Iterator<Item = &Ticket> + Clone + '_ {
        MergedQueues {
            heads: self
                .slots
                .iter()
                .map(|slot| slot.queue.iter().peekable())
                .collect(),
            index: &self.index,
        }
    }

    /// Server whose next ticket has the earliest turn, with that turn.
    /// Ties go to the earliest registered server.
    pub fn next_due(&self) -> Option<(&ServerId, i64)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.queue.peek_min().map(|(turn, _)| (&slot.server.id, turn)))
            .min_by_key(|&(_, turn)| turn)
    }

    /// Tickets queued at one server, in turn order.
    pub fn server_snapshot(&self, server_id: &str) -> Result<Vec<&Ticket>, DispatchError> {
        let pos = self.position(server_id)?;
        Ok(self.slots[pos]
            .queue
            .iter()
            .filter_map(|(_, &id)| self.index.get(id))
            .collect())
    }

    /// Total queued tickets across all servers.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no ticket is queued anywhere.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn position(&self, server_id: &str) -> Result<usize, DispatchError> {
        self.positions
            .get(server_id)
            .copied()
            .ok_or_else(|| DispatchError::UnknownServer(server_id.to_string()))
    }
}

impl Default for DispatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// K-way merge of the server queues on `(turn, registration order)`.
#[derive(Clone)]
struct MergedQueues<'a> {
    heads: Vec<Peekable<TurnIter<'a, TicketId>>>,
    index: &'a TicketIndex,
}

impl<'a> Iterator for MergedQueues<'a> {
    type Item = &'a Ticket;

    fn next(&mut self) -> Option<&'a Ticket> {
        loop {
            let (_, pos) = self
                .heads
                .iter_mut()
                .enumerate()
                .filter_map(|(pos, head)| head.peek().map(|&(turn, _)| (turn, pos)))
                .min()?;
            let (_, &id) = self.heads[pos].next()?;
            if let Some(ticket) = self.index.get(id) {
                return Some(ticket);
            }
        }
    }
}

fn standard_windows() -> [Server; 4] {
    [
        Server::new("v1")
            .with_name("Document delivery / review")
            .with_procedure(ProcedureType::BasicDocument),
        Server::new("v2")
            .with_name("Simple procedures")
            .with_procedure(ProcedureType::Simple),
        Server::new("v3")
            .with_name("Complex procedures")
            .with_procedure(ProcedureType::Complex),
        Server::new("v4")
            .with_name("Payments")
            .with_procedure(ProcedureType::Payment),
    ]
}
