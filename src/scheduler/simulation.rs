//! Serve-everything loop.
//!
//! # Algorithm
//!
//! 1. Pick the server whose next ticket has the earliest turn (ties go to
//!    the earliest registered server).
//! 2. Dispatch it and record the outcome.
//! 3. Repeat until every queue is empty or the step limit is hit.
//!
//! Delays shift later turns and may deactivate servers mid-run; the loop
//! re-reads the engine state every step, so redistributed tickets are
//! served at their new windows.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dispatching::{DispatchEngine, DispatchOutcome};
use crate::error::DispatchError;

/// Outcomes of one [`ServiceRun`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLog {
    /// Every dispatch that served a ticket, in order.
    pub outcomes: Vec<DispatchOutcome>,
    /// Whether the run stopped at the step limit with tickets still queued.
    pub exhausted: bool,
}

impl ServiceLog {
    /// Number of served tickets.
    pub fn served(&self) -> usize {
        self.outcomes.len()
    }
}

/// Dispatches queued tickets across all servers in turn order.
///
/// # Example
/// ```
/// use turnstile_dispatch::DispatchEngine;
/// use turnstile_dispatch::models::{ProcedureType, TicketRequest};
/// use turnstile_dispatch::scheduler::ServiceRun;
///
/// let mut engine = DispatchEngine::standard_office();
/// engine.register(TicketRequest::new("a", ProcedureType::Payment).with_turn(5)).unwrap();
/// engine.register(TicketRequest::new("b", ProcedureType::BasicDocument).with_turn(1)).unwrap();
///
/// let log = ServiceRun::new().run(&mut engine).unwrap();
/// let names: Vec<_> = log.outcomes.iter().filter_map(|o| o.ticket.as_ref()).map(|t| t.name.as_str()).collect();
/// assert_eq!(names, vec!["b", "a"]);
/// assert!(engine.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ServiceRun {
    max_steps: usize,
}

impl ServiceRun {
    /// Creates a run with a 10 000-step limit.
    pub fn new() -> Self {
        Self { max_steps: 10_000 }
    }

    /// Sets the step limit.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Serves until all queues are empty or the step limit is reached.
    pub fn run(&self, engine: &mut DispatchEngine) -> Result<ServiceLog, DispatchError> {
        let mut log = ServiceLog::default();

        for _ in 0..self.max_steps {
            let Some((server_id, turn)) = engine.next_due() else {
                debug!(served = log.served(), "all queues empty");
                return Ok(log);
            };
            let server_id = server_id.clone();
            debug!(server = %server_id, turn, "dispatching");

            let outcome = engine.dispatch_next(&server_id)?;
            if outcome.served() {
                log.outcomes.push(outcome);
            }
        }

        log.exhausted = !engine.is_empty();
        if log.exhausted {
            warn!(
                max_steps = self.max_steps,
                remaining = engine.len(),
                "service run hit step limit"
            );
        }
        Ok(log)
    }
}

impl Default for ServiceRun {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProcedureType, TicketRequest};

    /// Set `RUST_LOG=turnstile_dispatch=debug` to see the dispatch trace.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_run_serves_in_global_turn_order() {
        init_tracing();
        let mut engine = DispatchEngine::standard_office();
        engine
            .register(TicketRequest::new("p", ProcedureType::Payment).with_turn(3))
            .unwrap();
        engine
            .register(TicketRequest::new("d1", ProcedureType::BasicDocument).with_turn(0))
            .unwrap();
        engine
            .register(TicketRequest::new("d2", ProcedureType::BasicDocument).with_turn(3))
            .unwrap();

        let log = ServiceRun::new().run(&mut engine).unwrap();
        let names: Vec<&str> = log
            .outcomes
            .iter()
            .filter_map(|o| o.ticket.as_ref())
            .map(|t| t.name.as_str())
            .collect();
        // Equal turns: v1 is registered before v4.
        assert_eq!(names, vec!["d1", "d2", "p"]);
        assert!(!log.exhausted);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_run_survives_deactivation() {
        init_tracing();
        let mut engine = DispatchEngine::standard_office();
        for i in 0..8 {
            engine
                .register(TicketRequest::new(format!("s{i}"), ProcedureType::Simple))
                .unwrap();
        }

        let log = ServiceRun::new().run(&mut engine).unwrap();
        assert_eq!(log.served(), 8);
        assert!(log.outcomes.iter().any(|o| o.server_deactivated));
        assert!(!engine.server("v2").unwrap().active);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_step_limit() {
        let mut engine = DispatchEngine::standard_office();
        for i in 0..5 {
            engine
                .register(TicketRequest::new(format!("d{i}"), ProcedureType::BasicDocument))
                .unwrap();
        }
        let log = ServiceRun::new().with_max_steps(2).run(&mut engine).unwrap();
        assert_eq!(log.served(), 2);
        assert!(log.exhausted);
        assert_eq!(engine.len(), 3);
    }

    #[test]
    fn test_run_on_empty_engine() {
        let mut engine = DispatchEngine::standard_office();
        let log = ServiceRun::new().run(&mut engine).unwrap();
        assert_eq!(log, ServiceLog::default());
    }
}
