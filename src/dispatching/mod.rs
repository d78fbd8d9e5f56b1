//! Turn scheduling and dispatch.
//!
//! Provides the turn-ordered queue, the ticket index and the
//! [`DispatchEngine`] that ties them to the server pool.
//!
//! # Usage
//!
//! ```
//! use turnstile_dispatch::dispatching::DispatchEngine;
//! use turnstile_dispatch::models::{ProcedureType, TicketRequest};
//!
//! let mut engine = DispatchEngine::standard_office();
//! for turn in [0, 10, 20] {
//!     engine
//!         .register(TicketRequest::new("c", ProcedureType::Simple).with_duration(6).with_turn(turn))
//!         .unwrap();
//! }
//!
//! // A 6-minute service exceeds the 5-minute threshold: the rest of the
//! // window's queue moves back 5 minutes.
//! let outcome = engine.dispatch_next("v2").unwrap();
//! assert_eq!(outcome.delay_minutes, 5);
//! let turns: Vec<i64> = engine.snapshot().map(|t| t.scheduled_turn).collect();
//! assert_eq!(turns, vec![15, 25]);
//! ```

mod engine;
mod index;
mod queue;
mod shared;

pub use engine::{DispatchEngine, DispatchOutcome, MovedTicket, RedistributionReport};
pub use index::TicketIndex;
pub use queue::{TurnIter, TurnQueue};
pub use shared::SharedDispatchEngine;
