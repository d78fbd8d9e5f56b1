//! Ticket dispatch engine for a multi-window service counter.
//!
//! Clients register with a procedure type and receive a scheduled turn at
//! the window that handles that type. Each window serves its queue in turn
//! order. Services that overrun the delay threshold push later turns back,
//! and a window that overruns too often is taken out of service with its
//! queue moved to the least-loaded active windows.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ProcedureType`, `Ticket`, `TicketRequest`,
//!   `Server`, and `HH:MM` time helpers
//! - **`dispatching`**: `DispatchEngine` (registration, dispatch, delay
//!   handling, redistribution, queries) and its thread-safe handle
//! - **`scheduler`**: Whole-day service runs, KPIs, and workload generation
//! - **`validation`**: Document checklist and server pool checks
//! - **`config`**: Delay policy and ticket numbering
//! - **`error`**: Error types
//!
//! # Example
//!
//! ```
//! use turnstile_dispatch::DispatchEngine;
//!
//! let mut engine = DispatchEngine::standard_office();
//! let ticket = engine.register_ticket("Ana", "simple", 10, Some(540), None).unwrap();
//! assert_eq!(ticket.assigned_server, "v2");
//! assert_eq!(ticket.turn_hhmm(), "09:00");
//!
//! let outcome = engine.dispatch_next("v2").unwrap();
//! assert_eq!(outcome.ticket.map(|t| t.name), Some("Ana".to_string()));
//! ```

pub mod config;
pub mod dispatching;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use config::DispatchConfig;
pub use dispatching::DispatchEngine;
pub use error::{DispatchError, TimeError};
