//! Service counter domain models.
//!
//! Provides the data types the dispatch engine schedules: tickets,
//! servers (service windows), procedure types, and the minute-based
//! turn time helpers.
//!
//! # Domain Mappings
//!
//! | turnstile-dispatch | Government office | Clinic | Bank branch |
//! |--------------------|-------------------|--------|-------------|
//! | Ticket | Citizen request | Patient visit | Customer |
//! | Server | Window / receptor | Consulting room | Teller |
//! | ProcedureType | Procedure | Specialty | Operation |
//! | Turn | Appointment slot | Slot | Queue number time |

mod procedure;
mod server;
mod ticket;
pub mod time;

pub use procedure::ProcedureType;
pub use server::Server;
pub use ticket::{ServerId, Ticket, TicketId, TicketRequest};
pub use time::{hhmm_to_minutes, minutes_to_hhmm};
