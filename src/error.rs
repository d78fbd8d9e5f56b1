//! Error types for the dispatch engine.
//!
//! Every error here is recoverable: the engine reports it and keeps its
//! state intact. Delays and deactivations are not errors; they surface in
//! [`DispatchOutcome`](crate::dispatching::DispatchOutcome).

use thiserror::Error;

use crate::models::TicketId;

/// Errors returned by [`DispatchEngine`](crate::dispatching::DispatchEngine) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The procedure type code is not recognized.
    #[error("unrecognized procedure type: {0:?}")]
    InvalidType(String),

    /// Estimated service time must be a positive number of minutes.
    #[error("estimated duration must be positive, got {0} minutes")]
    InvalidDuration(i64),

    /// No active server can take the work. Requires operator intervention.
    #[error("no active server available")]
    NoActiveServer,

    /// The server id does not exist in the pool.
    #[error("unknown server: {0}")]
    UnknownServer(String),

    /// A server with this id is already registered.
    #[error("server already exists: {0}")]
    DuplicateServer(String),

    /// A queued ticket already uses this id.
    #[error("ticket id already in use: {0}")]
    DuplicateTicket(TicketId),

    /// No queued ticket has this id.
    #[error("unknown ticket: {0}")]
    UnknownTicket(TicketId),

    /// A turn or service time would leave the `i64` minute range at this
    /// server. Nothing was changed.
    #[error("turn arithmetic overflow at server {0}")]
    TurnOverflow(String),

    /// Every automatic ticket id has been handed out.
    #[error("ticket id space exhausted")]
    TicketIdsExhausted,

    /// The configuration failed to parse or validate.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors from `HH:MM` time parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// Input is not exactly two colon-separated numeric parts.
    #[error("malformed time {0:?}, expected HH:MM")]
    InvalidFormat(String),

    /// Hours outside `[0, 24)` or minutes outside `[0, 60)`.
    #[error("time out of range: {hours:02}:{minutes:02}")]
    OutOfRange {
        /// Parsed hour component (saturated at `u64::MAX`).
        hours: u64,
        /// Parsed minute component (saturated at `u64::MAX`).
        minutes: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DispatchError::UnknownServer("v9".into()).to_string(),
            "unknown server: v9"
        );
        assert_eq!(
            DispatchError::NoActiveServer.to_string(),
            "no active server available"
        );
        assert_eq!(
            TimeError::OutOfRange {
                hours: 24,
                minutes: 5
            }
            .to_string(),
            "time out of range: 24:05"
        );
    }
}
