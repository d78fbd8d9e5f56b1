//! Dispatch policy configuration.
//!
//! Every field has a default, so a partial JSON document is enough:
//!
//! ```
//! use turnstile_dispatch::DispatchConfig;
//!
//! let cfg = DispatchConfig::from_json(r#"{ "delay_tolerance": 2 }"#).unwrap();
//! assert_eq!(cfg.delay_tolerance, 2);
//! assert_eq!(cfg.delay_penalty_minutes, 5);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::models::TicketId;

/// Policy constants for the dispatch engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// A ticket longer than this (minutes) counts as a delay event.
    pub delay_threshold_minutes: i64,
    /// Minutes added to every remaining turn at a delayed server.
    pub delay_penalty_minutes: i64,
    /// Delay events tolerated; one more deactivates the server.
    pub delay_tolerance: u32,
    /// First id handed out by the ticket counter.
    pub first_ticket_id: TicketId,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            delay_threshold_minutes: 5,
            delay_penalty_minutes: 5,
            delay_tolerance: 3,
            first_ticket_id: 1000,
        }
    }
}

impl DispatchConfig {
    /// Sets the delay threshold.
    pub fn with_delay_threshold(mut self, minutes: i64) -> Self {
        self.delay_threshold_minutes = minutes;
        self
    }

    /// Sets the delay penalty.
    pub fn with_delay_penalty(mut self, minutes: i64) -> Self {
        self.delay_penalty_minutes = minutes;
        self
    }

    /// Sets the delay tolerance.
    pub fn with_delay_tolerance(mut self, events: u32) -> Self {
        self.delay_tolerance = events;
        self
    }

    /// Sets the first allocated ticket id.
    pub fn with_first_ticket_id(mut self, id: TicketId) -> Self {
        self.first_ticket_id = id;
        self
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, DispatchError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| DispatchError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks that thresholds and penalties are non-negative.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.delay_threshold_minutes < 0 {
            return Err(DispatchError::InvalidConfig(format!(
                "delay_threshold_minutes must be >= 0, got {}",
                self.delay_threshold_minutes
            )));
        }
        if self.delay_penalty_minutes < 0 {
            return Err(DispatchError::InvalidConfig(format!(
                "delay_penalty_minutes must be >= 0, got {}",
                self.delay_penalty_minutes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = DispatchConfig::default();
        assert_eq!(cfg.delay_threshold_minutes, 5);
        assert_eq!(cfg.delay_penalty_minutes, 5);
        assert_eq!(cfg.delay_tolerance, 3);
        assert_eq!(cfg.first_ticket_id, 1000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let cfg = DispatchConfig::default()
            .with_delay_threshold(8)
            .with_delay_penalty(10)
            .with_delay_tolerance(1)
            .with_first_ticket_id(1);
        assert_eq!(cfg.delay_threshold_minutes, 8);
        assert_eq!(cfg.delay_penalty_minutes, 10);
        assert_eq!(cfg.delay_tolerance, 1);
        assert_eq!(cfg.first_ticket_id, 1);
    }

    #[test]
    fn test_from_json_full_and_empty() {
        let cfg = DispatchConfig::from_json(
            r#"{"delay_threshold_minutes":6,"delay_penalty_minutes":2,"delay_tolerance":4,"first_ticket_id":1}"#,
        )
        .unwrap();
        assert_eq!(cfg.delay_threshold_minutes, 6);
        assert_eq!(cfg.first_ticket_id, 1);

        assert_eq!(DispatchConfig::from_json("{}").unwrap(), DispatchConfig::default());
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            DispatchConfig::from_json("not json"),
            Err(DispatchError::InvalidConfig(_))
        ));
        assert!(matches!(
            DispatchConfig::from_json(r#"{"delay_penalty_minutes":-1}"#),
            Err(DispatchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let cfg = DispatchConfig::default().with_delay_tolerance(7);
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(DispatchConfig::from_json(&json).unwrap(), cfg);
    }
}
