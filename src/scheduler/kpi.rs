//! Service quality metrics (KPIs).
//!
//! Computes counter-level indicators from a completed [`ServiceLog`].
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Served | Tickets dispatched |
//! | Delay events | Services longer than the delay threshold |
//! | Total delay | Sum of penalties charged |
//! | Deactivations | Servers taken out of service during the run |
//! | Avg wait | Mean of (service start − turn at registration) |
//! | Stranded | Tickets a redistribution could not place |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ServiceLog;
use crate::models::ServerId;

/// Service run indicators. Times are in minutes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceKpi {
    /// Tickets served.
    pub served: usize,
    /// Services that counted as delay events.
    pub delay_events: usize,
    /// Sum of delay penalties (minutes).
    pub total_delay_minutes: i64,
    /// Servers deactivated during the run.
    pub deactivations: usize,
    /// Mean wait between the registered turn and service start (minutes).
    /// Delay penalties count as waiting.
    pub avg_wait_minutes: f64,
    /// Longest single wait (minutes).
    pub max_wait_minutes: i64,
    /// Tickets left in place by failed redistributions.
    pub stranded: usize,
    /// Served tickets per server.
    pub served_by_server: BTreeMap<ServerId, usize>,
}

impl ServiceKpi {
    /// Computes KPIs from a service log.
    pub fn calculate(log: &ServiceLog) -> Self {
        let mut kpi = Self::default();
        let mut total_wait: i64 = 0;

        for outcome in &log.outcomes {
            let Some(ticket) = &outcome.ticket else {
                continue;
            };
            kpi.served += 1;
            *kpi
                .served_by_server
                .entry(outcome.server_id.clone())
                .or_insert(0) += 1;

            if outcome.delayed() {
                kpi.delay_events += 1;
                kpi.total_delay_minutes =
                    kpi.total_delay_minutes.saturating_add(outcome.delay_minutes);
            }
            if outcome.server_deactivated {
                kpi.deactivations += 1;
            }
            if let Some(report) = &outcome.redistribution {
                kpi.stranded += report.stranded;
            }

            if let Some(start) = outcome.started_at {
                let wait = start.saturating_sub(ticket.registered_turn).max(0);
                total_wait = total_wait.saturating_add(wait);
                kpi.max_wait_minutes = kpi.max_wait_minutes.max(wait);
            }
        }

        if kpi.served > 0 {
            kpi.avg_wait_minutes = total_wait as f64 / kpi.served as f64;
        }
        kpi
    }

    /// Fraction of services that were on time (1.0 for an empty run).
    pub fn on_time_rate(&self) -> f64 {
        if self.served == 0 {
            return 1.0;
        }
        (self.served - self.delay_events) as f64 / self.served as f64
    }
}
