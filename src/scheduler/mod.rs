//! Service runs, KPI evaluation, and synthetic workloads.
//!
//! # Algorithm
//!
//! `ServiceRun` repeatedly serves the queue head with the earliest turn
//! across all servers, the way a counter drains during a working day.
//!
//! # KPI
//!
//! `ServiceKpi` summarizes a run: tickets served, delay events, penalty
//! minutes, deactivations, waits, and stranded tickets.
//!
//! # Workload
//!
//! `WorkloadGenerator` produces seeded random arrival streams for tests and
//! what-if simulations.

mod kpi;
mod simulation;
mod workload;

pub use kpi::ServiceKpi;
pub use simulation::{ServiceLog, ServiceRun};
pub use workload::WorkloadGenerator;
