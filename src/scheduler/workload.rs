//! Random arrival streams for simulations.
//!
//! Generates [`TicketRequest`]s with increasing turns, uniformly chosen
//! procedure types, and service times jittered around each type's
//! standard duration. Seeded generators are reproducible.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{ProcedureType, TicketRequest};

/// Seeded generator of client arrivals.
///
/// # Example
/// ```
/// use turnstile_dispatch::scheduler::WorkloadGenerator;
///
/// let a = WorkloadGenerator::seeded(7).generate(5);
/// let b = WorkloadGenerator::seeded(7).generate(5);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone)]
pub struct WorkloadGenerator<R: Rng = StdRng> {
    rng: R,
    next_turn: i64,
    max_gap: i64,
    jitter: i64,
    issued: u64,
}

impl WorkloadGenerator<StdRng> {
    /// Creates a reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> WorkloadGenerator<R> {
    /// Creates a generator over any RNG. Arrivals start at turn 0, up to
    /// 5 minutes apart, with no duration jitter.
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            next_turn: 0,
            max_gap: 5,
            jitter: 0,
            issued: 0,
        }
    }

    /// Sets the first arrival turn (minutes).
    pub fn starting_at(mut self, turn: i64) -> Self {
        self.next_turn = turn;
        self
    }

    /// Sets the maximum gap between arrivals (minutes, inclusive).
    pub fn with_max_gap(mut self, minutes: i64) -> Self {
        self.max_gap = minutes.max(0);
        self
    }

    /// Sets the ± jitter applied to standard durations (minutes).
    pub fn with_jitter(mut self, minutes: i64) -> Self {
        self.jitter = minutes.max(0);
        self
    }

    /// Next arrival.
    pub fn next_request(&mut self) -> TicketRequest {
        let procedure_type = ProcedureType::ALL
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(ProcedureType::Simple);

        let jitter = if self.jitter > 0 {
            self.rng.random_range(-self.jitter..=self.jitter)
        } else {
            0
        };
        let duration = (procedure_type.standard_duration() + jitter).max(1);

        self.issued += 1;
        let request = TicketRequest::new(format!("client-{}", self.issued), procedure_type)
            .with_duration(duration)
            .with_turn(self.next_turn);

        let gap = self.rng.random_range(0..=self.max_gap);
        self.next_turn = self.next_turn.saturating_add(gap);
        request
    }

    /// Next `count` arrivals.
    pub fn generate(&mut self, count: usize) -> Vec<TicketRequest> {
        (0..count).map(|_| self.next_request()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::DispatchEngine;
    use crate::scheduler::{ServiceKpi, ServiceRun};

    #[test]
    fn test_seeded_is_reproducible() {
        let a = WorkloadGenerator::seeded(42).with_jitter(3).generate(20);
        let b = WorkloadGenerator::seeded(42).with_jitter(3).generate(20);
        assert_eq!(a, b);
    }

    #[test]
    fn test_turns_non_decreasing_from_start() {
        let reqs = WorkloadGenerator::seeded(1)
            .starting_at(540)
            .with_max_gap(4)
            .generate(50);
        assert_eq!(reqs[0].requested_turn, Some(540));
        for pair in reqs.windows(2) {
            let (a, b) = (pair[0].requested_turn.unwrap(), pair[1].requested_turn.unwrap());
            assert!(a <= b && b - a <= 4);
        }
    }

    #[test]
    fn test_durations_within_jitter() {
        for req in WorkloadGenerator::seeded(9).with_jitter(2).generate(100) {
            let std = req.procedure_type.standard_duration();
            assert!(req.estimated_duration >= 1);
            assert!((req.estimated_duration - std).abs() <= 2);
        }
    }

    #[test]
    fn test_names_are_sequential() {
        let reqs = WorkloadGenerator::seeded(3).generate(3);
        let names: Vec<&str> = reqs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["client-1", "client-2", "client-3"]);
    }

    #[test]
    fn test_simulated_day_drains() {
        let mut engine = DispatchEngine::standard_office();
        for req in WorkloadGenerator::seeded(2024).with_jitter(2).generate(60) {
            engine.register(req).unwrap();
        }
        let log = ServiceRun::new().run(&mut engine).unwrap();
        let kpi = ServiceKpi::calculate(&log);
        assert_eq!(kpi.served, 60);
        assert!(engine.is_empty());
    }
}
