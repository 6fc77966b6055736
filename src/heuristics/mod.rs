//! The `Heuristic` capability set shared by all five search algorithms, and
//! the outcome type the driver collects after every restart.
//!
//! One file per algorithm: brute-force enumeration, robust taboo search,
//! simulated annealing, the fast ant system, and extended extremal
//! optimization (which leans on the rank-biased distributions in
//! [`crate::pdf`]).

pub mod brute_force;
pub mod eo;
pub mod fant;
pub mod rots;
pub mod sa;

use crate::engine::Engine;
use crate::report::{Budget, ControlFlow, InterruptFlag, IterationReport};
use std::time::Instant;

/// What one restart produced.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub iterations: u64,
    pub best_p: Vec<usize>,
    pub best_cost: i64,
    /// `true` if the restart stopped because of SIGINT rather than budget
    /// exhaustion or the callback requesting `ControlFlow::Stop`.
    pub interrupted: bool,
}

/// Common shape every search algorithm implements. `solve` drives `engine`
/// for one restart, reporting through `on_iteration` after each iteration and
/// stopping on budget exhaustion, interrupt, or a `ControlFlow::Stop` verdict
/// from the callback.
pub trait Heuristic {
    fn name(&self) -> &'static str;

    #[allow(clippy::too_many_arguments)]
    fn solve(
        &mut self,
        engine: &mut Engine,
        budget: &Budget,
        interrupt: &InterruptFlag,
        target: Option<i64>,
        started: Instant,
        on_iteration: &mut dyn FnMut(&IterationReport<'_>) -> ControlFlow,
    ) -> SolveOutcome;
}

/// Shared iteration-loop bookkeeping: tracks best-so-far and invokes the
/// callback, returning whether the caller should keep iterating.
pub(crate) struct ProgressTracker {
    pub iteration: u64,
    pub best_p: Vec<usize>,
    pub best_cost: i64,
}

impl ProgressTracker {
    pub fn new(initial_p: &[usize], initial_cost: i64) -> Self {
        ProgressTracker {
            iteration: 0,
            best_p: initial_p.to_vec(),
            best_cost: initial_cost,
        }
    }

    /// Registers one iteration's current cost/p, updates the incumbent, and
    /// runs the report callback. Returns `true` if search should continue.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        current_cost: i64,
        current_p: &[usize],
        budget: &Budget,
        interrupt: &InterruptFlag,
        target: Option<i64>,
        started: Instant,
        on_iteration: &mut dyn FnMut(&IterationReport<'_>) -> ControlFlow,
    ) -> bool {
        self.iteration += 1;
        if current_cost < self.best_cost {
            self.best_cost = current_cost;
            self.best_p = current_p.to_vec();
        }
        let elapsed = started.elapsed();
        let report = IterationReport {
            iteration: self.iteration,
            current_cost,
            best_cost: self.best_cost,
            best_p: &self.best_p,
            elapsed,
            target,
        };
        let verdict = on_iteration(&report);
        if interrupt.is_set() {
            return false;
        }
        if verdict == ControlFlow::Stop {
            return false;
        }
        !budget.is_exhausted(self.iteration, elapsed)
    }

    pub fn into_outcome(self, interrupted: bool) -> SolveOutcome {
        SolveOutcome {
            iterations: self.iteration,
            best_p: self.best_p,
            best_cost: self.best_cost,
            interrupted,
        }
    }
}
