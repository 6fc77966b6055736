//! Simulated annealing with a Connolly-style cooling schedule and reheat.
//!
//! The starting and final temperatures are estimated once from a sample of
//! random-swap deltas. The main loop then walks every `(r, s)` pair in
//! deterministic order, cooling by a small geometric factor before each
//! comparison. A run of consecutive rejections long enough to cover every
//! candidate pair forces an acceptance and reheats to the temperature last
//! seen at an improvement, after which cooling stops.

use crate::engine::Engine;
use crate::heuristics::{Heuristic, ProgressTracker, SolveOutcome};
use crate::report::{Budget, ControlFlow, InterruptFlag, IterationReport};
use crate::rng::Rng32;
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct SaConfig {
    /// Random swaps sampled to estimate the starting and final temperatures.
    pub nb_iter_initialisation: u64,
}

impl Default for SaConfig {
    fn default() -> Self {
        SaConfig {
            nb_iter_initialisation: 1000,
        }
    }
}

/// `t0`, `tf` estimated from the positive swap-deltas seen in a random
/// sample: `t0 = d_min + (d_max - d_min)/10`, `tf = d_min`.
struct TemperatureEstimate {
    t0: f64,
    tf: f64,
}

pub struct SimulatedAnnealing {
    config: SaConfig,
    rng: Rng32,
}

impl SimulatedAnnealing {
    pub fn new(config: SaConfig, rng: Rng32) -> Self {
        SimulatedAnnealing { config, rng }
    }

    fn estimate_temperatures(&mut self, engine: &Engine) -> TemperatureEstimate {
        let n = engine.n();
        if n < 2 {
            return TemperatureEstimate { t0: 1.0, tf: 0.01 };
        }
        let mut d_min = f64::MAX;
        let mut d_max = f64::MIN;
        let mut seen_positive = false;
        for _ in 0..self.config.nb_iter_initialisation {
            let i = self.rng.uniform_index(n);
            let mut j = self.rng.uniform_index(n);
            while j == i {
                j = self.rng.uniform_index(n);
            }
            let delta = engine.get_delta(i, j) as f64;
            if delta > 0.0 {
                seen_positive = true;
                d_min = d_min.min(delta);
                d_max = d_max.max(delta);
            }
        }
        if !seen_positive {
            return TemperatureEstimate { t0: 1.0, tf: 0.01 };
        }
        let t0 = d_min + (d_max - d_min) / 10.0;
        let tf = d_min.max(1e-9);
        TemperatureEstimate { t0, tf }
    }
}

/// Advances `(r, s)` to the next pair in the deterministic sweep order,
/// wrapping back to `(0, 1)` after `(n-2, n-1)`.
fn advance_pair(r: &mut usize, s: &mut usize, n: usize) {
    *s += 1;
    if *s >= n {
        *r += 1;
        if *r >= n - 1 {
            *r = 0;
        }
        *s = *r + 1;
    }
}

impl Heuristic for SimulatedAnnealing {
    fn name(&self) -> &'static str {
        "sa"
    }

    fn solve(
        &mut self,
        engine: &mut Engine,
        budget: &Budget,
        interrupt: &InterruptFlag,
        target: Option<i64>,
        started: Instant,
        on_iteration: &mut dyn FnMut(&IterationReport<'_>) -> ControlFlow,
    ) -> SolveOutcome {
        let n = engine.n();
        let mut tracker = ProgressTracker::new(engine.p(), engine.cost());

        if n < 2 {
            return tracker.into_outcome(false);
        }

        let estimate = self.estimate_temperatures(engine);
        let m = budget.max_iterations.unwrap_or(self.config.nb_iter_initialisation) as f64;
        let mut beta = (estimate.t0 - estimate.tf) / (m * estimate.t0 * estimate.tf);
        let mut temperature = estimate.t0;
        let mut t_found = estimate.t0;

        let mut interrupted = false;
        let threshold = (n * (n - 1) / 2) as u64;
        let mut consecutive_failures: u64 = 0;
        let (mut r, mut s) = (0usize, 1usize);

        loop {
            if interrupt.is_set() {
                interrupted = true;
                break;
            }

            temperature /= 1.0 + beta * temperature;

            let d = engine.get_delta(r, s);
            let mut accept =
                d < 0 || self.rng.uniform_double() < (-(d as f64) / temperature).exp();

            if accept {
                consecutive_failures = 0;
            } else {
                consecutive_failures += 1;
                if consecutive_failures >= threshold {
                    accept = true;
                    temperature = t_found;
                    beta = 0.0;
                    consecutive_failures = 0;
                }
            }

            if accept {
                engine.do_swap(r, s);
            }
            if engine.cost() < tracker.best_cost {
                t_found = temperature;
            }

            let keep_going = tracker.tick(
                engine.cost(),
                engine.p(),
                budget,
                interrupt,
                target,
                started,
                on_iteration,
            );
            if interrupt.is_set() {
                interrupted = true;
            }
            if !keep_going {
                break;
            }

            advance_pair(&mut r, &mut s, n);
        }

        tracker.into_outcome(interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use crate::report::{Budget, InterruptFlag};

    fn nug5() -> Instance {
        let text = "5\n0 1 1 2 3\n1 0 2 1 2\n1 2 0 1 2\n2 1 1 0 1\n3 2 2 1 0\n\n0 5 2 4 1\n5 0 3 0 2\n2 3 0 0 0\n4 0 0 0 5\n1 2 0 5 0\n";
        Instance::parse(text, "nug5").unwrap()
    }

    #[test]
    fn reported_best_matches_full_recompute() {
        let inst = nug5();
        let mut engine = Engine::new(&inst, vec![0, 1, 2, 3, 4]);
        let mut sa = SimulatedAnnealing::new(SaConfig::default(), Rng32::new(5));
        let budget = Budget {
            max_iterations: Some(300),
            max_seconds: None,
        };
        let interrupt = InterruptFlag::new();
        let outcome = sa.solve(
            &mut engine,
            &budget,
            &interrupt,
            None,
            Instant::now(),
            &mut |_| ControlFlow::Continue,
        );
        assert_eq!(outcome.best_cost, engine.cost_of(&outcome.best_p));
    }

    #[test]
    fn callback_can_stop_the_search_early() {
        let inst = nug5();
        let mut engine = Engine::new(&inst, vec![0, 1, 2, 3, 4]);
        let mut sa = SimulatedAnnealing::new(SaConfig::default(), Rng32::new(5));
        let budget = Budget::default();
        let interrupt = InterruptFlag::new();
        let outcome = sa.solve(
            &mut engine,
            &budget,
            &interrupt,
            None,
            Instant::now(),
            &mut |report| {
                if report.iteration >= 3 {
                    ControlFlow::Stop
                } else {
                    ControlFlow::Continue
                }
            },
        );
        assert_eq!(outcome.iterations, 3);
    }

    #[test]
    fn sweeps_pairs_in_deterministic_wrapping_order() {
        let mut seen = Vec::new();
        let (mut r, mut s) = (0usize, 1usize);
        for _ in 0..10 {
            seen.push((r, s));
            advance_pair(&mut r, &mut s, 5);
        }
        assert_eq!(
            seen,
            vec![
                (0, 1),
                (0, 2),
                (0, 3),
                (0, 4),
                (1, 2),
                (1, 3),
                (1, 4),
                (2, 3),
                (2, 4),
                (3, 4),
            ]
        );
        // Sweep wraps back to the start after all 10 pairs of n=5.
        advance_pair(&mut r, &mut s, 5);
        assert_eq!((r, s), (0, 1));
    }
}
