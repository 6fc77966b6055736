//! Fast Ant System.
//!
//! Each iteration constructs a permutation by roulette-wheel sampling over a
//! trace (pheromone) matrix, drives it to a local optimum with up to two
//! shuffled-order scans, then updates the trace: if the constructed solution
//! matches the best one found so far, the whole matrix is reset to a bumped
//! uniform increment; otherwise the increment reinforces the positions the
//! solution actually used, and a larger reward reinforces the positions of
//! the best solution seen so far.

use crate::engine::Engine;
use crate::heuristics::{Heuristic, ProgressTracker, SolveOutcome};
use crate::report::{Budget, ControlFlow, InterruptFlag, IterationReport};
use crate::rng::Rng32;
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct FantConfig {
    /// Reward applied to the global best's positions when a constructed
    /// solution does not match it.
    pub r_reinforcement: f64,
}

impl Default for FantConfig {
    fn default() -> Self {
        FantConfig {
            r_reinforcement: 10.0,
        }
    }
}

pub struct Fant {
    config: FantConfig,
    rng: Rng32,
    trace: Vec<Vec<f64>>,
    /// Bumped every iteration that matches the global best, then used to
    /// reset the whole matrix to a uniform value.
    increment: f64,
}

impl Fant {
    pub fn new(config: FantConfig, rng: Rng32, n: usize) -> Self {
        Fant {
            config,
            rng,
            trace: vec![vec![1.0; n]; n],
            increment: 1.0,
        }
    }

    /// Builds a permutation position by position: for position `i`, picks
    /// among the facilities not yet placed with probability proportional to
    /// `trace[i][facility]`.
    fn generate_from_trace(&mut self, n: usize) -> Vec<usize> {
        let mut available: Vec<usize> = (0..n).collect();
        let mut p = vec![0usize; n];
        for i in 0..n {
            let weights: Vec<f64> = available.iter().map(|&f| self.trace[i][f]).collect();
            let total: f64 = weights.iter().sum();
            let mut u = self.rng.uniform_double() * total;
            let mut chosen_idx = available.len() - 1;
            for (idx, w) in weights.iter().enumerate() {
                if u <= *w {
                    chosen_idx = idx;
                    break;
                }
                u -= *w;
            }
            p[i] = available.remove(chosen_idx);
        }
        p
    }

    /// Up to two full scans over a shuffled pair order, swapping on any
    /// improving delta. The second scan only runs if the first one swapped
    /// at least once.
    fn local_search(&mut self, engine: &mut Engine) {
        let n = engine.n();
        let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push((i, j));
            }
        }
        self.rng.shuffle(&mut pairs);

        let mut improved = false;
        for &(i, j) in &pairs {
            if engine.get_delta(i, j) < 0 {
                engine.do_swap(i, j);
                improved = true;
            }
        }
        if !improved {
            return;
        }
        for &(i, j) in &pairs {
            if engine.get_delta(i, j) < 0 {
                engine.do_swap(i, j);
            }
        }
    }

    fn update_trace(&mut self, p: &[usize], best_p: &[usize], matches_best: bool) {
        if matches_best {
            self.increment += 1.0;
            for row in self.trace.iter_mut() {
                row.iter_mut().for_each(|cell| *cell = self.increment);
            }
        } else {
            for (i, &facility) in p.iter().enumerate() {
                self.trace[i][facility] += self.increment;
            }
            for (i, &facility) in best_p.iter().enumerate() {
                self.trace[i][facility] += self.config.r_reinforcement;
            }
        }
    }
}

impl Heuristic for Fant {
    fn name(&self) -> &'static str {
        "fant"
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
        let mut interrupted = false;

        loop {
            if interrupt.is_set() {
                interrupted = true;
                break;
            }
            let candidate = self.generate_from_trace(n);
            engine.set_solution(candidate);
            self.local_search(engine);

            let matches_best = engine.p() == tracker.best_p.as_slice();
            self.update_trace(engine.p(), &tracker.best_p, matches_best);

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
    fn constructed_solutions_are_always_valid_permutations() {
        let inst = nug5();
        let mut fant = Fant::new(FantConfig::default(), Rng32::new(11), inst.n);
        for _ in 0..50 {
            let p = fant.generate_from_trace(inst.n);
            let mut sorted = p.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..inst.n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn local_search_never_increases_cost() {
        let inst = nug5();
        let mut engine = Engine::new(&inst, vec![0, 1, 2, 3, 4]);
        let mut fant = Fant::new(FantConfig::default(), Rng32::new(12), inst.n);
        let before = engine.cost();
        fant.local_search(&mut engine);
        assert!(engine.cost() <= before);
        assert_eq!(engine.cost(), engine.cost_of(engine.p()));
    }

    #[test]
    fn solve_reports_a_consistent_best() {
        let inst = nug5();
        let mut engine = Engine::new(&inst, vec![0, 1, 2, 3, 4]);
        let mut fant = Fant::new(FantConfig::default(), Rng32::new(13), inst.n);
        let budget = Budget {
            max_iterations: Some(30),
            max_seconds: None,
        };
        let interrupt = InterruptFlag::new();
        let outcome = fant.solve(
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
    fn matching_global_best_resets_trace_to_uniform_increment() {
        let inst = nug5();
        let mut fant = Fant::new(FantConfig::default(), Rng32::new(14), inst.n);
        let best_p = vec![0, 1, 2, 3, 4];
        fant.update_trace(&best_p, &best_p, true);
        for row in &fant.trace {
            for &cell in row {
                assert_eq!(cell, fant.increment);
            }
        }
        assert_eq!(fant.increment, 2.0);
    }

    #[test]
    fn non_matching_solution_reinforces_both_its_own_and_the_best_positions() {
        let inst = nug5();
        let mut fant = Fant::new(FantConfig::default(), Rng32::new(15), inst.n);
        let p = vec![1, 0, 2, 3, 4];
        let best_p = vec![0, 1, 2, 3, 4];
        fant.update_trace(&p, &best_p, false);
        assert_eq!(fant.trace[0][1], 1.0 + 1.0);
        assert_eq!(fant.trace[0][0], 1.0 + fant.config.r_reinforcement);
    }
}
