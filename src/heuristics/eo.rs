//! Extended Extremal Optimization.
//!
//! Every position's fitness is the best (most negative) delta it could
//! achieve by swapping with some other position. Positions are ranked from
//! most-improving to least; a rank is drawn from the configured [`Pdf`] and
//! its position is swapped, unconditionally, with the partner that achieves
//! that best delta. EO never rejects a move — the driver's best-so-far
//! tracking is what keeps the answer.

use crate::engine::Engine;
use crate::heuristics::{Heuristic, ProgressTracker, SolveOutcome};
use crate::pdf::{Pdf, PdfFamily};
use crate::report::{Budget, ControlFlow, InterruptFlag, IterationReport};
use crate::rng::Rng32;
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct EoConfig {
    pub family: PdfFamily,
    /// Selection pressure in `(0, 1)`; passed straight through to [`Pdf::new`].
    pub force: f64,
}

impl Default for EoConfig {
    fn default() -> Self {
        EoConfig {
            family: PdfFamily::Power,
            force: 0.6,
        }
    }
}

struct FitInfo {
    index: usize,
    fitness: i64,
    /// The partner position whose swap with `index` realizes `fitness`.
    index2: usize,
}

pub struct Eo {
    config: EoConfig,
    rng: Rng32,
}

impl Eo {
    pub fn new(config: EoConfig, rng: Rng32) -> Self {
        Eo { config, rng }
    }

    /// `f(i) = min_{j != i} delta(i, j)`, with the winning `j` picked by
    /// reservoir sampling so ties are broken uniformly rather than always
    /// toward the first-seen partner.
    fn fitness_and_witness(engine: &Engine, i: usize, rng: &mut Rng32) -> (i64, usize) {
        let n = engine.n();
        let mut best_delta = i64::MAX;
        let mut best_j = 0usize;
        let mut ties = 0u64;
        for j in 0..n {
            if j == i {
                continue;
            }
            let delta = engine.get_delta(i, j);
            if delta < best_delta {
                best_delta = delta;
                best_j = j;
                ties = 1;
            } else if delta == best_delta {
                ties += 1;
                if rng.uniform_index(ties as usize) == 0 {
                    best_j = j;
                }
            }
        }
        (best_delta, best_j)
    }

    fn build_fit_table(engine: &Engine, rng: &mut Rng32) -> Vec<FitInfo> {
        let n = engine.n();
        let mut table: Vec<FitInfo> = (0..n)
            .map(|index| {
                let (fitness, index2) = Self::fitness_and_witness(engine, index, rng);
                FitInfo {
                    index,
                    fitness,
                    index2,
                }
            })
            .collect();
        // Rank 1 is the most improving (lowest delta) position.
        table.sort_by(|a, b| a.fitness.cmp(&b.fitness));
        table
    }

    /// Draws a rank from the PDF, then uniformly breaks ties among all
    /// table entries sharing that rank's fitness value.
    fn select_variable(&mut self, table: &[FitInfo], pdf: &Pdf) -> usize {
        let rank = pdf.pick(&mut self.rng);
        let target_fitness = table[rank - 1].fitness;
        let lo = table.partition_point(|e| e.fitness < target_fitness);
        let hi = {
            let mut h = lo;
            while h < table.len() && table[h].fitness == target_fitness {
                h += 1;
            }
            h
        };
        lo + self.rng.uniform_index(hi - lo)
    }
}

impl Heuristic for Eo {
    fn name(&self) -> &'static str {
        "eo"
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

        if n < 2 {
            return tracker.into_outcome(false);
        }

        loop {
            if interrupt.is_set() {
                interrupted = true;
                break;
            }
            let table = Self::build_fit_table(engine, &mut self.rng);
            let pdf = Pdf::new(self.config.family, n, self.config.force, &mut self.rng);
            let chosen = self.select_variable(&table, &pdf);
            let i = table[chosen].index;
            let j = table[chosen].index2;
            engine.do_swap(i, j);

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
    fn fit_table_is_sorted_most_improving_first() {
        let inst = nug5();
        let engine = Engine::new(&inst, vec![0, 1, 2, 3, 4]);
        let mut rng = Rng32::new(9);
        let table = Eo::build_fit_table(&engine, &mut rng);
        for w in table.windows(2) {
            assert!(w[0].fitness <= w[1].fitness);
        }
    }

    #[test]
    fn fitness_matches_the_delta_of_its_witness_partner() {
        let inst = nug5();
        let engine = Engine::new(&inst, vec![0, 1, 2, 3, 4]);
        let mut rng = Rng32::new(9);
        for i in 0..inst.n {
            let (fitness, j) = Eo::fitness_and_witness(&engine, i, &mut rng);
            assert_eq!(fitness, engine.get_delta(i, j));
        }
    }

    #[test]
    fn best_so_far_is_consistent_with_full_recompute() {
        let inst = nug5();
        let mut engine = Engine::new(&inst, vec![0, 1, 2, 3, 4]);
        let mut eo = Eo::new(EoConfig::default(), Rng32::new(21));
        let budget = Budget {
            max_iterations: Some(100),
            max_seconds: None,
        };
        let interrupt = InterruptFlag::new();
        let outcome = eo.solve(
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
    fn every_concrete_family_runs_without_panicking() {
        use crate::pdf::PdfFamily::*;
        let inst = nug5();
        for family in [Power, Exponential, Normal, Gamma, Cauchy, Triangular] {
            let mut engine = Engine::new(&inst, vec![0, 1, 2, 3, 4]);
            let mut eo = Eo::new(
                EoConfig {
                    family,
                    force: 0.5,
                },
                Rng32::new(1),
            );
            let budget = Budget {
                max_iterations: Some(20),
                max_seconds: None,
            };
            let interrupt = InterruptFlag::new();
            eo.solve(
                &mut engine,
                &budget,
                &interrupt,
                None,
                Instant::now(),
                &mut |_| ControlFlow::Continue,
            );
        }
    }
}
