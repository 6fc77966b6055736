//! Robust Taboo Search.
//!
//! Every iteration scans all `n*(n-1)/2` candidate swaps. A move (i,j) is
//! authorized if the tabu matrix says position i or position j last saw the
//! other's current value long enough ago; it is aspired if either entry
//! predates the aspiration horizon, or if taking it would beat the best cost
//! seen so far. The best aspired move wins if any is aspired, otherwise the
//! best authorized one; if neither exists the iteration is skipped. The move
//! actually taken is forbidden for a randomly drawn tenure, biased toward
//! short values by cubing a uniform draw.

use crate::engine::Engine;
use crate::heuristics::{Heuristic, ProgressTracker, SolveOutcome};
use crate::report::{Budget, ControlFlow, InterruptFlag, IterationReport};
use crate::rng::Rng32;
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct RotsConfig {
    /// Multiplies `n` to set the scale of the randomly drawn tabu tenure.
    /// Negative disables the cube transform on the tenure draw.
    pub tabu_duration_factor: f64,
    /// Multiplies `n^2` to set the scale of the aspiration horizon.
    pub aspiration_factor: f64,
}

impl Default for RotsConfig {
    fn default() -> Self {
        RotsConfig {
            tabu_duration_factor: 8.0,
            aspiration_factor: 5.0,
        }
    }
}

pub struct Rots {
    config: RotsConfig,
    rng: Rng32,
}

impl Rots {
    pub fn new(config: RotsConfig, rng: Rng32) -> Self {
        Rots { config, rng }
    }

    /// Tenure is biased toward short values by cubing a uniform draw unless
    /// the configured factor is negative, then rejected and redrawn while
    /// `<= 2` (a tenure of 1 or 2 barely distinguishes itself from "not
    /// tabu" and stalls the search).
    fn draw_tenure(&mut self, tabu_duration: f64, use_cube: bool) -> i64 {
        loop {
            let u = self.rng.uniform_double();
            let scaled = if use_cube { u.powi(3) } else { u };
            let tenure = (scaled * tabu_duration).floor() as i64;
            if tenure > 2 {
                return tenure;
            }
        }
    }
}

impl Heuristic for Rots {
    fn name(&self) -> &'static str {
        "rots"
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
        let mut tabu = vec![vec![0i64; n]; n];
        for i in 0..n {
            for v in 0..n {
                tabu[i][v] = -((n * i + v) as i64);
            }
        }
        let t = self.config.tabu_duration_factor;
        let use_cube = t >= 0.0;
        let tabu_duration = t.abs() * n as f64;
        let aspiration = (self.config.aspiration_factor * (n * n) as f64).floor() as i64;

        let mut tracker = ProgressTracker::new(engine.p(), engine.cost());
        let mut interrupted = false;
        let mut k: i64 = 0;

        loop {
            if interrupt.is_set() {
                interrupted = true;
                break;
            }
            k += 1;

            let p = engine.p();
            let cost = engine.cost();
            let mut found_aspired = false;
            let mut best: Option<(i64, usize, usize)> = None;

            for i in 0..n {
                for j in (i + 1)..n {
                    let d = engine.get_delta(i, j);
                    let ti = tabu[i][p[j]];
                    let tj = tabu[j][p[i]];
                    let authorized = ti < k || tj < k;
                    let aspired =
                        ti < k - aspiration || tj < k - aspiration || cost + d < tracker.best_cost;

                    if aspired {
                        if !found_aspired || d <= best.unwrap().0 {
                            best = Some((d, i, j));
                        }
                        found_aspired = true;
                    } else if !found_aspired && authorized {
                        let replace = match best {
                            None => true,
                            Some((best_d, ..)) => d <= best_d,
                        };
                        if replace {
                            best = Some((d, i, j));
                        }
                    }
                }
            }

            match best {
                None => {
                    eprintln!("iter {k}: all moves are tabu");
                }
                Some((_, bi, bj)) => {
                    engine.do_swap(bi, bj);
                    let tenure = self.draw_tenure(tabu_duration, use_cube);
                    let p = engine.p();
                    tabu[bi][p[bj]] = k + tenure;
                    tabu[bj][p[bi]] = k + tenure;
                }
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
        }

        tracker.into_outcome(interrupted)
    }
}
