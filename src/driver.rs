//! The execution/restart driver: N_EXECS independent runs, each made of
//! restarts bounded by ITERS_BEFORE_RESTART within a per-execution MAX_ITERS
//! budget, aggregated into min/avg/max cost and time statistics.

use crate::engine::Engine;
use crate::error::QapError;
use crate::heuristics::Heuristic;
use crate::instance::Instance;
use crate::report::{
    format_iteration_line, format_permutation, Budget, ControlFlow, InterruptFlag,
};
use crate::rng::Rng32;
use std::path::Path;
use std::time::{Duration, Instant};

/// Reads a starting permutation from `path`, auto-detecting 0-based vs.
/// 1-based indexing from the smallest value present and validating it
/// really is a permutation of `0..n`.
pub fn read_initial_permutation(path: &Path, n: usize) -> Result<Vec<usize>, QapError> {
    let file_name = path.to_string_lossy().into_owned();
    let err = |reason: String| QapError::Parse {
        file: file_name.clone(),
        reason,
    };
    let text = std::fs::read_to_string(path)?;
    let values: Vec<i64> = text
        .split_whitespace()
        .map(|t| {
            t.parse::<i64>()
                .map_err(|_| err(format!("{t:?} is not an integer")))
        })
        .collect::<Result<_, _>>()?;
    if values.len() != n {
        return Err(err(format!(
            "expected {n} permutation entries, found {}",
            values.len()
        )));
    }
    let min_value = *values.iter().min().unwrap();
    let zero_based: Vec<i64> = if min_value == 0 {
        values
    } else {
        values.into_iter().map(|v| v - 1).collect()
    };

    let mut seen = vec![false; n];
    let mut p = vec![0usize; n];
    for (index, &v) in zero_based.iter().enumerate() {
        if v < 0 || v as usize >= n || seen[v as usize] {
            return Err(QapError::InvalidPermutation {
                size: n,
                index,
                value: v,
            });
        }
        seen[v as usize] = true;
        p[index] = v as usize;
    }
    Ok(p)
}

/// Per-execution cost and wall-time samples, one entry per execution.
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub costs: Vec<i64>,
    pub elapsed: Vec<Duration>,
}

impl RunStats {
    pub fn min_cost(&self) -> i64 {
        *self.costs.iter().min().expect("at least one execution ran")
    }

    pub fn max_cost(&self) -> i64 {
        *self.costs.iter().max().expect("at least one execution ran")
    }

    pub fn avg_cost(&self) -> f64 {
        self.costs.iter().sum::<i64>() as f64 / self.costs.len() as f64
    }

    pub fn min_time(&self) -> Duration {
        *self.elapsed.iter().min().expect("at least one execution ran")
    }

    pub fn max_time(&self) -> Duration {
        *self.elapsed.iter().max().expect("at least one execution ran")
    }

    pub fn avg_time(&self) -> Duration {
        let total: Duration = self.elapsed.iter().sum();
        total / self.elapsed.len() as u32
    }
}

/// What a full driver run produced: the aggregate statistics plus the single
/// best solution found across every execution and restart.
#[derive(Debug)]
pub struct DriverReport {
    pub stats: RunStats,
    pub best_p: Vec<usize>,
    pub best_cost: i64,
    pub interrupted: bool,
}

fn fresh_random_permutation(rng: &mut Rng32, n: usize) -> Vec<usize> {
    let mut p: Vec<usize> = (0..n).collect();
    rng.shuffle(&mut p);
    p
}

pub struct Driver<'a> {
    pub instance: &'a Instance,
    pub n_execs: u32,
    pub prob_reuse: f64,
    pub max_iters: u64,
    pub iters_before_restart: u64,
    pub interrupt: InterruptFlag,
    /// 0 = silent, 1 = one line per improvement, 2 = also dump the permutation.
    pub verbosity: u8,
    rng: Rng32,
}

impl<'a> Driver<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        instance: &'a Instance,
        n_execs: u32,
        prob_reuse: f64,
        max_iters: u64,
        iters_before_restart: u64,
        interrupt: InterruptFlag,
        verbosity: u8,
        rng: Rng32,
    ) -> Self {
        Driver {
            instance,
            n_execs: n_execs.max(1),
            prob_reuse: prob_reuse.clamp(0.0, 1.0),
            max_iters,
            iters_before_restart: iters_before_restart.min(max_iters).max(1),
            interrupt,
            verbosity,
            rng,
        }
    }

    /// `target` is the cost the driver reports percent deviation against and
    /// stops early on reaching (known optimum, lower bound, or best-known
    /// solution, resolved by the caller before this is invoked).
    /// `read_initial` is the permutation to use for the first execution, if
    /// one was read from a file; otherwise the first execution also starts
    /// from a fresh random permutation.
    pub fn run<F, H>(
        &mut self,
        read_initial: Option<Vec<usize>>,
        target: Option<i64>,
        mut make_heuristic: F,
    ) -> DriverReport
    where
        F: FnMut() -> H,
        H: Heuristic,
    {
        let n = self.instance.n;
        let mut stats = RunStats::default();
        let mut overall_best_p = read_initial
            .clone()
            .unwrap_or_else(|| (0..n).collect());
        let mut overall_best_cost = i64::MAX;
        let mut interrupted = false;
        let mut previous_final_p: Option<Vec<usize>> = None;

        'executions: for exec_no in 0..self.n_execs {
            if self.interrupt.is_set() {
                interrupted = true;
                break;
            }
            let exec_started = Instant::now();

            let mut p = if exec_no == 0 {
                read_initial
                    .clone()
                    .unwrap_or_else(|| fresh_random_permutation(&mut self.rng, n))
            } else {
                match &previous_final_p {
                    Some(prev) if self.rng.uniform_double() < self.prob_reuse => prev.clone(),
                    _ => fresh_random_permutation(&mut self.rng, n),
                }
            };

            let mut exec_best_cost = i64::MAX;
            let mut exec_best_p = p.clone();
            let mut exec_iters: u64 = 0;
            let mut final_p = p.clone();
            let mut restart_no: u32 = 0;

            loop {
                if self.interrupt.is_set() {
                    interrupted = true;
                    break;
                }
                if let Some(t) = target {
                    if exec_best_cost <= t {
                        break;
                    }
                }
                if exec_iters >= self.max_iters {
                    break;
                }

                if restart_no > 0 {
                    p = fresh_random_permutation(&mut self.rng, n);
                }

                let mut engine = Engine::new(self.instance, p.clone());
                let mut heuristic = make_heuristic();
                let restart_started = Instant::now();
                let verbosity = self.verbosity;
                let max_iters = self.max_iters;
                let iters_before_restart = self.iters_before_restart;
                let interrupt = self.interrupt.clone();
                let mut restart_best_cost = i64::MAX;

                let outcome = heuristic.solve(
                    &mut engine,
                    &Budget {
                        max_iterations: Some(iters_before_restart),
                        max_seconds: None,
                    },
                    &self.interrupt,
                    target,
                    restart_started,
                    &mut |report| {
                        exec_iters += 1;
                        if report.current_cost < restart_best_cost {
                            restart_best_cost = report.current_cost;
                            if verbosity >= 1 {
                                println!("{}", format_iteration_line(report));
                                if verbosity >= 2 {
                                    println!("  p: {}", format_permutation(report.best_p));
                                }
                            }
                        }
                        let not_interrupted = !interrupt.is_set();
                        let cost_ok = match target {
                            Some(t) => restart_best_cost > t,
                            None => true,
                        };
                        let iters_ok = exec_iters <= max_iters;
                        let restart_ok = report.iteration <= iters_before_restart;
                        if not_interrupted && cost_ok && iters_ok && restart_ok {
                            ControlFlow::Continue
                        } else {
                            ControlFlow::Stop
                        }
                    },
                );

                if outcome.best_cost < exec_best_cost {
                    exec_best_cost = outcome.best_cost;
                    exec_best_p = outcome.best_p;
                }
                if outcome.interrupted {
                    interrupted = true;
                }
                final_p = engine.p().to_vec();
                restart_no += 1;

                if interrupted {
                    break;
                }
            }

            stats.costs.push(exec_best_cost);
            stats.elapsed.push(exec_started.elapsed());
            if exec_best_cost < overall_best_cost {
                overall_best_cost = exec_best_cost;
                overall_best_p = exec_best_p;
            }
            previous_final_p = Some(final_p);
            if interrupted {
                break 'executions;
            }
        }

        DriverReport {
            stats,
            best_p: overall_best_p,
            best_cost: overall_best_cost,
            interrupted,
        }
    }
}

/// Resolves the target cost to report progress against: an explicit,
/// positive `override_target` wins; otherwise known optimum, then
/// best-known solution, then lower bound — clamped so the reported target
/// never exceeds the instance's `bound`.
pub fn resolve_target(instance: &Instance, override_target: Option<i64>) -> Option<i64> {
    let candidate = match override_target {
        Some(t) if t > 0 => t,
        _ => {
            if instance.opt > 0 {
                instance.opt
            } else if instance.bks > 0 {
                instance.bks
            } else if instance.bound > 0 {
                instance.bound
            } else {
                return None;
            }
        }
    };
    Some(if instance.bound > 0 {
        candidate.max(instance.bound)
    } else {
        candidate
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::brute_force::BruteForce;

    fn nug5() -> Instance {
        let text = "5\n0 1 1 2 3\n1 0 2 1 2\n1 2 0 1 2\n2 1 1 0 1\n3 2 2 1 0\n\n0 5 2 4 1\n5 0 3 0 2\n2 3 0 0 0\n4 0 0 0 5\n1 2 0 5 0\n";
        Instance::parse(text, "nug5").unwrap()
    }

    #[test]
    fn aggregates_one_stat_sample_per_execution() {
        let inst = nug5();
        let mut driver = Driver::new(
            &inst,
            3,
            0.0,
            5,
            5,
            InterruptFlag::new(),
            0,
            Rng32::new(1),
        );
        let report = driver.run(Some(vec![0, 1, 2, 3, 4]), None, BruteForce::new);
        assert_eq!(report.stats.costs.len(), 3);
        assert_eq!(report.stats.elapsed.len(), 3);
        assert_eq!(report.best_cost, report.stats.min_cost());
    }

    #[test]
    fn stops_an_execution_once_max_iters_is_reached() {
        let inst = nug5();
        let mut driver = Driver::new(
            &inst,
            1,
            0.0,
            7,
            100,
            InterruptFlag::new(),
            0,
            Rng32::new(2),
        );
        let report = driver.run(Some(vec![0, 1, 2, 3, 4]), None, BruteForce::new);
        assert_eq!(report.stats.costs.len(), 1);
    }

    #[test]
    fn restarts_when_iters_before_restart_is_smaller_than_max_iters() {
        let inst = nug5();
        let mut driver = Driver::new(
            &inst,
            1,
            0.0,
            40,
            10,
            InterruptFlag::new(),
            0,
            Rng32::new(3),
        );
        let report = driver.run(Some(vec![0, 1, 2, 3, 4]), None, BruteForce::new);
        assert_eq!(report.best_cost, report.stats.min_cost());
    }

    #[test]
    fn resolve_target_prefers_override_over_opt_bound_and_bks() {
        let mut inst = nug5();
        inst.opt = 10;
        inst.bound = 5;
        inst.bks = 8;
        assert_eq!(resolve_target(&inst, Some(20)), Some(20));
        assert_eq!(resolve_target(&inst, None), Some(10));

        inst.opt = 0;
        assert_eq!(resolve_target(&inst, None), Some(8));

        inst.bks = 0;
        assert_eq!(resolve_target(&inst, None), Some(5));

        inst.bound = 0;
        assert_eq!(resolve_target(&inst, None), None);
    }

    #[test]
    fn read_initial_permutation_accepts_one_based_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("init.txt");
        std::fs::write(&path, "3 1 5 2 4\n").unwrap();
        let p = read_initial_permutation(&path, 5).unwrap();
        assert_eq!(p, vec![2, 0, 4, 1, 3]);
    }

    #[test]
    fn read_initial_permutation_accepts_zero_based_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("init.txt");
        std::fs::write(&path, "2 0 4 1 3\n").unwrap();
        let p = read_initial_permutation(&path, 5).unwrap();
        assert_eq!(p, vec![2, 0, 4, 1, 3]);
    }

    #[test]
    fn read_initial_permutation_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("init.txt");
        std::fs::write(&path, "1 1 2 3 4\n").unwrap();
        let err = read_initial_permutation(&path, 5).unwrap_err();
        assert!(matches!(err, QapError::InvalidPermutation { .. }));
    }
}
