//! Interrupt flag, per-iteration report contract, and verbose-output
//! formatting.
//!
//! Every heuristic reports through the same `FnMut(&IterationReport<'_>) ->
//! ControlFlow` callback shape, letting the driver decide when to log, stop
//! early on a target cost, or honor an interrupt without the heuristic
//! itself knowing why.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Verdict returned by a report callback after seeing one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Stop,
}

/// Snapshot handed to the report callback after every search iteration.
#[derive(Debug, Clone)]
pub struct IterationReport<'a> {
    pub iteration: u64,
    pub current_cost: i64,
    pub best_cost: i64,
    pub best_p: &'a [usize],
    pub elapsed: Duration,
    /// Known optimum/bound/BKS to report percent deviation against, if any.
    pub target: Option<i64>,
}

/// `iter: <k> cost: <c> pd: <p%> time: <s>`, percent deviation omitted when
/// no target cost is known.
pub fn format_iteration_line(report: &IterationReport<'_>) -> String {
    let mut line = format!(
        "iter:{:9} cost: {:>12}",
        report.iteration, report.best_cost
    );
    if let Some(target) = report.target {
        if target > 0 {
            let pd = 100.0 * (report.best_cost - target) as f64 / target as f64;
            line.push_str(&format!(" pd: {pd:6.3} %"));
        }
    }
    line.push_str(&format!(" time: {:9.2} sec", report.elapsed.as_secs_f64()));
    line
}

/// `p0 p1 p2 ...`, one-based.
pub fn format_permutation(p: &[usize]) -> String {
    p.iter()
        .map(|x| (x + 1).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shared, cooperatively-checked SIGINT flag. `Arc<AtomicBool>` rather than
/// `Rc<Cell<bool>>` because `ctrlc::set_handler` requires its closure to be
/// `Send`.
#[derive(Clone)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Installs the process-wide SIGINT handler. Only the first call in a
    /// process actually takes effect (`ctrlc` itself enforces that).
    pub fn install_handler(&self) -> Result<(), ctrlc::Error> {
        let flag = Arc::clone(&self.0);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
    }
}

impl Default for InterruptFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// An iteration/time budget for a single restart.
#[derive(Debug, Clone, Copy, Default)]
pub struct Budget {
    pub max_iterations: Option<u64>,
    pub max_seconds: Option<f64>,
}

impl Budget {
    pub fn is_exhausted(&self, iteration: u64, elapsed: Duration) -> bool {
        if let Some(max) = self.max_iterations {
            if iteration >= max {
                return true;
            }
        }
        if let Some(max_secs) = self.max_seconds {
            if elapsed.as_secs_f64() >= max_secs {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_flag_starts_clear_and_latches() {
        let flag = InterruptFlag::new();
        assert!(!flag.is_set());
        flag.set();
        assert!(flag.is_set());
    }

    #[test]
    fn budget_exhausts_on_iteration_count() {
        let budget = Budget {
            max_iterations: Some(10),
            max_seconds: None,
        };
        assert!(!budget.is_exhausted(9, Duration::from_secs(0)));
        assert!(budget.is_exhausted(10, Duration::from_secs(0)));
    }

    #[test]
    fn format_iteration_line_includes_pd_when_target_known() {
        let p = vec![0, 1, 2];
        let report = IterationReport {
            iteration: 5,
            current_cost: 110,
            best_cost: 110,
            best_p: &p,
            elapsed: Duration::from_secs_f64(1.5),
            target: Some(100),
        };
        let line = format_iteration_line(&report);
        assert!(line.contains("pd:"));
        assert!(line.contains("cost:"));
    }
}
