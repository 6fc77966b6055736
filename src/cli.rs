//! Shared command-line surface: one `#[derive(Parser)]` struct reused across
//! binaries via `#[command(flatten)]`, plus the flags specific to each
//! heuristic.

use clap::Parser;
use std::path::PathBuf;

/// Flags every `qap-*` binary accepts.
#[derive(Debug, Parser)]
pub struct CommonArgs {
    /// Path to the instance file.
    pub instance_file: PathBuf,

    /// PRNG seed. Negative or absent draws a seed from wall-clock time.
    #[arg(short = 's', long = "seed")]
    pub seed: Option<i64>,

    /// Path to a file holding a starting permutation for the first
    /// execution; either 0-based or 1-based, auto-detected.
    #[arg(short = 'i', long = "init")]
    pub init_file: Option<PathBuf>,

    /// Number of independent executions whose results are aggregated.
    #[arg(short = 'b', long = "execs", default_value_t = 1)]
    pub n_execs: u32,

    /// Probability of starting an execution after the first from the
    /// previous execution's final permutation instead of a fresh one.
    #[arg(short = 'P', long = "prob-reuse", default_value_t = 0.0)]
    pub prob_reuse: f64,

    /// Target cost to report percent deviation against and stop on. `<= 0`
    /// (or omitted) falls back to the instance's known optimum, then
    /// best-known solution, then lower bound.
    #[arg(short = 'T', long = "target")]
    pub target: Option<i64>,

    /// Verbosity: absent = silent, `-v` = an improvement line, `-vv` = also
    /// dump the current best permutation.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Total iteration budget per execution. Unbounded if omitted.
    #[arg(short = 'm', long = "max-iters")]
    pub max_iters: Option<u64>,

    /// Iteration budget per restart, clamped to `max_iters`. Unbounded if
    /// omitted.
    #[arg(short = 'r', long = "iters-before-restart")]
    pub iters_before_restart: Option<u64>,
}

impl CommonArgs {
    pub fn max_iters_or_unbounded(&self) -> u64 {
        self.max_iters.unwrap_or(u64::MAX)
    }

    pub fn iters_before_restart_or_unbounded(&self) -> u64 {
        self.iters_before_restart.unwrap_or(u64::MAX)
    }
}

/// ROTS-specific flags.
#[derive(Debug, Parser)]
pub struct RotsArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Tabu tenure scale factor.
    #[arg(short = 't', long = "tabu-duration-factor", default_value_t = 8.0)]
    pub tabu_duration_factor: f64,

    /// Aspiration threshold scale factor.
    #[arg(short = 'a', long = "aspiration-factor", default_value_t = 5.0)]
    pub aspiration_factor: f64,
}

/// SA-specific flags.
#[derive(Debug, Parser)]
pub struct SaArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Random swaps sampled to estimate the starting and final temperatures.
    #[arg(long = "init-samples", default_value_t = 1000)]
    pub nb_iter_initialisation: u64,
}

/// FANT-specific flags.
#[derive(Debug, Parser)]
pub struct FantArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Reinforcement strength for matching the best solution found so far.
    #[arg(short = 'R', long = "reinforcement", default_value_t = 10.0)]
    pub r_reinforcement: f64,
}

/// EO-specific flags.
#[derive(Debug, Parser)]
pub struct EoArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Distribution family: power, exponential, normal, gamma, cauchy,
    /// triangular, or random (resolved once per restart).
    #[arg(short = 'p', long = "pdf", default_value = "power")]
    pub pdf: String,

    /// Selection pressure in (0, 1).
    #[arg(short = 'f', long = "force", default_value_t = 0.6)]
    pub force: f64,
}

/// brute-force-specific flags.
#[derive(Debug, Parser)]
pub struct BruteForceArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// `qap-check`: validates a solution file against an instance.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    pub instance_file: PathBuf,
    pub solution_file: PathBuf,
}

/// `qap-emit`: re-emits an instance file in canonical form.
#[derive(Debug, Parser)]
pub struct EmitArgs {
    pub instance_file: PathBuf,

    /// Write to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    pub output_file: Option<PathBuf>,
}

impl EoArgs {
    pub fn parse_family(&self) -> crate::pdf::PdfFamily {
        use crate::pdf::PdfFamily::*;
        match self.pdf.to_ascii_lowercase().as_str() {
            "power" => Power,
            "exponential" => Exponential,
            "normal" => Normal,
            "gamma" => Gamma,
            "cauchy" => Cauchy,
            "triangular" => Triangular,
            _ => Random,
        }
    }
}
