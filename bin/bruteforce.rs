//! `qap-bruteforce`: exhaustive enumeration binary.

use clap::Parser;
use qap_solvers::cli::BruteForceArgs;
use qap_solvers::driver::{read_initial_permutation, resolve_target, Driver};
use qap_solvers::error::QapError;
use qap_solvers::heuristics::brute_force::BruteForce;
use qap_solvers::instance::Instance;
use qap_solvers::report::{format_permutation, InterruptFlag};
use qap_solvers::rng::Rng32;

fn main() -> Result<(), QapError> {
    let args = BruteForceArgs::parse();
    let instance = Instance::load(&args.common.instance_file)?;

    let seed = args
        .common
        .seed
        .filter(|&s| s >= 0)
        .map(|s| s as u64)
        .unwrap_or_else(Rng32::fresh_seed);
    println!("seed: {seed}");

    let initial_p = match &args.common.init_file {
        Some(path) => Some(read_initial_permutation(path, instance.n)?),
        None => None,
    };
    let target = resolve_target(&instance, args.common.target);

    let interrupt = InterruptFlag::new();
    if let Err(e) = interrupt.install_handler() {
        eprintln!("warning: could not install SIGINT handler: {e}");
    }

    // Brute force enumerates every permutation starting from the identity
    // regardless of what p the driver hands it, so a single execution and
    // restart is all there ever is to run.
    let mut driver = Driver::new(
        &instance,
        1,
        0.0,
        args.common.max_iters_or_unbounded(),
        args.common.iters_before_restart_or_unbounded(),
        interrupt,
        args.common.verbose,
        Rng32::new(seed),
    );

    let report = driver.run(initial_p, target, BruteForce::new);

    println!("best cost: {}", report.best_cost);
    println!("best permutation: {}", format_permutation(&report.best_p));
    if report.interrupted {
        println!("interrupted");
    }
    Ok(())
}
