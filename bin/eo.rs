//! `qap-eo`: extended Extremal Optimization binary.

use clap::Parser;
use qap_solvers::cli::EoArgs;
use qap_solvers::driver::{read_initial_permutation, resolve_target, Driver};
use qap_solvers::error::QapError;
use qap_solvers::heuristics::eo::{Eo, EoConfig};
use qap_solvers::instance::Instance;
use qap_solvers::report::{format_permutation, InterruptFlag};
use qap_solvers::rng::Rng32;

fn main() -> Result<(), QapError> {
    let args = EoArgs::parse();
    let instance = Instance::load(&args.common.instance_file)?;

    let seed = args
        .common
        .seed
        .filter(|&s| s >= 0)
        .map(|s| s as u64)
        .unwrap_or_else(Rng32::fresh_seed);
    println!("seed: {seed}");
    let mut master_rng = Rng32::new(seed);

    let initial_p = match &args.common.init_file {
        Some(path) => Some(read_initial_permutation(path, instance.n)?),
        None => None,
    };
    let target = resolve_target(&instance, args.common.target);

    let interrupt = InterruptFlag::new();
    if let Err(e) = interrupt.install_handler() {
        eprintln!("warning: could not install SIGINT handler: {e}");
    }

    let mut driver = Driver::new(
        &instance,
        args.common.n_execs,
        args.common.prob_reuse,
        args.common.max_iters_or_unbounded(),
        args.common.iters_before_restart_or_unbounded(),
        interrupt,
        args.common.verbose,
        Rng32::new(master_rng.next_u64()),
    );

    let config = EoConfig {
        family: args.parse_family(),
        force: args.force,
    };
    let report = driver.run(initial_p, target, || {
        Eo::new(config, Rng32::new(master_rng.next_u64()))
    });

    println!("best cost: {}", report.best_cost);
    println!("best permutation: {}", format_permutation(&report.best_p));
    println!(
        "executions: {} min: {} avg: {:.2} max: {}",
        report.stats.costs.len(),
        report.stats.min_cost(),
        report.stats.avg_cost(),
        report.stats.max_cost()
    );
    if report.interrupted {
        println!("interrupted");
    }
    Ok(())
}
