//! `qap-check`: validates a solution file against an instance.
//!
//! The cost is computed under both the `(A, B)` orientation and the
//! dualized `(B, A)` orientation, so a hand-edited instance with flow and
//! distance matrices accidentally swapped can be spotted by comparing
//! whichever orientation's cost lines up with the instance's known
//! optimum/bound/BKS.

use clap::Parser;
use qap_solvers::cli::CheckArgs;
use qap_solvers::driver::read_initial_permutation;
use qap_solvers::error::QapError;
use qap_solvers::instance::Instance;
use qap_solvers::report::format_permutation;

fn cost_one_way(instance: &Instance, p: &[usize], exchange: bool) -> i64 {
    let (a, b) = if exchange {
        (&instance.b, &instance.a)
    } else {
        (&instance.a, &instance.b)
    };
    let n = instance.n;
    let mut cost = 0i64;
    for i in 0..n {
        for j in 0..n {
            cost += a[i][j] * b[p[i]][p[j]];
        }
    }
    cost
}

fn main() -> Result<(), QapError> {
    let args = CheckArgs::parse();
    let instance = Instance::load(&args.instance_file)?;
    let p = read_initial_permutation(&args.solution_file, instance.n)?;

    let direct = cost_one_way(&instance, &p, false);
    let dual = cost_one_way(&instance, &p, true);

    println!("instance: {}", instance.file_name);
    println!("solution: {}", format_permutation(&p));
    println!("cost (A, B): {direct}");
    println!("cost (B, A) [dualized]: {dual}");

    let target = if instance.opt > 0 {
        Some(instance.opt)
    } else if instance.bks > 0 {
        Some(instance.bks)
    } else {
        None
    };
    if let Some(target) = target {
        println!("known target: {target}");
        match (direct == target, dual == target) {
            (true, false) => println!("matches the (A, B) orientation"),
            (false, true) => {
                println!("matches only the dualized (B, A) orientation — A and B may be swapped in the instance file")
            }
            (true, true) => println!("matches both orientations (symmetric instance)"),
            (false, false) => println!("matches neither orientation"),
        }
    }
    Ok(())
}
