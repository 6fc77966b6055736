//! `qap-emit`: re-emits an instance file in the canonical whitespace-matrix
//! format. Useful for normalizing hand-edited instance files.

use clap::Parser;
use qap_solvers::cli::EmitArgs;
use qap_solvers::error::QapError;
use qap_solvers::instance::Instance;

fn main() -> Result<(), QapError> {
    let args = EmitArgs::parse();
    let instance = Instance::load(&args.instance_file)?;
    let text = instance.emit();

    match args.output_file {
        Some(path) => std::fs::write(path, text)?,
        None => print!("{text}"),
    }
    Ok(())
}
