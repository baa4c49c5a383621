//! Command-line entry point for the virtual memory simulator.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use virtmem::{workload, PolicyKind, Simulation, WorkloadKind};

#[derive(Parser, Debug)]
#[command(
    name = "virtmem",
    version,
    about = "Demand-paged virtual memory simulator with pluggable replacement policies"
)]
struct Cli {
    /// Number of virtual pages
    npages: usize,

    /// Number of physical frames
    nframes: usize,

    /// Replacement policy (rand|fifo|2fifo|custom)
    policy: PolicyKind,

    /// Memory-access workload (sort|scan|focus)
    workload: WorkloadKind,

    /// Seed for the random policy and the workload generators
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Path of the disk image backing the virtual address space
    #[arg(long, default_value = "myvirtualdisk")]
    disk: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("virtmem: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> virtmem::Result<()> {
    let mut sim = Simulation::new(
        &cli.disk,
        cli.npages,
        cli.nframes,
        cli.policy,
        Some(cli.seed),
    )?;

    let checksum = workload::run(cli.workload, &mut sim, cli.seed)?;

    println!(
        "{} workload complete, checksum = {checksum:#018x}",
        cli.workload
    );
    println!();
    println!("Statistics:");
    println!("=====================");
    println!("{}", sim.stats());

    Ok(())
}
