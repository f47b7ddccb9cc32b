//! Submit one BLAT mapping job per query file to SLURM.
//!
//! Each job stages the database and query file to node-local storage, runs
//! blat there, and copies the `.blast8` result back next to the launch
//! directory.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use run_in_parallel::cli::{self, SlurmArgs};
use run_in_parallel::slurm::job::BlatJob;
use run_in_parallel::slurm::sbatch::Sbatch;
use run_in_parallel::submit_all;

/// Run BLAT on multiple data files on C3SE Glenn.
#[derive(Parser, Debug)]
#[command(name = "run-blat-in-parallel")]
struct Cli {
    #[command(flatten)]
    slurm: SlurmArgs,

    /// Options to send to BLAT.
    #[arg(
        long,
        default_value = "-out=blast8 -t=dnax -q=prot -tileSize=5 -minScore=15 -minIdentity=80"
    )]
    options: String,

    /// Filename of the database to map against.
    #[arg(long, value_name = "DBFILE")]
    dbfile: PathBuf,

    /// Outdir to put mapping results.
    #[arg(long, default_value = "mappings")]
    outdir: String,

    /// Files to query against the database (can be many files).
    #[arg(required = true, value_name = "QUERY")]
    query: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let Some(cli) = cli::parse_or_help::<Cli>() else {
        return Ok(());
    };

    let job = BlatJob {
        resources: cli.slurm.resources(),
        options: cli.options,
        dbfile: cli.dbfile,
        outdir: cli.outdir,
    };
    submit_all(&job, &cli.query, &Sbatch::new())
}
