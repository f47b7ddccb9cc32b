//! Submit one SLURM job per query file, built from a user-supplied
//! command template.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use run_in_parallel::cli::{self, SlurmArgs};
use run_in_parallel::slurm::job::CallJob;
use run_in_parallel::slurm::sbatch::Sbatch;
use run_in_parallel::submit_all;

/// Run a program on multiple data files on C3SE Glenn.
#[derive(Parser, Debug)]
#[command(name = "run-in-parallel")]
struct Cli {
    #[command(flatten)]
    slurm: SlurmArgs,

    /// Program and arguments in a single quoted string, e.g.
    /// 'blat dbfile.fasta {query} -t=dnax q=prot {query}.blast8'.
    /// {query} is substituted for the filenames specified on the
    /// command line (one at a time).
    #[arg(long, default_value = "")]
    call: String,

    /// Query file(s).
    #[arg(required = true, value_name = "FILE")]
    query: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let Some(cli) = cli::parse_or_help::<Cli>() else {
        return Ok(());
    };

    let job = CallJob { resources: cli.slurm.resources(), call: cli.call };
    submit_all(&job, &cli.query, &Sbatch::new())
}
