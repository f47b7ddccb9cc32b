//! Submit batch jobs to a SLURM cluster, one job per query file.
//!
//! Two binaries share this library: `run-blat-in-parallel` renders a BLAT
//! mapping script for each query file, and `run-in-parallel` renders a
//! user-supplied command template. Each rendered script is piped to the
//! `sbatch` system command on stdin, so nothing is ever written to disk by
//! these programs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::slurm::job::JobScript;
use crate::slurm::sbatch::Sbatch;

/// Shared command line arguments and help behaviour
pub mod cli;

/// Render sbatch scripts and submit them
pub mod slurm;

/// Submit one job per query file, in the order given on the command line.
///
/// Prints a status line before each submission. The first rendering or
/// submission error aborts the run; remaining query files are not attempted.
pub fn submit_all(job: &impl JobScript, queries: &[PathBuf], sbatch: &Sbatch) -> Result<()> {
    for query in queries {
        println!("Launching sbatch for '{}'", query.display());
        let script = job.script(query)?;
        debug!("generated sbatch script:\n{script}");
        let accepted = sbatch
            .submit(&script)
            .with_context(|| format!("submitting job for '{}'", query.display()))?;
        let stdout = accepted.stdout.trim_end();
        if !stdout.is_empty() {
            info!("sbatch: {stdout}");
        }
    }
    Ok(())
}
