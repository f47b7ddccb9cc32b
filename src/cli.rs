use std::env;

use clap::{Args, CommandFactory, Parser};

use crate::slurm::job::SlurmResources;

/// Scheduler resource options shared by both binaries.
///
/// Defaults match the C3SE Glenn cluster the scripts were written for.
#[derive(Args, Debug)]
pub struct SlurmArgs {
    /// Number of nodes.
    #[arg(short = 'N', value_name = "N", default_value_t = 1)]
    pub nodes: u32,

    /// Slurm partition.
    #[arg(short = 'p', value_name = "PARTITION", default_value = "glenn")]
    pub partition: String,

    /// Slurm account.
    #[arg(short = 'A', value_name = "ACCOUNT", default_value = "SNIC2014-1-183")]
    pub account: String,

    /// Max runtime per job.
    #[arg(short = 't', value_name = "HH:MM:SS", default_value = "01:00:00")]
    pub walltime: String,
}

impl SlurmArgs {
    pub fn resources(&self) -> SlurmResources {
        SlurmResources {
            nodes: self.nodes,
            partition: self.partition.clone(),
            account: self.account.clone(),
            walltime: self.walltime.clone(),
        }
    }
}

/// Parse the command line, or print help and return `None` when the program
/// was started without any arguments.
///
/// Running without arguments is not an error: help is printed to stdout and
/// the caller is expected to exit with status 0 without submitting anything.
pub fn parse_or_help<T: Parser>() -> Option<T> {
    if env::args().len() < 2 {
        let _ = T::command().print_help();
        return None;
    }
    Some(T::parse())
}
