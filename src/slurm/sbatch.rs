use std::ffi::OsString;
use std::io::{self, Write};
use std::process::{Command, Stdio};

use log::{debug, info};
use thiserror::Error;

/// The job submission command that scripts are piped to.
///
/// Defaults to `sbatch` from `$PATH`. The program blocks until the command
/// exits and captures both output streams; there is no timeout, so a hung
/// submission command blocks the whole run.
pub struct Sbatch {
    program: OsString,
    args: Vec<OsString>,
}

/// A submission the scheduler accepted, with whatever sbatch printed
/// (typically the job id line). The job id is not parsed or tracked.
#[derive(Debug)]
pub struct SbatchAccepted {
    pub stdout: String,
}

#[derive(Debug, Error)]
pub enum SbatchError {
    #[error("failed to start job submission command: {source}")]
    Spawn {
        #[source]
        source: io::Error,
    },
    #[error("failed writing script to job submission command: {0}")]
    Stream(#[source] io::Error),
    /// Anything on stderr counts as a rejection, whatever the exit status.
    /// Benign warnings are indistinguishable from real scheduler errors here,
    /// and both abort the batch.
    #[error("sbatch error: {stderr}")]
    Rejected { stderr: String },
}

impl Default for Sbatch {
    fn default() -> Self {
        Sbatch { program: "sbatch".into(), args: Vec::new() }
    }
}

impl Sbatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitute another executable for sbatch, used by tests
    pub(crate) fn with_program(program: &str, args: &[&str]) -> Self {
        Sbatch {
            program: program.into(),
            args: args.iter().map(OsString::from).collect(),
        }
    }

    /// Pipe one script to the submission command and wait for it to exit.
    ///
    /// The script only exists on the command's stdin; it is never written to
    /// disk by this program.
    pub fn submit(&self, script: &str) -> Result<SbatchAccepted, SbatchError> {
        debug!("running {:?} with script on stdin", self.program);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SbatchError::Spawn { source })?;

        let mut stdin = child.stdin.take().expect("piped stdin");
        stdin.write_all(script.as_bytes()).map_err(SbatchError::Stream)?;
        // close stdin so the command sees end-of-input
        drop(stdin);

        let output = child.wait_with_output().map_err(SbatchError::Stream)?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !stderr.is_empty() {
            return Err(SbatchError::Rejected { stderr });
        }

        info!("submission accepted, exit status {}", output.status);
        Ok(SbatchAccepted { stdout: String::from_utf8_lossy(&output.stdout).into_owned() })
    }
}
