//! Build sbatch scripts from templates and run the submission command

/// Render job script templates with slurm and program parameters
pub mod job;

/// Pipe a rendered script to the sbatch system command
pub mod sbatch;
