use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tinytemplate::{format_unescaped, TinyTemplate};

/// Scheduler parameters shared by every job in a run
///
/// Read once from the command line and never modified afterwards. One set of
/// resources fans out to N independent scripts, one per query file.
#[derive(Debug, Clone)]
pub struct SlurmResources {
    pub nodes: u32,
    pub partition: String,
    pub account: String,
    pub walltime: String,
}

/// Anything that can render a complete sbatch script for one query file.
///
/// Rendering is a pure function of the job parameters and the query path:
/// no I/O, and identical inputs produce byte-identical script text.
pub trait JobScript {
    fn script(&self, query: &Path) -> Result<String>;
}

/// A BLAT mapping job against a shared database file.
///
/// The generated script copies the database and query file to `$TMPDIR` on
/// the compute node, runs blat there, and copies the `.blast8` result back to
/// `outdir` under the launch directory. Those `cp` lines run on the cluster
/// node, not here, so missing files only surface when the job runs.
pub struct BlatJob {
    pub resources: SlurmResources,
    pub options: String,
    pub dbfile: PathBuf,
    pub outdir: String,
}

/// A generic job built from a user-supplied call template.
///
/// Every occurrence of `{query}` in the template is replaced with the query
/// file path exactly as given on the command line. A template without the
/// placeholder is emitted verbatim, identical for every query file.
pub struct CallJob {
    pub resources: SlurmResources,
    pub call: String,
}

/// included sbatch header template
static HEADER: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/header.txt"));

/// included BLAT staging and mapping template
static BLAT: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/blat.txt"));

/// Rendering context for the sbatch header
#[derive(Serialize)]
struct HeaderContext<'a> {
    nodes: u32,
    partition: &'a str,
    account: &'a str,
    walltime: &'a str,
}

/// Rendering context for the BLAT script body
#[derive(Serialize)]
struct BlatContext<'a> {
    dbfile: &'a str,
    dbname: &'a str,
    query_path: &'a str,
    query_name: &'a str,
    options: &'a str,
    stem: &'a str,
    outdir: &'a str,
}

/// Render the #SBATCH header lines using TinyTemplate
fn render_header(resources: &SlurmResources) -> Result<String> {
    let mut tt = TinyTemplate::new();
    // scripts are shell text, HTML escaping would mangle them
    tt.set_default_formatter(&format_unescaped);
    tt.add_template("header", HEADER).context("sbatch header template")?;

    let context = HeaderContext {
        nodes: resources.nodes,
        partition: &resources.partition,
        account: &resources.account,
        walltime: &resources.walltime,
    };
    tt.render("header", &context).context("render sbatch header")
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("path is not valid UTF-8: {}", path.display()))
}

fn base_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("no file name in path '{}'", path.display()))
}

/// Base name with its final extension stripped
fn stem(path: &Path) -> Result<&str> {
    path.file_stem()
        .and_then(|name| name.to_str())
        .with_context(|| format!("no file name in path '{}'", path.display()))
}

impl JobScript for BlatJob {
    fn script(&self, query: &Path) -> Result<String> {
        let mut tt = TinyTemplate::new();
        tt.set_default_formatter(&format_unescaped);
        tt.add_template("blat", BLAT).context("BLAT body template")?;

        // the db and query files are copied from their full paths but
        // referenced by base name once the script has cd'd into $TMPDIR
        let context = BlatContext {
            dbfile: path_str(&self.dbfile)?,
            dbname: base_name(&self.dbfile)?,
            query_path: path_str(query)?,
            query_name: base_name(query)?,
            options: &self.options,
            stem: stem(query)?,
            outdir: &self.outdir,
        };

        let header = render_header(&self.resources)?;
        let body = tt.render("blat", &context).context("render BLAT script body")?;
        Ok([header, body].concat())
    }
}

impl JobScript for CallJob {
    fn script(&self, query: &Path) -> Result<String> {
        let call = self.call.replace("{query}", path_str(query)?);
        let header = render_header(&self.resources)?;
        Ok(format!("{header}{call}\n"))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    const BLAT_OPTIONS: &str =
        "-out=blast8 -t=dnax -q=prot -tileSize=5 -minScore=15 -minIdentity=80";

    fn glenn_defaults() -> SlurmResources {
        SlurmResources {
            nodes: 1,
            partition: "glenn".to_string(),
            account: "SNIC2014-1-183".to_string(),
            walltime: "01:00:00".to_string(),
        }
    }

    fn blat_job(dbfile: &str, outdir: &str) -> BlatJob {
        BlatJob {
            resources: glenn_defaults(),
            options: BLAT_OPTIONS.to_string(),
            dbfile: dbfile.into(),
            outdir: outdir.to_string(),
        }
    }

    #[test]
    fn blat_script_with_default_resources() {
        let job = blat_job("db.fasta", "out");
        let script = job.script(Path::new("query1.fq")).unwrap();

        let expected = format!(
            "#!/usr/bin/env bash\n\
             #SBATCH -N 1\n\
             #SBATCH -p glenn\n\
             #SBATCH -A SNIC2014-1-183\n\
             #SBATCH -t 01:00:00\n\
             LAUNCHDIR=`pwd`\n\
             cp db.fasta $TMPDIR\n\
             cp query1.fq $TMPDIR\n\
             cd $TMPDIR\n\
             blat db.fasta query1.fq {BLAT_OPTIONS} query1.blast8\n\
             mkdir -p $LAUNCHDIR/out\n\
             cp query1.blast8 $LAUNCHDIR/out/query1.blast8\n"
        );
        assert_eq!(script, expected);
    }

    #[test]
    fn blat_copies_full_paths_but_calls_base_names() {
        let job = blat_job("/refs/hg19.fasta", "mappings");
        let script = job.script(Path::new("/data/reads/sample.fq")).unwrap();

        assert!(script.contains("cp /refs/hg19.fasta $TMPDIR\n"));
        assert!(script.contains("cp /data/reads/sample.fq $TMPDIR\n"));
        assert!(script.contains(&format!(
            "blat hg19.fasta sample.fq {BLAT_OPTIONS} sample.blast8\n"
        )));
        assert!(script.ends_with("cp sample.blast8 $LAUNCHDIR/mappings/sample.blast8\n"));
    }

    #[test]
    fn stem_strips_only_the_final_extension() {
        let job = blat_job("db.fasta", "mappings");
        let script = job.script(Path::new("reads.trimmed.fq")).unwrap();

        assert!(script.contains("reads.trimmed.blast8"));
        assert!(!script.contains("reads.blast8 "));
    }

    #[test]
    fn rendering_is_deterministic() {
        let job = blat_job("/refs/db.fasta", "out");
        let first = job.script(Path::new("q1.fq")).unwrap();
        let second = job.script(Path::new("q1.fq")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn query_without_file_name_is_an_error() {
        let job = blat_job("db.fasta", "out");
        assert!(job.script(Path::new("/")).is_err());
    }

    #[test]
    fn call_substitutes_the_raw_query_path() {
        let job = CallJob {
            resources: glenn_defaults(),
            call: "prog {query} -x".to_string(),
        };
        let script = job.script(Path::new("/data/sample1.fa")).unwrap();

        let last_line = script.lines().last().unwrap();
        assert_eq!(last_line, "prog /data/sample1.fa -x");
        assert!(script.ends_with('\n'));
    }

    #[test]
    fn call_substitutes_every_placeholder_occurrence() {
        let job = CallJob {
            resources: glenn_defaults(),
            call: "blat db.fasta {query} -out=blast8 {query}.blast8".to_string(),
        };
        let script = job.script(Path::new("s1.fq")).unwrap();
        assert!(script.ends_with("blat db.fasta s1.fq -out=blast8 s1.fq.blast8\n"));
    }

    #[test]
    fn call_without_placeholder_is_emitted_verbatim() {
        let job = CallJob {
            resources: glenn_defaults(),
            call: "echo hello".to_string(),
        };
        let one = job.script(Path::new("a.fq")).unwrap();
        let two = job.script(Path::new("b.fq")).unwrap();

        assert!(one.ends_with("echo hello\n"));
        // identical for every query file in the batch, accepted behaviour
        assert_eq!(one, two);
    }

    #[test]
    fn header_reflects_custom_resources() {
        let job = CallJob {
            resources: SlurmResources {
                nodes: 8,
                partition: "vera".to_string(),
                account: "SNIC2024-1-1".to_string(),
                walltime: "12:00:00".to_string(),
            },
            call: "true".to_string(),
        };
        let script = job.script(Path::new("q.fq")).unwrap();

        assert!(script.starts_with("#!/usr/bin/env bash\n"));
        assert!(script.contains("#SBATCH -N 8\n"));
        assert!(script.contains("#SBATCH -p vera\n"));
        assert!(script.contains("#SBATCH -A SNIC2024-1-1\n"));
        assert!(script.contains("#SBATCH -t 12:00:00\n"));
    }
}
