//! Command line interface definition using clap.
//!
//! The interface mirrors `make`: an optional target name, a manifest path,
//! and a working directory. Reporting modes (`--list`, `--graph`) inspect the
//! loaded graph without running anything.

use clap::Parser;
use std::path::PathBuf;

use crate::executor::ExecOptions;
use crate::manifest::DEFAULT_MANIFEST;
use crate::staleness::Propagation;

/// Run targets from a YAML `Taskfile`, skipping those whose outputs are
/// already up to date.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the manifest file to use.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = DEFAULT_MANIFEST,
        env = "TASKWEAVE_FILE"
    )]
    pub file: PathBuf,

    /// Run as if started in this directory.
    ///
    /// Affects manifest lookup, artefact paths, and where commands run.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Print the commands that would run without running them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Do not echo commands before running them.
    #[arg(short, long)]
    pub silent: bool,

    /// Whether a prerequisite that ran forces its dependents to run.
    #[arg(
        long,
        value_enum,
        value_name = "MODE",
        default_value_t = Propagation::Force,
        env = "TASKWEAVE_PROPAGATE"
    )]
    pub propagate: Propagation,

    /// List declared targets and exit.
    #[arg(long, conflicts_with = "graph")]
    pub list: bool,

    /// Print the dependency graph in DOT format and exit.
    #[arg(long)]
    pub graph: bool,

    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Target to run; defaults to the manifest's default target.
    #[arg(value_name = "TARGET")]
    pub target: Option<String>,
}

impl Cli {
    /// Executor options selected on the command line.
    #[must_use]
    pub const fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            dry_run: self.dry_run,
            silent: self.silent,
            propagation: self.propagate,
        }
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_MANIFEST),
            directory: None,
            dry_run: false,
            silent: false,
            propagate: Propagation::Force,
            list: false,
            graph: false,
            verbose: false,
            target: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[rstest]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[rstest]
    fn defaults_select_taskfile_and_default_target() {
        let cli = Cli::try_parse_from(["taskweave"]).expect("parse");
        assert_eq!(cli.file, PathBuf::from("Taskfile"));
        assert_eq!(cli.target, None);
        assert_eq!(cli.exec_options(), ExecOptions::default());
    }

    #[rstest]
    #[case(&["taskweave", "docs"], Some("docs"), false, Propagation::Force)]
    #[case(&["taskweave", "-n", "build"], Some("build"), true, Propagation::Force)]
    #[case(
        &["taskweave", "--propagate", "timestamps"],
        None,
        false,
        Propagation::Timestamps
    )]
    fn parses_target_and_options(
        #[case] args: &[&str],
        #[case] target: Option<&str>,
        #[case] dry_run: bool,
        #[case] propagation: Propagation,
    ) {
        let cli = Cli::try_parse_from(args).expect("parse");
        assert_eq!(cli.target.as_deref(), target);
        assert_eq!(cli.dry_run, dry_run);
        assert_eq!(cli.propagate, propagation);
    }

    #[rstest]
    fn rejects_more_than_one_target() {
        assert!(Cli::try_parse_from(["taskweave", "a", "b"]).is_err());
    }

    #[rstest]
    fn list_conflicts_with_graph() {
        let err = Cli::try_parse_from(["taskweave", "--list", "--graph"]).expect_err("conflict");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
