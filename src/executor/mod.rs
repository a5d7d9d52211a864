//! Sequential execution of a resolved plan.
//!
//! The [`Executor`] walks a [`Plan`] in order, asks the staleness
//! [`Evaluator`] whether each target is due, and runs the commands of due
//! targets one at a time through the platform shell. The first failing
//! command aborts the whole run; side effects of earlier commands are kept.
//!
//! Each command line is echoed to the executor's output sink before it runs,
//! make style, unless the run is silent or the command starts with `@`.

mod redaction;
mod shell;

use std::io::{self, Write};
use std::process::ExitStatus;

use indexmap::IndexMap;
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::graph::{Graph, Target};
use crate::resolve::Plan;
use crate::staleness::{Evaluator, Freshness, Propagation, RanTargets, StalenessError};

use redaction::redact_command;
use shell::CommandLine;

/// Per-target lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    /// Not yet considered.
    Pending,
    /// Judged up to date.
    Skipped,
    /// Commands are running.
    Running,
    /// Every command succeeded.
    Succeeded,
    /// A command failed; the run was aborted.
    Failed,
}

/// Options controlling a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Echo commands without running them.
    pub dry_run: bool,
    /// Do not echo commands.
    pub silent: bool,
    /// How prerequisites that ran affect their dependents.
    pub propagation: Propagation,
}

/// Counts reported after a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Targets whose commands ran (or would have, in a dry run).
    pub ran: usize,
    /// Targets judged up to date.
    pub skipped: usize,
}

/// Errors that abort a run.
#[derive(Debug, Error, Diagnostic)]
pub enum ExecError {
    /// A command exited unsuccessfully.
    #[error("target '{target}': command `{command}` failed ({status})")]
    #[diagnostic(code(taskweave::exec::command_failed))]
    CommandFailure {
        /// Target owning the command.
        target: String,
        /// Command text as run.
        command: String,
        /// Exit status reported by the shell.
        status: ExitStatus,
    },

    /// The shell could not be started.
    #[error("target '{target}': failed to spawn `{command}`")]
    #[diagnostic(code(taskweave::exec::spawn))]
    CommandSpawn {
        /// Target owning the command.
        target: String,
        /// Command text.
        command: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A staleness check failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Staleness(#[from] StalenessError),

    /// Echoing to the output sink failed.
    #[error("failed to write command echo")]
    #[diagnostic(code(taskweave::exec::output))]
    Output(#[source] io::Error),
}

/// Runs plans against a graph, writing command echoes to `W`.
#[derive(Debug)]
pub struct Executor<'g, W> {
    graph: &'g Graph,
    options: ExecOptions,
    out: W,
    ran: RanTargets,
    states: IndexMap<String, TargetState>,
}

impl<'g, W: Write> Executor<'g, W> {
    /// Create an executor for `graph`.
    pub fn new(graph: &'g Graph, options: ExecOptions, out: W) -> Self {
        Self {
            graph,
            options,
            out,
            ran: RanTargets::default(),
            states: IndexMap::new(),
        }
    }

    /// State of each target of the last run, in plan order.
    ///
    /// Targets after a failure remain [`TargetState::Pending`].
    #[must_use]
    pub const fn states(&self) -> &IndexMap<String, TargetState> {
        &self.states
    }

    /// Consume the executor, returning its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run every due target of `plan` in order.
    ///
    /// Each call is a fresh pass: targets that ran in an earlier call do not
    /// force their dependents.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError`] on the first failing command, spawn failure,
    /// staleness error, or echo failure. No later target is entered.
    pub fn run(&mut self, plan: &Plan<'g>) -> Result<RunSummary, ExecError> {
        self.states = plan
            .targets()
            .iter()
            .map(|t| (t.name.clone(), TargetState::Pending))
            .collect();
        self.ran = RanTargets::default();
        let evaluator = Evaluator::new(self.graph, self.options.propagation);
        let mut summary = RunSummary::default();

        for target in plan.targets() {
            match evaluator.is_due(target, &self.ran)? {
                Freshness::UpToDate => {
                    debug!(task = %target.name, "up to date");
                    self.set_state(target, TargetState::Skipped);
                    summary.skipped += 1;
                }
                Freshness::Due(reason) => {
                    debug!(task = %target.name, %reason, "target is due");
                    self.set_state(target, TargetState::Running);
                    if let Err(err) = self.run_commands(target) {
                        self.set_state(target, TargetState::Failed);
                        warn!(task = %target.name, "aborting run");
                        return Err(err);
                    }
                    self.set_state(target, TargetState::Succeeded);
                    self.ran.insert(&target.name);
                    summary.ran += 1;
                }
            }
        }
        Ok(summary)
    }

    fn set_state(&mut self, target: &Target, state: TargetState) {
        if let Some(slot) = self.states.get_mut(&target.name) {
            *slot = state;
        }
    }

    fn echo(&mut self, text: &str) -> Result<(), ExecError> {
        writeln!(self.out, "{text}").map_err(ExecError::Output)?;
        self.out.flush().map_err(ExecError::Output)
    }

    fn run_commands(&mut self, target: &Target) -> Result<(), ExecError> {
        for raw in &target.commands {
            let line = CommandLine::parse(raw);
            if line.echo && !self.options.silent {
                self.echo(line.text)?;
            }
            if self.options.dry_run {
                continue;
            }
            info!(
                task = %target.name,
                command = %redact_command(line.text),
                "running command"
            );
            let status = shell::run(line.text, self.graph.root()).map_err(|source| {
                ExecError::CommandSpawn {
                    target: target.name.clone(),
                    command: line.text.to_owned(),
                    source,
                }
            })?;
            if status.success() {
                continue;
            }
            if line.ignore_failure {
                warn!(task = %target.name, %status, "ignoring failed command");
                continue;
            }
            return Err(ExecError::CommandFailure {
                target: target.name.clone(),
                command: line.text.to_owned(),
                status,
            });
        }
        Ok(())
    }
}
