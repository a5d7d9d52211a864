//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the manifest, builds the target graph, and then either reports on
//! the graph (`--list`, `--graph`) or resolves and executes the requested
//! target.

mod error;
mod path_helpers;

pub use error::RunnerError;

use crate::cli::Cli;
use crate::dot::DotGraph;
use crate::executor::Executor;
use crate::graph::{Graph, Target};
use crate::{manifest, resolve};
use anyhow::{Context, Result};
use std::io::{self, Write};
use tracing::{debug, info};

use path_helpers::{ensure_manifest_exists, resolve_manifest_path, resolve_root};

/// Execute the parsed [`Cli`], writing command echoes and reports to stdout.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded, the graph is invalid,
/// the target cannot be resolved, or a command fails.
pub fn run(cli: &Cli) -> Result<()> {
    run_with_output(cli, io::stdout().lock())
}

/// Execute the parsed [`Cli`], writing command echoes and reports to `out`.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_output<W: Write>(cli: &Cli, mut out: W) -> Result<()> {
    let graph = load_graph(cli)?;
    if cli.list {
        return list_targets(&graph, &mut out).context("writing target list");
    }
    if cli.graph {
        return write!(out, "{}", DotGraph::new(&graph)).context("writing DOT graph");
    }
    handle_build(cli, &graph, out)
}

/// Load the manifest referenced by `cli` and build its target graph.
///
/// # Errors
///
/// Returns an error if the manifest is missing, unreadable, or invalid, or if
/// the graph fails validation.
pub fn load_graph(cli: &Cli) -> Result<Graph> {
    let manifest_path = resolve_manifest_path(cli)?;
    ensure_manifest_exists(cli, &manifest_path)?;
    let root = resolve_root(cli)?;

    let manifest = manifest::from_path(&manifest_path)
        .with_context(|| format!("loading manifest at {manifest_path}"))?;
    if tracing::enabled!(tracing::Level::DEBUG) {
        let ast_json =
            serde_json::to_string_pretty(&manifest).context("serialising manifest")?;
        debug!("AST:\n{ast_json}");
    }
    Graph::from_manifest(&manifest, &root).context("building target graph")
}

fn handle_build<W: Write>(cli: &Cli, graph: &Graph, out: W) -> Result<()> {
    let requested = cli
        .target
        .clone()
        .unwrap_or_else(|| graph.default_target().name.clone());
    let plan = resolve::resolve(graph, &requested)
        .with_context(|| format!("resolving target '{requested}'"))?;

    let mut executor = Executor::new(graph, cli.exec_options(), out);
    let summary = executor.run(&plan)?;
    info!(
        requested = %requested,
        ran = summary.ran,
        skipped = summary.skipped,
        "run complete"
    );
    if summary.ran == 0 {
        let mut out = executor.into_output();
        writeln!(out, "taskweave: '{requested}' is up to date.").context("writing summary")?;
    }
    Ok(())
}

fn describe(target: &Target) -> String {
    match (&target.description, target.is_phony()) {
        (Some(text), _) => text.clone(),
        (None, true) => "(phony)".to_owned(),
        (None, false) => String::new(),
    }
}

fn list_targets<W: Write>(graph: &Graph, out: &mut W) -> io::Result<()> {
    let width = graph.targets().map(|t| t.name.len()).max().unwrap_or(0);
    let default = graph.default_target().name.as_str();
    for target in graph.targets() {
        let marker = if target.name == default { '*' } else { ' ' };
        let line = format!("{marker} {:<width$}  {}", target.name, describe(target));
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}
