//! Execution order resolution.
//!
//! [`resolve`] walks the prerequisite relation depth first and emits each
//! target after all of its prerequisites, at most once, in first-visit order.
//! The walk tracks the active path so that a node met again while still on
//! that path is reported as a [`Cycle`]. [`find_cycle`] runs the same walk
//! across the whole graph and is used by the loader to reject cyclic
//! manifests before anything runs.

use std::collections::HashMap;
use std::fmt;

use camino::Utf8Path;
use itertools::Itertools;
use miette::Diagnostic;
use thiserror::Error;

use crate::graph::{Graph, Prerequisite, Target};

/// A closed dependency cycle, e.g. `a -> b -> a`.
///
/// The path is rotated so that its lexicographically smallest name comes
/// first, which keeps reports stable regardless of where the walk entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle(Vec<String>);

impl Cycle {
    fn new(open: Vec<String>) -> Self {
        Self(canonicalize(open))
    }

    /// Names along the cycle; the first name is repeated at the end.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" -> "))
    }
}

/// Rotate an open cycle path and close it by repeating its first name.
fn canonicalize(mut open: Vec<String>) -> Vec<String> {
    let start = open
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(idx, _)| idx);
    open.rotate_left(start);
    if let Some(first) = open.first().cloned() {
        open.push(first);
    }
    open
}

/// Ordered list of targets to consider for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan<'g> {
    targets: Vec<&'g Target>,
}

impl<'g> Plan<'g> {
    /// Targets in execution order.
    #[must_use]
    pub fn targets(&self) -> &[&'g Target] {
        &self.targets
    }

    /// Target names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&'g str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }

    /// Whether nothing needs considering, e.g. for a bare file request.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Errors raised by [`resolve`].
#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    /// The requested name is neither a target nor an existing file.
    #[error("no target named '{name}' and no such file")]
    #[diagnostic(
        code(taskweave::resolve::unknown_target),
        help("run with --list to see declared targets")
    )]
    UnknownTarget {
        /// Requested name.
        name: String,
    },

    /// A cycle is reachable from the requested target.
    #[error("dependency cycle detected: {cycle}")]
    #[diagnostic(code(taskweave::resolve::cycle))]
    CyclicDependency {
        /// Canonicalised cycle path.
        cycle: Cycle,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VisitState {
    Visiting,
    Visited,
}

struct Walker<'g> {
    graph: &'g Graph,
    stack: Vec<&'g str>,
    states: HashMap<&'g str, VisitState>,
    order: Vec<&'g Target>,
}

impl<'g> Walker<'g> {
    fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            stack: Vec::new(),
            states: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn is_visited(&self, name: &str) -> bool {
        matches!(self.states.get(name), Some(VisitState::Visited))
    }

    fn visit(&mut self, target: &'g Target) -> Result<(), Cycle> {
        let name = target.name.as_str();
        match self.states.get(name) {
            Some(VisitState::Visited) => return Ok(()),
            Some(VisitState::Visiting) => {
                let idx = self.stack.iter().position(|n| *n == name).unwrap_or(0);
                let open = self
                    .stack
                    .iter()
                    .skip(idx)
                    .map(|n| (*n).to_owned())
                    .collect();
                return Err(Cycle::new(open));
            }
            None => {
                self.states.insert(name, VisitState::Visiting);
            }
        }

        self.stack.push(name);
        for prereq in &target.prerequisites {
            let Prerequisite::Target(dep) = prereq else {
                continue;
            };
            match self.graph.get(dep) {
                Some(dep_target) => self.visit(dep_target)?,
                None => tracing::debug!(
                    dependent = name,
                    missing = %dep,
                    "skipping prerequisite missing from graph",
                ),
            }
        }
        self.stack.pop();

        self.states.insert(name, VisitState::Visited);
        self.order.push(target);
        Ok(())
    }
}

/// Compute the execution order for `name`.
///
/// `name` is matched against target names first, then against declared
/// artefact paths. A name matching neither that exists on disk under the
/// graph root is a satisfied leaf and yields an empty plan.
///
/// # Errors
///
/// Returns [`ResolveError::UnknownTarget`] when `name` is neither a target,
/// an artefact path, nor an existing file, and [`ResolveError::CyclicDependency`] when a cycle
/// is reachable from it.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use taskweave::graph::Graph;
/// use taskweave::resolve::resolve;
///
/// let yaml = "taskweave_version: \"1.0.0\"\n\
///             targets:\n\
///             \x20 - name: docs\n\
///             \x20   phony: true\n\
///             \x20   deps: readme_rst\n\
///             \x20 - name: readme_rst\n";
/// let manifest = taskweave::manifest::from_str(yaml).expect("parse");
/// let graph = Graph::from_manifest(&manifest, Utf8Path::new(".")).expect("graph");
/// let plan = resolve(&graph, "docs").expect("plan");
/// assert_eq!(plan.names(), vec!["readme_rst", "docs"]);
/// ```
pub fn resolve<'g>(graph: &'g Graph, name: &str) -> Result<Plan<'g>, ResolveError> {
    let found = graph
        .get(name)
        .or_else(|| graph.producer_of(Utf8Path::new(name)));
    let Some(target) = found else {
        let on_disk = graph.locate(Utf8Path::new(name));
        if on_disk.exists() {
            tracing::debug!(path = %on_disk, "requested name is an existing file; nothing to do");
            return Ok(Plan::default());
        }
        return Err(ResolveError::UnknownTarget {
            name: name.to_owned(),
        });
    };
    resolve_target(graph, target)
}

/// Compute the execution order for the graph's default target.
///
/// # Errors
///
/// Returns [`ResolveError::CyclicDependency`] when a cycle is reachable.
pub fn resolve_default(graph: &Graph) -> Result<Plan<'_>, ResolveError> {
    resolve_target(graph, graph.default_target())
}

fn resolve_target<'g>(graph: &'g Graph, target: &'g Target) -> Result<Plan<'g>, ResolveError> {
    let mut walker = Walker::new(graph);
    walker
        .visit(target)
        .map_err(|cycle| ResolveError::CyclicDependency { cycle })?;
    tracing::debug!(
        requested = %target.name,
        plan = %walker.order.iter().map(|t| t.name.as_str()).join(", "),
        "resolved execution order"
    );
    Ok(Plan {
        targets: walker.order,
    })
}

/// Search the whole graph for a dependency cycle.
#[must_use]
pub fn find_cycle(graph: &Graph) -> Option<Cycle> {
    let mut walker = Walker::new(graph);
    for target in graph.targets() {
        if walker.is_visited(&target.name) {
            continue;
        }
        if let Err(cycle) = walker.visit(target) {
            return Some(cycle);
        }
    }
    None
}
