//! DOT rendering of the target graph.
//!
//! Targets are drawn as boxes (dashed for phony targets) and bare file
//! prerequisites as notes. Edges point from a prerequisite to the target that
//! needs it. Nodes follow manifest order so the output is stable.

use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use crate::graph::{Graph, Prerequisite};

/// Display adapter writing a [`Graph`] as a Graphviz digraph.
///
/// ```
/// use camino::Utf8Path;
/// use taskweave::{dot::DotGraph, graph::Graph};
///
/// let yaml = "taskweave_version: \"1.0.0\"\ntargets:\n  - name: clean\n    phony: true\n";
/// let manifest = taskweave::manifest::from_str(yaml).expect("parse");
/// let graph = Graph::from_manifest(&manifest, Utf8Path::new(".")).expect("graph");
/// let dot = DotGraph::new(&graph).to_string();
/// assert!(dot.contains("\"clean\" [shape=box, style=dashed];"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DotGraph<'a> {
    graph: &'a Graph,
}

impl<'a> DotGraph<'a> {
    /// Wrap `graph` for rendering.
    #[must_use]
    pub const fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }
}

/// Quote a node identifier, escaping backslashes and double quotes.
fn quoted(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

impl Display for DotGraph<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph taskweave {{")?;
        writeln!(f, "  rankdir=LR;")?;
        for target in self.graph.targets() {
            let style = if target.is_phony() { ", style=dashed" } else { "" };
            writeln!(f, "  {} [shape=box{style}];", quoted(&target.name))?;
        }

        let mut files = HashSet::new();
        for target in self.graph.targets() {
            for prereq in &target.prerequisites {
                if let Prerequisite::File(path) = prereq {
                    if files.insert(path.as_str()) {
                        writeln!(f, "  {} [shape=note];", quoted(path.as_str()))?;
                    }
                }
            }
        }

        for target in self.graph.targets() {
            let sources = target
                .prerequisites
                .iter()
                .map(|prereq| match prereq {
                    Prerequisite::Target(name) => name.as_str(),
                    Prerequisite::File(path) => path.as_str(),
                })
                .unique();
            for from in sources {
                writeln!(f, "  {} -> {};", quoted(from), quoted(&target.name))?;
            }
        }
        writeln!(f, "}}")
    }
}
