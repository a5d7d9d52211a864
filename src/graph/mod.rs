//! In-memory target graph.
//!
//! A [`Graph`] is built once per invocation from a parsed manifest and is
//! read-only afterwards. Prerequisite names are resolved at load time into
//! either a reference to another declared [`Target`] or a bare file path; the
//! graph is guaranteed acyclic.
//!
//! # Examples
//!
//! ```
//! use camino::Utf8Path;
//! use taskweave::graph::{Artifact, Graph, Prerequisite};
//!
//! let yaml = "taskweave_version: \"1.0.0\"\n\
//!             targets:\n\
//!             \x20 - name: out.bin\n\
//!             \x20   deps: source.txt\n\
//!             \x20   commands: cp source.txt out.bin\n";
//! let manifest = taskweave::manifest::from_str(yaml).expect("parse");
//! let graph = Graph::from_manifest(&manifest, Utf8Path::new(".")).expect("graph");
//! let target = graph.get("out.bin").expect("target");
//! assert_eq!(target.artifact, Artifact::Concrete("out.bin".into()));
//! assert_eq!(target.prerequisites, vec![Prerequisite::File("source.txt".into())]);
//! assert_eq!(graph.default_target().name, "out.bin");
//! ```

mod from_manifest;

use std::collections::HashMap;

use crate::resolve::Cycle;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use miette::Diagnostic;
use thiserror::Error;

/// What a target produces on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// A file, relative to the graph root.
    Concrete(Utf8PathBuf),
    /// No file correspondence; the target is always due.
    Abstract,
}

/// A resolved prerequisite reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prerequisite {
    /// Another declared target, by name.
    Target(String),
    /// A bare path relative to the graph root.
    File(Utf8PathBuf),
}

/// A named unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Unique name.
    pub name: String,
    /// Optional summary.
    pub description: Option<String>,
    /// Prerequisites in declaration order.
    pub prerequisites: Vec<Prerequisite>,
    /// Shell commands in declaration order.
    pub commands: Vec<String>,
    /// File produced, if any.
    pub artifact: Artifact,
}

impl Target {
    /// Whether the target was declared phony.
    #[must_use]
    pub const fn is_phony(&self) -> bool {
        matches!(self.artifact, Artifact::Abstract)
    }
}

/// Validated target graph.
#[derive(Debug, Clone)]
pub struct Graph {
    targets: IndexMap<String, Target>,
    default: String,
    root: Utf8PathBuf,
    producers: HashMap<Utf8PathBuf, String>,
}

impl Graph {
    /// Look up a target by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    /// Look up the target whose artefact is `path`.
    #[must_use]
    pub fn producer_of(&self, path: &Utf8Path) -> Option<&Target> {
        self.producers
            .get(path)
            .and_then(|name| self.targets.get(name))
    }

    /// Iterate targets in manifest order.
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    /// Number of declared targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the graph has no targets. Always `false` for a loaded graph.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// The target selected when no name is supplied.
    ///
    /// # Panics
    ///
    /// Never panics for graphs built by [`Graph::from_manifest`], which
    /// validates that the default names a declared target.
    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        reason = "default is validated against the target map at load time"
    )]
    pub fn default_target(&self) -> &Target {
        &self.targets[self.default.as_str()]
    }

    /// Directory artefacts and file prerequisites are relative to.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Resolve a path declared in the manifest against the graph root.
    #[must_use]
    pub fn locate(&self, path: &Utf8Path) -> Utf8PathBuf {
        self.root.join(path)
    }
}

/// Errors raised while building a [`Graph`].
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    /// Two targets share a name.
    #[error("target '{name}' is declared more than once")]
    #[diagnostic(code(taskweave::graph::duplicate_target))]
    DuplicateTarget {
        /// Repeated name.
        name: String,
    },

    /// Two targets claim the same artefact.
    #[error("targets '{first}' and '{second}' both produce '{output}'")]
    #[diagnostic(code(taskweave::graph::duplicate_output))]
    DuplicateOutput {
        /// Shared artefact path.
        output: Utf8PathBuf,
        /// Target declared first.
        first: String,
        /// Target declared later.
        second: String,
    },

    /// The declared default names no target.
    #[error("default target '{name}' is not declared")]
    #[diagnostic(code(taskweave::graph::unknown_default))]
    UnknownDefault {
        /// Name given as default.
        name: String,
    },

    /// The manifest declares no targets.
    #[error("manifest declares no targets")]
    #[diagnostic(code(taskweave::graph::empty))]
    EmptyGraph,

    /// The prerequisite relation contains a cycle.
    #[error("dependency cycle detected: {cycle}")]
    #[diagnostic(
        code(taskweave::graph::cycle),
        help("remove one of the prerequisites along the cycle")
    )]
    CyclicDependency {
        /// Canonicalised cycle path.
        cycle: Cycle,
    },
}
