//! Timestamp-based staleness checks.
//!
//! Freshness is derived purely from filesystem modification times read when
//! a target is evaluated, together with the set of targets that already ran
//! earlier in the same pass. Nothing is cached between invocations.

use std::collections::HashSet;
use std::fmt;
use std::io;
use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use thiserror::Error;

use crate::graph::{Artifact, Graph, Prerequisite, Target};

/// How a prerequisite target that ran in this pass affects its dependents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Propagation {
    /// A prerequisite that ran always makes its dependents due.
    #[default]
    Force,
    /// Compare the prerequisite's artefact timestamp like any other file.
    /// Prerequisites without an artefact still count as newer once they ran.
    Timestamps,
}

/// Why a target must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DueReason {
    /// The target is phony.
    Phony,
    /// The artefact does not exist.
    MissingArtifact,
    /// A prerequisite is strictly newer than the artefact.
    NewerPrerequisite(String),
    /// A prerequisite target ran earlier in this pass.
    PrerequisiteRan(String),
}

impl fmt::Display for DueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phony => f.write_str("phony"),
            Self::MissingArtifact => f.write_str("artefact missing"),
            Self::NewerPrerequisite(name) => write!(f, "'{name}' is newer"),
            Self::PrerequisiteRan(name) => write!(f, "'{name}' ran"),
        }
    }
}

/// Outcome of a staleness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// The target must run.
    Due(DueReason),
    /// The artefact is current.
    UpToDate,
}

impl Freshness {
    /// Whether the target must run.
    #[must_use]
    pub const fn is_due(&self) -> bool {
        matches!(self, Self::Due(_))
    }
}

/// Names of targets that ran (or would have, in a dry run) in this pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RanTargets(HashSet<String>);

impl RanTargets {
    /// Record that `name` ran.
    pub fn insert(&mut self, name: &str) {
        self.0.insert(name.to_owned());
    }

    /// Whether `name` ran.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

/// Errors raised while reading timestamps.
#[derive(Debug, Error, Diagnostic)]
pub enum StalenessError {
    /// A bare file prerequisite does not exist.
    #[error("target '{target}' depends on '{prerequisite}', which is neither a target nor an existing file")]
    #[diagnostic(code(taskweave::staleness::unresolved_reference))]
    UnresolvedReference {
        /// Dependent target.
        target: String,
        /// Missing prerequisite path.
        prerequisite: Utf8PathBuf,
    },

    /// Metadata could not be read for a reason other than absence.
    #[error("failed to read modification time of {path}")]
    #[diagnostic(code(taskweave::staleness::metadata))]
    Metadata {
        /// Path being inspected.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Modification time of `path`, or `None` when it does not exist.
fn mtime(path: &Utf8Path) -> Result<Option<SystemTime>, StalenessError> {
    let to_error = |source| StalenessError::Metadata {
        path: path.to_owned(),
        source,
    };
    match path.metadata() {
        Ok(meta) => meta.modified().map(Some).map_err(to_error),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(to_error(err)),
    }
}

/// Decides whether targets are due.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'g> {
    graph: &'g Graph,
    propagation: Propagation,
}

impl<'g> Evaluator<'g> {
    /// Create an evaluator over `graph`.
    #[must_use]
    pub const fn new(graph: &'g Graph, propagation: Propagation) -> Self {
        Self { graph, propagation }
    }

    fn artifact_time(&self, artifact: &Artifact) -> Result<Option<SystemTime>, StalenessError> {
        match artifact {
            Artifact::Abstract => Ok(None),
            Artifact::Concrete(path) => mtime(&self.graph.locate(path)),
        }
    }

    /// Decide whether `target` must run given the targets that already ran.
    ///
    /// Equal timestamps count as up to date. When the artefact exists every
    /// prerequisite is checked, so a missing bare file is reported no matter
    /// where it appears in the list; the reason given is the first one found.
    ///
    /// # Errors
    ///
    /// Returns [`StalenessError::UnresolvedReference`] when a bare file
    /// prerequisite is missing and its timestamp is needed, or
    /// [`StalenessError::Metadata`] when a timestamp cannot be read.
    pub fn is_due(&self, target: &Target, ran: &RanTargets) -> Result<Freshness, StalenessError> {
        let Artifact::Concrete(path) = &target.artifact else {
            return Ok(Freshness::Due(DueReason::Phony));
        };
        let Some(built) = mtime(&self.graph.locate(path))? else {
            return Ok(Freshness::Due(DueReason::MissingArtifact));
        };

        let mut due = None;
        for prereq in &target.prerequisites {
            let reason = self.check_prerequisite(target, prereq, built, ran)?;
            if due.is_none() {
                due = reason;
            }
        }
        Ok(due.map_or(Freshness::UpToDate, Freshness::Due))
    }

    fn check_prerequisite(
        &self,
        target: &Target,
        prereq: &Prerequisite,
        built: SystemTime,
        ran: &RanTargets,
    ) -> Result<Option<DueReason>, StalenessError> {
        match prereq {
            Prerequisite::File(file) => {
                let Some(changed) = mtime(&self.graph.locate(file))? else {
                    return Err(StalenessError::UnresolvedReference {
                        target: target.name.clone(),
                        prerequisite: file.clone(),
                    });
                };
                Ok((changed > built).then(|| DueReason::NewerPrerequisite(file.to_string())))
            }
            Prerequisite::Target(name) => {
                let ran_here = ran.contains(name);
                if ran_here && self.propagation == Propagation::Force {
                    return Ok(Some(DueReason::PrerequisiteRan(name.clone())));
                }
                let Some(dep) = self.graph.get(name) else {
                    return Ok(None);
                };
                Ok(match self.artifact_time(&dep.artifact)? {
                    Some(changed) if changed > built => {
                        Some(DueReason::NewerPrerequisite(name.clone()))
                    }
                    Some(_) => None,
                    None if ran_here => Some(DueReason::PrerequisiteRan(name.clone())),
                    None => None,
                })
            }
        }
    }
}
