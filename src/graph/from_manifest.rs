//! Manifest-to-graph conversion.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::ast::{TargetDecl, TaskManifest};
use crate::resolve;

use super::{Artifact, Graph, GraphError, Prerequisite, Target};

impl Graph {
    /// Transform a manifest into a [`Graph`] rooted at `root`.
    ///
    /// Prerequisite names are matched first against target names, then
    /// against declared artefact paths; anything else is treated as a bare
    /// file. Missing files are not reported here: they only matter once a
    /// staleness check needs their timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] for duplicate names or outputs, an undeclared
    /// default, an empty manifest, or a dependency cycle.
    pub fn from_manifest(manifest: &TaskManifest, root: &Utf8Path) -> Result<Self, GraphError> {
        let decls = index_declarations(&manifest.targets)?;
        let producers = index_outputs(&decls)?;

        let targets: IndexMap<String, Target> = decls
            .into_iter()
            .map(|(name, decl)| {
                let target = Target {
                    name: name.clone(),
                    description: decl.description.clone(),
                    prerequisites: decl
                        .deps
                        .to_vec()
                        .into_iter()
                        .map(|dep| classify(dep, &manifest.targets, &producers))
                        .collect(),
                    commands: decl.commands.to_vec(),
                    artifact: artifact_of(decl),
                };
                (name, target)
            })
            .collect();

        let default = select_default(manifest, &targets)?;
        let graph = Self {
            targets,
            default,
            root: root.to_owned(),
            producers,
        };

        if let Some(cycle) = resolve::find_cycle(&graph) {
            return Err(GraphError::CyclicDependency { cycle });
        }
        tracing::debug!(
            targets = graph.len(),
            default = %graph.default,
            root = %graph.root,
            "loaded target graph"
        );
        Ok(graph)
    }
}

fn index_declarations(decls: &[TargetDecl]) -> Result<IndexMap<String, &TargetDecl>, GraphError> {
    let mut map = IndexMap::with_capacity(decls.len());
    for decl in decls {
        match map.entry(decl.name.clone()) {
            Entry::Occupied(_) => {
                return Err(GraphError::DuplicateTarget {
                    name: decl.name.clone(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(decl);
            }
        }
    }
    Ok(map)
}

fn artifact_of(decl: &TargetDecl) -> Artifact {
    if decl.phony {
        Artifact::Abstract
    } else {
        let path = decl.output.as_deref().unwrap_or(&decl.name);
        Artifact::Concrete(Utf8PathBuf::from(path))
    }
}

/// Map each artefact path to the target producing it.
fn index_outputs(
    decls: &IndexMap<String, &TargetDecl>,
) -> Result<HashMap<Utf8PathBuf, String>, GraphError> {
    let mut producers: HashMap<Utf8PathBuf, String> = HashMap::new();
    for (name, decl) in decls {
        let Artifact::Concrete(path) = artifact_of(decl) else {
            continue;
        };
        if let Some(first) = producers.get(&path) {
            return Err(GraphError::DuplicateOutput {
                output: path,
                first: first.clone(),
                second: name.clone(),
            });
        }
        producers.insert(path, name.clone());
    }
    Ok(producers)
}

fn classify(
    dep: String,
    decls: &[TargetDecl],
    producers: &HashMap<Utf8PathBuf, String>,
) -> Prerequisite {
    if decls.iter().any(|d| d.name == dep) {
        return Prerequisite::Target(dep);
    }
    let path = Utf8PathBuf::from(dep);
    producers.get(&path).map_or_else(
        || Prerequisite::File(path.clone()),
        |owner| Prerequisite::Target(owner.clone()),
    )
}

fn select_default(
    manifest: &TaskManifest,
    targets: &IndexMap<String, Target>,
) -> Result<String, GraphError> {
    match &manifest.default {
        Some(name) if targets.contains_key(name) => Ok(name.clone()),
        Some(name) => Err(GraphError::UnknownDefault { name: name.clone() }),
        None => targets
            .keys()
            .next()
            .cloned()
            .ok_or(GraphError::EmptyGraph),
    }
}
