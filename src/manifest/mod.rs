//! Manifest loading helpers.
//!
//! A `Taskfile` is parsed in two steps: `serde_saphyr` turns the YAML text into
//! a [`ManifestValue`] tree, then `serde_json` deserialises that tree into a
//! [`TaskManifest`]. Splitting the steps keeps syntax errors (with source
//! spans) apart from schema errors. A final validation pass checks the
//! manifest version and per-target constraints that serde cannot express.

use crate::ast::TaskManifest;
use camino::Utf8Path;
use miette::Diagnostic;
use std::{fs, io};
use thiserror::Error;

mod diagnostics;

pub use diagnostics::{ManifestName, ManifestSource, map_data_error, map_yaml_error};

/// JSON representation of a manifest node after YAML parsing.
pub type ManifestValue = serde_json::Value;

/// Manifest format major version understood by this build.
pub const SUPPORTED_MAJOR: u64 = 1;

/// Default manifest file name looked up in the working directory.
pub const DEFAULT_MANIFEST: &str = "Taskfile";

/// Errors raised while reading or validating a manifest.
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {path}")]
    #[diagnostic(
        code(taskweave::manifest::read),
        help("pass --file or run inside a directory containing a Taskfile")
    )]
    Read {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Manifest parsing failed and produced the supplied diagnostic.
    #[error("failed to parse manifest {name}")]
    #[diagnostic(code(taskweave::manifest::parse))]
    Parse {
        /// Manifest label.
        name: ManifestName,
        /// Underlying diagnostic reported by the parser.
        #[source]
        #[diagnostic_source]
        source: Box<dyn Diagnostic + Send + Sync + 'static>,
    },

    /// The manifest declares a format version this build cannot read.
    #[error("manifest {name} declares taskweave_version {found}; expected 1.x")]
    #[diagnostic(code(taskweave::manifest::version))]
    UnsupportedVersion {
        /// Manifest label.
        name: ManifestName,
        /// Version found in the manifest.
        found: semver::Version,
    },

    /// A target is both phony and declares an output file.
    #[error("target '{target}' is phony but declares output '{output}'")]
    #[diagnostic(
        code(taskweave::manifest::phony_output),
        help("drop `phony: true` or remove the `output` key")
    )]
    PhonyWithOutput {
        /// Offending target.
        target: String,
        /// Declared output.
        output: String,
    },
}

fn validate(manifest: &TaskManifest, name: &ManifestName) -> Result<(), ManifestError> {
    if manifest.taskweave_version.major != SUPPORTED_MAJOR {
        return Err(ManifestError::UnsupportedVersion {
            name: name.clone(),
            found: manifest.taskweave_version.clone(),
        });
    }
    for decl in &manifest.targets {
        if let (true, Some(output)) = (decl.phony, &decl.output) {
            return Err(ManifestError::PhonyWithOutput {
                target: decl.name.clone(),
                output: output.clone(),
            });
        }
    }
    Ok(())
}

fn from_str_named(yaml: &str, name: &ManifestName) -> Result<TaskManifest, ManifestError> {
    let doc: ManifestValue = serde_saphyr::from_str(yaml).map_err(|e| ManifestError::Parse {
        name: name.clone(),
        source: map_yaml_error(e, &ManifestSource::from(yaml), name),
    })?;
    let manifest: TaskManifest =
        serde_json::from_value(doc).map_err(|e| ManifestError::Parse {
            name: name.clone(),
            source: map_data_error(e, name),
        })?;
    validate(&manifest, name)?;
    Ok(manifest)
}

/// Parse a manifest from a YAML string.
///
/// # Errors
///
/// Returns [`ManifestError`] if the YAML is malformed, does not match the
/// schema, or fails validation.
///
/// ```rust
/// let yaml = "taskweave_version: \"1.0.0\"\ntargets:\n  - name: clean\n    phony: true";
/// let manifest = taskweave::manifest::from_str(yaml).expect("parse");
/// assert!(manifest.targets[0].phony);
/// ```
pub fn from_str(yaml: &str) -> Result<TaskManifest, ManifestError> {
    from_str_named(yaml, &ManifestName::new(DEFAULT_MANIFEST))
}

/// Load a [`TaskManifest`] from the given file path.
///
/// # Errors
///
/// Returns [`ManifestError::Read`] if the file cannot be read, or any parse
/// or validation error reported by [`from_str`].
pub fn from_path(path: impl AsRef<Utf8Path>) -> Result<TaskManifest, ManifestError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_string(),
        source,
    })?;
    from_str_named(&data, &ManifestName::new(path.as_str()))
}
