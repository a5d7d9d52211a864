//! Error types for the runner module.

use camino::Utf8PathBuf;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing an invocation.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The manifest file does not exist at the expected path.
    #[error("no {manifest_name} found in {directory}")]
    #[diagnostic(
        code(taskweave::runner::manifest_not_found),
        help("create a Taskfile or point --file / -C at an existing one")
    )]
    ManifestNotFound {
        /// File name of the expected manifest.
        manifest_name: String,
        /// Description of where it was looked for.
        directory: String,
        /// The path that was attempted.
        path: Utf8PathBuf,
    },

    /// A path given on the command line is not valid UTF-8.
    #[error("path {} is not valid UTF-8", .path.display())]
    #[diagnostic(code(taskweave::runner::non_utf8_path))]
    NonUtf8Path {
        /// Offending path.
        path: PathBuf,
    },

    /// The manifest path has no file name component.
    #[error("manifest path {path} does not name a file")]
    #[diagnostic(code(taskweave::runner::manifest_path))]
    ManifestPathWithoutName {
        /// Offending path.
        path: Utf8PathBuf,
    },
}
