//! Temporary project directory for end-to-end scenarios.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use taskweave::graph::Graph;
use tempfile::TempDir;

use crate::{manifest_yaml, mtime};

/// A temporary directory acting as the root of a taskweave project.
#[derive(Debug)]
pub struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    /// Create an empty workspace.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created or its path is not
    /// valid UTF-8.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
        Self { _dir: dir, root }
    }

    /// Root directory of the workspace.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute path of `rel` inside the workspace.
    #[must_use]
    pub fn path(&self, rel: &str) -> Utf8PathBuf {
        self.root.join(rel)
    }

    /// Write `contents` to `rel`, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write(&self, rel: &str, contents: &str) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write file");
        self
    }

    /// Write a `Taskfile` whose body follows the version header.
    pub fn write_manifest(&self, body: &str) -> &Self {
        self.write("Taskfile", &manifest_yaml(body))
    }

    /// Read `rel` as a string.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be read.
    #[must_use]
    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).expect("read file")
    }

    /// Whether `rel` exists.
    #[must_use]
    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// Pin the modification time of `rel`; larger `secs` are newer.
    ///
    /// # Panics
    ///
    /// Panics if the time cannot be set.
    pub fn age(&self, rel: &str, secs: u64) -> &Self {
        mtime::shift_mtime(self.path(rel), secs).expect("set mtime");
        self
    }

    /// Parse `body` as a manifest and build a graph rooted at the workspace.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest or graph is invalid.
    pub fn graph(&self, body: &str) -> anyhow::Result<Graph> {
        let parsed = taskweave::manifest::from_str(&manifest_yaml(body))?;
        Ok(Graph::from_manifest(&parsed, &self.root)?)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}
