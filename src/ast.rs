//! Taskweave manifest Abstract Syntax Tree structures.
//!
//! This module defines the data structures used to represent a parsed
//! `Taskfile`. They mirror the YAML schema; [`crate::manifest`] parses the YAML
//! with `serde_saphyr` and deserialises these types from the resulting tree.
//!
//! The following example shows how to parse a minimal manifest string:
//!
//! ```rust
//! use taskweave::ast::{StringOrList, TaskManifest};
//!
//! let yaml = "taskweave_version: \"1.0.0\"\ntargets:\n  - name: hello\n    commands: \"echo hi\"";
//! let manifest: TaskManifest = taskweave::manifest::from_str(yaml).expect("parse");
//! assert_eq!(manifest.targets[0].name, "hello");
//! assert_eq!(
//!     manifest.targets[0].commands,
//!     StringOrList::String("echo hi".into())
//! );
//! ```

use semver::Version;
use serde::{Deserialize, Serialize};

/// Top-level manifest structure parsed from a `Taskfile`.
///
/// ```yaml
/// taskweave_version: "1.0.0"
/// default: all
/// targets:
///   - name: all
///     phony: true
///     deps: [out.bin]
///   - name: out.bin
///     deps: source.txt
///     commands: cp source.txt out.bin
/// ```
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TaskManifest {
    /// Semantic version of the manifest format.
    pub taskweave_version: Version,

    /// Target built when no command line target is supplied.
    ///
    /// Falls back to the first declared target when omitted.
    #[serde(default)]
    pub default: Option<String>,

    /// Declared targets, in manifest order.
    pub targets: Vec<TargetDecl>,
}

/// A single target declaration.
///
/// The target name doubles as the artefact path unless `output` overrides it
/// or `phony` marks the target as having no artefact at all.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TargetDecl {
    /// Unique target name.
    pub name: String,

    /// Optional human-friendly summary shown by `--list`.
    #[serde(default)]
    pub description: Option<String>,

    /// Prerequisites: other target names, target outputs, or bare files.
    #[serde(default)]
    pub deps: StringOrList,

    /// Shell commands run in order when the target is due.
    #[serde(default)]
    pub commands: StringOrList,

    /// File produced by the commands when it differs from `name`.
    #[serde(default)]
    pub output: Option<String>,

    /// Declares that the target does not correspond to a real file.
    #[serde(default)]
    pub phony: bool,
}

/// A helper for fields that accept either a single string or a list of
/// strings.
///
/// It mirrors YAML syntax where a scalar or sequence is allowed. Empty values
/// deserialize to `StringOrList::Empty`.
///
/// ```yaml
/// # Scalar
/// deps: readme.md
/// # Sequence
/// deps:
///   - readme.md
///   - setup.cfg
/// ```
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StringOrList {
    /// No value provided.
    #[default]
    Empty,
    /// A single string item.
    String(String),
    /// A list of string items.
    List(Vec<String>),
}

impl StringOrList {
    /// Flatten the value into an owned list, preserving order.
    ///
    /// ```rust
    /// use taskweave::ast::StringOrList;
    /// let list = StringOrList::String("a".into());
    /// assert_eq!(list.to_vec(), vec!["a".to_owned()]);
    /// assert!(StringOrList::Empty.to_vec().is_empty());
    /// ```
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Empty => Vec::new(),
            Self::String(s) => vec![s.clone()],
            Self::List(v) => v.clone(),
        }
    }
}
