//! Taskweave core library.
//!
//! A declarative task runner: targets with prerequisites and shell commands
//! are read from a YAML `Taskfile`, ordered so prerequisites run first, and
//! executed only when their artefacts are stale. The pipeline is
//! [`manifest`] → [`graph`] → [`resolve`] → [`staleness`] → [`executor`],
//! driven by [`runner`] from the [`cli`] definition.

pub mod ast;
pub mod cli;
pub mod dot;
pub mod executor;
pub mod graph;
pub mod manifest;
pub mod resolve;
pub mod runner;
pub mod staleness;
