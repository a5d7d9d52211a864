//! Test utilities for taskweave integration tests.
//!
//! This crate provides a temporary project workspace, manifest fixture
//! helpers, and modification time control for the staleness scenarios.

pub mod manifest;
pub mod mtime;
pub mod workspace;

pub use manifest::manifest_yaml;
pub use mtime::{set_mtime, shift_mtime};
pub use workspace::Workspace;
