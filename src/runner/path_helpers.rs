//! Path resolution helpers for the runner module.
//!
//! Centralises manifest and working directory logic so the main runner module
//! stays focused on dispatch.

use crate::cli::Cli;
use camino::Utf8PathBuf;
use std::path::PathBuf;

use super::RunnerError;

fn to_utf8(path: PathBuf) -> Result<Utf8PathBuf, RunnerError> {
    Utf8PathBuf::from_path_buf(path).map_err(|path| RunnerError::NonUtf8Path { path })
}

/// Directory that artefact paths are relative to and commands run in.
///
/// This is the `-C/--directory` option when given, otherwise the current
/// directory.
pub(super) fn resolve_root(cli: &Cli) -> Result<Utf8PathBuf, RunnerError> {
    cli.directory
        .clone()
        .map_or_else(|| Ok(Utf8PathBuf::from(".")), to_utf8)
}

/// Determine the manifest path respecting the CLI's directory option.
///
/// Relative manifest paths are resolved against the root; absolute ones are
/// used as given.
pub(super) fn resolve_manifest_path(cli: &Cli) -> Result<Utf8PathBuf, RunnerError> {
    let file = to_utf8(cli.file.clone())?;
    let resolved = match &cli.directory {
        Some(_) => resolve_root(cli)?.join(&file),
        None => file,
    };
    if resolved.file_name().is_none() {
        return Err(RunnerError::ManifestPathWithoutName { path: resolved });
    }
    Ok(resolved)
}

pub(super) fn ensure_manifest_exists(
    cli: &Cli,
    manifest_path: &Utf8PathBuf,
) -> Result<(), RunnerError> {
    if manifest_path.exists() {
        return Ok(());
    }
    let manifest_name = manifest_path.file_name().unwrap_or_default().to_owned();
    let directory = if cli.directory.is_some() {
        manifest_path
            .parent()
            .map_or_else(|| manifest_path.to_string(), ToString::to_string)
    } else {
        "the current directory".to_owned()
    };
    Err(RunnerError::ManifestNotFound {
        manifest_name,
        directory,
        path: manifest_path.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn cli(file: &str, directory: Option<&str>) -> Cli {
        Cli {
            file: PathBuf::from(file),
            directory: directory.map(PathBuf::from),
            ..Cli::default()
        }
    }

    #[rstest]
    #[case("Taskfile", None, "Taskfile")]
    #[case("Taskfile", Some("work"), "work/Taskfile")]
    #[case("ci/Taskfile", Some("work"), "work/ci/Taskfile")]
    fn manifest_path_respects_directory(
        #[case] file: &str,
        #[case] directory: Option<&str>,
        #[case] expected: &str,
    ) {
        let path = resolve_manifest_path(&cli(file, directory)).expect("path");
        assert_eq!(path, Utf8PathBuf::from(expected));
    }

    #[rstest]
    #[case(None, ".")]
    #[case(Some("work"), "work")]
    fn root_defaults_to_current_directory(
        #[case] directory: Option<&str>,
        #[case] expected: &str,
    ) {
        let root = resolve_root(&cli("Taskfile", directory)).expect("root");
        assert_eq!(root, Utf8PathBuf::from(expected));
    }

    #[rstest]
    fn missing_manifest_names_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let work = dir.path().join("work");
        let cli = cli("Taskfile", work.to_str());
        let path = resolve_manifest_path(&cli).expect("path");
        let err = ensure_manifest_exists(&cli, &path).expect_err("missing");
        let message = err.to_string();
        assert!(message.starts_with("no Taskfile found in "), "{message}");
        assert!(message.ends_with("work"), "{message}");
    }
}
