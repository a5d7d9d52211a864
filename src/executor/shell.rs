//! Shell invocation for target commands.

use std::io;
use std::process::{Command, ExitStatus};

use camino::Utf8Path;

#[cfg(windows)]
pub(super) const SHELL: &str = "cmd";
#[cfg(windows)]
pub(super) const SHELL_ARGS: &[&str] = &["/C"];

#[cfg(not(windows))]
pub(super) const SHELL: &str = "sh";
#[cfg(not(windows))]
pub(super) const SHELL_ARGS: &[&str] = &["-c"];

/// A command string with its make-style modifiers stripped.
///
/// A leading `@` suppresses echoing and a leading `-` ignores failure; both
/// may appear in either order before the command text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct CommandLine<'a> {
    pub(super) text: &'a str,
    pub(super) echo: bool,
    pub(super) ignore_failure: bool,
}

impl<'a> CommandLine<'a> {
    pub(super) fn parse(raw: &'a str) -> Self {
        let mut line = Self {
            text: raw.trim_start(),
            echo: true,
            ignore_failure: false,
        };
        loop {
            if let Some(rest) = line.text.strip_prefix('@') {
                line.echo = false;
                line.text = rest.trim_start();
            } else if let Some(rest) = line.text.strip_prefix('-') {
                line.ignore_failure = true;
                line.text = rest.trim_start();
            } else {
                return line;
            }
        }
    }
}

/// Run `command` through the platform shell in `cwd`, inheriting stdio, and
/// wait for it to finish.
///
/// # Errors
///
/// Returns an [`io::Error`] when the shell cannot be spawned.
pub(super) fn run(command: &str, cwd: &Utf8Path) -> io::Result<ExitStatus> {
    Command::new(SHELL)
        .args(SHELL_ARGS)
        .arg(command)
        .current_dir(cwd)
        .status()
}
