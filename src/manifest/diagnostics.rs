//! Translates manifest parsing errors into actionable diagnostics.
//!
//! [`ManifestSource`] retains the YAML text and [`ManifestName`] labels its
//! origin. [`map_yaml_error`] and [`map_data_error`] turn parser and
//! deserialisation failures into [`miette`] diagnostics carrying spans,
//! hints, and stable codes.

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_saphyr::{Error as YamlError, Location};
use std::fmt;
use thiserror::Error;

/// Substrings of parser messages paired with a hint for the operator.
const YAML_HINTS: [(&str, &str); 4] = [
    (
        "did not find expected '-'",
        "Start list items with '-' and ensure proper indentation.",
    ),
    (
        "mapping values are not allowed",
        "Check for a stray ':' or quote values containing ':'.",
    ),
    (
        "found character that cannot start any token",
        "Remove stray characters and indent with spaces only.",
    ),
    (
        "unknown escape character",
        "Use valid YAML escape sequences or quote the string.",
    ),
];

/// YAML source text for a manifest.
///
/// ```rust
/// use taskweave::manifest::ManifestSource;
/// let source = ManifestSource::from("targets: []");
/// assert_eq!(source.as_str(), "targets: []");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSource(String);

impl ManifestSource {
    /// View the stored text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for ManifestSource {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Display label for a manifest, usually its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestName(String);

impl ManifestName {
    /// Label a manifest for diagnostics.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Access the label.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ManifestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(taskweave::yaml::parse))]
struct YamlDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("parse error here")]
    span: Option<SourceSpan>,
    #[help]
    help: Option<String>,
    #[source]
    source: YamlError,
    message: String,
}

#[derive(Debug, Error, Diagnostic)]
#[error("{name}: {details}")]
#[diagnostic(code(taskweave::manifest::structure))]
struct DataDiagnostic {
    #[source]
    source: serde_json::Error,
    name: String,
    details: String,
}

/// Convert a 1-based line and column into a byte offset within `src`.
///
/// Columns count characters, not bytes. Offsets past the end of a line clamp
/// to the line end, and a trailing `\r` is never part of a line.
fn offset_of(src: &str, line: u64, column: u64) -> usize {
    let wanted_line = usize::try_from(line.saturating_sub(1)).unwrap_or(usize::MAX);
    let wanted_col = usize::try_from(column.saturating_sub(1)).unwrap_or(usize::MAX);
    let mut consumed = 0usize;
    for (idx, raw) in src.split_inclusive('\n').enumerate() {
        if idx == wanted_line {
            let text = raw.trim_end_matches('\n').trim_end_matches('\r');
            let within = text
                .char_indices()
                .nth(wanted_col)
                .map_or(text.len(), |(at, _)| at);
            return consumed + within;
        }
        consumed += raw.len();
    }
    src.len()
}

fn span_at(src: &str, loc: Location) -> SourceSpan {
    let at = offset_of(src, loc.line(), loc.column());
    let bytes = src.as_bytes();
    let is_break = |b: u8| b == b'\n' || b == b'\r';
    let start = match bytes.get(at) {
        Some(&b) if !is_break(b) => at,
        _ if at > 0 && bytes.get(at - 1).is_some_and(|b| !is_break(*b)) => at - 1,
        _ => at,
    };
    let len = usize::from(bytes.get(start).is_some_and(|b| !is_break(*b)));
    SourceSpan::new(start.into(), len)
}

fn indented_with_tab(src: &str, loc: Option<Location>) -> bool {
    let Some(loc) = loc else {
        return false;
    };
    let line_idx = usize::try_from(loc.line().saturating_sub(1)).unwrap_or(usize::MAX);
    src.lines().nth(line_idx).is_some_and(|line| {
        line.chars()
            .take_while(|c| c.is_whitespace())
            .any(|c| c == '\t')
    })
}

fn hint_for(message: &str, src: &str, loc: Option<Location>) -> Option<String> {
    if indented_with_tab(src, loc) {
        return Some("Use spaces for indentation; tabs are invalid in YAML.".to_owned());
    }
    let lower = message.to_lowercase();
    YAML_HINTS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, hint)| (*hint).to_owned())
}

/// Map a `serde_saphyr` parse error into a [`miette`] diagnostic.
///
/// The diagnostic points at the offending location when the parser reports
/// one and adds a hint for common mistakes such as tab indentation.
#[must_use]
pub fn map_yaml_error(
    err: YamlError,
    src: &ManifestSource,
    name: &ManifestName,
) -> Box<dyn Diagnostic + Send + Sync + 'static> {
    let loc = err.location();
    let (line, col) = loc.map_or((1, 1), |l| (l.line(), l.column()));
    let span = loc.map(|l| span_at(src.as_str(), l));
    let help = hint_for(&err.to_string(), src.as_str(), loc);
    let message = format!("YAML parse error at line {line}, column {col}: {err}");
    Box::new(YamlDiagnostic {
        src: NamedSource::new(name.as_str(), src.as_str().to_owned()),
        span,
        help,
        source: err,
        message,
    })
}

/// Map a structural (schema) error into a diagnostic without a span.
#[must_use]
pub fn map_data_error(
    err: serde_json::Error,
    name: &ManifestName,
) -> Box<dyn Diagnostic + Send + Sync + 'static> {
    let details = err.to_string();
    Box::new(DataDiagnostic {
        source: err,
        name: name.to_string(),
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn yaml_error(src: &str) -> YamlError {
        serde_saphyr::from_str::<serde_json::Value>(src).expect_err("YAML should be rejected")
    }

    #[rstest]
    #[case("one\ntwo\nthree", 3, 3, 10)]
    #[case("one\r\ntwo\r\nthree", 2, 2, 6)]
    #[case("short", 1, 42, 5)]
    #[case("é: x", 1, 2, 2)]
    fn offset_of_handles_lines_and_columns(
        #[case] src: &str,
        #[case] line: u64,
        #[case] column: u64,
        #[case] expected: usize,
    ) {
        assert_eq!(offset_of(src, line, column), expected);
    }

    #[rstest]
    fn tab_indentation_gets_a_hint() {
        let src = ManifestSource::from("\tkey: \"unterminated");
        let diag = map_yaml_error(
            yaml_error(src.as_str()),
            &src,
            &ManifestName::new("Taskfile"),
        );
        let help = diag.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("Use spaces"), "help was: {help}");
    }

    #[rstest]
    fn yaml_diagnostic_exposes_code() {
        let src = ManifestSource::from("targets: [1");
        let diag = map_yaml_error(
            yaml_error(src.as_str()),
            &src,
            &ManifestName::new("Taskfile"),
        );
        let code = diag.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("taskweave::yaml::parse"));
        assert!(diag.to_string().starts_with("YAML parse error at line"));
    }

    #[rstest]
    fn data_error_names_manifest() {
        let err = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid JSON");
        let diag = map_data_error(err, &ManifestName::new("ci/Taskfile"));
        assert!(diag.to_string().starts_with("ci/Taskfile: "));
        let code = diag.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("taskweave::manifest::structure"));
    }
}
