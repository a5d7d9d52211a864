//! Redaction of secrets in logged command lines.
//!
//! Commands are echoed verbatim to the operator, but the structured log
//! records them with `key=value` words whose key looks sensitive masked.

use itertools::Itertools;

const SENSITIVE_KEYS: [&str; 7] = [
    "password",
    "token",
    "secret",
    "api_key",
    "apikey",
    "auth",
    "authorization",
];

fn is_sensitive_key(key: &str) -> bool {
    let key = key.trim_start_matches('-');
    SENSITIVE_KEYS
        .iter()
        .any(|candidate| key.eq_ignore_ascii_case(candidate))
}

fn redact_word(word: &str) -> String {
    match word.split_once('=') {
        Some((key, _)) if is_sensitive_key(key) => format!("{key}=***REDACTED***"),
        _ => word.to_owned(),
    }
}

/// Mask sensitive `key=value` words in a shell command for logging.
pub(super) fn redact_command(command: &str) -> String {
    command.split(' ').map(redact_word).join(" ")
}
