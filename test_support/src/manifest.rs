//! Helpers for constructing manifest fixtures in tests.

/// Prefix the provided manifest body with the standard taskweave version header.
#[must_use]
pub fn manifest_yaml(body: &str) -> String {
    format!("taskweave_version: \"1.0.0\"\n{body}")
}
