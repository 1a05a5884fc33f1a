//! Column-name canonicalization

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());

/// Canonical form of a raw header
///
/// Trims the header, turns each whitespace run into one underscore and drops
/// every character outside `[A-Za-z0-9_]`. Case is preserved. The result may
/// be empty.
pub fn canonicalize(header: &str) -> String {
    let underscored = WHITESPACE_RUN.replace_all(header.trim(), "_");
    NON_IDENTIFIER.replace_all(&underscored, "").into_owned()
}

/// Canonicalize a header row, keeping order and duplicates
pub fn normalize_headers<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    headers.iter().map(|h| canonicalize(h.as_ref())).collect()
}
