//! Placeholder extraction for format-string parity checks.
//!
//! A placeholder is anything the app substitutes at runtime: `%s`, `%d`, `%1$s`,
//! brace tokens like `{count}`, and whole `<xliff:g>…</xliff:g>` spans. A translation whose
//! placeholder count differs from the source crashes the formatter.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"(?s)%\d*\$?[sdif]|\{[^}]+\}|<xliff:g[^>]*>.*?</xliff:g>").unwrap();
}

/// Returns the placeholder tokens of a value in order of appearance.
/// Escaped percent signs (`%%`) are not placeholders.
pub fn extract_placeholders(value: &str) -> Vec<String> {
    let stripped = value.replace("%%", "");
    PLACEHOLDER
        .find_iter(&stripped)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn placeholder_count(value: &str) -> usize {
    extract_placeholders(value).len()
}

/// `true` when both values carry the same number of placeholders.
pub fn placeholders_match(source: &str, translation: &str) -> bool {
    placeholder_count(source) == placeholder_count(translation)
}
