//! Checks that a value will survive Android resource compilation.
//!
//! Every edit runs [`validate_value`] on the value as given by the user, before any
//! escaping, in both escape modes.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref UNQUOTED_ATTR: Regex = Regex::new(r#"\s+\w+=([^\s"'>][^\s>]*)"#).unwrap();
    static ref TAG: Regex = Regex::new(r"<(/?)(\w+(?::\w+)?)[^>]*>").unwrap();
    static ref NAMED_ENTITY: Regex = Regex::new(r"&(#?\w+);").unwrap();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("shell backtick escape detected (`\" or `'); pass the value without backticks")]
    BacktickEscape,

    #[error("invalid entity '&pos;'; use \\' for apostrophes")]
    TypoEntity,

    #[error("entity '&quot;' is not supported here; use \\\" instead")]
    QuotEntity,

    #[error("entity '&apos;' is not supported here; use \\' instead")]
    AposEntity,

    #[error("attribute value not quoted: {0}")]
    UnquotedAttribute(String),

    #[error("closing tag </{0}> without matching opening tag")]
    UnexpectedClosingTag(String),

    #[error("mismatched tags: <{open}> closed with </{close}>")]
    MismatchedTags { open: String, close: String },

    #[error("unclosed tag(s): {0}")]
    UnclosedTags(String),

    #[error("invalid entity reference(s): {0}; only &amp; &lt; &gt; and numeric entities are valid")]
    InvalidEntity(String),

    #[error("unterminated entity reference '{0}'; entities must end with ';'")]
    UnterminatedEntity(String),
}

/// Validates a value, returning the first problem found.
pub fn validate_value(value: &str) -> Result<(), ValidationIssue> {
    if ["`\"", "\"`", "`'", "'`"].iter().any(|p| value.contains(p)) {
        return Err(ValidationIssue::BacktickEscape);
    }
    if value.contains("&pos;") {
        return Err(ValidationIssue::TypoEntity);
    }
    if value.contains("&quot;") {
        return Err(ValidationIssue::QuotEntity);
    }
    if value.contains("&apos;") {
        return Err(ValidationIssue::AposEntity);
    }

    if value.contains('<') && value.contains('>') {
        check_markup(value)?;
    }

    check_entities(value)
}

fn check_markup(value: &str) -> Result<(), ValidationIssue> {
    if let Some(m) = UNQUOTED_ATTR.find(value) {
        return Err(ValidationIssue::UnquotedAttribute(m.as_str().trim().to_string()));
    }

    let mut stack: Vec<&str> = Vec::new();
    for caps in TAG.captures_iter(value) {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        let name = caps.get(2).map_or("", |m| m.as_str());
        if whole.ends_with("/>") {
            continue;
        }
        if caps.get(1).is_some_and(|m| m.as_str() == "/") {
            match stack.pop() {
                None => return Err(ValidationIssue::UnexpectedClosingTag(name.to_string())),
                Some(open) if open != name => {
                    return Err(ValidationIssue::MismatchedTags {
                        open: open.to_string(),
                        close: name.to_string(),
                    });
                }
                Some(_) => {}
            }
        } else {
            stack.push(name);
        }
    }

    if stack.is_empty() {
        Ok(())
    } else {
        let open: Vec<String> = stack.iter().map(|t| format!("<{}>", t)).collect();
        Err(ValidationIssue::UnclosedTags(open.join(", ")))
    }
}

fn is_allowed_entity(name: &str) -> bool {
    match name {
        "amp" | "lt" | "gt" => true,
        _ => match name.strip_prefix('#') {
            Some(hex) if hex.starts_with('x') || hex.starts_with('X') => {
                hex.len() > 1 && hex[1..].chars().all(|c| c.is_ascii_hexdigit())
            }
            Some(dec) => !dec.is_empty() && dec.chars().all(|c| c.is_ascii_digit()),
            None => false,
        },
    }
}

fn check_entities(value: &str) -> Result<(), ValidationIssue> {
    let mut invalid: Vec<&str> = Vec::new();
    for caps in NAMED_ENTITY.captures_iter(value) {
        let name = caps.get(1).map_or("", |m| m.as_str());
        let whole = caps.get(0).map_or("", |m| m.as_str());
        if !is_allowed_entity(name) && !invalid.contains(&whole) {
            invalid.push(whole);
        }
    }
    if !invalid.is_empty() {
        return Err(ValidationIssue::InvalidEntity(invalid.join(", ")));
    }

    // `&` followed by a word that never reaches `;`
    for (i, _) in value.match_indices('&') {
        let rest = &value[i + 1..];
        let word_len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '#'))
            .unwrap_or(rest.len());
        if word_len > 0 && !rest[word_len..].starts_with(';') {
            return Err(ValidationIssue::UnterminatedEntity(format!(
                "&{}",
                &rest[..word_len]
            )));
        }
    }
    Ok(())
}
