//! All error types for the droidl10n crate.
//!
//! These are returned from every fallible operation (parsing, editing, directory access).

use thiserror::Error;

use crate::validation::ValidationIssue;

#[derive(Error, Debug)]
pub enum Error {
    #[error("resource file not found: {0}")]
    FileNotFound(String),

    #[error("entry `{id}` not found in {file}")]
    EntryNotFound { id: String, file: String },

    #[error("invalid value for `{id}`: {issue}")]
    Validation { id: String, issue: ValidationIssue },

    #[error("structural error: {0}")]
    Structural(String),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid resource: {0}")]
    InvalidResource(String),
}

impl Error {
    /// Creates a new entry-not-found error.
    pub fn entry_not_found(id: impl Into<String>, file: impl Into<String>) -> Self {
        Error::EntryNotFound {
            id: id.into(),
            file: file.into(),
        }
    }

    /// Creates a new validation error for the given entry id.
    pub fn validation(id: impl Into<String>, issue: ValidationIssue) -> Self {
        Error::Validation {
            id: id.into(),
            issue,
        }
    }

    /// Returns `true` for errors caused by the user's input rather than the files on disk.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::EntryNotFound { .. } | Error::Validation { .. })
    }
}
