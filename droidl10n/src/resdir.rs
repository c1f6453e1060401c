//! Access to an Android `res/` tree and the batch operations that span its files.
//!
//! `values/strings.xml` is the source file; each `values-<qualifier>/strings.xml` whose
//! qualifier names a language is a translation. Configuration qualifiers such as `night`,
//! `v27` or `land` are not languages and are ignored.

use std::{
    fs,
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use unic_langid::LanguageIdentifier;

use crate::{
    checker::{CheckOptions, CheckReport, check_language},
    document::Document,
    editor::EditOutcome,
    error::Error,
    escape::EscapeMode,
    traits::Parser,
    types::{EntryKind, Plural, PluralQuantity},
};

/// Name used for the source file wherever a language is expected.
pub const SOURCE_LANGUAGE: &str = "source";

const STRINGS_FILE: &str = "strings.xml";

lazy_static! {
    static ref LANGUAGE_QUALIFIER: Regex =
        Regex::new(r"^(?:[a-z]{2,3}(?:-r[A-Z]{2})?|b\+[A-Za-z0-9+]+)$").unwrap();
}

/// `true` for `source` and its `values` alias.
pub fn is_source(language: &str) -> bool {
    language == SOURCE_LANGUAGE || language == "values"
}

/// `true` when a `values-*` suffix names a language (`fr`, `pt-rBR`, `b+sr+Latn`).
pub fn is_language_qualifier(qualifier: &str) -> bool {
    LANGUAGE_QUALIFIER.is_match(qualifier)
}

/// Converts a resource qualifier to a BCP 47 language identifier.
pub fn qualifier_to_langid(qualifier: &str) -> Option<LanguageIdentifier> {
    if !is_language_qualifier(qualifier) {
        return None;
    }
    let tag = match qualifier.strip_prefix("b+") {
        Some(rest) => rest.replace('+', "-"),
        None => qualifier.replace("-r", "-"),
    };
    tag.parse::<LanguageIdentifier>().ok()
}

/// `true` for English regional variants such as `en-rGB`.
pub fn is_english_variant(qualifier: &str) -> bool {
    qualifier_to_langid(qualifier).is_some_and(|id| id.language.as_str() == "en")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Applied,
    Skipped(String),
    Failed(Failure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The file, or the entry within it, does not exist.
    NotFound,
    /// The value was rejected before anything was written.
    Invalid,
    Other,
}

/// Why one target of a batch failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn is_not_found(&self) -> bool {
        self.kind == FailureKind::NotFound
    }
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        let kind = match &error {
            Error::FileNotFound(_) | Error::EntryNotFound { .. } => FailureKind::NotFound,
            Error::Validation { .. } => FailureKind::Invalid,
            _ => FailureKind::Other,
        };
        Failure {
            kind,
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of a batch operation on one target (a file, or an id within one file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub target: String,
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<Outcome>,
}

impl BatchReport {
    pub fn push(&mut self, target: impl Into<String>, status: OutcomeStatus) {
        self.outcomes.push(Outcome {
            target: target.into(),
            status,
        });
    }

    fn count(&self, pred: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    pub fn applied(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Applied))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn status_of(&self, target: &str) -> Option<&OutcomeStatus> {
        self.outcomes
            .iter()
            .find(|o| o.target == target)
            .map(|o| &o.status)
    }
}

/// Which files an `add` touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddScope {
    /// The source file and every translation.
    #[default]
    All,
    SourceOnly,
}

/// A resource directory such as `app/src/main/res`.
#[derive(Debug, Clone)]
pub struct ResDir {
    root: PathBuf,
}

impl ResDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn source_path(&self) -> PathBuf {
        self.root.join("values").join(STRINGS_FILE)
    }

    pub fn language_path(&self, language: &str) -> PathBuf {
        if is_source(language) {
            self.source_path()
        } else {
            self.root.join(format!("values-{}", language)).join(STRINGS_FILE)
        }
    }

    /// Sorted qualifiers of all translation files.
    pub fn languages(&self) -> Result<Vec<String>, Error> {
        let entries = fs::read_dir(&self.root)
            .map_err(|_| Error::FileNotFound(self.root.display().to_string()))?;
        let mut languages = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(qualifier) = name.strip_prefix("values-") else {
                continue;
            };
            if is_language_qualifier(qualifier) && entry.path().join(STRINGS_FILE).is_file() {
                languages.push(qualifier.to_string());
            }
        }
        languages.sort();
        Ok(languages)
    }

    pub fn load(&self, language: &str) -> Result<Document, Error> {
        let path = self.language_path(language);
        if !path.is_file() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }
        tracing::debug!(path = %path.display(), "loading");
        Document::read_from(&path).map_err(|e| locate(e, &path))
    }

    pub fn load_source(&self) -> Result<Document, Error> {
        self.load(SOURCE_LANGUAGE)
    }

    pub fn write(&self, language: &str, doc: &Document) -> Result<(), Error> {
        let path = self.language_path(language);
        tracing::debug!(path = %path.display(), "writing");
        doc.write_to(&path)
    }

    /// The `(kind, id)` order of the source file.
    pub fn source_order(&self) -> Result<Vec<(EntryKind, String)>, Error> {
        Ok(self.load_source()?.resource(SOURCE_LANGUAGE).order())
    }

    fn targets(&self, scope: AddScope) -> Result<Vec<String>, Error> {
        let mut targets = vec![SOURCE_LANGUAGE.to_string()];
        if scope == AddScope::All {
            targets.extend(self.languages()?);
        }
        Ok(targets)
    }

    /// Loads, edits and writes back one file, recording the outcome.
    fn apply_to(
        &self,
        report: &mut BatchReport,
        language: &str,
        skip_reason: &str,
        edit: impl FnOnce(&mut Document) -> Result<EditOutcome, Error>,
    ) {
        let result = self.load(language).and_then(|mut doc| match edit(&mut doc)? {
            EditOutcome::Applied => self.write(language, &doc).map(|_| EditOutcome::Applied),
            EditOutcome::Skipped => Ok(EditOutcome::Skipped),
        });
        let status = match result {
            Ok(EditOutcome::Applied) => OutcomeStatus::Applied,
            Ok(EditOutcome::Skipped) => OutcomeStatus::Skipped(skip_reason.to_string()),
            Err(e) => OutcomeStatus::Failed(e.into()),
        };
        report.push(language, status);
    }

    /// Adds a `<string>` to the source file, and to every translation unless
    /// `scope` is [`AddScope::SourceOnly`].
    pub fn add_string(
        &self,
        id: &str,
        value: &str,
        mode: EscapeMode,
        scope: AddScope,
    ) -> Result<BatchReport, Error> {
        let mut report = BatchReport::default();
        for language in self.targets(scope)? {
            self.apply_to(&mut report, &language, "string already exists", |doc| {
                doc.add(id, value, mode)
            });
        }
        Ok(report)
    }

    pub fn add_plural(
        &self,
        id: &str,
        pairs: &[(PluralQuantity, String)],
        mode: EscapeMode,
        scope: AddScope,
    ) -> Result<BatchReport, Error> {
        let mut report = BatchReport::default();
        for language in self.targets(scope)? {
            self.apply_to(&mut report, &language, "plurals already exists", |doc| {
                doc.add_plural(id, pairs, mode)
            });
        }
        Ok(report)
    }

    /// Removes every element named `id` from the source file and all translations.
    pub fn remove(&self, id: &str) -> Result<BatchReport, Error> {
        let mut report = BatchReport::default();
        for language in self.targets(AddScope::All)? {
            self.apply_to(&mut report, &language, "not found", |doc| doc.remove(id));
        }
        Ok(report)
    }

    /// Sorts one file, or every translation when `language` is `None`, by the source order.
    pub fn sort(&self, language: Option<&str>) -> Result<BatchReport, Error> {
        let order = self.source_order()?;
        let languages = match language {
            Some(language) => {
                let path = self.language_path(language);
                if !path.is_file() {
                    return Err(Error::FileNotFound(path.display().to_string()));
                }
                vec![language.to_string()]
            }
            None => self.languages()?,
        };

        let mut report = BatchReport::default();
        for language in languages {
            self.apply_to(&mut report, &language, "", |doc| {
                doc.sort(&order)?;
                Ok(EditOutcome::Applied)
            });
        }
        Ok(report)
    }

    /// Sets several `<string>` values in one file.
    ///
    /// Each pair is reported on its own; a failing id doesn't stop the others. The file is
    /// written once, if at least one value was set.
    pub fn set_batch(
        &self,
        language: &str,
        pairs: &[(String, String)],
        mode: EscapeMode,
        create: bool,
    ) -> Result<BatchReport, Error> {
        let path = self.language_path(language);
        let mut doc = self.load(language)?;
        let source = if is_source(language) {
            None
        } else {
            Some(self.load_source()?.resource(SOURCE_LANGUAGE))
        };

        let mut report = BatchReport::default();
        for (id, value) in pairs {
            if let Some(source) = &source {
                if !source.contains(EntryKind::String, id) {
                    let missing = Error::entry_not_found(
                        id.as_str(),
                        self.source_path().display().to_string(),
                    );
                    report.push(id.as_str(), OutcomeStatus::Failed(missing.into()));
                    continue;
                }
            }
            let result = if create {
                doc.set_or_create(id, value, mode).map(|_| ())
            } else {
                doc.set(id, value, mode)
            };
            let status = match result {
                Ok(()) => OutcomeStatus::Applied,
                Err(e) => OutcomeStatus::Failed(locate(e, &path).into()),
            };
            report.push(id.as_str(), status);
        }

        if report.applied() > 0 {
            self.write(language, &doc)?;
        }
        Ok(report)
    }

    pub fn get(&self, language: &str, id: &str, raw: bool) -> Result<String, Error> {
        let path = self.language_path(language);
        let doc = self.load(language)?;
        let value = if raw {
            doc.get_raw(id).map(str::to_string)
        } else {
            doc.get(id)
        };
        value.map_err(|e| locate(e, &path))
    }

    pub fn get_plurals(&self, language: &str, id: &str) -> Result<Plural, Error> {
        let path = self.language_path(language);
        self.load(language)?
            .get_plurals(id)
            .map_err(|e| locate(e, &path))
    }

    pub fn set_plurals(
        &self,
        language: &str,
        id: &str,
        pairs: &[(PluralQuantity, String)],
        mode: EscapeMode,
    ) -> Result<(), Error> {
        let path = self.language_path(language);
        let mut doc = self.load(language)?;
        doc.set_plurals(id, pairs, mode).map_err(|e| locate(e, &path))?;
        self.write(language, &doc)
    }

    /// Checks one translation, or all of them when `language` is `None`.
    ///
    /// Translations that fail to parse are skipped with a warning when checking everything.
    pub fn check(&self, language: Option<&str>, options: &CheckOptions) -> Result<CheckReport, Error> {
        let source = self.load_source()?.resource(SOURCE_LANGUAGE);
        let mut languages = Vec::new();
        match language {
            Some(language) => languages.push(check_language(
                &source,
                &self.load(language)?.resource(language),
                options,
            )),
            None => {
                for language in self.languages()? {
                    match self.load(&language) {
                        Ok(doc) => languages.push(check_language(
                            &source,
                            &doc.resource(language.as_str()),
                            options,
                        )),
                        Err(e) => tracing::warn!(%language, error = %e, "skipping unreadable file"),
                    }
                }
            }
        }
        Ok(CheckReport {
            mode: options.mode,
            languages,
        })
    }
}

/// Replaces the placeholder file name of an [`Error::EntryNotFound`] with the real path.
fn locate(error: Error, path: &Path) -> Error {
    match error {
        Error::EntryNotFound { id, .. } => Error::entry_not_found(id, path.display().to_string()),
        other => other,
    }
}
