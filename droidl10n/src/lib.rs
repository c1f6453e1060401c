#![forbid(unsafe_code)]
//! Consistency checker and in-place editor for Android `strings.xml` translation trees.
//!
//! One `values/strings.xml` file is the English source of truth; each
//! `values-<qualifier>/strings.xml` is a translation of it. This crate parses those files
//! without losing their formatting, reports translation gaps and placeholder mismatches,
//! and edits entries in place.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use droidl10n::{CheckOptions, EscapeMode, ResDir};
//!
//! let res = ResDir::new("app/src/main/res");
//!
//! // Find crash-causing placeholder mismatches in every translation
//! let report = res.check(None, &CheckOptions::default())?;
//! println!("{} critical issues", report.total_critical());
//!
//! // Fix one of them
//! let mut doc = res.load("fr-rFR")?;
//! doc.set("welcome", "Bienvenue %1$s", EscapeMode::Default)?;
//! res.write("fr-rFR", &doc)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Features
//!
//! - Span-preserving parser: edits leave indentation, comments and line endings alone
//! - Incremental and full translation checks, with configurable exemptions
//! - Escaping and validation matched to what `aapt2` accepts
//! - Batch add/remove/sort across all language files with per-file outcomes

pub mod changes;
pub mod checker;
pub mod document;
pub mod editor;
pub mod error;
pub mod escape;
pub mod placeholder;
pub mod resdir;
pub mod traits;
pub mod types;
pub mod validation;

// Re-export most used types for easy consumption
pub use crate::{
    changes::{ChangeReport, detect_changes},
    checker::{
        CheckMode, CheckOptions, CheckReport, Exemptions, Issue, LanguageReport, Severity,
        check_language,
    },
    document::{Document, LineEnding},
    editor::EditOutcome,
    error::Error,
    escape::EscapeMode,
    resdir::{AddScope, BatchReport, Failure, FailureKind, OutcomeStatus, ResDir, SOURCE_LANGUAGE},
    types::{Entry, EntryKind, Plural, PluralQuantity, ResourceFile, Translation},
    validation::ValidationIssue,
};
