//! Translation consistency checks.
//!
//! [`check_language`] compares one translated [`ResourceFile`] against the source file and
//! returns its issues in source order, followed by obsolete entries.
//!
//! Incremental mode only reports what breaks the app or leaves gaps: missing entries and
//! placeholder mismatches. Full mode adds the heuristics (untranslated copies, near matches,
//! obsolete entries). English regional variants are expected to mostly match the source, so
//! in full mode they get the opposite treatment: differences are reported instead.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    placeholder::extract_placeholders,
    resdir::is_english_variant,
    types::{EntryKind, Plural, PluralQuantity, ResourceFile, Translation},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMode {
    #[default]
    Incremental,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOptions {
    pub mode: CheckMode,
    /// Maximum character difference reported as a near match. `0` disables near matches.
    pub near_threshold: usize,
    pub exemptions: Exemptions,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            mode: CheckMode::Incremental,
            near_threshold: 1,
            exemptions: Exemptions::default(),
        }
    }
}

impl CheckOptions {
    pub fn full() -> Self {
        Self {
            mode: CheckMode::Full,
            ..Self::default()
        }
    }
}

/// Entries that are allowed to stay identical to the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exemptions {
    /// Source values understood in every language.
    pub terms: Vec<String>,
    pub id_prefixes: Vec<String>,
    pub ids: Vec<String>,
    /// Source values of at most this many characters are exempt.
    pub max_exempt_length: usize,
}

impl Default for Exemptions {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            terms: owned(&[
                "WebView",
                "Android",
                "iOS",
                "Linux",
                "macOS",
                "Windows",
                "Desktop",
                "Mobile",
                "JavaScript",
                "Cookies",
                "Port:",
                "LeakCanary",
            ]),
            id_prefixes: owned(&["agent_", "log_level_"]),
            ids: owned(&[
                "android_open_source_project",
                "jsoup",
                "infinity",
                "search_action",
            ]),
            max_exempt_length: 3,
        }
    }
}

impl Exemptions {
    /// Exemption by id alone.
    pub fn is_exempt_id(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id) || self.id_prefixes.iter().any(|p| id.starts_with(p))
    }

    /// Exemption by id or by source value: short values, international terms and
    /// `@string/` aliases. Such entries are neither missing nor untranslated.
    pub fn is_exempt_entry(&self, id: &str, source: &str) -> bool {
        self.is_exempt_id(id)
            || source.chars().count() <= self.max_exempt_length
            || self.terms.iter().any(|t| t == source)
            || source.contains("@string/")
    }

    /// Whether a translation identical (or nearly so) to its source is acceptable.
    pub fn allows_copy(&self, id: &str, source: &str, translation: &str) -> bool {
        self.is_exempt_entry(id, source) || translation.contains("@string/")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    Missing {
        id: String,
        entry_kind: EntryKind,
    },
    Untranslated {
        id: String,
        value: String,
    },
    NearMatch {
        id: String,
        distance: usize,
        source: String,
        translation: String,
    },
    PlaceholderMismatch {
        id: String,
        source: Vec<String>,
        translation: Vec<String>,
    },
    MissingPlural {
        id: String,
    },
    UntranslatedPluralQuantity {
        id: String,
        quantity: PluralQuantity,
        value: String,
    },
    PluralPlaceholderMismatch {
        id: String,
        quantity: PluralQuantity,
        source: Vec<String>,
        translation: Vec<String>,
    },
    DiffersFromSource {
        id: String,
        source: String,
        translation: String,
    },
    PluralDiffersFromSource {
        id: String,
        quantity: PluralQuantity,
        source: String,
        translation: String,
    },
    Obsolete {
        id: String,
        entry_kind: EntryKind,
    },
}

impl Issue {
    pub fn id(&self) -> &str {
        match self {
            Issue::Missing { id, .. }
            | Issue::Untranslated { id, .. }
            | Issue::NearMatch { id, .. }
            | Issue::PlaceholderMismatch { id, .. }
            | Issue::MissingPlural { id }
            | Issue::UntranslatedPluralQuantity { id, .. }
            | Issue::PluralPlaceholderMismatch { id, .. }
            | Issue::DiffersFromSource { id, .. }
            | Issue::PluralDiffersFromSource { id, .. }
            | Issue::Obsolete { id, .. } => id,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Issue::PlaceholderMismatch { .. } | Issue::PluralPlaceholderMismatch { .. } => {
                Severity::Critical
            }
            Issue::Obsolete { .. } | Issue::DiffersFromSource { .. } => Severity::Info,
            Issue::PluralDiffersFromSource { .. } => Severity::Info,
            _ => Severity::Warning,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity() == Severity::Critical
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Issue::Missing { id, entry_kind } => write!(f, "Missing {}: {}", entry_kind, id),
            Issue::Untranslated { id, value } => write!(f, "Untranslated: {} = '{}'", id, value),
            Issue::NearMatch {
                id,
                distance,
                source,
                translation,
            } => write!(
                f,
                "Near match ({} chars): {}\n    EN: '{}'\n    TR: '{}'",
                distance, id, source, translation
            ),
            Issue::PlaceholderMismatch {
                id,
                source,
                translation,
            } => write!(
                f,
                "[CRITICAL] Placeholder mismatch: {}\n    English: {:?}\n    Translation: {:?}",
                id, source, translation
            ),
            Issue::MissingPlural { id } => write!(f, "Missing plurals: {}", id),
            Issue::UntranslatedPluralQuantity {
                id,
                quantity,
                value,
            } => write!(f, "Plurals '{}' untranslated: {}: '{}'", id, quantity, value),
            Issue::PluralPlaceholderMismatch {
                id,
                quantity,
                source,
                translation,
            } => write!(
                f,
                "[CRITICAL] Plural placeholder mismatch: {} ({})\n    English: {:?}\n    Translation: {:?}",
                id, quantity, source, translation
            ),
            Issue::DiffersFromSource {
                id,
                source,
                translation,
            } => write!(
                f,
                "Differs from source: {}\n    EN: '{}'\n    TR: '{}'",
                id, source, translation
            ),
            Issue::PluralDiffersFromSource {
                id,
                quantity,
                source,
                translation,
            } => write!(
                f,
                "Plurals '{}' differ from source: {}: '{}' vs '{}'",
                id, quantity, source, translation
            ),
            Issue::Obsolete { id, entry_kind } => write!(f, "Obsolete {}: {}", entry_kind, id),
        }
    }
}

/// Issues of one translated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageReport {
    pub language: String,
    pub issues: Vec<Issue>,
}

impl LanguageReport {
    pub fn critical_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_critical()).count()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub mode: CheckMode,
    pub languages: Vec<LanguageReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub languages_checked: usize,
    pub languages_with_issues: usize,
    pub clean_languages: usize,
    pub critical_issues: usize,
}

impl CheckReport {
    pub fn summary(&self) -> CheckSummary {
        let with_issues = self.languages.iter().filter(|r| !r.is_clean()).count();
        CheckSummary {
            languages_checked: self.languages.len(),
            languages_with_issues: with_issues,
            clean_languages: self.languages.len() - with_issues,
            critical_issues: self.total_critical(),
        }
    }

    pub fn total_critical(&self) -> usize {
        self.languages.iter().map(LanguageReport::critical_count).sum()
    }

    pub fn has_critical(&self) -> bool {
        self.total_critical() > 0
    }
}

/// Positional mismatches over the overlapping characters plus the length difference.
///
/// This is not an edit distance: `"abc"` and `"bca"` differ by 3.
pub fn char_difference(a: &str, b: &str) -> usize {
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    let mismatches = a.chars().zip(b.chars()).filter(|(x, y)| x != y).count();
    mismatches + len_a.abs_diff(len_b)
}

/// Checks one translated file against the source file.
pub fn check_language(
    source: &ResourceFile,
    translation: &ResourceFile,
    options: &CheckOptions,
) -> LanguageReport {
    let full = options.mode == CheckMode::Full;
    let english = is_english_variant(&translation.language);
    let mut issues = Vec::new();

    for entry in source.entries.iter().filter(|e| e.translatable) {
        match &entry.value {
            Translation::Singular(source_value) => match translation.string(&entry.id) {
                None => {
                    if !options.exemptions.is_exempt_entry(&entry.id, source_value) {
                        issues.push(Issue::Missing {
                            id: entry.id.clone(),
                            entry_kind: EntryKind::String,
                        });
                    }
                }
                Some(value) => {
                    if full {
                        compare_copy(&entry.id, source_value, value, english, options, &mut issues);
                    }
                    let (src, tr) = (extract_placeholders(source_value), extract_placeholders(value));
                    if src.len() != tr.len() {
                        issues.push(Issue::PlaceholderMismatch {
                            id: entry.id.clone(),
                            source: src,
                            translation: tr,
                        });
                    }
                }
            },
            Translation::Plural(source_plural) => match translation.plural(&entry.id) {
                None => issues.push(Issue::MissingPlural {
                    id: entry.id.clone(),
                }),
                Some(plural) => {
                    check_plural(&entry.id, source_plural, plural, full, english, &mut issues)
                }
            },
            Translation::Array(_) => {
                if !translation.contains(EntryKind::StringArray, &entry.id)
                    && !options.exemptions.is_exempt_id(&entry.id)
                {
                    issues.push(Issue::Missing {
                        id: entry.id.clone(),
                        entry_kind: EntryKind::StringArray,
                    });
                }
            }
        }
    }

    if full {
        for entry in &translation.entries {
            if !source.contains(entry.kind(), &entry.id) {
                issues.push(Issue::Obsolete {
                    id: entry.id.clone(),
                    entry_kind: entry.kind(),
                });
            }
        }
    }

    LanguageReport {
        language: translation.language.clone(),
        issues,
    }
}

fn compare_copy(
    id: &str,
    source: &str,
    translation: &str,
    english: bool,
    options: &CheckOptions,
    issues: &mut Vec<Issue>,
) {
    if options.exemptions.allows_copy(id, source, translation) {
        return;
    }
    if english {
        if source != translation {
            issues.push(Issue::DiffersFromSource {
                id: id.to_string(),
                source: source.to_string(),
                translation: translation.to_string(),
            });
        }
        return;
    }

    if source == translation {
        issues.push(Issue::Untranslated {
            id: id.to_string(),
            value: source.to_string(),
        });
    } else if options.near_threshold > 0 {
        let distance = char_difference(translation, source);
        if distance <= options.near_threshold {
            issues.push(Issue::NearMatch {
                id: id.to_string(),
                distance,
                source: source.to_string(),
                translation: translation.to_string(),
            });
        }
    }
}

fn check_plural(
    id: &str,
    source: &Plural,
    translation: &Plural,
    full: bool,
    english: bool,
    issues: &mut Vec<Issue>,
) {
    for (&quantity, value) in &translation.forms {
        let same_quantity = source.get(quantity);

        if full {
            if let Some(source_value) = same_quantity {
                if english && source_value != value {
                    issues.push(Issue::PluralDiffersFromSource {
                        id: id.to_string(),
                        quantity,
                        source: source_value.to_string(),
                        translation: value.clone(),
                    });
                } else if !english && source_value == value && source_value.chars().count() > 3 {
                    issues.push(Issue::UntranslatedPluralQuantity {
                        id: id.to_string(),
                        quantity,
                        value: value.clone(),
                    });
                }
            }
        }

        let reference = same_quantity.or_else(|| source.get(PluralQuantity::Other));
        if let Some(reference) = reference {
            let (src, tr) = (extract_placeholders(reference), extract_placeholders(value));
            if src.len() != tr.len() {
                issues.push(Issue::PluralPlaceholderMismatch {
                    id: id.to_string(),
                    quantity,
                    source: src,
                    translation: tr,
                });
            }
        }
    }
}
