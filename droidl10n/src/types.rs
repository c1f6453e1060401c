//! Core types for droidl10n.
//! The parser decodes into these; the checker compares these.

use std::{
    collections::BTreeMap,
    fmt::Display,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// All entries of one `strings.xml` file, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceFile {
    /// The directory qualifier (e.g. "ko-rKR"), or "source" for the English file.
    pub language: String,

    /// Ordered list of all entries in this file.
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl ResourceFile {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            entries: Vec::new(),
        }
    }

    pub fn find_entry(&self, kind: EntryKind, id: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| e.kind() == kind && e.id == id)
    }

    pub fn contains(&self, kind: EntryKind, id: &str) -> bool {
        self.find_entry(kind, id).is_some()
    }

    /// Returns the value of a `<string>` entry.
    pub fn string(&self, id: &str) -> Option<&str> {
        match self.find_entry(EntryKind::String, id).map(|e| &e.value) {
            Some(Translation::Singular(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the quantities of a `<plurals>` entry.
    pub fn plural(&self, id: &str) -> Option<&Plural> {
        match self.find_entry(EntryKind::Plurals, id).map(|e| &e.value) {
            Some(Translation::Plural(plural)) => Some(plural),
            _ => None,
        }
    }

    /// Iterates `(id, value)` over all `<string>` entries.
    pub fn strings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|e| match &e.value {
            Translation::Singular(value) => Some((e.id.as_str(), value.as_str())),
            _ => None,
        })
    }

    /// The `(kind, id)` sequence of this file, which is the canonical order when
    /// this is the source file.
    pub fn order(&self) -> Vec<(EntryKind, String)> {
        self.entries.iter().map(|e| (e.kind(), e.id.clone())).collect()
    }
}

/// A single resource element.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Entry {
    /// The `name` attribute.
    pub id: String,

    /// The element content, exactly as stored in the file.
    pub value: Translation,

    /// `false` when the element carries `translatable="false"`.
    pub translatable: bool,
}

impl Entry {
    pub fn singular(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: Translation::Singular(value.into()),
            translatable: true,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self.value {
            Translation::Singular(_) => EntryKind::String,
            Translation::Plural(_) => EntryKind::Plurals,
            Translation::Array(_) => EntryKind::StringArray,
        }
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} = {}", self.kind(), self.id, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum Translation {
    /// A `<string>` value.
    Singular(String),

    /// A `<plurals>` block.
    Plural(Plural),

    /// A `<string-array>` with its items in order.
    Array(Vec<String>),
}

impl Display for Translation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Translation::Singular(value) => write!(f, "{}", value),
            Translation::Plural(plural) => {
                let parts: Vec<String> = plural
                    .forms
                    .iter()
                    .map(|(q, v)| format!("{}={}", q, v))
                    .collect();
                write!(f, "{{{}}}", parts.join(" | "))
            }
            Translation::Array(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// All quantity forms of a `<plurals>` element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Plural {
    #[serde(default)]
    pub forms: BTreeMap<PluralQuantity, String>,
}

impl Plural {
    pub fn new(forms: impl IntoIterator<Item = (PluralQuantity, String)>) -> Self {
        Self {
            forms: forms.into_iter().collect(),
        }
    }

    pub fn get(&self, quantity: PluralQuantity) -> Option<&str> {
        self.forms.get(&quantity).map(String::as_str)
    }
}

/// The three element kinds this tool understands. Android keeps one namespace per kind,
/// so entries are identified by `(kind, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    String,
    Plurals,
    StringArray,
}

impl EntryKind {
    pub fn tag(self) -> &'static str {
        match self {
            EntryKind::String => "string",
            EntryKind::Plurals => "plurals",
            EntryKind::StringArray => "string-array",
        }
    }

    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"string" => Some(EntryKind::String),
            b"plurals" => Some(EntryKind::Plurals),
            b"string-array" => Some(EntryKind::StringArray),
            _ => None,
        }
    }
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Android plural quantities.
#[derive(Ord, PartialOrd, Eq, PartialEq, Debug, Clone, Copy, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PluralQuantity {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralQuantity {
    pub const ALL: [PluralQuantity; 6] = [
        PluralQuantity::Zero,
        PluralQuantity::One,
        PluralQuantity::Two,
        PluralQuantity::Few,
        PluralQuantity::Many,
        PluralQuantity::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PluralQuantity::Zero => "zero",
            PluralQuantity::One => "one",
            PluralQuantity::Two => "two",
            PluralQuantity::Few => "few",
            PluralQuantity::Many => "many",
            PluralQuantity::Other => "other",
        }
    }
}

impl Display for PluralQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluralQuantity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero" => Ok(PluralQuantity::Zero),
            "one" => Ok(PluralQuantity::One),
            "two" => Ok(PluralQuantity::Two),
            "few" => Ok(PluralQuantity::Few),
            "many" => Ok(PluralQuantity::Many),
            "other" => Ok(PluralQuantity::Other),
            _ => Err(format!("Unknown plural quantity: {}", s)),
        }
    }
}
