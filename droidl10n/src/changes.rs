//! Detects source strings edited since the reference English variant was last synced.
//!
//! The reference variant (usually `en-rUS`) mirrors the source file. When a source string
//! is reworded, the two drift apart and every translation of that id needs review.

use serde::Serialize;

use crate::types::ResourceFile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedString {
    pub id: String,
    pub source: String,
    pub variant: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringValue {
    pub id: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeReport {
    /// Present in both with different values.
    pub changed: Vec<ChangedString>,
    /// Present in the source only.
    pub new_in_source: Vec<StringValue>,
    /// Present in the variant only.
    pub obsolete: Vec<StringValue>,
}

impl ChangeReport {
    pub fn in_sync(&self) -> bool {
        self.changed.is_empty() && self.new_in_source.is_empty() && self.obsolete.is_empty()
    }
}

/// Compares the `<string>` entries of the source with a reference variant.
pub fn detect_changes(source: &ResourceFile, variant: &ResourceFile) -> ChangeReport {
    let mut report = ChangeReport::default();

    for (id, value) in source.strings() {
        match variant.string(id) {
            Some(other) if other != value => report.changed.push(ChangedString {
                id: id.to_string(),
                source: value.to_string(),
                variant: other.to_string(),
            }),
            Some(_) => {}
            None => report.new_in_source.push(StringValue {
                id: id.to_string(),
                value: value.to_string(),
            }),
        }
    }

    for (id, value) in variant.strings() {
        if source.string(id).is_none() {
            report.obsolete.push(StringValue {
                id: id.to_string(),
                value: value.to_string(),
            });
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Entry;

    fn file(language: &str, strings: &[(&str, &str)]) -> ResourceFile {
        ResourceFile {
            language: language.to_string(),
            entries: strings.iter().map(|(id, v)| Entry::singular(*id, *v)).collect(),
        }
    }

    #[test]
    fn test_detect_changes() {
        let source = file(
            "source",
            &[("a", "Open tab"), ("b", "Close all tabs"), ("c", "New one")],
        );
        let us = file("en-rUS", &[("a", "Open tab"), ("b", "Close tabs"), ("old", "Gone")]);
        let report = detect_changes(&source, &us);
        assert_eq!(
            report.changed,
            vec![ChangedString {
                id: "b".to_string(),
                source: "Close all tabs".to_string(),
                variant: "Close tabs".to_string(),
            }]
        );
        assert_eq!(report.new_in_source.len(), 1);
        assert_eq!(report.new_in_source[0].id, "c");
        assert_eq!(report.obsolete[0].id, "old");
        assert!(!report.in_sync());
    }

    #[test]
    fn test_in_sync() {
        let source = file("source", &[("a", "Open tab")]);
        assert!(detect_changes(&source, &file("en-rUS", &[("a", "Open tab")])).in_sync());
    }
}
