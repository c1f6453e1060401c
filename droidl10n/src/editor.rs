//! In-place edits on a [`Document`].
//!
//! Every edit touches only the bytes it needs: values are spliced into their inner span,
//! new elements go right before `</resources>`, removed elements take their own line with
//! them. Everything else in the file, line endings included, is kept byte for byte.
//! [`Document::sort`] is the one operation that rewrites the whole file.

use std::ops::Range;

use crate::{
    document::{Document, LineEnding},
    error::Error,
    escape::{EscapeMode, unescape_value},
    types::{EntryKind, Plural, PluralQuantity, Translation},
    validation::validate_value,
};

const DOCUMENT_LABEL: &str = "strings.xml";
const DEFAULT_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;
const ENTRY_INDENT: &str = "    ";
const ITEM_INDENT: &str = "        ";

/// Result of an edit that may legitimately have nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    Skipped,
}

fn validated(id: &str, value: &str, mode: EscapeMode) -> Result<String, Error> {
    validate_value(value).map_err(|issue| Error::validation(id, issue))?;
    Ok(mode.apply(value))
}

fn validated_pairs(
    id: &str,
    pairs: &[(PluralQuantity, String)],
    mode: EscapeMode,
) -> Result<Vec<(PluralQuantity, String)>, Error> {
    pairs
        .iter()
        .map(|(q, v)| validated(&format!("{}[{}]", id, q), v, mode).map(|stored| (*q, stored)))
        .collect()
}

fn string_element(id: &str, stored: &str) -> String {
    format!(r#"<string name="{}">{}</string>"#, id, stored)
}

fn item_element(quantity: PluralQuantity, stored: &str) -> String {
    format!(r#"<item quantity="{}">{}</item>"#, quantity, stored)
}

fn plurals_element(id: &str, items: &[(PluralQuantity, String)], le: LineEnding) -> String {
    let mut out = format!(r#"<plurals name="{}">"#, id);
    for (quantity, stored) in items {
        out.push_str(le.as_str());
        out.push_str(ITEM_INDENT);
        out.push_str(&item_element(*quantity, stored));
    }
    out.push_str(le.as_str());
    out.push_str(ENTRY_INDENT);
    out.push_str("</plurals>");
    out
}

/// Turns `<tag attrs/>` into `<tag attrs>body</tag>`.
fn expand_self_closing(tag_text: &str, tag: &str, body: &str) -> String {
    let open = tag_text.trim_end_matches('>').trim_end_matches('/').trim_end();
    format!("{}>{}</{}>", open, body, tag)
}

impl Document {
    fn not_found(&self, id: &str) -> Error {
        Error::entry_not_found(id, DOCUMENT_LABEL)
    }

    /// The display value of a `<string>`, with escapes undone.
    pub fn get(&self, id: &str) -> Result<String, Error> {
        self.get_raw(id).map(unescape_value)
    }

    /// The value of a `<string>` exactly as stored.
    pub fn get_raw(&self, id: &str) -> Result<&str, Error> {
        self.find(EntryKind::String, id)
            .map(|n| &self.text()[n.inner.clone()])
            .ok_or_else(|| self.not_found(id))
    }

    /// All quantities of a `<plurals>` element, as stored.
    pub fn get_plurals(&self, id: &str) -> Result<Plural, Error> {
        match self.find(EntryKind::Plurals, id).map(|n| &n.entry.value) {
            Some(Translation::Plural(plural)) => Ok(plural.clone()),
            _ => Err(self.not_found(id)),
        }
    }

    /// Replaces the value of an existing `<string>`.
    pub fn set(&mut self, id: &str, value: &str, mode: EscapeMode) -> Result<(), Error> {
        let stored = validated(id, value, mode)?;
        self.replace_string(id, &stored)
    }

    /// Replaces the value of a `<string>`, appending the element when it doesn't exist yet.
    pub fn set_or_create(&mut self, id: &str, value: &str, mode: EscapeMode) -> Result<EditOutcome, Error> {
        let stored = validated(id, value, mode)?;
        if self.contains(EntryKind::String, id) {
            self.replace_string(id, &stored)?;
        } else {
            self.insert_entry(&string_element(id, &stored))?;
        }
        Ok(EditOutcome::Applied)
    }

    fn replace_string(&mut self, id: &str, stored: &str) -> Result<(), Error> {
        let node = self
            .find(EntryKind::String, id)
            .ok_or_else(|| self.not_found(id))?;
        if node.self_closing {
            let replacement = expand_self_closing(&self.text()[node.outer.clone()], "string", stored);
            let outer = node.outer.clone();
            self.splice(outer, &replacement)
        } else {
            let inner = node.inner.clone();
            self.splice(inner, stored)
        }
    }

    /// Updates quantities of a `<plurals>` element in place, adding missing quantities
    /// and creating the element when needed.
    pub fn set_plurals(
        &mut self,
        id: &str,
        pairs: &[(PluralQuantity, String)],
        mode: EscapeMode,
    ) -> Result<(), Error> {
        let items = validated_pairs(id, pairs, mode)?;

        let Some(node) = self.find(EntryKind::Plurals, id) else {
            let block = plurals_element(id, &items, self.line_ending());
            return self.insert_entry(&block);
        };
        if node.self_closing {
            let outer = node.outer.clone();
            let block = plurals_element(id, &items, self.line_ending());
            return self.splice(outer, &block);
        }

        for (quantity, stored) in &items {
            let Some(node) = self.find(EntryKind::Plurals, id) else {
                return Err(self.not_found(id));
            };
            match node.item(*quantity) {
                Some(item) if item.inner.is_empty() && item.inner.start == item.outer.end => {
                    let outer = item.outer.clone();
                    self.splice(outer, &item_element(*quantity, stored))?;
                }
                Some(item) => {
                    let inner = item.inner.clone();
                    self.splice(inner, stored)?;
                }
                None => {
                    let close = node.inner.end;
                    let element = item_element(*quantity, stored);
                    if self.starts_line(close) {
                        let at = self.line_start(close);
                        let line = format!("{}{}{}", ITEM_INDENT, element, self.line_ending().as_str());
                        self.splice(at..at, &line)?;
                    } else {
                        self.splice(close..close, &element)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Appends a `<string>` before `</resources>`. Skips when the id already exists.
    pub fn add(&mut self, id: &str, value: &str, mode: EscapeMode) -> Result<EditOutcome, Error> {
        let stored = validated(id, value, mode)?;
        if self.contains(EntryKind::String, id) {
            return Ok(EditOutcome::Skipped);
        }
        self.insert_entry(&string_element(id, &stored))?;
        Ok(EditOutcome::Applied)
    }

    /// Appends a `<plurals>` block before `</resources>`. Skips when the id already exists.
    pub fn add_plural(
        &mut self,
        id: &str,
        pairs: &[(PluralQuantity, String)],
        mode: EscapeMode,
    ) -> Result<EditOutcome, Error> {
        let items = validated_pairs(id, pairs, mode)?;
        if self.contains(EntryKind::Plurals, id) {
            return Ok(EditOutcome::Skipped);
        }
        let block = plurals_element(id, &items, self.line_ending());
        self.insert_entry(&block)?;
        Ok(EditOutcome::Applied)
    }

    /// Removes every element named `id`, whatever its kind.
    pub fn remove(&mut self, id: &str) -> Result<EditOutcome, Error> {
        let mut outcome = EditOutcome::Skipped;
        while let Some(outer) = self.nodes().iter().find(|n| n.id() == id).map(|n| n.outer.clone()) {
            let extent = self.line_extent(outer);
            self.splice(extent, "")?;
            outcome = EditOutcome::Applied;
        }
        Ok(outcome)
    }

    fn insert_entry(&mut self, element: &str) -> Result<(), Error> {
        let close = self.root_close_start()?;
        let le = self.line_ending().as_str();
        if self.starts_line(close) {
            let at = self.line_start(close);
            self.splice(at..at, &format!("{}{}{}", ENTRY_INDENT, element, le))
        } else {
            self.splice(close..close, &format!("{}{}{}{}", le, ENTRY_INDENT, element, le))
        }
    }

    /// Rewrites the document with its entries in `order`, the `(kind, id)` sequence of the
    /// source file.
    ///
    /// Comments directly above an element move with it. Entries missing from `order` and
    /// other resource types keep their relative order after the sorted entries. Elements are
    /// indented by four spaces and plural or array items by eight.
    pub fn sort(&mut self, order: &[(EntryKind, String)]) -> Result<(), Error> {
        self.root_close_start()?;
        let le = self.line_ending().as_str();

        // (span, index into nodes) for every root-level element, in file order
        let mut blocks: Vec<(Range<usize>, Option<usize>)> = self
            .nodes()
            .iter()
            .enumerate()
            .map(|(i, n)| (n.outer.clone(), Some(i)))
            .chain(self.others().iter().map(|r| (r.clone(), None)))
            .collect();
        blocks.sort_by_key(|(span, _)| span.start);

        let mut rendered = Vec::with_capacity(blocks.len());
        let mut previous_end = 0;
        for (span, node) in &blocks {
            let mut text = String::new();
            for comment in self
                .comments()
                .iter()
                .filter(|c| c.start >= previous_end && c.end <= span.start)
            {
                push_comment(&mut text, &self.text()[comment.clone()], le);
            }
            let kind = node.map(|i| self.nodes()[i].kind());
            push_element(&mut text, &self.text()[span.clone()], kind, le);
            rendered.push((node.map(|i| (self.nodes()[i].kind(), self.nodes()[i].id())), text));
            previous_end = span.end;
        }

        let mut emitted = vec![false; rendered.len()];
        let mut body = String::new();
        for (kind, id) in order {
            if let Some(i) = rendered
                .iter()
                .enumerate()
                .position(|(i, (key, _))| !emitted[i] && *key == Some((*kind, id.as_str())))
            {
                emitted[i] = true;
                body.push_str(&rendered[i].1);
            }
        }
        for (i, (_, text)) in rendered.iter().enumerate() {
            if !emitted[i] {
                body.push_str(text);
            }
        }
        for comment in self.comments().iter().filter(|c| c.start >= previous_end) {
            push_comment(&mut body, &self.text()[comment.clone()], le);
        }

        let mut out = String::new();
        out.push_str(self.declaration().unwrap_or(DEFAULT_DECLARATION));
        out.push_str(le);
        if !self.prolog().is_empty() {
            out.push_str(self.prolog());
            out.push_str(le);
        }
        let root = self.root_open_tag().unwrap_or("<resources>");
        if root.ends_with("/>") {
            out.push_str(&format!("{}>", root.trim_end_matches("/>").trim_end()));
        } else {
            out.push_str(root);
        }
        out.push_str(le);
        out.push_str(&body);
        out.push_str("</resources>");
        out.push_str(le);

        *self = Document::parse(out)?;
        Ok(())
    }
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l))
}

fn push_comment(out: &mut String, comment: &str, le: &str) {
    for line in lines(comment) {
        out.push_str(ENTRY_INDENT);
        out.push_str(line.trim());
        out.push_str(le);
    }
}

fn push_element(out: &mut String, element: &str, kind: Option<EntryKind>, le: &str) {
    let mut iter = lines(element);
    if let Some(first) = iter.next() {
        out.push_str(ENTRY_INDENT);
        out.push_str(first.trim_start());
    }
    let has_items = matches!(kind, Some(EntryKind::Plurals | EntryKind::StringArray));
    for line in iter {
        out.push_str(le);
        let trimmed = line.trim();
        if has_items && trimmed.starts_with("<item") {
            out.push_str(ITEM_INDENT);
            out.push_str(trimmed);
        } else if has_items && trimmed.starts_with("</") && !trimmed.starts_with("</item") {
            out.push_str(ENTRY_INDENT);
            out.push_str(trimmed);
        } else {
            out.push_str(line);
        }
    }
    out.push_str(le);
}
