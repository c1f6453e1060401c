//! Tag-aware reader for Android `strings.xml` files.
//!
//! A [`Document`] keeps the original text together with the byte spans of every
//! `<string>`, `<plurals>` and `<string-array>` element, so edits can be spliced into
//! the file without disturbing the formatting around them.
//!
//! Element bodies are consumed by depth, so inline markup such as
//! `<xliff:g id="n">%1$s</xliff:g>` or `<b>…</b>` never ends a value early.

use std::{
    io::{BufRead, Write},
    ops::Range,
};

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::{
    error::Error,
    traits::Parser,
    types::{Entry, EntryKind, Plural, PluralQuantity, ResourceFile, Translation},
};

/// Line terminator style of a file. Files containing any `\r\n` are treated as CRLF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// One `<item>` of a plurals block or string array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemNode {
    /// Set for plural items only.
    pub quantity: Option<PluralQuantity>,
    pub outer: Range<usize>,
    pub inner: Range<usize>,
}

/// A parsed resource element and where it lives in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub entry: Entry,
    /// From `<` of the opening tag to `>` of the closing tag.
    pub outer: Range<usize>,
    /// Between the opening and closing tags. Empty and at `outer.end` for self-closing elements.
    pub inner: Range<usize>,
    pub self_closing: bool,
    pub items: Vec<ItemNode>,
}

impl Node {
    pub fn kind(&self) -> EntryKind {
        self.entry.kind()
    }

    pub fn id(&self) -> &str {
        &self.entry.id
    }

    pub fn item(&self, quantity: PluralQuantity) -> Option<&ItemNode> {
        self.items.iter().find(|i| i.quantity == Some(quantity))
    }
}

/// A parsed `strings.xml` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    line_ending: LineEnding,
    declaration: Option<Range<usize>>,
    root_open: Option<Range<usize>>,
    root_close: Option<Range<usize>>,
    nodes: Vec<Node>,
    comments: Vec<Range<usize>>,
    /// Root-level elements of other resource types (`<dimen>`, `<item type="id">`, …).
    others: Vec<Range<usize>>,
}

impl Document {
    /// Parse the full text of a resource file.
    pub fn parse(text: impl Into<String>) -> Result<Self, Error> {
        let text = text.into();
        let mut declaration = None;
        let mut root_open = None;
        let mut root_close = None;
        let mut nodes = Vec::new();
        let mut comments = Vec::new();
        let mut others = Vec::new();

        {
            let mut reader = Reader::from_str(&text);
            let mut in_root = false;

            loop {
                let start = position(&reader);
                match reader.read_event()? {
                    Event::Decl(_) => declaration = Some(start..position(&reader)),
                    Event::Start(e) if !in_root => {
                        if e.name().as_ref() != b"resources" {
                            return Err(Error::Structural(format!(
                                "unexpected root element <{}>",
                                String::from_utf8_lossy(e.name().as_ref())
                            )));
                        }
                        in_root = true;
                        root_open = Some(start..position(&reader));
                    }
                    Event::Empty(e) if !in_root && e.name().as_ref() == b"resources" => {
                        root_open = Some(start..position(&reader));
                    }
                    Event::Start(e) => match EntryKind::from_tag(e.name().as_ref()) {
                        Some(kind) => nodes.push(read_node(&text, kind, &e, start, &mut reader)?),
                        None => {
                            let end = e.to_end().into_owned();
                            reader.read_to_end(end.name())?;
                            others.push(start..position(&reader));
                        }
                    },
                    Event::Empty(e) if in_root => match EntryKind::from_tag(e.name().as_ref()) {
                        Some(kind) => nodes.push(empty_node(kind, &e, start..position(&reader))?),
                        None => others.push(start..position(&reader)),
                    },
                    Event::Comment(_) if in_root => comments.push(start..position(&reader)),
                    Event::End(e) if e.name().as_ref() == b"resources" => {
                        root_close = Some(start..position(&reader));
                        in_root = false;
                    }
                    Event::Eof => break,
                    _ => {}
                }
            }
        }

        Ok(Document {
            line_ending: LineEnding::detect(&text),
            text,
            declaration,
            root_open,
            root_close,
            nodes,
            comments,
            others,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn comments(&self) -> &[Range<usize>] {
        &self.comments
    }

    pub(crate) fn others(&self) -> &[Range<usize>] {
        &self.others
    }

    /// Anything between the XML declaration and the root tag, such as a license comment.
    pub(crate) fn prolog(&self) -> &str {
        let start = self.declaration.as_ref().map_or(0, |r| r.end);
        let end = self.root_open.as_ref().map_or(start, |r| r.start);
        self.text[start..end].trim()
    }

    pub fn declaration(&self) -> Option<&str> {
        self.declaration.clone().map(|r| &self.text[r])
    }

    pub fn root_open_tag(&self) -> Option<&str> {
        self.root_open.clone().map(|r| &self.text[r])
    }

    pub fn find(&self, kind: EntryKind, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.kind() == kind && n.id() == id)
    }

    pub fn contains(&self, kind: EntryKind, id: &str) -> bool {
        self.find(kind, id).is_some()
    }

    /// Byte offset of `</resources>`, required by every insertion.
    pub fn root_close_start(&self) -> Result<usize, Error> {
        self.root_close
            .as_ref()
            .map(|r| r.start)
            .ok_or_else(|| Error::Structural("no closing </resources> tag found".to_string()))
    }

    /// Materialize the entries of this document.
    pub fn resource(&self, language: impl Into<String>) -> ResourceFile {
        ResourceFile {
            language: language.into(),
            entries: self.nodes.iter().map(|n| n.entry.clone()).collect(),
        }
    }

    /// Replace a span of the text and parse the result again.
    pub(crate) fn splice(&mut self, range: Range<usize>, replacement: &str) -> Result<(), Error> {
        let mut text = self.text.clone();
        text.replace_range(range, replacement);
        *self = Document::parse(text)?;
        Ok(())
    }

    /// Offset of the first byte of the line containing `pos`.
    pub(crate) fn line_start(&self, pos: usize) -> usize {
        self.text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    /// `true` when only spaces or tabs precede `pos` on its line.
    pub(crate) fn starts_line(&self, pos: usize) -> bool {
        is_blank(&self.text[self.line_start(pos)..pos])
    }

    /// Widens `range` to whole lines (indentation and terminator included) when the element
    /// is alone on its line; otherwise returns it unchanged.
    pub(crate) fn line_extent(&self, range: Range<usize>) -> Range<usize> {
        let line_start = self.line_start(range.start);
        if !is_blank(&self.text[line_start..range.start]) {
            return range;
        }
        let rest = &self.text[range.end..];
        let line_end = match rest.find('\n') {
            Some(i) if is_blank(rest[..i].trim_end_matches('\r')) => range.end + i + 1,
            Some(_) => return range,
            None if is_blank(rest) => self.text.len(),
            None => return range,
        };
        line_start..line_end
    }
}

impl Parser for Document {
    fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut text = String::new();
        reader.read_to_string(&mut text).map_err(Error::Io)?;
        Document::parse(text)
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        writer.write_all(self.text.as_bytes()).map_err(Error::Io)
    }
}

fn position(reader: &Reader<&[u8]>) -> usize {
    reader.buffer_position() as usize
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.chars().all(|c| c == ' ' || c == '\t')
}

struct Attributes {
    name: Option<String>,
    translatable: bool,
    quantity: Option<String>,
}

fn read_attributes(e: &BytesStart) -> Result<Attributes, Error> {
    let mut attrs = Attributes {
        name: None,
        translatable: true,
        quantity: None,
    };
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::InvalidResource(e.to_string()))?;
        match attr.key.as_ref() {
            b"name" => attrs.name = Some(attr.unescape_value()?.to_string()),
            b"translatable" => attrs.translatable = attr.unescape_value()?.as_ref() != "false",
            b"quantity" => attrs.quantity = Some(attr.unescape_value()?.to_string()),
            _ => {}
        }
    }
    Ok(attrs)
}

fn required_name(kind: EntryKind, attrs: &mut Attributes) -> Result<String, Error> {
    attrs
        .name
        .take()
        .ok_or_else(|| Error::InvalidResource(format!("{} tag missing 'name'", kind)))
}

fn item_quantity(attrs: &Attributes, id: &str) -> Result<PluralQuantity, Error> {
    let raw = attrs.quantity.as_deref().ok_or_else(|| {
        Error::InvalidResource(format!("plurals `{}` has an item without 'quantity'", id))
    })?;
    raw.parse::<PluralQuantity>()
        .map_err(|e| Error::InvalidResource(format!("plurals `{}`: {}", id, e)))
}

/// Reads up to and including the end tag that closes the element whose start tag was just
/// consumed. Returns `(start of the end tag, end of the end tag)`.
fn read_body(reader: &mut Reader<&[u8]>, what: &str) -> Result<(usize, usize), Error> {
    let mut depth = 0usize;
    loop {
        let start = position(reader);
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok((start, position(reader))),
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(Error::Structural(format!("unterminated {}", what))),
            _ => {}
        }
    }
}

fn read_node(
    text: &str,
    kind: EntryKind,
    e: &BytesStart,
    start: usize,
    reader: &mut Reader<&[u8]>,
) -> Result<Node, Error> {
    let mut attrs = read_attributes(e)?;
    let id = required_name(kind, &mut attrs)?;
    let inner_start = position(reader);

    if kind == EntryKind::String {
        let (inner_end, outer_end) = read_body(reader, &format!("<string> `{}`", id))?;
        return Ok(Node {
            entry: Entry {
                id,
                value: Translation::Singular(text[inner_start..inner_end].to_string()),
                translatable: attrs.translatable,
            },
            outer: start..outer_end,
            inner: inner_start..inner_end,
            self_closing: false,
            items: Vec::new(),
        });
    }

    let mut items = Vec::new();
    let (inner_end, outer_end) = loop {
        let item_start = position(reader);
        match reader.read_event()? {
            Event::Start(item) if item.name().as_ref() == b"item" => {
                let quantity = match kind {
                    EntryKind::Plurals => Some(item_quantity(&read_attributes(&item)?, &id)?),
                    _ => None,
                };
                let body_start = position(reader);
                let (body_end, item_end) = read_body(reader, &format!("<item> in `{}`", id))?;
                items.push(ItemNode {
                    quantity,
                    outer: item_start..item_end,
                    inner: body_start..body_end,
                });
            }
            Event::Empty(item) if item.name().as_ref() == b"item" => {
                let quantity = match kind {
                    EntryKind::Plurals => Some(item_quantity(&read_attributes(&item)?, &id)?),
                    _ => None,
                };
                let item_end = position(reader);
                items.push(ItemNode {
                    quantity,
                    outer: item_start..item_end,
                    inner: item_end..item_end,
                });
            }
            Event::Start(other) => {
                let end = other.to_end().into_owned();
                reader.read_to_end(end.name())?;
            }
            Event::End(_) => break (item_start, position(reader)),
            Event::Eof => {
                return Err(Error::Structural(format!("unterminated <{}> `{}`", kind, id)));
            }
            _ => {}
        }
    };

    let value = match kind {
        EntryKind::Plurals => Translation::Plural(Plural::new(items.iter().filter_map(|i| {
            i.quantity
                .map(|q| (q, text[i.inner.clone()].to_string()))
        }))),
        _ => Translation::Array(
            items
                .iter()
                .map(|i| text[i.inner.clone()].to_string())
                .collect(),
        ),
    };

    Ok(Node {
        entry: Entry {
            id,
            value,
            translatable: attrs.translatable,
        },
        outer: start..outer_end,
        inner: inner_start..inner_end,
        self_closing: false,
        items,
    })
}

fn empty_node(kind: EntryKind, e: &BytesStart, outer: Range<usize>) -> Result<Node, Error> {
    let mut attrs = read_attributes(e)?;
    let id = required_name(kind, &mut attrs)?;
    let value = match kind {
        EntryKind::String => Translation::Singular(String::new()),
        EntryKind::Plurals => Translation::Plural(Plural::default()),
        EntryKind::StringArray => Translation::Array(Vec::new()),
    };
    Ok(Node {
        entry: Entry {
            id,
            value,
            translatable: attrs.translatable,
        },
        inner: outer.end..outer.end,
        outer,
        self_closing: true,
        items: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SAMPLE: &str = indoc! {r#"
        <?xml version="1.0" encoding="utf-8"?>
        <resources xmlns:xliff="urn:oasis:names:tc:xliff:document:1.2">
            <!-- Greetings -->
            <string name="hello">Hello</string>
            <string name="welcome">Welcome <xliff:g id="name">%1$s</xliff:g>, <b>enjoy</b></string>
            <string name="multi">First line
        second line</string>
            <string name="empty"/>
            <string name="locked" translatable="false">Fulguris</string>
            <dimen name="margin">4dp</dimen>
            <plurals name="tabs">
                <item quantity="one">%d tab</item>
                <item quantity="other">%d tabs</item>
            </plurals>
            <string-array name="modes">
                <item>Light</item>
                <item>Dark</item>
            </string-array>
        </resources>
    "#};

    #[test]
    fn test_parse_entries_in_order() {
        let doc = Document::parse(SAMPLE).unwrap();
        let ids: Vec<_> = doc.nodes().iter().map(|n| (n.kind(), n.id())).collect();
        assert_eq!(
            ids,
            vec![
                (EntryKind::String, "hello"),
                (EntryKind::String, "welcome"),
                (EntryKind::String, "multi"),
                (EntryKind::String, "empty"),
                (EntryKind::String, "locked"),
                (EntryKind::Plurals, "tabs"),
                (EntryKind::StringArray, "modes"),
            ]
        );
    }

    #[test]
    fn test_nested_markup_does_not_truncate_value() {
        let res = Document::parse(SAMPLE).unwrap().resource("source");
        assert_eq!(
            res.string("welcome"),
            Some(r#"Welcome <xliff:g id="name">%1$s</xliff:g>, <b>enjoy</b>"#)
        );
    }

    #[test]
    fn test_multiline_and_empty_values() {
        let doc = Document::parse(SAMPLE).unwrap();
        let res = doc.resource("source");
        assert_eq!(res.string("multi"), Some("First line\nsecond line"));
        assert_eq!(res.string("empty"), Some(""));
        assert!(doc.find(EntryKind::String, "empty").unwrap().self_closing);
    }

    #[test]
    fn test_translatable_flag() {
        let res = Document::parse(SAMPLE).unwrap().resource("source");
        assert!(!res.find_entry(EntryKind::String, "locked").unwrap().translatable);
        assert!(res.find_entry(EntryKind::String, "hello").unwrap().translatable);
    }

    #[test]
    fn test_plurals_and_arrays() {
        let doc = Document::parse(SAMPLE).unwrap();
        let res = doc.resource("source");
        let tabs = res.plural("tabs").unwrap();
        assert_eq!(tabs.get(PluralQuantity::One), Some("%d tab"));
        assert_eq!(tabs.get(PluralQuantity::Other), Some("%d tabs"));
        match &res.find_entry(EntryKind::StringArray, "modes").unwrap().value {
            Translation::Array(items) => assert_eq!(items, &vec!["Light", "Dark"]),
            other => panic!("unexpected value {:?}", other),
        }
        let node = doc.find(EntryKind::Plurals, "tabs").unwrap();
        let one = node.item(PluralQuantity::One).unwrap();
        assert_eq!(&doc.text()[one.outer.clone()], r#"<item quantity="one">%d tab</item>"#);
    }

    #[test]
    fn test_spans_point_into_text() {
        let doc = Document::parse(SAMPLE).unwrap();
        let hello = doc.find(EntryKind::String, "hello").unwrap();
        assert_eq!(
            &doc.text()[hello.outer.clone()],
            r#"<string name="hello">Hello</string>"#
        );
        assert_eq!(&doc.text()[hello.inner.clone()], "Hello");
        assert_eq!(&doc.text()[doc.root_close_start().unwrap()..], "</resources>\n");
        assert_eq!(doc.comments().len(), 1);
        assert_eq!(&doc.text()[doc.others()[0].clone()], r#"<dimen name="margin">4dp</dimen>"#);
        assert_eq!(
            doc.declaration(),
            Some(r#"<?xml version="1.0" encoding="utf-8"?>"#)
        );
    }

    #[test]
    fn test_line_extent() {
        let doc = Document::parse(SAMPLE).unwrap();
        let hello = doc.find(EntryKind::String, "hello").unwrap();
        let extent = doc.line_extent(hello.outer.clone());
        assert_eq!(
            &doc.text()[extent],
            "    <string name=\"hello\">Hello</string>\n"
        );
    }

    #[test]
    fn test_line_ending_detection() {
        let crlf = "<resources>\r\n    <string name=\"a\">A</string>\r\n</resources>\r\n";
        let doc = Document::parse(crlf).unwrap();
        assert_eq!(doc.line_ending(), LineEnding::CrLf);
        let a = doc.find(EntryKind::String, "a").unwrap();
        assert_eq!(
            &doc.text()[doc.line_extent(a.outer.clone())],
            "    <string name=\"a\">A</string>\r\n"
        );
    }

    #[test]
    fn test_missing_name_attribute() {
        let err = Document::parse("<resources><string>No name</string></resources>").unwrap_err();
        assert!(format!("{}", err).contains("missing 'name'"));
    }

    #[test]
    fn test_unknown_quantity_is_rejected() {
        let xml = r#"<resources><plurals name="p"><item quantity="several">x</item></plurals></resources>"#;
        assert!(Document::parse(xml).is_err());
    }

    #[test]
    fn test_missing_root_close() {
        let mut doc = Document::parse("<resources>\n    <string name=\"a\">A</string>\n").unwrap();
        assert_eq!(doc.resource("x").order(), vec![(EntryKind::String, "a".to_string())]);
        assert!(matches!(doc.root_close_start(), Err(Error::Structural(_))));
        assert!(matches!(
            doc.add("b", "B", crate::EscapeMode::Default),
            Err(Error::Structural(_))
        ));
        assert_eq!(doc.text(), "<resources>\n    <string name=\"a\">A</string>\n");
    }

    #[test]
    fn test_parser_trait_roundtrip() {
        let doc = <Document as Parser>::from_str(SAMPLE).unwrap();
        let mut out = Vec::new();
        doc.to_writer(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), SAMPLE);
    }
}
