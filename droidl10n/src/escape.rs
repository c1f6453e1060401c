//! Escaping between user-supplied text and the stored form of Android string values.
//!
//! Stored values keep `\'` and `\"` backslash escapes and XML entities for `&`, `<`, `>`.
//! Values that already contain inline markup (`<b>`, `<xliff:g>`, …) keep their tags.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MARKUP: Regex = Regex::new(r"</?[A-Za-z][\w:.-]*(\s[^<>]*)?/?>").unwrap();
    static ref ENTITY_START: Regex =
        Regex::new(r"^&(?:[A-Za-z]\w*|#[0-9]+|#[xX][0-9A-Fa-f]+);").unwrap();
}

/// How a value passed to an edit operation is treated before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeMode {
    /// Escape XML specials and quotes.
    #[default]
    Default,
    /// Store the value verbatim.
    Raw,
}

impl EscapeMode {
    pub fn from_raw_flag(raw: bool) -> Self {
        if raw { EscapeMode::Raw } else { EscapeMode::Default }
    }

    pub fn apply(self, value: &str) -> String {
        match self {
            EscapeMode::Default => escape_value(value),
            EscapeMode::Raw => value.to_string(),
        }
    }
}

/// Converts display text into its stored form.
///
/// `&apos;` and `&quot;` are normalized to plain quotes first, since Android does not
/// render them the way users expect. A value that already carries `&amp;`, `&lt;` or
/// `&gt;` is considered escaped and keeps its entities; markup is never escaped.
pub fn escape_value(value: &str) -> String {
    let mut value = value.to_string();
    if value.contains("&apos;") || value.contains("&quot;") {
        tracing::warn!("normalizing &apos;/&quot; entities to plain quotes");
        value = value.replace("&apos;", "'").replace("&quot;", "\"");
    }

    let already_escaped =
        value.contains("&amp;") || value.contains("&lt;") || value.contains("&gt;");
    let value = escape_bare_ampersands(&value);
    let value = if !already_escaped && !MARKUP.is_match(&value) {
        value.replace('<', "&lt;").replace('>', "&gt;")
    } else {
        value
    };

    escape_quotes(&value)
}

/// Turns every `&` that does not start an entity reference into `&amp;`, markup or not.
fn escape_bare_ampersands(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last = 0;
    for (i, _) in value.match_indices('&') {
        out.push_str(&value[last..i]);
        if ENTITY_START.is_match(&value[i..]) {
            out.push('&');
        } else {
            out.push_str("&amp;");
        }
        last = i + 1;
    }
    out.push_str(&value[last..]);
    out
}

fn escape_quotes(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    let mut prev = None;
    for c in value.chars() {
        if (c == '\'' || c == '"') && prev != Some('\\') && !inside_tag(&out) {
            out.push('\\');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Quotes inside a markup tag are attribute delimiters and stay as they are.
fn inside_tag(so_far: &str) -> bool {
    match (so_far.rfind('<'), so_far.rfind('>')) {
        (Some(open), Some(close)) => {
            open > close && MARKUP.is_match(&format!("{}>", &so_far[open..]))
        }
        (Some(open), None) => MARKUP.is_match(&format!("{}>", &so_far[open..])),
        _ => false,
    }
}

/// Converts a stored value back into display text.
pub fn unescape_value(value: &str) -> String {
    value
        .replace("\\'", "'")
        .replace("\\\"", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_apostrophe() {
        assert_eq!(escape_value("Don't"), r"Don\'t");
        assert_eq!(escape_value(r"Don\'t"), r"Don\'t");
    }

    #[test]
    fn test_escape_double_quote() {
        assert_eq!(escape_value(r#"Say "hi""#), r#"Say \"hi\""#);
    }

    #[test]
    fn test_escape_xml_specials() {
        assert_eq!(escape_value("Tom & Jerry"), "Tom &amp; Jerry");
        assert_eq!(escape_value("a < b > c"), "a &lt; b &gt; c");
    }

    #[test]
    fn test_bare_ampersand_inside_markup() {
        assert_eq!(escape_value("<b>Tom & Jerry</b>"), "<b>Tom &amp; Jerry</b>");
        assert_eq!(
            escape_value("<i>R&amp;D</i> & more"),
            "<i>R&amp;D</i> &amp; more"
        );
        assert_eq!(escape_value("&#169; 2024 & later"), "&#169; 2024 &amp; later");
    }

    #[test]
    fn test_already_escaped_is_left_alone() {
        assert_eq!(escape_value("Tom &amp; Jerry"), "Tom &amp; Jerry");
        assert_eq!(escape_value("&lt;tag&gt;"), "&lt;tag&gt;");
    }

    #[test]
    fn test_markup_is_preserved() {
        assert_eq!(escape_value("<b>Bold</b> text"), "<b>Bold</b> text");
        assert_eq!(
            escape_value(r#"Hi <xliff:g id="name">%1$s</xliff:g>'s"#),
            r#"Hi <xliff:g id="name">%1$s</xliff:g>\'s"#
        );
    }

    #[test]
    fn test_entities_are_normalized() {
        assert_eq!(escape_value("It&apos;s"), r"It\'s");
        assert_eq!(escape_value("&quot;x&quot;"), r#"\"x\""#);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_value(r"Don\'t"), "Don't");
        assert_eq!(unescape_value(r#"\"q\""#), "\"q\"");
        assert_eq!(unescape_value("&amp;lt;"), "&lt;");
        assert_eq!(unescape_value("a &lt; b"), "a < b");
    }

    #[test]
    fn test_raw_mode() {
        assert_eq!(EscapeMode::Raw.apply("Don't & <b>"), "Don't & <b>");
        assert_eq!(EscapeMode::from_raw_flag(false), EscapeMode::Default);
    }
}
