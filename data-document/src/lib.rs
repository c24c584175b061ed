//! Tree-structured markup documents: named elements carrying ordered
//! string attributes, child elements and text content.
//!
//! The parser accepts an XML subset (optional declaration, comments,
//! entity and character references) and reports malformed input with
//! 1-based line/column positions. Serialization is deterministic:
//! attributes keep insertion order and children are indented a fixed
//! number of spaces per nesting level, so re-saving an unchanged tree
//! reproduces the bytes exactly.
//!
//! Surrounding whitespace in text content is not significant and does
//! not survive a round-trip.

mod parser;

use data_error::{Result, TeambuilderError};

/// A named element with ordered attributes, children and text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.iter().any(|(k, _)| k == key)
    }

    /// Integer attribute with a default for the absent case.
    /// A present but non-numeric value is a schema error,
    /// never silently coerced.
    pub fn int_attribute_or(&self, key: &str, default: i32) -> Result<i32> {
        match self.attribute(key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| {
                TeambuilderError::Schema(format!(
                    "attribute `{}` is not an integer: `{}`",
                    key, raw
                ))
            }),
        }
    }

    /// Set an attribute, replacing the value in place if the key is
    /// already present so the write order stays stable.
    pub fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn set_int_attribute(&mut self, key: impl Into<String>, value: i32) {
        self.set_attribute(key, value.to_string());
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child element with the given name, if any.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// A document owning at most one root element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    root: Option<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from text. Malformed input fails with
    /// [`TeambuilderError::Parse`] carrying the 1-based line and
    /// column of the offending position.
    pub fn parse(input: &str) -> Result<Self> {
        parser::parse(input)
    }

    /// Parse a document from raw bytes, rejecting invalid UTF-8 with
    /// the line/column of the first bad byte.
    pub fn parse_bytes(input: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(input).map_err(|e| {
            let prefix = &input[..e.valid_up_to()];
            let line = prefix.iter().filter(|&&b| b == b'\n').count() + 1;
            let col = prefix
                .iter()
                .rev()
                .take_while(|&&b| b != b'\n')
                .count()
                + 1;
            TeambuilderError::Parse {
                msg: "invalid UTF-8".to_owned(),
                line,
                col,
            }
        })?;
        Self::parse(text)
    }

    /// Install `root` as the document's root element, replacing any
    /// previous one.
    pub fn append(&mut self, root: Element) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// Serialize with `indent` spaces per nesting level. Output ends
    /// with a newline; an empty document serializes to the empty
    /// string.
    pub fn to_string_indented(&self, indent: usize) -> String {
        let mut out = String::new();
        if let Some(root) = &self.root {
            write_element(&mut out, root, 0, indent);
        }
        out
    }
}

fn write_element(
    out: &mut String,
    element: &Element,
    depth: usize,
    indent: usize,
) {
    let pad = " ".repeat(depth * indent);
    out.push_str(&pad);
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_into(out, value, true);
        out.push('"');
    }
    if element.children.is_empty() && element.text.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push('>');
    if element.children.is_empty() {
        escape_into(out, &element.text, false);
        out.push_str("</");
        out.push_str(&element.name);
        out.push_str(">\n");
        return;
    }
    out.push('\n');
    if !element.text.is_empty() {
        out.push_str(&" ".repeat((depth + 1) * indent));
        escape_into(out, &element.text, false);
        out.push('\n');
    }
    for child in &element.children {
        write_element(out, child, depth + 1, indent);
    }
    out.push_str(&pad);
    out.push_str("</");
    out.push_str(&element.name);
    out.push_str(">\n");
}

fn escape_into(out: &mut String, value: &str, in_attribute: bool) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '\'' if in_attribute => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}
