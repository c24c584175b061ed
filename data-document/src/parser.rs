//! Recursive-descent parser for the document subset.

use data_error::{Result, TeambuilderError};

use crate::{Document, Element};

pub(crate) fn parse(input: &str) -> Result<Document> {
    let mut cur = Cursor::new(input);
    cur.skip_misc()?;
    if cur.peek().is_none() {
        return Err(cur.error("expected a root element, found end of input"));
    }
    let root = parse_element(&mut cur)?;
    cur.skip_misc()?;
    if let Some(c) = cur.peek() {
        return Err(cur.error(format!(
            "unexpected content after the root element: `{}`",
            c
        )));
    }
    let mut document = Document::new();
    document.append(root);
    Ok(document)
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn starts_with(&self, pat: &str) -> bool {
        self.rest().starts_with(pat)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn error(&self, msg: impl Into<String>) -> TeambuilderError {
        self.error_at(self.line, self.col, msg)
    }

    fn error_at(
        &self,
        line: usize,
        col: usize,
        msg: impl Into<String>,
    ) -> TeambuilderError {
        TeambuilderError::Parse {
            msg: msg.into(),
            line,
            col,
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        let (line, col) = (self.line, self.col);
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error_at(
                line,
                col,
                format!("expected `{}`, found `{}`", expected, c),
            )),
            None => Err(self.error_at(
                line,
                col,
                format!("expected `{}`, found end of input", expected),
            )),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Skip whitespace, `<?...?>` declarations and comments.
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace();
            if self.starts_with("<?") {
                self.skip_until("?>", "declaration")?;
            } else if self.starts_with("<!--") {
                self.skip_until("-->", "comment")?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_until(&mut self, pat: &str, what: &str) -> Result<()> {
        let (line, col) = (self.line, self.col);
        while !self.starts_with(pat) {
            if self.bump().is_none() {
                return Err(self.error_at(
                    line,
                    col,
                    format!("unterminated {}", what),
                ));
            }
        }
        for _ in 0..pat.chars().count() {
            self.bump();
        }
        Ok(())
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

fn parse_name(cur: &mut Cursor) -> Result<String> {
    match cur.peek() {
        Some(c) if is_name_start(c) => {}
        Some(c) => {
            return Err(cur.error(format!("expected a name, found `{}`", c)))
        }
        None => {
            return Err(cur.error("expected a name, found end of input"))
        }
    }
    let mut name = String::new();
    while let Some(c) = cur.peek() {
        if !is_name_char(c) {
            break;
        }
        name.push(c);
        cur.bump();
    }
    Ok(name)
}

fn parse_element(cur: &mut Cursor) -> Result<Element> {
    cur.expect('<')?;
    let name = parse_name(cur)?;
    let mut element = Element::new(name);

    // attributes until `>` or `/>`
    loop {
        cur.skip_whitespace();
        match cur.peek() {
            Some('/') => {
                cur.bump();
                cur.expect('>')?;
                return Ok(element);
            }
            Some('>') => {
                cur.bump();
                break;
            }
            Some(c) if is_name_start(c) => {
                let (line, col) = (cur.line, cur.col);
                let key = parse_name(cur)?;
                if element.has_attribute(&key) {
                    return Err(cur.error_at(
                        line,
                        col,
                        format!("duplicate attribute `{}`", key),
                    ));
                }
                cur.skip_whitespace();
                cur.expect('=')?;
                cur.skip_whitespace();
                let value = parse_quoted(cur)?;
                element.set_attribute(key, value);
            }
            Some(c) => {
                return Err(cur.error(format!(
                    "unexpected character `{}` inside tag `{}`",
                    c,
                    element.name()
                )))
            }
            None => {
                return Err(cur.error(format!(
                    "unexpected end of input inside tag `{}`",
                    element.name()
                )))
            }
        }
    }

    // children and text until the matching closing tag
    let mut text = String::new();
    loop {
        match cur.peek() {
            None => {
                return Err(cur.error(format!(
                    "missing closing tag for `{}`",
                    element.name()
                )))
            }
            Some('<') => {
                if cur.starts_with("<!--") {
                    cur.skip_until("-->", "comment")?;
                } else if cur.starts_with("</") {
                    let (line, col) = (cur.line, cur.col);
                    cur.bump();
                    cur.bump();
                    let close = parse_name(cur)?;
                    if close != element.name() {
                        return Err(cur.error_at(
                            line,
                            col,
                            format!(
                                "mismatched closing tag: expected `</{}>`, found `</{}>`",
                                element.name(),
                                close
                            ),
                        ));
                    }
                    cur.skip_whitespace();
                    cur.expect('>')?;
                    break;
                } else {
                    let child = parse_element(cur)?;
                    element.push_child(child);
                }
            }
            Some('&') => text.push(parse_reference(cur)?),
            Some(c) => {
                cur.bump();
                text.push(c);
            }
        }
    }
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        element.set_text(trimmed);
    }
    Ok(element)
}

fn parse_quoted(cur: &mut Cursor) -> Result<String> {
    let (line, col) = (cur.line, cur.col);
    let quote = match cur.bump() {
        Some(c @ ('"' | '\'')) => c,
        Some(c) => {
            return Err(cur.error_at(
                line,
                col,
                format!("expected a quoted value, found `{}`", c),
            ))
        }
        None => {
            return Err(cur.error_at(
                line,
                col,
                "expected a quoted value, found end of input",
            ))
        }
    };
    let mut value = String::new();
    loop {
        match cur.peek() {
            None => {
                return Err(cur.error_at(
                    line,
                    col,
                    "unterminated attribute value",
                ))
            }
            Some(c) if c == quote => {
                cur.bump();
                return Ok(value);
            }
            Some('&') => value.push(parse_reference(cur)?),
            Some('<') => {
                return Err(cur
                    .error("`<` is not allowed inside attribute values"))
            }
            Some(c) => {
                cur.bump();
                value.push(c);
            }
        }
    }
}

/// Decode an entity (`&amp;`) or character (`&#65;`, `&#x41;`)
/// reference, with the cursor on the `&`.
fn parse_reference(cur: &mut Cursor) -> Result<char> {
    let (line, col) = (cur.line, cur.col);
    cur.bump();
    let mut entity = String::new();
    loop {
        match cur.bump() {
            Some(';') => break,
            Some(c) if entity.len() < 8 => entity.push(c),
            _ => {
                return Err(cur.error_at(
                    line,
                    col,
                    "malformed entity reference",
                ))
            }
        }
    }
    let decoded = match entity.as_str() {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            if let Some(digits) =
                entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(digits, 16)
                    .ok()
                    .and_then(char::from_u32)
            } else if let Some(digits) = entity.strip_prefix('#') {
                digits.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                None
            }
        }
    };
    decoded.ok_or_else(|| {
        cur.error_at(
            line,
            col,
            format!("unknown entity reference `&{};`", entity),
        )
    })
}
