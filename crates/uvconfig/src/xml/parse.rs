//! Hand-rolled parser for the uVision XML subset
//!
//! Supports the declaration line, comments, attributes, character and
//! numeric entity references. CDATA, processing instructions and doctypes
//! are rejected; project files never contain them.

use super::Element;

use thiserror::Error;

/// Parse failure with position information where available.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum XmlError {
    #[error("line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("unexpected end of input inside <{context}>")]
    UnexpectedEof { context: String },

    #[error("line {line}: closing tag </{found}> does not match <{expected}>")]
    MismatchedTag {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("line {line}: unknown entity reference &{entity};")]
    UnknownEntity { line: usize, entity: String },
}

/// Parse a complete document and return its root element.
pub fn parse(input: &str) -> Result<Element, XmlError> {
    let mut cur = Cursor::new(input);
    cur.skip_bom();
    cur.skip_declaration()?;
    cur.skip_misc()?;
    if cur.at_end() {
        return Err(cur.syntax("document has no root element"));
    }
    let root = parse_element(&mut cur)?;
    cur.skip_misc()?;
    if !cur.at_end() {
        return Err(cur.syntax("content after document element"));
    }
    Ok(root)
}

fn parse_element(cur: &mut Cursor) -> Result<Element, XmlError> {
    cur.expect("<")?;
    let tag = cur.read_name()?;
    let mut el = Element::new(tag);

    // Attribute list, then either a self-closing or an open tag.
    let open = loop {
        cur.skip_ws();
        if cur.eat("/>") {
            break false;
        }
        if cur.eat(">") {
            break true;
        }
        if cur.at_end() {
            return Err(XmlError::UnexpectedEof { context: el.tag });
        }
        let name = cur.read_name()?;
        cur.skip_ws();
        cur.expect("=")?;
        cur.skip_ws();
        let value = cur.read_quoted()?;
        el.attrs.push((name, value));
    };
    if !open {
        return Ok(el);
    }

    let mut text = String::new();
    loop {
        if cur.at_end() {
            return Err(XmlError::UnexpectedEof { context: el.tag });
        }
        if cur.starts_with("<!--") {
            cur.skip_comment()?;
        } else if cur.starts_with("</") {
            let line = cur.line;
            cur.eat("</");
            let close = cur.read_name()?;
            if close != el.tag {
                return Err(XmlError::MismatchedTag {
                    line,
                    expected: el.tag,
                    found: close,
                });
            }
            cur.skip_ws();
            cur.expect(">")?;
            break;
        } else if cur.starts_with("<!") || cur.starts_with("<?") {
            return Err(cur.syntax("unsupported markup in element content"));
        } else if cur.starts_with("<") {
            el.children.push(parse_element(cur)?);
        } else {
            cur.read_text(&mut text)?;
        }
    }

    // Text only counts for leaves; inter-child whitespace is formatting.
    if el.children.is_empty() && !text.trim().is_empty() {
        el.text = text;
    }
    Ok(el)
}

struct Cursor<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            text: input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if b & 0xc0 != 0x80 {
            // Count characters, not UTF-8 continuation bytes.
            self.column += 1;
        }
        Some(b)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            for _ in 0..s.len() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    fn expect(&mut self, s: &str) -> Result<(), XmlError> {
        if self.eat(s) {
            Ok(())
        } else {
            Err(self.syntax(format!("expected `{s}`")))
        }
    }

    fn syntax(&self, message: impl Into<String>) -> XmlError {
        XmlError::Syntax {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    fn skip_bom(&mut self) {
        self.eat("\u{feff}");
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.bump();
        }
    }

    fn skip_declaration(&mut self) -> Result<(), XmlError> {
        self.skip_ws();
        if self.eat("<?xml") {
            while !self.eat("?>") {
                if self.bump().is_none() {
                    return Err(self.syntax("unterminated XML declaration"));
                }
            }
        }
        Ok(())
    }

    /// Skip whitespace and comments between markup.
    fn skip_misc(&mut self) -> Result<(), XmlError> {
        loop {
            self.skip_ws();
            if self.starts_with("<!--") {
                self.skip_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), XmlError> {
        self.eat("<!--");
        while !self.eat("-->") {
            if self.bump().is_none() {
                return Err(self.syntax("unterminated comment"));
            }
        }
        Ok(())
    }

    /// Tag or attribute name. Allows the `xmlns:xsi` colon form used on
    /// the document root.
    fn read_name(&mut self) -> Result<String, XmlError> {
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                self.bump();
            }
            _ => return Err(self.syntax("expected a name")),
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':') {
                self.bump();
            } else {
                break;
            }
        }
        Ok(self.text[start..self.pos].to_string())
    }

    fn read_quoted(&mut self) -> Result<String, XmlError> {
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => {
                self.bump();
                q
            }
            _ => return Err(self.syntax("expected a quoted attribute value")),
        };
        let mut out = String::new();
        loop {
            let start = self.pos;
            while let Some(b) = self.peek() {
                if b == quote || b == b'&' {
                    break;
                }
                self.bump();
            }
            out.push_str(&self.text[start..self.pos]);
            match self.peek() {
                None => return Err(self.syntax("unterminated attribute value")),
                Some(b'&') => {
                    let c = self.read_entity()?;
                    out.push(c);
                }
                Some(_) => {
                    self.bump();
                    return Ok(out);
                }
            }
        }
    }

    /// Character data up to the next markup boundary.
    fn read_text(&mut self, out: &mut String) -> Result<(), XmlError> {
        loop {
            let start = self.pos;
            while let Some(b) = self.peek() {
                if b == b'<' || b == b'&' {
                    break;
                }
                self.bump();
            }
            out.push_str(&self.text[start..self.pos]);
            match self.peek() {
                Some(b'&') => {
                    let c = self.read_entity()?;
                    out.push(c);
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_entity(&mut self) -> Result<char, XmlError> {
        let line = self.line;
        self.bump(); // consume '&'
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b';' {
                let name = self.text[start..self.pos].to_string();
                self.bump();
                return decode_entity(&name).ok_or(XmlError::UnknownEntity { line, entity: name });
            }
            if self.pos - start > 10 {
                break;
            }
            self.bump();
        }
        Err(self.syntax("unterminated entity reference"))
    }
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        }
    }
}
