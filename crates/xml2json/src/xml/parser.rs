//! XML parser implementation

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::lexer::Cursor;
use crate::xml::model::{Content, Document, Element};

/// Limits applied while parsing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 10 * 1024 * 1024, // 10 MB default
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
    depth: u16,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new parser with custom configuration
    pub const fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            depth: 0,
        }
    }

    /// Parse a complete XML document
    pub fn parse(&mut self) -> Result<Document> {
        if self.config.max_size > 0 && self.cursor.input_len() > self.config.max_size {
            return Err(Error::at(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                self.cursor.position(),
            ));
        }

        if self.cursor.starts_with(b"\xEF\xBB\xBF") {
            self.cursor.advance_by(3);
        }

        self.skip_prolog_markup()?;
        match self.cursor.current() {
            None => return Err(Error::at(ErrorKind::MissingRoot, self.cursor.position())),
            Some(b'<') => {}
            Some(_) => return Err(self.error_here("expected root element")),
        }

        let root = self.parse_element()?;
        self.skip_prolog_markup()?;

        if !self.cursor.is_eof() {
            return Err(Error::at(
                ErrorKind::TrailingContent,
                self.cursor.position(),
            ));
        }

        Ok(Document { root })
    }

    /// Skip whitespace, comments, processing instructions and DOCTYPE
    fn skip_prolog_markup(&mut self) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                self.skip_processing_instruction()?;
            } else if self.cursor.starts_with(b"<!--") {
                self.skip_comment()?;
            } else if self.cursor.starts_with(b"<!") {
                self.skip_doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.expect_byte(b'<')?;
        self.enter()?;

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        if self.cursor.consume(b'/') {
            self.expect_byte(b'>')?;
            self.leave();
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
            });
        }

        self.expect_byte(b'>')?;

        let mut children = Vec::new();
        loop {
            if self.cursor.starts_with(b"</") {
                let close_pos = self.cursor.position();
                self.cursor.advance_by(2);
                let close_name = self.parse_name()?;
                if close_name != name {
                    return Err(Error::at(
                        ErrorKind::MismatchedTag {
                            expected: name,
                            found: close_name,
                        },
                        close_pos,
                    ));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                break;
            }

            if self.cursor.starts_with(b"<!--") {
                self.skip_comment()?;
                continue;
            }

            if self.cursor.starts_with(b"<![CDATA[") {
                children.push(Content::Text(self.parse_cdata()?));
                continue;
            }

            if self.cursor.starts_with(b"<?") {
                self.skip_processing_instruction()?;
                continue;
            }

            if self.cursor.starts_with(b"<!") {
                return Err(self.error_here("unexpected declaration inside element"));
            }

            if self.cursor.current() == Some(b'<') {
                let child = self.parse_element()?;
                children.push(Content::Element(child));
                continue;
            }

            if self.cursor.is_eof() {
                return Err(Error::with_message(
                    ErrorKind::UnexpectedEof,
                    Span::at(self.cursor.position()),
                    format!("unterminated element <{name}>"),
                ));
            }

            children.push(Content::Text(self.parse_text()?));
        }

        self.leave();
        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    fn enter(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_add(1);
        if self.config.max_depth > 0 && self.depth > self.config.max_depth {
            return Err(Error::at(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                self.cursor.position(),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/' | b'>') => break,
                Some(_) => {}
                None => return Err(self.eof_here()),
            }

            let name_pos = self.cursor.position();
            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(Error::at(ErrorKind::DuplicateAttribute { name }, name_pos));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(self.error_here("expected quoted attribute value")),
        };
        self.cursor.advance();

        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = normalize_attribute(bytes_to_str(raw, start_pos)?);
                return decode_entities(&text, start_pos);
            }
            if b == b'<' {
                return Err(self.error_here("'<' not allowed in attribute value"));
            }
            self.cursor.advance();
        }

        Err(self.eof_here())
    }

    fn parse_text(&mut self) -> Result<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = normalize_line_endings(bytes_to_str(raw, start_pos)?);
        decode_entities(&text, start_pos)
    }

    fn parse_cdata(&mut self) -> Result<String> {
        self.cursor.advance_by(b"<![CDATA[".len());
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(b"]]>") {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance_by(3);
                return bytes_to_str(raw, start_pos)
                    .map(|text| normalize_line_endings(text).into_owned());
            }
            self.cursor.advance();
        }
        Err(self.unterminated("CDATA section"))
    }

    fn parse_name(&mut self) -> Result<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();

        match self.cursor.current() {
            Some(first) if is_name_start(first) => self.cursor.advance(),
            Some(_) => return Err(self.error_here("expected name")),
            None => return Err(self.eof_here()),
        }

        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        let raw = self.cursor.slice_from(start);
        bytes_to_str(raw, start_pos).map(str::to_string)
    }

    fn skip_comment(&mut self) -> Result<()> {
        self.cursor.advance_by(4);
        self.skip_until(b"-->", "comment")
    }

    fn skip_processing_instruction(&mut self) -> Result<()> {
        self.cursor.advance_by(2);
        self.skip_until(b"?>", "processing instruction")
    }

    /// Skip `<!DOCTYPE ...>` including an internal `[...]` subset
    fn skip_doctype(&mut self) -> Result<()> {
        self.cursor.advance_by(2);
        let mut brackets = 0usize;
        let mut quote = None;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match (quote, b) {
                (Some(q), _) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => brackets += 1,
                (None, b']') => brackets = brackets.saturating_sub(1),
                (None, b'>') if brackets == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.unterminated("declaration"))
    }

    fn skip_until(&mut self, pattern: &[u8], what: &str) -> Result<()> {
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                self.cursor.advance_by(pattern.len());
                return Ok(());
            }
            self.cursor.advance();
        }
        Err(self.unterminated(what))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        match self.cursor.current() {
            Some(b) if b == expected => {
                self.cursor.advance();
                Ok(())
            }
            Some(_) => Err(self.error_here(&format!("expected '{}'", char::from(expected)))),
            None => Err(self.eof_here()),
        }
    }

    fn error_here(&self, message: &str) -> Error {
        Error::with_message(
            ErrorKind::InvalidToken,
            Span::at(self.cursor.position()),
            message,
        )
    }

    fn eof_here(&self) -> Error {
        Error::at(ErrorKind::UnexpectedEof, self.cursor.position())
    }

    fn unterminated(&self, what: &str) -> Error {
        Error::with_message(
            ErrorKind::UnexpectedEof,
            Span::at(self.cursor.position()),
            format!("unterminated {what}"),
        )
    }
}

fn bytes_to_str(bytes: &[u8], pos: Pos) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|_| Error::at(ErrorKind::InvalidUtf8, pos))
}

/// Translate `\r\n` and lone `\r` to `\n`
fn normalize_line_endings(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }
    Cow::Owned(input.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Line endings first, then every `\n` and `\t` becomes a space.
/// Runs before entity decoding so `&#10;` and `&#9;` survive.
fn normalize_attribute(input: &str) -> Cow<'_, str> {
    if !input.contains(['\r', '\n', '\t']) {
        return Cow::Borrowed(input);
    }
    Cow::Owned(
        normalize_line_endings(input)
            .chars()
            .map(|c| if matches!(c, '\n' | '\t') { ' ' } else { c })
            .collect(),
    )
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entities(input: &str, pos: Pos) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        let (before, after) = rest.split_at(amp);
        result.push_str(before);

        let after = after.get(1..).unwrap_or_default();
        let Some(semi) = after.find(';') else {
            return Err(invalid_entity(after, pos));
        };
        let entity = after.get(..semi).unwrap_or_default();

        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(entity),
        };

        match decoded {
            Some(ch) => result.push(ch),
            None => return Err(invalid_entity(entity, pos)),
        }
        rest = after.get(semi + 1..).unwrap_or_default();
    }
    result.push_str(rest);

    Ok(result)
}

fn invalid_entity(entity: &str, pos: Pos) -> Error {
    Error::at(
        ErrorKind::InvalidEntity {
            entity: entity.to_string(),
        },
        pos,
    )
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Document> {
        Parser::new(input.as_bytes()).parse()
    }

    #[test]
    fn test_parse_simple_element() -> Result<()> {
        let doc = parse("<root></root>")?;
        assert_eq!(doc.root.name, "root");
        assert!(doc.root.children.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_with_attributes() -> Result<()> {
        let doc = parse("<root id=\"1\" name='test'></root>")?;
        assert_eq!(doc.root.attributes.get("id"), Some(&"1".to_string()));
        assert_eq!(doc.root.attributes.get("name"), Some(&"test".to_string()));
        Ok(())
    }

    #[test]
    fn test_parse_nested_text() -> Result<()> {
        let doc = parse("<root><child>text</child></root>")?;
        let expected = Element::new("root").with_child(Element::new("child").with_text("text"));
        assert_eq!(doc.root, expected);
        Ok(())
    }

    #[test]
    fn test_whitespace_text_is_kept() -> Result<()> {
        let doc = parse("<root>\n  <a/>\n</root>")?;
        assert_eq!(
            doc.root.children,
            vec![
                Content::Text("\n  ".to_string()),
                Content::Element(Element::new("a")),
                Content::Text("\n".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_line_endings_are_normalized() -> Result<()> {
        let doc = parse("<root>a\r\nb\rc<![CDATA[d\r\ne]]></root>")?;
        assert_eq!(
            doc.root.children,
            vec![
                Content::Text("a\nb\nc".to_string()),
                Content::Text("d\ne".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_attribute_whitespace_is_normalized() -> Result<()> {
        let doc = parse("<e a=\"1\n2\tz\" b=\"x\r\ny\" c=\"p&#10;q&#9;r\"/>")?;
        assert_eq!(doc.root.attributes.get("a"), Some(&"1 2 z".to_string()));
        assert_eq!(doc.root.attributes.get("b"), Some(&"x y".to_string()));
        assert_eq!(doc.root.attributes.get("c"), Some(&"p\nq\tr".to_string()));
        Ok(())
    }

    #[test]
    fn test_parse_self_closing() -> Result<()> {
        let doc = parse("<root><child /></root>")?;
        assert_eq!(doc.root, Element::new("root").with_child(Element::new("child")));
        Ok(())
    }

    #[test]
    fn test_prolog_and_epilog_are_skipped() -> Result<()> {
        let input = "\u{feff}<?xml version=\"1.0\"?>\n<!DOCTYPE note [<!ENTITY x \"y\">]>\n<!-- c -->\n<note/>\n<!-- trailing -->\n";
        let doc = parse(input)?;
        assert_eq!(doc.root.name, "note");
        Ok(())
    }

    #[test]
    fn test_cdata_and_entities_become_text() -> Result<()> {
        let doc = parse("<r><![CDATA[<b>&amp;</b>]]><!-- skip -->a &lt; b &#65;&#x42;</r>")?;
        assert_eq!(
            doc.root.children,
            vec![
                Content::Text("<b>&amp;</b>".to_string()),
                Content::Text("a < b AB".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_mismatched_tag() {
        let err = parse("<a><b></a></b>").err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::MismatchedTag {
                expected: "b".to_string(),
                found: "a".to_string()
            })
        );
    }

    #[test]
    fn test_duplicate_attribute() {
        let err = parse("<a x='1' x='2'/>").err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::DuplicateAttribute {
                name: "x".to_string()
            })
        );
    }

    #[test]
    fn test_structural_failures() {
        let cases = [
            ("", ErrorKind::MissingRoot),
            ("  <!-- only -->  ", ErrorKind::MissingRoot),
            ("<a>", ErrorKind::UnexpectedEof),
            ("<a/><b/>", ErrorKind::TrailingContent),
            ("<a>&bogus;</a>", ErrorKind::InvalidEntity {
                entity: "bogus".to_string(),
            }),
            ("text", ErrorKind::InvalidToken),
            ("<a><!-- open</a>", ErrorKind::UnexpectedEof),
        ];
        for (input, kind) in cases {
            let err = parse(input).err();
            assert_eq!(err.map(|e| e.kind().clone()), Some(kind), "input: {input:?}");
        }
    }

    #[test]
    fn test_error_position() {
        let err = parse("<a>\n  <b></c>\n</a>").err();
        let start = err.map(|e| e.span().start);
        assert_eq!(start, Some(Pos::new(9, 2, 6)));
    }

    #[test]
    fn test_depth_limit() {
        let input = "<a><b><c><d/></c></b></a>";
        let mut parser = Parser::with_config(input.as_bytes(), Config::new(3, 0));
        let err = parser.parse().err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::MaxDepthExceeded { max: 3 })
        );

        let mut parser = Parser::with_config(input.as_bytes(), Config::new(4, 0));
        assert!(parser.parse().is_ok());
    }

    #[test]
    fn test_size_limit() {
        let input = "<root>0123456789</root>";
        let mut parser = Parser::with_config(input.as_bytes(), Config::new(0, 8));
        let err = parser.parse().err();
        assert_eq!(
            err.map(|e| e.kind().clone()),
            Some(ErrorKind::MaxSizeExceeded { max: 8 })
        );

        let mut parser = Parser::with_config(input.as_bytes(), Config::unlimited());
        assert!(parser.parse().is_ok());
    }
}
