use indextree::NodeId;
use log::{debug, trace};

use crate::document::{Document, DocumentState};
use crate::entity::decode_in_place;
use crate::error::{Error, ParseError, ParseErrorKind};
use crate::span::{BufferSpan, Span};
use crate::xmlvalue::{AttributeData, NodeData, NodeKind};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Tokenizer states. Errors are terminal: the parser stops at the first one
/// and reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between top-level nodes.
    Outside,
    /// Inside a start tag or declaration, between attributes.
    InTag,
    InAttributeName,
    /// Inside a quoted attribute value; holds the quote character.
    InAttributeValue(u8),
    /// Inside element content.
    InText,
    InClosingTag,
}

/// A run of decoded text inside an element.
#[derive(Debug, Clone, Copy)]
struct TextRun {
    span: BufferSpan,
    // written with references or as CDATA; kept even if it decodes to
    // whitespace
    explicit: bool,
}

struct OpenElement {
    node_id: NodeId,
    name: BufferSpan,
    // joined into the value once the element closes
    text: Vec<TextRun>,
}

struct Parser<'b> {
    buf: &'b mut [u8],
    pos: usize,
    state: State,
    doc: Document<'static>,
    open: Vec<OpenElement>,
    // element or declaration whose start tag is being read, with its name
    tag: Option<(NodeId, BufferSpan)>,
    attribute_name: Option<BufferSpan>,
    seen_content: bool,
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
fn is_name_byte(b: u8) -> bool {
    !is_whitespace(b)
        && !matches!(
            b,
            b'<' | b'>' | b'/' | b'=' | b'?' | b'!' | b'"' | b'\'' | b'&'
        )
}

impl<'b> Parser<'b> {
    fn new(buf: &'b mut [u8]) -> Self {
        let pos = if buf.starts_with(UTF8_BOM) {
            UTF8_BOM.len()
        } else {
            0
        };
        Parser {
            buf,
            pos,
            state: State::Outside,
            doc: Document::new(),
            open: Vec::new(),
            tag: None,
            attribute_name: None,
            seen_content: false,
        }
    }

    fn error(&self, kind: ParseErrorKind, offset: usize) -> Error {
        Error::Parse(ParseError::new(kind, &*self.buf, offset))
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    #[inline]
    fn starts_with(&self, s: &[u8]) -> bool {
        self.buf[self.pos..].starts_with(s)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    /// Position of `needle` at or after `from`.
    fn find(&self, from: usize, needle: &[u8]) -> Option<usize> {
        self.buf[from..]
            .windows(needle.len())
            .position(|window| window == needle)
            .map(|i| from + i)
    }

    fn read_name(&mut self) -> Result<BufferSpan, Error> {
        let start = self.pos;
        while self.peek().is_some_and(is_name_byte) {
            self.pos += 1;
        }
        if self.pos == start {
            return match self.peek() {
                None => Err(self.error(ParseErrorKind::UnexpectedEnd, self.pos)),
                Some(_) => Err(self.error(ParseErrorKind::EmptyName, self.pos)),
            };
        }
        Ok(BufferSpan::new(start, self.pos))
    }

    fn str(&self, span: BufferSpan) -> Result<&str, Error> {
        std::str::from_utf8(&self.buf[span.start..span.end()])
            .map_err(|_| self.error(ParseErrorKind::InvalidUtf8, span.start))
    }

    fn name_string(&self, span: BufferSpan) -> String {
        String::from_utf8_lossy(&self.buf[span.start..span.end()]).into_owned()
    }

    fn parent(&self) -> NodeId {
        self.open
            .last()
            .map(|open| open.node_id)
            .unwrap_or(self.doc.root)
    }

    fn content_state(&self) -> State {
        if self.open.is_empty() {
            State::Outside
        } else {
            State::InText
        }
    }

    fn run(&mut self) -> Result<(), Error> {
        loop {
            if self.pos >= self.buf.len() {
                return self.end_of_input();
            }
            match self.state {
                State::Outside => self.outside()?,
                State::InTag => self.in_tag()?,
                State::InAttributeName => self.in_attribute_name()?,
                State::InAttributeValue(quote) => self.in_attribute_value(quote)?,
                State::InText => self.in_text()?,
                State::InClosingTag => self.in_closing_tag()?,
            }
        }
    }

    fn end_of_input(&self) -> Result<(), Error> {
        match self.state {
            State::Outside => Ok(()),
            State::InText => {
                let innermost = self.open.last().map(|open| open.name);
                match innermost {
                    Some(name) => Err(self.error(
                        ParseErrorKind::UnclosedElement(self.name_string(name)),
                        name.start,
                    )),
                    None => Ok(()),
                }
            }
            _ => Err(self.error(ParseErrorKind::UnexpectedEnd, self.pos)),
        }
    }

    fn outside(&mut self) -> Result<(), Error> {
        self.skip_whitespace();
        match self.peek() {
            None => Ok(()),
            Some(b'<') => self.markup(),
            Some(_) => Err(self.error(ParseErrorKind::TextOutsideElement, self.pos)),
        }
    }

    /// Dispatch on whatever starts with `<`.
    fn markup(&mut self) -> Result<(), Error> {
        if self.starts_with(b"<!--") {
            let end = self
                .find(self.pos + 4, b"-->")
                .ok_or_else(|| self.error(ParseErrorKind::UnexpectedEnd, self.buf.len()))?;
            self.pos = end + 3;
            self.seen_content = true;
        } else if self.starts_with(b"<![CDATA[") {
            if self.open.is_empty() {
                return Err(self.error(ParseErrorKind::TextOutsideElement, self.pos));
            }
            let start = self.pos + 9;
            let end = self
                .find(start, b"]]>")
                .ok_or_else(|| self.error(ParseErrorKind::UnexpectedEnd, self.buf.len()))?;
            self.pos = end + 3;
            self.add_text(BufferSpan::new(start, end), true)?;
        } else if self.starts_with(b"<!") {
            if !self.open.is_empty() {
                return Err(self.error(ParseErrorKind::UnexpectedCharacter('!'), self.pos + 1));
            }
            self.skip_doctype()?;
        } else if self.starts_with(b"<?") {
            self.processing_instruction()?;
        } else if self.starts_with(b"</") {
            self.pos += 2;
            self.state = State::InClosingTag;
        } else {
            self.pos += 1;
            self.start_tag()?;
        }
        Ok(())
    }

    fn skip_doctype(&mut self) -> Result<(), Error> {
        let mut depth = 0usize;
        let mut i = self.pos + 2;
        while let Some(&b) = self.buf.get(i) {
            match b {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => {
                    self.pos = i + 1;
                    self.seen_content = true;
                    return Ok(());
                }
                _ => {}
            }
            i += 1;
        }
        Err(self.error(ParseErrorKind::UnexpectedEnd, self.buf.len()))
    }

    fn processing_instruction(&mut self) -> Result<(), Error> {
        let is_declaration = self.starts_with(b"<?xml")
            && self
                .buf
                .get(self.pos + 5)
                .is_some_and(|&b| is_whitespace(b) || b == b'?');
        if !is_declaration {
            let end = self
                .find(self.pos + 2, b"?>")
                .ok_or_else(|| self.error(ParseErrorKind::UnexpectedEnd, self.buf.len()))?;
            self.pos = end + 2;
            self.seen_content = true;
            return Ok(());
        }
        if self.seen_content || !self.open.is_empty() {
            return Err(self.error(ParseErrorKind::MisplacedDeclaration, self.pos));
        }
        let name = BufferSpan::new(self.pos + 2, self.pos + 5);
        self.pos += 5;
        let node_id = self.doc.nodes.new_node(NodeData::new(
            NodeKind::Declaration,
            Span::Buffer(name),
            None,
        ));
        self.doc.root.checked_append(node_id, &mut self.doc.nodes)?;
        self.doc.declaration = Some(node_id);
        self.tag = Some((node_id, name));
        self.seen_content = true;
        self.state = State::InTag;
        Ok(())
    }

    fn start_tag(&mut self) -> Result<(), Error> {
        let name = self.read_name()?;
        let node_id = self.doc.nodes.new_node(NodeData::new(
            NodeKind::Element,
            Span::Buffer(name),
            None,
        ));
        self.parent().checked_append(node_id, &mut self.doc.nodes)?;
        trace!("open element {:?} at {}", self.name_string(name), name.start);
        self.tag = Some((node_id, name));
        self.seen_content = true;
        self.state = State::InTag;
        Ok(())
    }

    fn in_tag(&mut self) -> Result<(), Error> {
        let had_whitespace = self.skip_whitespace();
        let (tag, name) = match self.tag {
            Some(tag) => tag,
            None => return Err(self.error(ParseErrorKind::UnexpectedEnd, self.pos)),
        };
        let is_declaration = self.doc.nodes[tag].get().kind == NodeKind::Declaration;
        match self.peek() {
            None => Err(self.error(ParseErrorKind::UnexpectedEnd, self.pos)),
            Some(b'?') if is_declaration && self.starts_with(b"?>") => {
                self.pos += 2;
                self.tag = None;
                self.state = State::Outside;
                Ok(())
            }
            Some(b'/') if !is_declaration && self.starts_with(b"/>") => {
                self.pos += 2;
                self.tag = None;
                self.state = self.content_state();
                Ok(())
            }
            Some(b'>') if !is_declaration => {
                self.pos += 1;
                self.open.push(OpenElement {
                    node_id: tag,
                    name,
                    text: Vec::new(),
                });
                self.tag = None;
                self.state = State::InText;
                Ok(())
            }
            Some(b) if is_name_byte(b) && had_whitespace => {
                self.state = State::InAttributeName;
                Ok(())
            }
            Some(_) => Err(self.unexpected_character()),
        }
    }

    fn unexpected_character(&self) -> Error {
        let c = std::str::from_utf8(&self.buf[self.pos..])
            .ok()
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        self.error(ParseErrorKind::UnexpectedCharacter(c), self.pos)
    }

    fn in_attribute_name(&mut self) -> Result<(), Error> {
        let name = self.read_name()?;
        self.skip_whitespace();
        match self.peek() {
            Some(b'=') => self.pos += 1,
            None => return Err(self.error(ParseErrorKind::UnexpectedEnd, self.pos)),
            Some(_) => return Err(self.error(ParseErrorKind::ExpectedEquals, self.pos)),
        }
        self.skip_whitespace();
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                self.attribute_name = Some(name);
                self.state = State::InAttributeValue(quote);
                Ok(())
            }
            None => Err(self.error(ParseErrorKind::UnexpectedEnd, self.pos)),
            Some(_) => Err(self.error(ParseErrorKind::UnquotedAttributeValue, self.pos)),
        }
    }

    fn in_attribute_value(&mut self, quote: u8) -> Result<(), Error> {
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd, self.pos)),
                Some(b) if b == quote => break,
                Some(b'<') => {
                    return Err(self.error(ParseErrorKind::InvalidAttributeValue, self.pos))
                }
                Some(_) => self.pos += 1,
            }
        }
        let raw_end = self.pos;
        self.pos += 1;
        let end = self.decode(start, raw_end)?;
        let (name, owner) = match (self.attribute_name.take(), self.tag) {
            (Some(name), Some((owner, _))) => (name, owner),
            _ => return Err(self.error(ParseErrorKind::UnexpectedEnd, start)),
        };
        let index = self.doc.attributes.len();
        self.doc.attributes.push(AttributeData {
            name: Span::Buffer(name),
            value: Span::Buffer(BufferSpan::new(start, end)),
            owner: Some(owner),
        });
        self.doc.nodes[owner].get_mut().attributes.push(index);
        self.state = State::InTag;
        Ok(())
    }

    fn in_text(&mut self) -> Result<(), Error> {
        if self.peek() == Some(b'<') {
            return self.markup();
        }
        let start = self.pos;
        while self.peek().is_some_and(|b| b != b'<') {
            self.pos += 1;
        }
        let explicit = self.buf[start..self.pos].contains(&b'&');
        let end = self.decode(start, self.pos)?;
        self.add_text(BufferSpan::new(start, end), explicit)
    }

    fn in_closing_tag(&mut self) -> Result<(), Error> {
        let found = self.read_name()?;
        self.skip_whitespace();
        match self.peek() {
            Some(b'>') => self.pos += 1,
            None => return Err(self.error(ParseErrorKind::UnexpectedEnd, self.pos)),
            Some(_) => return Err(self.unexpected_character()),
        }
        let open = match self.open.pop() {
            Some(open) => open,
            None => {
                return Err(self.error(
                    ParseErrorKind::UnexpectedCloseTag(self.name_string(found)),
                    found.start,
                ))
            }
        };
        let expected = &self.buf[open.name.start..open.name.end()];
        if expected != &self.buf[found.start..found.end()] {
            return Err(self.error(
                ParseErrorKind::MismatchedCloseTag {
                    expected: self.name_string(open.name),
                    found: self.name_string(found),
                },
                found.start,
            ));
        }
        trace!("close element {:?}", self.name_string(found));
        self.finish_value(open)?;
        self.state = self.content_state();
        Ok(())
    }

    fn decode(&mut self, start: usize, end: usize) -> Result<usize, Error> {
        decode_in_place(self.buf, start, end).map_err(|(kind, offset)| self.error(kind, offset))
    }

    /// Record a run of text for the innermost open element.
    fn add_text(&mut self, text: BufferSpan, explicit: bool) -> Result<(), Error> {
        if text.len == 0 {
            return Ok(());
        }
        match self.open.last_mut() {
            Some(open) => {
                open.text.push(TextRun {
                    span: text,
                    explicit,
                });
                Ok(())
            }
            None => Err(self.error(ParseErrorKind::TextOutsideElement, text.start)),
        }
    }

    fn is_significant(&self, run: &TextRun) -> bool {
        run.explicit
            || !self.buf[run.span.start..run.span.end()]
                .iter()
                .all(|&b| is_whitespace(b))
    }

    /// Turn the text runs of a closed element into its value.
    ///
    /// Whitespace-only runs are dropped unless they were written as
    /// references or CDATA, or whitespace is all the element contains. A
    /// single run stays a view into the buffer; several runs are
    /// joined into the arena, once.
    fn finish_value(&mut self, open: OpenElement) -> Result<(), Error> {
        let mut runs: Vec<BufferSpan> = open
            .text
            .iter()
            .filter(|run| self.is_significant(run))
            .map(|run| run.span)
            .collect();
        if runs.is_empty() && self.doc.nodes[open.node_id].first_child().is_none() {
            runs = open.text.iter().map(|run| run.span).collect();
        }
        let value = match runs.as_slice() {
            [] => return Ok(()),
            [single] => Span::Buffer(*single),
            _ => {
                let mut joined = String::with_capacity(runs.iter().map(|span| span.len).sum());
                for &span in &runs {
                    joined.push_str(self.str(span)?);
                }
                self.doc.allocate(&joined)
            }
        };
        self.doc.nodes[open.node_id].get_mut().value = Some(value);
        Ok(())
    }
}

impl<'a> Document<'a> {
    /// Parse a buffer into a document.
    ///
    /// Parsing is destructive and does not copy: element names, values and
    /// attributes of the resulting document are views into `buffer`, and
    /// entity references are decoded by rewriting the buffer in place. The
    /// buffer no longer holds the original XML afterward, and it stays
    /// borrowed for as long as the document lives. Use
    /// [`Document::into_owned`] to release it.
    ///
    /// Parsing stops at the first structural error and reports it as
    /// [`Error::Parse`] with a position.
    ///
    /// ```rust
    /// use xmlarena::Document;
    ///
    /// let mut buffer = br#"<root a="1 &amp; 2"><child>text</child></root>"#.to_vec();
    /// let doc = Document::parse(&mut buffer)?;
    /// let root = doc.document_element().unwrap();
    /// let a = doc.find_first_attribute(root, "a").unwrap();
    /// assert_eq!(doc.attribute_value(a), "1 & 2");
    /// let child = doc.find_first_child(root, "child").unwrap();
    /// assert_eq!(doc.value(child), Some("text"));
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    pub fn parse(buffer: &'a mut [u8]) -> Result<Document<'a>, Error> {
        if let Err(e) = std::str::from_utf8(buffer) {
            return Err(Error::Parse(ParseError::new(
                ParseErrorKind::InvalidUtf8,
                buffer,
                e.valid_up_to(),
            )));
        }
        let mut parser = Parser::new(buffer);
        parser.run()?;
        let mut doc: Document<'a> = parser.doc;
        doc.state = DocumentState::Parsed;
        // decoding only ever replaces valid text with valid text and pads
        // with spaces, so the buffer is still UTF-8
        let frozen: &'a [u8] = buffer;
        doc.source = std::str::from_utf8(frozen).map_err(|e| {
            Error::Parse(ParseError::new(
                ParseErrorKind::InvalidUtf8,
                frozen,
                e.valid_up_to(),
            ))
        })?;
        debug!(
            "parsed document: {} nodes, {} attributes",
            doc.nodes.count(),
            doc.attributes.len()
        );
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Provenance;

    #[test]
    fn test_parse_simple() {
        let mut buffer = b"<doc/>".to_vec();
        let doc = Document::parse(&mut buffer).unwrap();
        let el = doc.document_element().unwrap();
        assert_eq!(doc.name(el), "doc");
        assert_eq!(doc.value(el), None);
        assert_eq!(doc.state(), DocumentState::Parsed);
    }

    #[test]
    fn test_parse_is_zero_copy() {
        let mut buffer = b"<doc a='x'>text</doc>".to_vec();
        let doc = Document::parse(&mut buffer).unwrap();
        let el = doc.document_element().unwrap();
        assert_eq!(doc.name_provenance(el), Provenance::Buffer);
        assert_eq!(doc.value_provenance(el), Some(Provenance::Buffer));
        assert_eq!(doc.allocated_bytes(), 0);
    }

    #[test]
    fn test_parse_rewrites_buffer() {
        let mut buffer = b"<doc>a&lt;b</doc>".to_vec();
        {
            let doc = Document::parse(&mut buffer).unwrap();
            let el = doc.document_element().unwrap();
            assert_eq!(doc.value(el), Some("a<b"));
        }
        assert_eq!(&buffer, b"<doc>a<b   </doc>");
    }

    #[test]
    fn test_parse_skips_bom() {
        let mut buffer = b"\xEF\xBB\xBF<doc/>".to_vec();
        let doc = Document::parse(&mut buffer).unwrap();
        assert_eq!(doc.name(doc.document_element().unwrap()), "doc");
    }

    #[test]
    fn test_parse_mixed_content_joins_into_arena() {
        let mut buffer = b"<p>Hello <b>world</b>!</p>".to_vec();
        let doc = Document::parse(&mut buffer).unwrap();
        let p = doc.document_element().unwrap();
        assert_eq!(doc.value(p), Some("Hello !"));
        assert_eq!(doc.value_provenance(p), Some(Provenance::Arena));
    }

    #[test]
    fn test_parse_cdata() {
        let mut buffer = b"<doc><![CDATA[<not a tag> &amp;]]></doc>".to_vec();
        let doc = Document::parse(&mut buffer).unwrap();
        let el = doc.document_element().unwrap();
        assert_eq!(doc.value(el), Some("<not a tag> &amp;"));
    }

    #[test]
    fn test_parse_whitespace_is_insignificant() {
        let mut buffer = b"<doc>\n  <a/>\n</doc>".to_vec();
        let doc = Document::parse(&mut buffer).unwrap();
        let el = doc.document_element().unwrap();
        assert_eq!(doc.value(el), None);
        assert_eq!(doc.children(el).count(), 1);
    }

    #[test]
    fn test_parse_whitespace_only_content_is_value() {
        let mut buffer = b"<root><space> </space><tab>\t\n</tab></root>".to_vec();
        let doc = Document::parse(&mut buffer).unwrap();
        let root = doc.document_element().unwrap();
        let space = doc.find_first_child(root, "space").unwrap();
        let tab = doc.find_first_child(root, "tab").unwrap();
        assert_eq!(doc.value(space), Some(" "));
        assert_eq!(doc.value(tab), Some("\t\n"));
        assert_eq!(doc.value(root), None);
    }

    #[test]
    fn test_parse_whitespace_references_are_significant() {
        let mut buffer = b"<p>&#32;<b/>\n</p>".to_vec();
        let doc = Document::parse(&mut buffer).unwrap();
        let p = doc.document_element().unwrap();
        assert_eq!(doc.value(p), Some(" "));
    }

    #[test]
    fn test_parse_many_text_runs_allocate_once() {
        let runs = 20_000;
        let mut xml = String::from("<p>");
        for _ in 0..runs {
            xml.push_str("ab<b/>");
        }
        xml.push_str("</p>");
        let mut buffer = xml.into_bytes();
        let doc = Document::parse(&mut buffer).unwrap();
        let p = doc.document_element().unwrap();
        assert_eq!(doc.value(p).map(str::len), Some(2 * runs));
        assert_eq!(doc.allocated_bytes(), 2 * runs);
    }
}
