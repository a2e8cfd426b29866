use std::fmt;

use crate::source::ResultCode;

/// Errors returned by document operations.
#[derive(Debug)]
pub enum Error {
    /// A required argument was missing or unusable, such as an empty name.
    InvalidArgument(String),
    /// The operation would break the tree structure, or was handed a node or
    /// attribute that does not belong to this document.
    InvalidOperation(String),
    /// The buffer could not be parsed.
    Parse(ParseError),
    /// The file-loading collaborator reported a failure. The code is passed
    /// through unchanged.
    Source(ResultCode),
    /// Writing serialized output failed.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidArgument(message) => write!(f, "invalid argument: {}", message),
            Error::InvalidOperation(message) => write!(f, "invalid operation: {}", message),
            Error::Parse(err) => write!(f, "parse error: {}", err),
            Error::Source(code) => write!(f, "cannot load source: {}", code),
            Error::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for Error {
    #[inline]
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<std::io::Error> for Error {
    #[inline]
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<indextree::NodeError> for Error {
    #[inline]
    fn from(e: indextree::NodeError) -> Self {
        Error::InvalidOperation(e.to_string())
    }
}

/// A row/column position in the parsed text. Both are 1-based; the column
/// counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextPos {
    /// Line number.
    pub row: usize,
    /// Character offset within the line.
    pub col: usize,
}

impl TextPos {
    /// Construct a new position.
    pub fn new(row: usize, col: usize) -> Self {
        TextPos { row, col }
    }

    pub(crate) fn from_offset(text: &[u8], offset: usize) -> Self {
        let before = &text[..offset.min(text.len())];
        let row = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        // count lead bytes only so multi-byte characters are one column
        let col = before[line_start..]
            .iter()
            .filter(|&&b| (b & 0xC0) != 0x80)
            .count()
            + 1;
        TextPos { row, col }
    }
}

impl fmt::Display for TextPos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

/// What went wrong while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The buffer is not valid UTF-8.
    InvalidUtf8,
    /// The buffer ended inside a tag, comment, CDATA section or other markup.
    UnexpectedEnd,
    /// The buffer ended while this element was still open.
    UnclosedElement(String),
    /// A close tag does not match the innermost open element.
    MismatchedCloseTag {
        /// Name of the innermost open element.
        expected: String,
        /// Name found in the close tag.
        found: String,
    },
    /// A close tag appeared while no element was open.
    UnexpectedCloseTag(String),
    /// A tag or attribute name is missing.
    EmptyName,
    /// A character that is not allowed at this point.
    UnexpectedCharacter(char),
    /// An attribute name is not followed by `=`.
    ExpectedEquals,
    /// An attribute value is not enclosed in `"` or `'`.
    UnquotedAttributeValue,
    /// An attribute value contains an unescaped `<`.
    InvalidAttributeValue,
    /// An `&` without a terminating `;`.
    UnclosedEntity,
    /// An entity other than the five predefined ones.
    UnknownEntity(String),
    /// A character reference that does not denote a valid character.
    InvalidCharacterReference(String),
    /// Non-whitespace text outside of any element.
    TextOutsideElement,
    /// An XML declaration after other content.
    MisplacedDeclaration,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidUtf8 => write!(f, "invalid UTF-8"),
            ParseErrorKind::UnexpectedEnd => write!(f, "unexpected end of input"),
            ParseErrorKind::UnclosedElement(name) => write!(f, "element '{}' is not closed", name),
            ParseErrorKind::MismatchedCloseTag { expected, found } => {
                write!(f, "expected close tag '{}', not '{}'", expected, found)
            }
            ParseErrorKind::UnexpectedCloseTag(name) => {
                write!(f, "close tag '{}' without open element", name)
            }
            ParseErrorKind::EmptyName => write!(f, "missing name"),
            ParseErrorKind::UnexpectedCharacter(c) => write!(f, "unexpected character {:?}", c),
            ParseErrorKind::ExpectedEquals => write!(f, "expected '=' after attribute name"),
            ParseErrorKind::UnquotedAttributeValue => write!(f, "attribute value is not quoted"),
            ParseErrorKind::InvalidAttributeValue => {
                write!(f, "unescaped '<' in attribute value")
            }
            ParseErrorKind::UnclosedEntity => write!(f, "entity reference is not closed"),
            ParseErrorKind::UnknownEntity(name) => write!(f, "unknown entity '{}'", name),
            ParseErrorKind::InvalidCharacterReference(reference) => {
                write!(f, "invalid character reference '{}'", reference)
            }
            ParseErrorKind::TextOutsideElement => write!(f, "text outside of an element"),
            ParseErrorKind::MisplacedDeclaration => {
                write!(f, "XML declaration must come before any other content")
            }
        }
    }
}

/// A parse failure: the first structural violation found in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    offset: usize,
    pos: TextPos,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, text: &[u8], offset: usize) -> Self {
        ParseError {
            kind,
            offset,
            pos: TextPos::from_offset(text, offset),
        }
    }

    /// What went wrong.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Byte offset into the buffer where the problem was detected.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Row and column where the problem was detected.
    pub fn pos(&self) -> TextPos {
        self.pos
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.pos)
    }
}

impl std::error::Error for ParseError {}
