/// Where the bytes of a piece of document text physically live.
///
/// Text created through the builder API, or copied by
/// [`Document::into_owned`](crate::Document::into_owned), lives in the
/// document's own arena. Text produced by
/// [`Document::parse`](crate::Document::parse) is a view into the caller's
/// buffer and is only readable while that buffer is borrowed by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Provenance {
    /// Owned by the document's string arena.
    Arena,
    /// Borrowed from the buffer the document was parsed from.
    Buffer,
}

/// A byte range into the string arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ArenaSpan {
    pub(crate) start: usize,
    pub(crate) len: usize,
}

impl ArenaSpan {
    #[inline]
    pub(crate) fn end(&self) -> usize {
        self.start + self.len
    }
}

/// A byte range into the parse buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct BufferSpan {
    pub(crate) start: usize,
    pub(crate) len: usize,
}

impl BufferSpan {
    #[inline]
    pub(crate) fn new(start: usize, end: usize) -> Self {
        BufferSpan {
            start,
            len: end - start,
        }
    }

    #[inline]
    pub(crate) fn end(&self) -> usize {
        self.start + self.len
    }
}

/// A text span. Neither variant holds a pointer; the owning document resolves
/// it against its arena or its borrowed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Span {
    Arena(ArenaSpan),
    Buffer(BufferSpan),
}

impl Span {
    pub(crate) fn provenance(&self) -> Provenance {
        match self {
            Span::Arena(_) => Provenance::Arena,
            Span::Buffer(_) => Provenance::Buffer,
        }
    }
}
