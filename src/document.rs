use std::sync::atomic::{AtomicU32, Ordering};

use ahash::HashMap;
use indextree::{Arena, NodeId};
use log::debug;

use crate::arena::StringArena;
use crate::error::Error;
use crate::span::{ArenaSpan, Span};
use crate::xmlvalue::{AttributeData, AttributeIndex, NodeData, NodeKind};

pub(crate) type XmlArena = Arena<NodeData>;

static NEXT_DOCUMENT_ID: AtomicU32 = AtomicU32::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct DocumentId(u32);

impl DocumentId {
    fn next() -> Self {
        DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A node in a document: the document root, a declaration or an element.
///
/// This is a lightweight handle and can be copied. It remembers which
/// document created it; handing it to another document is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node {
    pub(crate) document: DocumentId,
    pub(crate) id: NodeId,
}

impl Node {
    #[inline]
    pub(crate) fn new(document: DocumentId, id: NodeId) -> Self {
        Node { document, id }
    }
}

/// An attribute of an element or declaration. A lightweight, copyable handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub(crate) document: DocumentId,
    pub(crate) index: AttributeIndex,
}

/// How the content of a document came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DocumentState {
    /// Created with [`Document::new`] and not touched since.
    Empty,
    /// Produced by [`Document::parse`].
    Parsed,
    /// Created with [`Document::create`], or an empty document that has been
    /// built on.
    Built,
}

/// An XML document: the owner of all nodes, attributes and text.
///
/// A document owns a string arena for every piece of text it creates, and an
/// arena of nodes addressed by [`Node`] handles. Dropping the document
/// releases all of it at once.
///
/// The lifetime `'a` is the lifetime of the buffer a document was parsed
/// from: element names, values and attributes of a parsed document are views
/// into that buffer, so the buffer stays borrowed for as long as the
/// document lives. Documents built from scratch are `Document<'static>`, and
/// [`Document::into_owned`] turns a parsed document into one by copying every
/// borrowed span into the arena.
///
/// Handles outlive nothing: once the document is dropped, its `Node` and
/// `Attribute` values are inert and any other document rejects them.
pub struct Document<'a> {
    pub(crate) id: DocumentId,
    pub(crate) source: &'a str,
    pub(crate) strings: StringArena,
    pub(crate) nodes: XmlArena,
    pub(crate) attributes: Vec<AttributeData>,
    pub(crate) root: NodeId,
    pub(crate) declaration: Option<NodeId>,
    pub(crate) state: DocumentState,
}

impl Document<'static> {
    /// Create a new, empty document.
    ///
    /// ```rust
    /// use xmlarena::{Document, DocumentState};
    ///
    /// let doc = Document::new();
    /// assert_eq!(doc.state(), DocumentState::Empty);
    /// assert_eq!(doc.top_level().count(), 0);
    /// ```
    pub fn new() -> Self {
        let mut nodes = XmlArena::new();
        let mut strings = StringArena::new();
        let empty = strings.allocate("");
        let root = nodes.new_node(NodeData::new(
            NodeKind::Document,
            Span::Arena(empty),
            None,
        ));
        Document {
            id: DocumentId::next(),
            source: "",
            strings,
            nodes,
            attributes: Vec::new(),
            root,
            declaration: None,
            state: DocumentState::Empty,
        }
    }

    /// Create a document with an XML declaration.
    ///
    /// The declaration carries `version` formatted as `"<version>.0"` and
    /// `encoding` as attributes. It is not attached yet: get it with
    /// [`Document::declaration`] and attach it with
    /// [`Document::append_top_level`] when you want it serialized.
    ///
    /// Fails with [`Error::InvalidArgument`] if `encoding` is not a known
    /// encoding label.
    ///
    /// ```rust
    /// use xmlarena::Document;
    ///
    /// let mut doc = Document::create(1, "utf-8")?;
    /// let declaration = doc.declaration().unwrap();
    /// doc.append_top_level(declaration)?;
    /// let root = doc.create_element("root", "")?;
    /// doc.append_top_level(root)?;
    /// assert_eq!(
    ///     doc.to_string()?,
    ///     r#"<?xml version="1.0" encoding="utf-8"?><root/>"#
    /// );
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    pub fn create(version: u8, encoding: &str) -> Result<Self, Error> {
        let mut doc = Document::new();
        let declaration = doc.create_declaration(version, encoding)?;
        doc.declaration = Some(declaration.id);
        doc.state = DocumentState::Built;
        Ok(doc)
    }
}

impl Default for Document<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Document<'a> {
    /// The document root. Its children are the top-level nodes.
    ///
    /// This is not the document element; use it as the parent in
    /// [`Document::find_first_child`] to search at document level.
    #[inline]
    pub fn root(&self) -> Node {
        self.node(self.root)
    }

    /// How this document came to be.
    #[inline]
    pub fn state(&self) -> DocumentState {
        self.state
    }

    /// The declaration created by [`Document::create`] or
    /// [`Document::set_header`], or found by [`Document::parse`].
    pub fn declaration(&self) -> Option<Node> {
        self.declaration.map(|id| self.node(id))
    }

    /// Bytes held by the string arena, including values that have since been
    /// replaced.
    pub fn allocated_bytes(&self) -> usize {
        self.strings.allocated_bytes()
    }

    /// Returns true if no text in the document refers to the parse buffer.
    ///
    /// ```rust
    /// use xmlarena::Document;
    ///
    /// let mut buffer = b"<doc a='1'>text</doc>".to_vec();
    /// let doc = Document::parse(&mut buffer)?;
    /// assert!(!doc.is_self_contained());
    /// let doc = doc.into_owned();
    /// assert!(doc.is_self_contained());
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    pub fn is_self_contained(&self) -> bool {
        let nodes_owned = self.nodes.iter().all(|node| {
            let data = node.get();
            matches!(data.name, Span::Arena(_)) && !matches!(data.value, Some(Span::Buffer(_)))
        });
        nodes_owned
            && self.attributes.iter().all(|attribute| {
                matches!(attribute.name, Span::Arena(_))
                    && matches!(attribute.value, Span::Arena(_))
            })
    }

    /// Copy every span that refers to the parse buffer into the arena.
    ///
    /// The resulting document no longer borrows the buffer. All `Node` and
    /// `Attribute` handles stay valid. Text that occurs many times, such as a
    /// repeated element name, is copied once.
    ///
    /// ```rust
    /// use xmlarena::{Document, Provenance};
    ///
    /// let doc = {
    ///     let mut buffer = b"<doc>text</doc>".to_vec();
    ///     let doc = Document::parse(&mut buffer)?;
    ///     doc.into_owned()
    /// };
    /// // the buffer is gone, the document lives on
    /// let el = doc.document_element().unwrap();
    /// assert_eq!(doc.value(el), Some("text"));
    /// assert_eq!(doc.value_provenance(el), Some(Provenance::Arena));
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    pub fn into_owned(mut self) -> Document<'static> {
        let source = self.source;
        let before = self.strings.allocated_bytes();
        let mut promoted: HashMap<&str, ArenaSpan> = HashMap::default();
        let strings = &mut self.strings;
        let mut promote = |span: Span| -> Span {
            match span {
                Span::Arena(_) => span,
                Span::Buffer(range) => {
                    let text = &source[range.start..range.end()];
                    Span::Arena(
                        *promoted
                            .entry(text)
                            .or_insert_with(|| strings.allocate(text)),
                    )
                }
            }
        };
        for node in self.nodes.iter_mut() {
            let data = node.get_mut();
            data.name = promote(data.name);
            data.value = data.value.map(&mut promote);
        }
        for attribute in self.attributes.iter_mut() {
            attribute.name = promote(attribute.name);
            attribute.value = promote(attribute.value);
        }
        debug!(
            "promoted document into arena: {} bytes copied",
            self.strings.allocated_bytes() - before
        );
        Document {
            id: self.id,
            source: "",
            strings: self.strings,
            nodes: self.nodes,
            attributes: self.attributes,
            root: self.root,
            declaration: self.declaration,
            state: self.state,
        }
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> Node {
        Node::new(self.id, id)
    }

    #[inline]
    pub(crate) fn attribute(&self, index: AttributeIndex) -> Attribute {
        Attribute {
            document: self.id,
            index,
        }
    }

    /// Resolve a handle for a mutating operation.
    pub(crate) fn node_id(&self, node: Node) -> Result<NodeId, Error> {
        if node.document != self.id {
            return Err(Error::InvalidOperation(
                "node does not belong to this document".into(),
            ));
        }
        Ok(node.id)
    }

    pub(crate) fn attribute_index(&self, attribute: Attribute) -> Result<AttributeIndex, Error> {
        if attribute.document != self.id || attribute.index >= self.attributes.len() {
            return Err(Error::InvalidOperation(
                "attribute does not belong to this document".into(),
            ));
        }
        Ok(attribute.index)
    }

    /// Node data for a read accessor.
    ///
    /// Panics if the node belongs to a different document.
    pub(crate) fn data(&self, node: Node) -> &NodeData {
        self.assert_own(node);
        self.nodes[node.id].get()
    }

    #[inline]
    pub(crate) fn assert_own(&self, node: Node) {
        assert!(
            node.document == self.id,
            "node does not belong to this document"
        );
    }

    pub(crate) fn attribute_data(&self, attribute: Attribute) -> &AttributeData {
        assert!(
            attribute.document == self.id,
            "attribute does not belong to this document"
        );
        &self.attributes[attribute.index]
    }

    #[inline]
    pub(crate) fn text(&self, span: Span) -> &str {
        match span {
            Span::Arena(span) => self.strings.get(span),
            Span::Buffer(span) => &self.source[span.start..span.end()],
        }
    }

    #[inline]
    pub(crate) fn allocate(&mut self, s: &str) -> Span {
        Span::Arena(self.strings.allocate(s))
    }

    /// Record that the builder API has been used.
    pub(crate) fn touch(&mut self) {
        if self.state == DocumentState::Empty {
            self.state = DocumentState::Built;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_get_distinct_ids() {
        let a = Document::new();
        let b = Document::new();
        assert_ne!(a.id, b.id);
        assert_ne!(a.root(), b.root());
    }

    #[test]
    fn test_create_does_not_attach_declaration() {
        let doc = Document::create(1, "utf-8").unwrap();
        assert_eq!(doc.state(), DocumentState::Built);
        assert!(doc.declaration().is_some());
        assert_eq!(doc.top_level().count(), 0);
    }

    #[test]
    fn test_create_rejects_unknown_encoding() {
        let err = Document::create(1, "no-such-encoding");
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_foreign_node_rejected() {
        let mut a = Document::new();
        let b = Document::new();
        let node = a.create_element("a", "").unwrap();
        assert!(matches!(b.node_id(node), Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn test_built_document_is_self_contained() {
        let mut doc = Document::new();
        let el = doc.create_element("a", "value").unwrap();
        doc.append_top_level(el).unwrap();
        assert!(doc.is_self_contained());
    }

    #[test]
    fn test_into_owned_shares_repeated_text() {
        let mut buffer = b"<r><Node/><Node/><Node/><Node/></r>".to_vec();
        let doc = Document::parse(&mut buffer).unwrap();
        let doc = doc.into_owned();
        // "r" and "Node" are copied once each
        assert_eq!(doc.allocated_bytes(), 1 + 4);
    }
}
