use indextree::NodeId;

use crate::span::Span;

/// The kind of a node.
///
/// Access it using [`Document::kind`](crate::Document::kind).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Document root that holds the top-level nodes. Note that this is not
    /// the same as the document element.
    Document,
    /// XML declaration, i.e. `<?xml version="1.0" encoding="utf-8"?>`. It
    /// carries `version` and `encoding` as attributes.
    Declaration,
    /// Element; it has a name, an optional text value, attributes and
    /// children.
    Element,
}

pub(crate) type AttributeIndex = usize;

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) name: Span,
    pub(crate) value: Option<Span>,
    pub(crate) attributes: Vec<AttributeIndex>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind, name: Span, value: Option<Span>) -> Self {
        NodeData {
            kind,
            name,
            value,
            attributes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AttributeData {
    pub(crate) name: Span,
    pub(crate) value: Span,
    // the element or declaration this attribute was appended to
    pub(crate) owner: Option<NodeId>,
}
