use indextree::NodeEdge as IndexTreeNodeEdge;

use crate::document::{Attribute, Document, Node};
use crate::span::Provenance;
use crate::xmlvalue::NodeKind;

/// Node edges.
///
/// Used by [`Document::traverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeEdge {
    /// The start of a node; for an element this is the start tag.
    Start(Node),
    /// The end of a node; for an element this is the end tag.
    End(Node),
}

/// ## Read-only access
///
/// These accessors take handles created by this document. Handing them a
/// handle of another document is a programming error and panics.
impl<'a> Document<'a> {
    /// The kind of a node.
    pub fn kind(&self, node: Node) -> NodeKind {
        self.data(node).kind
    }

    /// The name of a node. The document root has an empty name; a
    /// declaration is named `xml`.
    pub fn name(&self, node: Node) -> &str {
        self.text(self.data(node).name)
    }

    /// The text value of an element, if it has one.
    pub fn value(&self, node: Node) -> Option<&str> {
        self.data(node).value.map(|span| self.text(span))
    }

    /// Where the name of a node is stored.
    pub fn name_provenance(&self, node: Node) -> Provenance {
        self.data(node).name.provenance()
    }

    /// Where the value of a node is stored, if it has one.
    ///
    /// ```rust
    /// use xmlarena::{Document, Provenance};
    ///
    /// let mut buffer = b"<a>text</a>".to_vec();
    /// let mut doc = Document::parse(&mut buffer)?;
    /// let a = doc.document_element().unwrap();
    /// assert_eq!(doc.value_provenance(a), Some(Provenance::Buffer));
    /// doc.set_element_value(a, "changed")?;
    /// assert_eq!(doc.value_provenance(a), Some(Provenance::Arena));
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    pub fn value_provenance(&self, node: Node) -> Option<Provenance> {
        self.data(node).value.map(|span| span.provenance())
    }

    /// The parent of a node. Top-level nodes have the document root as
    /// parent; unattached nodes and the root have none.
    pub fn parent(&self, node: Node) -> Option<Node> {
        self.assert_own(node);
        self.nodes[node.id].parent().map(|id| self.node(id))
    }

    /// The first child of a node.
    pub fn first_child(&self, node: Node) -> Option<Node> {
        self.assert_own(node);
        self.nodes[node.id].first_child().map(|id| self.node(id))
    }

    /// The next sibling of a node.
    pub fn next_sibling(&self, node: Node) -> Option<Node> {
        self.assert_own(node);
        self.nodes[node.id].next_sibling().map(|id| self.node(id))
    }

    /// The children of a node, in order.
    pub fn children(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        self.assert_own(node);
        let document = self.id;
        node.id
            .children(&self.nodes)
            .map(move |id| Node::new(document, id))
    }

    /// The top-level nodes, in order.
    pub fn top_level(&self) -> impl Iterator<Item = Node> + '_ {
        let document = self.id;
        self.root
            .children(&self.nodes)
            .map(move |id| Node::new(document, id))
    }

    /// The first top-level element.
    ///
    /// This is usually the only element at top level, but a built document
    /// can have more than one.
    pub fn document_element(&self) -> Option<Node> {
        self.top_level()
            .find(|&node| self.kind(node) == NodeKind::Element)
    }

    /// The attributes of an element or declaration, in order.
    pub fn attributes(&self, node: Node) -> impl Iterator<Item = Attribute> + '_ {
        let document = self.id;
        self.data(node)
            .attributes
            .iter()
            .map(move |&index| Attribute { document, index })
    }

    /// The name of an attribute.
    pub fn attribute_name(&self, attribute: Attribute) -> &str {
        self.text(self.attribute_data(attribute).name)
    }

    /// The value of an attribute.
    pub fn attribute_value(&self, attribute: Attribute) -> &str {
        self.text(self.attribute_data(attribute).value)
    }

    /// Where the value of an attribute is stored.
    pub fn attribute_value_provenance(&self, attribute: Attribute) -> Provenance {
        self.attribute_data(attribute).value.provenance()
    }

    /// Where the name of an attribute is stored.
    pub fn attribute_name_provenance(&self, attribute: Attribute) -> Provenance {
        self.attribute_data(attribute).name.provenance()
    }

    /// The element or declaration an attribute was appended to.
    pub fn attribute_owner(&self, attribute: Attribute) -> Option<Node> {
        self.attribute_data(attribute)
            .owner
            .map(|id| self.node(id))
    }

    /// Find the first child element with the given name.
    ///
    /// Children are scanned in order and names are compared exactly, case
    /// included. Pass [`Document::root`] to search the top level. A missing
    /// child is `None`, not an error.
    ///
    /// ```rust
    /// use xmlarena::Document;
    ///
    /// let mut buffer = b"<list><item>a</item><Item>b</Item><item>c</item></list>".to_vec();
    /// let doc = Document::parse(&mut buffer)?;
    /// let list = doc.find_first_child(doc.root(), "list").unwrap();
    /// let item = doc.find_first_child(list, "item").unwrap();
    /// assert_eq!(doc.value(item), Some("a"));
    /// assert_eq!(doc.find_first_child(list, "DoesNotExist"), None);
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    pub fn find_first_child(&self, node: Node, name: &str) -> Option<Node> {
        self.children(node)
            .find(|&child| self.kind(child) == NodeKind::Element && self.name(child) == name)
    }

    /// Find the first top-level element with the given name.
    pub fn find_top_level(&self, name: &str) -> Option<Node> {
        self.find_first_child(self.root(), name)
    }

    /// Find the first attribute with the given name.
    pub fn find_first_attribute(&self, node: Node, name: &str) -> Option<Attribute> {
        self.attributes(node)
            .find(|&attribute| self.attribute_name(attribute) == name)
    }

    /// Traverse a node and its descendants in document order, yielding a
    /// start and an end edge for each.
    pub fn traverse(&self, node: Node) -> impl Iterator<Item = NodeEdge> + '_ {
        self.assert_own(node);
        let document = self.id;
        node.id.traverse(&self.nodes).map(move |edge| match edge {
            IndexTreeNodeEdge::Start(id) => NodeEdge::Start(Node::new(document, id)),
            IndexTreeNodeEdge::End(id) => NodeEdge::End(Node::new(document, id)),
        })
    }
}
