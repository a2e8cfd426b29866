use indextree::NodeId;
use log::trace;

use crate::document::{Attribute, Document, Node};
use crate::error::Error;
use crate::xmlvalue::{AttributeIndex, NodeKind};

/// Manipulation of the tree structure.
///
/// This maintains the document structure:
/// - A node has at most one parent, and a node that already has one cannot
///   be appended again until it is detached.
/// - The document root only holds top-level nodes; a declaration can only
///   be top-level, and at most one declaration is attached at a time. It is
///   always the first top-level node.
/// - Attributes belong to at most one element or declaration.
///
/// A failed operation leaves the tree as it was.
impl<'a> Document<'a> {
    /// Append a node to the top level of the document.
    ///
    /// An element becomes the last top-level node. A declaration becomes the
    /// first one; if a declaration is already attached this fails, use
    /// [`Document::set_header`] to replace it.
    ///
    /// ```rust
    /// use xmlarena::Document;
    ///
    /// let mut doc = Document::new();
    /// let a = doc.create_element("a", "")?;
    /// doc.append_top_level(a)?;
    /// assert_eq!(doc.document_element(), Some(a));
    /// // appending it twice is an error
    /// assert!(doc.append_top_level(a).is_err());
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    pub fn append_top_level(&mut self, node: Node) -> Result<(), Error> {
        let id = self.node_id(node)?;
        self.check_unattached(id)?;
        match self.nodes[id].get().kind {
            NodeKind::Document => Err(Error::InvalidOperation(
                "cannot append the document root".into(),
            )),
            NodeKind::Declaration => {
                if self.attached_declaration().is_some() {
                    return Err(Error::InvalidOperation(
                        "document already has a declaration".into(),
                    ));
                }
                self.root.checked_prepend(id, &mut self.nodes)?;
                self.declaration = Some(id);
                self.touch();
                Ok(())
            }
            NodeKind::Element => {
                self.root.checked_append(id, &mut self.nodes)?;
                self.touch();
                Ok(())
            }
        }
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// If `parent` is the document root this is [`Document::append_top_level`].
    /// Fails with [`Error::InvalidOperation`] if `child` already has a parent,
    /// if it is an ancestor of `parent`, or if either node is a declaration.
    pub fn append_child(&mut self, parent: Node, child: Node) -> Result<(), Error> {
        let parent_id = self.node_id(parent)?;
        let child_id = self.node_id(child)?;
        if parent_id == self.root {
            return self.append_top_level(child);
        }
        if self.nodes[parent_id].get().kind != NodeKind::Element
            || self.nodes[child_id].get().kind != NodeKind::Element
        {
            return Err(Error::InvalidOperation(
                "only elements can have children or be children".into(),
            ));
        }
        self.check_unattached(child_id)?;
        parent_id.checked_append(child_id, &mut self.nodes)?;
        trace!("appended {:?} to {:?}", child_id, parent_id);
        self.touch();
        Ok(())
    }

    /// Append an attribute to an element or declaration.
    ///
    /// The attribute becomes the last one; duplicate names are kept.
    ///
    /// ```rust
    /// use xmlarena::Document;
    ///
    /// let mut doc = Document::new();
    /// let el = doc.create_element("a", "")?;
    /// let id = doc.create_attribute("id", "1")?;
    /// doc.append_attribute(el, id)?;
    /// assert_eq!(doc.attribute_owner(id), Some(el));
    /// // an attribute has one owner
    /// let other = doc.create_element("b", "")?;
    /// assert!(doc.append_attribute(other, id).is_err());
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    pub fn append_attribute(&mut self, node: Node, attribute: Attribute) -> Result<(), Error> {
        let id = self.node_id(node)?;
        let index = self.attribute_index(attribute)?;
        if self.nodes[id].get().kind == NodeKind::Document {
            return Err(Error::InvalidOperation(
                "the document root cannot have attributes".into(),
            ));
        }
        if self.attributes[index].owner.is_some() {
            return Err(Error::InvalidOperation(
                "attribute already belongs to a node".into(),
            ));
        }
        self.link_attribute(id, index);
        self.touch();
        Ok(())
    }

    /// Remove a node, along with its descendants, from its parent.
    ///
    /// The node stays in the document unattached and can be appended again.
    /// Detaching an unattached node does nothing.
    pub fn detach(&mut self, node: Node) -> Result<(), Error> {
        let id = self.node_id(node)?;
        if id == self.root {
            return Err(Error::InvalidOperation(
                "cannot detach the document root".into(),
            ));
        }
        id.detach(&mut self.nodes);
        Ok(())
    }

    /// Set the value of an element. An empty value removes it.
    ///
    /// The new value is copied into the arena; the old one is left behind.
    ///
    /// ```rust
    /// use xmlarena::Document;
    ///
    /// let mut doc = Document::new();
    /// let el = doc.create_element("a", "old")?;
    /// doc.set_element_value(el, "new")?;
    /// assert_eq!(doc.value(el), Some("new"));
    /// doc.set_element_value(el, "")?;
    /// assert_eq!(doc.value(el), None);
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    pub fn set_element_value(&mut self, node: Node, value: &str) -> Result<(), Error> {
        let id = self.node_id(node)?;
        if self.nodes[id].get().kind != NodeKind::Element {
            return Err(Error::InvalidOperation(
                "only elements have a value".into(),
            ));
        }
        let value = (!value.is_empty()).then(|| self.allocate(value));
        self.nodes[id].get_mut().value = value;
        self.touch();
        Ok(())
    }

    /// Set the value of an attribute.
    pub fn set_attribute_value(&mut self, attribute: Attribute, value: &str) -> Result<(), Error> {
        let index = self.attribute_index(attribute)?;
        let value = self.allocate(value);
        self.attributes[index].value = value;
        self.touch();
        Ok(())
    }

    /// Create a declaration and attach it as the first top-level node.
    ///
    /// A declaration that is already attached is detached first.
    ///
    /// ```rust
    /// use xmlarena::Document;
    ///
    /// let mut doc = Document::new();
    /// let root = doc.create_element("root", "")?;
    /// doc.append_top_level(root)?;
    /// doc.set_header(1, "utf-8")?;
    /// doc.set_header(1, "iso-8859-1")?;
    /// assert_eq!(
    ///     doc.to_string()?,
    ///     r#"<?xml version="1.0" encoding="iso-8859-1"?><root/>"#
    /// );
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    pub fn set_header(&mut self, version: u8, encoding: &str) -> Result<Node, Error> {
        let declaration = self.create_declaration(version, encoding)?;
        if let Some(existing) = self.attached_declaration() {
            existing.detach(&mut self.nodes);
        }
        self.root.checked_prepend(declaration.id, &mut self.nodes)?;
        self.declaration = Some(declaration.id);
        Ok(declaration)
    }

    pub(crate) fn link_attribute(&mut self, id: NodeId, index: AttributeIndex) {
        self.attributes[index].owner = Some(id);
        self.nodes[id].get_mut().attributes.push(index);
    }

    fn attached_declaration(&self) -> Option<NodeId> {
        self.root.children(&self.nodes).find(|&child| {
            self.nodes[child].get().kind == NodeKind::Declaration
        })
    }

    fn check_unattached(&self, id: NodeId) -> Result<(), Error> {
        if self.nodes[id].parent().is_some() {
            return Err(Error::InvalidOperation("node already has a parent".into()));
        }
        Ok(())
    }
}
