use ahash::HashSet;

use crate::document::{Attribute, Document, Node};
use crate::error::Error;
use crate::span::Span;
use crate::xmlvalue::{AttributeData, NodeData, NodeKind};

/// Creation of unattached nodes and attributes.
///
/// Everything created here copies its text into the document's arena, so it
/// stays readable for as long as the document lives. Created nodes have no
/// parent until you attach them with [`Document::append_top_level`] or
/// [`Document::append_child`].
impl<'a> Document<'a> {
    /// Create an unattached element.
    ///
    /// An empty `value` means the element has no value.
    ///
    /// Fails with [`Error::InvalidArgument`] if `name` is empty or cannot be
    /// an XML name.
    ///
    /// ```rust
    /// use xmlarena::Document;
    ///
    /// let mut doc = Document::new();
    /// let el = doc.create_element("greeting", "hello")?;
    /// assert_eq!(doc.name(el), "greeting");
    /// assert_eq!(doc.value(el), Some("hello"));
    /// assert_eq!(doc.parent(el), None);
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    pub fn create_element(&mut self, name: &str, value: &str) -> Result<Node, Error> {
        check_name(name)?;
        self.touch();
        let name = self.allocate(name);
        let value = (!value.is_empty()).then(|| self.allocate(value));
        let id = self
            .nodes
            .new_node(NodeData::new(NodeKind::Element, name, value));
        Ok(self.node(id))
    }

    /// Create an attribute that belongs to no element yet.
    ///
    /// Fails with [`Error::InvalidArgument`] if `name` is empty or cannot be
    /// an XML name.
    pub fn create_attribute(&mut self, name: &str, value: &str) -> Result<Attribute, Error> {
        check_name(name)?;
        self.touch();
        let name = self.allocate(name);
        let value = self.allocate(value);
        Ok(self.push_attribute(name, value))
    }

    /// Create an element and append the given children to it.
    ///
    /// `None` entries are skipped without error. All children are checked
    /// before any is attached: if one of them is foreign, already has a
    /// parent, is listed twice or is not an element, the call fails and no
    /// child is attached.
    ///
    /// ```rust
    /// use xmlarena::Document;
    ///
    /// let mut doc = Document::new();
    /// let a = doc.create_element("a", "")?;
    /// let b = doc.create_element("b", "")?;
    /// let list = doc.create_element_with_children("list", &[Some(a), None, Some(b)])?;
    /// assert_eq!(doc.children(list).collect::<Vec<_>>(), vec![a, b]);
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    pub fn create_element_with_children(
        &mut self,
        name: &str,
        children: &[Option<Node>],
    ) -> Result<Node, Error> {
        check_name(name)?;
        let mut seen = HashSet::default();
        for child in children.iter().flatten() {
            let id = self.node_id(*child)?;
            if self.nodes[id].get().kind != NodeKind::Element {
                return Err(Error::InvalidOperation(
                    "only elements can be children of an element".into(),
                ));
            }
            if self.nodes[id].parent().is_some() {
                return Err(Error::InvalidOperation("node already has a parent".into()));
            }
            if !seen.insert(id) {
                return Err(Error::InvalidOperation(
                    "node is listed more than once".into(),
                ));
            }
        }
        let parent = self.create_element(name, "")?;
        for child in children.iter().flatten() {
            parent.id.checked_append(child.id, &mut self.nodes)?;
        }
        Ok(parent)
    }

    /// Create an unattached declaration carrying `version` and `encoding`.
    pub(crate) fn create_declaration(
        &mut self,
        version: u8,
        encoding: &str,
    ) -> Result<Node, Error> {
        if encoding_rs::Encoding::for_label(encoding.as_bytes()).is_none() {
            return Err(Error::InvalidArgument(format!(
                "unknown encoding '{}'",
                encoding
            )));
        }
        let declaration = self.new_declaration();
        let version = format!("{}.0", version);
        for (name, value) in [("version", version.as_str()), ("encoding", encoding)] {
            let name = self.allocate(name);
            let value = self.allocate(value);
            let attribute = self.push_attribute(name, value);
            self.link_attribute(declaration.id, attribute.index);
        }
        Ok(declaration)
    }

    /// A declaration without attributes.
    pub(crate) fn new_declaration(&mut self) -> Node {
        self.touch();
        let name = self.allocate("xml");
        let id = self
            .nodes
            .new_node(NodeData::new(NodeKind::Declaration, name, None));
        self.node(id)
    }

    fn push_attribute(&mut self, name: Span, value: Span) -> Attribute {
        let index = self.attributes.len();
        self.attributes.push(AttributeData {
            name,
            value,
            owner: None,
        });
        self.attribute(index)
    }
}

/// Names are copied verbatim into the output, so anything that would break
/// the markup is rejected.
pub(crate) fn check_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::InvalidArgument("name must not be empty".into()));
    }
    if let Some(c) = name.chars().find(|&c| {
        c.is_whitespace() || matches!(c, '<' | '>' | '&' | '"' | '\'' | '/' | '=' | '?' | '!')
    }) {
        return Err(Error::InvalidArgument(format!(
            "name '{}' contains {:?}",
            name, c
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentState;

    #[test]
    fn test_create_element_empty_name() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.create_element("", "value"),
            Err(Error::InvalidArgument(_))
        ));
        // nothing was half-built
        assert_eq!(doc.nodes.count(), 1);
        assert_eq!(doc.state(), DocumentState::Empty);
    }

    #[test]
    fn test_create_element_bad_name() {
        let mut doc = Document::new();
        assert!(doc.create_element("a b", "").is_err());
        assert!(doc.create_element("a>", "").is_err());
    }

    #[test]
    fn test_create_element_moves_to_built() {
        let mut doc = Document::new();
        doc.create_element("a", "").unwrap();
        assert_eq!(doc.state(), DocumentState::Built);
    }

    #[test]
    fn test_create_attribute_empty_name() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.create_attribute("", "v"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_create_attribute_empty_value() {
        let mut doc = Document::new();
        let attribute = doc.create_attribute("a", "").unwrap();
        assert_eq!(doc.attribute_value(attribute), "");
        assert_eq!(doc.attribute_owner(attribute), None);
    }

    #[test]
    fn test_create_with_children_rejects_attached_child() {
        let mut doc = Document::new();
        let a = doc.create_element("a", "").unwrap();
        let b = doc.create_element("b", "").unwrap();
        doc.append_child(a, b).unwrap();
        let c = doc.create_element("c", "").unwrap();
        let result = doc.create_element_with_children("list", &[Some(c), Some(b)]);
        assert!(matches!(result, Err(Error::InvalidOperation(_))));
        // c was not attached anywhere
        assert_eq!(doc.parent(c), None);
    }

    #[test]
    fn test_create_with_children_rejects_duplicates() {
        let mut doc = Document::new();
        let a = doc.create_element("a", "").unwrap();
        let result = doc.create_element_with_children("list", &[Some(a), Some(a)]);
        assert!(matches!(result, Err(Error::InvalidOperation(_))));
        assert_eq!(doc.parent(a), None);
    }

    #[test]
    fn test_create_with_children_all_none() {
        let mut doc = Document::new();
        let list = doc.create_element_with_children("list", &[None, None]).unwrap();
        assert_eq!(doc.children(list).count(), 0);
    }

    #[test]
    fn test_declaration_attributes() {
        let mut doc = Document::new();
        let declaration = doc.create_declaration(1, "UTF-8").unwrap();
        let values = doc
            .attributes(declaration)
            .map(|a| (doc.attribute_name(a), doc.attribute_value(a)))
            .collect::<Vec<_>>();
        assert_eq!(values, vec![("version", "1.0"), ("encoding", "UTF-8")]);
    }
}
