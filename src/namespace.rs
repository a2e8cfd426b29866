use crate::document::{Document, Node};
use crate::error::Error;
use crate::xmlvalue::NodeKind;

/// Name of the attribute declaring the `xsi` prefix.
pub const XMLNS_XSI: &str = "xmlns:xsi";
/// Name of the attribute declaring the `xsd` prefix.
pub const XMLNS_XSD: &str = "xmlns:xsd";
/// Name of the attribute carrying a schema instance type.
pub const XSI_TYPE: &str = "xsi:type";
/// The W3C XML Schema instance namespace.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
/// The W3C XML Schema namespace.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Schema namespace helpers.
///
/// These write plain attributes; the document does not otherwise interpret
/// namespaces.
impl<'a> Document<'a> {
    /// Append `xmlns:xsi` and `xmlns:xsd` attributes with the given URIs to
    /// an element, after any attributes it already has.
    pub fn set_namespace(&mut self, node: Node, xsi: &str, xsd: &str) -> Result<(), Error> {
        self.check_element(node)?;
        let xsi = self.create_attribute(XMLNS_XSI, xsi)?;
        let xsd = self.create_attribute(XMLNS_XSD, xsd)?;
        self.append_attribute(node, xsi)?;
        self.append_attribute(node, xsd)
    }

    /// [`Document::set_namespace`] with the canonical W3C XML Schema URIs.
    ///
    /// ```rust
    /// use xmlarena::Document;
    ///
    /// let mut doc = Document::new();
    /// let root = doc.create_element("root", "")?;
    /// doc.append_top_level(root)?;
    /// doc.set_default_namespace(root)?;
    /// assert_eq!(
    ///     doc.to_string()?,
    ///     concat!(
    ///         r#"<root xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#,
    ///         r#" xmlns:xsd="http://www.w3.org/2001/XMLSchema"/>"#
    ///     )
    /// );
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    pub fn set_default_namespace(&mut self, node: Node) -> Result<(), Error> {
        self.set_namespace(node, XSI_NAMESPACE, XSD_NAMESPACE)
    }

    /// Append an `xsi:type` attribute to an element.
    pub fn set_xsi_type(&mut self, node: Node, type_name: &str) -> Result<(), Error> {
        self.check_element(node)?;
        let attribute = self.create_attribute(XSI_TYPE, type_name)?;
        self.append_attribute(node, attribute)
    }

    // runs before any attribute is appended
    fn check_element(&self, node: Node) -> Result<(), Error> {
        let id = self.node_id(node)?;
        if self.nodes[id].get().kind != NodeKind::Element {
            return Err(Error::InvalidOperation(
                "namespace attributes can only be set on an element".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_namespace_after_existing() {
        let mut doc = Document::new();
        let root = doc.create_element("root", "").unwrap();
        let id = doc.create_attribute("id", "1").unwrap();
        doc.append_attribute(root, id).unwrap();
        doc.set_default_namespace(root).unwrap();
        let attributes = doc
            .attributes(root)
            .map(|a| (doc.attribute_name(a), doc.attribute_value(a)))
            .collect::<Vec<_>>();
        assert_eq!(
            attributes,
            vec![
                ("id", "1"),
                (XMLNS_XSI, XSI_NAMESPACE),
                (XMLNS_XSD, XSD_NAMESPACE)
            ]
        );
    }

    #[test]
    fn test_namespace_on_declaration_rejected() {
        let mut doc = Document::create(1, "utf-8").unwrap();
        let declaration = doc.declaration().unwrap();
        assert!(doc.set_default_namespace(declaration).is_err());
        assert_eq!(doc.attributes(declaration).count(), 2);
    }

    #[test]
    fn test_xsi_type() {
        let mut doc = Document::new();
        let el = doc.create_element("value", "").unwrap();
        doc.set_xsi_type(el, "xsd:string").unwrap();
        let attribute = doc.find_first_attribute(el, XSI_TYPE).unwrap();
        assert_eq!(doc.attribute_value(attribute), "xsd:string");
    }
}
