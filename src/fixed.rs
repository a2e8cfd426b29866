//! A fixed representation of a tree of nodes.
//!
//! Documents are mutable and their text may borrow a parse buffer, but it is
//! useful to have an owned snapshot of a tree that you can create, compare
//! and store separately. This has no dependency on a [`crate::Document`].
//! Take a snapshot with [`crate::Document::fixed`] or
//! [`crate::Document::fixed_document`], and turn one back into nodes by
//! calling `.build` on it.
//!
//! Example:
//!
//! ```rust
//! use xmlarena::fixed;
//!
//! let fixed_element = fixed::Element {
//!     name: "foo".to_string(),
//!     value: Some("Example".to_string()),
//!     attributes: vec![fixed::Attribute {
//!         name: "id".to_string(),
//!         value: "1".to_string(),
//!     }],
//!     children: vec![],
//! };
//!
//! let mut doc = xmlarena::Document::new();
//! let node = fixed_element.build(&mut doc)?;
//! doc.append_top_level(node)?;
//! assert_eq!(doc.to_string()?, r#"<foo id="1">Example</foo>"#);
//! assert_eq!(doc.fixed(node), fixed_element);
//! # Ok::<(), xmlarena::Error>(())
//! ```

use crate::document::Node;
use crate::error::Error;
use crate::xmlvalue::NodeKind;

/// A fixed representation of a document: an optional declaration followed by
/// the top-level elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    /// The attributes of the declaration, if there is one.
    pub declaration: Option<Vec<Attribute>>,
    /// Top-level elements.
    pub elements: Vec<Element>,
}

/// A fixed representation of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    /// Name.
    pub name: String,
    /// Value.
    pub value: String,
}

/// A fixed representation of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    /// Name.
    pub name: String,
    /// Text value. `Some("")` builds an element without a value.
    pub value: Option<String>,
    /// Attributes, in order.
    pub attributes: Vec<Attribute>,
    /// Child elements, in order.
    pub children: Vec<Element>,
}

impl Element {
    /// Build this element and its descendants in `doc`. The returned node is
    /// unattached.
    pub fn build(&self, doc: &mut crate::Document) -> Result<Node, Error> {
        let node = doc.create_element(&self.name, self.value.as_deref().unwrap_or(""))?;
        for attribute in &self.attributes {
            let attribute = doc.create_attribute(&attribute.name, &attribute.value)?;
            doc.append_attribute(node, attribute)?;
        }
        for child in &self.children {
            let child = child.build(doc)?;
            doc.append_child(node, child)?;
        }
        Ok(node)
    }
}

impl Document {
    /// Build a new document from this one.
    pub fn build(&self) -> Result<crate::Document<'static>, Error> {
        let mut doc = crate::Document::new();
        if let Some(attributes) = &self.declaration {
            let declaration = doc.new_declaration();
            for attribute in attributes {
                let attribute = doc.create_attribute(&attribute.name, &attribute.value)?;
                doc.append_attribute(declaration, attribute)?;
            }
            doc.append_top_level(declaration)?;
        }
        for element in &self.elements {
            let node = element.build(&mut doc)?;
            doc.append_top_level(node)?;
        }
        Ok(doc)
    }
}

impl<'a> crate::Document<'a> {
    /// Take an owned snapshot of an element and its descendants.
    pub fn fixed(&self, node: Node) -> Element {
        Element {
            name: self.name(node).to_string(),
            value: self.value(node).map(|value| value.to_string()),
            attributes: self.fixed_attributes(node),
            children: self
                .children(node)
                .map(|child| self.fixed(child))
                .collect(),
        }
    }

    /// Take an owned snapshot of the whole document.
    pub fn fixed_document(&self) -> Document {
        let mut declaration = None;
        let mut elements = Vec::new();
        for node in self.top_level() {
            match self.kind(node) {
                NodeKind::Declaration => declaration = Some(self.fixed_attributes(node)),
                NodeKind::Element => elements.push(self.fixed(node)),
                NodeKind::Document => {}
            }
        }
        Document {
            declaration,
            elements,
        }
    }

    fn fixed_attributes(&self, node: Node) -> Vec<Attribute> {
        self.attributes(node)
            .map(|attribute| Attribute {
                name: self.attribute_name(attribute).to_string(),
                value: self.attribute_value(attribute).to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_document_of_parsed() {
        let mut buffer = br#"<?xml version="1.0"?><a x="1"><b>text</b></a>"#.to_vec();
        let doc = crate::Document::parse(&mut buffer).unwrap();
        let fixed = doc.fixed_document();
        assert_eq!(
            fixed,
            Document {
                declaration: Some(vec![Attribute {
                    name: "version".to_string(),
                    value: "1.0".to_string()
                }]),
                elements: vec![Element {
                    name: "a".to_string(),
                    value: None,
                    attributes: vec![Attribute {
                        name: "x".to_string(),
                        value: "1".to_string()
                    }],
                    children: vec![Element {
                        name: "b".to_string(),
                        value: Some("text".to_string()),
                        attributes: vec![],
                        children: vec![],
                    }],
                }],
            }
        );
    }

    #[test]
    fn test_build_document() {
        let fixed = Document {
            declaration: Some(vec![Attribute {
                name: "version".to_string(),
                value: "1.0".to_string(),
            }]),
            elements: vec![Element {
                name: "a".to_string(),
                value: None,
                attributes: vec![],
                children: vec![],
            }],
        };
        let doc = fixed.build().unwrap();
        assert_eq!(doc.to_string().unwrap(), r#"<?xml version="1.0"?><a/>"#);
        assert_eq!(doc.fixed_document(), fixed);
    }
}
