use genawaiter::rc::gen;
use genawaiter::yield_;

use crate::access::NodeEdge;
use crate::document::{Document, Node};
use crate::xmlvalue::NodeKind;

/// Output of serialization.
///
/// Each value stands for one piece of markup in the XML text.
#[derive(Debug, PartialEq, Eq)]
pub enum Output<'a> {
    /// Declaration open, i.e. `<?xml`
    DeclarationOpen,
    /// Declaration close, i.e. `?>`
    DeclarationClose,
    /// Start tag open, i.e `<foo`
    StartTagOpen(&'a str),
    /// Start tag close, either `>` or `/>`
    StartTagClose,
    /// End tag, i.e. `</foo>`
    EndTag(&'a str),
    /// Attribute, i.e. `foo="bar"`; the value is unescaped
    Attribute(&'a str, &'a str),
    /// Element value, i.e. `foo`; unescaped
    Text(&'a str),
}

pub(crate) fn gen_outputs<'s>(
    doc: &'s Document<'s>,
) -> impl Iterator<Item = (Node, Output<'s>)> + 's {
    gen!({
        for edge in doc.traverse(doc.root()) {
            match edge {
                NodeEdge::Start(node) => match doc.kind(node) {
                    NodeKind::Document => {}
                    NodeKind::Declaration => {
                        yield_!((node, Output::DeclarationOpen));
                        for attribute in doc.attributes(node) {
                            yield_!((
                                node,
                                Output::Attribute(
                                    doc.attribute_name(attribute),
                                    doc.attribute_value(attribute)
                                )
                            ));
                        }
                        yield_!((node, Output::DeclarationClose));
                    }
                    NodeKind::Element => {
                        yield_!((node, Output::StartTagOpen(doc.name(node))));
                        for attribute in doc.attributes(node) {
                            yield_!((
                                node,
                                Output::Attribute(
                                    doc.attribute_name(attribute),
                                    doc.attribute_value(attribute)
                                )
                            ));
                        }
                        yield_!((node, Output::StartTagClose));
                        // the value comes before any children
                        if let Some(value) = doc.value(node) {
                            yield_!((node, Output::Text(value)));
                        }
                    }
                },
                NodeEdge::End(node) => {
                    if doc.kind(node) == NodeKind::Element {
                        yield_!((node, Output::EndTag(doc.name(node))));
                    }
                }
            }
        }
    })
    .into_iter()
}

/// Output token
///
/// This represents an [`Output`] as a rendered output token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputToken {
    /// Whether the token is prefixed by a space character.
    pub space: bool,
    /// The token.
    ///
    /// This is a fragment of XML like `<foo` or `a="A"` or `/>`, etc.
    pub text: String,
}
