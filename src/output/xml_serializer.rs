use std::io;

use crate::document::{Document, Node};
use crate::entity::{serialize_attribute, serialize_text};
use crate::error::Error;

use super::{Output, OutputToken};

pub(crate) struct XmlSerializer<'s> {
    doc: &'s Document<'s>,
}

impl<'s> XmlSerializer<'s> {
    pub(crate) fn new(doc: &'s Document<'s>) -> Self {
        Self { doc }
    }

    pub(crate) fn serialize<W: io::Write>(
        &mut self,
        w: &mut W,
        outputs: impl Iterator<Item = (Node, Output<'s>)>,
    ) -> Result<(), Error> {
        for (node, output) in outputs {
            self.serialize_node(w, node, output)?;
        }
        Ok(())
    }

    pub(crate) fn serialize_node<W: io::Write>(
        &mut self,
        w: &mut W,
        node: Node,
        output: Output<'s>,
    ) -> Result<(), Error> {
        let data = self.render_output(node, &output);
        if data.space {
            w.write_all(b" ")?;
        }
        w.write_all(data.text.as_bytes())?;
        Ok(())
    }

    // an element without children and without value is written self-closed
    fn is_empty(&self, node: Node) -> bool {
        self.doc.first_child(node).is_none() && self.doc.value(node).is_none()
    }

    pub(crate) fn render_output(&mut self, node: Node, output: &Output<'s>) -> OutputToken {
        use Output::*;
        match output {
            DeclarationOpen => OutputToken {
                space: false,
                text: "<?xml".to_string(),
            },
            DeclarationClose => OutputToken {
                space: false,
                text: "?>".to_string(),
            },
            StartTagOpen(name) => OutputToken {
                space: false,
                text: format!("<{}", name),
            },
            StartTagClose => {
                if self.is_empty(node) {
                    OutputToken {
                        space: false,
                        text: "/>".to_string(),
                    }
                } else {
                    OutputToken {
                        space: false,
                        text: ">".to_string(),
                    }
                }
            }
            EndTag(name) => {
                if self.is_empty(node) {
                    OutputToken {
                        space: false,
                        text: "".to_string(),
                    }
                } else {
                    OutputToken {
                        space: false,
                        text: format!("</{}>", name),
                    }
                }
            }
            Attribute(name, value) => OutputToken {
                space: true,
                text: format!("{}=\"{}\"", name, serialize_attribute((*value).into())),
            },
            Text(text) => OutputToken {
                space: false,
                text: serialize_text((*text).into()).to_string(),
            },
        }
    }
}
