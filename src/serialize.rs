use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::document::{Document, Node};
use crate::error::Error;
use crate::output::{gen_outputs, Output, XmlSerializer};

/// ## Serialization
///
/// Top-level nodes are written in order, without indentation or newlines. An
/// element with neither children nor a value is written as `<name/>`; an
/// element value is written before its children.
impl<'a> Document<'a> {
    /// Serialize the document to a writer.
    pub fn serialize<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        let mut serializer = XmlSerializer::new(self);
        serializer.serialize(w, gen_outputs(self))
    }

    /// Serialize the document to a string.
    ///
    /// ```rust
    /// use xmlarena::Document;
    ///
    /// let mut doc = Document::new();
    /// let root = doc.create_element("root", "")?;
    /// doc.append_top_level(root)?;
    /// let title = doc.create_element("title", "Fish & Chips")?;
    /// doc.append_child(root, title)?;
    /// assert_eq!(doc.to_string()?, "<root><title>Fish &amp; Chips</title></root>");
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> Result<String, Error> {
        let mut buf = Vec::new();
        self.serialize(&mut buf)?;
        String::from_utf8(buf)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    /// Serialize the document to a file, replacing its contents.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let mut w = BufWriter::new(File::create(path)?);
        self.serialize(&mut w)?;
        w.flush()?;
        debug!("saved document to {}", path.display());
        Ok(())
    }

    /// The stream of serialization output, with the node each piece belongs
    /// to.
    ///
    /// ```rust
    /// use xmlarena::{Document, output::Output};
    ///
    /// let mut buffer = b"<a x='1'/>".to_vec();
    /// let doc = Document::parse(&mut buffer)?;
    /// let outputs = doc.outputs().map(|(_, output)| output).collect::<Vec<_>>();
    /// assert_eq!(
    ///     outputs,
    ///     vec![
    ///         Output::StartTagOpen("a"),
    ///         Output::Attribute("x", "1"),
    ///         Output::StartTagClose,
    ///         Output::EndTag("a"),
    ///     ]
    /// );
    /// # Ok::<(), xmlarena::Error>(())
    /// ```
    pub fn outputs(&self) -> impl Iterator<Item = (Node, Output<'_>)> + '_ {
        gen_outputs(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_before_children() {
        let mut doc = Document::new();
        let a = doc.create_element("a", "text").unwrap();
        let b = doc.create_element("b", "").unwrap();
        doc.append_child(a, b).unwrap();
        doc.append_top_level(a).unwrap();
        assert_eq!(doc.to_string().unwrap(), "<a>text<b/></a>");
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new();
        assert_eq!(doc.to_string().unwrap(), "");
    }

    #[test]
    fn test_unattached_nodes_not_serialized() {
        let mut doc = Document::create(1, "utf-8").unwrap();
        doc.create_element("a", "").unwrap();
        assert_eq!(doc.to_string().unwrap(), "");
    }
}
