//! Serialization of documents to XML text.
//!
//! A document is first turned into a stream of [`Output`] values, one per
//! piece of markup, which are then rendered into [`OutputToken`]s. Use
//! [`Document::outputs`](crate::Document::outputs) to see the stream, for
//! instance to build your own rendering.
mod serializer;
mod xml_serializer;

pub(crate) use serializer::gen_outputs;
pub use serializer::{Output, OutputToken};
pub(crate) use xml_serializer::XmlSerializer;
