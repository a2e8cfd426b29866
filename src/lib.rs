#![forbid(unsafe_code)]

//! An XML document model backed by arenas, with an in-place parser.
//!
//! A [`Document`] owns a string arena for its text and an arena of nodes. You
//! build documents with the builder API, addressing nodes through small
//! [`Node`] and [`Attribute`] handles, or you parse them from a buffer:
//!
//! ```rust
//! use xmlarena::Document;
//!
//! let mut doc = Document::new();
//! doc.set_header(1, "utf-8")?;
//! let root = doc.create_element("Root", "")?;
//! doc.append_top_level(root)?;
//! for i in 0..3 {
//!     let node = doc.create_element("Node", "")?;
//!     let id = doc.create_attribute("ID", &i.to_string())?;
//!     doc.append_attribute(node, id)?;
//!     doc.append_child(root, node)?;
//! }
//! assert_eq!(
//!     doc.to_string()?,
//!     concat!(
//!         r#"<?xml version="1.0" encoding="utf-8"?>"#,
//!         r#"<Root><Node ID="0"/><Node ID="1"/><Node ID="2"/></Root>"#
//!     )
//! );
//! # Ok::<(), xmlarena::Error>(())
//! ```
//!
//! Parsing does not copy: [`Document::parse`] decodes entities by rewriting
//! the buffer it is given, and the resulting document refers into that
//! buffer. The buffer is borrowed for the lifetime of the document, so it
//! cannot be freed or changed while the document is alive. Call
//! [`Document::into_owned`] to copy everything into the document's own arena
//! and release the buffer:
//!
//! ```rust
//! use xmlarena::Document;
//!
//! let mut buffer = b"<Root><Child>value</Child></Root>".to_vec();
//! let doc = Document::parse(&mut buffer)?.into_owned();
//! drop(buffer);
//! let child = doc.find_first_child(doc.document_element().unwrap(), "Child").unwrap();
//! assert_eq!(doc.value(child), Some("value"));
//! # Ok::<(), xmlarena::Error>(())
//! ```

mod access;
mod arena;
mod creation;
mod document;
mod entity;
mod error;
pub mod fixed;
mod manipulation;
mod namespace;
pub mod output;
mod parse;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest;
mod serialize;
pub mod source;
mod span;
mod xmlvalue;

pub use access::NodeEdge;
pub use document::{Attribute, Document, DocumentState, Node};
pub use error::{Error, ParseError, ParseErrorKind, TextPos};
pub use namespace::{XMLNS_XSD, XMLNS_XSI, XSD_NAMESPACE, XSI_NAMESPACE, XSI_TYPE};
pub use source::{load_source, open_source, ResultCode};
pub use span::Provenance;
pub use xmlvalue::NodeKind;
