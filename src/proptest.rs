//! Proptest support
//!
//! Proptests allow you to test for *properties* of your code that must hold
//! for arbitrary data. This module lets you generate arbitrary documents as
//! [`fixed`](crate::fixed) trees.
//!
//! This can be enabled by adding the `proptest` feature to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! xmlarena = { version = "0.1", features = ["proptest"] }
//! ```
//!
//! See the [`proptest`](https://docs.rs/proptest/latest/proptest/)
//! documentation for more information.

use proptest::prelude::*;

use crate::fixed::{Attribute, Document, Element};

const ELEMENT_NAMES: &[&str] = &["a", "b", "c", "Node", "xsi:item"];
const ATTRIBUTE_NAMES: &[&str] = &["q", "r", "ID", "xmlns:xsi"];
const ENCODINGS: &[&str] = &["UTF-8", "utf-8", "ISO-8859-1"];
// an empty value builds an element without one, so values are never empty
const VALUE: &str = "[a-zA-Z0-9 \t\n&<>\"'\u{e4}\u{20ac}]{1,12}";
const WHITESPACE_VALUE: &str = "[ \t\n]{1,4}";
const ATTRIBUTE_VALUE: &str = "[a-zA-Z0-9 \t\n&<>\"'\u{e4}\u{20ac}]{0,12}";

fn arb_attribute() -> impl Strategy<Value = Attribute> {
    (prop::sample::select(ATTRIBUTE_NAMES), ATTRIBUTE_VALUE).prop_map(|(name, value)| Attribute {
        name: name.to_string(),
        value,
    })
}

fn arb_leaf() -> impl Strategy<Value = Element> {
    (
        prop::sample::select(ELEMENT_NAMES),
        prop::option::of(prop_oneof![3 => VALUE, 1 => WHITESPACE_VALUE]),
        prop::collection::vec(arb_attribute(), 0..4),
    )
        .prop_map(|(name, value, attributes)| Element {
            name: name.to_string(),
            value,
            attributes,
            children: vec![],
        })
}

/// Generate an arbitrary element tree.
pub fn arb_element() -> impl Strategy<Value = Element> {
    arb_leaf().prop_recursive(
        6,  // levels deep
        64, // maximum number of nodes
        6,  // up to 6 children per element
        |inner| {
            (arb_leaf(), prop::collection::vec(inner, 0..6)).prop_map(|(mut element, children)| {
                element.children = children;
                element
            })
        },
    )
}

/// Generate an arbitrary document.
///
/// This produces a value that can be turned into a [`crate::Document`] using
/// its `build` method.
///
/// ```notrust
/// use xmlarena::proptest::arb_document;
///
/// proptest! {
///     #[test]
///     fn test_serialize_parse(fixed in arb_document()) {
///         let doc = fixed.build().unwrap();
///         let mut buffer = doc.to_string().unwrap().into_bytes();
///         let parsed = xmlarena::Document::parse(&mut buffer);
///         prop_assert!(parsed.is_ok());
///     }
/// }
/// ```
pub fn arb_document() -> impl Strategy<Value = Document> {
    (
        prop::option::of(prop::sample::select(ENCODINGS)),
        prop::collection::vec(arb_element(), 1..3),
    )
        .prop_map(|(encoding, elements)| Document {
            declaration: encoding.map(|encoding| {
                vec![
                    Attribute {
                        name: "version".to_string(),
                        value: "1.0".to_string(),
                    },
                    Attribute {
                        name: "encoding".to_string(),
                        value: encoding.to_string(),
                    },
                ]
            }),
            elements,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_serialize_parse_round_trip(fixed in arb_document()) {
            let doc = fixed.build().unwrap();
            let mut buffer = doc.to_string().unwrap().into_bytes();
            let parsed = crate::Document::parse(&mut buffer);
            prop_assert!(parsed.is_ok(), "cannot parse: {:?}", parsed.err());
            let parsed = parsed.unwrap();
            prop_assert_eq!(parsed.fixed_document(), fixed);
        }

        #[test]
        fn test_owned_round_trip(fixed in arb_document()) {
            let doc = fixed.build().unwrap();
            let serialized = doc.to_string().unwrap();
            let owned = {
                let mut buffer = serialized.clone().into_bytes();
                let parsed = crate::Document::parse(&mut buffer).unwrap();
                parsed.into_owned()
            };
            prop_assert!(owned.is_self_contained());
            prop_assert_eq!(owned.to_string().unwrap(), serialized);
        }
    }
}
