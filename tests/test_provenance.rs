use xmlarena::{Document, Provenance};

fn parse_owned(xml: &str) -> Document<'static> {
    let mut buffer = xml.as_bytes().to_vec();
    let doc = Document::parse(&mut buffer).unwrap();
    // the buffer is dropped at the end of this function
    doc.into_owned()
}

#[test]
fn test_parsed_text_borrows_buffer() {
    let mut buffer = br#"<a x="1">text</a>"#.to_vec();
    let doc = Document::parse(&mut buffer).unwrap();
    let a = doc.document_element().unwrap();
    let x = doc.find_first_attribute(a, "x").unwrap();
    assert_eq!(doc.name_provenance(a), Provenance::Buffer);
    assert_eq!(doc.value_provenance(a), Some(Provenance::Buffer));
    assert_eq!(doc.attribute_name_provenance(x), Provenance::Buffer);
    assert_eq!(doc.attribute_value_provenance(x), Provenance::Buffer);
    assert!(!doc.is_self_contained());
}

#[test]
fn test_into_owned_outlives_buffer() {
    let doc = parse_owned(r#"<a x="1"><b>text</b></a>"#);
    assert!(doc.is_self_contained());
    let a = doc.document_element().unwrap();
    let b = doc.find_first_child(a, "b").unwrap();
    assert_eq!(doc.value(b), Some("text"));
    assert_eq!(doc.name_provenance(b), Provenance::Arena);
    assert_eq!(doc.to_string().unwrap(), r#"<a x="1"><b>text</b></a>"#);
}

#[test]
fn test_into_owned_keeps_handles() {
    let mut buffer = b"<a><b>1</b><c/></a>".to_vec();
    let doc = Document::parse(&mut buffer).unwrap();
    let a = doc.document_element().unwrap();
    let c = doc.find_first_child(a, "c").unwrap();
    let mut doc = doc.into_owned();
    assert_eq!(doc.name(c), "c");
    doc.set_element_value(c, "2").unwrap();
    assert_eq!(doc.to_string().unwrap(), "<a><b>1</b><c>2</c></a>");
}

#[test]
fn test_into_owned_built_document_is_unchanged() {
    let mut doc = Document::new();
    let a = doc.create_element("a", "x").unwrap();
    doc.append_top_level(a).unwrap();
    let before = doc.allocated_bytes();
    let doc = doc.into_owned();
    assert_eq!(doc.allocated_bytes(), before);
    assert_eq!(doc.value(a), Some("x"));
}

#[test]
fn test_set_value_moves_to_arena() {
    let mut buffer = br#"<a x="1">text</a>"#.to_vec();
    let mut doc = Document::parse(&mut buffer).unwrap();
    let a = doc.document_element().unwrap();
    let x = doc.find_first_attribute(a, "x").unwrap();
    doc.set_attribute_value(x, "2").unwrap();
    assert_eq!(doc.attribute_value_provenance(x), Provenance::Arena);
    // the name still borrows the buffer
    assert_eq!(doc.attribute_name_provenance(x), Provenance::Buffer);
}
