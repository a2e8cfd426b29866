use insta::assert_snapshot;

use xmlarena::output::Output;
use xmlarena::Document;

#[test]
fn test_serialize_escapes_text() {
    let mut doc = Document::new();
    let el = doc.create_element("a", "1 < 2 & \"3\" > 'x'").unwrap();
    doc.append_top_level(el).unwrap();
    assert_snapshot!(doc.to_string().unwrap(), @r###"<a>1 &lt; 2 &amp; "3" &gt; 'x'</a>"###);
}

#[test]
fn test_serialize_escapes_attribute() {
    let mut doc = Document::new();
    let el = doc.create_element("a", "").unwrap();
    let attribute = doc.create_attribute("title", "\"A\" & 'B' <C>").unwrap();
    doc.append_attribute(el, attribute).unwrap();
    doc.append_top_level(el).unwrap();
    assert_snapshot!(doc.to_string().unwrap(), @r###"<a title="&quot;A&quot; &amp; &apos;B&apos; &lt;C&gt;"/>"###);
}

#[test]
fn test_serialize_nested() {
    let mut doc = Document::new();
    doc.set_header(1, "utf-8").unwrap();
    let root = doc.create_element("Root", "").unwrap();
    doc.append_top_level(root).unwrap();
    let person = doc.create_element("Person", "").unwrap();
    doc.append_child(root, person).unwrap();
    let name = doc.create_element("Name", "Ada").unwrap();
    let empty = doc.create_element("Empty", "").unwrap();
    doc.append_child(person, name).unwrap();
    doc.append_child(person, empty).unwrap();
    assert_snapshot!(doc.to_string().unwrap(), @r###"<?xml version="1.0" encoding="utf-8"?><Root><Person><Name>Ada</Name><Empty/></Person></Root>"###);
}

#[test]
fn test_serialize_parsed_round_trip() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?><root a="1"><b>text</b><c/></root>"#;
    let mut buffer = xml.as_bytes().to_vec();
    let doc = Document::parse(&mut buffer).unwrap();
    assert_eq!(doc.to_string().unwrap(), xml);
}

#[test]
fn test_serialize_normalizes_markup() {
    let mut buffer = br#"<root  a = 'x' ><!-- gone --><b></b>
  <c>&#65;</c></root >"#
        .to_vec();
    let doc = Document::parse(&mut buffer).unwrap();
    assert_snapshot!(doc.to_string().unwrap(), @r###"<root a="x"><b/><c>A</c></root>"###);
}

#[test]
fn test_serialize_to_writer() {
    let mut doc = Document::new();
    let el = doc.create_element("a", "b").unwrap();
    doc.append_top_level(el).unwrap();
    let mut w = Vec::new();
    doc.serialize(&mut w).unwrap();
    assert_eq!(w, b"<a>b</a>");
}

#[test]
fn test_outputs_follow_nodes() {
    let mut doc = Document::new();
    let a = doc.create_element("a", "").unwrap();
    let b = doc.create_element("b", "").unwrap();
    doc.append_child(a, b).unwrap();
    doc.append_top_level(a).unwrap();
    let outputs = doc.outputs().collect::<Vec<_>>();
    assert_eq!(
        outputs,
        vec![
            (a, Output::StartTagOpen("a")),
            (a, Output::StartTagClose),
            (b, Output::StartTagOpen("b")),
            (b, Output::StartTagClose),
            (b, Output::EndTag("b")),
            (a, Output::EndTag("a")),
        ]
    );
}
