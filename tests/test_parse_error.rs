use rstest::rstest;

use xmlarena::{Document, Error, ParseErrorKind, TextPos};

fn parse_error(xml: &[u8]) -> xmlarena::ParseError {
    let mut buffer = xml.to_vec();
    match Document::parse(&mut buffer) {
        Err(Error::Parse(err)) => err,
        Err(err) => panic!("unexpected error: {}", err),
        Ok(_) => panic!("parsed without error"),
    }
}

#[rstest]
#[case(
    b"<Root><Child></Root>",
    ParseErrorKind::MismatchedCloseTag { expected: "Child".to_string(), found: "Root".to_string() },
    15
)]
#[case(b"<doc>", ParseErrorKind::UnclosedElement("doc".to_string()), 1)]
#[case(b"<doc><a/>", ParseErrorKind::UnclosedElement("doc".to_string()), 1)]
#[case(b"<doc", ParseErrorKind::UnexpectedEnd, 4)]
#[case(b"</doc>", ParseErrorKind::UnexpectedCloseTag("doc".to_string()), 2)]
#[case(b"<doc a=1/>", ParseErrorKind::UnquotedAttributeValue, 7)]
#[case(br#"<doc a="1""#, ParseErrorKind::UnexpectedEnd, 10)]
#[case(br#"<doc a "1"/>"#, ParseErrorKind::ExpectedEquals, 7)]
#[case(br#"<doc a="<"/>"#, ParseErrorKind::InvalidAttributeValue, 8)]
#[case(b"<>", ParseErrorKind::EmptyName, 1)]
#[case(b"<doc>&foo;</doc>", ParseErrorKind::UnknownEntity("foo".to_string()), 5)]
#[case(b"<doc>&amp</doc>", ParseErrorKind::UnclosedEntity, 5)]
#[case(b"<doc>&#xFFFFFF;</doc>", ParseErrorKind::InvalidCharacterReference("#xFFFFFF".to_string()), 5)]
#[case(b"text<doc/>", ParseErrorKind::TextOutsideElement, 0)]
#[case(br#"<doc/><?xml version="1.0"?>"#, ParseErrorKind::MisplacedDeclaration, 6)]
#[case(b"<doc>\xff</doc>", ParseErrorKind::InvalidUtf8, 5)]
#[case(b"<doc><!-- never closed</doc>", ParseErrorKind::UnexpectedEnd, 28)]
fn test_parse_error(#[case] xml: &[u8], #[case] kind: ParseErrorKind, #[case] offset: usize) {
    let err = parse_error(xml);
    assert_eq!(err.kind(), &kind);
    assert_eq!(err.offset(), offset);
}

#[test]
fn test_mismatch_message() {
    let err = parse_error(b"<Root><Child></Root>");
    assert_eq!(
        err.to_string(),
        "expected close tag 'Child', not 'Root' at 1:16"
    );
}

#[test]
fn test_error_position_on_later_line() {
    let err = parse_error(b"<a>\n  <b></a>");
    assert_eq!(err.pos(), TextPos::new(2, 8));
}

#[test]
fn test_parse_error_converts() {
    let mut buffer = b"<a>".to_vec();
    let err = Document::parse(&mut buffer).err().unwrap();
    assert!(err.to_string().starts_with("parse error: "));
    assert!(std::error::Error::source(&err).is_some());
}
