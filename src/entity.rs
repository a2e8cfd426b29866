use std::borrow::Cow;

use crate::error::ParseErrorKind;

/// Decode entity and character references in `buf[start..end]` in place.
///
/// The decoded text is written from `start` on and the new end is returned.
/// A decoded reference is never longer than the reference itself, so the
/// text only shrinks; the bytes it frees up are overwritten with spaces so
/// that the buffer as a whole stays valid UTF-8.
///
/// On failure returns the error and the offset of the offending `&`.
pub(crate) fn decode_in_place(
    buf: &mut [u8],
    start: usize,
    end: usize,
) -> Result<usize, (ParseErrorKind, usize)> {
    let first = match buf[start..end].iter().position(|&b| b == b'&') {
        Some(i) => start + i,
        None => return Ok(end),
    };
    let mut read = first;
    let mut write = first;
    while read < end {
        let b = buf[read];
        if b != b'&' {
            buf[write] = b;
            write += 1;
            read += 1;
            continue;
        }
        let semicolon = buf[read + 1..end]
            .iter()
            .position(|&b| b == b';')
            .map(|i| read + 1 + i)
            .ok_or((ParseErrorKind::UnclosedEntity, read))?;
        let c = resolve_entity(&buf[read + 1..semicolon]).map_err(|kind| (kind, read))?;
        let mut encoded = [0u8; 4];
        let len = c.encode_utf8(&mut encoded).len();
        buf[write..write + len].copy_from_slice(&encoded[..len]);
        write += len;
        read = semicolon + 1;
    }
    buf[write..end].fill(b' ');
    Ok(write)
}

fn resolve_entity(entity: &[u8]) -> Result<char, ParseErrorKind> {
    match entity {
        b"amp" => Ok('&'),
        b"apos" => Ok('\''),
        b"gt" => Ok('>'),
        b"lt" => Ok('<'),
        b"quot" => Ok('"'),
        [b'#', b'x', digits @ ..] => character_reference(entity, digits, 16),
        [b'#', digits @ ..] => character_reference(entity, digits, 10),
        _ => Err(ParseErrorKind::UnknownEntity(
            String::from_utf8_lossy(entity).into_owned(),
        )),
    }
}

fn character_reference(entity: &[u8], digits: &[u8], radix: u32) -> Result<char, ParseErrorKind> {
    let valid_digits = !digits.is_empty()
        && digits.iter().all(|&b| match radix {
            16 => b.is_ascii_hexdigit(),
            _ => b.is_ascii_digit(),
        });
    valid_digits
        .then(|| std::str::from_utf8(digits).ok())
        .flatten()
        .and_then(|digits| u32::from_str_radix(digits, radix).ok())
        .filter(|&n| n != 0)
        .and_then(char::from_u32)
        .ok_or_else(|| {
            ParseErrorKind::InvalidCharacterReference(String::from_utf8_lossy(entity).into_owned())
        })
}

/// Escape text content.
///
/// Text that is nothing but whitespace is written as character references,
/// as a parser drops whitespace between child elements.
pub(crate) fn serialize_text(content: Cow<str>) -> Cow<str> {
    if !content.is_empty() && content.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r')) {
        return content
            .chars()
            .map(|c| format!("&#{};", c as u32))
            .collect::<String>()
            .into();
    }
    serialize_predefined_entities(content, false)
}

/// Escape an attribute value; quotes are escaped as well.
pub(crate) fn serialize_attribute(content: Cow<str>) -> Cow<str> {
    serialize_predefined_entities(content, true)
}

fn serialize_predefined_entities(content: Cow<str>, quotes: bool) -> Cow<str> {
    let needs_escape = content
        .chars()
        .any(|c| matches!(c, '&' | '<' | '>') || (quotes && matches!(c, '"' | '\'')));
    if !needs_escape {
        return content;
    }
    let mut result = String::with_capacity(content.len() + 8);
    for c in content.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if quotes => result.push_str("&quot;"),
            '\'' if quotes => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result.into()
}
