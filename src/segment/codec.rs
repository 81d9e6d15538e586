//! FinTS Segment Codec
//!
//! Wire syntax:
//!
//! ```text
//! HKKAZ:3:7+DE02120300000000202051:BYLADEM1001+N+20240101'
//! │     │ │ │                      │           │ │
//! │     │ │ │                      │           │ └ segment terminator  '
//! │     │ │ │                      │           └ group delimiter       +
//! │     │ │ │                      └ element delimiter                 :
//! │     │ │ └ first data element group
//! │     │ └ format version
//! │     └ segment number
//! └ segment id
//! ```
//!
//! `?` escapes a literal `+ : ? ' @`. Binary elements are written as
//! `@<byte length>@<raw bytes>` and are opaque to the delimiter scan.
//! Text is carried in the windows-1252 superset of Latin-1.

use encoding_rs::WINDOWS_1252;

use super::{DataElement, DataGroup, Segment, SegmentHeader};
use crate::error::{FintsError, Result};

// ============================================================
// DELIMITERS
// ============================================================

pub const SEGMENT_END: u8 = b'\'';
pub const GROUP_SEP: u8 = b'+';
pub const ELEMENT_SEP: u8 = b':';
pub const ESCAPE: u8 = b'?';
pub const BINARY_MARK: u8 = b'@';

/// Marker for a binary element whose length is not known yet
pub const LENGTH_PLACEHOLDER: &[u8] = b"@@";

#[inline]
fn is_reserved(c: char) -> bool {
    matches!(c, '+' | ':' | '?' | '\'' | '@')
}

// ============================================================
// ESCAPING
// ============================================================

/// Escape every reserved character with `?`
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if is_reserved(c) {
            out.push('?');
        }
        out.push(c);
    }
    out
}

/// Invert [`escape`]; a dangling `?` at the end is kept literally
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '?' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('?'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

// ============================================================
// CHARACTER ENCODING
// ============================================================

/// Encode text for the wire; characters outside windows-1252 are rejected
pub fn encode_latin1(text: &str) -> Result<Vec<u8>> {
    let (bytes, _, unmappable) = WINDOWS_1252.encode(text);
    if unmappable {
        return Err(FintsError::format(
            "text not representable in Latin-1",
            text,
        ));
    }
    Ok(bytes.into_owned())
}

/// Decode wire bytes; every byte maps to exactly one char
pub fn decode_latin1(bytes: &[u8]) -> String {
    WINDOWS_1252
        .decode_without_bom_handling(bytes)
        .0
        .into_owned()
}

/// Re-interpret Latin-1 decoded text as the UTF-8 bytes it really carries.
///
/// Embedded XML documents are UTF-8 while the wire is not.
pub fn latin1_to_utf8(text: &str) -> String {
    let (bytes, _, _) = WINDOWS_1252.encode(text);
    String::from_utf8_lossy(&bytes).into_owned()
}

// ============================================================
// LENGTH PREFIX
// ============================================================

/// `@<len>@` header of a binary element
#[inline]
pub fn length_prefix(len: usize) -> String {
    format!("@{len}@")
}

/// Replace the single length placeholder in `encoded` with `@<len>@payload`.
///
/// The scan skips escaped characters and existing binary elements, so the
/// placeholder is only found where it was written as structure.
pub fn splice_binary(encoded: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let mut found: Option<usize> = None;
    let mut pos = 0;

    while pos < encoded.len() {
        match encoded[pos] {
            ESCAPE => pos += 2,
            BINARY_MARK if encoded.get(pos + 1) == Some(&BINARY_MARK) => {
                if found.is_some() {
                    return Err(FintsError::format(
                        "more than one length placeholder",
                        encoded,
                    ));
                }
                found = Some(pos);
                pos += LENGTH_PLACEHOLDER.len();
            }
            BINARY_MARK => {
                let (_, end) = read_length(encoded, pos)?;
                pos = end;
            }
            _ => pos += 1,
        }
    }

    let at = found.ok_or_else(|| FintsError::format("no length placeholder", encoded))?;
    let prefix = length_prefix(payload.len());

    let mut out = Vec::with_capacity(encoded.len() + prefix.len() + payload.len());
    out.extend_from_slice(&encoded[..at]);
    out.extend_from_slice(prefix.as_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&encoded[at + LENGTH_PLACEHOLDER.len()..]);
    Ok(out)
}

/// Parse `@<digits>@` at `pos`, returning the payload range (first byte, end)
fn read_length(bytes: &[u8], pos: usize) -> Result<(usize, usize)> {
    let digits_start = pos + 1;
    let close = bytes[digits_start..]
        .iter()
        .position(|&b| b == BINARY_MARK)
        .map(|i| digits_start + i)
        .ok_or_else(|| FintsError::format("unterminated binary length", &bytes[pos..]))?;

    let digits = &bytes[digits_start..close];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(FintsError::format("invalid binary length", &bytes[pos..]));
    }
    let len: usize = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| FintsError::format("invalid binary length", &bytes[pos..]))?;

    let body_start = close + 1;
    match body_start.checked_add(len) {
        Some(end) if end <= bytes.len() => Ok((body_start, end)),
        _ => Err(FintsError::format(
            format!("binary element declares {len} bytes beyond end of data"),
            &bytes[pos..],
        )),
    }
}

// ============================================================
// ENCODING
// ============================================================

pub fn encode_segment(segment: &Segment) -> Result<Vec<u8>> {
    let header = &segment.header;
    let mut out = encode_latin1(&escape(&header.name))?;
    out.extend_from_slice(format!(":{}:{}", header.number, header.version).as_bytes());
    if let Some(reference) = header.reference {
        out.extend_from_slice(format!(":{reference}").as_bytes());
    }

    for group in &segment.groups {
        out.push(GROUP_SEP);
        for (i, element) in group.iter().enumerate() {
            if i > 0 {
                out.push(ELEMENT_SEP);
            }
            match element {
                DataElement::Text(text) => out.extend(encode_latin1(&escape(text))?),
                DataElement::Binary(bytes) => {
                    out.extend_from_slice(length_prefix(bytes.len()).as_bytes());
                    out.extend_from_slice(bytes);
                }
            }
        }
    }

    out.push(SEGMENT_END);
    Ok(out)
}

// ============================================================
// DECODING
// ============================================================

/// Split a byte stream into segments
pub fn parse_segments(bytes: &[u8]) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos].is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        let (segment, next) = parse_one(bytes, pos)?;
        segments.push(segment);
        pos = next;
    }

    Ok(segments)
}

/// Parse a single segment, requiring the input to hold exactly one
pub fn decode_segment(bytes: &[u8]) -> Result<Segment> {
    let mut segments = parse_segments(bytes)?;
    match segments.len() {
        1 => Ok(segments.remove(0)),
        n => Err(FintsError::format(format!("expected 1 segment, found {n}"), bytes)),
    }
}

fn parse_one(bytes: &[u8], start: usize) -> Result<(Segment, usize)> {
    let mut groups: Vec<DataGroup> = Vec::new();
    let mut group: DataGroup = Vec::new();
    let mut pos = start;

    loop {
        // one data element per iteration
        let element = if bytes.get(pos) == Some(&BINARY_MARK) {
            let (body, end) = read_length(bytes, pos)?;
            pos = end;
            DataElement::Binary(bytes[body..end].to_vec())
        } else {
            let mut raw = Vec::new();
            while let Some(&b) = bytes.get(pos) {
                match b {
                    ESCAPE => {
                        let escaped = bytes.get(pos + 1).ok_or_else(|| {
                            FintsError::format("dangling escape character", &bytes[start..])
                        })?;
                        raw.push(*escaped);
                        pos += 2;
                    }
                    GROUP_SEP | ELEMENT_SEP | SEGMENT_END => break,
                    _ => {
                        raw.push(b);
                        pos += 1;
                    }
                }
            }
            DataElement::Text(decode_latin1(&raw))
        };
        group.push(element);

        match bytes.get(pos) {
            Some(&ELEMENT_SEP) => pos += 1,
            Some(&GROUP_SEP) => {
                groups.push(std::mem::take(&mut group));
                pos += 1;
            }
            Some(&SEGMENT_END) => {
                groups.push(group);
                pos += 1;
                break;
            }
            Some(_) => {
                return Err(FintsError::format(
                    "binary element not followed by a delimiter",
                    &bytes[start..],
                ));
            }
            None => {
                return Err(FintsError::format("unterminated segment", &bytes[start..]));
            }
        }
    }

    let mut groups = groups.into_iter();
    let header_group = groups
        .next()
        .ok_or_else(|| FintsError::format("empty segment", &bytes[start..pos]))?;
    let header = parse_header(&header_group, &bytes[start..pos])?;

    Ok((
        Segment {
            header,
            groups: groups.collect(),
        },
        pos,
    ))
}

fn parse_header(group: &[DataElement], raw: &[u8]) -> Result<SegmentHeader> {
    let text = |i: usize| match group.get(i) {
        Some(DataElement::Text(t)) => Some(t.as_str()),
        _ => None,
    };
    let number = |i: usize, what: &str| -> Result<u16> {
        text(i)
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| FintsError::format(format!("invalid segment {what}"), raw))
    };

    let name = text(0)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| FintsError::format("missing segment id", raw))?;

    let reference = match text(3) {
        Some(r) if !r.is_empty() => Some(number(3, "reference")?),
        _ => None,
    };

    Ok(SegmentHeader {
        name: name.to_string(),
        number: number(1, "number")?,
        version: number(2, "version")?,
        reference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_reserved_characters() {
        assert_eq!(escape("a+b:c?d'e@f"), "a?+b?:c??d?'e?@f");
        assert_eq!(escape("plain"), "plain");
        assert_eq!(unescape(&escape("a+b:c?d'e@f")), "a+b:c?d'e@f");
    }

    #[test]
    fn test_unescape_dangling() {
        assert_eq!(unescape("abc?"), "abc?");
        assert_eq!(unescape("??"), "?");
    }

    #[test]
    fn test_encode_segment() {
        let seg = Segment::new("HKKAZ", 7)
            .numbered(3)
            .texts(["DE02120300000000202051", "BYLADEM1001"])
            .text("N");
        assert_eq!(
            encode_segment(&seg).unwrap(),
            b"HKKAZ:3:7+DE02120300000000202051:BYLADEM1001+N'".to_vec()
        );
    }

    #[test]
    fn test_encode_with_reference_and_binary() {
        let seg = Segment::new("HIRMS", 2)
            .numbered(4)
            .referencing(3)
            .binary(b"a'b".to_vec());
        assert_eq!(encode_segment(&seg).unwrap(), b"HIRMS:4:2:3+@3@a'b'".to_vec());
    }

    #[test]
    fn test_parse_escaped_and_binary() {
        let raw = b"HIRMS:4:2:3+0020::Auftrag?: ok?'+@4@x+:'+N'HNHBS:5:1+1'";
        let segs = parse_segments(raw).unwrap();
        assert_eq!(segs.len(), 2);

        let hirms = &segs[0];
        assert_eq!(hirms.header.name, "HIRMS");
        assert_eq!(hirms.header.reference, Some(3));
        assert_eq!(hirms.text_at(0, 2), Some("Auftrag: ok'"));
        assert_eq!(
            hirms.element(1, 0),
            Some(&DataElement::Binary(b"x+:'".to_vec()))
        );
        assert_eq!(hirms.text_at(2, 0), Some("N"));
        assert_eq!(segs[1].header.number, 5);
    }

    #[test]
    fn test_parse_latin1_text() {
        // 0xFC = ü in Latin-1
        let raw = b"HIRMS:3:2+0020::Auftrag ausgef\xFChrt.'";
        let segs = parse_segments(raw).unwrap();
        assert_eq!(segs[0].text_at(0, 2), Some("Auftrag ausgeführt."));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_segments(b"HKIDN:2:2+280").is_err());
        assert!(parse_segments(b"HKIDN:x:2+280'").is_err());
        assert!(parse_segments(b"HKIDN:2:2+@99@abc'").is_err());
        assert!(parse_segments(b"HKIDN:2:2+abc?").is_err());
    }

    #[test]
    fn test_oversized_binary_length_is_error() {
        let err = parse_segments(b"HIRMS:3:2+@18446744073709551615@abc'").unwrap_err();
        assert_eq!(err.code(), "PROTOCOL_FORMAT");
        let err = parse_segments(b"HIRMS:3:2+@99999999999999999999999@abc'").unwrap_err();
        assert_eq!(err.code(), "PROTOCOL_FORMAT");
        assert!(splice_binary(b"X:1:1+@18446744073709551615@a+@@'", b"p").is_err());
    }

    #[test]
    fn test_parse_skips_line_breaks() {
        let segs = parse_segments(b"HNHBS:5:1+1'\r\nHNHBS:6:1+2'\n").unwrap();
        assert_eq!(segs.len(), 2);
    }

    #[test]
    fn test_splice_binary() {
        let out = splice_binary(b"HNVSD:999:1+@@'", b"HNSHK:2:4'").unwrap();
        assert_eq!(out, b"HNVSD:999:1+@10@HNSHK:2:4''".to_vec());
    }

    #[test]
    fn test_splice_ignores_escaped_and_binary_markers() {
        let out = splice_binary(b"X:1:1+a?@?@+@2@@@+@@'", b"pay").unwrap();
        assert_eq!(out, b"X:1:1+a?@?@+@2@@@+@3@pay'".to_vec());
    }

    #[test]
    fn test_splice_requires_exactly_one_placeholder() {
        assert!(splice_binary(b"X:1:1+a'", b"p").is_err());
        assert!(splice_binary(b"X:1:1+@@+@@'", b"p").is_err());
    }

    #[test]
    fn test_latin1_roundtrip_to_utf8() {
        let utf8_bytes = "Müller".as_bytes();
        let wire_text = decode_latin1(utf8_bytes);
        assert_ne!(wire_text, "Müller");
        assert_eq!(latin1_to_utf8(&wire_text), "Müller");
    }

    #[test]
    fn test_encode_rejects_unmappable() {
        assert!(encode_latin1("€ ok").is_ok());
        assert!(encode_latin1("日本").is_err());
    }
}
