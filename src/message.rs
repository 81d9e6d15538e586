//! Message assembly
//!
//! ```text
//! HNHBK:1:3      header, 12-digit total length
//! HNVSK:998:3    encryption header
//! HNVSD:999:1    @len@ ┌ HNSHK:2:4        signature header
//!                      │ <body>:3..       business segments, HKTAN
//!                      └ HNSHA:n:2        PIN[:TAN]
//! HNHBS:n+1:1    trailer, message number
//! ```

use crate::connection::ConnectionDetails;
use crate::error::{FintsError, Result};
use crate::security::{ENCRYPTED_DATA_NUMBER, ENCRYPTION_HEADER_NUMBER, SecurityProvider};
use crate::segment::Segment;
use crate::segment::codec::{LENGTH_PLACEHOLDER, SEGMENT_END, splice_binary};

/// Width of the HNHBK length field
pub const LENGTH_DIGITS: usize = 12;

const HEADER_NUMBER: u16 = 1;
const SIGNATURE_HEADER_NUMBER: u16 = 2;
const FIRST_BODY_NUMBER: u16 = 3;

/// An encoded message ready for the transport
#[derive(Debug, Clone)]
pub struct Message {
    pub bytes: Vec<u8>,
    pub message_number: u32,
    /// Segment ids of the body in order, for logging
    pub body: Vec<String>,
}

impl Message {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Number the body segments consecutively from 3
pub fn number_body(body: Vec<Segment>) -> Vec<Segment> {
    body.into_iter()
        .zip(FIRST_BODY_NUMBER..)
        .map(|(segment, number)| segment.numbered(number))
        .collect()
}

/// Number for a segment appended after `body_len` body segments
pub fn next_number(body_len: usize) -> u16 {
    FIRST_BODY_NUMBER + body_len as u16
}

pub struct MessageAssembler<'a> {
    conn: &'a ConnectionDetails,
    security: &'a dyn SecurityProvider,
}

impl<'a> MessageAssembler<'a> {
    pub fn new(conn: &'a ConnectionDetails, security: &'a dyn SecurityProvider) -> Self {
        Self { conn, security }
    }

    /// Frame `body` into a complete message
    pub fn assemble(
        &self,
        dialog_id: &str,
        message_number: u32,
        procedure: &str,
        body: Vec<Segment>,
        tan: Option<&str>,
    ) -> Result<Message> {
        if body.is_empty() {
            return Err(FintsError::format("message without business segments", b""));
        }
        let names = body.iter().map(|s| s.name().to_string()).collect();
        let body_len = body.len();

        // signed part
        let frame = self.security.signature(self.conn, procedure, tan);
        let trailer_number = next_number(body_len);
        let mut signed = frame.header.numbered(SIGNATURE_HEADER_NUMBER).encode()?;
        for segment in number_body(body) {
            signed.extend(segment.encode()?);
        }
        signed.extend(frame.trailer.numbered(trailer_number).encode()?);

        // encryption envelope
        let mut payload = self
            .security
            .encryption_header(self.conn)
            .numbered(ENCRYPTION_HEADER_NUMBER)
            .encode()?;
        let mut envelope = format!("HNVSD:{ENCRYPTED_DATA_NUMBER}:1+").into_bytes();
        envelope.extend_from_slice(LENGTH_PLACEHOLDER);
        envelope.push(SEGMENT_END);
        payload.extend(splice_binary(&envelope, &signed)?);
        payload.extend(
            Segment::new("HNHBS", 1)
                .numbered(trailer_number + 1)
                .text(message_number.to_string())
                .encode()?,
        );

        let header_len = self.header(0, dialog_id, message_number)?.len();
        let mut bytes = self.header(header_len + payload.len(), dialog_id, message_number)?;
        if bytes.len() != header_len {
            return Err(FintsError::format("message length exceeds header field", &bytes));
        }
        bytes.extend(payload);

        Ok(Message {
            bytes,
            message_number,
            body: names,
        })
    }

    fn header(&self, total: usize, dialog_id: &str, message_number: u32) -> Result<Vec<u8>> {
        Segment::new("HNHBK", 3)
            .numbered(HEADER_NUMBER)
            .text(format!("{total:0width$}", width = LENGTH_DIGITS))
            .text(self.conn.version.id().to_string())
            .text(dialog_id)
            .text(message_number.to_string())
            .encode()
    }
}

/// Total length declared in HNHBK
pub fn declared_length(message: &[u8]) -> Option<usize> {
    let start = message.iter().position(|&b| b == b'+')? + 1;
    let digits = message.get(start..start + LENGTH_DIGITS)?;
    std::str::from_utf8(digits).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;
    use crate::security::PinTanSecurity;
    use crate::segment::builders;
    use proptest::prelude::*;

    fn conn() -> ConnectionDetails {
        ConnectionDetails {
            user_id: "user1".to_string(),
            pin: "12345".to_string(),
            blz: 12030000,
            ..Default::default()
        }
    }

    #[test]
    fn test_declared_length_matches() {
        let c = conn();
        let msg = MessageAssembler::new(&c, &PinTanSecurity)
            .assemble("0", 1, "999", vec![builders::hkidn(&c)], None)
            .unwrap();
        assert_eq!(declared_length(&msg.bytes), Some(msg.len()));
        assert!(msg.bytes.starts_with(b"HNHBK:1:3+000000000"));
        assert!(msg.bytes.ends_with(b"HNHBS:5:1+1'"));
    }

    #[test]
    fn test_segment_numbering_and_tan_append() {
        let c = conn();
        let body = vec![
            builders::hkidn(&c),
            builders::hkvvb("PRODUCT"),
            builders::hktan_process4("HKIDN", None),
        ];
        let msg = MessageAssembler::new(&c, &PinTanSecurity)
            .assemble("DLG-1", 2, "921", body, Some("999000"))
            .unwrap();

        let resp = Response::parse(&msg.bytes).unwrap();
        let numbers: Vec<(String, u16)> = resp
            .segments
            .iter()
            .map(|s| (s.name().to_string(), s.header.number))
            .collect();
        let expected = [
            ("HNHBK", 1),
            ("HNVSK", 998),
            ("HNSHK", 2),
            ("HKIDN", 3),
            ("HKVVB", 4),
            ("HKTAN", 5),
            ("HNSHA", 6),
            ("HNHBS", 7),
        ];
        assert_eq!(numbers.len(), expected.len());
        for ((name, number), (exp_name, exp_number)) in numbers.iter().zip(expected) {
            assert_eq!(name, exp_name);
            assert_eq!(*number, exp_number);
        }
        assert_eq!(resp.dialog_id(), Some("DLG-1"));
        assert_eq!(resp.segment("HNSHA").and_then(|s| s.text_at(2, 1)), Some("999000"));
        assert_eq!(msg.body, vec!["HKIDN", "HKVVB", "HKTAN"]);
    }

    #[test]
    fn test_empty_body_rejected() {
        let c = conn();
        assert!(MessageAssembler::new(&c, &PinTanSecurity)
            .assemble("0", 1, "999", Vec::new(), None)
            .is_err());
    }

    #[test]
    fn test_next_number() {
        assert_eq!(next_number(0), 3);
        assert_eq!(next_number(1), 4);
    }

    proptest! {
        #[test]
        fn prop_declared_length_across_digit_widths(len in prop::sample::select(vec![1usize, 9, 10, 99, 100, 999, 1000, 9999, 10000, 99999, 100000])) {
            let pain = builders::PainDocument::new(builders::PAIN_001_001_03, vec![b'x'; len]);
            let mut c2 = conn();
            c2.iban = Some("DE02120300000000202051".to_string());
            c2.bic = Some("BYLADEM1001".to_string());
            let body = vec![builders::hkccs(&c2, &pain).unwrap()];
            let msg = MessageAssembler::new(&c2, &PinTanSecurity)
                .assemble("0", 1, "999", body, None)
                .unwrap();

            prop_assert_eq!(declared_length(&msg.bytes), Some(msg.len()));
            let resp = Response::parse(&msg.bytes).unwrap();
            let hkccs = resp.segment("HKCCS").unwrap();
            prop_assert_eq!(hkccs.element(2, 0).map(|e| e.as_bytes().len()), Some(len));
        }
    }
}
