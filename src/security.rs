//! PIN/TAN security envelope
//!
//! With PIN/TAN there is no real cryptography: HNVSK announces a dummy key,
//! HNSHK/HNSHA bracket the signed part and HNSHA carries PIN and TAN. The
//! segments are produced behind [`SecurityProvider`] so other profiles can be
//! slotted in.

use chrono::{DateTime, Local};
use rand::Rng;

use crate::connection::{COUNTRY_CODE, ConnectionDetails};
use crate::error::{FintsError, Result};
use crate::response::Response;
use crate::segment::{DataElement, Segment};

/// Segment numbers reserved for the encryption envelope
pub const ENCRYPTION_HEADER_NUMBER: u16 = 998;
pub const ENCRYPTED_DATA_NUMBER: u16 = 999;

/// Signature header and trailer sharing one security reference
#[derive(Debug, Clone)]
pub struct SignatureFrame {
    pub security_reference: String,
    pub header: Segment,
    pub trailer: Segment,
}

pub trait SecurityProvider: Send + Sync {
    /// HNVSK, unnumbered
    fn encryption_header(&self, conn: &ConnectionDetails) -> Segment;

    /// HNSHK and HNSHA for one message; the TAN, if any, goes into HNSHA
    fn signature(
        &self,
        conn: &ConnectionDetails,
        procedure: &str,
        tan: Option<&str>,
    ) -> SignatureFrame;

    /// Check the security segments of an inbound message
    fn verify(&self, response: &Response) -> Result<()>;
}

// ============================================================
// PIN/TAN
// ============================================================

#[derive(Debug, Default, Clone)]
pub struct PinTanSecurity;

impl PinTanSecurity {
    pub fn new() -> Self {
        Self
    }

    fn security_reference() -> String {
        rand::thread_rng().gen_range(1_000_000..10_000_000u32).to_string()
    }

    fn timestamp(now: DateTime<Local>) -> [String; 3] {
        [
            "1".to_string(),
            now.format("%Y%m%d").to_string(),
            now.format("%H%M%S").to_string(),
        ]
    }

    fn key_name(conn: &ConnectionDetails, key_type: &str) -> [String; 6] {
        [
            COUNTRY_CODE.to_string(),
            conn.blz_primary().to_string(),
            conn.user_id.clone(),
            key_type.to_string(),
            "0".to_string(),
            "0".to_string(),
        ]
    }
}

impl SecurityProvider for PinTanSecurity {
    fn encryption_header(&self, conn: &ConnectionDetails) -> Segment {
        let algorithm = vec![
            DataElement::Text("2".to_string()),
            DataElement::Text("2".to_string()),
            DataElement::Text("13".to_string()),
            // dummy session key
            DataElement::Binary(b"00000000".to_vec()),
            DataElement::Text("5".to_string()),
            DataElement::Text("1".to_string()),
        ];

        Segment::new("HNVSK", 3)
            .texts(["PIN".to_string(), conn.version.security_profile().to_string()])
            .text("998")
            .text("1")
            .texts(["1", "", conn.system_id_or_zero()])
            .texts(Self::timestamp(Local::now()))
            .group(algorithm)
            .texts(Self::key_name(conn, "V"))
            .text("0")
    }

    fn signature(
        &self,
        conn: &ConnectionDetails,
        procedure: &str,
        tan: Option<&str>,
    ) -> SignatureFrame {
        let security_reference = Self::security_reference();

        let header = Segment::new("HNSHK", 4)
            .texts(["PIN".to_string(), conn.version.security_profile().to_string()])
            .text(procedure)
            .text(security_reference.clone())
            .text("1")
            .text("1")
            .texts(["1", "", conn.system_id_or_zero()])
            .text("1")
            .texts(Self::timestamp(Local::now()))
            .texts(["1", "999", "1"])
            .texts(["6", "10", "16"])
            .texts(Self::key_name(conn, "S"));

        let mut credentials = vec![conn.pin.clone()];
        if let Some(tan) = tan {
            credentials.push(tan.to_string());
        }
        let trailer = Segment::new("HNSHA", 2)
            .text(security_reference.clone())
            .empty()
            .texts(credentials);

        SignatureFrame {
            security_reference,
            header,
            trailer,
        }
    }

    fn verify(&self, response: &Response) -> Result<()> {
        let (Some(header), Some(trailer)) = (response.segment("HNSHK"), response.segment("HNSHA"))
        else {
            return Ok(());
        };
        let header_ref = header.text_at(2, 0).unwrap_or_default();
        let trailer_ref = trailer.text_at(0, 0).unwrap_or_default();
        if header_ref != trailer_ref {
            return Err(FintsError::format(
                format!("signature reference mismatch: {header_ref} != {trailer_ref}"),
                response.text.as_bytes(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::FinTsVersion;

    fn conn() -> ConnectionDetails {
        ConnectionDetails {
            user_id: "user1".to_string(),
            pin: "12345".to_string(),
            blz: 12030000,
            ..Default::default()
        }
    }

    fn wire(seg: &Segment) -> String {
        String::from_utf8(seg.encode().unwrap()).unwrap()
    }

    #[test]
    fn test_encryption_header_layout() {
        let text = wire(&PinTanSecurity.encryption_header(&conn()).numbered(998));
        assert!(text.starts_with("HNVSK:998:3+PIN:2+998+1+1::0+1:"));
        assert!(text.ends_with("+2:2:13:@8@00000000:5:1+280:12030000:user1:V:0:0+0'"));
    }

    #[test]
    fn test_signature_carries_pin_and_tan() {
        let frame = PinTanSecurity.signature(&conn(), "921", Some("654321"));
        assert_eq!(frame.security_reference.len(), 7);

        let header = wire(&frame.header.numbered(2));
        assert!(header.starts_with(&format!("HNSHK:2:4+PIN:2+921+{}+1+1+1::0+1+1:", frame.security_reference)));
        assert!(header.ends_with("+1:999:1+6:10:16+280:12030000:user1:S:0:0'"));

        let trailer = wire(&frame.trailer.numbered(4));
        assert_eq!(
            trailer,
            format!("HNSHA:4:2+{}++12345:654321'", frame.security_reference)
        );
    }

    #[test]
    fn test_v220_uses_profile_one() {
        let mut c = conn();
        c.version = FinTsVersion::V220;
        let frame = PinTanSecurity.signature(&c, "999", None);
        assert!(wire(&frame.header.numbered(2)).starts_with("HNSHK:2:4+PIN:1+999+"));
        assert!(wire(&frame.trailer.numbered(3)).ends_with("++12345'"));
    }

    #[test]
    fn test_verify_reference_mismatch() {
        let ok = Response::parse(b"HNSHK:2:4+PIN:2+921+42'HNSHA:3:2+42'").unwrap();
        assert!(PinTanSecurity.verify(&ok).is_ok());

        let bad = Response::parse(b"HNSHK:2:4+PIN:2+921+42'HNSHA:3:2+43'").unwrap();
        assert!(PinTanSecurity.verify(&bad).is_err());

        let unsigned = Response::parse(b"HIRMG:2:2+0010::ok'").unwrap();
        assert!(PinTanSecurity.verify(&unsigned).is_ok());
    }
}
