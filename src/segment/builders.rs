//! Outbound segment builders
//!
//! Every builder returns an unnumbered [`Segment`]; numbers are handed out by
//! the message assembler. SEPA payloads arrive ready-made as [`PainDocument`]
//! and are embedded as binary elements.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::Segment;
use crate::connection::{COUNTRY_CODE, ConnectionDetails};
use crate::error::{FintsError, Result};

// ============================================================
// SEPA DESCRIPTORS
// ============================================================

pub const PAIN_001_001_03: &str = "urn:iso:std:iso:20022:tech:xsd:pain.001.001.03";
pub const PAIN_001_002_03: &str = "urn:iso:std:iso:20022:tech:xsd:pain.001.002.03";
pub const PAIN_008_002_02: &str = "urn:iso:std:iso:20022:tech:xsd:pain.008.002.02";

/// Ready-made SEPA pain document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PainDocument {
    /// Namespace URN, e.g. [`PAIN_008_002_02`]
    pub descriptor: String,
    pub xml: Vec<u8>,
}

impl PainDocument {
    pub fn new(descriptor: impl Into<String>, xml: impl Into<Vec<u8>>) -> Self {
        Self {
            descriptor: descriptor.into(),
            xml: xml.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CamtVersion {
    Camt052,
    Camt053,
}

impl CamtVersion {
    pub fn descriptor(&self) -> &'static str {
        match self {
            CamtVersion::Camt052 => "urn:iso:std:iso:20022:tech:xsd:camt.052.001.02",
            CamtVersion::Camt053 => "urn:iso:std:iso:20022:tech:xsd:camt.053.001.02",
        }
    }
}

// ============================================================
// FIELD FORMATTING
// ============================================================

/// FinTS date `YYYYMMDD`, empty when absent
fn date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%Y%m%d").to_string())
        .unwrap_or_default()
}

/// FinTS amount: decimal comma, comma always present
pub fn format_amount(amount: Decimal) -> String {
    let text = amount.normalize().to_string().replace('.', ",");
    if text.contains(',') { text } else { format!("{text},") }
}

/// Account group with IBAN (KTI) for SEPA-era segment versions
fn account_international(conn: &ConnectionDetails) -> Result<Vec<String>> {
    let (iban, bic) = conn.sepa_account()?;
    Ok(vec![
        iban.to_string(),
        bic.to_string(),
        conn.account.clone(),
        conn.sub_account.clone().unwrap_or_default(),
        COUNTRY_CODE.to_string(),
        conn.blz.to_string(),
    ])
}

/// Classic account group (KTV)
fn account_national(conn: &ConnectionDetails) -> Vec<String> {
    vec![
        conn.account.clone(),
        conn.sub_account.clone().unwrap_or_default(),
        COUNTRY_CODE.to_string(),
        conn.blz.to_string(),
    ]
}

fn sepa_account(conn: &ConnectionDetails) -> Result<[String; 2]> {
    let (iban, bic) = conn.sepa_account()?;
    Ok([iban.to_string(), bic.to_string()])
}

// ============================================================
// DIALOG SEGMENTS
// ============================================================

/// Identification
pub fn hkidn(conn: &ConnectionDetails) -> Segment {
    Segment::new("HKIDN", 2)
        .texts([COUNTRY_CODE.to_string(), conn.blz_primary().to_string()])
        .text(conn.user_id.clone())
        .text(conn.system_id_or_zero())
        .text("1")
}

/// Processing preparation
pub fn hkvvb(product_id: &str) -> Segment {
    Segment::new("HKVVB", 3)
        .text("0")
        .text("0")
        .text("0")
        .text(product_id)
        .text(env!("CARGO_PKG_VERSION"))
}

/// Synchronisation: request a new customer-system id
pub fn hksyn() -> Segment {
    Segment::new("HKSYN", 3).text("0")
}

pub fn hkend(dialog_id: &str) -> Segment {
    Segment::new("HKEND", 1).text(dialog_id)
}

/// TAN process 4: announce that `reference_segment` needs a TAN
pub fn hktan_process4(reference_segment: &str, medium: Option<&str>) -> Segment {
    Segment::new("HKTAN", 6)
        .text("4")
        .text(reference_segment)
        .empties(8)
        .text(medium.unwrap_or_default())
        .trimmed()
}

/// TAN process 2: confirm the order `task_reference` (TAN travels in HNSHA)
pub fn hktan_process2(task_reference: &str, medium: Option<&str>) -> Segment {
    Segment::new("HKTAN", 6)
        .text("2")
        .empties(3)
        .text(task_reference)
        .text("N")
        .empties(4)
        .text(medium.unwrap_or_default())
        .trimmed()
}

/// TAN media list
pub fn hktab() -> Segment {
    Segment::new("HKTAB", 4).text("0").text("A")
}

// ============================================================
// STATEMENT RETRIEVAL
// ============================================================

/// Account transactions (MT940). Version 7 with IBAN, version 5 without.
pub fn hkkaz(
    conn: &ConnectionDetails,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    startpoint: Option<&str>,
) -> Result<Segment> {
    let seg = if conn.iban.is_some() {
        Segment::new("HKKAZ", 7).texts(account_international(conn)?)
    } else {
        Segment::new("HKKAZ", 5).texts(account_national(conn))
    };

    Ok(seg
        .text("N")
        .text(date(from))
        .text(date(to))
        .empty()
        .text(startpoint.unwrap_or_default())
        .trimmed())
}

/// Account transactions (camt.052 / camt.053)
pub fn hkcaz(
    conn: &ConnectionDetails,
    camt: CamtVersion,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    startpoint: Option<&str>,
) -> Result<Segment> {
    Ok(Segment::new("HKCAZ", 1)
        .texts(account_international(conn)?)
        .text(camt.descriptor())
        .text("N")
        .text(date(from))
        .text(date(to))
        .empty()
        .text(startpoint.unwrap_or_default())
        .trimmed())
}

// ============================================================
// SEPA ORDERS
// ============================================================

/// Single SEPA credit transfer
pub fn hkccs(conn: &ConnectionDetails, pain: &PainDocument) -> Result<Segment> {
    Ok(Segment::new("HKCCS", 1)
        .texts(sepa_account(conn)?)
        .text(pain.descriptor.clone())
        .binary(pain.xml.clone()))
}

/// Single SEPA direct debit
pub fn hkdse(conn: &ConnectionDetails, pain: &PainDocument) -> Result<Segment> {
    Ok(Segment::new("HKDSE", 1)
        .texts(sepa_account(conn)?)
        .text(pain.descriptor.clone())
        .binary(pain.xml.clone()))
}

/// Collective SEPA direct debit
pub fn hkdme(conn: &ConnectionDetails, pain: &PainDocument) -> Result<Segment> {
    Ok(Segment::new("HKDME", 1)
        .texts(sepa_account(conn)?)
        .empties(2)
        .text(pain.descriptor.clone())
        .binary(pain.xml.clone()))
}

/// Scheduled SEPA credit transfer; the execution date travels in the pain
pub fn hkcse(conn: &ConnectionDetails, pain: &PainDocument) -> Result<Segment> {
    Ok(Segment::new("HKCSE", 1)
        .texts(sepa_account(conn)?)
        .text(pain.descriptor.clone())
        .binary(pain.xml.clone()))
}

/// Collective transfer layout: account, control sum, single-booking flag
/// (left to the bank), descriptor, pain
fn collective_transfer(
    name: &str,
    conn: &ConnectionDetails,
    pain: &PainDocument,
    total: Decimal,
) -> Result<Segment> {
    Ok(Segment::new(name, 1)
        .texts(sepa_account(conn)?)
        .texts([format_amount(total), "EUR".to_string()])
        .empty()
        .text(pain.descriptor.clone())
        .binary(pain.xml.clone()))
}

/// Collective SEPA credit transfer
pub fn hkccm(conn: &ConnectionDetails, pain: &PainDocument, total: Decimal) -> Result<Segment> {
    collective_transfer("HKCCM", conn, pain, total)
}

/// Collective scheduled SEPA credit transfer
pub fn hkcme(conn: &ConnectionDetails, pain: &PainDocument, total: Decimal) -> Result<Segment> {
    collective_transfer("HKCME", conn, pain, total)
}

/// Scheduled SEPA credit transfers on record (paginated)
pub fn hkcsb(conn: &ConnectionDetails, startpoint: Option<&str>) -> Result<Segment> {
    Ok(Segment::new("HKCSB", 1)
        .texts(sepa_account(conn)?)
        .empties(2)
        .text(startpoint.unwrap_or_default())
        .trimmed())
}

/// Replace scheduled transfer `order_id` with `pain`
pub fn hkcsa(conn: &ConnectionDetails, order_id: &str, pain: &PainDocument) -> Result<Segment> {
    scheduled_order("HKCSA", conn, order_id, pain)
}

/// Delete scheduled transfer `order_id`; `pain` repeats the order
pub fn hkcsl(conn: &ConnectionDetails, order_id: &str, pain: &PainDocument) -> Result<Segment> {
    scheduled_order("HKCSL", conn, order_id, pain)
}

fn scheduled_order(
    name: &str,
    conn: &ConnectionDetails,
    order_id: &str,
    pain: &PainDocument,
) -> Result<Segment> {
    if order_id.is_empty() {
        return Err(FintsError::MissingField("order_id"));
    }
    Ok(Segment::new(name, 1)
        .texts(sepa_account(conn)?)
        .text(pain.descriptor.clone())
        .binary(pain.xml.clone())
        .text(order_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn conn() -> ConnectionDetails {
        ConnectionDetails {
            user_id: "user1".to_string(),
            account: "202051".to_string(),
            blz: 12030000,
            iban: Some("DE02120300000000202051".to_string()),
            bic: Some("BYLADEM1001".to_string()),
            ..Default::default()
        }
    }

    fn wire(seg: Segment) -> String {
        String::from_utf8(seg.numbered(3).encode().unwrap()).unwrap()
    }

    #[test]
    fn test_hkidn_uses_primary_blz() {
        let mut c = conn();
        c.blz_headquarter = Some(70020270);
        assert_eq!(wire(hkidn(&c)), "HKIDN:3:2+280:70020270+user1+0+1'");
    }

    #[test]
    fn test_hkkaz_with_startpoint() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(
            wire(hkkaz(&conn(), from, None, Some("4711+A")).unwrap()),
            "HKKAZ:3:7+DE02120300000000202051:BYLADEM1001:202051::280:12030000+N+20240101+++4711?+A'"
        );
    }

    #[test]
    fn test_hkkaz_national_without_iban() {
        let mut c = conn();
        c.iban = None;
        assert_eq!(
            wire(hkkaz(&c, None, None, None).unwrap()),
            "HKKAZ:3:5+202051::280:12030000+N'"
        );
    }

    #[test]
    fn test_hkcaz_descriptor() {
        let seg = hkcaz(&conn(), CamtVersion::Camt052, None, None, None).unwrap();
        assert_eq!(
            seg.text_at(1, 0),
            Some("urn:iso:std:iso:20022:tech:xsd:camt.052.001.02")
        );
        assert_eq!(seg.groups.len(), 3);
    }

    #[test]
    fn test_hkdse_embeds_pain() {
        let pain = PainDocument::new(PAIN_008_002_02, "<Document/>");
        assert_eq!(
            wire(hkdse(&conn(), &pain).unwrap()),
            "HKDSE:3:1+DE02120300000000202051:BYLADEM1001+urn?:iso?:std?:iso?:20022?:tech?:xsd?:pain.008.002.02+@11@<Document/>'"
        );
    }

    #[test]
    fn test_hkdme_layout() {
        let pain = PainDocument::new(PAIN_008_002_02, "<D/>");
        let text = wire(hkdme(&conn(), &pain).unwrap());
        assert!(text.starts_with("HKDME:3:1+DE02120300000000202051:BYLADEM1001+++urn?:iso"));
        assert!(text.ends_with("+@4@<D/>'"));
    }

    #[test]
    fn test_hkcme_total_amount() {
        let pain = PainDocument::new(PAIN_001_002_03, "<D/>");
        let total = Decimal::from_str("1250.50").unwrap();
        let seg = hkcme(&conn(), &pain, total).unwrap();
        assert_eq!(seg.text_at(1, 0), Some("1250,5"));
        assert_eq!(seg.text_at(1, 1), Some("EUR"));
    }

    #[test]
    fn test_hkccm_shares_collective_layout() {
        let pain = PainDocument::new(PAIN_001_001_03, "<D/>");
        let total = Decimal::from_str("99.90").unwrap();
        let text = wire(hkccm(&conn(), &pain, total).unwrap());
        assert!(text.starts_with("HKCCM:3:1+DE02120300000000202051:BYLADEM1001+99,9:EUR++urn?:iso"));
        assert!(text.ends_with("pain.001.001.03+@4@<D/>'"));
    }

    #[test]
    fn test_hkcse_embeds_pain() {
        let pain = PainDocument::new(PAIN_001_001_03, "<D/>");
        let text = wire(hkcse(&conn(), &pain).unwrap());
        assert!(text.starts_with("HKCSE:3:1+DE02120300000000202051:BYLADEM1001+urn?:iso"));
        assert!(text.ends_with("+@4@<D/>'"));
    }

    #[test]
    fn test_hkcsb_startpoint() {
        assert_eq!(
            wire(hkcsb(&conn(), None).unwrap()),
            "HKCSB:3:1+DE02120300000000202051:BYLADEM1001'"
        );
        assert_eq!(
            wire(hkcsb(&conn(), Some("CS-2")).unwrap()),
            "HKCSB:3:1+DE02120300000000202051:BYLADEM1001+++CS-2'"
        );
    }

    #[test]
    fn test_scheduled_order_carries_order_id() {
        let pain = PainDocument::new(PAIN_001_001_03, "<D/>");
        let change = wire(hkcsa(&conn(), "ORD-77", &pain).unwrap());
        assert!(change.starts_with("HKCSA:3:1+DE02120300000000202051:BYLADEM1001+urn?:iso"));
        assert!(change.ends_with("+@4@<D/>+ORD-77'"));

        let delete = wire(hkcsl(&conn(), "ORD-77", &pain).unwrap());
        assert!(delete.starts_with("HKCSL:3:1+"));
        assert!(delete.ends_with("+@4@<D/>+ORD-77'"));

        let err = hkcsl(&conn(), "", &pain).unwrap_err();
        assert_eq!(err.code(), "MISSING_FIELD");
    }

    #[test]
    fn test_sepa_requires_bic() {
        let mut c = conn();
        c.bic = None;
        let pain = PainDocument::new(PAIN_001_001_03, "<D/>");
        assert!(hkccs(&c, &pain).is_err());
    }

    #[test]
    fn test_hktan_variants() {
        assert_eq!(wire(hktan_process4("HKKAZ", None)), "HKTAN:3:6+4+HKKAZ'");
        assert_eq!(
            wire(hktan_process4("HKIDN", Some("Handy"))),
            "HKTAN:3:6+4+HKIDN+++++++++Handy'"
        );
        assert_eq!(wire(hktan_process2("ref-1", None)), "HKTAN:3:6+2++++ref-1+N'");
        assert_eq!(
            wire(hktan_process2("ref-1", Some("Handy"))),
            "HKTAN:3:6+2++++ref-1+N+++++Handy'"
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::from(100)), "100,");
        assert_eq!(format_amount(Decimal::from_str("0.10").unwrap()), "0,1");
    }
}
