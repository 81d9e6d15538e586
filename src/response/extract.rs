//! Payload extraction from bank responses
//!
//! Absent or malformed markers yield empty results; whether that is fatal is
//! up to the business operation.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::{Response, codes};
use crate::error::Result;
use crate::segment::DataElement;
use crate::segment::codec::{decode_latin1, latin1_to_utf8};
use crate::tan::{MatrixCode, TanChallenge};

/// Substring announcing another page of statement data
pub const CONTINUATION_TAG: &str = "+3040::";

const XML_DECLARATION_START: &str = "<?xml";
const DOCUMENT_START: &str = "<Document";
const DOCUMENT_END: &str = "</Document>";
const SYNTHETIC_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

static STARTPOINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+3040::[^:']*:((?:[^'?+:]|\?.)+)").expect("static regex"));

// ============================================================
// CONTINUATION
// ============================================================

/// Does the response announce another page?
pub fn has_continuation(response: &Response) -> bool {
    response.text.contains(CONTINUATION_TAG)
        || response
            .return_codes()
            .iter()
            .any(|c| c.code == codes::MORE_DATA)
}

/// Startpoint for the next page; `None` (or empty) ends the retrieval loop
pub fn continuation_marker(response: &Response) -> Option<String> {
    let from_codes = response
        .return_codes()
        .into_iter()
        .find(|c| c.code == codes::MORE_DATA)
        .and_then(|c| c.params.into_iter().find(|p| !p.is_empty()));

    from_codes
        .or_else(|| {
            STARTPOINT_RE
                .captures(&response.text)
                .map(|caps| crate::segment::codec::unescape(&caps[1]))
        })
        .filter(|s| !s.is_empty())
}

// ============================================================
// EMBEDDED XML DOCUMENTS
// ============================================================

/// Locate every `<Document>` in Latin-1 decoded text.
///
/// Documents may be concatenated; each search starts where the previous
/// document ended. Missing declarations get a synthetic UTF-8 one and the
/// result is re-encoded to UTF-8.
pub fn xml_documents(text: &str) -> Vec<String> {
    let mut documents = Vec::new();
    let mut rest = text;

    loop {
        let Some(doc_start) = rest.find(DOCUMENT_START) else {
            break;
        };
        // a declaration only belongs to this document when it precedes it
        let start = match rest[..doc_start].rfind(XML_DECLARATION_START) {
            Some(decl) => decl,
            None => doc_start,
        };
        let Some(end_rel) = rest[doc_start..].find(DOCUMENT_END) else {
            break;
        };
        let end = doc_start + end_rel + DOCUMENT_END.len();

        let mut doc = latin1_to_utf8(&rest[start..end]);
        if !doc.starts_with(XML_DECLARATION_START) {
            doc.insert_str(0, SYNTHETIC_DECLARATION);
        }
        documents.push(doc);

        rest = &rest[end..];
    }

    documents
}

/// camt documents of all HICAZ segments (booked and pending)
pub fn camt_documents(response: &Response) -> Vec<String> {
    let payloads: Vec<&[u8]> = response
        .segments_named("HICAZ")
        .flat_map(|s| s.groups.iter().skip(2).flatten())
        .filter_map(|e| match e {
            DataElement::Binary(b) => Some(b.as_slice()),
            DataElement::Text(_) => None,
        })
        .collect();

    if payloads.is_empty() {
        return xml_documents(&response.text);
    }
    payloads
        .into_iter()
        .flat_map(|p| xml_documents(&decode_latin1(p)))
        .collect()
}

// ============================================================
// MT940 / MT942
// ============================================================

/// Booked (MT940) and pending (MT942) statement text of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwiftPayload {
    pub booked: String,
    pub pending: String,
}

pub fn swift_payload(response: &Response) -> SwiftPayload {
    let mut payload = SwiftPayload::default();
    for hikaz in response.segments_named("HIKAZ") {
        if let Some(DataElement::Binary(b)) = hikaz.element(0, 0) {
            payload.booked.push_str(&decode_latin1(b));
        }
        if let Some(DataElement::Binary(b)) = hikaz.element(1, 0) {
            payload.pending.push_str(&decode_latin1(b));
        }
    }
    payload
}

// ============================================================
// SCHEDULED TRANSFERS
// ============================================================

/// Scheduled SEPA credit transfer held by the bank (HICSB)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminatedTransfer {
    pub order_id: String,
    /// pain document as sent, UTF-8
    pub pain: String,
    pub deletable: Option<bool>,
    pub modifiable: Option<bool>,
}

fn yes_no(value: Option<&str>) -> Option<bool> {
    match value? {
        v if v.eq_ignore_ascii_case("J") => Some(true),
        v if v.eq_ignore_ascii_case("N") => Some(false),
        _ => None,
    }
}

/// Every HICSB entry: pain, then order id and the optional J/N flags.
/// Entries without an order id are skipped.
pub fn terminated_transfers(response: &Response) -> Vec<TerminatedTransfer> {
    response
        .segments_named("HICSB")
        .filter_map(|hicsb| {
            let pain_group = hicsb
                .groups
                .iter()
                .position(|g| matches!(g.first(), Some(DataElement::Binary(_))))?;
            let Some(DataElement::Binary(xml)) = hicsb.element(pain_group, 0) else {
                return None;
            };
            let order_id = hicsb.value_at(pain_group + 1, 0)?;
            Some(TerminatedTransfer {
                order_id: order_id.to_string(),
                pain: String::from_utf8_lossy(xml).into_owned(),
                deletable: yes_no(hicsb.text_at(pain_group + 2, 0)),
                modifiable: yes_no(hicsb.text_at(pain_group + 3, 0)),
            })
        })
        .collect()
}

// ============================================================
// TAN
// ============================================================

/// Challenge from HITAN, if the bank issued one.
///
/// For photoTAN the HHD_UC element carries the matrix code.
pub fn tan_challenge(response: &Response, photo_tan: bool) -> Result<Option<TanChallenge>> {
    let Some(hitan) = response.segment("HITAN") else {
        return Ok(None);
    };
    let Some(task_reference) = hitan.value_at(2, 0) else {
        return Ok(None);
    };
    // "noref" marks an order that needs no TAN
    if task_reference == "noref" {
        return Ok(None);
    }

    let text = hitan.text_at(3, 0).unwrap_or_default().to_string();
    let hhduc = match hitan.element(4, 0) {
        Some(DataElement::Binary(b)) if !b.is_empty() => Some(b.clone()),
        _ => None,
    };
    let matrix_code = match (&hhduc, photo_tan) {
        (Some(bytes), true) => Some(MatrixCode::decode(bytes)?),
        _ => None,
    };

    Ok(Some(TanChallenge {
        task_reference: task_reference.to_string(),
        text,
        matrix_code,
        hhduc,
        medium: hitan.value_at(6, 0).map(str::to_string),
    }))
}

/// TAN medium names from HITAB
pub fn tan_media(response: &Response) -> Vec<String> {
    response
        .segments_named("HITAB")
        .flat_map(|s| s.groups.iter().skip(1))
        .filter_map(|group| {
            group
                .iter()
                .skip(2)
                .rev()
                .filter_map(DataElement::as_text)
                .find(|t| !t.is_empty())
                .map(str::to_string)
        })
        .collect()
}

// ============================================================
// BANK PARAMETER DATA
// ============================================================

/// The parts of the BPD the engine acts on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankParameterData {
    /// Segment id -> TAN required (HIPINS)
    pub tan_required: HashMap<String, bool>,
    /// Procedures allowed for this user (return code 3920)
    pub allowed_tan_procedures: Vec<String>,
}

impl BankParameterData {
    /// `None` when the bank did not list the segment
    pub fn is_tan_required(&self, segment: &str) -> Option<bool> {
        self.tan_required.get(segment).copied()
    }

    /// Fold in whatever parameters this response carries
    pub fn merge(&mut self, response: &Response) {
        if let Some(hipins) = response.segment("HIPINS") {
            // PIN/TAN info: minPIN:maxPIN:maxTAN:userText:customerText:[seg:J|N]*
            if let Some(group) = hipins.groups.get(3) {
                let pairs: Vec<&str> = group
                    .iter()
                    .skip(5)
                    .filter_map(DataElement::as_text)
                    .collect();
                for pair in pairs.chunks_exact(2) {
                    let (segment, flag) = (pair[0], pair[1]);
                    if !segment.is_empty() {
                        self.tan_required
                            .insert(segment.to_string(), flag.eq_ignore_ascii_case("J"));
                    }
                }
            }
        }

        if let Some(allowed) = response
            .return_codes()
            .into_iter()
            .find(|c| c.code == codes::ALLOWED_TAN_PROCEDURES)
        {
            self.allowed_tan_procedures = allowed.params;
        }
    }
}

/// Customer-system id assigned in a synchronisation dialog (HISYN)
pub fn system_id(response: &Response) -> Option<String> {
    response
        .segment("HISYN")?
        .value_at(0, 0)
        .map(str::to_string)
}
