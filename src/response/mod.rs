//! Bank responses and dialog results
//!
//! - [`Response`]: one parsed bank message, encryption envelope removed
//! - [`ReturnCode`] / [`Severity`]: HIRMG/HIRMS entries and their classification
//! - [`DialogResult`]: outcome of one round trip, optionally carrying typed data
//! - [`extract`]: continuation markers, embedded documents, challenges, BPD

pub mod extract;

use serde::Serialize;
use std::fmt;

use crate::error::{FintsError, Result};
use crate::segment::codec::{decode_latin1, parse_segments};
use crate::segment::{DataElement, Segment};

// ============================================================
// RETURN CODES
// ============================================================

/// Well-known return codes
pub mod codes {
    pub const MESSAGE_RECEIVED: u16 = 10;
    pub const ORDER_EXECUTED: u16 = 20;
    pub const TAN_REQUIRED: u16 = 30;
    pub const DIALOG_ENDED: u16 = 100;
    pub const MORE_DATA: u16 = 3040;
    pub const PARTIAL_WARNINGS: u16 = 3060;
    pub const SCA_NOT_REQUIRED: u16 = 3076;
    pub const ALLOWED_TAN_PROCEDURES: u16 = 3920;
    pub const SCA_DECOUPLED: u16 = 3955;
    pub const MESSAGE_REJECTED: u16 = 9010;
    pub const PARTIAL_ERRORS: u16 = 9050;
    pub const PIN_INVALID: u16 = 9340;
    pub const DIALOG_ABORTED: u16 = 9800;
    pub const ACCESS_LOCKED: u16 = 9931;
    pub const TAN_INVALID: u16 = 9941;
    pub const PIN_WRONG: u16 = 9942;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// Return-code classification. Codes outside every range are errors.
const SEVERITY_TABLE: &[(u16, u16, Severity)] = &[
    (0, 999, Severity::Success),
    (3000, 3999, Severity::Warning),
    (9000, 9999, Severity::Error),
];

impl Severity {
    pub fn classify(code: u16) -> Self {
        SEVERITY_TABLE
            .iter()
            .find(|(lo, hi, _)| (*lo..=*hi).contains(&code))
            .map(|(_, _, severity)| *severity)
            .unwrap_or(Severity::Error)
    }
}

/// One `code:reference:text[:params]` entry of HIRMG or HIRMS
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnCode {
    pub code: u16,
    pub severity: Severity,
    /// Referenced data element (Bezugsdatenelement), if given
    pub element: Option<String>,
    pub text: String,
    pub params: Vec<String>,
    /// Request segment number this entry refers to (HIRMS only)
    pub segment_ref: Option<u16>,
}

impl ReturnCode {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::classify(code),
            element: None,
            text: text.into(),
            params: Vec::new(),
            segment_ref: None,
        }
    }

    fn from_group(group: &[DataElement], segment_ref: Option<u16>) -> Option<Self> {
        let text = |i: usize| group.get(i).and_then(DataElement::as_text);
        let code: u16 = text(0)?.trim().parse().ok()?;
        Some(Self {
            code,
            severity: Severity::classify(code),
            element: text(1).filter(|e| !e.is_empty()).map(str::to_string),
            text: text(2).unwrap_or_default().to_string(),
            params: group
                .iter()
                .skip(3)
                .filter_map(DataElement::as_text)
                .map(str::to_string)
                .collect(),
            segment_ref,
        })
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}: {}", self.code, self.text)
    }
}

// ============================================================
// RESPONSE
// ============================================================

/// Parsed bank message
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// Whole message decoded as Latin-1
    pub text: String,
    /// Segments in order, with HNVSD contents spliced in place
    pub segments: Vec<Segment>,
}

impl Response {
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let mut segments = Vec::new();
        for segment in parse_segments(raw)? {
            if segment.name() == "HNVSD" {
                if let Some(DataElement::Binary(inner)) = segment.element(0, 0) {
                    segments.extend(parse_segments(inner)?);
                }
            } else {
                segments.push(segment);
            }
        }

        Ok(Self {
            text: decode_latin1(raw),
            segments,
        })
    }

    pub fn segment(&self, name: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.name() == name)
    }

    pub fn segments_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Segment> {
        self.segments.iter().filter(move |s| s.name() == name)
    }

    /// All HIRMG and HIRMS entries in message order
    pub fn return_codes(&self) -> Vec<ReturnCode> {
        self.segments
            .iter()
            .filter(|s| matches!(s.name(), "HIRMG" | "HIRMS"))
            .flat_map(|s| {
                let segment_ref = if s.name() == "HIRMS" {
                    s.header.reference
                } else {
                    None
                };
                s.groups
                    .iter()
                    .filter_map(move |g| ReturnCode::from_group(g, segment_ref))
            })
            .collect()
    }

    /// Dialog id assigned by the bank (HNHBK)
    pub fn dialog_id(&self) -> Option<&str> {
        self.segment("HNHBK")?.value_at(2, 0)
    }
}

// ============================================================
// DIALOG RESULT
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Success,
    Warning,
    Error,
    /// No return codes at all
    Indeterminate,
}

/// Outcome of one round trip
#[derive(Debug, Clone)]
pub struct DialogResult<T = ()> {
    pub codes: Vec<ReturnCode>,
    pub response: Response,
    pub data: Option<T>,
}

impl DialogResult<()> {
    pub fn from_response(response: Response) -> Self {
        Self {
            codes: response.return_codes(),
            response,
            data: None,
        }
    }
}

impl<T> DialogResult<T> {
    pub fn outcome(&self) -> Outcome {
        if self.codes.is_empty() {
            return Outcome::Indeterminate;
        }
        match self.codes.iter().map(|c| c.severity).max() {
            Some(Severity::Error) => Outcome::Error,
            Some(Severity::Warning) => Outcome::Warning,
            _ => Outcome::Success,
        }
    }

    /// Warnings do not count against success
    pub fn is_success(&self) -> bool {
        matches!(self.outcome(), Outcome::Success | Outcome::Warning)
    }

    pub fn has_error(&self) -> bool {
        !self.is_success()
    }

    pub fn has_code(&self, code: u16) -> bool {
        self.codes.iter().any(|c| c.code == code)
    }

    pub fn code(&self, code: u16) -> Option<&ReturnCode> {
        self.codes.iter().find(|c| c.code == code)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ReturnCode> {
        self.codes.iter().filter(|c| c.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ReturnCode> {
        self.codes.iter().filter(|c| c.severity == Severity::Warning)
    }

    /// Raw response text
    pub fn raw(&self) -> &str {
        &self.response.text
    }

    /// Re-project onto another payload type, keeping outcome and codes
    pub fn typed<U>(self) -> DialogResult<U> {
        DialogResult {
            codes: self.codes,
            response: self.response,
            data: None,
        }
    }

    pub fn with_data<U>(self, data: U) -> DialogResult<U> {
        DialogResult {
            codes: self.codes,
            response: self.response,
            data: Some(data),
        }
    }

    /// `Err(BankReturn)` with the error-range codes when the outcome is a
    /// failure (an indeterminate result carries none)
    pub fn into_result(self) -> Result<Self> {
        if self.has_error() {
            let errors = self.errors().cloned().collect();
            return Err(FintsError::BankReturn(errors));
        }
        Ok(self)
    }
}
