//! Statement payloads and the decoder seam
//!
//! The engine hands out raw MT940/MT942 text and camt XML. Turning those into
//! bookings is the job of a [`StatementDecoder`]; [`SwiftBlocks`] only splits
//! SWIFT text into per-statement blocks.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::response::extract::SwiftPayload;

/// MT940 (booked) and MT942 (pending) text of a whole retrieval
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SwiftStatements {
    pub booked: String,
    pub pending: String,
}

impl SwiftStatements {
    /// Append one page, keeping page order
    pub fn append(&mut self, page: SwiftPayload) {
        self.booked.push_str(&page.booked);
        self.pending.push_str(&page.pending);
    }

    pub fn is_empty(&self) -> bool {
        self.booked.is_empty() && self.pending.is_empty()
    }
}

/// camt.052/053 documents of a whole retrieval, UTF-8
pub type CamtDocuments = Vec<String>;

/// Statement-format decoder (SWIFT or ISO 20022)
pub trait StatementDecoder: Send + Sync {
    type Record;

    /// `encoding` names the character set of `raw`, e.g. `ISO-8859-1`
    fn decode(&self, raw: &str, encoding: &str) -> Result<Vec<Self::Record>>;
}

/// Booked and pending records of one retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedStatements<R> {
    pub booked: Vec<R>,
    pub pending: Vec<R>,
}

impl SwiftStatements {
    pub fn decode<D: StatementDecoder>(&self, decoder: &D) -> Result<DecodedStatements<D::Record>> {
        Ok(DecodedStatements {
            booked: decoder.decode(&self.booked, SWIFT_ENCODING)?,
            pending: decoder.decode(&self.pending, SWIFT_ENCODING)?,
        })
    }
}

/// Character set of SWIFT payloads after wire decoding
pub const SWIFT_ENCODING: &str = "ISO-8859-1";

// ============================================================
// SWIFT BLOCKS
// ============================================================

static TAG_20: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^:20:(?P<reference>[^\r\n]*)").expect("static regex"));
static TAG_25: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^:25:(?P<account>[^\r\n]*)").expect("static regex"));

/// One statement block, starting at its `:20:` tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementBlock {
    pub reference: String,
    pub account: Option<String>,
    pub text: String,
}

/// Splits SWIFT text into statement blocks
#[derive(Debug, Default, Clone, Copy)]
pub struct SwiftBlocks;

impl StatementDecoder for SwiftBlocks {
    type Record = StatementBlock;

    fn decode(&self, raw: &str, _encoding: &str) -> Result<Vec<StatementBlock>> {
        let starts: Vec<usize> = TAG_20.find_iter(raw).map(|m| m.start()).collect();
        let blocks = starts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = starts.get(i + 1).copied().unwrap_or(raw.len());
                let text = raw[start..end].trim_end_matches(['\r', '\n', '-']).to_string();
                let reference = TAG_20
                    .captures(&text)
                    .and_then(|c| c.name("reference"))
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();
                let account = TAG_25
                    .captures(&text)
                    .and_then(|c| c.name("account"))
                    .map(|m| m.as_str().trim().to_string());
                StatementBlock {
                    reference,
                    account,
                    text,
                }
            })
            .collect();
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MT940: &str = "\r\n:20:STARTUMSE\r\n:25:12030000/202051\r\n:28C:00000/001\r\n:60F:C240101EUR100,00\r\n:61:2401020102DR12,50NMSCNONREF\r\n:86:Einkauf\r\n:62F:C240102EUR87,50\r\n-\r\n:20:STARTUMSE2\r\n:25:12030000/202051\r\n:62F:C240103EUR87,50\r\n-";

    #[test]
    fn test_swift_blocks() {
        let blocks = SwiftBlocks.decode(MT940, SWIFT_ENCODING).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].reference, "STARTUMSE");
        assert_eq!(blocks[0].account.as_deref(), Some("12030000/202051"));
        assert!(blocks[0].text.ends_with(":62F:C240102EUR87,50"));
        assert_eq!(blocks[1].reference, "STARTUMSE2");
    }

    #[test]
    fn test_empty_input() {
        assert!(SwiftBlocks.decode("", SWIFT_ENCODING).unwrap().is_empty());
    }

    #[test]
    fn test_append_and_decode() {
        let mut statements = SwiftStatements::default();
        assert!(statements.is_empty());
        statements.append(SwiftPayload {
            booked: ":20:A\r\n".to_string(),
            pending: String::new(),
        });
        statements.append(SwiftPayload {
            booked: ":20:B\r\n".to_string(),
            pending: ":20:P\r\n".to_string(),
        });

        let decoded = statements.decode(&SwiftBlocks).unwrap();
        let refs: Vec<_> = decoded.booked.iter().map(|b| b.reference.as_str()).collect();
        assert_eq!(refs, vec!["A", "B"]);
        assert_eq!(decoded.pending.len(), 1);
    }
}
