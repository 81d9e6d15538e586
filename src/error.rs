//! FinTS Error Types
//!
//! One taxonomy for the whole engine:
//!
//! - **Connectivity**: no response from the bank, the round trip is lost
//! - **ProtocolFormat**: malformed segment, escaping or matrix-code layout,
//!   carries the offending raw fragment
//! - **BankReturn**: error-range return codes, recoverable by the caller
//! - **CancelledByUser**: the TAN prompt was declined

use thiserror::Error;

use crate::dialog::DialogState;
use crate::response::ReturnCode;

/// Longest raw fragment kept inside a [`FintsError::ProtocolFormat`]
const MAX_FRAGMENT_LEN: usize = 64;

#[derive(Error, Debug)]
pub enum FintsError {
    // === Round-trip failures ===
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Protocol format error: {reason} (near `{fragment}`)")]
    ProtocolFormat { reason: String, fragment: String },

    // === Bank / user outcomes ===
    #[error("Bank returned error codes: {}", format_codes(.0))]
    BankReturn(Vec<ReturnCode>),

    #[error("TAN entry cancelled by user")]
    CancelledByUser,

    // === Local errors ===
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid dialog state: expected {expected}, was {actual}")]
    InvalidState {
        expected: &'static str,
        actual: DialogState,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FintsError {
    /// Build a format error, truncating the fragment for log output
    pub fn format(reason: impl Into<String>, fragment: impl AsRef<[u8]>) -> Self {
        let bytes = fragment.as_ref();
        let end = bytes.len().min(MAX_FRAGMENT_LEN);
        FintsError::ProtocolFormat {
            reason: reason.into(),
            fragment: String::from_utf8_lossy(&bytes[..end]).into_owned(),
        }
    }

    /// Stable identifier for logs and CLI exit reporting
    pub fn code(&self) -> &'static str {
        match self {
            FintsError::Connectivity(_) => "CONNECTIVITY",
            FintsError::ProtocolFormat { .. } => "PROTOCOL_FORMAT",
            FintsError::BankReturn(_) => "BANK_RETURN",
            FintsError::CancelledByUser => "CANCELLED_BY_USER",
            FintsError::MissingField(_) => "MISSING_FIELD",
            FintsError::InvalidState { .. } => "INVALID_STATE",
            FintsError::Config(_) => "CONFIG",
            FintsError::Io(_) => "IO",
        }
    }

    /// Fatal errors end the current round trip; the rest leave the dialog resumable
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            FintsError::BankReturn(_) | FintsError::CancelledByUser
        )
    }
}

fn format_codes(codes: &[ReturnCode]) -> String {
    codes
        .iter()
        .map(|c| format!("{:04} {}", c.code, c.text))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, FintsError>;
