//! Dialog FSM States
//!
//! ```text
//! Disconnected ─▶ Initializing ─┬─▶ OperationPending ─┬─▶ Completed
//!                     │         │          ▲          │
//!                     ▼         │          │          ▼
//!                AwaitingSca ───┘          └─── AwaitingTan
//! ```
//!
//! A connectivity failure returns to `Disconnected` from anywhere.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum DialogState {
    /// No dialog open (initial, after HKEND or a transport failure)
    #[default]
    Disconnected,

    /// Init message sent, waiting for the bank's identification response
    Initializing,

    /// Bank demands strong customer authentication for the init or the
    /// first operation request
    AwaitingSca,

    /// Business operation in flight
    OperationPending,

    /// A later page or order confirmation needs a TAN
    AwaitingTan,

    /// Terminal: operation finished and the dialog was closed
    Completed,
}

impl DialogState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, DialogState::Completed)
    }

    /// Waiting for a TAN from the user
    #[inline]
    pub fn awaits_tan(&self) -> bool {
        matches!(self, DialogState::AwaitingSca | DialogState::AwaitingTan)
    }

    /// A dialog id has been assigned and messages can be sent
    #[inline]
    pub fn is_open(&self) -> bool {
        !matches!(
            self,
            DialogState::Disconnected | DialogState::Initializing | DialogState::Completed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DialogState::Disconnected => "DISCONNECTED",
            DialogState::Initializing => "INITIALIZING",
            DialogState::AwaitingSca => "AWAITING_SCA",
            DialogState::OperationPending => "OPERATION_PENDING",
            DialogState::AwaitingTan => "AWAITING_TAN",
            DialogState::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_state() {
        assert!(DialogState::Completed.is_terminal());
        assert!(!DialogState::Disconnected.is_terminal());
        assert!(!DialogState::AwaitingTan.is_terminal());
    }

    #[test]
    fn test_awaits_tan() {
        assert!(DialogState::AwaitingSca.awaits_tan());
        assert!(DialogState::AwaitingTan.awaits_tan());
        assert!(!DialogState::OperationPending.awaits_tan());
    }

    #[test]
    fn test_is_open() {
        assert!(DialogState::OperationPending.is_open());
        assert!(DialogState::AwaitingSca.is_open());
        assert!(!DialogState::Initializing.is_open());
        assert!(!DialogState::Completed.is_open());
    }

    #[test]
    fn test_display() {
        assert_eq!(DialogState::AwaitingSca.to_string(), "AWAITING_SCA");
        assert_eq!(format!("{}", DialogState::default()), "DISCONNECTED");
    }
}
