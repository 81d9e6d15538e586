//! TAN procedures, challenges and the TAN input seam
//!
//! The engine never collects input itself: every challenge goes through a
//! [`TanPrompt`], and matrix images are handed out as [`MatrixCode`].

pub mod matrix;

pub use matrix::{FileRenderer, MatrixCode, MatrixCodeRenderer};

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::response::extract::BankParameterData;

// ============================================================
// PROCEDURE
// ============================================================

/// Security function code of the one-step PIN procedure
pub const SINGLE_STEP_PROCEDURE: &str = "999";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TanProcedure {
    /// Security function code, e.g. `921` (pushTAN) or `902` (photoTAN)
    pub code: String,
    #[serde(default)]
    pub name: String,
    /// HHD_UC carries a matrix code image
    #[serde(default)]
    pub photo_tan: bool,
}

impl TanProcedure {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            photo_tan: false,
        }
    }

    pub fn single_step() -> Self {
        Self::new(SINGLE_STEP_PROCEDURE, "Einschritt-Verfahren")
    }

    pub fn photo_tan(code: impl Into<String>) -> Self {
        Self {
            photo_tan: true,
            ..Self::new(code, "photoTAN")
        }
    }

    pub fn is_single_step(&self) -> bool {
        self.code == SINGLE_STEP_PROCEDURE
    }
}

impl Default for TanProcedure {
    fn default() -> Self {
        Self::single_step()
    }
}

// ============================================================
// CHALLENGE
// ============================================================

/// Challenge issued by the bank (HITAN)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TanChallenge {
    /// Auftragsreferenz echoed back with the TAN
    pub task_reference: String,
    pub text: String,
    pub matrix_code: Option<MatrixCode>,
    /// Raw HHD_UC element (flicker code or matrix image)
    pub hhduc: Option<Vec<u8>>,
    pub medium: Option<String>,
}

// ============================================================
// DIALOG STATE
// ============================================================

/// TAN side of a dialog.
///
/// Created from the BPD at initialization, set when a challenge is issued and
/// cleared once a TAN has been accepted.
#[derive(Debug, Clone, Default)]
pub struct TanDialogState {
    pub procedure: TanProcedure,
    pub medium_name: Option<String>,
    pub bpd: BankParameterData,
    /// SCA demanded for the operation in flight
    pub sca_required: bool,
    pending: Option<TanChallenge>,
}

impl TanDialogState {
    pub fn new(procedure: TanProcedure, medium_name: Option<String>) -> Self {
        Self {
            procedure,
            medium_name,
            ..Default::default()
        }
    }

    pub fn pending(&self) -> Option<&TanChallenge> {
        self.pending.as_ref()
    }

    pub fn issue(&mut self, challenge: TanChallenge) {
        self.sca_required = true;
        self.pending = Some(challenge);
    }

    /// Drop the challenge after the bank accepted the TAN
    pub fn clear(&mut self) -> Option<TanChallenge> {
        self.sca_required = false;
        self.pending.take()
    }

    /// Should `segment` be accompanied by HKTAN?
    ///
    /// Follows HIPINS where the bank listed the segment, otherwise any
    /// two-step procedure is assumed to need it.
    pub fn needs_tan(&self, segment: &str) -> bool {
        if self.procedure.is_single_step() {
            return false;
        }
        self.bpd.is_tan_required(segment).unwrap_or(true)
    }
}

// ============================================================
// INPUT
// ============================================================

/// Collects a TAN for a challenge; `None` cancels the operation
#[async_trait]
pub trait TanPrompt: Send + Sync {
    async fn prompt(&self, challenge: &TanChallenge) -> Option<String>;
}

/// Hands out pre-recorded answers in order, then cancels
#[derive(Default)]
pub struct ScriptedTanPrompt {
    answers: Mutex<VecDeque<Option<String>>>,
    seen: Mutex<Vec<TanChallenge>>,
}

impl ScriptedTanPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(|a| Some(a.into())).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Queue a cancellation
    pub fn then_cancel(self) -> Self {
        if let Ok(mut answers) = self.answers.lock() {
            answers.push_back(None);
        }
        self
    }

    /// Challenges presented so far
    pub fn challenges(&self) -> Vec<TanChallenge> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TanPrompt for ScriptedTanPrompt {
    async fn prompt(&self, challenge: &TanChallenge) -> Option<String> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(challenge.clone());
        }
        self.answers.lock().ok()?.pop_front().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn challenge(reference: &str) -> TanChallenge {
        TanChallenge {
            task_reference: reference.to_string(),
            text: "Bitte TAN eingeben".to_string(),
            matrix_code: None,
            hhduc: None,
            medium: None,
        }
    }

    #[test]
    fn test_issue_and_clear() {
        let mut state = TanDialogState::new(TanProcedure::new("921", "pushTAN"), None);
        assert!(state.pending().is_none());

        state.issue(challenge("R1"));
        assert!(state.sca_required);
        assert_eq!(state.pending().map(|c| c.task_reference.as_str()), Some("R1"));

        let cleared = state.clear();
        assert_eq!(cleared.map(|c| c.task_reference), Some("R1".to_string()));
        assert!(!state.sca_required);
        assert!(state.pending().is_none());
    }

    #[test]
    fn test_needs_tan_follows_bpd() {
        let mut state = TanDialogState::new(TanProcedure::new("921", "pushTAN"), None);
        state.bpd.tan_required = HashMap::from([
            ("HKKAZ".to_string(), false),
            ("HKCCS".to_string(), true),
        ]);
        assert!(!state.needs_tan("HKKAZ"));
        assert!(state.needs_tan("HKCCS"));
        assert!(state.needs_tan("HKCAZ"));

        let single = TanDialogState::default();
        assert!(!single.needs_tan("HKCCS"));
    }

    #[tokio::test]
    async fn test_scripted_prompt() {
        let prompt = ScriptedTanPrompt::new(["111111", "222222"]).then_cancel();
        assert_eq!(prompt.prompt(&challenge("A")).await.as_deref(), Some("111111"));
        assert_eq!(prompt.prompt(&challenge("B")).await.as_deref(), Some("222222"));
        assert_eq!(prompt.prompt(&challenge("C")).await, None);
        assert_eq!(prompt.prompt(&challenge("D")).await, None);
        assert_eq!(prompt.challenges().len(), 4);
    }
}
