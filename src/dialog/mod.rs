//! Dialog State Machine
//!
//! Sequences one FinTS dialog: optional system-id synchronisation,
//! initialization, SCA, the (paginated) business exchange and HKEND.
//! Every business operation goes through [`Dialog::run`].
//!
//! Error policy:
//! - transport failures abort the round trip and disconnect the dialog
//! - codec errors propagate unchanged
//! - bank errors come back as a failed [`DialogResult`]; a rejected TAN can
//!   be resubmitted through [`Dialog::submit_tan`]
//! - [`Dialog::run`] ends the dialog (HKEND) after any failure except a
//!   cancelled TAN prompt, so the next operation can initialize again

pub mod operation;
pub mod state;

pub use operation::{FnStep, OperationStep};
pub use state::DialogState;

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::connection::ConnectionDetails;
use crate::error::{FintsError, Result};
use crate::message::MessageAssembler;
use crate::response::extract::{self, BankParameterData};
use crate::response::{DialogResult, Response, Severity, codes};
use crate::security::SecurityProvider;
use crate::segment::{Segment, builders};
use crate::tan::{SINGLE_STEP_PROCEDURE, TanChallenge, TanDialogState, TanPrompt};
use crate::transport::Transport;

/// Dialog id before the bank assigned one
pub const INITIAL_DIALOG_ID: &str = "0";

/// TAN attempts per challenge before the failed result is returned
pub const MAX_TAN_ATTEMPTS: usize = 3;

/// Upper bound on pages of one paginated retrieval
pub const MAX_PAGES: usize = 1000;

pub struct Dialog {
    conn: ConnectionDetails,
    transport: Arc<dyn Transport>,
    security: Arc<dyn SecurityProvider>,
    product_id: String,
    dialog_id: String,
    message_number: u32,
    state: DialogState,
    tan: TanDialogState,
    /// Result of the most recent round trip
    last_result: Option<DialogResult>,
}

impl Dialog {
    pub fn new(
        conn: ConnectionDetails,
        transport: Arc<dyn Transport>,
        security: Arc<dyn SecurityProvider>,
        tan: TanDialogState,
        product_id: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            transport,
            security,
            product_id: product_id.into(),
            dialog_id: INITIAL_DIALOG_ID.to_string(),
            message_number: 1,
            state: DialogState::Disconnected,
            tan,
            last_result: None,
        }
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn connection(&self) -> &ConnectionDetails {
        &self.conn
    }

    pub fn dialog_id(&self) -> &str {
        &self.dialog_id
    }

    pub fn tan_state(&self) -> &TanDialogState {
        &self.tan
    }

    /// Medium used for HKTAN from now on
    pub fn set_tan_medium(&mut self, medium: Option<String>) {
        self.tan.medium_name = medium;
    }

    pub fn bpd(&self) -> &BankParameterData {
        &self.tan.bpd
    }

    pub fn last_result(&self) -> Option<&DialogResult> {
        self.last_result.as_ref()
    }

    /// Challenge waiting for a TAN, if any
    pub fn pending_challenge(&self) -> Option<&TanChallenge> {
        self.tan.pending()
    }

    fn transition(&mut self, to: DialogState) {
        if self.state != to {
            debug!(dialog_id = %self.dialog_id, from = %self.state, to = %to, "Dialog state change");
            self.state = to;
        }
    }

    fn reset(&mut self, to: DialogState) {
        self.dialog_id = INITIAL_DIALOG_ID.to_string();
        self.message_number = 1;
        self.transition(to);
    }

    /// Security function sent in HNSHK
    fn security_function(&self) -> &str {
        if self.conn.version.supports_two_step_tan() {
            &self.tan.procedure.code
        } else {
            SINGLE_STEP_PROCEDURE
        }
    }

    fn two_step(&self) -> bool {
        self.conn.version.supports_two_step_tan() && !self.tan.procedure.is_single_step()
    }

    // ============================================================
    // ROUND TRIP
    // ============================================================

    async fn exchange(&mut self, body: Vec<Segment>, tan: Option<&str>) -> Result<DialogResult> {
        let message = MessageAssembler::new(&self.conn, self.security.as_ref()).assemble(
            &self.dialog_id,
            self.message_number,
            self.security_function(),
            body,
            tan,
        )?;

        info!(
            dialog_id = %self.dialog_id,
            msg_no = message.message_number,
            segments = ?message.body,
            bytes = message.len(),
            transport = self.transport.name(),
            "Sending message"
        );

        let raw = match self.transport.send(&message.bytes).await {
            Ok(raw) => raw,
            Err(e) => {
                // last_result keeps the previous round trip for the caller
                warn!(dialog_id = %self.dialog_id, error = %e, "Round trip failed, dialog dropped");
                self.reset(DialogState::Disconnected);
                return Err(e);
            }
        };

        let response = Response::parse(&raw)?;
        self.security.verify(&response)?;

        if let Some(id) = response.dialog_id()
            && id != self.dialog_id
        {
            debug!(old = %self.dialog_id, new = %id, "Dialog id assigned");
            self.dialog_id = id.to_string();
        }
        self.message_number += 1;
        self.tan.bpd.merge(&response);

        let result = DialogResult::from_response(response);
        for code in &result.codes {
            match code.severity {
                Severity::Error => warn!(
                    dialog_id = %self.dialog_id,
                    code = code.code,
                    segment = ?code.segment_ref,
                    text = %code.text,
                    "Bank error"
                ),
                Severity::Warning => info!(
                    dialog_id = %self.dialog_id,
                    code = code.code,
                    text = %code.text,
                    "Bank warning"
                ),
                Severity::Success => debug!(code = code.code, text = %code.text, "Bank message"),
            }
        }

        self.last_result = Some(result.clone());
        Ok(result)
    }

    // ============================================================
    // INITIALIZATION
    // ============================================================

    fn init_body(&self, with_sync: bool) -> Vec<Segment> {
        let mut body = vec![builders::hkidn(&self.conn), builders::hkvvb(&self.product_id)];
        if self.two_step() {
            body.push(builders::hktan_process4(
                "HKIDN",
                self.tan.medium_name.as_deref(),
            ));
        }
        if with_sync {
            body.push(builders::hksyn());
        }
        body
    }

    /// Obtain a customer-system id when none is known yet.
    ///
    /// Runs a dedicated dialog and closes it again; the connection is
    /// updated once.
    pub async fn synchronize(&mut self) -> Result<Option<DialogResult>> {
        if self.conn.customer_system_id.is_some() || !self.conn.version.supports_two_step_tan() {
            return Ok(None);
        }
        if self.state.is_open() {
            return Err(FintsError::InvalidState {
                expected: "closed dialog",
                actual: self.state,
            });
        }

        info!(user = %self.conn.user_id_escaped(), "Synchronising customer system id");
        self.transition(DialogState::Initializing);
        let result = self.exchange(self.init_body(true), None).await?;

        match extract::system_id(&result.response) {
            Some(id) if !result.has_error() => {
                info!(system_id = %id, "Customer system id assigned");
                self.conn.customer_system_id = Some(id);
            }
            _ => {
                warn!("Synchronisation did not return a system id");
                self.reset(DialogState::Disconnected);
                return Ok(Some(result));
            }
        }

        let end = self.exchange(vec![builders::hkend(&self.dialog_id)], None).await?;
        if end.has_error() {
            warn!(dialog_id = %self.dialog_id, "Synchronisation dialog end rejected");
        }
        self.reset(DialogState::Disconnected);
        Ok(Some(result))
    }

    /// Open the dialog (HKIDN/HKVVB, HKTAN for two-step procedures).
    ///
    /// A dialog still open from an earlier operation is ended first.
    ///
    /// Ends in `AwaitingSca` if the bank issued a challenge, in
    /// `OperationPending` if it did not, and back in `Disconnected` when
    /// the bank refused.
    pub async fn initialize(&mut self) -> Result<DialogResult> {
        if self.state.is_open() {
            info!(dialog_id = %self.dialog_id, state = %self.state, "Closing open dialog first");
            self.abandon("HKIDN").await;
        }
        self.reset(DialogState::Disconnected);

        if let Some(sync) = self.synchronize().await?
            && sync.has_error()
        {
            return Ok(sync);
        }

        self.transition(DialogState::Initializing);
        let result = self.exchange(self.init_body(false), None).await?;

        if result.has_error() {
            self.reset(DialogState::Disconnected);
            return Ok(result);
        }

        let allowed = &self.tan.bpd.allowed_tan_procedures;
        if self.two_step() && !allowed.is_empty() && !allowed.contains(&self.tan.procedure.code) {
            warn!(
                procedure = %self.tan.procedure.code,
                allowed = ?allowed,
                "Configured TAN procedure not offered by the bank"
            );
        }

        self.after_challenge_point(&result, DialogState::AwaitingSca)?;
        info!(dialog_id = %self.dialog_id, state = %self.state, "Dialog initialized");
        Ok(result)
    }

    /// Record a challenge from `result`, or move on to `OperationPending`
    fn after_challenge_point(&mut self, result: &DialogResult, awaiting: DialogState) -> Result<()> {
        let challenge = if result.has_code(codes::SCA_NOT_REQUIRED) {
            None
        } else {
            extract::tan_challenge(&result.response, self.tan.procedure.photo_tan)?
        };

        match challenge {
            Some(challenge) => {
                info!(
                    dialog_id = %self.dialog_id,
                    reference = %challenge.task_reference,
                    matrix = challenge.matrix_code.is_some(),
                    "TAN challenge issued"
                );
                self.tan.issue(challenge);
                self.transition(awaiting);
            }
            None => {
                self.tan.sca_required = false;
                self.transition(DialogState::OperationPending);
            }
        }
        Ok(())
    }

    // ============================================================
    // SCA
    // ============================================================

    /// Send a TAN for the pending challenge (HKTAN process 2).
    ///
    /// A bank error leaves state and challenge untouched so another TAN
    /// can be submitted.
    pub async fn submit_tan(&mut self, tan: &str) -> Result<DialogResult> {
        self.submit_tan_with_medium(tan, None).await
    }

    /// Like [`submit_tan`](Self::submit_tan), naming the TAN medium
    /// explicitly instead of taking it from the challenge or configuration
    pub async fn submit_tan_with_medium(
        &mut self,
        tan: &str,
        medium: Option<&str>,
    ) -> Result<DialogResult> {
        if !self.state.awaits_tan() {
            return Err(FintsError::InvalidState {
                expected: "AWAITING_SCA or AWAITING_TAN",
                actual: self.state,
            });
        }
        let Some(challenge) = self.tan.pending().cloned() else {
            return Err(FintsError::InvalidState {
                expected: "pending TAN challenge",
                actual: self.state,
            });
        };

        let medium = medium
            .or(challenge.medium.as_deref())
            .or(self.tan.medium_name.as_deref());
        let body = vec![builders::hktan_process2(&challenge.task_reference, medium)];
        let result = self.exchange(body, Some(tan)).await?;

        if result.has_error() {
            warn!(
                dialog_id = %self.dialog_id,
                reference = %challenge.task_reference,
                invalid_tan = result.has_code(codes::TAN_INVALID),
                "TAN rejected"
            );
            return Ok(result);
        }

        self.tan.clear();
        self.transition(DialogState::OperationPending);
        info!(dialog_id = %self.dialog_id, "TAN accepted");
        Ok(result)
    }

    /// Prompt for TANs until the pending challenge is resolved.
    ///
    /// Re-prompts after an invalid TAN (9941) up to [`MAX_TAN_ATTEMPTS`];
    /// any other bank error is returned as is.
    pub async fn process_sca(&mut self, prompt: &dyn TanPrompt) -> Result<DialogResult> {
        let mut attempt = 0;
        loop {
            let Some(challenge) = self.tan.pending().cloned() else {
                return Err(FintsError::InvalidState {
                    expected: "pending TAN challenge",
                    actual: self.state,
                });
            };

            attempt += 1;
            info!(dialog_id = %self.dialog_id, attempt, state = %self.state, "Prompting for TAN");
            let Some(tan) = prompt.prompt(&challenge).await else {
                info!(dialog_id = %self.dialog_id, "TAN prompt cancelled");
                return Err(FintsError::CancelledByUser);
            };

            let result = self.submit_tan(tan.trim()).await?;
            let retry = result.has_error()
                && result.has_code(codes::TAN_INVALID)
                && attempt < MAX_TAN_ATTEMPTS;
            if !retry {
                return Ok(result);
            }
        }
    }

    // ============================================================
    // END
    // ============================================================

    /// Close the dialog with HKEND; a closed dialog is left alone
    pub async fn end(&mut self) -> Result<Option<DialogResult>> {
        if !self.state.is_open() {
            return Ok(None);
        }
        let result = self
            .exchange(vec![builders::hkend(&self.dialog_id)], None)
            .await?;
        if result.has_error() {
            warn!(dialog_id = %self.dialog_id, "Dialog end rejected");
        }
        info!(dialog_id = %self.dialog_id, "Dialog ended");
        self.reset(DialogState::Completed);
        Ok(Some(result))
    }

    // ============================================================
    // ORCHESTRATION
    // ============================================================

    /// Run one business operation end to end.
    ///
    /// initialize → SCA → request (+HKTAN) → SCA → next page … → HKEND.
    /// Stops at the first error-severity result and returns it, carrying the
    /// pages collected so far. Any failure after initialization ends the
    /// dialog so the next operation starts clean; a cancelled TAN prompt
    /// leaves it open for [`end`](Self::end).
    pub async fn run<Op: OperationStep>(
        &mut self,
        op: &Op,
        prompt: &dyn TanPrompt,
    ) -> Result<DialogResult<Op::Output>> {
        let init = self.initialize().await?;
        if init.has_error() {
            return Ok(init.typed());
        }

        let mut output = Op::Output::default();
        let (last, pages) = match self.exchange_pages(op, prompt, &mut output).await {
            Ok(done) => done,
            Err(FintsError::CancelledByUser) => return Err(FintsError::CancelledByUser),
            Err(e) => {
                self.abandon(op.code()).await;
                return Err(e);
            }
        };

        if last.has_error() {
            self.abandon(op.code()).await;
            return Ok(if pages > 0 {
                last.with_data(output)
            } else {
                last.typed()
            });
        }

        info!(dialog_id = %self.dialog_id, segment = op.code(), pages, "Operation completed");
        self.end().await?;
        Ok(last.with_data(output))
    }

    /// SCA after init, then every page of `op`; returns the last result and
    /// the number of pages collected
    async fn exchange_pages<Op: OperationStep>(
        &mut self,
        op: &Op,
        prompt: &dyn TanPrompt,
        output: &mut Op::Output,
    ) -> Result<(DialogResult, usize)> {
        if self.state == DialogState::AwaitingSca {
            let sca = self.process_sca(prompt).await?;
            if sca.has_error() {
                return Ok((sca, 0));
            }
        }

        let mut startpoint: Option<String> = None;
        let mut page = 0usize;

        loop {
            let mut body = vec![op.build(&self.conn, startpoint.as_deref())?];
            if self.two_step() && self.tan.needs_tan(op.code()) {
                body.push(builders::hktan_process4(
                    op.code(),
                    self.tan.medium_name.as_deref(),
                ));
            }

            self.transition(DialogState::OperationPending);
            let mut result = self.exchange(body, None).await?;
            if result.has_error() {
                return Ok((result, page));
            }

            let awaiting = if page == 0 {
                DialogState::AwaitingSca
            } else {
                DialogState::AwaitingTan
            };
            self.after_challenge_point(&result, awaiting)?;
            if self.state.awaits_tan() {
                result = self.process_sca(prompt).await?;
                if result.has_error() {
                    return Ok((result, page));
                }
            }

            op.collect(&result.response, output)?;
            page += 1;

            startpoint = if op.paginated() {
                extract::continuation_marker(&result.response)
            } else {
                None
            };
            debug!(
                dialog_id = %self.dialog_id,
                segment = op.code(),
                page,
                more = startpoint.is_some(),
                "Page received"
            );
            if startpoint.is_none() {
                if op.paginated() && extract::has_continuation(&result.response) {
                    warn!(
                        dialog_id = %self.dialog_id,
                        segment = op.code(),
                        page,
                        "More data announced without a startpoint, retrieval truncated"
                    );
                }
                return Ok((result, page));
            }
            if page >= MAX_PAGES {
                warn!(segment = op.code(), page, "Page limit reached, stopping retrieval");
                return Ok((result, page));
            }
        }
    }

    /// Best-effort HKEND after a failed operation.
    ///
    /// `last_result` keeps the failure rather than the HKEND answer.
    async fn abandon(&mut self, segment: &str) {
        if !self.state.is_open() {
            return;
        }
        let failed = self.last_result.take();
        match self.end().await {
            Ok(_) => debug!(dialog_id = %self.dialog_id, segment, "Dialog closed after failure"),
            Err(e) => {
                warn!(segment, error = %e, "Could not end dialog after failure");
                self.reset(DialogState::Disconnected);
            }
        }
        if failed.is_some() {
            self.last_result = failed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::FinTsVersion;
    use crate::security::PinTanSecurity;
    use crate::tan::{ScriptedTanPrompt, TanProcedure};
    use crate::transport::ScriptedTransport;

    fn conn() -> ConnectionDetails {
        ConnectionDetails {
            user_id: "user1".to_string(),
            pin: "12345".to_string(),
            account: "202051".to_string(),
            blz: 12030000,
            customer_system_id: Some("SYS-1".to_string()),
            ..Default::default()
        }
    }

    fn reply(dialog_id: &str, body: &str) -> Vec<u8> {
        format!("HNHBK:1:3+000000000000+300+{dialog_id}+1'{body}HNHBS:9:1+1'").into_bytes()
    }

    fn dialog(transport: Arc<ScriptedTransport>, procedure: TanProcedure) -> Dialog {
        Dialog::new(
            conn(),
            transport,
            Arc::new(PinTanSecurity),
            TanDialogState::new(procedure, None),
            "TESTPRODUCT",
        )
    }

    fn tab_step() -> impl OperationStep<Output = Vec<String>> {
        FnStep::new(
            "HKTAB",
            |_: &ConnectionDetails, _: Option<&str>| Ok(builders::hktab()),
            |resp: &Response, out: &mut Vec<String>| {
                out.extend(extract::tan_media(resp));
                Ok(())
            },
        )
    }

    #[tokio::test]
    async fn test_initialize_without_sca() {
        let transport = Arc::new(
            ScriptedTransport::new().respond(reply("D1", "HIRMG:2:2+0010::ok'HIRMS:3:2:4+3076::Keine SCA'")),
        );
        let mut d = dialog(transport.clone(), TanProcedure::new("921", "pushTAN"));

        let result = d.initialize().await.unwrap();
        assert!(result.is_success());
        assert_eq!(d.state(), DialogState::OperationPending);
        assert_eq!(d.dialog_id(), "D1");

        let sent = String::from_utf8_lossy(&transport.requests()[0]).to_string();
        assert!(sent.contains("HKTAN:5:6+4+HKIDN'"));
    }

    #[tokio::test]
    async fn test_initialize_bank_error_disconnects() {
        let transport = Arc::new(ScriptedTransport::new().respond(reply("D1", "HIRMG:2:2+9942::PIN falsch'")));
        let mut d = dialog(transport, TanProcedure::single_step());

        let result = d.initialize().await.unwrap();
        assert!(result.has_error());
        assert_eq!(d.state(), DialogState::Disconnected);
        assert_eq!(d.dialog_id(), INITIAL_DIALOG_ID);
    }

    #[tokio::test]
    async fn test_connectivity_error_disconnects() {
        let transport = Arc::new(ScriptedTransport::new().fail("connection refused"));
        let mut d = dialog(transport, TanProcedure::single_step());

        let err = d.initialize().await.unwrap_err();
        assert_eq!(err.code(), "CONNECTIVITY");
        assert_eq!(d.state(), DialogState::Disconnected);
        assert!(d.last_result().is_none());
    }

    #[tokio::test]
    async fn test_submit_tan_requires_challenge() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut d = dialog(transport, TanProcedure::single_step());
        let err = d.submit_tan("123456").await.unwrap_err();
        assert_eq!(err.code(), "INVALID_STATE");
    }

    #[tokio::test]
    async fn test_init_sca_cancelled() {
        let transport = Arc::new(ScriptedTransport::new().respond(reply(
            "D2",
            "HIRMG:2:2+0010::ok'HIRMS:3:2:5+0030::TAN erforderlich'HITAN:4:6:5+4++REF-1+Bitte bestaetigen'",
        )));
        let mut d = dialog(transport, TanProcedure::new("921", "pushTAN"));
        let prompt = ScriptedTanPrompt::new(Vec::<String>::new()).then_cancel();

        let err = d.run(&tab_step(), &prompt).await.unwrap_err();
        assert_eq!(err.code(), "CANCELLED_BY_USER");
        assert_eq!(d.state(), DialogState::AwaitingSca);
        assert_eq!(d.pending_challenge().map(|c| c.task_reference.as_str()), Some("REF-1"));
    }

    #[tokio::test]
    async fn test_initialize_ends_open_dialog_first() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(reply("D5", "HIRMG:2:2+0010::ok'HIRMS:3:2:4+3076::Keine SCA'"))
                .respond(reply("D5", "HIRMG:2:2+0100::Dialog beendet'"))
                .respond(reply("D6", "HIRMG:2:2+0010::ok'HIRMS:3:2:4+3076::Keine SCA'")),
        );
        let mut d = dialog(transport.clone(), TanProcedure::new("921", "pushTAN"));

        d.initialize().await.unwrap();
        assert_eq!(d.state(), DialogState::OperationPending);

        let again = d.initialize().await.unwrap();
        assert!(again.is_success());
        assert_eq!(d.dialog_id(), "D6");
        assert_eq!(d.state(), DialogState::OperationPending);

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert!(String::from_utf8_lossy(&requests[1]).contains("HKEND:3:1+D5'"));
        assert!(String::from_utf8_lossy(&requests[2]).contains("HKIDN"));
    }

    #[tokio::test]
    async fn test_v220_never_sends_hktan() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(reply("D3", "HIRMG:2:2+0010::ok'"))
                .respond(reply("D3", "HIRMG:2:2+0010::ok'HITAB:4:4:3+0+A:1:::::::::::Handy'"))
                .respond(reply("D3", "HIRMG:2:2+0100::Dialog beendet'")),
        );
        let mut c = conn();
        c.version = FinTsVersion::V220;
        let mut d = Dialog::new(
            c,
            transport.clone(),
            Arc::new(PinTanSecurity),
            TanDialogState::new(TanProcedure::new("921", "pushTAN"), None),
            "TESTPRODUCT",
        );

        let result = d.run(&tab_step(), &ScriptedTanPrompt::default()).await.unwrap();
        assert_eq!(result.data, Some(vec!["Handy".to_string()]));
        assert_eq!(d.state(), DialogState::Completed);

        for request in transport.requests() {
            let text = String::from_utf8_lossy(&request).to_string();
            assert!(!text.contains("HKTAN"));
            assert!(text.contains("PIN:1"));
            assert!(text.contains("+999+"));
        }
    }

    #[tokio::test]
    async fn test_synchronize_assigns_system_id_once() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(reply("S1", "HIRMG:2:2+0010::ok'HISYN:3:4:6+NEW-SYS'"))
                .respond(reply("S1", "HIRMG:2:2+0100::Dialog beendet'"))
                .respond(reply("D4", "HIRMG:2:2+0010::ok'HIRMS:3:2:5+3076::Keine SCA'")),
        );
        let mut c = conn();
        c.customer_system_id = None;
        let mut d = Dialog::new(
            c,
            transport.clone(),
            Arc::new(PinTanSecurity),
            TanDialogState::new(TanProcedure::new("921", "pushTAN"), None),
            "TESTPRODUCT",
        );

        d.initialize().await.unwrap();
        assert_eq!(d.connection().customer_system_id.as_deref(), Some("NEW-SYS"));
        assert_eq!(d.dialog_id(), "D4");

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert!(String::from_utf8_lossy(&requests[0]).contains("HKSYN"));
        assert!(String::from_utf8_lossy(&requests[1]).contains("HKEND:3:1+S1'"));
        assert!(String::from_utf8_lossy(&requests[2]).contains("HKIDN:3:2+280:12030000+user1+NEW-SYS+1'"));
    }
}
