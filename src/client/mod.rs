//! FinTS client: business operations on top of the dialog orchestrator
//!
//! - [`transactions`] - MT940/MT942 and camt statement retrieval
//! - [`sepa`] - credit transfers, direct debits and scheduled transfers
//! - [`tan`] - TAN media and manual TAN submission

pub mod sepa;
pub mod tan;
pub mod transactions;

use std::sync::Arc;
use std::time::Duration;

use crate::connection::ConnectionDetails;
use crate::dialog::{Dialog, DialogState, OperationStep};
use crate::error::Result;
use crate::response::DialogResult;
use crate::security::{PinTanSecurity, SecurityProvider};
use crate::tan::{TanDialogState, TanPrompt};
use crate::transport::{HttpsTransport, Transport};

pub struct FinTsClient {
    dialog: Dialog,
    prompt: Arc<dyn TanPrompt>,
}

impl FinTsClient {
    pub fn new(
        conn: ConnectionDetails,
        transport: Arc<dyn Transport>,
        tan: TanDialogState,
        prompt: Arc<dyn TanPrompt>,
        product_id: impl Into<String>,
    ) -> Self {
        Self::with_security(conn, transport, Arc::new(PinTanSecurity), tan, prompt, product_id)
    }

    pub fn with_security(
        conn: ConnectionDetails,
        transport: Arc<dyn Transport>,
        security: Arc<dyn SecurityProvider>,
        tan: TanDialogState,
        prompt: Arc<dyn TanPrompt>,
        product_id: impl Into<String>,
    ) -> Self {
        Self {
            dialog: Dialog::new(conn, transport, security, tan, product_id),
            prompt,
        }
    }

    /// Client talking HTTPS to `conn.url`
    pub fn connect(
        conn: ConnectionDetails,
        timeout: Duration,
        tan: TanDialogState,
        prompt: Arc<dyn TanPrompt>,
        product_id: impl Into<String>,
    ) -> Result<Self> {
        let transport = Arc::new(HttpsTransport::new(&conn, timeout)?);
        Ok(Self::new(conn, transport, tan, prompt, product_id))
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    /// Connection details including the system id the bank assigned
    pub fn connection(&self) -> &ConnectionDetails {
        self.dialog.connection()
    }

    pub fn state(&self) -> DialogState {
        self.dialog.state()
    }

    pub fn last_result(&self) -> Option<&DialogResult> {
        self.dialog.last_result()
    }

    /// Run any operation step through the orchestrator
    pub async fn execute<Op: OperationStep>(&mut self, op: &Op) -> Result<DialogResult<Op::Output>> {
        self.dialog.run(op, self.prompt.as_ref()).await
    }

    /// Close an open dialog, e.g. after an abandoned TAN prompt
    pub async fn close(&mut self) -> Result<Option<DialogResult>> {
        self.dialog.end().await
    }
}
