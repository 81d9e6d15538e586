//! Canned bank responses for the scripted transport
#![allow(dead_code)]

use std::sync::Arc;

use fints_dialog::client::FinTsClient;
use fints_dialog::connection::ConnectionDetails;
use fints_dialog::tan::{ScriptedTanPrompt, TanDialogState, TanProcedure};
use fints_dialog::transport::ScriptedTransport;

pub const PRODUCT_ID: &str = "TESTPRODUCT";

pub fn connection() -> ConnectionDetails {
    ConnectionDetails {
        url: "https://banking.example.com/fints".to_string(),
        user_id: "user1".to_string(),
        pin: "12345".to_string(),
        account_holder: "Max Mustermann".to_string(),
        account: "202051".to_string(),
        blz: 12030000,
        iban: Some("DE02120300000000202051".to_string()),
        bic: Some("BYLADEM1001".to_string()),
        customer_system_id: Some("SYS-1".to_string()),
        ..Default::default()
    }
}

/// Full bank message: header, envelope with `inner` as signed data, trailer
pub fn bank_message(dialog_id: &str, inner: &[u8]) -> Vec<u8> {
    let mut rest = b"HNVSK:998:3+PIN:2+998+1+2::SYS-1+1:20240101:120000+2:2:13:@8@00000000:5:1+280:12030000:user1:V:0:0+0'".to_vec();
    rest.extend_from_slice(format!("HNVSD:999:1+@{}@", inner.len()).as_bytes());
    rest.extend_from_slice(inner);
    rest.extend_from_slice(b"'HNHBS:9:1+1'");

    let header_len = format!("HNHBK:1:3+000000000000+300+{dialog_id}+1'").len();
    let mut message =
        format!("HNHBK:1:3+{:012}+300+{dialog_id}+1'", header_len + rest.len()).into_bytes();
    message.extend(rest);
    message
}

pub fn reply(dialog_id: &str, inner: &str) -> Vec<u8> {
    bank_message(dialog_id, inner.as_bytes())
}

/// Init response that needs no SCA, carrying PIN/TAN parameters
pub fn init_ok(dialog_id: &str, tan_flags: &str) -> Vec<u8> {
    reply(
        dialog_id,
        &format!(
            "HIRMG:3:2+0010::Nachricht entgegengenommen.'\
HIRMS:4:2:5+3076::Starke Kundenauthentifizierung nicht notwendig.+3920::Zugelassene TAN-Verfahren:921'\
HIPINS:5:1:4+1+1+0+5:20:6:Benutzer ID::{tan_flags}'"
        ),
    )
}

pub fn end_ok(dialog_id: &str) -> Vec<u8> {
    reply(dialog_id, "HIRMG:3:2+0100::Dialog beendet.'")
}

/// Segment with a binary element built from `payload`
pub fn binary_segment(header: &str, payload: &[u8], tail: &str) -> Vec<u8> {
    let mut seg = header.as_bytes().to_vec();
    seg.extend_from_slice(format!("@{}@", payload.len()).as_bytes());
    seg.extend_from_slice(payload);
    seg.extend_from_slice(tail.as_bytes());
    seg
}

pub fn client(
    transport: Arc<ScriptedTransport>,
    procedure: TanProcedure,
    prompt: Arc<ScriptedTanPrompt>,
) -> FinTsClient {
    FinTsClient::new(
        connection(),
        transport,
        TanDialogState::new(procedure, None),
        prompt,
        PRODUCT_ID,
    )
}

pub fn push_tan() -> TanProcedure {
    TanProcedure::new("921", "pushTAN")
}

pub fn request_text(transport: &ScriptedTransport, index: usize) -> String {
    String::from_utf8_lossy(&transport.requests()[index]).into_owned()
}
