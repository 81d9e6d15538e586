//! Transport: request bytes in, response bytes out
//!
//! FinTS over HTTPS POSTs the base64-encoded message and receives a base64
//! body. [`ScriptedTransport`] replays canned responses for tests and dry runs.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

use crate::connection::{ConnectionDetails, SecurityProtocol};
use crate::error::{FintsError, Result};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logging
    fn name(&self) -> &'static str;

    /// One round trip. Failing to get any response is a connectivity error.
    async fn send(&self, message: &[u8]) -> Result<Vec<u8>>;
}

// ============================================================
// HTTPS
// ============================================================

pub struct HttpsTransport {
    url: String,
    client: reqwest::Client,
}

impl HttpsTransport {
    pub fn new(conn: &ConnectionDetails, timeout: Duration) -> Result<Self> {
        let min_tls = match conn.security_protocol {
            SecurityProtocol::Tls12 => reqwest::tls::Version::TLS_1_2,
            SecurityProtocol::Tls13 => reqwest::tls::Version::TLS_1_3,
        };
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .min_tls_version(min_tls)
            .build()
            .map_err(|e| FintsError::Connectivity(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            url: conn.url.clone(),
            client,
        })
    }
}

/// Base64 body, tolerating line breaks some banks insert
pub fn decode_body(body: &[u8]) -> Result<Vec<u8>> {
    let compact: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(&compact)
        .map_err(|e| FintsError::format(format!("response is not base64: {e}"), body))
}

#[async_trait]
impl Transport for HttpsTransport {
    fn name(&self) -> &'static str {
        "https"
    }

    async fn send(&self, message: &[u8]) -> Result<Vec<u8>> {
        debug!(url = %self.url, bytes = message.len(), "POST FinTS message");

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(STANDARD.encode(message))
            .send()
            .await
            .map_err(|e| FintsError::Connectivity(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, %status, "Bank endpoint rejected request");
            return Err(FintsError::Connectivity(format!("HTTP status {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FintsError::Connectivity(e.to_string()))?;
        decode_body(&body)
    }
}

// ============================================================
// SCRIPTED
// ============================================================

/// Replays queued responses in order and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Vec<u8>>>>,
    requests: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: impl Into<Vec<u8>>) -> Self {
        self.push(Ok(response.into()));
        self
    }

    pub fn fail(self, reason: impl Into<String>) -> Self {
        self.push(Err(FintsError::Connectivity(reason.into())));
        self
    }

    pub fn push(&self, response: Result<Vec<u8>>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
    }

    /// Requests sent so far
    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn send(&self, message: &[u8]) -> Result<Vec<u8>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(message.to_vec());
        }
        self.responses
            .lock()
            .map_err(|_| FintsError::Connectivity("scripted transport poisoned".to_string()))?
            .pop_front()
            .unwrap_or_else(|| Err(FintsError::Connectivity("no scripted response left".to_string())))
    }
}
