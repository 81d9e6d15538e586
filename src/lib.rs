//! fints_dialog - FinTS/HBCI client protocol engine
//!
//! Talks the German home-banking protocol over PIN/TAN: builds and parses
//! delimiter-escaped segments, frames them into messages, and drives the
//! dialog through initialization, strong customer authentication and
//! paginated statement retrieval.
//!
//! # Modules
//!
//! - [`segment`] - Segment model, wire codec and segment builders
//! - [`message`] - Message framing and length patching
//! - [`security`] - PIN/TAN envelope (HNVSK, HNSHK, HNSHA)
//! - [`transport`] - HTTPS and scripted transports
//! - [`response`] - Response parsing, return codes, payload extraction
//! - [`tan`] - TAN procedures, challenges, matrix codes, TAN prompt
//! - [`dialog`] - Dialog state machine and operation orchestrator
//! - [`statement`] - Statement payloads and decoder seam
//! - [`client`] - Business operations
//! - [`config`] / [`logging`] - Application configuration and tracing setup

// Wire level
pub mod connection;
pub mod error;
pub mod message;
pub mod security;
pub mod segment;
pub mod transport;

// Protocol logic
pub mod dialog;
pub mod response;
pub mod statement;
pub mod tan;

// Application
pub mod client;
pub mod config;
pub mod logging;

// Convenient re-exports at crate root
pub use client::FinTsClient;
pub use connection::{ConnectionDetails, FinTsVersion, SecurityProtocol};
pub use dialog::{Dialog, DialogState, FnStep, OperationStep};
pub use error::{FintsError, Result};
pub use response::{DialogResult, Outcome, Response, ReturnCode, Severity};
pub use segment::builders::{CamtVersion, PainDocument};
pub use segment::{DataElement, Segment};
pub use statement::{StatementDecoder, SwiftStatements};
pub use tan::{MatrixCode, TanChallenge, TanDialogState, TanProcedure, TanPrompt};
pub use transport::{HttpsTransport, ScriptedTransport, Transport};
