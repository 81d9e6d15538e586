//! Connection details for one bank account
//!
//! `ConnectionDetails` is owned per session. The customer-system id is the
//! only field the dialog mutates (once, during synchronisation); callers
//! running concurrent sessions for one account clone it per session.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FintsError, Result};
use crate::segment::codec::escape;

/// Country code used in every bank identifier (Germany)
pub const COUNTRY_CODE: &str = "280";

/// Protocol version spoken with the bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
#[repr(u16)]
pub enum FinTsVersion {
    /// HBCI 2.2
    V220 = 220,
    /// FinTS 3.0
    #[default]
    V300 = 300,
}

impl FinTsVersion {
    #[inline]
    pub fn id(&self) -> u16 {
        *self as u16
    }

    /// Security profile version used in HNVSK/HNSHK (`PIN:<n>`)
    pub fn security_profile(&self) -> u8 {
        match self {
            FinTsVersion::V220 => 1,
            FinTsVersion::V300 => 2,
        }
    }

    /// Two-step TAN procedures (HKTAN) exist from FinTS 3.0 on
    pub fn supports_two_step_tan(&self) -> bool {
        matches!(self, FinTsVersion::V300)
    }
}

impl From<FinTsVersion> for u16 {
    fn from(v: FinTsVersion) -> Self {
        v.id()
    }
}

impl TryFrom<u16> for FinTsVersion {
    type Error = String;

    fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        match value {
            220 => Ok(FinTsVersion::V220),
            300 => Ok(FinTsVersion::V300),
            other => Err(format!(
                "invalid FinTS version {other}, allowed values are 220, 300"
            )),
        }
    }
}

impl fmt::Display for FinTsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Minimum TLS version the transport accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SecurityProtocol {
    #[default]
    #[serde(rename = "tls1.2")]
    Tls12,
    #[serde(rename = "tls1.3")]
    Tls13,
}

#[derive(Clone, Default)]
pub struct ConnectionDetails {
    /// HBCI/FinTS endpoint URL
    pub url: String,
    pub version: FinTsVersion,
    /// Logon id
    pub user_id: String,
    pub pin: String,
    pub account_holder: String,
    pub account: String,
    pub sub_account: Option<String>,
    /// Routing code (BLZ) of the account
    pub blz: u32,
    /// Routing code of the headquarter, used in message headers when present
    pub blz_headquarter: Option<u32>,
    pub iban: Option<String>,
    pub bic: Option<String>,
    /// Customer-system id (Kundensystem-ID), assigned by the bank
    pub customer_system_id: Option<String>,
    pub security_protocol: SecurityProtocol,
}

impl ConnectionDetails {
    /// Routing code for message headers (HNVSK, HNSHK, HKIDN)
    #[inline]
    pub fn blz_primary(&self) -> u32 {
        self.blz_headquarter.unwrap_or(self.blz)
    }

    /// User id with reserved characters escaped
    pub fn user_id_escaped(&self) -> String {
        escape(&self.user_id)
    }

    /// System id as sent on the wire; `0` until the bank assigned one
    pub fn system_id_or_zero(&self) -> &str {
        self.customer_system_id.as_deref().unwrap_or("0")
    }

    /// IBAN and BIC, required by every SEPA operation
    pub fn sepa_account(&self) -> Result<(&str, &str)> {
        let iban = self
            .iban
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(FintsError::MissingField("iban"))?;
        let bic = self
            .bic
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(FintsError::MissingField("bic"))?;
        Ok((iban, bic))
    }
}

impl fmt::Debug for ConnectionDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDetails")
            .field("url", &self.url)
            .field("version", &self.version)
            .field("user_id", &self.user_id)
            .field("pin", &"***")
            .field("account", &self.account)
            .field("blz", &self.blz)
            .field("blz_headquarter", &self.blz_headquarter)
            .field("iban", &self.iban)
            .field("bic", &self.bic)
            .field("customer_system_id", &self.customer_system_id)
            .finish_non_exhaustive()
    }
}
