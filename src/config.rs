use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::connection::{ConnectionDetails, FinTsVersion, SecurityProtocol};
use crate::error::{FintsError, Result};
use crate::tan::{TanDialogState, TanProcedure};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    /// FinTS product registration id sent in HKVVB
    pub product_id: String,
    pub bank: BankConfig,
    #[serde(default)]
    pub tan: TanConfig,
    #[serde(default)]
    pub transport: TransportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BankConfig {
    pub url: String,
    #[serde(default)]
    pub version: FinTsVersion,
    pub user_id: String,
    /// Environment variable holding the PIN; the PIN itself never sits in a file
    pub pin_env: String,
    #[serde(default)]
    pub account_holder: String,
    pub account: String,
    #[serde(default)]
    pub sub_account: Option<String>,
    pub blz: u32,
    #[serde(default)]
    pub blz_headquarter: Option<u32>,
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub bic: Option<String>,
    /// System id from an earlier synchronisation
    #[serde(default)]
    pub customer_system_id: Option<String>,
    #[serde(default)]
    pub security_protocol: SecurityProtocol,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TanConfig {
    #[serde(default)]
    pub procedure: TanProcedure,
    #[serde(default)]
    pub medium: Option<String>,
    /// Where photoTAN images are written (extension added per mime type)
    #[serde(default = "default_matrix_path")]
    pub matrix_code_path: String,
}

fn default_matrix_path() -> String {
    "./logs/phototan".to_string()
}

impl Default for TanConfig {
    fn default() -> Self {
        Self {
            procedure: TanProcedure::default(),
            medium: None,
            matrix_code_path: default_matrix_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    pub timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`
    pub fn load(env: &str) -> Result<Self> {
        Self::from_file(&format!("config/{}.yaml", env))
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| FintsError::Config(format!("Failed to read config file {path}: {e}")))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| FintsError::Config(e.to_string()))
    }
}

impl BankConfig {
    /// Connection details with the PIN read from `pin_env`
    pub fn connection_details(&self) -> Result<ConnectionDetails> {
        let pin = std::env::var(&self.pin_env)
            .map_err(|_| FintsError::Config(format!("PIN variable {} not set", self.pin_env)))?;
        Ok(self.connection_details_with_pin(pin))
    }

    pub fn connection_details_with_pin(&self, pin: impl Into<String>) -> ConnectionDetails {
        ConnectionDetails {
            url: self.url.clone(),
            version: self.version,
            user_id: self.user_id.clone(),
            pin: pin.into(),
            account_holder: self.account_holder.clone(),
            account: self.account.clone(),
            sub_account: self.sub_account.clone(),
            blz: self.blz,
            blz_headquarter: self.blz_headquarter,
            iban: self.iban.clone(),
            bic: self.bic.clone(),
            customer_system_id: self.customer_system_id.clone(),
            security_protocol: self.security_protocol,
        }
    }
}

impl TanConfig {
    pub fn dialog_state(&self) -> TanDialogState {
        TanDialogState::new(self.procedure.clone(), self.medium.clone())
    }
}
