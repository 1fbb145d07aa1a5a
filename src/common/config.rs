//! Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Target server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Wait/poll behaviour between processing and the status check
    #[serde(default)]
    pub settlement: SettlementConfig,

    /// Order submitted by the checkout flow
    #[serde(default)]
    pub order: OrderFixture,
}

/// Target server settings
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Base URL that relative step paths are joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_timeout() -> u64 {
    10
}

/// Settlement wait before polling the payment status
///
/// The defaults describe one fixed wait followed by one poll. Raising
/// `poll_attempts` re-polls while the payment is still pending, multiplying
/// the wait by `backoff` each time.
#[derive(Debug, Deserialize, Clone)]
pub struct SettlementConfig {
    #[serde(default = "default_delay")]
    pub delay_ms: u64,

    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,

    #[serde(default = "default_backoff")]
    pub backoff: f64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay(),
            poll_attempts: default_poll_attempts(),
            backoff: default_backoff(),
        }
    }
}

fn default_delay() -> u64 {
    2000
}
fn default_poll_attempts() -> u32 {
    1
}
fn default_backoff() -> f64 {
    2.0
}

impl SettlementConfig {
    /// Wait before the given poll attempt (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff.max(1.0).powi(attempt as i32);
        Duration::from_millis((self.delay_ms as f64 * factor).round() as u64)
    }
}

/// Order payload for `POST /pedidos`
///
/// Field names follow the backend's JSON contract.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OrderFixture {
    #[serde(default = "default_descricao")]
    pub descricao: String,

    #[serde(
        rename = "enderecoOrigem",
        alias = "endereco_origem",
        default = "default_origem"
    )]
    pub endereco_origem: String,

    #[serde(
        rename = "enderecoDestino",
        alias = "endereco_destino",
        default = "default_destino"
    )]
    pub endereco_destino: String,

    #[serde(default = "default_valor")]
    pub valor: f64,
}

impl Default for OrderFixture {
    fn default() -> Self {
        Self {
            descricao: default_descricao(),
            endereco_origem: default_origem(),
            endereco_destino: default_destino(),
            valor: default_valor(),
        }
    }
}

fn default_descricao() -> String {
    "Entrega de teste - pagamento PIX".to_string()
}
fn default_origem() -> String {
    "Rua das Flores, 123 - São Paulo, SP".to_string()
}
fn default_destino() -> String {
    "Avenida Paulista, 1000 - São Paulo, SP".to_string()
}
fn default_valor() -> f64 {
    150.0
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde defaults cannot guard
    pub fn validate(&self) -> Result<()> {
        if self.settlement.poll_attempts == 0 {
            return Err(super::Error::Config(
                "settlement.poll_attempts must be at least 1".to_string(),
            ));
        }
        if self.server.timeout_secs == 0 {
            return Err(super::Error::Config(
                "server.timeout_secs must be at least 1".to_string(),
            ));
        }
        validate_base_url(&self.server.base_url)?;
        Ok(())
    }

    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }
}

/// Base URL must be an absolute http(s) URL with a host
fn validate_base_url(base_url: &str) -> Result<()> {
    let url = reqwest::Url::parse(base_url).map_err(|e| {
        super::Error::Config(format!("server.base_url '{}' is not a valid URL: {}", base_url, e))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(super::Error::Config(format!(
            "server.base_url must start with http:// or https://, got '{}'",
            base_url
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(super::Error::Config(format!(
            "server.base_url '{}' has no host",
            base_url
        )));
    }
    Ok(())
}
