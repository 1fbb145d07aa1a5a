//! Error types for the checkout harness
//!
//! Messages are meant to be read in a terminal transcript, so each variant
//! carries enough context to act on. Remediation hints are selected from the
//! variant itself, never by inspecting message text.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the checkout harness
#[derive(Error, Debug)]
pub enum Error {
    // === Connection Errors ===
    #[error("Could not reach {url}: {reason}")]
    ServerUnreachable { url: String, reason: String },

    #[error("Request to {url} timed out after {secs} seconds")]
    RequestTimeout { url: String, secs: u64 },

    // === HTTP Errors ===
    #[error("{message}")]
    HttpStatus { status: u16, message: String },

    // === Dependency Errors ===
    #[error("Step '{step}' did not provide field '{field}'")]
    MissingField { step: String, field: String },

    #[error("Invalid path template '{template}': {reason}")]
    PathTemplate { template: String, reason: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid scenario file: {0}")]
    Scenario(String),

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a missing field error
    pub fn missing_field(step: &str, field: &str) -> Self {
        Self::MissingField {
            step: step.to_string(),
            field: field.to_string(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: message.into(),
        }
    }

    /// Whether the server could not be reached at all
    ///
    /// Timeouts count as connection failures: no usable response arrived.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Error::ServerUnreachable { .. } | Error::RequestTimeout { .. }
        )
    }

    /// HTTP status code, when the server answered outside 2xx
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short classification label used in reports and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ServerUnreachable { .. } => "connection",
            Error::RequestTimeout { .. } => "timeout",
            Error::HttpStatus { .. } => "http_status",
            Error::MissingField { .. } | Error::PathTemplate { .. } => "dependency",
            Error::Config(_) | Error::ConfigParse(_) | Error::Scenario(_) => "config",
            Error::FileRead { .. } => "io",
            Error::Json(_) => "json",
        }
    }
}
