//! HTTP transport
//!
//! The runner talks to the server through the [`Transport`] trait so that
//! runs can be exercised against scripted responses. [`HttpTransport`] is the
//! reqwest-backed implementation used by the CLI.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::common::{Error, Result};

use super::response::StepResult;

/// A single outgoing request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Absolute URL or a path relative to the base URL
    pub path: String,
    pub body: Option<Value>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body,
        }
    }
}

/// One request/response exchange
///
/// Implementations return `Err` only when no response was obtained.
/// Non-2xx responses are returned as `Ok` and classified by the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn exchange(&self, request: &Request) -> Result<StepResult>;
}

/// Join a request path onto the base URL
///
/// Absolute `http://` and `https://` paths pass through untouched.
pub fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pixcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_error(&self, url: &str, e: reqwest::Error) -> Error {
        if e.is_builder() {
            // The request never left: bad URL or body, not a network failure
            Error::Config(format!("Invalid request to '{}': {}", url, root_cause(&e)))
        } else if e.is_timeout() {
            Error::RequestTimeout {
                url: url.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else {
            Error::ServerUnreachable {
                url: url.to_string(),
                reason: root_cause(&e),
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn exchange(&self, request: &Request) -> Result<StepResult> {
        let url = resolve_url(&self.base_url, &request.path);
        tracing::debug!(method = %request.method, %url, "Sending request");

        let mut builder = self.client.request(request.method.clone(), &url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.map_error(&url, e))?;
        let status = response.status().as_u16();
        let raw = response.text().await.map_err(|e| self.map_error(&url, e))?;

        tracing::debug!(status, bytes = raw.len(), "Received response");
        Ok(StepResult::new(status, &raw))
    }
}

/// Innermost error message, which names the actual socket failure
fn root_cause(e: &(dyn std::error::Error + 'static)) -> String {
    let mut current = e;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
