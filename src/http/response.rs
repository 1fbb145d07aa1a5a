//! Response decoding and classification
//!
//! Bodies are decoded leniently: anything that is not JSON is kept as text.
//! Classification looks only at the status code.

use serde_json::{json, Value};

use crate::common::{truncate, Error, Result};

/// Longest slice of a raw body quoted in an error message
pub const MAX_ERROR_BODY_CHARS: usize = 200;

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    /// Decode a raw response body
    ///
    /// An empty body becomes `{}`. Anything else that is not JSON, whitespace
    /// included, is preserved verbatim as text.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Body::Json(json!({}));
        }
        match serde_json::from_str(raw) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(raw.to_string()),
        }
    }

    /// Look up a top-level field of a JSON object body
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Body::Json(Value::Object(map)) => map.get(name),
            _ => None,
        }
    }

    /// Look up a top-level field and render it as text
    ///
    /// Strings are returned without quotes, other scalars via their JSON form.
    pub fn field_text(&self, name: &str) -> Option<String> {
        match self.field(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Body as text, or `None` when there is nothing worth showing
    pub fn raw_text(&self) -> Option<String> {
        match self {
            Body::Text(text) if text.trim().is_empty() => None,
            Body::Text(text) => Some(text.clone()),
            Body::Json(Value::Object(map)) if map.is_empty() => None,
            Body::Json(value) => Some(value.to_string()),
        }
    }
}

/// Outcome of one request/response exchange
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub status: u16,
    pub body: Body,
}

impl StepResult {
    pub fn new(status: u16, raw: &str) -> Self {
        Self {
            status,
            body: Body::parse(raw),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx result into an `HttpStatus` error
    pub fn into_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::http_status(self.status, self.error_message()))
        }
    }

    /// Human-readable failure description
    ///
    /// Priority: `message` field, `error` field, raw body (bounded), `HTTP <code>`.
    pub fn error_message(&self) -> String {
        ["message", "error"]
            .iter()
            .find_map(|name| {
                self.body
                    .field_text(name)
                    .filter(|text| !text.trim().is_empty())
            })
            .or_else(|| {
                self.body
                    .raw_text()
                    .map(|text| truncate(&text, MAX_ERROR_BODY_CHARS))
            })
            .unwrap_or_else(|| format!("HTTP {}", self.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body_decoded() {
        let body = Body::parse(r#"{"id": 42, "valor": "150.00"}"#);
        assert_eq!(body, Body::Json(json!({"id": 42, "valor": "150.00"})));
    }

    #[test]
    fn test_non_json_body_kept_verbatim() {
        assert_eq!(
            Body::parse("Hello World!"),
            Body::Text("Hello World!".to_string())
        );
        assert_eq!(
            Body::parse("{not json"),
            Body::Text("{not json".to_string())
        );
    }

    #[test]
    fn test_empty_body_is_empty_object() {
        assert_eq!(Body::parse(""), Body::Json(json!({})));
    }

    #[test]
    fn test_whitespace_body_kept_as_text() {
        assert_eq!(Body::parse("  \n"), Body::Text("  \n".to_string()));
        assert_eq!(StepResult::new(503, "  \n").error_message(), "HTTP 503");
    }

    #[test]
    fn test_2xx_is_success_regardless_of_body() {
        for status in [200, 201, 204, 299] {
            assert!(StepResult::new(status, "").is_success());
            assert!(StepResult::new(status, "garbage <html>").is_success());
            assert!(StepResult::new(status, r#"{"error": "x"}"#).is_success());
        }
        for status in [100, 199, 300, 404, 500] {
            assert!(!StepResult::new(status, "{}").is_success());
        }
    }

    #[test]
    fn test_message_field_wins() {
        let result = StepResult::new(500, r#"{"message": "invalid token", "error": "other"}"#);
        assert_eq!(result.error_message(), "invalid token");
    }

    #[test]
    fn test_error_field_fallback() {
        let result = StepResult::new(400, r#"{"error": "valor inválido"}"#);
        assert_eq!(result.error_message(), "valor inválido");
    }

    #[test]
    fn test_blank_message_falls_through_to_error() {
        let result = StepResult::new(400, r#"{"message": "", "error": "Bad Request"}"#);
        assert_eq!(result.error_message(), "Bad Request");
    }

    #[test]
    fn test_raw_text_fallback_is_bounded() {
        let long = "x".repeat(500);
        let result = StepResult::new(502, &long);
        let message = result.error_message();
        assert_eq!(message, format!("{}...", "x".repeat(MAX_ERROR_BODY_CHARS)));
    }

    #[test]
    fn test_json_without_known_fields_uses_raw_json() {
        let result = StepResult::new(422, r#"{"detail":"nope"}"#);
        assert_eq!(result.error_message(), r#"{"detail":"nope"}"#);
    }

    #[test]
    fn test_generic_message_for_empty_body() {
        assert_eq!(StepResult::new(503, "").error_message(), "HTTP 503");
    }

    #[test]
    fn test_into_success_maps_status() {
        let err = StepResult::new(500, r#"{"message": "invalid token"}"#)
            .into_success()
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "invalid token");
    }

    #[test]
    fn test_field_text() {
        let body = Body::parse(r#"{"id": 99, "status": "pendente", "qrCode": null}"#);
        assert_eq!(body.field_text("id").as_deref(), Some("99"));
        assert_eq!(body.field_text("status").as_deref(), Some("pendente"));
        assert_eq!(body.field_text("qrCode"), None);
        assert_eq!(Body::Text("x".into()).field_text("id"), None);
    }
}
