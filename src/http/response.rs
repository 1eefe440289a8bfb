//! Response envelope handling.
//!
//! # Responsibilities
//! - Map non-2xx statuses to `Error::Api`
//! - Detect the platform's `{ "error": ..., "message": ... }` envelope on 2xx
//! - Pull named fields (`data`, `message`, `inviteId`) out of a body
//!
//! # Design Decisions
//! - JSON truthiness decides whether `error` is set, matching the services
//! - Non-JSON success bodies are surfaced as a JSON string

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{Error, Result};

/// JSON truthiness (`null`, `false`, `0`, `""` are falsy).
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Best human-readable message from an error body.
pub fn error_message(body: &Value) -> String {
    let candidates = [
        body.get("message"),
        body.get("error").and_then(|e| e.get("message")),
        body.get("error"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Turn a raw response into a JSON value or an API error.
pub fn parse_body(status: StatusCode, bytes: &[u8]) -> Result<Value> {
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
    };

    if !status.is_success() {
        let message = match &body {
            Value::Null => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
            Value::String(text) => text.clone(),
            other => error_message(other),
        };
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    if body.get("error").is_some_and(is_truthy) {
        return Err(Error::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    Ok(body)
}

/// Remove `field` from an object body.
pub fn take_field(mut body: Value, field: &str) -> Result<Value> {
    body.as_object_mut()
        .and_then(|obj| obj.remove(field))
        .ok_or_else(|| Error::Decode(format!("missing field '{}' in response", field)))
}

/// Remove `field` and require it to be a string.
pub fn take_string(body: Value, field: &str) -> Result<String> {
    match take_field(body, field)? {
        Value::String(s) => Ok(s),
        other => Err(Error::Decode(format!(
            "field '{}' should be a string, got {}",
            field, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_body() {
        let body = parse_body(StatusCode::OK, br#"{"data":"wallet-1"}"#).unwrap();
        assert_eq!(take_string(body, "data").unwrap(), "wallet-1");
    }

    #[test]
    fn test_error_envelope_on_200() {
        let err = parse_body(
            StatusCode::OK,
            br#"{"error":true,"message":"Chaincode not found"}"#,
        )
        .unwrap_err();
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 200);
                assert_eq!(message, "Chaincode not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_falsy_error_field_is_success() {
        let body = parse_body(StatusCode::OK, br#"{"error":false,"message":["mychannel"]}"#).unwrap();
        assert_eq!(take_field(body, "message").unwrap(), json!(["mychannel"]));
    }

    #[test]
    fn test_error_status_with_text_body() {
        let err = parse_body(StatusCode::UNAUTHORIZED, b"Unauthorized").unwrap_err();
        assert_eq!(err.to_string(), "API error (status 401): Unauthorized");
    }

    #[test]
    fn test_nested_error_message() {
        let body = json!({ "error": { "message": "Invalid email" } });
        assert_eq!(error_message(&body), "Invalid email");
    }

    #[test]
    fn test_missing_field() {
        let err = take_field(json!({"data": 1}), "inviteId").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
