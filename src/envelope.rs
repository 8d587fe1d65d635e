// Groupware MCP Gateway - Response Envelope
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Every tool and resource response is normalized to { result?, error? }
// before filtering and serialization.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Envelope error codes
pub mod codes {
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
    pub const INVALID_OUTPUT: &str = "INVALID_OUTPUT";
    pub const UNKNOWN_TOOL: &str = "UNKNOWN_TOOL";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
    pub const FILTER_CONFIG_ERROR: &str = "FILTER_CONFIG_ERROR";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    /// Upstream HTTP status, when the groupware API answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
}

impl Envelope {
    pub fn ok(result: Value) -> Self {
        Self { result: Some(result), error: None }
    }

    pub fn err(code: &str, message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(EnvelopeError {
                code: code.to_string(),
                message: message.into(),
                status: None,
                details: None,
            }),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        if let Some(e) = self.error.as_mut() {
            e.status = Some(status);
        }
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        if let Some(e) = self.error.as_mut() {
            e.details = Some(details);
        }
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn to_value(&self) -> Value {
        // Plain structs of strings and Values always serialize
        serde_json::to_value(self).unwrap_or_else(|_| json!({}))
    }
}

/// MCP `tools/call` result for an already-filtered envelope value
pub fn call_result(envelope: &Value, is_error: bool) -> Value {
    let text = serde_json::to_string_pretty(envelope).unwrap_or_else(|_| envelope.to_string());
    json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": envelope,
        "isError": is_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_omits_error() {
        let env = Envelope::ok(json!({"users": []}));
        assert_eq!(env.to_value(), json!({"result": {"users": []}}));
        assert!(!env.is_error());
    }

    #[test]
    fn error_envelope_carries_status_and_details() {
        let env = Envelope::err(codes::UPSTREAM_ERROR, "HTTP 404")
            .with_status(404)
            .with_details(json!({"code": "GRN_CMMN_00105"}));
        assert_eq!(
            env.to_value(),
            json!({"error": {
                "code": "UPSTREAM_ERROR",
                "message": "HTTP 404",
                "status": 404,
                "details": {"code": "GRN_CMMN_00105"}
            }})
        );
        assert!(env.is_error());
    }

    #[test]
    fn with_status_on_ok_is_ignored() {
        let env = Envelope::ok(json!(1)).with_status(500);
        assert_eq!(env.to_value(), json!({"result": 1}));
    }

    #[test]
    fn call_result_has_text_and_structured_content() {
        let value = json!({"result": {"id": "1"}});
        let out = call_result(&value, false);
        assert_eq!(out["structuredContent"], value);
        assert_eq!(out["isError"], json!(false));
        let text = out["content"][0]["text"].as_str().unwrap();
        assert_eq!(serde_json::from_str::<Value>(text).unwrap(), value);
    }
}
