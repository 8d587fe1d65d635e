// Groupware MCP Gateway - REST Client
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Blocking HTTP client for the groupware REST API.
// Non-2xx answers keep their status and JSON body for the error envelope.

use crate::config::GatewayConfig;
use crate::envelope::{codes, Envelope};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum GroupwareError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("groupware API returned HTTP {status}")]
    Http { status: u16, body: Option<Value> },

    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl GroupwareError {
    /// Convert into the error envelope returned to MCP clients
    pub fn into_envelope(self) -> Envelope {
        match self {
            GroupwareError::Http { status, ref body } => {
                let message = body
                    .as_ref()
                    .and_then(|b| b.get("message"))
                    .and_then(|m| m.as_str())
                    .map(|m| format!("HTTP {}: {}", status, m))
                    .unwrap_or_else(|| self.to_string());
                let env = Envelope::err(codes::UPSTREAM_ERROR, message).with_status(status);
                match body {
                    Some(b) => env.with_details(b.clone()),
                    None => env,
                }
            }
            GroupwareError::Transport { .. } => Envelope::err(codes::TRANSPORT_ERROR, self.to_string()),
            GroupwareError::Decode { .. } => Envelope::err(codes::UPSTREAM_ERROR, self.to_string()),
        }
    }
}

/// Groupware API client
pub struct GroupwareClient {
    client: Client,
    config: GatewayConfig,
}

impl GroupwareClient {
    pub fn new(config: GatewayConfig) -> Result<Self, String> {
        let client = Client::builder()
            .user_agent(concat!("groupware-mcp-gate/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, GroupwareError> {
        let req = self.request(Method::GET, path).query(query);
        self.send(req, path)
    }

    pub fn post(&self, path: &str, body: &Value) -> Result<Value, GroupwareError> {
        let req = self.request(Method::POST, path).json(body);
        self.send(req, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.config.endpoint(path))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header("Accept", "application/json")
    }

    fn send(&self, req: RequestBuilder, path: &str) -> Result<Value, GroupwareError> {
        let url = self.config.endpoint(path);
        let resp = req.send().map_err(|e| GroupwareError::Transport { url: url.clone(), source: e })?;
        let status = resp.status();
        let text = resp.text().map_err(|e| GroupwareError::Transport { url: url.clone(), source: e })?;

        if !status.is_success() {
            log::warn!("Groupware API {} -> HTTP {}", path, status.as_u16());
            return Err(GroupwareError::Http {
                status: status.as_u16(),
                body: serde_json::from_str(&text).ok(),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&text).map_err(|e| GroupwareError::Decode { url, message: e.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn http_error_envelope_uses_upstream_message() {
        let err = GroupwareError::Http {
            status: 400,
            body: Some(json!({"code": "GRN_SCHD_13208", "message": "Invalid range"})),
        };
        let env = err.into_envelope().to_value();
        assert_eq!(env["error"]["code"], "UPSTREAM_ERROR");
        assert_eq!(env["error"]["status"], 400);
        assert_eq!(env["error"]["message"], "HTTP 400: Invalid range");
        assert_eq!(env["error"]["details"]["code"], "GRN_SCHD_13208");
    }

    #[test]
    fn http_error_without_body() {
        let env = GroupwareError::Http { status: 503, body: None }.into_envelope().to_value();
        assert_eq!(env["error"]["message"], "groupware API returned HTTP 503");
        assert!(env["error"].get("details").is_none());
    }

    #[test]
    fn decode_error_is_upstream_error() {
        let err = GroupwareError::Decode { url: "u".into(), message: "eof".into() };
        assert_eq!(err.into_envelope().to_value()["error"]["code"], "UPSTREAM_ERROR");
    }

    #[test]
    fn client_builds_without_network() {
        let client = GroupwareClient::new(GatewayConfig {
            base_url: "https://gw.example.com".into(),
            username: "u".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.config().endpoint("api/v1/base/users"), "https://gw.example.com/api/v1/base/users");
    }
}
