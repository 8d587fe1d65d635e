// Groupware MCP Gateway - Configuration
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Connection settings for the groupware REST API plus the filter file path.
// Built from CLI flags / environment in main.rs.

use std::path::PathBuf;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// e.g. https://example.cybozu.com/g
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
    /// Field filter file; None falls back to $GROUPWARE_FILTER_CONFIG
    pub filter_config: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("base URL must start with http:// or https://: {0}")]
    InvalidBaseUrl(String),

    #[error("username is required")]
    MissingUsername,

    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            username: String::new(),
            password: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            filter_config: None,
        }
    }
}

impl GatewayConfig {
    /// Check and normalize. Trailing slashes are trimmed from the base URL.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.base_url.trim().trim_end_matches('/').to_string();
        let host = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"));
        match host {
            Some(h) if !h.is_empty() => {}
            _ => return Err(ConfigError::InvalidBaseUrl(self.base_url)),
        }
        self.base_url = trimmed;

        if self.username.trim().is_empty() {
            return Err(ConfigError::MissingUsername);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(self)
    }

    /// Full URL for an API path like "/api/v1/base/users"
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
