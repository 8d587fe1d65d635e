// Groupware MCP Gateway - Library Root
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// All modules exported here for use by the binary and tests.

pub mod config;
pub mod envelope;
pub mod gateway;
pub mod groupware;
pub mod mcp;
pub mod resources;
pub mod schema;
pub mod tools;

// ============================================================================
// RESPONSE FILTERING
// ============================================================================

/// Field path grammar: "a.b[].c"
pub mod field_path;

/// In-place removal walk over JSON values
pub mod redact;

/// Filter file loading and validation
pub mod filter_config;

/// Per-tool filtering service applied to every outbound envelope
pub mod response_filter;

pub use filter_config::{FilterConfig, FilterConfigStore};
pub use response_filter::ResponseFilter;
