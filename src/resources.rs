// Groupware MCP Gateway - Resources & Prompts
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Readable resources describe the gateway itself (no upstream calls).
// Prompt templates guide an LLM through common scheduling flows.

use crate::config::GatewayConfig;
use crate::envelope::Envelope;
use crate::response_filter::ResponseFilter;
use serde_json::{json, Value};

pub const SERVER_INFO_URI: &str = "groupware://server/info";
pub const FILTER_CONFIG_URI: &str = "groupware://filter/config";

/// Resource definitions for resources/list
pub fn resource_definitions() -> Vec<Value> {
    vec![
        json!({
            "uri": SERVER_INFO_URI,
            "name": "server_info",
            "description": "Groupware endpoint and response-filter status",
            "mimeType": "application/json",
        }),
        json!({
            "uri": FILTER_CONFIG_URI,
            "name": "filter_config",
            "description": "Active response-filter configuration, or null when filtering is disabled",
            "mimeType": "application/json",
        }),
    ]
}

/// Resource name used as the filter key, by URI
pub fn resource_name(uri: &str) -> Option<&'static str> {
    match uri {
        SERVER_INFO_URI => Some("server_info"),
        FILTER_CONFIG_URI => Some("filter_config"),
        _ => None,
    }
}

/// Build the unfiltered envelope for a resource. `tool_names` is the
/// served catalogue, reported against the filter's coverage.
pub fn read_resource(
    uri: &str,
    config: &GatewayConfig,
    filter: &ResponseFilter,
    tool_names: &[&str],
) -> Option<Envelope> {
    let envelope = match uri {
        SERVER_INFO_URI => {
            let tools: Vec<&str> = filter
                .configuration()
                .map(|c| c.tools.keys().map(String::as_str).collect())
                .unwrap_or_default();
            let (filtered, unfiltered): (Vec<&str>, Vec<&str>) =
                tool_names.iter().partition(|name| filter.covers(name));
            Envelope::ok(json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "baseUrl": config.base_url,
                "username": config.username,
                "timeoutSecs": config.timeout_secs,
                "filter": {
                    "enabled": filter.configuration().is_some(),
                    "version": filter.configuration().map(|c| c.version.clone()),
                    "tools": tools,
                    "filteredTools": filtered,
                    "unfilteredTools": unfiltered,
                }
            }))
        }
        FILTER_CONFIG_URI => Envelope::ok(
            filter
                .configuration()
                .and_then(|c| serde_json::to_value(c).ok())
                .unwrap_or(Value::Null),
        ),
        _ => return None,
    };
    Some(envelope)
}

// ============================================================================
// PROMPTS
// ============================================================================

pub fn prompt_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "schedule_meeting",
            "description": "Find a free slot for attendees and book it",
            "arguments": [
                { "name": "subject", "description": "Meeting subject", "required": true },
                { "name": "attendees", "description": "Comma-separated user names or codes", "required": true },
                { "name": "date", "description": "Preferred date (YYYY-MM-DD)", "required": false },
            ]
        }),
        json!({
            "name": "find_colleague",
            "description": "Look up a user and their organization",
            "arguments": [
                { "name": "name", "description": "Full or partial name", "required": true },
            ]
        }),
    ]
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PromptError {
    #[error("unknown prompt: {0}")]
    Unknown(String),

    #[error("prompt '{prompt}' requires argument '{argument}'")]
    MissingArgument { prompt: String, argument: String },
}

fn required_arg<'a>(prompt: &str, args: &'a Value, name: &str) -> Result<&'a str, PromptError> {
    args.get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| PromptError::MissingArgument {
            prompt: prompt.to_string(),
            argument: name.to_string(),
        })
}

/// Render a prompt as a prompts/get result
pub fn get_prompt(name: &str, args: &Value) -> Result<Value, PromptError> {
    let (description, text) = match name {
        "schedule_meeting" => {
            let subject = required_arg(name, args, "subject")?;
            let attendees = required_arg(name, args, "attendees")?;
            let when = match args.get("date").and_then(Value::as_str) {
                Some(d) if !d.trim().is_empty() => format!("on {}", d),
                _ => "in the next five business days".to_string(),
            };
            (
                "Schedule a meeting",
                format!(
                    "Schedule a meeting titled \"{subject}\" with {attendees} {when}.\n\
                     1. Resolve each attendee with get_users.\n\
                     2. Call search_available_times for a 60 minute slot.\n\
                     3. Confirm the slot with me, then call create_schedule_event."
                ),
            )
        }
        "find_colleague" => {
            let who = required_arg(name, args, "name")?;
            (
                "Find a colleague",
                format!(
                    "Find the user matching \"{who}\" with get_users, then list their \
                     organization with get_organizations. Summarize name, code and organization."
                ),
            )
        }
        other => return Err(PromptError::Unknown(other.to_string())),
    };

    Ok(json!({
        "description": description,
        "messages": [
            { "role": "user", "content": { "type": "text", "text": text } }
        ]
    }))
}
