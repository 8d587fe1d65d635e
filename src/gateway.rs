// Groupware MCP Gateway - Request Pipeline
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Every tool call: validate input -> forward -> envelope -> validate output
// -> response filter -> serialize. Every resource read: envelope -> filter.
// Failures at any step become an error envelope, never a panic.

use crate::config::GatewayConfig;
use crate::envelope::{codes, Envelope};
use crate::groupware::GroupwareClient;
use crate::resources;
use crate::response_filter::ResponseFilter;
use crate::schema::SchemaError;
use crate::tools::{self, Tool};
use serde_json::{json, Value};

/// Filtered envelope ready for the protocol layer.
/// `is_error` reflects the envelope before filtering: a filter that removes
/// the `error` key hides the details, not the failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub envelope: Value,
    pub is_error: bool,
}

/// Shared state for all requests. Read-only after construction.
pub struct Gateway {
    client: GroupwareClient,
    filter: ResponseFilter,
    tools: Vec<Tool>,
}

impl Gateway {
    pub fn new(client: GroupwareClient, filter: ResponseFilter) -> Result<Self, SchemaError> {
        Ok(Self {
            client,
            filter,
            tools: tools::catalogue()?,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        self.client.config()
    }

    pub fn filter(&self) -> &ResponseFilter {
        &self.filter
    }

    pub fn tool_definitions(&self) -> Vec<Value> {
        self.tools.iter().map(Tool::definition).collect()
    }

    pub fn call_tool(&self, name: &str, args: &Value) -> Outcome {
        let Some(tool) = self.tools.iter().find(|t| t.name == name) else {
            return self.finish(name, Envelope::err(codes::UNKNOWN_TOOL, format!("Unknown tool: {}", name)));
        };

        if let Err(errors) = tool.input.check(args) {
            let env = Envelope::err(codes::INVALID_INPUT, format!("Invalid arguments for {}", name))
                .with_details(json!(errors));
            return self.finish(name, env);
        }

        let envelope = match tool.invoke(&self.client, args) {
            Ok(result) => match tool.output.check(&result) {
                Ok(()) => Envelope::ok(result),
                Err(errors) => {
                    log::warn!("{} returned an unexpected shape: {}", name, errors.join("; "));
                    Envelope::err(codes::INVALID_OUTPUT, format!("Unexpected response shape from {}", name))
                        .with_details(json!(errors))
                }
            },
            Err(env) => env,
        };

        self.finish(name, envelope)
    }

    /// None for an unknown URI
    pub fn read_resource(&self, uri: &str) -> Option<Outcome> {
        let name = resources::resource_name(uri)?;
        let tool_names: Vec<&str> = self.tools.iter().map(|t| t.name).collect();
        let envelope = resources::read_resource(uri, self.config(), &self.filter, &tool_names)?;
        Some(self.finish(name, envelope))
    }

    /// Filter the serialized envelope under `name`. A malformed configured
    /// path replaces the whole response with a filter error. The error flag
    /// is taken before filtering.
    fn finish(&self, name: &str, envelope: Envelope) -> Outcome {
        let value = envelope.to_value();
        match self.filter.apply(&value, name) {
            Ok(filtered) => Outcome {
                envelope: filtered.into_owned(),
                is_error: envelope.is_error(),
            },
            Err(e) => {
                log::error!("Response filter failed for {}: {}", name, e);
                Outcome {
                    envelope: Envelope::err(codes::FILTER_CONFIG_ERROR, e.to_string()).to_value(),
                    is_error: true,
                }
            }
        }
    }
}
