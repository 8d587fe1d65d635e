// Groupware MCP Gateway - MCP Server (JSON-RPC 2.0 over stdio)
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// One JSON message per line. stdout carries JSON-RPC only; logs go to stderr.
// Exposes: tools (groupware API), resources (gateway status), prompts.

use crate::envelope::call_result;
use crate::gateway::Gateway;
use crate::resources;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "groupware-mcp-gate";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON-RPC error codes
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

fn response(id: &Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

fn error_response(id: &Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

/// Handle one decoded message. None for notifications.
pub fn handle_message(gateway: &Gateway, msg: &Value) -> Option<Value> {
    let method = msg["method"].as_str().unwrap_or("");
    let id = &msg["id"];
    let params = &msg["params"];

    log::debug!("Received: {}", method);

    let reply = match method {
        "initialize" => response(id, json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {}, "resources": {}, "prompts": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION,
            }
        })),

        "tools/list" => response(id, json!({ "tools": gateway.tool_definitions() })),

        "tools/call" => {
            let Some(name) = params["name"].as_str() else {
                return Some(error_response(id, INVALID_PARAMS, "tools/call requires 'name'"));
            };
            let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

            log::info!("CALL {}", name);
            let outcome = gateway.call_tool(name, &args);
            if outcome.is_error {
                let code = outcome.envelope["error"]["code"].as_str().unwrap_or("?");
                log::warn!("FAIL {} | {}", name, code);
            }
            response(id, call_result(&outcome.envelope, outcome.is_error))
        }

        "resources/list" => response(id, json!({ "resources": resources::resource_definitions() })),

        "resources/read" => {
            let uri = params["uri"].as_str().unwrap_or("");
            match gateway.read_resource(uri) {
                Some(outcome) => {
                    let text = serde_json::to_string_pretty(&outcome.envelope)
                        .unwrap_or_else(|_| outcome.envelope.to_string());
                    response(id, json!({
                        "contents": [{
                            "uri": uri,
                            "mimeType": "application/json",
                            "text": text,
                        }]
                    }))
                }
                None => error_response(id, INVALID_PARAMS, &format!("Unknown resource: {}", uri)),
            }
        }

        "prompts/list" => response(id, json!({ "prompts": resources::prompt_definitions() })),

        "prompts/get" => {
            let name = params["name"].as_str().unwrap_or("");
            let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
            match resources::get_prompt(name, &args) {
                Ok(prompt) => response(id, prompt),
                Err(e) => error_response(id, INVALID_PARAMS, &e.to_string()),
            }
        }

        "ping" => response(id, json!({})),

        _ if method.starts_with("notifications/") => return None,

        _ => {
            if id.is_null() {
                return None;
            }
            error_response(id, METHOD_NOT_FOUND, &format!("Unknown method: {}", method))
        }
    };

    Some(reply)
}

/// Serve until `input` is exhausted
pub fn serve<R: BufRead, W: Write>(gateway: &Gateway, input: R, mut output: W) -> io::Result<()> {
    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::warn!("stdin read error: {}", e);
                continue;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let msg: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("JSON parse error: {}", e);
                continue;
            }
        };

        if let Some(reply) = handle_message(gateway, &msg) {
            serde_json::to_writer(&mut output, &reply)?;
            output.write_all(b"\n")?;
            output.flush()?;
        }
    }
    Ok(())
}

/// Main MCP server loop on stdio
pub fn run(gateway: &Gateway) -> io::Result<()> {
    log::info!("Starting {} v{}", SERVER_NAME, SERVER_VERSION);
    log::info!("Groupware endpoint: {}", gateway.config().base_url);
    match gateway.filter().configuration() {
        Some(c) => log::info!("Response filter active for {} tool(s)", c.tools.len()),
        None => log::info!("Response filter disabled"),
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(gateway, stdin.lock(), stdout.lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::tests::{filtered_gateway, gateway};

    fn exchange(gw: &Gateway, lines: &[Value]) -> Vec<Value> {
        let input: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        let mut out = Vec::new();
        serve(gw, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn initialize_and_notifications() {
        let replies = exchange(&gateway(), &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}),
        ]);
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(replies[0]["result"]["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(replies[1]["id"], 2);
    }

    #[test]
    fn garbage_lines_are_skipped() {
        let mut out = Vec::new();
        let input = "not json\n\n{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"ping\"}\n";
        serve(&gateway(), input.as_bytes(), &mut out).unwrap();
        let reply: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(reply["id"], 7);
    }

    #[test]
    fn tools_list_exposes_catalogue() {
        let replies = exchange(&gateway(), &[json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})]);
        let tools = replies[0]["result"]["tools"].as_array().unwrap();
        assert!(tools.iter().any(|t| t["name"] == "get_schedule_events"));
    }

    #[test]
    fn tool_failure_is_result_not_rpc_error() {
        let replies = exchange(&gateway(), &[json!({
            "jsonrpc": "2.0", "id": 3, "method": "tools/call",
            "params": {"name": "get_schedule_event", "arguments": {"id": "abc"}}
        })]);
        let result = &replies[0]["result"];
        assert!(replies[0].get("error").is_none());
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["error"]["code"], "INVALID_INPUT");
    }

    #[test]
    fn tools_call_without_name_is_invalid_params() {
        let replies = exchange(&gateway(), &[json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {}})]);
        assert_eq!(replies[0]["error"]["code"], INVALID_PARAMS);
    }

    #[test]
    fn resources_read_is_filtered() {
        let gw = filtered_gateway("server_info", &["result.baseUrl"]);
        let replies = exchange(&gw, &[json!({
            "jsonrpc": "2.0", "id": 5, "method": "resources/read",
            "params": {"uri": resources::SERVER_INFO_URI}
        })]);
        let text = replies[0]["result"]["contents"][0]["text"].as_str().unwrap();
        let body: Value = serde_json::from_str(text).unwrap();
        assert!(body["result"].get("baseUrl").is_none());
        assert_eq!(body["result"]["username"], "tester");
    }

    #[test]
    fn prompts_round_trip() {
        let replies = exchange(&gateway(), &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "prompts/list"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "prompts/get",
                   "params": {"name": "find_colleague", "arguments": {"name": "Sato"}}}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "prompts/get", "params": {"name": "find_colleague"}}),
        ]);
        assert_eq!(replies[0]["result"]["prompts"].as_array().unwrap().len(), 2);
        assert_eq!(replies[1]["result"]["messages"][0]["role"], "user");
        assert_eq!(replies[2]["error"]["code"], INVALID_PARAMS);
    }

    #[test]
    fn unknown_method() {
        let replies = exchange(&gateway(), &[
            json!({"jsonrpc": "2.0", "id": 9, "method": "sampling/createMessage"}),
            json!({"jsonrpc": "2.0", "method": "no/id"}),
        ]);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["error"]["code"], METHOD_NOT_FOUND);
    }
}
