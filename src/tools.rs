// Groupware MCP Gateway - Tool Catalogue
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Tool definitions: name, description, input/output schema, handler.
// Handlers are thin: build the request, forward, return the JSON body.
// Validation, envelopes and filtering happen in gateway.rs.

use crate::envelope::{codes, Envelope};
use crate::groupware::GroupwareClient;
use crate::schema::{Contract, SchemaError};
use chrono::{DateTime, FixedOffset};
use serde_json::{json, Value};

/// Handler result: upstream body, or a ready error envelope
pub type ToolResult = Result<Value, Envelope>;

type Handler = fn(&GroupwareClient, &Value) -> ToolResult;

/// A registered tool
pub struct Tool {
    pub name: &'static str,
    pub description: &'static str,
    pub input: Contract,
    pub output: Contract,
    handler: Handler,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Tool {
    fn new(
        name: &'static str,
        description: &'static str,
        input: Value,
        output: Value,
        handler: Handler,
    ) -> Result<Self, SchemaError> {
        Ok(Self {
            name,
            description,
            input: Contract::compile(&format!("{} input", name), input)?,
            output: Contract::compile(&format!("{} output", name), output)?,
            handler,
        })
    }

    pub fn invoke(&self, client: &GroupwareClient, args: &Value) -> ToolResult {
        (self.handler)(client, args)
    }

    /// MCP tools/list entry
    pub fn definition(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input.schema(),
            "outputSchema": envelope_schema(self.output.schema()),
        })
    }
}

/// Output schema as seen by clients: the result wrapped in an envelope
fn envelope_schema(result: &Value) -> Value {
    json!({
        "type": "object",
        "properties": {
            "result": result,
            "error": {
                "type": "object",
                "properties": {
                    "code": { "type": "string" },
                    "message": { "type": "string" },
                    "status": { "type": "integer" },
                    "details": {}
                },
                "required": ["code", "message"]
            }
        }
    })
}

// ============================================================================
// SCHEMA FRAGMENTS
// ============================================================================

fn paging_properties() -> Value {
    json!({
        "offset": { "type": "integer", "minimum": 0, "description": "Number of items to skip" },
        "limit": { "type": "integer", "minimum": 1, "maximum": 1000, "description": "Maximum items to return" }
    })
}

fn with_paging(mut properties: Value) -> Value {
    if let (Some(props), Value::Object(paging)) = (properties.as_object_mut(), paging_properties()) {
        props.extend(paging);
    }
    properties
}

fn list_output(key: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            key: { "type": "array", "items": { "type": "object" } },
            "hasNext": { "type": "boolean" }
        },
        "required": [key]
    })
}

fn member_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "type": { "type": "string", "enum": ["USER", "ORGANIZATION"] },
            "id": { "type": "string" },
            "code": { "type": "string" }
        },
        "required": ["type"]
    })
}

fn facility_ref_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "code": { "type": "string" }
        }
    })
}

fn datetime_with_zone() -> Value {
    json!({
        "type": "object",
        "properties": {
            "dateTime": { "type": "string", "format": "date-time" },
            "timeZone": { "type": "string", "minLength": 1 }
        },
        "required": ["dateTime", "timeZone"]
    })
}

// ============================================================================
// ARGUMENT HELPERS
// ============================================================================

/// Copy scalar arguments into query pairs, in the given key order
fn query_from(args: &Value, keys: &[&str]) -> Vec<(String, String)> {
    keys.iter()
        .filter_map(|k| {
            let v = args.get(*k)?;
            let s = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((k.to_string(), s))
        })
        .collect()
}

fn parse_time(args: &Value, pointer: &str) -> Result<DateTime<FixedOffset>, Envelope> {
    let raw = args.pointer(pointer).and_then(Value::as_str).unwrap_or("");
    DateTime::parse_from_rfc3339(raw).map_err(|e| {
        Envelope::err(codes::INVALID_INPUT, format!("{} is not an RFC 3339 date-time: {}", pointer, e))
    })
}

/// start must be strictly before end
fn check_range(args: &Value, start: &str, end: &str) -> Result<(), Envelope> {
    let s = parse_time(args, start)?;
    let e = parse_time(args, end)?;
    if s >= e {
        return Err(Envelope::err(
            codes::INVALID_INPUT,
            format!("{} ({}) must be before {} ({})", start, s.to_rfc3339(), end, e.to_rfc3339()),
        ));
    }
    Ok(())
}

fn upstream(result: Result<Value, crate::groupware::GroupwareError>) -> ToolResult {
    result.map_err(|e| e.into_envelope())
}

// ============================================================================
// HANDLERS
// ============================================================================

fn get_users(client: &GroupwareClient, args: &Value) -> ToolResult {
    let query = query_from(args, &["name", "offset", "limit"]);
    upstream(client.get("/api/v1/base/users", &query))
}

fn get_organizations(client: &GroupwareClient, args: &Value) -> ToolResult {
    let query = query_from(args, &["name", "offset", "limit"]);
    upstream(client.get("/api/v1/base/organizations", &query))
}

fn get_facilities(client: &GroupwareClient, args: &Value) -> ToolResult {
    let query = query_from(args, &["name", "offset", "limit"]);
    upstream(client.get("/api/v1/schedule/facilities", &query))
}

fn get_schedule_events(client: &GroupwareClient, args: &Value) -> ToolResult {
    check_range(args, "/rangeStart", "/rangeEnd")?;
    let query = query_from(
        args,
        &["rangeStart", "rangeEnd", "target", "targetType", "keyword", "offset", "limit"],
    );
    upstream(client.get("/api/v1/schedule/events", &query))
}

fn get_schedule_event(client: &GroupwareClient, args: &Value) -> ToolResult {
    let id = args.get("id").and_then(Value::as_str).unwrap_or_default();
    upstream(client.get(&format!("/api/v1/schedule/events/{}", id), &[]))
}

fn create_schedule_event(client: &GroupwareClient, args: &Value) -> ToolResult {
    check_range(args, "/start/dateTime", "/end/dateTime")?;
    upstream(client.post("/api/v1/schedule/events", args))
}

fn search_available_times(client: &GroupwareClient, args: &Value) -> ToolResult {
    let ranges = args.get("timeRanges").and_then(Value::as_array).map(Vec::len).unwrap_or(0);
    for i in 0..ranges {
        check_range(args, &format!("/timeRanges/{}/start", i), &format!("/timeRanges/{}/end", i))?;
    }
    upstream(client.post("/api/v1/schedule/searchAvailableTimes", args))
}

// ============================================================================
// CATALOGUE
// ============================================================================

/// Build every tool. Fails only if a built-in schema does not compile.
pub fn catalogue() -> Result<Vec<Tool>, SchemaError> {
    let name_filter = json!({ "name": { "type": "string", "description": "Partial name match" } });

    Ok(vec![
        Tool::new(
            "get_users",
            "List groupware users, optionally filtered by name.",
            json!({
                "type": "object",
                "properties": with_paging(name_filter.clone()),
                "additionalProperties": false
            }),
            list_output("users"),
            get_users,
        )?,
        Tool::new(
            "get_organizations",
            "List organizations, optionally filtered by name.",
            json!({
                "type": "object",
                "properties": with_paging(name_filter.clone()),
                "additionalProperties": false
            }),
            list_output("organizations"),
            get_organizations,
        )?,
        Tool::new(
            "get_facilities",
            "List bookable facilities (meeting rooms, equipment).",
            json!({
                "type": "object",
                "properties": with_paging(name_filter),
                "additionalProperties": false
            }),
            list_output("facilities"),
            get_facilities,
        )?,
        Tool::new(
            "get_schedule_events",
            "List schedule events in a time range for a user, organization or facility.",
            json!({
                "type": "object",
                "properties": with_paging(json!({
                    "rangeStart": { "type": "string", "format": "date-time" },
                    "rangeEnd": { "type": "string", "format": "date-time" },
                    "target": { "type": "string", "description": "ID of the user, organization or facility" },
                    "targetType": { "type": "string", "enum": ["user", "organization", "facility"] },
                    "keyword": { "type": "string" }
                })),
                "required": ["rangeStart", "rangeEnd"],
                "additionalProperties": false
            }),
            list_output("events"),
            get_schedule_events,
        )?,
        Tool::new(
            "get_schedule_event",
            "Get a single schedule event by ID.",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "pattern": "^[0-9]+$" }
                },
                "required": ["id"],
                "additionalProperties": false
            }),
            json!({
                "type": "object",
                "properties": { "id": { "type": "string" } },
                "required": ["id"]
            }),
            get_schedule_event,
        )?,
        Tool::new(
            "create_schedule_event",
            "Create a schedule event with attendees and optional facilities.",
            json!({
                "type": "object",
                "properties": {
                    "eventType": { "type": "string", "enum": ["REGULAR", "ALL_DAY"] },
                    "subject": { "type": "string", "minLength": 1 },
                    "notes": { "type": "string" },
                    "start": datetime_with_zone(),
                    "end": datetime_with_zone(),
                    "attendees": { "type": "array", "items": member_schema(), "minItems": 1 },
                    "facilities": { "type": "array", "items": facility_ref_schema() },
                    "visibilityType": { "type": "string", "enum": ["PUBLIC", "PRIVATE", "SET_PRIVATE_WATCHERS"] }
                },
                "required": ["eventType", "subject", "start", "end", "attendees"],
                "additionalProperties": false
            }),
            json!({
                "type": "object",
                "properties": { "id": { "type": "string" } },
                "required": ["id"]
            }),
            create_schedule_event,
        )?,
        Tool::new(
            "search_available_times",
            "Find time slots where all attendees and facilities are free.",
            json!({
                "type": "object",
                "properties": {
                    "timeRanges": {
                        "type": "array",
                        "minItems": 1,
                        "items": {
                            "type": "object",
                            "properties": {
                                "start": { "type": "string", "format": "date-time" },
                                "end": { "type": "string", "format": "date-time" }
                            },
                            "required": ["start", "end"]
                        }
                    },
                    "timeInterval": { "type": "integer", "minimum": 1, "maximum": 1440 },
                    "attendees": { "type": "array", "items": member_schema() },
                    "facilities": { "type": "array", "items": facility_ref_schema() },
                    "facilitySearchCondition": { "type": "string", "enum": ["AND", "OR"] }
                },
                "required": ["timeRanges", "timeInterval"],
                "additionalProperties": false
            }),
            list_output("availableTimes"),
            search_available_times,
        )?,
    ])
}
