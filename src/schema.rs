// Groupware MCP Gateway - Schema Contracts
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Compiled JSON Schema validators for tool input and output.
// Formats (date-time, etc.) are validated, not just annotated.

use jsonschema::Validator;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
#[error("invalid schema for {name}: {message}")]
pub struct SchemaError {
    pub name: String,
    pub message: String,
}

/// A schema plus its compiled validator
pub struct Contract {
    schema: Value,
    validator: Validator,
}

impl std::fmt::Debug for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contract").field("schema", &self.schema).finish()
    }
}

impl Contract {
    pub fn compile(name: &str, schema: Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::options()
            .should_validate_formats(true)
            .build(&schema)
            .map_err(|e| SchemaError {
                name: name.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { schema, validator })
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Every violation as "<instance path>: <message>"
    pub fn check(&self, instance: &Value) -> Result<(), Vec<String>> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(instance)
            .map(|e| {
                let at = e.instance_path.to_string();
                if at.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", at, e)
                }
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
