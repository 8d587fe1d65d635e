// Groupware MCP Gateway - Response Filter
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Per-tool field removal applied to outbound tool/resource payloads.
// Paths are parsed once here; each call clones the payload and walks it.
// The caller's value is never mutated.

use crate::field_path::{FieldPath, PathError};
use crate::filter_config::{FilterConfig, FilterConfigStore};
use crate::redact;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

/// Shared, immutable filtering service. Safe to read from many requests.
#[derive(Debug, Clone, Default)]
pub struct ResponseFilter {
    store: FilterConfigStore,
    /// Tool name -> parsed paths in configured order. A path that failed to
    /// parse is kept as its error and reported whenever the tool is filtered.
    compiled: HashMap<String, Vec<Result<FieldPath, PathError>>>,
}

impl ResponseFilter {
    pub fn new(store: FilterConfigStore) -> Self {
        let mut compiled = HashMap::new();
        if let Some(config) = store.configuration() {
            for (tool, paths) in &config.tools {
                let parsed: Vec<_> = paths.iter().map(|p| FieldPath::parse(p)).collect();
                for (raw, result) in paths.iter().zip(&parsed) {
                    match result {
                        Err(err) => log::warn!("Filter for tool '{}' has a malformed path: {}", tool, err),
                        Ok(path) if path.is_empty() => {
                            log::warn!("Filter for tool '{}' has an empty path '{}', ignored", tool, raw)
                        }
                        Ok(_) => {}
                    }
                }
                compiled.insert(tool.clone(), parsed);
            }
        }
        Self { store, compiled }
    }

    /// Filter with no configuration; every call is the identity
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn configuration(&self) -> Option<&FilterConfig> {
        self.store.configuration()
    }

    pub fn covers(&self, tool_name: &str) -> bool {
        self.compiled.contains_key(tool_name)
    }

    /// Remove the configured fields for `tool_name` from a copy of `response`.
    ///
    /// Returns `Cow::Borrowed(response)` when nothing applies: no config, no
    /// entry for the tool, or a scalar/null payload. A malformed configured
    /// path fails the whole call; no partially filtered value is returned.
    pub fn apply<'a>(&self, response: &'a Value, tool_name: &str) -> Result<Cow<'a, Value>, PathError> {
        let Some(paths) = self.compiled.get(tool_name) else {
            return Ok(Cow::Borrowed(response));
        };
        if !(response.is_object() || response.is_array()) {
            return Ok(Cow::Borrowed(response));
        }

        let paths: Vec<&FieldPath> = paths
            .iter()
            .map(|p| p.as_ref().map_err(Clone::clone))
            .collect::<Result<_, _>>()?;

        let mut filtered = response.clone();
        for path in paths {
            redact::remove_path(&mut filtered, path);
        }
        log::debug!("Applied {} filter path(s) for '{}'", self.compiled[tool_name].len(), tool_name);
        Ok(Cow::Owned(filtered))
    }
}
