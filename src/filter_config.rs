// Groupware MCP Gateway - Filter Configuration
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Loads the per-tool field filter file once at startup.
// Missing or broken file = filtering disabled. Never fatal.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable naming the filter file. Unset disables filtering.
pub const FILTER_CONFIG_ENV: &str = "GROUPWARE_FILTER_CONFIG";

/// Validated filter file contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub version: String,
    /// Tool name -> field paths, applied in order
    pub tools: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum FilterConfigError {
    #[error("filter config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read filter config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("filter config is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("filter config has invalid schema: {0}")]
    InvalidSchema(String),
}

impl FilterConfig {
    /// Read, parse and validate a filter file
    pub fn load(path: &Path) -> Result<Self, FilterConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FilterConfigError::NotFound { path: path.to_path_buf() }
            } else {
                FilterConfigError::Read { path: path.to_path_buf(), source: e }
            }
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, FilterConfigError> {
        let value: Value = serde_json::from_str(content)?;
        Self::validate(&value)
    }

    /// Shape check with messages naming the offending field or tool.
    /// Unknown top-level keys are ignored.
    pub fn validate(value: &Value) -> Result<Self, FilterConfigError> {
        let invalid = |msg: String| FilterConfigError::InvalidSchema(msg);

        let root = value
            .as_object()
            .ok_or_else(|| invalid("top-level value must be an object".to_string()))?;

        let version = match root.get("version") {
            Some(Value::String(v)) => v.clone(),
            Some(_) => return Err(invalid("'version' must be a string".to_string())),
            None => return Err(invalid("missing 'version' field".to_string())),
        };

        let tools_obj = match root.get("tools") {
            Some(Value::Object(map)) => map,
            Some(_) => return Err(invalid("'tools' must be an object".to_string())),
            None => return Err(invalid("missing 'tools' field".to_string())),
        };

        let mut tools = BTreeMap::new();
        for (tool, paths) in tools_obj {
            let items = paths
                .as_array()
                .ok_or_else(|| invalid(format!("tools.{} must be an array", tool)))?;

            let mut fields = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::String(s) => fields.push(s.clone()),
                    _ => return Err(invalid(format!("tools.{}[{}] must be a string", tool, i))),
                }
            }
            tools.insert(tool.clone(), fields);
        }

        Ok(Self { version, tools })
    }

    pub fn paths_for(&self, tool: &str) -> Option<&[String]> {
        self.tools.get(tool).map(Vec::as_slice)
    }
}

/// Process-wide filter configuration. Built once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct FilterConfigStore {
    config: Option<FilterConfig>,
}

impl FilterConfigStore {
    /// Load from `path_override`, or from $GROUPWARE_FILTER_CONFIG when None.
    /// Any failure is logged and leaves the store empty.
    pub fn initialize(path_override: Option<PathBuf>) -> Self {
        let path = match path_override {
            Some(p) => p,
            None => match std::env::var_os(FILTER_CONFIG_ENV) {
                Some(p) if !p.is_empty() => PathBuf::from(p),
                _ => {
                    log::info!("{} not set, response filtering disabled", FILTER_CONFIG_ENV);
                    return Self::empty();
                }
            },
        };

        match FilterConfig::load(&path) {
            Ok(config) => {
                let names: Vec<&str> = config.tools.keys().map(String::as_str).collect();
                log::info!(
                    "Response filter loaded from {:?}: {} tool(s) [{}]",
                    path,
                    names.len(),
                    names.join(", ")
                );
                Self { config: Some(config) }
            }
            Err(e) => {
                match &e {
                    FilterConfigError::NotFound { .. } => {
                        log::warn!("Filter config file not found at {:?}, filtering disabled", path)
                    }
                    FilterConfigError::Read { .. } => {
                        log::warn!("Filter config unreadable, filtering disabled: {}", e)
                    }
                    FilterConfigError::InvalidJson(_) => {
                        log::warn!("Filter config {:?} is invalid JSON, filtering disabled: {}", path, e)
                    }
                    FilterConfigError::InvalidSchema(_) => {
                        log::warn!("Filter config {:?} has invalid schema, filtering disabled: {}", path, e)
                    }
                }
                Self::empty()
            }
        }
    }

    pub fn empty() -> Self {
        Self { config: None }
    }

    pub fn with_config(config: FilterConfig) -> Self {
        Self { config: Some(config) }
    }

    pub fn configuration(&self) -> Option<&FilterConfig> {
        self.config.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn schema_message(value: Value) -> String {
        match FilterConfig::validate(&value) {
            Err(FilterConfigError::InvalidSchema(msg)) => msg,
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn validates_well_formed_config() {
        let config = FilterConfig::validate(&json!({
            "version": "1.0",
            "tools": {
                "get_users": ["result.users[].email", "result.users[].phone"],
                "get_facilities": []
            }
        }))
        .unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(
            config.paths_for("get_users").unwrap(),
            &["result.users[].email".to_string(), "result.users[].phone".to_string()]
        );
        assert_eq!(config.paths_for("get_facilities").unwrap().len(), 0);
        assert!(config.paths_for("other").is_none());
    }

    #[test]
    fn rejects_bad_shapes_with_specific_messages() {
        assert!(schema_message(json!(null)).contains("top-level"));
        assert!(schema_message(json!(["x"])).contains("top-level"));
        assert!(schema_message(json!({"tools": {}})).contains("'version'"));
        assert!(schema_message(json!({"version": 1, "tools": {}})).contains("'version' must be a string"));
        assert!(schema_message(json!({"version": "1"})).contains("'tools'"));
        assert!(schema_message(json!({"version": "1", "tools": null})).contains("'tools' must be an object"));
        assert!(schema_message(json!({"version": "1", "tools": {"get_users": "a.b"}}))
            .contains("tools.get_users must be an array"));
        assert!(schema_message(json!({"version": "1", "tools": {"get_users": ["a", 3]}}))
            .contains("tools.get_users[1] must be a string"));
    }

    #[test]
    fn load_distinguishes_failure_classes() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(FilterConfig::load(&missing), Err(FilterConfigError::NotFound { .. })));

        let bad_json = write_file("{ not json");
        assert!(matches!(FilterConfig::load(bad_json.path()), Err(FilterConfigError::InvalidJson(_))));

        let bad_schema = write_file(r#"{"version": "1.0", "tools": {"t": [1]}}"#);
        assert!(matches!(FilterConfig::load(bad_schema.path()), Err(FilterConfigError::InvalidSchema(_))));
    }

    #[test]
    fn initialize_with_override_loads_file() {
        let file = write_file(r#"{"version": "2", "tools": {"get_users": ["result.users"]}}"#);
        let store = FilterConfigStore::initialize(Some(file.path().to_path_buf()));
        let config = store.configuration().expect("config should be loaded");
        assert_eq!(config.version, "2");
        assert_eq!(config.tools.len(), 1);
        assert_eq!(config.tools["get_users"], vec!["result.users".to_string()]);
    }

    #[test]
    fn initialize_failures_leave_store_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilterConfigStore::initialize(Some(dir.path().join("missing.json")));
        assert!(store.configuration().is_none());

        let broken = write_file("[1, 2");
        assert!(!FilterConfigStore::initialize(Some(broken.path().to_path_buf())).is_enabled());

        let wrong = write_file(r#"{"version": "1", "tools": {"a": {"b": 1}}}"#);
        assert!(!FilterConfigStore::initialize(Some(wrong.path().to_path_buf())).is_enabled());
    }

    // Only test in the crate that touches the environment variable. Every
    // other test must keep passing Some(path) to initialize, or it races this one.
    #[test]
    fn initialize_from_environment_round_trip() {
        let file = write_file(
            r#"{"version": "1.0", "tools": {"get_users": ["result.users[].email"], "get_schedule_events": ["result.events[].notes"]}}"#,
        );

        std::env::set_var(FILTER_CONFIG_ENV, file.path());
        let store = FilterConfigStore::initialize(None);
        let config = store.configuration().expect("env path should load");
        let mut expected = BTreeMap::new();
        expected.insert("get_users".to_string(), vec!["result.users[].email".to_string()]);
        expected.insert("get_schedule_events".to_string(), vec!["result.events[].notes".to_string()]);
        assert_eq!(config.tools, expected);

        std::env::remove_var(FILTER_CONFIG_ENV);
        assert!(FilterConfigStore::initialize(None).configuration().is_none());
    }
}
