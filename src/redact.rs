// Groupware MCP Gateway - Field Redaction Walk
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Removes the field(s) addressed by a parsed path from a JSON value in place.
// Shape mismatches are not errors: the walk stops where the data ends.

use crate::field_path::{FieldPath, PathSegment};
use serde_json::Value;

/// Remove everything `path` addresses inside `value`
pub fn remove_path(value: &mut Value, path: &FieldPath) {
    remove_at(value, path.segments(), 0);
}

/// Recursive walk starting at `segments[index]`.
///
/// A Field followed by a wildcard consumes both segments at once and
/// recurses into every element of the named array. A terminal wildcard
/// clears the array and keeps the key. A wildcard is visited on its own
/// only at the start of a path or directly after another wildcard.
pub fn remove_at(value: &mut Value, segments: &[PathSegment], index: usize) {
    let Some(segment) = segments.get(index) else {
        return;
    };
    let is_last = index + 1 == segments.len();

    match segment {
        PathSegment::Field(name) => {
            let Value::Object(map) = value else {
                return;
            };

            if is_last {
                map.remove(name);
                return;
            }

            let Some(child) = map.get_mut(name) else {
                return;
            };

            if segments[index + 1] == PathSegment::ArrayWildcard {
                // "name[]" as the final step: clear the list, keep the key
                if index + 2 == segments.len() {
                    if let Value::Array(items) = child {
                        items.clear();
                    }
                    return;
                }
                if let Value::Array(items) = child {
                    for item in items.iter_mut() {
                        remove_at(item, segments, index + 2);
                    }
                }
            } else {
                remove_at(child, segments, index + 1);
            }
        }
        PathSegment::ArrayWildcard => {
            let Value::Array(items) = value else {
                return;
            };

            if is_last {
                items.clear();
            } else {
                for item in items.iter_mut() {
                    remove_at(item, segments, index + 1);
                }
            }
        }
    }
}
