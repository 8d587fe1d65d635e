// Groupware MCP Gateway - Field Path Parser
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Parses filter paths like "result.users[].email" into segments.
// Only empty brackets are allowed: "[]" broadcasts over array elements.

use std::fmt;
use std::str::FromStr;

/// One step of a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Named object property
    Field(String),
    /// Every element of the array reached so far
    ArrayWildcard,
}

/// Malformed path string in a filter configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("invalid field path '{path}': '[' at byte {position} is not closed by ']'")]
    UnclosedBracket { path: String, position: usize },

    #[error("invalid field path '{path}': only '[]' is supported, found '[{found}' at byte {position}")]
    UnsupportedBracket {
        path: String,
        position: usize,
        found: char,
    },
}

/// Parsed field path. Built once per configured path string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Scan left to right: '.' ends a field name, "[]" ends a field name and
    /// emits a wildcard. Empty names (leading dots, "a..b") produce no segment.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        let mut buffer = String::new();
        let mut chars = path.char_indices();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '.' => flush(&mut buffer, &mut segments),
                '[' => {
                    flush(&mut buffer, &mut segments);
                    match chars.next() {
                        Some((_, ']')) => segments.push(PathSegment::ArrayWildcard),
                        Some((_, found)) => {
                            return Err(PathError::UnsupportedBracket {
                                path: path.to_string(),
                                position: pos,
                                found,
                            })
                        }
                        None => {
                            return Err(PathError::UnclosedBracket {
                                path: path.to_string(),
                                position: pos,
                            })
                        }
                    }
                }
                _ => buffer.push(ch),
            }
        }
        flush(&mut buffer, &mut segments);

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

fn flush(buffer: &mut String, segments: &mut Vec<PathSegment>) {
    if !buffer.is_empty() {
        segments.push(PathSegment::Field(std::mem::take(buffer)));
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            match segment {
                PathSegment::Field(name) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::ArrayWildcard => f.write_str("[]")?,
            }
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> PathSegment {
        PathSegment::Field(name.to_string())
    }

    #[test]
    fn parses_wildcard_path() {
        let path = FieldPath::parse("result.users[].email").unwrap();
        assert_eq!(
            path.segments(),
            &[field("result"), field("users"), PathSegment::ArrayWildcard, field("email")]
        );
    }

    #[test]
    fn parses_plain_dotted_path() {
        let path: FieldPath = "result.hasNext".parse().unwrap();
        assert_eq!(path.segments(), &[field("result"), field("hasNext")]);
    }

    #[test]
    fn trailing_wildcard_is_last_segment() {
        let path = FieldPath::parse("result.tags[]").unwrap();
        assert_eq!(path.segments(), &[field("result"), field("tags"), PathSegment::ArrayWildcard]);
    }

    #[test]
    fn nested_wildcards() {
        let path = FieldPath::parse("events[].attendees[].code").unwrap();
        assert_eq!(
            path.segments(),
            &[
                field("events"),
                PathSegment::ArrayWildcard,
                field("attendees"),
                PathSegment::ArrayWildcard,
                field("code"),
            ]
        );
    }

    #[test]
    fn empty_names_are_skipped() {
        let path = FieldPath::parse(".a..b.").unwrap();
        assert_eq!(path.segments(), &[field("a"), field("b")]);
        assert!(FieldPath::parse("").unwrap().is_empty());
    }

    #[test]
    fn numeric_index_is_rejected() {
        let err = FieldPath::parse("result.users[0]").unwrap_err();
        assert_eq!(
            err,
            PathError::UnsupportedBracket {
                path: "result.users[0]".to_string(),
                position: 12,
                found: '0',
            }
        );
        assert!(err.to_string().contains("only '[]' is supported"), "{}", err);
    }

    #[test]
    fn unclosed_bracket_is_rejected() {
        let err = FieldPath::parse("result.users[").unwrap_err();
        assert!(matches!(err, PathError::UnclosedBracket { position: 12, .. }), "{:?}", err);
    }

    #[test]
    fn display_round_trips_canonical_form() {
        let path = FieldPath::parse("result.users[].email").unwrap();
        assert_eq!(path.to_string(), "result.users[].email");
    }
}
