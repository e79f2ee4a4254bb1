//! Dotted path queries over a parsed tree, e.g. `window.someValue[1]`.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::group::Group;
use crate::tree::{AccessError, Kind, Node, Value};

/// A segment in a query path: a child name, optionally indexing into an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub name: String,
    pub index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid path segment `{segment}` in `{path}`")]
    InvalidPath { path: String, segment: String },

    #[error("`{path}`: {source}")]
    Access {
        path: String,
        #[source]
        source: AccessError,
    },
}

fn segment_regex() -> &'static Regex {
    static SEGMENT: OnceLock<Regex> = OnceLock::new();
    SEGMENT.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)(?:\[([0-9]+)\])?$").expect("valid segment regex")
    })
}

/// Split `path` into segments. Only the last segment may carry an index,
/// since arrays never contain groups.
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>, QueryError> {
    let invalid = |segment: &str| QueryError::InvalidPath {
        path: path.to_string(),
        segment: segment.to_string(),
    };

    let parts: Vec<&str> = path.split('.').collect();
    let mut segments = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().copied().enumerate() {
        let caps = segment_regex().captures(part).ok_or_else(|| invalid(part))?;
        let index = match caps.get(2) {
            Some(m) if i + 1 < parts.len() => return Err(invalid(m.as_str())),
            Some(m) => Some(m.as_str().parse::<usize>().map_err(|_| invalid(part))?),
            None => None,
        };
        segments.push(PathSegment {
            name: caps[1].to_string(),
            index,
        });
    }
    Ok(segments)
}

impl Group {
    /// Resolve a dotted path such as `player.inventory.potions.health` or
    /// `window.someValue[1]`.
    pub fn query(&self, path: &str) -> Result<Value<'_>, QueryError> {
        let segments = parse_path(path)?;
        let access = |source: AccessError| QueryError::Access {
            path: path.to_string(),
            source,
        };

        let mut group = self;
        let last = segments.len() - 1;
        for (i, segment) in segments.iter().enumerate() {
            if i < last {
                group = group.get_group(&segment.name).map_err(access)?;
                continue;
            }
            let node = group
                .get(&segment.name)
                .ok_or_else(|| access(AccessError::NotFound(segment.name.clone())))?;
            return match (segment.index, node) {
                (None, node) => Ok(node.as_value()),
                (Some(index), Node::Array(array)) => array.get(index).ok_or_else(|| {
                    access(AccessError::IndexOutOfRange {
                        index,
                        len: array.count(),
                    })
                }),
                (Some(_), other) => Err(access(AccessError::TypeMismatch {
                    expected: Kind::Array,
                    found: other.kind(),
                })),
            };
        }
        unreachable!("split always yields at least one segment")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_segments() {
        assert_eq!(
            parse_path("window.someValue[12]").unwrap(),
            vec![
                PathSegment {
                    name: "window".into(),
                    index: None
                },
                PathSegment {
                    name: "someValue".into(),
                    index: Some(12)
                },
            ]
        );
    }

    #[test]
    fn test_parse_path_rejects_bad_segments() {
        for path in ["", "a..b", "a.1b", "a[x]", "a[1].b", "a b"] {
            assert!(
                matches!(parse_path(path), Err(QueryError::InvalidPath { .. })),
                "path {path:?} should be rejected"
            );
        }
    }
}
