//! Dotted-path lookup into a JSON value tree.
//!
//! Responsibilities:
//! - Split keys such as `db.primary.host` into path segments.
//! - Walk a `serde_json::Value` one segment at a time.
//!
//! Invariants:
//! - `\.` is a literal dot inside a segment and `\\` is a literal backslash.
//! - Array segments are non-negative decimal positions; `#` yields an array's length.
//! - Scalars have no children, and an empty key resolves to nothing.

use serde_json::Value;

/// Segment that resolves to the length of an array.
pub const LENGTH_SEGMENT: &str = "#";

/// Split a dotted key into its segments, honoring `\.` and `\\` escapes.
pub fn split_path(key: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = key.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped @ ('.' | '\\')) => current.push(escaped),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            '.' => segments.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    segments.push(current);
    segments
}

/// Resolve `key` against `root`, borrowing the matched node.
///
/// The `#` length segment produces a new value and is therefore only handled
/// by [`lookup`].
pub fn resolve<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return None;
    }
    split_path(key)
        .iter()
        .try_fold(root, |node, segment| child(node, segment))
}

/// Resolve `key` against `root`, returning an owned copy of the match.
pub fn lookup(root: &Value, key: &str) -> Option<Value> {
    if key.is_empty() {
        return None;
    }

    let segments = split_path(key);
    let (last, parents) = segments.split_last()?;
    let parent = parents
        .iter()
        .try_fold(root, |node, segment| child(node, segment))?;

    match (parent, last.as_str()) {
        (Value::Array(items), LENGTH_SEGMENT) => Some(Value::from(items.len())),
        (node, segment) => child(node, segment).cloned(),
    }
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            segment.parse::<usize>().ok().and_then(|i| items.get(i))
        }
        _ => None,
    }
}
