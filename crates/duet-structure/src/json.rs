//! Order-insensitive JSON comparison.
//!
//! Paths are slash-delimited object keys with bracketed array indices, e.g.
//! `config/servers[2]/port`. The root path is the empty string.
//!
//! Object key order never produces a change. An array whose elements are the
//! same multiset in a different order yields a single `Move` at the array's
//! path instead of per-element replacements.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::StructuralConfig;
use crate::error::{StructureError, StructureResult};

/// Patch-style operation of a [`StructuralChange`].
///
/// `Copy` and `Test` complete the patch vocabulary; the comparator never
/// emits them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonOperation {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

/// One path-addressed difference between two JSON trees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructuralChange {
    pub operation: JsonOperation,
    pub path: String,
    /// New value for `Add`, `Replace` and `Move`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Previous value for `Remove`, `Replace` and `Move`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    /// Source path of a `Move`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl StructuralChange {
    fn add(path: String, value: &Value) -> Self {
        Self {
            operation: JsonOperation::Add,
            path,
            value: Some(value.clone()),
            old_value: None,
            from: None,
        }
    }

    fn remove(path: String, old: &Value) -> Self {
        Self {
            operation: JsonOperation::Remove,
            path,
            value: None,
            old_value: Some(old.clone()),
            from: None,
        }
    }

    fn replace(path: String, old: &Value, new: &Value) -> Self {
        Self {
            operation: JsonOperation::Replace,
            path,
            value: Some(new.clone()),
            old_value: Some(old.clone()),
            from: None,
        }
    }

    fn reorder(path: String, old: &Value, new: &Value) -> Self {
        Self {
            operation: JsonOperation::Move,
            from: Some(path.clone()),
            path,
            value: Some(new.clone()),
            old_value: Some(old.clone()),
        }
    }
}

/// The ordered change list of a JSON comparison.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonDiff {
    pub changes: Vec<StructuralChange>,
}

impl JsonDiff {
    /// Returns `true` if the documents are structurally equal.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Number of changes with the given operation.
    pub fn count(&self, operation: JsonOperation) -> usize {
        self.changes
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub fn additions(&self) -> usize {
        self.count(JsonOperation::Add)
    }

    pub fn removals(&self) -> usize {
        self.count(JsonOperation::Remove)
    }

    pub fn replacements(&self) -> usize {
        self.count(JsonOperation::Replace)
    }

    pub fn moves(&self) -> usize {
        self.count(JsonOperation::Move)
    }

    /// First change recorded at `path`.
    pub fn at(&self, path: &str) -> Option<&StructuralChange> {
        self.changes.iter().find(|c| c.path == path)
    }
}

/// Parse JSON text, rejecting empty input.
pub fn parse_json(text: &str) -> StructureResult<Value> {
    parse_side(text, "document")
}

/// Recursive JSON tree comparator.
#[derive(Clone, Debug, Default)]
pub struct JsonComparator {
    config: StructuralConfig,
}

impl JsonComparator {
    pub fn new(config: StructuralConfig) -> Self {
        Self { config }
    }

    /// Parse and compare two JSON texts.
    pub fn compare_str(&self, left: &str, right: &str) -> StructureResult<JsonDiff> {
        let left = parse_side(left, "left")?;
        let right = parse_side(right, "right")?;
        self.compare_values(&left, &right)
    }

    /// Compare two parsed trees.
    pub fn compare_values(&self, left: &Value, right: &Value) -> StructureResult<JsonDiff> {
        let mut diff = JsonDiff::default();
        self.walk(Some(left), Some(right), String::new(), 0, &mut diff.changes)?;
        debug!(changes = diff.len(), "json comparison finished");
        Ok(diff)
    }

    fn walk(
        &self,
        left: Option<&Value>,
        right: Option<&Value>,
        path: String,
        depth: usize,
        out: &mut Vec<StructuralChange>,
    ) -> StructureResult<()> {
        if depth > self.config.max_depth {
            return Err(StructureError::DepthExceeded {
                max: self.config.max_depth,
            });
        }

        let (left, right) = match (left, right) {
            (None, None) => return Ok(()),
            (None, Some(r)) => {
                out.push(StructuralChange::add(path, r));
                return Ok(());
            }
            (Some(l), None) => {
                out.push(StructuralChange::remove(path, l));
                return Ok(());
            }
            (Some(l), Some(r)) => (l, r),
        };

        match (left, right) {
            (Value::Object(lo), Value::Object(ro)) => {
                let keys: BTreeSet<&String> = lo.keys().chain(ro.keys()).collect();
                for key in keys {
                    self.walk(
                        lo.get(key),
                        ro.get(key),
                        child_path(&path, key),
                        depth + 1,
                        out,
                    )?;
                }
            }
            (Value::Array(la), Value::Array(ra)) => {
                if la == ra {
                    return Ok(());
                }
                if is_permutation(la, ra) {
                    out.push(StructuralChange::reorder(path, left, right));
                    return Ok(());
                }
                for i in 0..la.len().max(ra.len()) {
                    self.walk(
                        la.get(i),
                        ra.get(i),
                        format!("{path}[{i}]"),
                        depth + 1,
                        out,
                    )?;
                }
            }
            _ if shape(left) != shape(right) || left != right => {
                out.push(StructuralChange::replace(path, left, right));
            }
            _ => {}
        }
        Ok(())
    }
}

/// Compare two JSON texts with the default configuration.
pub fn compare_json(left: &str, right: &str) -> StructureResult<JsonDiff> {
    JsonComparator::default().compare_str(left, right)
}

/// Compare two parsed JSON trees with the default configuration.
pub fn compare_values(left: &Value, right: &Value) -> StructureResult<JsonDiff> {
    JsonComparator::default().compare_values(left, right)
}

fn parse_side(text: &str, side: &'static str) -> StructureResult<Value> {
    if text.trim().is_empty() {
        return Err(StructureError::EmptyInput {
            format: "JSON",
            side,
        });
    }
    Ok(serde_json::from_str(text)?)
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_owned()
    } else {
        format!("{path}/{key}")
    }
}

#[derive(PartialEq, Eq)]
enum Shape {
    Object,
    Array,
    Scalar,
}

fn shape(value: &Value) -> Shape {
    match value {
        Value::Object(_) => Shape::Object,
        Value::Array(_) => Shape::Array,
        _ => Shape::Scalar,
    }
}

/// Same elements in a different order, compared on canonical serializations.
fn is_permutation(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let sorted = |values: &[Value]| {
        let mut out: Vec<String> = values.iter().map(canonical).collect();
        out.sort_unstable();
        out
    };
    sorted(a) == sorted(b)
}

/// Compact JSON text with object keys sorted at every level, whatever order
/// the map keeps them in.
fn canonical(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, child)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(child, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, child) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(child, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
