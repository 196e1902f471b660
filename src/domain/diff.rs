//! Field-by-field diff between two release metadata documents
//!
//! Used for changelog output and version-bump hints. The comparison walks an
//! explicit schema description of the metadata record instead of inspecting
//! the struct at runtime: every field is described as a scalar, list,
//! mapping or nested record, and each container kind has one comparison
//! rule.
//!
//! Field paths follow the metadata's own field names: `version`,
//! `metadata["team"]`, `consumes[0].interface`. List growth and shrink are
//! reported at the list's own name, without an index.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::release::{ConsumedInterface, ReleaseMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

/// One observed difference between the old and new metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    pub field: String,
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<Value>,
}

impl Change {
    fn added(field: impl Into<String>, current: Value) -> Self {
        Self {
            field: field.into(),
            kind: ChangeKind::Added,
            previous: None,
            current: Some(current),
        }
    }

    fn removed(field: impl Into<String>, previous: Value) -> Self {
        Self {
            field: field.into(),
            kind: ChangeKind::Removed,
            previous: Some(previous),
            current: None,
        }
    }

    fn modified(field: impl Into<String>, previous: Value, current: Value) -> Self {
        Self {
            field: field.into(),
            kind: ChangeKind::Modified,
            previous: Some(previous),
            current: Some(current),
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let render = |v: &Option<Value>| match v {
            Some(value) => value.to_string(),
            None => "<none>".to_string(),
        };
        match self.kind {
            ChangeKind::Added => write!(f, "{} added: {}", self.field, render(&self.current)),
            ChangeKind::Removed => {
                write!(f, "{} removed: {}", self.field, render(&self.previous))
            }
            ChangeKind::Modified => write!(
                f,
                "{}: {} -> {}",
                self.field,
                render(&self.previous),
                render(&self.current)
            ),
        }
    }
}

/// Typed description of one metadata field's value
enum FieldValue {
    Scalar(Value),
    List(Vec<FieldValue>),
    Mapping(BTreeMap<String, FieldValue>),
    Record(Vec<(&'static str, FieldValue)>),
}

impl FieldValue {
    /// Collapses the description back into a plain value for reporting
    fn render(&self) -> Value {
        match self {
            FieldValue::Scalar(value) => value.clone(),
            FieldValue::List(items) => Value::Array(items.iter().map(Self::render).collect()),
            FieldValue::Mapping(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.render()))
                    .collect(),
            ),
            FieldValue::Record(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.render()))
                    .collect(),
            ),
        }
    }
}

fn scalar(value: impl Into<Value>) -> FieldValue {
    FieldValue::Scalar(value.into())
}

fn consumed_interface(c: &ConsumedInterface) -> FieldValue {
    FieldValue::Record(vec![
        ("interface", scalar(c.interface())),
        (
            "alias",
            FieldValue::Scalar(match c.alias() {
                Some(alias) => Value::String(alias.to_string()),
                None => Value::Null,
            }),
        ),
    ])
}

/// The schema walked by [`diff`]; one entry per compared metadata field
fn schema(m: &ReleaseMetadata) -> Vec<(&'static str, FieldValue)> {
    vec![
        ("project", scalar(m.project.as_str())),
        ("name", scalar(m.name.as_str())),
        ("version", scalar(m.version.as_str())),
        ("description", scalar(m.description.as_str())),
        (
            "provides",
            FieldValue::List(m.provides.iter().map(|p| scalar(p.as_str())).collect()),
        ),
        (
            "consumes",
            FieldValue::List(m.consumes.iter().map(consumed_interface).collect()),
        ),
        (
            "metadata",
            FieldValue::Mapping(
                m.metadata
                    .iter()
                    .map(|(k, v)| (k.clone(), scalar(v.as_str())))
                    .collect(),
            ),
        ),
    ]
}

/// All field-level differences between two metadata documents, in schema
/// order
pub fn diff(old: &ReleaseMetadata, new: &ReleaseMetadata) -> Vec<Change> {
    let mut changes = Vec::new();
    for ((field, old_value), (_, new_value)) in schema(old).iter().zip(schema(new).iter()) {
        diff_value(field, old_value, new_value, &mut changes);
    }
    changes
}

fn diff_value(path: &str, old: &FieldValue, new: &FieldValue, out: &mut Vec<Change>) {
    match (old, new) {
        (FieldValue::Scalar(a), FieldValue::Scalar(b)) => {
            if a != b {
                out.push(Change::modified(path, a.clone(), b.clone()));
            }
        }
        (FieldValue::List(a), FieldValue::List(b)) => {
            for ix in 0..a.len().max(b.len()) {
                match (a.get(ix), b.get(ix)) {
                    (Some(old_item), Some(new_item)) => {
                        diff_value(&format!("{}[{}]", path, ix), old_item, new_item, out);
                    }
                    (None, Some(new_item)) => out.push(Change::added(path, new_item.render())),
                    (Some(old_item), None) => {
                        out.push(Change::removed(path, old_item.render()))
                    }
                    (None, None) => {}
                }
            }
        }
        (FieldValue::Mapping(a), FieldValue::Mapping(b)) => {
            for (key, old_entry) in a {
                let field = format!("{}[\"{}\"]", path, key);
                match b.get(key) {
                    Some(new_entry) => diff_value(&field, old_entry, new_entry, out),
                    None => out.push(Change::removed(field, old_entry.render())),
                }
            }
            for (key, new_entry) in b {
                if !a.contains_key(key) {
                    let field = format!("{}[\"{}\"]", path, key);
                    out.push(Change::added(field, new_entry.render()));
                }
            }
        }
        (FieldValue::Record(a), FieldValue::Record(b)) => {
            for ((field, old_entry), (_, new_entry)) in a.iter().zip(b.iter()) {
                diff_value(&format!("{}.{}", path, field), old_entry, new_entry, out);
            }
        }
        // schema() always produces parallel shapes; a mismatch means the
        // whole field was replaced
        (old_value, new_value) => {
            out.push(Change::modified(
                path,
                old_value.render(),
                new_value.render(),
            ));
        }
    }
}
