//! Replay script format.
//!
//! Scripts are YAML (JSON parses too, being a subset):
//!
//! ```yaml
//! initial:                 # optional, installed with a full pass
//!   - { ref: a, title: Alpha }
//!   - { ref: b, title: Beta }
//! steps:
//!   - patch: { a: { title: Renamed } }      # keyed merge
//!   - patch: [ { ref: b }, { ref: a } ]     # full pass
//!   - add: { ref: c }                       # object or list of objects
//!   - insert: { at: 0, item: { ref: d } }
//!   - move: { ref: d, to: 3 }
//!   - remove: { ref: c }
//!   - remove_at: 0
//!   - clear
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use roster_core::{Fields, Ingest, Record};

/// A parsed replay script.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default)]
    pub initial: Vec<Value>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One list operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Patch(Value),
    Add(Value),
    Insert {
        at: usize,
        item: Value,
    },
    Move {
        #[serde(rename = "ref")]
        item_ref: String,
        to: usize,
    },
    Remove {
        #[serde(rename = "ref")]
        item_ref: String,
    },
    RemoveAt(usize),
    Clear,
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Step::Patch(Value::Object(_)) => "patch (keyed)",
            Step::Patch(Value::Array(_)) => "patch (sequence)",
            Step::Patch(_) => "patch (ignored)",
            Step::Add(_) => "add",
            Step::Insert { .. } => "insert",
            Step::Move { .. } => "move",
            Step::Remove { .. } => "remove",
            Step::RemoveAt(_) => "remove_at",
            Step::Clear => "clear",
        }
    }
}

/// Read and parse a script file.
pub fn load(path: &Path) -> Result<Script> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse script {}", path.display()))
}

/// Read a YAML/JSON document into a JSON value.
pub fn load_value(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

/// Descriptor for a single object.
pub fn fields(value: &Value) -> Result<Fields> {
    if !value.is_object() {
        bail!("expected an object, got {value}");
    }
    serde_json::from_value(value.clone()).context("invalid item fields")
}

/// `add` payload: an object, or a (nested) list of objects.
pub fn ingest(value: &Value) -> Result<Ingest<Record, Fields>> {
    match value {
        Value::Array(values) => Ok(Ingest::Many(
            values.iter().map(ingest).collect::<Result<Vec<_>>>()?,
        )),
        other => Ok(Ingest::Fields(fields(other)?)),
    }
}
