//! JSON-backed item and descriptor.
//!
//! A [`Fields`] descriptor is a JSON object. Two keys are reserved:
//! - `ref`: identity key, copied onto the record
//! - `__create`: asks a keyed merge to create the record when the key is unknown
//!
//! Every other key is merged into [`Record::fields`] as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ListError;
use crate::item::{Descriptor, Item, ItemFactory};

pub const REF_KEY: &str = "ref";
pub const CREATE_KEY: &str = "__create";

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Descriptor made of plain JSON fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(pub Map<String, Value>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Shorthand for `Fields::new().with("ref", item_ref)`.
    pub fn keyed(item_ref: impl Into<String>) -> Self {
        let item_ref: String = item_ref.into();
        Self::new().with(REF_KEY, item_ref)
    }

    /// Sets the reserved creation flag.
    #[must_use]
    pub fn creating(self) -> Self {
        self.with(CREATE_KEY, true)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl Descriptor for Fields {
    fn item_ref(&self) -> Option<&str> {
        self.0.get(REF_KEY).and_then(Value::as_str)
    }

    fn creates(&self) -> bool {
        self.0.get(CREATE_KEY).is_some_and(truthy)
    }
}

/// `null`, `false`, `0` and `""` are falsy; everything else is truthy.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Item holding arbitrary JSON fields and an optional ref.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub item_ref: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn with_ref(item_ref: impl Into<String>) -> Self {
        Self {
            item_ref: Some(item_ref.into()),
            fields: Map::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl Item for Record {
    type Descriptor = Fields;

    fn item_ref(&self) -> Option<&str> {
        self.item_ref.as_deref()
    }

    fn set_item_ref(&mut self, item_ref: String) {
        self.item_ref = Some(item_ref);
    }

    fn patch(&mut self, descriptor: &Fields) {
        for (key, value) in &descriptor.0 {
            match key.as_str() {
                CREATE_KEY => {}
                REF_KEY => match value {
                    Value::String(r) => self.item_ref = Some(r.clone()),
                    Value::Null => self.item_ref = None,
                    other => tracing::debug!("ignoring non-string ref {other}"),
                },
                _ => {
                    self.fields.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

/// Factory for [`Record`]s. A new record starts out as its descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFactory;

impl ItemFactory for RecordFactory {
    type Item = Record;

    fn create_item(&mut self, descriptor: &Fields) -> Result<Record, ListError> {
        let mut record = Record::default();
        record.patch(descriptor);
        Ok(record)
    }

    fn is_item(&self, _item: &Record) -> bool {
        true
    }
}
