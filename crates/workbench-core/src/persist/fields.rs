//! Per-kind declaration of persisted attributes.
//!
//! Every node kind implements [`PersistedFields`] exactly once. Whatever
//! `write_fields` emits is persisted and restored by `read_fields`; any other
//! attribute of the kind is transient and comes back at its default after a
//! load.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Result, WorkbenchError};

/// Declares which attributes of a node kind survive a restart.
pub trait PersistedFields {
    /// Writes the persisted attributes, in declaration order.
    fn write_fields(&self, fields: &mut FieldWriter) -> Result<()>;

    /// Restores the persisted attributes. Absent fields keep their defaults.
    fn read_fields(&mut self, fields: &FieldReader<'_>) -> Result<()>;
}

/// Ordered sink for persisted fields.
#[derive(Debug, Default)]
pub struct FieldWriter {
    fields: Map<String, Value>,
}

impl FieldWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.fields.insert(name.to_string(), value);
        Ok(())
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

/// Read access to the persisted fields of one node record.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    type_tag: &'a str,
    fields: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    pub fn new(type_tag: &'a str, fields: &'a Map<String, Value>) -> Self {
        Self { type_tag, fields }
    }

    /// Returns the field value, `None` if absent or null.
    ///
    /// A value of the wrong JSON type is a malformed document.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                WorkbenchError::malformed(format!(
                    "field '{}' of '{}': {}",
                    name, self.type_tag, e
                ))
            }),
        }
    }

    /// Overwrites `target` when the field is present.
    pub fn read_into<T: DeserializeOwned>(&self, name: &str, target: &mut T) -> Result<()> {
        if let Some(value) = self.get(name)? {
            *target = value;
        }
        Ok(())
    }
}
