//! Schema-defined records
//!
//! A [`RecordSchema`] describes a flat record type in YAML, so rows can be
//! bound without a Rust struct for the target:
//!
//! ```yaml
//! name: Person
//! fields:
//!   - name: UserId
//!     type: int?
//!   - name: FirstName
//!     type: string
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bind_core::{FieldTable, RawValue, TargetField, ValueType};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// One field of a schema-defined record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: ValueType,
}

/// A flat record type loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Record type name
    pub name: String,

    /// Fields, in output order
    pub fields: Vec<FieldDefinition>,
}

impl RecordSchema {
    /// Load schema from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read record schema {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse schema from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let schema: RecordSchema =
            serde_yaml::from_str(yaml).context("Failed to parse record schema")?;

        for (index, field) in schema.fields.iter().enumerate() {
            if field.name.is_empty() {
                anyhow::bail!("Field {} of record '{}' has no name", index + 1, schema.name);
            }
            if schema.fields[..index].iter().any(|f| f.name == field.name) {
                anyhow::bail!(
                    "Duplicate field '{}' in record '{}'",
                    field.name,
                    schema.name
                );
            }
        }
        Ok(schema)
    }

    /// Descriptor of the record type itself.
    pub fn record_type(&self) -> ValueType {
        ValueType::record(self.name.clone())
    }

    /// Field table over records of this schema. Setters only accept values
    /// of each field's declared type.
    pub fn field_table(&self) -> FieldTable<DynamicRecord> {
        self.fields
            .iter()
            .enumerate()
            .fold(FieldTable::builder(), |builder, (index, field)| {
                builder.push(TargetField::dynamic(
                    field.name.clone(),
                    field.field_type.clone(),
                    move |record: &DynamicRecord| {
                        record
                            .values
                            .get(index)
                            .map(|(_, value)| value.clone())
                            .unwrap_or_default()
                    },
                    move |record: &mut DynamicRecord, value| {
                        if let Some(slot) = record.values.get_mut(index) {
                            slot.1 = value;
                        }
                    },
                ))
            })
            .build()
    }

    /// A record with every field at its type's zero value.
    pub fn new_record(&self) -> DynamicRecord {
        DynamicRecord {
            values: self
                .fields
                .iter()
                .map(|field| (field.name.clone(), field.field_type.zero_value()))
                .collect(),
        }
    }
}

/// A record whose fields are defined by a [`RecordSchema`].
///
/// Serializes as an object with the fields in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicRecord {
    values: Vec<(String, RawValue)>,
}

impl DynamicRecord {
    /// Get a field value by exact name.
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.values
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// `(name, value)` pairs in schema order.
    pub fn values(&self) -> &[(String, RawValue)] {
        &self.values
    }
}

impl Serialize for DynamicRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
