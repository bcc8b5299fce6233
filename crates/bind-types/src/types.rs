//! Field type descriptors.
//!
//! This module defines `ValueType`, the semantic type of a target field or of a
//! coercion destination. Every non-null `RawValue` variant has a matching
//! `ValueType`, plus two structural forms: `Nullable` ("nullable of X") and
//! `Record` (a composite type that values are never coerced into).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Semantic type descriptor for target fields and coercion destinations.
///
/// # YAML Format
///
/// Simple types are written as strings, a trailing `?` marks them nullable:
/// ```yaml
/// type: int
/// type: string
/// type: int?
/// ```
///
/// Structural types use object format:
/// ```yaml
/// type:
///   type: nullable
///   inner: double
/// type:
///   type: record
///   name: Person
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Boolean value
    Bool,

    /// Single Unicode scalar value
    Char,

    // Signed integers
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,

    // Unsigned integers
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit unsigned integer
    UInt64,

    // Floating point
    /// 32-bit IEEE 754 floating point
    Float32,
    /// 64-bit IEEE 754 floating point
    Float64,

    /// UTF-8 string
    String,

    /// Date and time without timezone
    DateTime,

    /// Nullable wrapper around another type
    Nullable(Box<ValueType>),

    /// Composite record type, identified by name. Never a coercion destination.
    Record(String),
}

impl ValueType {
    /// Create a nullable type around `inner`.
    pub fn nullable(inner: ValueType) -> Self {
        Self::Nullable(Box::new(inner))
    }

    /// Create a record type with the given name.
    pub fn record(name: impl Into<String>) -> Self {
        Self::Record(name.into())
    }

    /// The type with every `Nullable` layer removed.
    pub fn underlying(&self) -> &ValueType {
        match self {
            Self::Nullable(inner) => inner.underlying(),
            other => other,
        }
    }

    /// Check if this type is a primitive: a boolean, a char or a fixed-width number.
    ///
    /// Strings, date-times and records are not primitive.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Char
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
                | Self::Float32
                | Self::Float64
        )
    }

    /// Check if this type is a primitive or a nullable primitive.
    pub fn is_primitive_or_nullable(&self) -> bool {
        self.underlying().is_primitive()
    }

    /// Check if this type represents an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
        )
    }

    /// Check if this type represents a floating point type.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Canonical short name used by `Display` and serialization.
    fn simple_name(&self) -> Option<&'static str> {
        let name = match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::DateTime => "datetime",
            Self::Nullable(_) | Self::Record(_) => return None,
        };
        Some(name)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nullable(inner) => write!(f, "{inner}?"),
            Self::Record(name) => write!(f, "record<{name}>"),
            other => f.write_str(other.simple_name().unwrap_or("unknown")),
        }
    }
}

/// Error returned when a type name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value type: {0}")]
pub struct UnknownTypeError(pub String);

impl FromStr for ValueType {
    type Err = UnknownTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if let Some(inner) = name.strip_suffix('?') {
            return Ok(ValueType::nullable(inner.parse()?));
        }
        if let Some(rest) = name
            .strip_prefix("record<")
            .and_then(|r| r.strip_suffix('>'))
        {
            return Ok(ValueType::record(rest.trim()));
        }

        match name.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(ValueType::Bool),
            "char" => Ok(ValueType::Char),
            "int8" | "tiny_int" | "tinyint" | "sbyte" => Ok(ValueType::Int8),
            "int16" | "small_int" | "smallint" | "short" => Ok(ValueType::Int16),
            "int32" | "int" | "integer" => Ok(ValueType::Int32),
            "int64" | "big_int" | "bigint" | "long" => Ok(ValueType::Int64),
            "uint8" | "byte" => Ok(ValueType::UInt8),
            "uint16" | "ushort" => Ok(ValueType::UInt16),
            "uint32" | "uint" => Ok(ValueType::UInt32),
            "uint64" | "ulong" => Ok(ValueType::UInt64),
            "float32" | "float" | "real" | "single" => Ok(ValueType::Float32),
            "float64" | "double" => Ok(ValueType::Float64),
            "string" | "text" => Ok(ValueType::String),
            "datetime" | "date_time" | "timestamp" => Ok(ValueType::DateTime),
            _ => Err(UnknownTypeError(name.to_string())),
        }
    }
}

// Custom serialization/deserialization for ValueType
// Supports both simple string format ("int", "string?") and object format ({"type": "record", "name": "Person"})

impl Serialize for ValueType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        match self {
            Self::Record(name) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "record")?;
                map.serialize_entry("name", name)?;
                map.end()
            }
            Self::Nullable(inner) if matches!(inner.as_ref(), Self::Record(_)) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "nullable")?;
                map.serialize_entry("inner", inner)?;
                map.end()
            }
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for ValueType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, MapAccess, Visitor};

        struct ValueTypeVisitor;

        impl<'de> Visitor<'de> for ValueTypeVisitor {
            type Value = ValueType;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or map representing a ValueType")
            }

            // Handle string format: "int", "string?", etc.
            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                value.parse().map_err(E::custom)
            }

            // Handle map format: {"type": "nullable", "inner": "int"}
            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut type_name: Option<String> = None;
                let mut fields: HashMap<String, serde_yaml::Value> = HashMap::new();

                while let Some(key) = map.next_key::<String>()? {
                    if key == "type" {
                        type_name = Some(map.next_value()?);
                    } else {
                        fields.insert(key, map.next_value()?);
                    }
                }

                let type_name = type_name.ok_or_else(|| M::Error::missing_field("type"))?;

                match type_name.as_str() {
                    "nullable" => {
                        let inner: ValueType = get_field_required(&fields, "inner")?;
                        Ok(ValueType::nullable(inner))
                    }
                    "record" => {
                        let name: String = get_field_required(&fields, "name")?;
                        Ok(ValueType::Record(name))
                    }
                    simple => simple.parse().map_err(M::Error::custom),
                }
            }
        }

        deserializer.deserialize_any(ValueTypeVisitor)
    }
}

fn get_field_required<T: for<'de> Deserialize<'de>, E: serde::de::Error>(
    fields: &HashMap<String, serde_yaml::Value>,
    key: &'static str,
) -> Result<T, E> {
    let value = fields.get(key).ok_or_else(|| E::missing_field(key))?;
    serde_yaml::from_value(value.clone())
        .map_err(|e| E::custom(format!("invalid field '{key}': {e}")))
}
