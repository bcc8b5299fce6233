//! Value representations.
//!
//! `RawValue` is the dynamically typed value that flows through the mapper:
//! record sources produce it, manual transforms consume and return it, and
//! coercion turns it into the exact variant a target field declares.
//! `FieldValue` connects those variants to concrete Rust field types.

use crate::types::ValueType;
use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::fmt;

/// A single column or field value.
///
/// The variant is the value's runtime type. Integer and float variants keep
/// their width so that a converted value can be checked against the exact
/// type a field declares.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    /// Null / absent value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Single character
    Char(char),

    /// 8-bit signed integer
    Int8(i8),

    /// 16-bit signed integer
    Int16(i16),

    /// 32-bit signed integer
    Int32(i32),

    /// 64-bit signed integer
    Int64(i64),

    /// 8-bit unsigned integer
    UInt8(u8),

    /// 16-bit unsigned integer
    UInt16(u16),

    /// 32-bit unsigned integer
    UInt32(u32),

    /// 64-bit unsigned integer
    UInt64(u64),

    /// 32-bit floating point
    Float32(f32),

    /// 64-bit floating point
    Float64(f64),

    /// String value
    String(String),

    /// Date/time without timezone
    DateTime(NaiveDateTime),
}

impl RawValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The runtime type of this value, or `None` for null.
    pub fn value_type(&self) -> Option<ValueType> {
        let ty = match self {
            Self::Null => return None,
            Self::Bool(_) => ValueType::Bool,
            Self::Char(_) => ValueType::Char,
            Self::Int8(_) => ValueType::Int8,
            Self::Int16(_) => ValueType::Int16,
            Self::Int32(_) => ValueType::Int32,
            Self::Int64(_) => ValueType::Int64,
            Self::UInt8(_) => ValueType::UInt8,
            Self::UInt16(_) => ValueType::UInt16,
            Self::UInt32(_) => ValueType::UInt32,
            Self::UInt64(_) => ValueType::UInt64,
            Self::Float32(_) => ValueType::Float32,
            Self::Float64(_) => ValueType::Float64,
            Self::String(_) => ValueType::String,
            Self::DateTime(_) => ValueType::DateTime,
        };
        Some(ty)
    }

    /// Name of the runtime type, `"null"` for null values. Used in error messages.
    pub fn type_name(&self) -> String {
        self.value_type()
            .map(|ty| ty.to_string())
            .unwrap_or_else(|| "null".to_string())
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i64. Accepts every integer variant that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int8(i) => Some(i64::from(*i)),
            Self::Int16(i) => Some(i64::from(*i)),
            Self::Int32(i) => Some(i64::from(*i)),
            Self::Int64(i) => Some(*i),
            Self::UInt8(i) => Some(i64::from(*i)),
            Self::UInt16(i) => Some(i64::from(*i)),
            Self::UInt32(i) => Some(i64::from(*i)),
            Self::UInt64(i) => i64::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Try to get this value as an f64. Accepts both float variants.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(f) => Some(f64::from(*f)),
            Self::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Int8(i) => write!(f, "{i}"),
            Self::Int16(i) => write!(f, "{i}"),
            Self::Int32(i) => write!(f, "{i}"),
            Self::Int64(i) => write!(f, "{i}"),
            Self::UInt8(i) => write!(f, "{i}"),
            Self::UInt16(i) => write!(f, "{i}"),
            Self::UInt32(i) => write!(f, "{i}"),
            Self::UInt64(i) => write!(f, "{i}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

impl Serialize for RawValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Char(c) => serializer.serialize_char(*c),
            Self::Int8(i) => serializer.serialize_i8(*i),
            Self::Int16(i) => serializer.serialize_i16(*i),
            Self::Int32(i) => serializer.serialize_i32(*i),
            Self::Int64(i) => serializer.serialize_i64(*i),
            Self::UInt8(i) => serializer.serialize_u8(*i),
            Self::UInt16(i) => serializer.serialize_u16(*i),
            Self::UInt32(i) => serializer.serialize_u32(*i),
            Self::UInt64(i) => serializer.serialize_u64(*i),
            Self::Float32(f) => serializer.serialize_f32(*f),
            Self::Float64(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::DateTime(_) => serializer.collect_str(self),
        }
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Float64(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<NaiveDateTime> for RawValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

impl ValueType {
    /// Check whether `value` can be stored, as is, in a field of this type.
    ///
    /// The runtime type must match exactly; a nullable type additionally
    /// admits null.
    pub fn admits(&self, value: &RawValue) -> bool {
        match (self, value) {
            (ValueType::Nullable(_), RawValue::Null) => true,
            (ValueType::Nullable(inner), value) => inner.admits(value),
            (_, RawValue::Null) => false,
            (ty, value) => value.value_type().as_ref() == Some(ty),
        }
    }

    /// The value a field of this type holds before anything is bound to it.
    pub fn zero_value(&self) -> RawValue {
        match self {
            ValueType::Bool => RawValue::Bool(false),
            ValueType::Char => RawValue::Char('\0'),
            ValueType::Int8 => RawValue::Int8(0),
            ValueType::Int16 => RawValue::Int16(0),
            ValueType::Int32 => RawValue::Int32(0),
            ValueType::Int64 => RawValue::Int64(0),
            ValueType::UInt8 => RawValue::UInt8(0),
            ValueType::UInt16 => RawValue::UInt16(0),
            ValueType::UInt32 => RawValue::UInt32(0),
            ValueType::UInt64 => RawValue::UInt64(0),
            ValueType::Float32 => RawValue::Float32(0.0),
            ValueType::Float64 => RawValue::Float64(0.0),
            ValueType::String => RawValue::String(String::new()),
            ValueType::DateTime => RawValue::DateTime(NaiveDateTime::default()),
            ValueType::Nullable(_) | ValueType::Record(_) => RawValue::Null,
        }
    }
}

/// A Rust type that can be stored in a target field.
///
/// `from_raw` is strict: it only accepts the variant matching
/// [`FieldValue::value_type`] and hands any other value back unchanged, so
/// the caller can report what was rejected.
pub trait FieldValue: Sized {
    /// The declared type of a field holding `Self`.
    fn value_type() -> ValueType;

    /// Take the value out of a `RawValue` of the exact matching variant.
    fn from_raw(value: RawValue) -> Result<Self, RawValue>;

    /// Wrap the value into its `RawValue` variant.
    fn into_raw(self) -> RawValue;
}

impl FieldValue for bool {
    fn value_type() -> ValueType {
        ValueType::Bool
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::Bool(b) => Ok(b),
            other => Err(other),
        }
    }

    fn into_raw(self) -> RawValue {
        RawValue::Bool(self)
    }
}

impl FieldValue for char {
    fn value_type() -> ValueType {
        ValueType::Char
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::Char(c) => Ok(c),
            other => Err(other),
        }
    }

    fn into_raw(self) -> RawValue {
        RawValue::Char(self)
    }
}

impl FieldValue for i8 {
    fn value_type() -> ValueType {
        ValueType::Int8
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::Int8(i) => Ok(i),
            other => Err(other),
        }
    }

    fn into_raw(self) -> RawValue {
        RawValue::Int8(self)
    }
}

impl FieldValue for i16 {
    fn value_type() -> ValueType {
        ValueType::Int16
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::Int16(i) => Ok(i),
            other => Err(other),
        }
    }

    fn into_raw(self) -> RawValue {
        RawValue::Int16(self)
    }
}

impl FieldValue for i32 {
    fn value_type() -> ValueType {
        ValueType::Int32
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::Int32(i) => Ok(i),
            other => Err(other),
        }
    }

    fn into_raw(self) -> RawValue {
        RawValue::Int32(self)
    }
}

impl FieldValue for i64 {
    fn value_type() -> ValueType {
        ValueType::Int64
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::Int64(i) => Ok(i),
            other => Err(other),
        }
    }

    fn into_raw(self) -> RawValue {
        RawValue::Int64(self)
    }
}

impl FieldValue for u8 {
    fn value_type() -> ValueType {
        ValueType::UInt8
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::UInt8(i) => Ok(i),
            other => Err(other),
        }
    }

    fn into_raw(self) -> RawValue {
        RawValue::UInt8(self)
    }
}

impl FieldValue for u16 {
    fn value_type() -> ValueType {
        ValueType::UInt16
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::UInt16(i) => Ok(i),
            other => Err(other),
        }
    }

    fn into_raw(self) -> RawValue {
        RawValue::UInt16(self)
    }
}

impl FieldValue for u32 {
    fn value_type() -> ValueType {
        ValueType::UInt32
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::UInt32(i) => Ok(i),
            other => Err(other),
        }
    }

    fn into_raw(self) -> RawValue {
        RawValue::UInt32(self)
    }
}

impl FieldValue for u64 {
    fn value_type() -> ValueType {
        ValueType::UInt64
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::UInt64(i) => Ok(i),
            other => Err(other),
        }
    }

    fn into_raw(self) -> RawValue {
        RawValue::UInt64(self)
    }
}

impl FieldValue for f32 {
    fn value_type() -> ValueType {
        ValueType::Float32
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::Float32(f) => Ok(f),
            other => Err(other),
        }
    }

    fn into_raw(self) -> RawValue {
        RawValue::Float32(self)
    }
}

impl FieldValue for f64 {
    fn value_type() -> ValueType {
        ValueType::Float64
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::Float64(f) => Ok(f),
            other => Err(other),
        }
    }

    fn into_raw(self) -> RawValue {
        RawValue::Float64(self)
    }
}

impl FieldValue for String {
    fn value_type() -> ValueType {
        ValueType::String
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::String(s) => Ok(s),
            other => Err(other),
        }
    }

    fn into_raw(self) -> RawValue {
        RawValue::String(self)
    }
}

impl FieldValue for NaiveDateTime {
    fn value_type() -> ValueType {
        ValueType::DateTime
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::DateTime(dt) => Ok(dt),
            other => Err(other),
        }
    }

    fn into_raw(self) -> RawValue {
        RawValue::DateTime(self)
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn value_type() -> ValueType {
        ValueType::nullable(T::value_type())
    }

    fn from_raw(value: RawValue) -> Result<Self, RawValue> {
        match value {
            RawValue::Null => Ok(None),
            other => T::from_raw(other).map(Some),
        }
    }

    fn into_raw(self) -> RawValue {
        match self {
            Some(value) => value.into_raw(),
            None => RawValue::Null,
        }
    }
}
