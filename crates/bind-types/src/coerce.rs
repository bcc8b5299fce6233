//! Value coercion: `RawValue` → the variant a destination `ValueType` requires.
//!
//! Coercion is the generic conversion applied when no manual transform is
//! configured for a column. Every supported pairing is listed explicitly;
//! anything else is reported as [`ConversionError::Unsupported`].
//!
//! | destination | accepted sources |
//! |-------------|------------------|
//! | bool        | bool, integers and floats (non-zero is true), `"true"`/`"false"` |
//! | integers    | integers (range checked), floats (rounded half to even), bool, char, numeric strings |
//! | floats      | integers, floats, bool, numeric strings |
//! | char        | char, integers that are valid code points, one-character strings |
//! | string      | anything |
//! | datetime    | datetime, ISO 8601 / RFC 3339 strings |
//! | `T?`        | null, or anything accepted by `T` |

use crate::types::ValueType;
use crate::values::RawValue;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Error returned when a value cannot be represented as the destination type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The source text is not a valid representation of the destination type.
    #[error("'{value}' is not a valid {target}")]
    InvalidFormat { value: String, target: ValueType },

    /// The source value does not fit into the destination type.
    #[error("{value} ({source_type}) is out of range for {target}")]
    OutOfRange {
        value: String,
        source_type: String,
        target: ValueType,
    },

    /// No conversion is defined between the two types.
    #[error("no conversion from {source_type} to {target}")]
    Unsupported {
        source_type: String,
        target: ValueType,
    },

    /// Null cannot be stored in a non-nullable destination.
    #[error("null cannot be converted to non-nullable {target}")]
    NullValue { target: ValueType },
}

/// Convert `value` into the exact variant required by `target`.
///
/// A nullable destination accepts null and otherwise coerces to its inner
/// type. Values already of the destination type are returned unchanged.
pub fn coerce(value: RawValue, target: &ValueType) -> Result<RawValue, ConversionError> {
    if let ValueType::Nullable(inner) = target {
        if value.is_null() {
            return Ok(RawValue::Null);
        }
        return coerce(value, inner);
    }

    if value.is_null() {
        return Err(ConversionError::NullValue {
            target: target.clone(),
        });
    }

    if target.admits(&value) {
        return Ok(value);
    }

    match target {
        ValueType::Bool => to_bool(value, target),
        ValueType::Char => to_char(value, target),
        ty if ty.is_integer() => to_integer(value, target),
        ty if ty.is_float() => to_float(value, target),
        ValueType::String => Ok(RawValue::String(value.to_string())),
        ValueType::DateTime => to_datetime(value, target),
        _ => Err(unsupported(&value, target)),
    }
}

/// Parse a date/time string.
///
/// Tries RFC 3339 first (converted to UTC), then `YYYY-MM-DDTHH:MM:SS[.f]`,
/// `YYYY-MM-DD HH:MM:SS[.f]` and finally a bare `YYYY-MM-DD` at midnight.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ndt);
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ndt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

fn unsupported(value: &RawValue, target: &ValueType) -> ConversionError {
    ConversionError::Unsupported {
        source_type: value.type_name(),
        target: target.clone(),
    }
}

fn invalid_format(value: &str, target: &ValueType) -> ConversionError {
    ConversionError::InvalidFormat {
        value: value.to_string(),
        target: target.clone(),
    }
}

fn out_of_range(value: &RawValue, target: &ValueType) -> ConversionError {
    ConversionError::OutOfRange {
        value: value.to_string(),
        source_type: value.type_name(),
        target: target.clone(),
    }
}

/// Widen any integer variant; `None` for everything else.
fn integer_of(value: &RawValue) -> Option<i128> {
    match value {
        RawValue::Int8(i) => Some(i128::from(*i)),
        RawValue::Int16(i) => Some(i128::from(*i)),
        RawValue::Int32(i) => Some(i128::from(*i)),
        RawValue::Int64(i) => Some(i128::from(*i)),
        RawValue::UInt8(i) => Some(i128::from(*i)),
        RawValue::UInt16(i) => Some(i128::from(*i)),
        RawValue::UInt32(i) => Some(i128::from(*i)),
        RawValue::UInt64(i) => Some(i128::from(*i)),
        _ => None,
    }
}

fn to_bool(value: RawValue, target: &ValueType) -> Result<RawValue, ConversionError> {
    if let Some(i) = integer_of(&value) {
        return Ok(RawValue::Bool(i != 0));
    }
    match &value {
        RawValue::Float32(f) => Ok(RawValue::Bool(*f != 0.0)),
        RawValue::Float64(f) => Ok(RawValue::Bool(*f != 0.0)),
        RawValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(RawValue::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(RawValue::Bool(false))
            } else {
                Err(invalid_format(s, target))
            }
        }
        _ => Err(unsupported(&value, target)),
    }
}

fn to_char(value: RawValue, target: &ValueType) -> Result<RawValue, ConversionError> {
    if let Some(i) = integer_of(&value) {
        return u32::try_from(i)
            .ok()
            .and_then(char::from_u32)
            .map(RawValue::Char)
            .ok_or_else(|| out_of_range(&value, target));
    }
    match &value {
        RawValue::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(RawValue::Char(c)),
                _ => Err(invalid_format(s, target)),
            }
        }
        _ => Err(unsupported(&value, target)),
    }
}

fn to_integer(value: RawValue, target: &ValueType) -> Result<RawValue, ConversionError> {
    let wide = match &value {
        RawValue::Bool(b) => i128::from(*b),
        RawValue::Char(c) => i128::from(u32::from(*c)),
        RawValue::Float32(f) => float_to_wide(f64::from(*f)).ok_or_else(|| out_of_range(&value, target))?,
        RawValue::Float64(f) => float_to_wide(*f).ok_or_else(|| out_of_range(&value, target))?,
        RawValue::String(s) => s.trim().parse::<i128>().map_err(|_| {
            if is_integer_text(s) {
                out_of_range(&value, target)
            } else {
                invalid_format(s, target)
            }
        })?,
        other => match integer_of(other) {
            Some(i) => i,
            None => return Err(unsupported(&value, target)),
        },
    };

    let converted = match target {
        ValueType::Int8 => i8::try_from(wide).map(RawValue::Int8),
        ValueType::Int16 => i16::try_from(wide).map(RawValue::Int16),
        ValueType::Int32 => i32::try_from(wide).map(RawValue::Int32),
        ValueType::Int64 => i64::try_from(wide).map(RawValue::Int64),
        ValueType::UInt8 => u8::try_from(wide).map(RawValue::UInt8),
        ValueType::UInt16 => u16::try_from(wide).map(RawValue::UInt16),
        ValueType::UInt32 => u32::try_from(wide).map(RawValue::UInt32),
        ValueType::UInt64 => u64::try_from(wide).map(RawValue::UInt64),
        _ => return Err(unsupported(&value, target)),
    };
    converted.map_err(|_| out_of_range(&value, target))
}

/// Optional sign followed by at least one ASCII digit.
fn is_integer_text(s: &str) -> bool {
    let s = s.trim();
    let digits = s.strip_prefix(|c| c == '+' || c == '-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Round half to even; `None` for NaN and infinities.
fn float_to_wide(f: f64) -> Option<i128> {
    if !f.is_finite() {
        return None;
    }
    // `as` saturates, and the later narrowing rejects anything that saturated.
    Some(f.round_ties_even() as i128)
}

fn to_float(value: RawValue, target: &ValueType) -> Result<RawValue, ConversionError> {
    let wide = if let Some(i) = integer_of(&value) {
        i as f64
    } else {
        match &value {
            RawValue::Bool(b) => f64::from(u8::from(*b)),
            RawValue::Float32(f) => f64::from(*f),
            RawValue::Float64(f) => *f,
            RawValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid_format(s, target))?,
            _ => return Err(unsupported(&value, target)),
        }
    };

    match target {
        ValueType::Float64 => Ok(RawValue::Float64(wide)),
        ValueType::Float32 => {
            let narrow = wide as f32;
            if wide.is_finite() && narrow.is_infinite() {
                Err(out_of_range(&value, target))
            } else {
                Ok(RawValue::Float32(narrow))
            }
        }
        _ => Err(unsupported(&value, target)),
    }
}

fn to_datetime(value: RawValue, target: &ValueType) -> Result<RawValue, ConversionError> {
    match &value {
        RawValue::String(s) => parse_datetime(s)
            .map(RawValue::DateTime)
            .ok_or_else(|| invalid_format(s, target)),
        _ => Err(unsupported(&value, target)),
    }
}
