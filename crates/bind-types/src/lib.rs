//! Value and type model for rowbind.
//!
//! This crate provides the foundational types shared by the mapper crates:
//!
//! - [`RawValue`] - Closed tagged value read from a record source or produced by a transform
//! - [`ValueType`] - Declared type of a target field or a coercion destination
//! - [`FieldValue`] - Bridge between `RawValue` variants and Rust field types
//! - [`coerce`] - Generic value-to-type conversion
//!
//! # Architecture
//!
//! ```text
//! bind-types (this crate)
//!    │
//!    ├─── bind-core           (field directory, mapping configuration, binder)
//!    │
//!    └─── rowbind-csv-source  (CSV rows as record sources)
//! ```
//!
//! # Example
//!
//! ```rust
//! use bind_types::{coerce, RawValue, ValueType};
//!
//! let value = coerce(RawValue::from("42"), &ValueType::Int32).unwrap();
//! assert_eq!(value, RawValue::Int32(42));
//!
//! let nullable = ValueType::nullable(ValueType::Int32);
//! assert_eq!(coerce(RawValue::Null, &nullable).unwrap(), RawValue::Null);
//! ```

pub mod coerce;
pub mod types;
pub mod values;

pub use coerce::{coerce, parse_datetime, ConversionError};
pub use types::{UnknownTypeError, ValueType};
pub use values::{FieldValue, RawValue};
