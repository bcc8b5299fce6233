//! Error types for record binding.
//!
//! Every error is fatal to the `build()` call that produced it; the binder
//! never substitutes defaults or retries.

use bind_types::{ConversionError, ValueType};
use thiserror::Error;

/// Error raised by a user-supplied manual transform.
pub type TransformError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while configuring a binder or binding a record.
#[derive(Debug, Error)]
pub enum MapperError {
    /// The resolved target name has no matching field and unmapped fields are not ignored.
    #[error("Field '{field}' not found in destination record")]
    FieldNotFound { field: String },

    /// Coercion could not represent the column value as the destination type.
    #[error("Cannot convert column '{column}' from {source_type} to {target}: {cause}")]
    ConversionFailed {
        column: String,
        source_type: String,
        target: ValueType,
        #[source]
        cause: ConversionError,
    },

    /// The converted value's runtime type does not match the field's declared type.
    #[error("Cast from {value_type} to {declared} is not valid for field '{field}'")]
    InvalidCast {
        field: String,
        value_type: String,
        declared: ValueType,
    },

    /// A typed rule was registered with a destination that is not a primitive
    /// or nullable primitive.
    #[error("Destination type {requested} for '{field}' is not a primitive or nullable primitive type")]
    InvalidConfiguration { field: String, requested: ValueType },

    /// A manual transform returned an error.
    #[error("Manual transform {transform} failed for column '{column}': {cause}")]
    TransformFailed {
        column: String,
        transform: &'static str,
        #[source]
        cause: TransformError,
    },
}

/// Result type for binder operations.
pub type Result<T> = std::result::Result<T, MapperError>;
