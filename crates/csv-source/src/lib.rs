//! CSV record source for rowbind
//!
//! This module exposes CSV input, one row at a time, as a
//! [`bind_core::RecordSource`] so rows can be bound with a `Binder`.

mod source;

pub use source::{Config, CsvRecordSource};
