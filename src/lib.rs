//! rowbind library
//!
//! Binds tabular rows onto typed records.
//!
//! # Crates
//!
//! - `bind_types` - raw values, type descriptors and coercion
//! - `bind_core` - field tables, mapping configuration, the binder and mapping profiles
//! - `rowbind_csv_source` - CSV input as a record source
//!
//! This crate adds schema-defined records (records described in YAML instead
//! of a Rust struct) and the pieces behind the `rowbind` command line.
//!
//! # CLI Usage
//!
//! ```bash
//! # Map a CSV file onto a schema, one JSON object per row
//! rowbind map --schema person.yaml --input people.csv --profile mapping.yaml
//!
//! # Read stdin, fall back to stripping underscores from column names
//! cat people.csv | rowbind map --schema person.yaml --input - --name-transform "_="
//!
//! # List the fields of a schema
//! rowbind fields --schema person.yaml
//! ```

pub mod map;
pub mod schema;

pub use bind_core;
pub use bind_types;
pub use rowbind_csv_source as csv;

pub use map::{list_fields, map_rows, MapArgs};
pub use schema::{DynamicRecord, FieldDefinition, RecordSchema};
