//! Mapping engine that binds tabular records onto typed target values.
//!
//! ```text
//! RecordSource ──► Binder ──► T
//!   (row)          │  ▲
//!                  │  └── MappingConfig (rules, name transformation, ignore-unmapped)
//!                  └───── FieldTable<T> (named, typed setters)
//! ```
//!
//! Every non-null column of the current row is resolved to a field of the
//! target, converted (manual transform or coercion to the rule's or the
//! field's type), optionally trimmed and stored.
//!
//! # Example
//!
//! ```rust
//! use bind_core::{Binder, FieldTable, MemoryRecord, Target};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     user_id: i32,
//!     last_name: String,
//! }
//!
//! impl Target for Person {
//!     fn field_table() -> FieldTable<Self> {
//!         FieldTable::builder()
//!             .field("UserId", |p: &Person| p.user_id, |p, v| p.user_id = v)
//!             .field("LastName", |p: &Person| p.last_name.clone(), |p, v| p.last_name = v)
//!             .build()
//!     }
//! }
//!
//! let row = MemoryRecord::builder()
//!     .column("OperatorId", "5")
//!     .column("SurName", "Smith")
//!     .build();
//!
//! let person: Person = Binder::new(row)
//!     .rename("OperatorId", "UserId")
//!     .rename("SurName", "LastName")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(person, Person { user_id: 5, last_name: "Smith".into() });
//! ```

pub mod binder;
pub mod config;
pub mod directory;
pub mod error;
pub mod names;
pub mod profile;
pub mod source;

pub use binder::Binder;
pub use config::{FieldRule, ManualTransform, MappingConfig, RuleHandle, RuleId};
pub use directory::{FieldTable, FieldTableBuilder, Target, TargetField};
pub use error::{MapperError, Result, TransformError};
pub use names::{names_equal, NameTransformation};
pub use profile::{MappingProfile, ProfileError, ProfileRule};
pub use source::{MemoryRecord, MemoryRecordBuilder, RecordSource};

pub use bind_types::{FieldValue, RawValue, ValueType};
