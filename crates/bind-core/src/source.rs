//! Record sources: the tabular side of a mapping.
//!
//! A record source exposes the current row of some tabular reader. The binder
//! only ever reads from it; advancing to the next row is the caller's job.

use bind_types::RawValue;

/// Read access to the current row of a tabular data source.
///
/// Indices passed to `column_name`, `is_null` and `value` are always in
/// `0..field_count()`.
pub trait RecordSource {
    /// Number of columns in the current row.
    fn field_count(&self) -> usize;

    /// Name of the column at `index`.
    fn column_name(&self, index: usize) -> &str;

    /// Whether the column at `index` holds a null value.
    fn is_null(&self, index: usize) -> bool;

    /// Value of the column at `index`.
    fn value(&self, index: usize) -> RawValue;
}

impl<S: RecordSource + ?Sized> RecordSource for &S {
    fn field_count(&self) -> usize {
        (**self).field_count()
    }

    fn column_name(&self, index: usize) -> &str {
        (**self).column_name(index)
    }

    fn is_null(&self, index: usize) -> bool {
        (**self).is_null(index)
    }

    fn value(&self, index: usize) -> RawValue {
        (**self).value(index)
    }
}

/// An in-memory row with ordered, named columns.
///
/// Useful for tests and for adapting readers that already materialize rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryRecord {
    columns: Vec<(String, RawValue)>,
}

impl MemoryRecord {
    /// Create a row from `(column name, value)` pairs, in column order.
    pub fn new(columns: Vec<(String, RawValue)>) -> Self {
        Self { columns }
    }

    /// Create an empty row with a builder pattern.
    pub fn builder() -> MemoryRecordBuilder {
        MemoryRecordBuilder {
            columns: Vec::new(),
        }
    }

    /// Get a column value by exact name.
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }
}

impl RecordSource for MemoryRecord {
    fn field_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> &str {
        self.columns
            .get(index)
            .map(|(name, _)| name.as_str())
            .unwrap_or_default()
    }

    fn is_null(&self, index: usize) -> bool {
        self.columns
            .get(index)
            .map_or(true, |(_, value)| value.is_null())
    }

    fn value(&self, index: usize) -> RawValue {
        self.columns
            .get(index)
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    }
}

/// Builder for `MemoryRecord`.
pub struct MemoryRecordBuilder {
    columns: Vec<(String, RawValue)>,
}

impl MemoryRecordBuilder {
    /// Append a column to the row.
    pub fn column(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.columns.push((name.into(), value.into()));
        self
    }

    /// Append a null column to the row.
    pub fn null(self, name: impl Into<String>) -> Self {
        self.column(name, RawValue::Null)
    }

    /// Build the row.
    pub fn build(self) -> MemoryRecord {
        MemoryRecord {
            columns: self.columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_record_builder() {
        let row = MemoryRecord::builder()
            .column("UserId", 5)
            .column("FirstName", "John")
            .null("LastName")
            .build();

        assert_eq!(row.field_count(), 3);
        assert_eq!(row.column_name(1), "FirstName");
        assert_eq!(row.value(0), RawValue::Int32(5));
        assert!(row.is_null(2));
        assert!(!row.is_null(1));
        assert_eq!(row.get("FirstName"), Some(&RawValue::from("John")));
        assert_eq!(
            row.column_names().collect::<Vec<_>>(),
            vec!["UserId", "FirstName", "LastName"]
        );
    }

    #[test]
    fn test_reference_is_a_record_source() {
        fn count(source: impl RecordSource) -> usize {
            source.field_count()
        }

        let row = MemoryRecord::builder().column("A", 1).build();
        assert_eq!(count(&row), 1);
    }
}
