//! The binder: turns the current row of a record source into a target value.

use std::sync::Arc;

use bind_types::{coerce, FieldValue, RawValue, ValueType};
use tracing::{debug, trace};

use crate::config::{FieldRule, MappingConfig};
use crate::directory::{FieldTable, Target, TargetField};
use crate::error::{MapperError, Result, TransformError};
use crate::source::RecordSource;

type Factory<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Binds rows of a record source to instances of `T`.
///
/// Rules and global switches are added through the by-value fluent methods;
/// `build` then maps the source's current row. The binder never advances the
/// source, so cursor-style sources can be moved forward through
/// [`Binder::source_mut`] between builds.
pub struct Binder<T, S> {
    source: S,
    config: MappingConfig,
    fields: FieldTable<T>,
    factory: Factory<T>,
}

impl<T: Target, S: RecordSource> Binder<T, S> {
    /// Create a binder for a target type with a registered field table.
    pub fn new(source: S) -> Self {
        Self::with_field_table(source, T::field_table(), T::default)
    }
}

impl<T: 'static, S: RecordSource> Binder<T, S> {
    /// Create a binder from an explicit field table and instance factory.
    pub fn with_field_table<F>(source: S, fields: FieldTable<T>, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            source,
            config: MappingConfig::default(),
            fields,
            factory: Arc::new(factory),
        }
    }

    /// Replace the whole mapping configuration.
    pub fn with_config(mut self, config: MappingConfig) -> Self {
        self.config = config;
        self
    }

    /// Adjust the mapping configuration in place.
    pub fn configure(mut self, f: impl FnOnce(&mut MappingConfig)) -> Self {
        f(&mut self.config);
        self
    }

    /// Add a rename/retype rule for `source_field`.
    pub fn rule(
        mut self,
        source_field: impl Into<String>,
        target_field: Option<&str>,
        target_type: Option<ValueType>,
    ) -> Self {
        self.config
            .add_rule(source_field, target_field, target_type);
        self
    }

    /// Bind `source_field` to the field called `target_field`.
    pub fn rename(self, source_field: impl Into<String>, target_field: &str) -> Self {
        self.rule(source_field, Some(target_field), None)
    }

    /// Coerce `source_field` to the field type of `V` before binding.
    pub fn typed_rule<V: FieldValue>(
        mut self,
        source_field: impl Into<String>,
        target_field: Option<&str>,
    ) -> Result<Self> {
        self.config
            .add_typed_rule::<V>(source_field, target_field)?;
        Ok(self)
    }

    /// Coerce `source_field` to `target_type` before binding.
    pub fn typed_rule_as(
        mut self,
        source_field: impl Into<String>,
        target_type: ValueType,
        target_field: Option<&str>,
    ) -> Result<Self> {
        self.config
            .add_typed_rule_as(source_field, target_type, target_field)?;
        Ok(self)
    }

    /// Convert `source_field` with `transform` instead of coercion.
    pub fn manual_rule<F>(
        mut self,
        source_field: impl Into<String>,
        transform: F,
        target_field: Option<&str>,
    ) -> Self
    where
        F: Fn(RawValue) -> std::result::Result<RawValue, TransformError> + Send + Sync + 'static,
    {
        self.config
            .add_manual_rule(source_field, transform, target_field);
        self
    }

    /// Trim string values bound through the most recently added rule.
    pub fn trim_last(mut self) -> Self {
        self.config.set_trim_on_last();
        self
    }

    /// Set the fallback name transformation.
    pub fn name_transformation(
        mut self,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        self.config.set_name_transformation(pattern, replacement);
        self
    }

    /// Skip columns that do not resolve to a field instead of failing.
    pub fn ignore_unmapped(mut self, ignore: bool) -> Self {
        self.config.set_ignore_unmapped(ignore);
        self
    }

    /// The mapping configuration used by [`Binder::build`].
    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Field directory of the target type.
    pub fn field_table(&self) -> &FieldTable<T> {
        &self.fields
    }

    /// The record source rows are read from.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the source, e.g. to advance a cursor between builds.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Map the source's current row to a fresh instance of `T`.
    ///
    /// Columns are visited in source order. Null columns are skipped and the
    /// first failure aborts the build.
    pub fn build(&self) -> Result<T> {
        let mut instance = (self.factory)();

        for index in 0..self.source.field_count() {
            let column = self.source.column_name(index);
            if self.source.is_null(index) {
                trace!("Skipping null column '{column}'");
                continue;
            }

            let rule = self.config.rule_for(column);
            let field = match self.resolve_field(column, rule) {
                Ok(field) => field,
                Err(target_name) if self.config.ignore_unmapped() => {
                    debug!("Ignoring unmapped column '{column}' (target '{target_name}')");
                    continue;
                }
                Err(target_name) => {
                    return Err(MapperError::FieldNotFound { field: target_name });
                }
            };

            let mut value = self.convert(column, index, rule, field)?;
            if let (Some(rule), RawValue::String(text)) = (rule, &mut value) {
                if rule.trim {
                    *text = text.trim().to_string();
                }
            }

            debug!("Binding column '{column}' to field '{}'", field.name());
            field
                .set(&mut instance, value)
                .map_err(|rejected| MapperError::InvalidCast {
                    field: field.name().to_string(),
                    value_type: rejected.type_name(),
                    declared: field.declared_type().clone(),
                })?;
        }

        Ok(instance)
    }

    /// Resolve the field a column binds to. On failure, the last name tried is
    /// returned.
    fn resolve_field(
        &self,
        column: &str,
        rule: Option<&FieldRule>,
    ) -> std::result::Result<&TargetField<T>, String> {
        let candidate = rule
            .and_then(|rule| rule.target_field.as_deref())
            .unwrap_or(column);

        if let Some(field) = self.fields.resolve(candidate) {
            return Ok(field);
        }

        match self.config.name_transformation() {
            Some(transformation) => {
                let transformed = transformation.apply(candidate);
                trace!("Name '{candidate}' did not resolve, trying '{transformed}'");
                self.fields.resolve(&transformed).ok_or(transformed)
            }
            None => Err(candidate.to_string()),
        }
    }

    fn convert(
        &self,
        column: &str,
        index: usize,
        rule: Option<&FieldRule>,
        field: &TargetField<T>,
    ) -> Result<RawValue> {
        let raw = self.source.value(index);

        if let Some(transform) = rule.and_then(|rule| rule.transform.as_ref()) {
            return transform
                .apply(raw)
                .map_err(|cause| MapperError::TransformFailed {
                    column: column.to_string(),
                    transform: transform.identity(),
                    cause,
                });
        }

        let target = rule
            .and_then(|rule| rule.target_type.as_ref())
            .unwrap_or_else(|| field.declared_type());
        let source_type = raw.type_name();
        coerce(raw, target).map_err(|cause| MapperError::ConversionFailed {
            column: column.to_string(),
            source_type,
            target: target.clone(),
            cause,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryRecord;

    #[derive(Debug, Default, PartialEq)]
    struct Note {
        id: i64,
        title: String,
        pinned: Option<bool>,
    }

    impl Target for Note {
        fn field_table() -> FieldTable<Self> {
            FieldTable::builder()
                .field("Id", |n: &Note| n.id, |n, v| n.id = v)
                .field("Title", |n: &Note| n.title.clone(), |n, v| n.title = v)
                .field("Pinned", |n: &Note| n.pinned, |n, v| n.pinned = v)
                .build()
        }
    }

    fn row() -> MemoryRecord {
        MemoryRecord::builder()
            .column("id", "42")
            .column("TITLE", "  Groceries ")
            .column("Pinned", 1)
            .build()
    }

    #[test]
    fn test_build_coerces_to_declared_types() {
        let note: Note = Binder::new(row()).build().unwrap();
        assert_eq!(
            note,
            Note {
                id: 42,
                title: "  Groceries ".to_string(),
                pinned: Some(true),
            }
        );
    }

    #[test]
    fn test_build_does_not_consume_the_row() {
        let binder = Binder::<Note, _>::new(row());
        let first = binder.build().unwrap();
        let second = binder.build().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_trim_applies_only_to_strings() {
        let note: Note = Binder::new(row())
            .rule("Title", None, None)
            .trim_last()
            .rule("Id", None, None)
            .trim_last()
            .build()
            .unwrap();
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.id, 42);
    }

    #[test]
    fn test_rule_type_mismatch_is_invalid_cast() {
        let result = Binder::<Note, _>::new(row())
            .typed_rule::<i32>("id", None)
            .unwrap()
            .build();

        match result {
            Err(MapperError::InvalidCast {
                field,
                value_type,
                declared,
            }) => {
                assert_eq!(field, "Id");
                assert_eq!(value_type, "int32");
                assert_eq!(declared, ValueType::Int64);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_transform_error_names_the_column() {
        let result = Binder::<Note, _>::new(row())
            .manual_rule("Title", |_| Err("no titles today".into()), None)
            .build();

        match result {
            Err(MapperError::TransformFailed { column, cause, .. }) => {
                assert_eq!(column, "TITLE");
                assert_eq!(cause.to_string(), "no titles today");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_configure_and_with_config() {
        let mut config = MappingConfig::new();
        config.add_rule("Label", Some("Title"), None);

        let source = MemoryRecord::builder().column("Label", "Inbox").build();
        let note: Note = Binder::new(&source).with_config(config).build().unwrap();
        assert_eq!(note.title, "Inbox");

        let note: Note = Binder::new(&source)
            .configure(|config| {
                config.add_rule("Label", Some("Title"), None).trim();
            })
            .build()
            .unwrap();
        assert_eq!(note.title, "Inbox");
    }

    /// The source can be swapped between builds through `source_mut`
    #[test]
    fn test_accessors() {
        let mut binder = Binder::<Note, _>::new(row()).rename("Label", "Title");
        assert_eq!(binder.config().rules().len(), 1);
        assert_eq!(binder.field_table().len(), 3);
        assert_eq!(binder.source().field_count(), 3);

        *binder.source_mut() = MemoryRecord::builder()
            .column("Id", 9)
            .column("Label", "Inbox")
            .build();
        let note = binder.build().unwrap();
        assert_eq!(note.id, 9);
        assert_eq!(note.title, "Inbox");
    }

    #[test]
    fn test_custom_factory() {
        let source = MemoryRecord::builder().column("Id", 7).build();
        let binder = Binder::with_field_table(&source, Note::field_table(), || Note {
            title: "untitled".to_string(),
            ..Note::default()
        });

        let note = binder.build().unwrap();
        assert_eq!(note.id, 7);
        assert_eq!(note.title, "untitled");
    }
}
