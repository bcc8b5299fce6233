//! Mapping configuration: per-column override rules and global switches.
//!
//! Rules are kept in insertion order and looked up by case-insensitive
//! equality against the source column name. When several rules name the same
//! column, the first one registered wins.

use std::fmt;
use std::sync::Arc;

use bind_types::{FieldValue, RawValue, ValueType};

use crate::error::{MapperError, Result, TransformError};
use crate::names::{names_equal, NameTransformation};

type TransformFn = dyn Fn(RawValue) -> std::result::Result<RawValue, TransformError> + Send + Sync;

/// A user-supplied conversion that replaces type coercion for one column.
#[derive(Clone)]
pub struct ManualTransform {
    identity: &'static str,
    func: Arc<TransformFn>,
}

impl ManualTransform {
    /// Wrap a conversion function. Its type name is kept as its identity for
    /// error reporting.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(RawValue) -> std::result::Result<RawValue, TransformError> + Send + Sync + 'static,
    {
        Self {
            identity: std::any::type_name::<F>(),
            func: Arc::new(func),
        }
    }

    /// Identity of the wrapped function.
    pub fn identity(&self) -> &'static str {
        self.identity
    }

    /// Run the function.
    pub fn apply(&self, value: RawValue) -> std::result::Result<RawValue, TransformError> {
        (self.func)(value)
    }
}

impl fmt::Debug for ManualTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ManualTransform").field(&self.identity).finish()
    }
}

/// One per-column override.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Source column name, matched case-insensitively
    pub source_field: String,

    /// Target field name; the source name when absent
    pub target_field: Option<String>,

    /// Explicit coercion destination
    pub target_type: Option<ValueType>,

    /// Conversion that replaces coercion entirely
    pub transform: Option<ManualTransform>,

    /// Trim string values after conversion
    pub trim: bool,
}

impl FieldRule {
    /// Create a rule that renames and/or retypes a column.
    pub fn new(
        source_field: impl Into<String>,
        target_field: Option<&str>,
        target_type: Option<ValueType>,
    ) -> Self {
        Self {
            source_field: source_field.into(),
            target_field: target_field.map(str::to_string),
            target_type,
            transform: None,
            trim: false,
        }
    }

    /// Create a rule that converts a column with a manual transform.
    pub fn manual(
        source_field: impl Into<String>,
        transform: ManualTransform,
        target_field: Option<&str>,
    ) -> Self {
        Self {
            transform: Some(transform),
            ..Self::new(source_field, target_field, None)
        }
    }

    /// Mark the rule trim-on-bind.
    pub fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Whether this rule applies to the column called `column`.
    pub fn matches(&self, column: &str) -> bool {
        names_equal(&self.source_field, column)
    }
}

/// Stable identifier of a registered rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(usize);

/// Handle to a rule that was just registered.
///
/// The handle lets the caller adjust that specific rule (e.g. mark it
/// trimmed) without naming the column again.
pub struct RuleHandle<'a> {
    config: &'a mut MappingConfig,
    index: usize,
}

impl<'a> RuleHandle<'a> {
    /// Mark this rule trim-on-bind.
    pub fn trim(self) -> Self {
        self.config.rules[self.index].trim = true;
        self
    }

    /// Identifier of this rule, usable after the handle is gone.
    pub fn id(&self) -> RuleId {
        RuleId(self.index)
    }

    /// The registered rule.
    pub fn rule(&self) -> &FieldRule {
        &self.config.rules[self.index]
    }

    /// Give back the configuration for further chaining.
    pub fn config(self) -> &'a mut MappingConfig {
        self.config
    }
}

/// Ordered override rules plus the global name transformation and
/// ignore-unmapped switches.
#[derive(Debug, Clone, Default)]
pub struct MappingConfig {
    rules: Vec<FieldRule>,
    name_transformation: Option<NameTransformation>,
    ignore_unmapped: bool,
}

impl MappingConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rename/retype rule. Any destination type is accepted.
    pub fn add_rule(
        &mut self,
        source_field: impl Into<String>,
        target_field: Option<&str>,
        target_type: Option<ValueType>,
    ) -> RuleHandle<'_> {
        self.push_rule(FieldRule::new(source_field, target_field, target_type))
    }

    /// Append a rule coercing to the field type of `V`.
    ///
    /// Only primitive and nullable primitive types are accepted.
    pub fn add_typed_rule<V: FieldValue>(
        &mut self,
        source_field: impl Into<String>,
        target_field: Option<&str>,
    ) -> Result<RuleHandle<'_>> {
        self.add_typed_rule_as(source_field, V::value_type(), target_field)
    }

    /// Append a rule coercing to `target_type`.
    ///
    /// Only primitive and nullable primitive types are accepted; anything else
    /// is rejected with [`MapperError::InvalidConfiguration`].
    pub fn add_typed_rule_as(
        &mut self,
        source_field: impl Into<String>,
        target_type: ValueType,
        target_field: Option<&str>,
    ) -> Result<RuleHandle<'_>> {
        let source_field = source_field.into();
        if !target_type.is_primitive_or_nullable() {
            return Err(MapperError::InvalidConfiguration {
                field: source_field,
                requested: target_type,
            });
        }
        Ok(self.add_rule(source_field, target_field, Some(target_type)))
    }

    /// Append a rule converting the column with `transform`.
    pub fn add_manual_rule<F>(
        &mut self,
        source_field: impl Into<String>,
        transform: F,
        target_field: Option<&str>,
    ) -> RuleHandle<'_>
    where
        F: Fn(RawValue) -> std::result::Result<RawValue, TransformError> + Send + Sync + 'static,
    {
        self.push_rule(FieldRule::manual(
            source_field,
            ManualTransform::new(transform),
            target_field,
        ))
    }

    /// Append a prepared rule.
    pub fn push_rule(&mut self, rule: FieldRule) -> RuleHandle<'_> {
        self.rules.push(rule);
        let index = self.rules.len() - 1;
        RuleHandle {
            config: self,
            index,
        }
    }

    /// Mark the rule `id` trim-on-bind.
    pub fn set_trim(&mut self, id: RuleId) -> &mut Self {
        if let Some(rule) = self.rules.get_mut(id.0) {
            rule.trim = true;
        }
        self
    }

    /// Mark the most recently added rule trim-on-bind. Does nothing when no
    /// rule exists yet.
    pub fn set_trim_on_last(&mut self) -> &mut Self {
        if let Some(rule) = self.rules.last_mut() {
            rule.trim = true;
        }
        self
    }

    /// Replace the global name transformation.
    pub fn set_name_transformation(
        &mut self,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> &mut Self {
        self.name_transformation = Some(NameTransformation::new(pattern, replacement));
        self
    }

    /// Remove the global name transformation.
    pub fn clear_name_transformation(&mut self) -> &mut Self {
        self.name_transformation = None;
        self
    }

    /// Skip (instead of failing on) columns whose target field does not exist.
    pub fn set_ignore_unmapped(&mut self, ignore: bool) -> &mut Self {
        self.ignore_unmapped = ignore;
        self
    }

    /// The first rule registered for `column`, compared case-insensitively.
    pub fn rule_for(&self, column: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|rule| rule.matches(column))
    }

    /// The rule registered as `id`.
    pub fn rule(&self, id: RuleId) -> Option<&FieldRule> {
        self.rules.get(id.0)
    }

    /// All rules in insertion order.
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn name_transformation(&self) -> Option<&NameTransformation> {
        self.name_transformation.as_ref()
    }

    pub fn ignore_unmapped(&self) -> bool {
        self.ignore_unmapped
    }
}
