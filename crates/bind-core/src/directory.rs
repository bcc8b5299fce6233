//! Field directory: the settable, named fields of a target type.
//!
//! Target types register their fields once in a [`FieldTable`], an ordered
//! list of typed getter/setter pairs. The binder resolves column names
//! against this table instead of inspecting the type at runtime.

use std::fmt;
use std::sync::Arc;

use bind_types::{FieldValue, RawValue, ValueType};
use tracing::trace;

use crate::error::{MapperError, Result};
use crate::names::names_equal;

type Setter<T> = Arc<dyn Fn(&mut T, RawValue) -> std::result::Result<(), RawValue> + Send + Sync>;
type Getter<T> = Arc<dyn Fn(&T) -> RawValue + Send + Sync>;

/// A type whose instances can be populated by a binder.
///
/// # Example
///
/// ```rust
/// use bind_core::{FieldTable, Target};
///
/// #[derive(Default)]
/// struct User {
///     id: Option<i32>,
///     name: String,
/// }
///
/// impl Target for User {
///     fn field_table() -> FieldTable<Self> {
///         FieldTable::builder()
///             .field("UserId", |u: &User| u.id, |u, v| u.id = v)
///             .field("Name", |u: &User| u.name.clone(), |u, v| u.name = v)
///             .build()
///     }
/// }
///
/// let table = User::field_table();
/// assert!(table.resolve("userid").is_some());
/// ```
pub trait Target: Default + 'static {
    /// The ordered field table for this type.
    fn field_table() -> FieldTable<Self>;

    /// Descriptor of this type when used as a value type.
    fn record_type() -> ValueType {
        let full = std::any::type_name::<Self>();
        let short = full.rsplit("::").next().unwrap_or(full);
        ValueType::record(short)
    }
}

/// One settable field of a target type.
pub struct TargetField<T> {
    name: String,
    declared_type: ValueType,
    setter: Setter<T>,
    getter: Getter<T>,
}

impl<T: 'static> TargetField<T> {
    /// Create a field whose declared type is given by the Rust type `V`.
    pub fn new<V, G, S>(name: impl Into<String>, get: G, set: S) -> Self
    where
        V: FieldValue + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            declared_type: V::value_type(),
            setter: Arc::new(move |target, value| {
                let value = V::from_raw(value)?;
                set(target, value);
                Ok(())
            }),
            getter: Arc::new(move |target| get(target).into_raw()),
        }
    }

    /// Create a field whose declared type is only known at runtime.
    ///
    /// The setter is only invoked with values the declared type admits.
    pub fn dynamic<G, S>(
        name: impl Into<String>,
        declared_type: ValueType,
        get: G,
        set: S,
    ) -> Self
    where
        G: Fn(&T) -> RawValue + Send + Sync + 'static,
        S: Fn(&mut T, RawValue) + Send + Sync + 'static,
    {
        let check = declared_type.clone();
        Self {
            name: name.into(),
            declared_type,
            setter: Arc::new(move |target, value| {
                if !check.admits(&value) {
                    return Err(value);
                }
                set(target, value);
                Ok(())
            }),
            getter: Arc::new(get),
        }
    }
}

impl<T> TargetField<T> {
    /// Canonical (case-sensitive) field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of the field.
    pub fn declared_type(&self) -> &ValueType {
        &self.declared_type
    }

    /// Store `value` in the field. A value of the wrong runtime type is handed back.
    pub fn set(&self, target: &mut T, value: RawValue) -> std::result::Result<(), RawValue> {
        (self.setter)(target, value)
    }

    /// Read the field's current value.
    pub fn get(&self, target: &T) -> RawValue {
        (self.getter)(target)
    }
}

impl<T> Clone for TargetField<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            declared_type: self.declared_type.clone(),
            setter: Arc::clone(&self.setter),
            getter: Arc::clone(&self.getter),
        }
    }
}

impl<T> fmt::Debug for TargetField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetField")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .finish_non_exhaustive()
    }
}

/// Ordered lookup table of a target type's fields.
pub struct FieldTable<T> {
    fields: Vec<TargetField<T>>,
}

impl<T: 'static> FieldTable<T> {
    /// Start building a table.
    pub fn builder() -> FieldTableBuilder<T> {
        FieldTableBuilder { fields: Vec::new() }
    }
}

impl<T> FieldTable<T> {
    /// Resolve a field by name: an exact match first, then the first
    /// case-insensitive match.
    pub fn resolve(&self, name: &str) -> Option<&TargetField<T>> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .or_else(|| self.fields.iter().find(|field| names_equal(&field.name, name)))
    }

    /// Whether `name` resolves to a field.
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Declared type of the field called `name`.
    pub fn declared_type(&self, name: &str) -> Result<&ValueType> {
        self.resolve(name)
            .map(TargetField::declared_type)
            .ok_or_else(|| MapperError::FieldNotFound {
                field: name.to_string(),
            })
    }

    /// Store `value` in the field called `name` on `target`.
    pub fn set(&self, target: &mut T, name: &str, value: RawValue) -> Result<()> {
        let field = self
            .resolve(name)
            .ok_or_else(|| MapperError::FieldNotFound {
                field: name.to_string(),
            })?;
        field
            .set(target, value)
            .map_err(|rejected| MapperError::InvalidCast {
                field: field.name.clone(),
                value_type: rejected.type_name(),
                declared: field.declared_type.clone(),
            })
    }

    /// Read the field called `name` from `target`.
    pub fn get(&self, target: &T, name: &str) -> Option<RawValue> {
        self.resolve(name).map(|field| field.get(target))
    }

    /// Fields in registration order.
    pub fn fields(&self) -> impl Iterator<Item = &TargetField<T>> {
        self.fields.iter()
    }

    /// Field names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(TargetField::name)
    }

    /// `(name, value)` pairs of every field of `target`, in registration order.
    pub fn snapshot(&self, target: &T) -> Vec<(String, RawValue)> {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.get(target)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T> Clone for FieldTable<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<T> fmt::Debug for FieldTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields.iter()).finish()
    }
}

/// Builder for `FieldTable`.
pub struct FieldTableBuilder<T> {
    fields: Vec<TargetField<T>>,
}

impl<T: 'static> FieldTableBuilder<T> {
    /// Register a field with a typed getter and setter.
    pub fn field<V, G, S>(self, name: impl Into<String>, get: G, set: S) -> Self
    where
        V: FieldValue + 'static,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.push(TargetField::new(name, get, set))
    }

    /// Register a prepared field. A field whose exact name is already
    /// registered is ignored; the first registration wins.
    pub fn push(mut self, field: TargetField<T>) -> Self {
        if self.fields.iter().any(|existing| existing.name == field.name) {
            trace!("Ignoring shadowed registration of field '{}'", field.name);
            return self;
        }
        self.fields.push(field);
        self
    }

    /// Build the table.
    pub fn build(self) -> FieldTable<T> {
        FieldTable {
            fields: self.fields,
        }
    }
}
