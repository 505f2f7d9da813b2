//! Target record descriptions.
//!
//! A target type implements [`Record`] once, listing its fields in declaration
//! order. Each [`Field`] carries the name the resolver matches against column
//! names, the [`FieldKind`] of its declared type, and a setter that already
//! embeds the coercion routine for that type.
//!
//! ```
//! use rowbind::record::{Field, Record};
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     id: i32,
//!     name: String,
//!     age: Option<i32>,
//! }
//!
//! impl Record for User {
//!     fn fields() -> Vec<Field<Self>> {
//!         vec![
//!             Field::new("Id", |user: &mut User, value| user.id = value),
//!             Field::new("Name", |user: &mut User, value| user.name = value),
//!             Field::new("Age", |user: &mut User, value| user.age = value),
//!         ]
//!     }
//! }
//! ```

use std::{any::type_name, fmt, sync::Arc};

use crate::{
    coerce::{FieldKind, FromValue},
    data::Value,
    error::CoercionError,
};

pub(crate) type Assign<T> = Arc<dyn Fn(&mut T, &Value) -> Result<(), CoercionError> + Send + Sync>;

pub trait Record: Default + 'static {
    fn fields() -> Vec<Field<Self>>;

    /// Name used in diagnostics.
    fn record_name() -> &'static str {
        let full = type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }
}

pub struct Field<T> {
    name: String,
    kind: FieldKind,
    type_name: &'static str,
    assign: Option<Assign<T>>,
}

impl<T> Field<T> {
    /// Declares an assignable field whose type is fixed by the setter's value type.
    pub fn new<V, F>(name: impl Into<String>, set: F) -> Self
    where
        T: 'static,
        V: FromValue + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let assign: Assign<T> = Arc::new(move |record: &mut T, raw: &Value| {
            set(record, V::from_value(raw)?);
            Ok(())
        });
        Field {
            name: name.into(),
            kind: V::KIND,
            type_name: V::TYPE_NAME,
            assign: Some(assign),
        }
    }

    /// Declares a nested record or collection field; it is never bound to a column.
    pub fn composite(name: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            kind: FieldKind::Composite,
            type_name: "composite",
            assign: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn info(&self) -> FieldInfo<'_> {
        FieldInfo {
            name: &self.name,
            kind: self.kind,
        }
    }

    pub(crate) fn assign(&self) -> Option<&Assign<T>> {
        self.assign.as_ref()
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// The part of a field description the resolver needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo<'a> {
    pub name: &'a str,
    pub kind: FieldKind,
}

impl<'a> FieldInfo<'a> {
    pub fn new(name: &'a str, kind: FieldKind) -> Self {
        FieldInfo { name, kind }
    }
}
