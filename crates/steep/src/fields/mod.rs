//! Field introspection for test values.
//!
//! A [`Fields`] implementation describes the declared fields of a test type
//! in declaration order, whether each is visible, and which environment
//! roles (`save`, `load`, `match`) it carries. It is usually derived with
//! `#[derive(steep::Fields)]`; types without tagged fields can implement it
//! with an empty `impl`.

use std::{
    any::Any,
    fmt,
    sync::Arc,
};

pub mod classify;
pub mod vacant;

pub use classify::Classification;

/// Role tags of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Roles {
    pub save: bool,
    pub load: bool,
    pub matches: bool,
}

impl Roles {
    pub const NONE: Self = Self {
        save: false,
        load: false,
        matches: false,
    };
    pub fn is_empty(&self) -> bool {
        !(self.save || self.load || self.matches)
    }
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.save, "save"),
            (self.load, "load"),
            (self.matches, "match"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

impl fmt::Display for Roles {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.names().join(","))
    }
}

/// Static description of one declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    pub name: &'static str,
    pub visible: bool,
    pub roles: Roles,
}

/// A value stored in the environment.
pub trait Value: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn value_type(&self) -> &'static str;
}

impl<T: Any + fmt::Debug + Send + Sync> Value for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn value_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Shared handle to a saved value.
pub type Stored = Arc<dyn Value>;

/// Copies a field into a shared environment value.
pub fn store<T: Value + Clone>(value: &T) -> Stored {
    Arc::new(value.clone())
}

/// Views a stored value as `T` when its type is exactly `T`.
pub fn downcast<T: Any>(value: &dyn Value) -> Option<&T> {
    value.as_any().downcast_ref::<T>()
}

/// Strips the module path and generic arguments from a type name.
pub fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Field-introspection capability of a test value.
///
/// Every accessor takes the declared field name. Accessors return the
/// neutral answer (`None` / `false`) for fields that do not carry the role
/// in question or are not visible.
pub trait Fields {
    /// All declared fields in declaration order.
    fn field_specs(&self) -> &'static [FieldSpec] {
        &[]
    }
    /// Structural type name used when a test does not name itself.
    fn type_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }
    /// Copy of a `save` field.
    fn save_value(
        &self,
        _name: &str,
    ) -> Option<Stored> {
        None
    }
    /// Whether a `load` field still holds its unset value.
    fn is_vacant(
        &self,
        _name: &str,
    ) -> bool {
        false
    }
    /// Whether `value` has the declared type of a `load` or `match` field.
    fn accepts(
        &self,
        _name: &str,
        _value: &dyn Value,
    ) -> bool {
        false
    }
    /// Assigns `value` to a `load` field, returning false on a type mismatch.
    fn load_value(
        &mut self,
        _name: &str,
        _value: &dyn Value,
    ) -> bool {
        false
    }
    /// Compares `value` with a `match` field. `None` on a type mismatch.
    fn match_value(
        &self,
        _name: &str,
        _value: &dyn Value,
    ) -> Option<bool> {
        None
    }
}
