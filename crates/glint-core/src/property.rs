//! Property system for Glint.
//!
//! Two layers live here:
//!
//! - [`Property<T>`]: a typed reactive cell whose `set()` reports whether the
//!   value effectively changed. Widgets use it for internal state such as a
//!   group's current value or a dropdown's open flag.
//! - [`PropertyStore`]: the declared external properties of one node. Keys are
//!   strings, values are strings or boolean presence, and only names from the
//!   node's declared set are accepted.
//!
//! # Example
//!
//! ```
//! use glint_core::property::{PropertyDecl, PropertyStore};
//!
//! static DECLS: &[PropertyDecl] = &[
//!     PropertyDecl::string("value"),
//!     PropertyDecl::flag("disabled"),
//! ];
//!
//! let mut props = PropertyStore::new("x-radio", DECLS);
//! assert!(props.set("value", "a").unwrap());
//! // Same value again is not an effective change.
//! assert!(!props.set("value", "a").unwrap());
//! assert!(props.set("disabled", true).unwrap());
//! assert!(props.flag("disabled"));
//! ```

use std::fmt;
use std::str::FromStr;

use parking_lot::RwLock;

use crate::error::PropertyError;
use crate::logging::targets;

/// A reactive property that tracks changes.
///
/// `Property<T>` wraps a value and provides change detection. When `set()` is
/// called, it compares the new value with the current one and returns whether
/// the value actually changed. The caller emits notifications only when it did.
///
/// # Example
///
/// ```
/// use glint_core::Property;
///
/// let prop = Property::new(42);
/// assert!(!prop.set(42));
/// assert!(prop.set(100));
/// assert_eq!(prop.get(), 100);
/// ```
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    ///
    /// This clones the value. For large types, consider using `with()` instead.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Set the value without change detection.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }

    /// Set the value, returning the old value if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

/// The value of a declared external property.
///
/// Booleans are presence-encoded: `Bool(false)` is never stored, setting it
/// removes the property instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// A string value.
    Str(String),
    /// A present boolean attribute.
    Bool(bool),
}

impl PropertyValue {
    /// The string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Bool(_) => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Whether a declared property carries a string or a boolean presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// String-valued.
    Str,
    /// Presence-encoded boolean.
    Flag,
}

/// One entry of a node's declared property set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDecl {
    /// The property name.
    pub name: &'static str,
    /// The value kind.
    pub kind: PropertyKind,
}

impl PropertyDecl {
    /// Declare a string property.
    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: PropertyKind::Str,
        }
    }

    /// Declare a boolean presence property.
    pub const fn flag(name: &'static str) -> Self {
        Self {
            name,
            kind: PropertyKind::Flag,
        }
    }
}

/// The declared external properties of a single node.
///
/// Properties that were never set (or were removed) read as absent; typed
/// accessors fall back to caller-supplied defaults so that a missing or
/// malformed value never becomes an error.
#[derive(Debug, Clone)]
pub struct PropertyStore {
    tag: &'static str,
    declared: &'static [PropertyDecl],
    values: Vec<(&'static str, PropertyValue)>,
}

impl PropertyStore {
    /// Create an empty store for a node with the given tag and declared set.
    pub fn new(tag: &'static str, declared: &'static [PropertyDecl]) -> Self {
        Self {
            tag,
            declared,
            values: Vec::new(),
        }
    }

    /// The tag of the owning node.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// The declared property set.
    pub fn declared(&self) -> &'static [PropertyDecl] {
        self.declared
    }

    fn decl(&self, name: &str) -> Result<PropertyDecl, PropertyError> {
        self.declared
            .iter()
            .find(|d| d.name == name)
            .copied()
            .ok_or_else(|| PropertyError::NotDeclared {
                tag: self.tag,
                name: name.to_owned(),
            })
    }

    /// Set a property, returning whether the stored value effectively changed.
    ///
    /// Setting a flag to `false` removes it. Undeclared names and kind
    /// mismatches are rejected.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<bool, PropertyError> {
        let decl = self.decl(name)?;
        let value = value.into();
        match (&value, decl.kind) {
            (PropertyValue::Bool(false), PropertyKind::Flag) => return self.remove(name),
            (PropertyValue::Bool(_), PropertyKind::Flag) | (PropertyValue::Str(_), PropertyKind::Str) => {}
            (_, PropertyKind::Flag) => {
                return Err(PropertyError::KindMismatch {
                    name: name.to_owned(),
                    expected: "boolean",
                });
            }
            (_, PropertyKind::Str) => {
                return Err(PropertyError::KindMismatch {
                    name: name.to_owned(),
                    expected: "string",
                });
            }
        }

        match self.values.iter_mut().find(|(n, _)| *n == decl.name) {
            Some((_, current)) if *current == value => Ok(false),
            Some((_, current)) => {
                *current = value;
                Ok(true)
            }
            None => {
                self.values.push((decl.name, value));
                Ok(true)
            }
        }
    }

    /// Remove a property, returning whether it was present.
    pub fn remove(&mut self, name: &str) -> Result<bool, PropertyError> {
        let decl = self.decl(name)?;
        let before = self.values.len();
        self.values.retain(|(n, _)| *n != decl.name);
        Ok(self.values.len() != before)
    }

    /// Get the raw value of a property.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Get a string property.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_str)
    }

    /// Get a string property, or `default` when absent.
    pub fn string_or(&self, name: &str, default: &str) -> String {
        self.string(name).unwrap_or(default).to_owned()
    }

    /// Whether a boolean property is present.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(PropertyValue::Bool(true)))
    }

    /// Parse a string property, falling back to `default` when the property is
    /// absent or does not parse.
    pub fn parsed<T: FromStr>(&self, name: &str, default: T) -> T {
        match self.string(name) {
            None => default,
            Some(raw) => match raw.trim().parse() {
                Ok(value) => value,
                Err(_) => {
                    tracing::debug!(
                        target: targets::PROPERTY,
                        tag = self.tag,
                        property = name,
                        raw,
                        "unparsable property value, using default"
                    );
                    default
                }
            },
        }
    }

    /// Iterate over the currently present properties in the order they were first set.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &PropertyValue)> {
        self.values.iter().map(|(n, v)| (*n, v))
    }

    /// Number of present properties.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no property is present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    static DECLS: &[PropertyDecl] = &[
        PropertyDecl::string("value"),
        PropertyDecl::string("size"),
        PropertyDecl::flag("disabled"),
    ];

    #[test]
    fn test_property_set_detects_change() {
        let prop = Property::new(10);
        assert!(!prop.set(10));
        assert!(prop.set(20));
        assert_eq!(prop.get(), 20);
    }

    #[test]
    fn test_property_replace() {
        let prop = Property::new("hello".to_string());
        assert!(prop.replace("hello".to_string()).is_none());
        assert_eq!(prop.replace("world".to_string()), Some("hello".to_string()));
        assert_eq!(prop.get(), "world");
    }

    #[test]
    fn test_property_shared_across_threads() {
        let prop = Arc::new(Property::new(0));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let prop = prop.clone();
                std::thread::spawn(move || {
                    prop.set_silent(i);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!((0..4).contains(&prop.get()));
    }

    #[test]
    fn test_store_effective_change() {
        let mut props = PropertyStore::new("x-test", DECLS);
        assert!(props.set("value", "a").unwrap());
        assert!(!props.set("value", "a").unwrap());
        assert!(props.set("value", "b").unwrap());
        assert_eq!(props.string("value"), Some("b"));
    }

    #[test]
    fn test_store_flag_presence() {
        let mut props = PropertyStore::new("x-test", DECLS);
        assert!(!props.flag("disabled"));
        assert!(!props.set("disabled", false).unwrap());
        assert!(props.set("disabled", true).unwrap());
        assert!(props.flag("disabled"));
        assert!(props.set("disabled", false).unwrap());
        assert!(!props.flag("disabled"));
        assert!(props.get("disabled").is_none());
    }

    #[test]
    fn test_store_rejects_undeclared() {
        let mut props = PropertyStore::new("x-test", DECLS);
        let err = props.set("colour", "red").unwrap_err();
        assert_eq!(
            err,
            PropertyError::NotDeclared {
                tag: "x-test",
                name: "colour".into()
            }
        );
    }

    #[test]
    fn test_store_rejects_kind_mismatch() {
        let mut props = PropertyStore::new("x-test", DECLS);
        assert!(matches!(
            props.set("disabled", "yes"),
            Err(PropertyError::KindMismatch { .. })
        ));
        assert!(matches!(
            props.set("value", true),
            Err(PropertyError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_store_parsed_falls_back() {
        let mut props = PropertyStore::new("x-test", DECLS);
        assert_eq!(props.parsed("size", 3u32), 3);
        props.set("size", " 7 ").unwrap();
        assert_eq!(props.parsed("size", 3u32), 7);
        props.set("size", "huge").unwrap();
        assert_eq!(props.parsed("size", 3u32), 3);
    }

    #[test]
    fn test_store_iter_order() {
        let mut props = PropertyStore::new("x-test", DECLS);
        props.set("size", "small").unwrap();
        props.set("value", "a").unwrap();
        let names: Vec<_> = props.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["size", "value"]);
        assert_eq!(props.len(), 2);
    }
}
