use std::borrow::Cow;

use crate::value::AnyValue;

// -----------------------------------------------------------------------------
// PropertyBag

/// String-keyed side data attached to a descriptor or one of its members.
///
/// Keys are unique; setting an existing key replaces its value in place, so
/// iteration order stays insertion order. Values are owning
/// [`AnyValue`]s and are retrieved with a typed lookup:
///
/// ```
/// use frost_reflect::{AnyValue, TypeRegistry};
/// use frost_reflect::info::PropertyBag;
///
/// let mut registry = TypeRegistry::new();
/// let mut props = PropertyBag::new();
///
/// props.insert("save_priority", AnyValue::owned(3u32, &mut registry));
///
/// assert_eq!(props.get::<u32>("save_priority"), Some(&3));
/// assert_eq!(props.get::<i8>("save_priority"), None);
/// assert!(!props.contains("transient"));
/// ```
#[derive(Default, Clone)]
pub struct PropertyBag {
    entries: Vec<(Cow<'static, str>, AnyValue<'static>)>,
}

impl PropertyBag {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sets `key` to `value`, replacing any previous value under that key.
    pub fn insert(&mut self, key: impl Into<Cow<'static, str>>, value: AnyValue<'static>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Typed lookup; `None` when the key is absent or holds a different type.
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.get_value(key)?.downcast_ref::<T>()
    }

    /// Erased lookup.
    pub fn get_value(&self, key: &str) -> Option<&AnyValue<'static>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Whether any value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Removes the value under `key`, if any.
    pub fn remove(&mut self, key: &str) -> Option<AnyValue<'static>> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnyValue<'static>)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }
}

impl core::fmt::Debug for PropertyBag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set()
            .entries(self.entries.iter().map(|(k, _)| k))
            .finish()
    }
}
