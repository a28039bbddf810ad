//! [`AnyValue`]: a type-erased value handle with selectable ownership.

use core::any::{Any, TypeId};
use std::sync::Arc;

use thiserror::Error;

use crate::Reflect;
use crate::info::TypeDescriptor;
use crate::registry::TypeRegistry;

mod walker;

pub use walker::Walker;

// -----------------------------------------------------------------------------
// Erased aliases

/// Type-erased `&T`.
pub type AnyRef<'a> = &'a (dyn Any + Send + Sync);

/// Type-erased `&mut T`.
pub type AnyMut<'a> = &'a mut (dyn Any + Send + Sync);

/// Type-erased `Box<T>`.
pub type AnyBox = Box<dyn Any + Send + Sync>;

// -----------------------------------------------------------------------------
// CastError

/// A type-erased value did not hold the expected concrete type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("type-erased value is not a `{expected}`")]
pub struct CastError {
    pub expected: &'static str,
}

impl CastError {
    pub(crate) fn expected<T: Any>() -> Self {
        Self {
            expected: core::any::type_name::<T>(),
        }
    }
}

// -----------------------------------------------------------------------------
// AnyValue

enum AnyData<'a> {
    Owned(AnyBox),
    Borrowed(AnyRef<'a>),
}

struct Inner<'a> {
    descriptor: Arc<TypeDescriptor>,
    data: AnyData<'a>,
}

/// A type-erased value: the value's [`TypeDescriptor`] paired with its data,
/// held either borrowed from caller memory or as an independently owned copy.
///
/// Cloning keeps the ownership mode: an owned `AnyValue` deep-copies through
/// the descriptor's clone operation, a borrowed one copies the reference.
/// A default-constructed `AnyValue` is empty, carries no descriptor, and
/// cannot be dereferenced.
///
/// ```
/// use frost_reflect::{AnyValue, TypeRegistry};
///
/// let mut registry = TypeRegistry::new();
///
/// let position = 12.5f32;
/// let owned = AnyValue::owned(position, &mut registry);
///
/// assert!(owned.is_type::<f32>());
/// assert_eq!(owned.downcast_ref::<f32>(), Some(&12.5));
/// assert_eq!(owned.downcast_ref::<u32>(), None);
/// ```
#[derive(Default)]
pub struct AnyValue<'a> {
    inner: Option<Inner<'a>>,
}

impl AnyValue<'static> {
    /// An empty value: no descriptor, no data.
    pub const fn empty() -> Self {
        Self { inner: None }
    }

    /// Takes an owned copy of `value`, registering its type on first use.
    pub fn owned<T: Reflect>(value: T, registry: &mut TypeRegistry) -> Self {
        Self {
            inner: Some(Inner {
                descriptor: registry.descriptor_of::<T>(),
                data: AnyData::Owned(Box::new(value)),
            }),
        }
    }

    /// Wraps an already-erased owned value. Fails if `data` is not an
    /// instance of the descriptor's type.
    pub fn from_parts(descriptor: Arc<TypeDescriptor>, data: AnyBox) -> Result<Self, CastError> {
        if data.as_ref().type_id() != descriptor.id() {
            return Err(CastError {
                expected: descriptor.type_path(),
            });
        }
        Ok(Self {
            inner: Some(Inner {
                descriptor,
                data: AnyData::Owned(data),
            }),
        })
    }

    /// Default-constructs a fresh owned instance of the descriptor's type.
    pub fn construct(descriptor: &Arc<TypeDescriptor>) -> Self {
        Self {
            inner: Some(Inner {
                descriptor: descriptor.clone(),
                data: AnyData::Owned(descriptor.construct_raw()),
            }),
        }
    }
}

impl<'a> AnyValue<'a> {
    /// Borrows `value` without copying; the handle reflects the caller's
    /// instance for as long as the borrow lives.
    pub fn borrowed<T: Reflect>(value: &'a T, registry: &mut TypeRegistry) -> Self {
        Self {
            inner: Some(Inner {
                descriptor: registry.descriptor_of::<T>(),
                data: AnyData::Borrowed(value),
            }),
        }
    }

    /// Borrows an already-erased value. Fails if `data` is not an instance of
    /// the descriptor's type.
    pub fn borrowed_erased(
        descriptor: Arc<TypeDescriptor>,
        data: AnyRef<'a>,
    ) -> Result<Self, CastError> {
        if data.type_id() != descriptor.id() {
            return Err(CastError {
                expected: descriptor.type_path(),
            });
        }
        Ok(Self {
            inner: Some(Inner {
                descriptor,
                data: AnyData::Borrowed(data),
            }),
        })
    }

    /// Whether this value holds data at all.
    #[inline]
    pub const fn has_value(&self) -> bool {
        self.inner.is_some()
    }

    /// Whether the held data is an independently owned copy.
    pub const fn is_owned(&self) -> bool {
        matches!(
            &self.inner,
            Some(Inner {
                data: AnyData::Owned(_),
                ..
            })
        )
    }

    /// Whether the held data borrows caller memory.
    pub const fn is_borrowed(&self) -> bool {
        matches!(
            &self.inner,
            Some(Inner {
                data: AnyData::Borrowed(_),
                ..
            })
        )
    }

    /// The held value's descriptor, `None` when empty.
    pub fn descriptor(&self) -> Option<&Arc<TypeDescriptor>> {
        self.inner.as_ref().map(|inner| &inner.descriptor)
    }

    /// The held value's type identity, `None` when empty.
    pub fn type_id(&self) -> Option<TypeId> {
        self.inner.as_ref().map(|inner| inner.descriptor.id())
    }

    /// The erased data, `None` when empty.
    pub fn data(&self) -> Option<AnyRef<'_>> {
        match &self.inner {
            Some(Inner {
                data: AnyData::Owned(data),
                ..
            }) => Some(data.as_ref()),
            Some(Inner {
                data: AnyData::Borrowed(data),
                ..
            }) => Some(*data),
            None => None,
        }
    }

    /// Mutable access to the erased data. Only owned values are mutable;
    /// borrowed and empty values return `None`.
    pub fn data_mut(&mut self) -> Option<AnyMut<'_>> {
        match &mut self.inner {
            Some(Inner {
                data: AnyData::Owned(data),
                ..
            }) => Some(data.as_mut()),
            _ => None,
        }
    }

    /// Checked typed view of the held data.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data().and_then(|data| data.downcast_ref::<T>())
    }

    /// Checked typed mutable view of the held data (owned values only).
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data_mut().and_then(|data| data.downcast_mut::<T>())
    }

    /// Whether the held value is an instance of `T`.
    pub fn is_type<T: Any>(&self) -> bool {
        self.type_id() == Some(TypeId::of::<T>())
    }

    /// Copies the held value into `to`, which must already be an initialized
    /// instance of the same type.
    ///
    /// # Panics
    ///
    /// Panics when called on an empty value.
    pub fn copy_to(&self, to: AnyMut<'_>) -> Result<(), CastError> {
        let inner = self.expect_inner();
        let from = match &inner.data {
            AnyData::Owned(data) => data.as_ref(),
            AnyData::Borrowed(data) => *data,
        };
        inner.descriptor.copy_value(from, to)
    }

    /// Moves the held value into `to`, leaving a default-constructed instance
    /// behind. Borrowed values cannot be moved out of and are copied instead.
    ///
    /// # Panics
    ///
    /// Panics when called on an empty value.
    pub fn move_to(&mut self, to: AnyMut<'_>) -> Result<(), CastError> {
        let inner = self
            .inner
            .as_mut()
            .expect("called `AnyValue::move_to` on an empty value");
        match &mut inner.data {
            AnyData::Owned(data) => inner.descriptor.move_value(data.as_mut(), to),
            AnyData::Borrowed(data) => inner.descriptor.copy_value(*data, to),
        }
    }

    /// Converts into an owning value: borrowed data is deep-copied, owned
    /// data is kept as-is, empty stays empty.
    pub fn into_owned(self) -> AnyValue<'static> {
        match self.inner {
            None => AnyValue::empty(),
            Some(Inner { descriptor, data }) => {
                let data = match data {
                    AnyData::Owned(data) => data,
                    AnyData::Borrowed(data) => descriptor
                        .clone_value(data)
                        .expect("AnyValue descriptor matches its data"),
                };
                AnyValue {
                    inner: Some(Inner {
                        descriptor,
                        data: AnyData::Owned(data),
                    }),
                }
            }
        }
    }

    fn expect_inner(&self) -> &Inner<'a> {
        self.inner
            .as_ref()
            .expect("dereferenced an empty AnyValue")
    }
}

impl Clone for AnyValue<'_> {
    fn clone(&self) -> Self {
        let inner = match &self.inner {
            None => None,
            Some(Inner { descriptor, data }) => {
                let data = match data {
                    AnyData::Borrowed(data) => AnyData::Borrowed(*data),
                    AnyData::Owned(data) => AnyData::Owned(
                        descriptor
                            .clone_value(data.as_ref())
                            .expect("AnyValue descriptor matches its data"),
                    ),
                };
                Some(Inner {
                    descriptor: descriptor.clone(),
                    data,
                })
            }
        };
        Self { inner }
    }
}

impl core::fmt::Debug for AnyValue<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.inner {
            None => f.write_str("AnyValue(empty)"),
            Some(inner) => f
                .debug_struct("AnyValue")
                .field("type", &inner.descriptor.name())
                .field("owned", &self.is_owned())
                .finish_non_exhaustive(),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeRegistry;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Sample {
        value: u32,
    }

    impl Reflect for Sample {}

    #[test]
    fn default_value_is_empty() {
        let value = AnyValue::default();
        assert!(!value.has_value());
        assert!(value.descriptor().is_none());
        assert!(value.data().is_none());
    }

    #[test]
    fn owned_value_is_unaffected_by_source_mutation() {
        let mut registry = TypeRegistry::new();
        let mut source = Sample { value: 1 };

        let owned = AnyValue::owned(source.clone(), &mut registry);
        source.value = 99;

        assert_eq!(owned.downcast_ref::<Sample>(), Some(&Sample { value: 1 }));
    }

    #[test]
    fn borrowed_value_views_caller_memory() {
        let mut registry = TypeRegistry::new();
        let source = Sample { value: 7 };

        let borrowed = AnyValue::borrowed(&source, &mut registry);
        assert!(borrowed.is_borrowed());

        // No copy was taken: the handle points at the caller's instance.
        let viewed = borrowed.downcast_ref::<Sample>().unwrap();
        assert!(core::ptr::eq(viewed, &source));
    }

    #[test]
    fn clone_keeps_ownership_mode() {
        let mut registry = TypeRegistry::new();
        let source = Sample { value: 3 };

        let borrowed = AnyValue::borrowed(&source, &mut registry);
        assert!(borrowed.clone().is_borrowed());

        let owned = AnyValue::owned(source.clone(), &mut registry);
        let deep = owned.clone();
        assert!(deep.is_owned());
        let a = owned.downcast_ref::<Sample>().unwrap();
        let b = deep.downcast_ref::<Sample>().unwrap();
        assert!(!core::ptr::eq(a, b));
        assert_eq!(a, b);
    }

    #[test]
    fn copy_to_and_move_to_are_checked() {
        let mut registry = TypeRegistry::new();
        let mut value = AnyValue::owned(Sample { value: 5 }, &mut registry);

        let mut target = Sample::default();
        value.copy_to(&mut target).unwrap();
        assert_eq!(target.value, 5);

        let mut target = Sample::default();
        value.move_to(&mut target).unwrap();
        assert_eq!(target.value, 5);
        // Moved-out value is left default-constructed.
        assert_eq!(value.downcast_ref::<Sample>(), Some(&Sample::default()));

        let mut wrong = 0u32;
        assert!(value.copy_to(&mut wrong).is_err());
    }

    #[test]
    fn erased_constructors_verify_pairing() {
        let mut registry = TypeRegistry::new();
        let descriptor = registry.descriptor_of::<Sample>();

        let ok = AnyValue::from_parts(descriptor.clone(), Box::new(Sample { value: 2 }));
        assert!(ok.is_ok());

        let bad = AnyValue::from_parts(descriptor, Box::new(13u32));
        assert!(bad.is_err());
    }

    #[test]
    fn construct_builds_a_default_instance() {
        let mut registry = TypeRegistry::new();
        let descriptor = registry.descriptor_of::<Sample>();

        let value = AnyValue::construct(&descriptor);
        assert!(value.is_owned());
        assert_eq!(value.downcast_ref::<Sample>(), Some(&Sample::default()));
    }
}
