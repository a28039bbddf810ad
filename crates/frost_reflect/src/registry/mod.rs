//! The process-wide type registry.
//!
//! [`TypeRegistry`] owns one [`TypeDescriptor`] per registered type, keyed by
//! [`TypeId`]. Descriptors are created lazily on first resolve, never move,
//! and stay valid for the registry's lifetime. [`TypeRegistryArc`] is the
//! shared, lock-guarded form the serialization backends carry.

mod describe;

pub use describe::Describe;

use core::any::TypeId;
use core::hash::{BuildHasherDefault, Hasher};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::Reflect;
use crate::info::TypeDescriptor;

// -----------------------------------------------------------------------------
// TypeIdMap

/// [`TypeId`]s are already high-quality hashes, so the map over them skips
/// rehashing and uses the id's own bits.
#[derive(Default)]
struct TypeIdHasher {
    hash: u64,
}

impl Hasher for TypeIdHasher {
    fn write_u64(&mut self, n: u64) {
        self.hash = n;
    }

    fn write_u128(&mut self, n: u128) {
        self.hash = n as u64;
    }

    fn write(&mut self, bytes: &[u8]) {
        // Fallback for std layouts that feed raw bytes.
        for &byte in bytes {
            self.hash = self.hash.rotate_left(8) ^ u64::from(byte);
        }
    }

    fn finish(&self) -> u64 {
        self.hash
    }
}

type TypeIdMap<V> = HashMap<TypeId, V, BuildHasherDefault<TypeIdHasher>>;

// -----------------------------------------------------------------------------
// TypeRegistry

struct RegisteredType {
    descriptor: Arc<TypeDescriptor>,
    /// Generation stamp taken from the registry at registration time; used
    /// to purge registrations from unloaded code, see
    /// [`TypeRegistry::retain_location`].
    location: u32,
}

/// Owner of every [`TypeDescriptor`] in the process.
///
/// Resolving a type is idempotent: the first
/// [`descriptor_of`](Self::descriptor_of) creates the descriptor and runs the
/// type's [`init_descriptor`](Reflect::init_descriptor) hook, every later one
/// returns the same `Arc`.
///
/// ```
/// use std::any::TypeId;
/// use std::sync::Arc;
/// use frost_reflect::TypeRegistry;
///
/// #[derive(Debug, Default, Clone)]
/// struct Health { current: u32 }
/// impl frost_reflect::Reflect for Health {}
///
/// let mut registry = TypeRegistry::new();
/// let first = registry.descriptor_of::<Health>();
/// let second = registry.resolve(TypeId::of::<Health>());
///
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub struct TypeRegistry {
    types: TypeIdMap<RegisteredType>,
    location: u32,
}

impl TypeRegistry {
    /// Creates a registry with no types registered, not even primitives.
    pub fn empty() -> Self {
        Self {
            types: TypeIdMap::default(),
            location: 0,
        }
    }

    /// Creates a registry with the built-in scalar types and `String`
    /// pre-registered.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.descriptor_of::<bool>();
        registry.descriptor_of::<char>();
        registry.descriptor_of::<u8>();
        registry.descriptor_of::<u16>();
        registry.descriptor_of::<u32>();
        registry.descriptor_of::<u64>();
        registry.descriptor_of::<usize>();
        registry.descriptor_of::<i8>();
        registry.descriptor_of::<i16>();
        registry.descriptor_of::<i32>();
        registry.descriptor_of::<i64>();
        registry.descriptor_of::<isize>();
        registry.descriptor_of::<f32>();
        registry.descriptor_of::<f64>();
        registry.descriptor_of::<String>();
        registry
    }

    /// Resolves `T`'s descriptor, registering the type on first use.
    pub fn descriptor_of<T: Reflect>(&mut self) -> Arc<TypeDescriptor> {
        let id = TypeId::of::<T>();
        if let Some(entry) = self.types.get(&id) {
            return entry.descriptor.clone();
        }

        let descriptor = Arc::new(TypeDescriptor::of::<T>());
        self.types.insert(
            id,
            RegisteredType {
                descriptor: descriptor.clone(),
                location: self.location,
            },
        );
        log::trace!("registered type `{}`", descriptor.type_path());

        // The entry is inserted before the hook runs so descriptions of
        // self-referential shapes terminate.
        T::init_descriptor(&descriptor, self);
        descriptor
    }

    /// Opens the fluent description builder for `T`.
    ///
    /// When `T` is already registered the builder is inert: the existing
    /// description wins and the calls are no-ops.
    pub fn describe<T: Reflect>(&mut self) -> Describe<'_, T> {
        Describe::new(self)
    }

    /// Whether `T` is registered.
    pub fn contains<T: Reflect>(&self) -> bool {
        self.contains_id(TypeId::of::<T>())
    }

    /// Whether a type with this id is registered.
    pub fn contains_id(&self, id: TypeId) -> bool {
        self.types.contains_key(&id)
    }

    /// Looks up a registered descriptor by id.
    pub fn get(&self, id: TypeId) -> Option<Arc<TypeDescriptor>> {
        self.types.get(&id).map(|entry| entry.descriptor.clone())
    }

    /// Looks up a registered descriptor by id.
    ///
    /// # Panics
    ///
    /// Panics when no type with this id is registered. Use [`get`](Self::get)
    /// for the checked form.
    pub fn resolve(&self, id: TypeId) -> Arc<TypeDescriptor> {
        self.get(id)
            .unwrap_or_else(|| panic!("no descriptor registered for {id:?}"))
    }

    /// Looks up a descriptor by display name. Names are not indexed, this is
    /// a linear scan.
    pub fn get_with_name(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types
            .values()
            .find(|entry| entry.descriptor.name_is(name))
            .map(|entry| entry.descriptor.clone())
    }

    /// Unregisters `T`. Outstanding `Arc`s to the descriptor stay usable but
    /// the registry will build a fresh description on the next resolve.
    pub fn free<T: Reflect>(&mut self) -> bool {
        self.free_id(TypeId::of::<T>())
    }

    /// Unregisters the type with this id.
    pub fn free_id(&mut self, id: TypeId) -> bool {
        self.types.remove(&id).is_some()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates all registered descriptors, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.types.values().map(|entry| &entry.descriptor)
    }

    // -- registration generations ---------------------------------------------

    /// The generation stamped onto new registrations.
    #[inline]
    pub const fn location(&self) -> u32 {
        self.location
    }

    /// Starts a new registration generation and returns it. Types registered
    /// from here on carry the new stamp.
    pub fn advance_location(&mut self) -> u32 {
        self.location += 1;
        self.location
    }

    /// Purges every registration stamped before `min`, returning how many
    /// were removed. This is how registrations made by since-unloaded code
    /// are evicted without touching the survivors.
    pub fn retain_location(&mut self, min: u32) -> usize {
        let before = self.types.len();
        self.types.retain(|_, entry| entry.location >= min);
        let removed = before - self.types.len();
        if removed != 0 {
            log::debug!("purged {removed} stale type registrations");
        }
        removed
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.len())
            .field("location", &self.location)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// TypeRegistryArc

/// Shared, lock-guarded [`TypeRegistry`].
///
/// This is the form the serialization backends hold: cloning is cheap and all
/// clones see the same registry. Lock poisoning is forgiven, the registry
/// stays usable after a panic in another thread.
#[derive(Clone, Default)]
pub struct TypeRegistryArc {
    internal: Arc<RwLock<TypeRegistry>>,
}

impl TypeRegistryArc {
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Locks the registry for shared access.
    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.internal
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the registry for exclusive access.
    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for TypeRegistryArc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("TypeRegistryArc").field(&*self.read()).finish()
    }
}

// -----------------------------------------------------------------------------
// Auto registration

/// A type description submitted for startup registration with
/// [`register_type!`](crate::register_type).
#[cfg(feature = "auto_register")]
pub struct DescribeRegistration {
    pub register: fn(&mut TypeRegistry),
}

#[cfg(feature = "auto_register")]
inventory::collect!(DescribeRegistration);

#[cfg(feature = "auto_register")]
impl TypeRegistry {
    /// Runs every [`DescribeRegistration`] submitted across the binary,
    /// returning how many ran.
    pub fn auto_register(&mut self) -> usize {
        let mut count = 0;
        for registration in inventory::iter::<DescribeRegistration> {
            (registration.register)(self);
            count += 1;
        }
        log::debug!("auto-registered {count} type descriptions");
        count
    }
}

/// Submits a description function to run during
/// [`TypeRegistry::auto_register`].
///
/// ```
/// use frost_reflect::TypeRegistry;
///
/// #[derive(Debug, Default, Clone)]
/// struct Velocity { x: f32, y: f32 }
/// impl frost_reflect::Reflect for Velocity {}
///
/// frost_reflect::register_type!(|registry: &mut TypeRegistry| {
///     registry
///         .describe::<Velocity>()
///         .name("Velocity")
///         .member("x", |v: &Velocity| &v.x, |v: &mut Velocity| &mut v.x)
///         .member("y", |v: &Velocity| &v.y, |v: &mut Velocity| &mut v.y)
///         .finish();
/// });
///
/// let mut registry = TypeRegistry::new();
/// assert!(registry.auto_register() >= 1);
/// assert!(registry.get_with_name("Velocity").is_some());
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! register_type {
    ($register:expr) => {
        $crate::inventory::submit! {
            $crate::registry::DescribeRegistration { register: $register }
        }
    };
}
