use core::any::{Any, TypeId};
use std::borrow::Cow;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::Reflect;
use crate::info::{MemberDescriptor, PropertyBag, TypeInfo};
use crate::serial::{SerialError, SerialReader, SerialWriter};
use crate::value::{AnyBox, AnyMut, AnyRef, AnyValue, CastError};

// -----------------------------------------------------------------------------
// Well-known property keys

/// Property keys the serialization engine gives meaning to.
///
/// Anything else stored in a [`PropertyBag`] is opaque application data.
pub mod prop {
    /// The type has a hand-installed write codec.
    pub const CUSTOM_WRITE: &str = "custom_write";
    /// The type has a hand-installed read codec.
    pub const CUSTOM_READ: &str = "custom_read";
    /// The type is a generic shape whose built-in write codec wins over a
    /// custom one.
    pub const GENERIC_WRITE: &str = "generic_write";
    /// Read-side counterpart of [`GENERIC_WRITE`].
    pub const GENERIC_READ: &str = "generic_read";

    /// Shape flag: growable sequence (`Vec<T>`).
    pub const IS_SEQUENCE: &str = "is_sequence";
    /// Shape flag: hash set (`HashSet<T>`).
    pub const IS_SET: &str = "is_set";
    /// Shape flag: hash map (`HashMap<K, V>`).
    pub const IS_MAP: &str = "is_map";
    /// Shape flag: two-element pair (`(A, B)`).
    pub const IS_PAIR: &str = "is_pair";

    /// [`TypeRef`](super::TypeRef) to a container's element type.
    pub const INNER_TYPE: &str = "inner_type";
    /// [`TypeRef`](super::TypeRef) to a map's key type or a pair's first type.
    pub const INNER_TYPE_FIRST: &str = "inner_type_first";
    /// [`TypeRef`](super::TypeRef) to a map's value type or a pair's second type.
    pub const INNER_TYPE_SECOND: &str = "inner_type_second";
}

// -----------------------------------------------------------------------------
// TypeRef

/// A property-storable reference to another registered type.
///
/// [`TypeId`] itself has no default value, so container descriptors store
/// their element types through this wrapper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeRef(pub Option<TypeId>);

impl TypeRef {
    pub fn of<T: Reflect>() -> Self {
        Self(Some(TypeId::of::<T>()))
    }

    #[inline]
    pub const fn id(&self) -> Option<TypeId> {
        self.0
    }
}

impl Reflect for TypeRef {}

// -----------------------------------------------------------------------------
// TypeOps

type CustomWrite =
    Arc<dyn Fn(&mut dyn SerialWriter, AnyRef<'_>) -> Result<(), SerialError> + Send + Sync>;
type CustomRead =
    Arc<dyn Fn(&mut dyn SerialReader, AnyMut<'_>) -> Result<(), SerialError> + Send + Sync>;

/// Monomorphized dispatch table of a descriptor, built once per concrete type.
///
/// Every entry is a plain function pointer that downcasts its erased argument
/// and forwards to the concrete impl; this is what lets a descriptor
/// construct, clone, copy, move, serialize, and ping instances without the
/// caller knowing the concrete type.
struct TypeOps {
    construct: fn() -> AnyBox,
    clone_value: fn(AnyRef<'_>) -> Result<AnyBox, CastError>,
    copy_value: fn(AnyRef<'_>, AnyMut<'_>) -> Result<(), CastError>,
    move_value: fn(AnyMut<'_>, AnyMut<'_>) -> Result<(), CastError>,
    write: fn(&mut dyn SerialWriter, AnyRef<'_>) -> Result<(), SerialError>,
    read: fn(&mut dyn SerialReader, AnyMut<'_>) -> Result<(), SerialError>,
    ping: fn(&mut dyn Any, i32),
}

impl TypeOps {
    fn of<T: Reflect>() -> Self {
        Self {
            construct: || Box::new(T::default()),
            clone_value: |from| {
                let from = from
                    .downcast_ref::<T>()
                    .ok_or_else(|| CastError::expected::<T>())?;
                Ok(Box::new(from.clone()))
            },
            copy_value: |from, to| {
                let from = from
                    .downcast_ref::<T>()
                    .ok_or_else(|| CastError::expected::<T>())?;
                let to = to
                    .downcast_mut::<T>()
                    .ok_or_else(|| CastError::expected::<T>())?;
                to.clone_from(from);
                Ok(())
            },
            move_value: |from, to| {
                let from = from
                    .downcast_mut::<T>()
                    .ok_or_else(|| CastError::expected::<T>())?;
                let to = to
                    .downcast_mut::<T>()
                    .ok_or_else(|| CastError::expected::<T>())?;
                *to = core::mem::take(from);
                Ok(())
            },
            write: |writer, value| {
                let value = value
                    .downcast_ref::<T>()
                    .ok_or_else(|| CastError::expected::<T>())?;
                value.serial_write(writer)
            },
            read: |reader, value| {
                let value = value
                    .downcast_mut::<T>()
                    .ok_or_else(|| CastError::expected::<T>())?;
                value.serial_read(reader)
            },
            ping: |userdata, message| T::ping(userdata, message),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeDescriptor

struct DescriptorState {
    name: Cow<'static, str>,
    members: Vec<MemberDescriptor>,
    props: PropertyBag,
    custom_write: Option<CustomWrite>,
    custom_read: Option<CustomRead>,
}

/// The full runtime description of one registered type.
///
/// A descriptor pairs the immutable [`TypeInfo`] identity block and the
/// monomorphized dispatch table with the mutable description filled in by
/// [`describe`](crate::registry::TypeRegistry::describe): display name,
/// members, properties, and optional custom codecs.
///
/// Descriptors are handed out as `Arc<TypeDescriptor>` and are never
/// reallocated: every resolve of the same type yields the same allocation
/// for the registry's lifetime, so `Arc::ptr_eq` is a valid identity test.
pub struct TypeDescriptor {
    info: TypeInfo,
    ops: TypeOps,
    state: RwLock<DescriptorState>,
}

impl TypeDescriptor {
    pub(crate) fn of<T: Reflect>() -> Self {
        Self {
            info: TypeInfo::of::<T>(),
            ops: TypeOps::of::<T>(),
            state: RwLock::new(DescriptorState {
                name: Cow::Borrowed(T::type_name()),
                members: Vec::new(),
                props: PropertyBag::new(),
                custom_write: None,
                custom_read: None,
            }),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, DescriptorState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, DescriptorState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The immutable identity block.
    #[inline]
    pub const fn info(&self) -> &TypeInfo {
        &self.info
    }

    /// The described type's [`TypeId`].
    #[inline]
    pub const fn id(&self) -> TypeId {
        self.info.id()
    }

    /// The full type path of the described type.
    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.info.type_path()
    }

    /// Check if the given type matches this descriptor.
    #[inline]
    pub fn describes<T: Reflect>(&self) -> bool {
        self.info.type_is::<T>()
    }

    /// The current display name. Starts as [`Reflect::type_name`], changes
    /// when a registration overrides it.
    pub fn name(&self) -> String {
        self.read_state().name.to_string()
    }

    pub(crate) fn set_name(&self, name: impl Into<Cow<'static, str>>) {
        self.write_state().name = name.into();
    }

    /// Compare the display name without cloning it out of the lock.
    pub fn name_is(&self, name: &str) -> bool {
        self.read_state().name == name
    }

    // -- members --------------------------------------------------------------

    /// Whether any members have been described.
    pub fn has_members(&self) -> bool {
        !self.read_state().members.is_empty()
    }

    pub fn member_count(&self) -> usize {
        self.read_state().members.len()
    }

    /// Runs `f` against the member list in declaration order.
    pub fn with_members<R>(&self, f: impl FnOnce(&[MemberDescriptor]) -> R) -> R {
        f(&self.read_state().members)
    }

    pub(crate) fn add_member(&self, member: MemberDescriptor) {
        self.write_state().members.push(member);
    }

    pub(crate) fn set_last_member_prop(
        &self,
        key: impl Into<Cow<'static, str>>,
        value: AnyValue<'static>,
    ) -> bool {
        let mut state = self.write_state();
        match state.members.last_mut() {
            Some(member) => {
                member.props_mut().insert(key, value);
                true
            }
            None => false,
        }
    }

    // -- properties -----------------------------------------------------------

    /// Whether a property is stored under `key`.
    pub fn has_prop(&self, key: &str) -> bool {
        self.read_state().props.contains(key)
    }

    /// Typed property lookup, cloning the stored value out of the lock.
    pub fn prop<T: Reflect>(&self, key: &str) -> Option<T> {
        self.read_state().props.get::<T>(key).cloned()
    }

    /// Sets a property, replacing any previous value under that key.
    pub fn set_prop(&self, key: impl Into<Cow<'static, str>>, value: AnyValue<'static>) {
        self.write_state().props.insert(key, value);
    }

    /// Runs `f` against the property bag.
    pub fn with_props<R>(&self, f: impl FnOnce(&PropertyBag) -> R) -> R {
        f(&self.read_state().props)
    }

    // -- serialization dispatch -----------------------------------------------

    /// Whether serialization must route through [`dispatch_write`](Self::dispatch_write)
    /// even when members exist.
    pub fn has_custom_write(&self) -> bool {
        let state = self.read_state();
        state.props.contains(prop::CUSTOM_WRITE) || state.props.contains(prop::GENERIC_WRITE)
    }

    /// Read-side counterpart of [`has_custom_write`](Self::has_custom_write).
    pub fn has_custom_read(&self) -> bool {
        let state = self.read_state();
        state.props.contains(prop::CUSTOM_READ) || state.props.contains(prop::GENERIC_READ)
    }

    pub(crate) fn set_custom_write(&self, codec: CustomWrite) {
        self.write_state().custom_write = Some(codec);
    }

    pub(crate) fn set_custom_read(&self, codec: CustomRead) {
        self.write_state().custom_read = Some(codec);
    }

    /// Writes `value` with the installed custom codec, falling back to the
    /// type's own [`Reflect::serial_write`]. A generic shape always uses its
    /// built-in codec, even when a custom one is also installed.
    pub fn dispatch_write(
        &self,
        writer: &mut dyn SerialWriter,
        value: AnyRef<'_>,
    ) -> Result<(), SerialError> {
        // The codec is cloned out so the state lock is released before user
        // code runs; custom codecs may resolve types themselves.
        let custom = {
            let state = self.read_state();
            if state.props.contains(prop::GENERIC_WRITE) {
                None
            } else {
                state.custom_write.clone()
            }
        };
        match custom {
            Some(codec) => codec(writer, value),
            None => (self.ops.write)(writer, value),
        }
    }

    /// Mirror of [`dispatch_write`](Self::dispatch_write).
    pub fn dispatch_read(
        &self,
        reader: &mut dyn SerialReader,
        value: AnyMut<'_>,
    ) -> Result<(), SerialError> {
        let custom = {
            let state = self.read_state();
            if state.props.contains(prop::GENERIC_READ) {
                None
            } else {
                state.custom_read.clone()
            }
        };
        match custom {
            Some(codec) => codec(reader, value),
            None => (self.ops.read)(reader, value),
        }
    }

    // -- erased instance operations -------------------------------------------

    /// Default-constructs a boxed instance of the described type.
    pub fn construct_raw(&self) -> AnyBox {
        (self.ops.construct)()
    }

    /// Deep-copies an erased instance.
    pub fn clone_value(&self, from: AnyRef<'_>) -> Result<AnyBox, CastError> {
        (self.ops.clone_value)(from)
    }

    /// Copies `from` into the initialized instance `to`.
    pub fn copy_value(&self, from: AnyRef<'_>, to: AnyMut<'_>) -> Result<(), CastError> {
        (self.ops.copy_value)(from, to)
    }

    /// Moves `from` into `to`, leaving a default-constructed instance in
    /// `from`.
    pub fn move_value(&self, from: AnyMut<'_>, to: AnyMut<'_>) -> Result<(), CastError> {
        (self.ops.move_value)(from, to)
    }

    /// Forwards an out-of-band notification to [`Reflect::ping`].
    pub fn ping(&self, userdata: &mut dyn Any, message: i32) {
        (self.ops.ping)(userdata, message);
    }
}

impl core::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.read_state();
        f.debug_struct("TypeDescriptor")
            .field("name", &state.name)
            .field("type_path", &self.info.type_path())
            .field("members", &state.members.len())
            .field("props", &state.props)
            .finish_non_exhaustive()
    }
}
