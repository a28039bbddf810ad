use core::any::Any;

use crate::info::TypeDescriptor;
use crate::registry::TypeRegistry;
use crate::serial::{SerialError, SerialReader, SerialWriter};

// -----------------------------------------------------------------------------
// Ping messages

/// Message code for [`Reflect::ping`] asking the component-storage collaborator
/// to create backing storage for the pinged type, even if no instance of it has
/// been spawned yet.
///
/// The storage handle is passed through the opaque `userdata` argument; this
/// crate makes no other assumption about how components are stored.
pub const PING_REGISTER_STORAGE: i32 = 45_634;

// -----------------------------------------------------------------------------
// Reflect

/// The core reflection trait.
///
/// Implementing `Reflect` makes a type registerable in a
/// [`TypeRegistry`] and serializable through the [`serial`](crate::serial)
/// engine. Every method has a default, so the minimal implementation is empty:
///
/// ```
/// #[derive(Debug, Default, Clone)]
/// struct Health { current: u32, max: u32 }
///
/// impl frost_reflect::Reflect for Health {}
/// ```
///
/// Members are declared separately with the
/// [`describe`](TypeRegistry::describe) builder; a type with neither members
/// nor a codec fails serialization with
/// [`SerialError::MissingCodec`] instead of writing garbage.
///
/// The `Default + Clone` bounds feed the descriptor's dispatch table:
/// `Default` is how [`construct`](TypeDescriptor::construct_raw) and move-out
/// work, `Clone` is how copies and owning [`AnyValue`](crate::AnyValue)s are
/// made.
pub trait Reflect: Any + Default + Clone + Send + Sync {
    /// Classification flag: the type is a floating-point scalar.
    const IS_FLOATING: bool = false;

    /// Classification flag: the type is an integral scalar.
    const IS_INTEGRAL: bool = false;

    /// Classification flag: the type is a structured (class-like) type.
    const IS_COMPLEX: bool = true;

    /// Default display name, overridable per registration with
    /// [`Describe::name`](crate::registry::Describe::name).
    fn type_name() -> &'static str {
        core::any::type_name::<Self>()
    }

    /// One-time hook run when this type's descriptor is first created.
    ///
    /// Container shapes use this to mark their descriptor as generic and to
    /// record their element type, see [`impls`](crate::impls).
    fn init_descriptor(_descriptor: &TypeDescriptor, _registry: &mut TypeRegistry) {}

    /// Serialization customization point for leaf and shape types.
    ///
    /// Only reached for types without members (or flagged generic); described
    /// members are walked by the engine before this is consulted.
    fn serial_write(&self, _writer: &mut dyn SerialWriter) -> Result<(), SerialError> {
        Err(SerialError::MissingCodec {
            type_path: core::any::type_name::<Self>(),
        })
    }

    /// Deserialization customization point, mirror of [`serial_write`](Reflect::serial_write).
    fn serial_read(&mut self, _reader: &mut dyn SerialReader) -> Result<(), SerialError> {
        Err(SerialError::MissingCodec {
            type_path: core::any::type_name::<Self>(),
        })
    }

    /// Out-of-band notification hook, dispatched through
    /// [`TypeDescriptor::ping`].
    ///
    /// `userdata` is an opaque handle owned by the caller; `message` selects
    /// the request (see [`PING_REGISTER_STORAGE`]). The default ignores every
    /// message.
    fn ping(_userdata: &mut dyn Any, _message: i32) {}
}
