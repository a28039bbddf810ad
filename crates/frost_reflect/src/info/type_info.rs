use core::any::TypeId;

use crate::Reflect;

// -----------------------------------------------------------------------------
// TypeInfo

/// Immutable identity block of a registered type.
///
/// Everything in here is derivable from the concrete type alone: the
/// process-unique [`TypeId`], the full type path, the byte size, and a coarse
/// classification. The mutable parts of a type's description (display name,
/// members, properties, codecs) live on the
/// [`TypeDescriptor`](crate::info::TypeDescriptor) that wraps this.
///
/// ```
/// use frost_reflect::info::TypeInfo;
///
/// let info = TypeInfo::of::<f32>();
/// assert!(info.is_floating());
/// assert_eq!(info.size(), 4);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    type_path: &'static str,
    size: usize,
    is_floating: bool,
    is_integral: bool,
    is_complex: bool,
}

impl TypeInfo {
    /// Builds the identity block for `T`.
    pub fn of<T: Reflect>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_path: core::any::type_name::<T>(),
            size: size_of::<T>(),
            is_floating: T::IS_FLOATING,
            is_integral: T::IS_INTEGRAL,
            is_complex: T::IS_COMPLEX,
        }
    }

    /// The process-unique type identity.
    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// The full type path (`core::any::type_name`).
    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// Size of one instance in bytes.
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The type is a floating-point scalar.
    #[inline]
    pub const fn is_floating(&self) -> bool {
        self.is_floating
    }

    /// The type is an integral scalar.
    #[inline]
    pub const fn is_integral(&self) -> bool {
        self.is_integral
    }

    /// The type is structured (class-like) rather than a scalar or enum.
    #[inline]
    pub const fn is_complex(&self) -> bool {
        self.is_complex
    }

    /// Check if the given type matches this identity.
    #[inline]
    pub fn type_is<T: Reflect>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}
