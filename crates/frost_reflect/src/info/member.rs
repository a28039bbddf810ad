use std::borrow::Cow;
use std::sync::Arc;

use crate::Reflect;
use crate::info::{PropertyBag, TypeDescriptor};
use crate::value::{AnyMut, AnyRef};

// -----------------------------------------------------------------------------
// MemberAccess

/// Erased projection from an owner instance to one of its members.
///
/// Implementations must be pure projections: no allocation, no mutation of
/// the owner beyond handing out the member reference.
pub trait MemberAccess: Send + Sync {
    /// Projects a shared owner reference to the member.
    ///
    /// # Panics
    ///
    /// Panics when `owner` is not an instance of the owning type; member
    /// accessors are only ever invoked through a descriptor that already
    /// verified the pairing, so a mismatch is a bug in the caller.
    fn get<'a>(&self, owner: AnyRef<'a>) -> AnyRef<'a>;

    /// Projects a mutable owner reference to the member.
    ///
    /// # Panics
    ///
    /// Same contract as [`get`](MemberAccess::get).
    fn get_mut<'a>(&self, owner: AnyMut<'a>) -> AnyMut<'a>;
}

/// [`MemberAccess`] backed by a pair of plain field-projection functions.
pub(crate) struct FieldAccess<T, M> {
    pub get: fn(&T) -> &M,
    pub get_mut: fn(&mut T) -> &mut M,
}

impl<T: Reflect, M: Reflect> MemberAccess for FieldAccess<T, M> {
    fn get<'a>(&self, owner: AnyRef<'a>) -> AnyRef<'a> {
        let owner = owner.downcast_ref::<T>().unwrap_or_else(|| {
            panic!(
                "member accessor for `{}` applied to an instance of another type",
                core::any::type_name::<T>()
            )
        });
        (self.get)(owner)
    }

    fn get_mut<'a>(&self, owner: AnyMut<'a>) -> AnyMut<'a> {
        let owner = owner.downcast_mut::<T>().unwrap_or_else(|| {
            panic!(
                "member accessor for `{}` applied to an instance of another type",
                core::any::type_name::<T>()
            )
        });
        (self.get_mut)(owner)
    }
}

// -----------------------------------------------------------------------------
// MemberDescriptor

/// One named member of a described type: its name, the descriptor of its own
/// type, per-member properties, and the accessor that projects an owner
/// instance to the member's data.
pub struct MemberDescriptor {
    name: Cow<'static, str>,
    descriptor: Arc<TypeDescriptor>,
    props: PropertyBag,
    access: Box<dyn MemberAccess>,
}

impl MemberDescriptor {
    pub(crate) fn new(
        name: impl Into<Cow<'static, str>>,
        descriptor: Arc<TypeDescriptor>,
        access: Box<dyn MemberAccess>,
    ) -> Self {
        Self {
            name: name.into(),
            descriptor,
            props: PropertyBag::new(),
            access,
        }
    }

    /// The member's name as declared in `describe`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Descriptor of the member's own type.
    #[inline]
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Properties attached to this member.
    #[inline]
    pub fn props(&self) -> &PropertyBag {
        &self.props
    }

    pub(crate) fn props_mut(&mut self) -> &mut PropertyBag {
        &mut self.props
    }

    /// Typed lookup of a member property.
    pub fn prop<T: 'static>(&self, key: &str) -> Option<&T> {
        self.props.get::<T>(key)
    }

    /// Projects `owner` to this member's data.
    pub fn get<'a>(&self, owner: AnyRef<'a>) -> AnyRef<'a> {
        self.access.get(owner)
    }

    /// Mutable projection of `owner` to this member's data.
    pub fn get_mut<'a>(&self, owner: AnyMut<'a>) -> AnyMut<'a> {
        self.access.get_mut(owner)
    }
}

impl core::fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("type", &self.descriptor.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeRegistry;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Vec2 {
        x: f32,
        y: f32,
    }

    impl Reflect for Vec2 {}

    fn member_x(registry: &mut TypeRegistry) -> MemberDescriptor {
        MemberDescriptor::new(
            "x",
            registry.descriptor_of::<f32>(),
            Box::new(FieldAccess::<Vec2, f32> {
                get: |v| &v.x,
                get_mut: |v| &mut v.x,
            }),
        )
    }

    #[test]
    fn accessor_projects_both_ways() {
        let mut registry = TypeRegistry::new();
        let member = member_x(&mut registry);

        let mut owner = Vec2 { x: 1.0, y: 2.0 };

        let x = member.get(&owner);
        assert_eq!(x.downcast_ref::<f32>(), Some(&1.0));

        let x = member.get_mut(&mut owner);
        *x.downcast_mut::<f32>().unwrap() = 5.0;
        assert_eq!(owner.x, 5.0);
    }

    #[test]
    #[should_panic(expected = "member accessor")]
    fn accessor_rejects_foreign_owner() {
        let mut registry = TypeRegistry::new();
        let member = member_x(&mut registry);

        let wrong = 42u32;
        member.get(&wrong);
    }
}
