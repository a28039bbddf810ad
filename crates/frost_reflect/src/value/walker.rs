use core::any::Any;
use std::sync::Arc;

use crate::Reflect;
use crate::info::TypeDescriptor;
use crate::registry::TypeRegistry;
use crate::value::AnyRef;

// -----------------------------------------------------------------------------
// Walker

/// Read-only navigation of a value through its described member tree.
///
/// A walker pairs an erased reference with its descriptor and steps into
/// members by name, so tooling can inspect nested data without knowing the
/// concrete types:
///
/// ```
/// use frost_reflect::{TypeRegistry, Walker};
///
/// #[derive(Debug, Default, Clone)]
/// struct Body { mass: f32 }
/// impl frost_reflect::Reflect for Body {}
///
/// #[derive(Debug, Default, Clone)]
/// struct Entity { body: Body }
/// impl frost_reflect::Reflect for Entity {}
///
/// let mut registry = TypeRegistry::new();
/// registry
///     .describe::<Body>()
///     .member("mass", |b: &Body| &b.mass, |b: &mut Body| &mut b.mass)
///     .finish();
/// registry
///     .describe::<Entity>()
///     .member("body", |e: &Entity| &e.body, |e: &mut Entity| &mut e.body)
///     .finish();
///
/// let entity = Entity { body: Body { mass: 80.5 } };
/// let walker = Walker::new(&entity, &mut registry);
///
/// assert_eq!(walker.path("body.mass").and_then(|w| w.get::<f32>()), Some(&80.5));
/// assert!(walker.walk("velocity").is_none());
/// ```
pub struct Walker<'a> {
    descriptor: Arc<TypeDescriptor>,
    data: AnyRef<'a>,
}

impl<'a> Walker<'a> {
    /// Starts walking at `value`, registering its type on first use.
    pub fn new<T: Reflect>(value: &'a T, registry: &mut TypeRegistry) -> Self {
        Self {
            descriptor: registry.descriptor_of::<T>(),
            data: value,
        }
    }

    /// Starts walking at an already-erased reference.
    pub fn from_parts(descriptor: Arc<TypeDescriptor>, data: AnyRef<'a>) -> Self {
        Self { descriptor, data }
    }

    /// The descriptor of the value currently under the walker.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// The erased data currently under the walker.
    pub fn data(&self) -> AnyRef<'a> {
        self.data
    }

    /// Typed view of the current value.
    pub fn get<T: Any>(&self) -> Option<&'a T> {
        self.data.downcast_ref::<T>()
    }

    /// Steps into the named member, `None` when no such member is described.
    pub fn walk(&self, name: &str) -> Option<Walker<'a>> {
        let data = self.data;
        self.descriptor.with_members(|members| {
            members
                .iter()
                .find(|member| member.name() == name)
                .map(|member| Walker {
                    descriptor: member.descriptor().clone(),
                    data: member.get(data),
                })
        })
    }

    /// Follows a dot-separated member path.
    pub fn path(&self, path: &str) -> Option<Walker<'a>> {
        let mut current = Walker {
            descriptor: self.descriptor.clone(),
            data: self.data,
        };
        for segment in path.split('.') {
            current = current.walk(segment)?;
        }
        Some(current)
    }
}
