use core::marker::PhantomData;
use std::borrow::Cow;
use std::sync::Arc;

use crate::Reflect;
use crate::info::{FieldAccess, MemberDescriptor, TypeDescriptor, prop};
use crate::registry::TypeRegistry;
use crate::serial::{SerialError, SerialReader, SerialWriter};
use crate::value::{AnyValue, CastError};

// -----------------------------------------------------------------------------
// Describe

/// Fluent builder for a type's description.
///
/// Opened with [`TypeRegistry::describe`]; calls chain by value and
/// [`finish`](Describe::finish) returns the descriptor. The first description
/// of a type wins: when the type is already registered the builder is inert
/// and every call is a no-op, so startup code from independent modules can
/// describe the same type without trampling each other.
///
/// ```
/// use frost_reflect::TypeRegistry;
///
/// #[derive(Debug, Default, Clone)]
/// struct Transform {
///     position: f32,
///     scale: f32,
/// }
/// impl frost_reflect::Reflect for Transform {}
///
/// let mut registry = TypeRegistry::new();
/// let descriptor = registry
///     .describe::<Transform>()
///     .name("Transform")
///     .member("position", |t: &Transform| &t.position, |t: &mut Transform| &mut t.position)
///     .member("scale", |t: &Transform| &t.scale, |t: &mut Transform| &mut t.scale)
///     .finish();
///
/// assert_eq!(descriptor.member_count(), 2);
/// assert!(descriptor.name_is("Transform"));
/// ```
pub struct Describe<'r, T: Reflect> {
    registry: &'r mut TypeRegistry,
    /// `None` when the type was already registered: the builder is inert.
    descriptor: Option<Arc<TypeDescriptor>>,
    touched_member: bool,
    _marker: PhantomData<fn(T)>,
}

impl<'r, T: Reflect> Describe<'r, T> {
    pub(crate) fn new(registry: &'r mut TypeRegistry) -> Self {
        let descriptor = if registry.contains::<T>() {
            None
        } else {
            Some(registry.descriptor_of::<T>())
        };
        Self {
            registry,
            descriptor,
            touched_member: false,
            _marker: PhantomData,
        }
    }

    /// Overrides the display name used by name-based lookups and dynamic
    /// serialization.
    pub fn name(self, name: impl Into<Cow<'static, str>>) -> Self {
        if let Some(descriptor) = &self.descriptor {
            descriptor.set_name(name);
        }
        self
    }

    /// Declares the next member. Declaration order is serialization order.
    pub fn member<M: Reflect>(
        mut self,
        name: impl Into<Cow<'static, str>>,
        get: fn(&T) -> &M,
        get_mut: fn(&mut T) -> &mut M,
    ) -> Self {
        if let Some(descriptor) = self.descriptor.clone() {
            let member_descriptor = self.registry.descriptor_of::<M>();
            descriptor.add_member(MemberDescriptor::new(
                name,
                member_descriptor,
                Box::new(FieldAccess { get, get_mut }),
            ));
            self.touched_member = true;
        }
        self
    }

    /// Attaches a property to the most recently declared member, or to the
    /// type itself when no member has been declared yet.
    pub fn prop<V: Reflect>(self, key: impl Into<Cow<'static, str>>, value: V) -> Self {
        if let Some(descriptor) = self.descriptor.clone() {
            let value = AnyValue::owned(value, self.registry);
            if self.touched_member {
                descriptor.set_last_member_prop(key, value);
            } else {
                descriptor.set_prop(key, value);
            }
        }
        self
    }

    /// Attaches a property to the type itself, regardless of declared
    /// members.
    pub fn class_prop<V: Reflect>(self, key: impl Into<Cow<'static, str>>, value: V) -> Self {
        if let Some(descriptor) = self.descriptor.clone() {
            let value = AnyValue::owned(value, self.registry);
            descriptor.set_prop(key, value);
        }
        self
    }

    /// Installs a hand-written write codec. The engine routes every write of
    /// `T` through it, even when members are also described.
    pub fn custom_write(
        self,
        codec: impl Fn(&mut dyn SerialWriter, &T) -> Result<(), SerialError> + Send + Sync + 'static,
    ) -> Self {
        if let Some(descriptor) = self.descriptor.clone() {
            descriptor.set_custom_write(Arc::new(move |writer, value| {
                let value = value
                    .downcast_ref::<T>()
                    .ok_or_else(|| CastError::expected::<T>())?;
                codec(writer, value)
            }));
            descriptor.set_prop(prop::CUSTOM_WRITE, AnyValue::owned(true, self.registry));
        }
        self
    }

    /// Installs a hand-written read codec, mirror of
    /// [`custom_write`](Describe::custom_write).
    pub fn custom_read(
        self,
        codec: impl Fn(&mut dyn SerialReader, &mut T) -> Result<(), SerialError> + Send + Sync + 'static,
    ) -> Self {
        if let Some(descriptor) = self.descriptor.clone() {
            descriptor.set_custom_read(Arc::new(move |reader, value| {
                let value = value
                    .downcast_mut::<T>()
                    .ok_or_else(|| CastError::expected::<T>())?;
                codec(reader, value)
            }));
            descriptor.set_prop(prop::CUSTOM_READ, AnyValue::owned(true, self.registry));
        }
        self
    }

    /// Closes the builder and returns the descriptor.
    pub fn finish(self) -> Arc<TypeDescriptor> {
        match self.descriptor {
            Some(descriptor) => descriptor,
            None => self.registry.descriptor_of::<T>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::any::TypeId;

    use crate::registry::TypeRegistryArc;
    use crate::serial::{
        Event, PseudoReader, PseudoWriter, RecordReader, RecordWriter, Scalar, read, write,
    };

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Vec2 {
        x: f32,
        y: f32,
    }

    impl Reflect for Vec2 {}

    fn describe_vec2(registry: &mut TypeRegistry) {
        registry
            .describe::<Vec2>()
            .name("Vec2")
            .member("x", |v: &Vec2| &v.x, |v: &mut Vec2| &mut v.x)
            .member("y", |v: &Vec2| &v.y, |v: &mut Vec2| &mut v.y)
            .finish();
    }

    #[test]
    fn described_members_round_trip() {
        let registry = TypeRegistryArc::default();
        describe_vec2(&mut registry.write());

        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &Vec2 { x: 1.5, y: -2.25 }).unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out = Vec2::default();
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, Vec2 { x: 1.5, y: -2.25 });
    }

    #[test]
    fn described_class_sequences_round_trip() {
        let registry = TypeRegistryArc::default();
        describe_vec2(&mut registry.write());

        let original = vec![
            Vec2 { x: 1.0, y: 2.0 },
            Vec2 { x: 3.0, y: 4.0 },
            Vec2 { x: 5.0, y: 6.0 },
        ];

        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &original).unwrap();

        // The bracket and delimiter structure is asserted literally: one
        // array header, three class blocks separated by array delimiters.
        let class_block = |x: f64, y: f64| {
            vec![
                Event::ClassBegin(TypeId::of::<Vec2>()),
                Event::MemberBegin(TypeId::of::<f32>(), "x".to_string()),
                Event::Value(Scalar::Float(x)),
                Event::MemberEnd,
                Event::ClassDelim,
                Event::MemberBegin(TypeId::of::<f32>(), "y".to_string()),
                Event::Value(Scalar::Float(y)),
                Event::MemberEnd,
                Event::ClassEnd,
            ]
        };
        let mut expected = vec![Event::ArrayBegin(TypeId::of::<Vec2>(), 3)];
        expected.extend(class_block(1.0, 2.0));
        expected.push(Event::ArrayDelim);
        expected.extend(class_block(3.0, 4.0));
        expected.push(Event::ArrayDelim);
        expected.extend(class_block(5.0, 6.0));
        expected.push(Event::ArrayEnd);
        assert_eq!(writer.events(), expected);

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out: Vec<Vec2> = Vec::new();
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn first_description_wins() {
        let mut registry = TypeRegistry::new();
        describe_vec2(&mut registry);

        // A competing description of the same type is inert.
        let descriptor = registry
            .describe::<Vec2>()
            .name("Point")
            .member("x", |v: &Vec2| &v.x, |v: &mut Vec2| &mut v.x)
            .finish();

        assert!(descriptor.name_is("Vec2"));
        assert_eq!(descriptor.member_count(), 2);
    }

    #[test]
    fn prop_targets_the_latest_member_then_the_class() {
        let mut registry = TypeRegistry::new();
        let descriptor = registry
            .describe::<Vec2>()
            .prop("save", true)
            .member("x", |v: &Vec2| &v.x, |v: &mut Vec2| &mut v.x)
            .prop("precision", 2u32)
            .class_prop("version", 3u32)
            .finish();

        assert_eq!(descriptor.prop::<bool>("save"), Some(true));
        assert_eq!(descriptor.prop::<u32>("version"), Some(3));
        let precision = descriptor.with_members(|members| members[0].prop::<u32>("precision").copied());
        assert_eq!(precision, Some(2));
    }

    #[test]
    fn custom_codec_wins_over_members() {
        let registry = TypeRegistryArc::default();
        registry
            .write()
            .describe::<Vec2>()
            .member("x", |v: &Vec2| &v.x, |v: &mut Vec2| &mut v.x)
            .member("y", |v: &Vec2| &v.y, |v: &mut Vec2| &mut v.y)
            .custom_write(|writer, v| {
                // Packs both components under one name.
                PseudoWriter::begin::<Vec2>(writer)?
                    .member("packed", &(v.x + v.y))?
                    .end()
            })
            .custom_read(|reader, v| {
                let mut packed = 0.0f32;
                PseudoReader::begin::<Vec2>(reader)?
                    .member("packed", &mut packed)?
                    .end()?;
                v.x = packed;
                v.y = 0.0;
                Ok(())
            })
            .finish();

        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &Vec2 { x: 1.0, y: 2.0 }).unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out = Vec2::default();
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, Vec2 { x: 3.0, y: 0.0 });
    }
}
