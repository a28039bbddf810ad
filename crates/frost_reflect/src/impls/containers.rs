//! Generic container shapes.
//!
//! Containers register themselves as generic: their descriptors carry a shape
//! flag, the element type(s) as [`TypeRef`] properties, and the
//! `generic_write` / `generic_read` markers that keep their built-in codec in
//! charge even when a custom one is installed. Sequences and sets travel as
//! length-prefixed runs, maps as runs of pairs, and a pair frames its
//! `first` / `second` members exactly like a two-member class.

use core::hash::Hash;
use std::collections::{HashMap, HashSet};

use crate::Reflect;
use crate::info::{FieldAccess, MemberDescriptor, TypeDescriptor, TypeRef, prop};
use crate::registry::TypeRegistry;
use crate::serial::{
    PseudoReader, PseudoWriter, SerialError, SerialReader, SerialWriter, read_pairs,
    read_sequence, write_pairs, write_sequence,
};
use crate::value::AnyValue;

fn mark_generic(descriptor: &TypeDescriptor, registry: &mut TypeRegistry, shape: &'static str) {
    descriptor.set_prop(prop::GENERIC_WRITE, AnyValue::owned(true, registry));
    descriptor.set_prop(prop::GENERIC_READ, AnyValue::owned(true, registry));
    descriptor.set_prop(shape, AnyValue::owned(true, registry));
}

// -----------------------------------------------------------------------------
// Vec<T>

impl<T: Reflect> Reflect for Vec<T> {
    fn init_descriptor(descriptor: &TypeDescriptor, registry: &mut TypeRegistry) {
        registry.descriptor_of::<T>();
        mark_generic(descriptor, registry, prop::IS_SEQUENCE);
        descriptor.set_prop(prop::INNER_TYPE, AnyValue::owned(TypeRef::of::<T>(), registry));
    }

    fn serial_write(&self, writer: &mut dyn SerialWriter) -> Result<(), SerialError> {
        write_sequence(writer, self.iter())
    }

    fn serial_read(&mut self, reader: &mut dyn SerialReader) -> Result<(), SerialError> {
        self.clear();
        read_sequence(reader, |item| self.push(item))
    }
}

// -----------------------------------------------------------------------------
// HashSet<T>

impl<T: Reflect + Eq + Hash> Reflect for HashSet<T> {
    fn init_descriptor(descriptor: &TypeDescriptor, registry: &mut TypeRegistry) {
        registry.descriptor_of::<T>();
        mark_generic(descriptor, registry, prop::IS_SET);
        descriptor.set_prop(prop::INNER_TYPE, AnyValue::owned(TypeRef::of::<T>(), registry));
    }

    fn serial_write(&self, writer: &mut dyn SerialWriter) -> Result<(), SerialError> {
        write_sequence(writer, self.iter())
    }

    fn serial_read(&mut self, reader: &mut dyn SerialReader) -> Result<(), SerialError> {
        self.clear();
        read_sequence(reader, |item| {
            self.insert(item);
        })
    }
}

// -----------------------------------------------------------------------------
// HashMap<K, V>

impl<K: Reflect + Eq + Hash, V: Reflect> Reflect for HashMap<K, V> {
    fn init_descriptor(descriptor: &TypeDescriptor, registry: &mut TypeRegistry) {
        registry.descriptor_of::<(K, V)>();
        mark_generic(descriptor, registry, prop::IS_MAP);
        // The run's element type is the entry pair itself.
        descriptor.set_prop(
            prop::INNER_TYPE,
            AnyValue::owned(TypeRef::of::<(K, V)>(), registry),
        );
        descriptor.set_prop(
            prop::INNER_TYPE_FIRST,
            AnyValue::owned(TypeRef::of::<K>(), registry),
        );
        descriptor.set_prop(
            prop::INNER_TYPE_SECOND,
            AnyValue::owned(TypeRef::of::<V>(), registry),
        );
    }

    fn serial_write(&self, writer: &mut dyn SerialWriter) -> Result<(), SerialError> {
        write_pairs(writer, self.iter())
    }

    fn serial_read(&mut self, reader: &mut dyn SerialReader) -> Result<(), SerialError> {
        self.clear();
        read_pairs(reader, |key, value| {
            self.insert(key, value);
        })
    }
}

// -----------------------------------------------------------------------------
// (A, B)

impl<A: Reflect, B: Reflect> Reflect for (A, B) {
    fn init_descriptor(descriptor: &TypeDescriptor, registry: &mut TypeRegistry) {
        descriptor.add_member(MemberDescriptor::new(
            "first",
            registry.descriptor_of::<A>(),
            Box::new(FieldAccess::<Self, A> {
                get: |pair| &pair.0,
                get_mut: |pair| &mut pair.0,
            }),
        ));
        descriptor.add_member(MemberDescriptor::new(
            "second",
            registry.descriptor_of::<B>(),
            Box::new(FieldAccess::<Self, B> {
                get: |pair| &pair.1,
                get_mut: |pair| &mut pair.1,
            }),
        ));
        mark_generic(descriptor, registry, prop::IS_PAIR);
        descriptor.set_prop(
            prop::INNER_TYPE_FIRST,
            AnyValue::owned(TypeRef::of::<A>(), registry),
        );
        descriptor.set_prop(
            prop::INNER_TYPE_SECOND,
            AnyValue::owned(TypeRef::of::<B>(), registry),
        );
    }

    fn serial_write(&self, writer: &mut dyn SerialWriter) -> Result<(), SerialError> {
        PseudoWriter::begin::<Self>(writer)?
            .member("first", &self.0)?
            .member("second", &self.1)?
            .end()
    }

    fn serial_read(&mut self, reader: &mut dyn SerialReader) -> Result<(), SerialError> {
        PseudoReader::begin::<Self>(reader)?
            .member("first", &mut self.0)?
            .member("second", &mut self.1)?
            .end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistryArc;
    use crate::serial::{Event, RecordReader, RecordWriter, Scalar, read, write};
    use core::any::TypeId;

    #[test]
    fn sequences_round_trip_in_order() {
        let registry = TypeRegistryArc::default();
        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &vec![3u32, 1, 4, 1, 5]).unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out: Vec<u32> = vec![99];
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, [3, 1, 4, 1, 5]);
    }

    #[test]
    fn nested_sequences_round_trip() {
        let registry = TypeRegistryArc::default();
        let original = vec![vec![String::from("a")], vec![], vec![String::from("b c")]];

        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &original).unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out: Vec<Vec<String>> = Vec::new();
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn sets_round_trip() {
        let registry = TypeRegistryArc::default();
        let original: HashSet<u16> = [7, 11, 13].into_iter().collect();

        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &original).unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out: HashSet<u16> = HashSet::new();
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn maps_round_trip_as_pair_runs() {
        let registry = TypeRegistryArc::default();
        let mut original: HashMap<String, u32> = HashMap::new();
        original.insert("one".into(), 1);
        original.insert("two".into(), 2);

        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &original).unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out: HashMap<String, u32> = HashMap::new();
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn pairs_are_two_member_classes() {
        let mut registry = TypeRegistry::new();
        let descriptor = registry.descriptor_of::<(f32, f64)>();

        assert_eq!(descriptor.member_count(), 2);
        let names = descriptor.with_members(|members| {
            members.iter().map(|m| m.name().to_string()).collect::<Vec<_>>()
        });
        assert_eq!(names, ["first", "second"]);
        assert!(descriptor.has_prop(prop::IS_PAIR));

        let registry = TypeRegistryArc::new(registry);
        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &(1.5f32, -2.25f64)).unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out = (0.0f32, 0.0f64);
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, (1.5, -2.25));
    }

    #[test]
    fn pairs_emit_literal_two_member_structure() {
        let registry = TypeRegistryArc::default();
        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &(1.5f32, -2.25f64)).unwrap();

        let expected = vec![
            Event::ClassBegin(TypeId::of::<(f32, f64)>()),
            Event::MemberBegin(TypeId::of::<f32>(), "first".to_string()),
            Event::Value(Scalar::Float(1.5)),
            Event::MemberEnd,
            Event::ClassDelim,
            Event::MemberBegin(TypeId::of::<f64>(), "second".to_string()),
            Event::Value(Scalar::Float(-2.25)),
            Event::MemberEnd,
            Event::ClassEnd,
        ];
        assert_eq!(writer.events(), expected);
    }

    #[test]
    fn pair_shape_codec_is_pinned_over_custom() {
        let registry = TypeRegistryArc::default();
        registry
            .write()
            .describe::<(u32, u32)>()
            .custom_write(|writer, pair| {
                PseudoWriter::begin::<(u32, u32)>(writer)?
                    .member("sum", &(pair.0 + pair.1))?
                    .end()
            })
            .finish();

        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &(1u32, 2u32)).unwrap();

        // The shape's built-in codec stays in charge.
        let member_names: Vec<_> = writer
            .events()
            .iter()
            .filter_map(|event| match event {
                Event::MemberBegin(_, name) => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(member_names, ["first", "second"]);

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out = (0u32, 0u32);
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, (1, 2));
    }

    #[test]
    fn sequence_shape_codec_is_pinned_over_custom() {
        let registry = TypeRegistryArc::default();
        registry
            .write()
            .describe::<Vec<u32>>()
            .custom_write(|writer, items| {
                PseudoWriter::begin::<Vec<u32>>(writer)?
                    .member("len", &items.len())?
                    .end()
            })
            .custom_read(|_, _| Ok(()))
            .finish();

        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &vec![7u32, 9]).unwrap();

        let expected = vec![
            Event::ArrayBegin(TypeId::of::<u32>(), 2),
            Event::Value(Scalar::Unsigned(7)),
            Event::ArrayDelim,
            Event::Value(Scalar::Unsigned(9)),
            Event::ArrayEnd,
        ];
        assert_eq!(writer.events(), expected);

        // The custom reader is bypassed the same way.
        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out: Vec<u32> = Vec::new();
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, [7, 9]);
    }

    #[test]
    fn map_shape_codec_is_pinned_over_custom() {
        let registry = TypeRegistryArc::default();
        registry
            .write()
            .describe::<HashMap<u32, u32>>()
            .custom_write(|writer, map| {
                PseudoWriter::begin::<HashMap<u32, u32>>(writer)?
                    .member("len", &map.len())?
                    .end()
            })
            .finish();

        let mut original: HashMap<u32, u32> = HashMap::new();
        original.insert(1, 2);

        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &original).unwrap();

        let expected = vec![
            Event::ArrayBegin(TypeId::of::<(u32, u32)>(), 1),
            Event::ClassBegin(TypeId::of::<(u32, u32)>()),
            Event::MemberBegin(TypeId::of::<u32>(), "first".to_string()),
            Event::Value(Scalar::Unsigned(1)),
            Event::MemberEnd,
            Event::ClassDelim,
            Event::MemberBegin(TypeId::of::<u32>(), "second".to_string()),
            Event::Value(Scalar::Unsigned(2)),
            Event::MemberEnd,
            Event::ClassEnd,
            Event::ArrayEnd,
        ];
        assert_eq!(writer.events(), expected);

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out: HashMap<u32, u32> = HashMap::new();
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn container_descriptors_record_their_element_types() {
        let mut registry = TypeRegistry::new();

        let sequence = registry.descriptor_of::<Vec<u8>>();
        assert!(sequence.has_prop(prop::IS_SEQUENCE));
        assert!(sequence.has_prop(prop::GENERIC_WRITE));
        assert_eq!(
            sequence.prop::<TypeRef>(prop::INNER_TYPE),
            Some(TypeRef::of::<u8>())
        );

        let map = registry.descriptor_of::<HashMap<u32, String>>();
        assert!(map.has_prop(prop::IS_MAP));
        assert_eq!(
            map.prop::<TypeRef>(prop::INNER_TYPE),
            Some(TypeRef::of::<(u32, String)>())
        );
        assert_eq!(
            map.prop::<TypeRef>(prop::INNER_TYPE_FIRST).and_then(|r| r.id()),
            Some(TypeId::of::<u32>())
        );

        // Registering the map also registered its entry pair and elements.
        assert!(registry.contains::<(u32, String)>());
        assert!(registry.contains::<u32>());
    }
}
