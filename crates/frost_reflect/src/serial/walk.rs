//! The descriptor-walking core of the engine.
//!
//! [`write_class`] / [`read_class`] implement the member-walk rule: a type
//! with a custom codec, or with no members at all, is dispatched to its codec;
//! anything else is framed as a class and its members are walked in
//! declaration order. The helpers below it ([`write_string`],
//! [`write_sequence`], [`write_pairs`] and their read mirrors) are the shared
//! building blocks the container impls are made of.

use crate::Reflect;
use crate::info::TypeDescriptor;
use crate::serial::{SerialError, SerialReader, SerialWriter};
use crate::value::{AnyMut, AnyRef};

// -----------------------------------------------------------------------------
// Entry points

/// Serializes `value` through `writer`, registering `T` on first use.
pub fn write<T: Reflect>(writer: &mut dyn SerialWriter, value: &T) -> Result<(), SerialError> {
    let descriptor = writer.registry().clone().write().descriptor_of::<T>();
    write_class(writer, &descriptor, value)
}

/// Deserializes into `value` from `reader`, registering `T` on first use.
pub fn read<T: Reflect>(reader: &mut dyn SerialReader, value: &mut T) -> Result<(), SerialError> {
    let descriptor = reader.registry().clone().write().descriptor_of::<T>();
    read_class(reader, &descriptor, value)
}

// -----------------------------------------------------------------------------
// Class walk

/// Writes one erased value of the described type.
///
/// A custom or generic codec short-circuits the walk; so does the absence of
/// members, which routes leaves to their built-in codec and surfaces
/// [`SerialError::MissingCodec`] for types nobody described.
pub fn write_class(
    writer: &mut dyn SerialWriter,
    descriptor: &TypeDescriptor,
    value: AnyRef<'_>,
) -> Result<(), SerialError> {
    if descriptor.has_custom_write() || !descriptor.has_members() {
        return descriptor.dispatch_write(writer, value);
    }

    writer.class_begin(descriptor)?;
    for index in 0..descriptor.member_count() {
        if index != 0 {
            writer.class_delim()?;
        }
        // Projection happens under the descriptor lock; the write itself runs
        // after the lock is released so nested walks can resolve types.
        let (name, member_descriptor, member_value) = descriptor.with_members(|members| {
            let member = &members[index];
            (
                member.name().to_string(),
                member.descriptor().clone(),
                member.get(value),
            )
        });
        write_member(writer, &member_descriptor, &name, member_value)?;
    }
    writer.class_end()
}

/// Mirror of [`write_class`]: fills `value` member by member in declaration
/// order.
pub fn read_class(
    reader: &mut dyn SerialReader,
    descriptor: &TypeDescriptor,
    value: AnyMut<'_>,
) -> Result<(), SerialError> {
    if descriptor.has_custom_read() || !descriptor.has_members() {
        return descriptor.dispatch_read(reader, value);
    }

    reader.class_begin(descriptor)?;
    for index in 0..descriptor.member_count() {
        if index != 0 {
            reader.class_delim()?;
        }
        let owner = &mut *value;
        let (name, member_descriptor, member_value) = descriptor.with_members(move |members| {
            let member = &members[index];
            (
                member.name().to_string(),
                member.descriptor().clone(),
                member.get_mut(owner),
            )
        });
        read_member(reader, &member_descriptor, &name, member_value)?;
    }
    reader.class_end()
}

/// Frames one named member and recurses into its value.
pub fn write_member(
    writer: &mut dyn SerialWriter,
    descriptor: &TypeDescriptor,
    name: &str,
    value: AnyRef<'_>,
) -> Result<(), SerialError> {
    writer.member_begin(descriptor, name)?;
    write_class(writer, descriptor, value)?;
    writer.member_end()
}

/// Mirror of [`write_member`].
pub fn read_member(
    reader: &mut dyn SerialReader,
    descriptor: &TypeDescriptor,
    name: &str,
    value: AnyMut<'_>,
) -> Result<(), SerialError> {
    reader.member_begin(descriptor, name)?;
    read_class(reader, descriptor, value)?;
    reader.member_end()
}

// -----------------------------------------------------------------------------
// Strings

/// Writes a string as a length-prefixed byte run.
pub fn write_string(writer: &mut dyn SerialWriter, value: &str) -> Result<(), SerialError> {
    let bytes = value.as_bytes();
    writer.string_begin(bytes.len())?;
    writer.write_bytes(bytes)?;
    writer.string_end()
}

/// Mirror of [`write_string`]; rejects payloads that are not valid UTF-8.
pub fn read_string(reader: &mut dyn SerialReader) -> Result<String, SerialError> {
    let length = reader.read_length()?;
    reader.string_begin(length)?;
    let mut bytes = vec![0u8; length];
    reader.read_bytes(&mut bytes)?;
    reader.string_end()?;
    Ok(String::from_utf8(bytes)?)
}

// -----------------------------------------------------------------------------
// Homogeneous runs

/// Writes an iterator of elements as a length-prefixed homogeneous run.
pub fn write_sequence<'a, T: Reflect>(
    writer: &mut dyn SerialWriter,
    items: impl ExactSizeIterator<Item = &'a T>,
) -> Result<(), SerialError> {
    let descriptor = writer.registry().clone().write().descriptor_of::<T>();
    writer.array_begin(&descriptor, items.len())?;
    for (index, item) in items.enumerate() {
        if index != 0 {
            writer.array_delim()?;
        }
        write_class(writer, &descriptor, item)?;
    }
    writer.array_end()
}

/// Mirror of [`write_sequence`]: reads the length, then feeds each
/// deserialized element to `insert`.
pub fn read_sequence<T: Reflect>(
    reader: &mut dyn SerialReader,
    mut insert: impl FnMut(T),
) -> Result<(), SerialError> {
    let descriptor = reader.registry().clone().write().descriptor_of::<T>();
    let length = reader.read_length()?;
    reader.array_begin(&descriptor, length)?;
    for index in 0..length {
        if index != 0 {
            reader.array_delim()?;
        }
        let mut item = T::default();
        read_class(reader, &descriptor, &mut item)?;
        insert(item);
    }
    reader.array_end()
}

/// Writes key/value entries as a run of pairs. Entries are cloned into a
/// `(K, V)` so each travels as one pair value.
pub fn write_pairs<'a, K: Reflect, V: Reflect>(
    writer: &mut dyn SerialWriter,
    entries: impl ExactSizeIterator<Item = (&'a K, &'a V)>,
) -> Result<(), SerialError> {
    let descriptor = writer.registry().clone().write().descriptor_of::<(K, V)>();
    writer.array_begin(&descriptor, entries.len())?;
    for (index, (key, value)) in entries.enumerate() {
        if index != 0 {
            writer.array_delim()?;
        }
        let entry = (key.clone(), value.clone());
        write_class(writer, &descriptor, &entry)?;
    }
    writer.array_end()
}

/// Mirror of [`write_pairs`]: feeds each deserialized entry to `insert`.
pub fn read_pairs<K: Reflect, V: Reflect>(
    reader: &mut dyn SerialReader,
    mut insert: impl FnMut(K, V),
) -> Result<(), SerialError> {
    let descriptor = reader.registry().clone().write().descriptor_of::<(K, V)>();
    let length = reader.read_length()?;
    reader.array_begin(&descriptor, length)?;
    for index in 0..length {
        if index != 0 {
            reader.array_delim()?;
        }
        let mut entry = <(K, V)>::default();
        read_class(reader, &descriptor, &mut entry)?;
        insert(entry.0, entry.1);
    }
    reader.array_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistryArc;
    use crate::serial::{RecordReader, RecordWriter};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Opaque;

    impl Reflect for Opaque {}

    #[test]
    fn leaf_scalars_round_trip() {
        let registry = TypeRegistryArc::default();
        let mut writer = RecordWriter::new(registry.clone());

        write(&mut writer, &42u32).unwrap();
        write(&mut writer, &-7i16).unwrap();
        write(&mut writer, &true).unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut a = 0u32;
        let mut b = 0i16;
        let mut c = false;
        read(&mut reader, &mut a).unwrap();
        read(&mut reader, &mut b).unwrap();
        read(&mut reader, &mut c).unwrap();

        assert_eq!((a, b, c), (42, -7, true));
    }

    #[test]
    fn strings_round_trip() {
        let registry = TypeRegistryArc::default();
        let mut writer = RecordWriter::new(registry.clone());

        write(&mut writer, &String::from("héllo")).unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out = String::new();
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, "héllo");
    }

    #[test]
    fn undescribed_memberless_type_reports_missing_codec() {
        let registry = TypeRegistryArc::default();
        let mut writer = RecordWriter::new(registry);

        let result = write(&mut writer, &Opaque);
        assert!(matches!(result, Err(SerialError::MissingCodec { .. })));
    }
}
