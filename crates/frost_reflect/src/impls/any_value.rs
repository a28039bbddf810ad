//! Dynamic serialization of [`AnyValue`].
//!
//! An `AnyValue` travels as a two-member class `{ name, data }`: the display
//! name of the held type, then its payload. Reading resolves the name against
//! the reader's registry, constructs a fresh instance, and fills it, so the
//! concrete type is picked at read time rather than compile time.

use crate::Reflect;
use crate::serial::{
    SerialError, SerialReader, SerialWriter, read_class, read_member, write_class, write_member,
};
use crate::value::AnyValue;

impl Reflect for AnyValue<'static> {
    fn type_name() -> &'static str {
        "AnyValue"
    }

    fn serial_write(&self, writer: &mut dyn SerialWriter) -> Result<(), SerialError> {
        let descriptor = self.descriptor().ok_or(SerialError::EmptyValue)?.clone();
        let data = self.data().ok_or(SerialError::EmptyValue)?;

        let self_descriptor = writer.registry().clone().write().descriptor_of::<Self>();
        let name_descriptor = writer.registry().clone().write().descriptor_of::<String>();

        writer.class_begin(&self_descriptor)?;
        write_member(writer, &name_descriptor, "name", &descriptor.name())?;
        writer.class_delim()?;
        writer.member_begin(&descriptor, "data")?;
        write_class(writer, &descriptor, data)?;
        writer.member_end()?;
        writer.class_end()
    }

    fn serial_read(&mut self, reader: &mut dyn SerialReader) -> Result<(), SerialError> {
        let self_descriptor = reader.registry().clone().write().descriptor_of::<Self>();
        let name_descriptor = reader.registry().clone().write().descriptor_of::<String>();

        reader.class_begin(&self_descriptor)?;
        let mut name = String::new();
        read_member(reader, &name_descriptor, "name", &mut name)?;
        reader.class_delim()?;

        let descriptor = reader
            .registry()
            .clone()
            .read()
            .get_with_name(&name)
            .ok_or_else(|| SerialError::UnknownType { name: name.clone() })?;

        let mut value = AnyValue::construct(&descriptor);
        reader.member_begin(&descriptor, "data")?;
        {
            let data = value
                .data_mut()
                .expect("freshly constructed AnyValue is owned");
            read_class(reader, &descriptor, data)?;
        }
        reader.member_end()?;
        reader.class_end()?;

        *self = value;
        Ok(())
    }
}
