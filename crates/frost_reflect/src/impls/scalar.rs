use crate::Reflect;
use crate::info::TypeInfo;
use crate::serial::{Scalar, SerialError, SerialReader, SerialWriter};

// Integers widen into the carrier on write and narrow with a range check on
// read, so a stream written on one platform reads back on any other as long
// as the value fits.

macro_rules! impl_reflect_unsigned {
    ($($ty:ty),* $(,)?) => {$(
        impl Reflect for $ty {
            const IS_INTEGRAL: bool = true;
            const IS_COMPLEX: bool = false;

            fn serial_write(&self, writer: &mut dyn SerialWriter) -> Result<(), SerialError> {
                writer.write_value(&TypeInfo::of::<Self>(), Scalar::Unsigned(*self as u64))
            }

            fn serial_read(&mut self, reader: &mut dyn SerialReader) -> Result<(), SerialError> {
                let value = reader.read_value(&TypeInfo::of::<Self>())?.as_unsigned()?;
                *self = <$ty>::try_from(value).map_err(|_| SerialError::OutOfRange {
                    type_path: core::any::type_name::<Self>(),
                })?;
                Ok(())
            }
        }
    )*};
}

macro_rules! impl_reflect_signed {
    ($($ty:ty),* $(,)?) => {$(
        impl Reflect for $ty {
            const IS_INTEGRAL: bool = true;
            const IS_COMPLEX: bool = false;

            fn serial_write(&self, writer: &mut dyn SerialWriter) -> Result<(), SerialError> {
                writer.write_value(&TypeInfo::of::<Self>(), Scalar::Signed(*self as i64))
            }

            fn serial_read(&mut self, reader: &mut dyn SerialReader) -> Result<(), SerialError> {
                let value = reader.read_value(&TypeInfo::of::<Self>())?.as_signed()?;
                *self = <$ty>::try_from(value).map_err(|_| SerialError::OutOfRange {
                    type_path: core::any::type_name::<Self>(),
                })?;
                Ok(())
            }
        }
    )*};
}

macro_rules! impl_reflect_float {
    ($($ty:ty),* $(,)?) => {$(
        impl Reflect for $ty {
            const IS_FLOATING: bool = true;
            const IS_COMPLEX: bool = false;

            fn serial_write(&self, writer: &mut dyn SerialWriter) -> Result<(), SerialError> {
                writer.write_value(&TypeInfo::of::<Self>(), Scalar::Float(*self as f64))
            }

            fn serial_read(&mut self, reader: &mut dyn SerialReader) -> Result<(), SerialError> {
                let value = reader.read_value(&TypeInfo::of::<Self>())?.as_float()?;
                *self = value as $ty;
                Ok(())
            }
        }
    )*};
}

impl_reflect_unsigned!(u8, u16, u32, u64, usize);
impl_reflect_signed!(i8, i16, i32, i64, isize);
impl_reflect_float!(f32, f64);

impl Reflect for bool {
    const IS_INTEGRAL: bool = true;
    const IS_COMPLEX: bool = false;

    fn serial_write(&self, writer: &mut dyn SerialWriter) -> Result<(), SerialError> {
        writer.write_value(&TypeInfo::of::<Self>(), Scalar::Bool(*self))
    }

    fn serial_read(&mut self, reader: &mut dyn SerialReader) -> Result<(), SerialError> {
        *self = reader.read_value(&TypeInfo::of::<Self>())?.as_bool()?;
        Ok(())
    }
}

impl Reflect for char {
    const IS_INTEGRAL: bool = true;
    const IS_COMPLEX: bool = false;

    fn serial_write(&self, writer: &mut dyn SerialWriter) -> Result<(), SerialError> {
        writer.write_value(&TypeInfo::of::<Self>(), Scalar::Char(*self))
    }

    fn serial_read(&mut self, reader: &mut dyn SerialReader) -> Result<(), SerialError> {
        *self = reader.read_value(&TypeInfo::of::<Self>())?.as_char()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::TypeRegistryArc;
    use crate::serial::{RecordReader, RecordWriter, SerialError, read, write};

    #[test]
    fn narrowing_reads_are_range_checked() {
        let registry = TypeRegistryArc::default();
        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &300u64).unwrap();

        // The stream holds 300, which does not fit the u8 target.
        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out = 0u8;
        assert!(matches!(
            read(&mut reader, &mut out),
            Err(SerialError::OutOfRange { .. })
        ));
    }

    #[test]
    fn widths_can_differ_when_the_value_fits() {
        let registry = TypeRegistryArc::default();
        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &-42i8).unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out = 0i64;
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, -42);
    }

    #[test]
    fn bool_and_char_round_trip() {
        let registry = TypeRegistryArc::default();
        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &true).unwrap();
        write(&mut writer, &'ß').unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut flag = false;
        let mut letter = ' ';
        read(&mut reader, &mut flag).unwrap();
        read(&mut reader, &mut letter).unwrap();
        assert!(flag);
        assert_eq!(letter, 'ß');
    }
}
