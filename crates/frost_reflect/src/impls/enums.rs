/// Implements [`Reflect`](crate::Reflect) for a unit-variant enum, encoding
/// it as its integer discriminant.
///
/// Reading back matches the discriminant against the listed variants and
/// fails with [`SerialError::InvalidEnumValue`](crate::serial::SerialError)
/// when the stream holds a value that is none of them.
///
/// ```
/// use frost_reflect::impl_reflect_enum;
///
/// #[derive(Debug, Default, Clone, Copy, PartialEq)]
/// enum Quality {
///     #[default]
///     Low = 0,
///     Medium = 1,
///     High = 2,
/// }
///
/// impl_reflect_enum!(Quality { Quality::Low, Quality::Medium, Quality::High });
/// ```
#[macro_export]
macro_rules! impl_reflect_enum {
    ($ty:ty { $($variant:path),+ $(,)? }) => {
        impl $crate::Reflect for $ty {
            const IS_INTEGRAL: bool = true;
            const IS_COMPLEX: bool = false;

            fn serial_write(
                &self,
                writer: &mut dyn $crate::serial::SerialWriter,
            ) -> ::core::result::Result<(), $crate::serial::SerialError> {
                writer.write_value(
                    &$crate::info::TypeInfo::of::<Self>(),
                    $crate::serial::Scalar::Unsigned(self.clone() as u64),
                )
            }

            fn serial_read(
                &mut self,
                reader: &mut dyn $crate::serial::SerialReader,
            ) -> ::core::result::Result<(), $crate::serial::SerialError> {
                let value = reader
                    .read_value(&$crate::info::TypeInfo::of::<Self>())?
                    .as_unsigned()?;
                $(
                    if value == ($variant as u64) {
                        *self = $variant;
                        return Ok(());
                    }
                )+
                Err($crate::serial::SerialError::InvalidEnumValue {
                    value,
                    type_path: ::core::any::type_name::<Self>(),
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::registry::TypeRegistryArc;
    use crate::serial::{RecordReader, RecordWriter, SerialError, read, write};

    #[derive(Debug, Default, Clone, Copy, PartialEq)]
    enum Biome {
        #[default]
        Plains = 0,
        Desert = 4,
        Tundra = 9,
    }

    impl_reflect_enum!(Biome { Biome::Plains, Biome::Desert, Biome::Tundra });

    #[test]
    fn enums_travel_as_discriminants() {
        let registry = TypeRegistryArc::default();
        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &Biome::Tundra).unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out = Biome::default();
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, Biome::Tundra);
    }

    #[test]
    fn unknown_discriminants_are_rejected() {
        let registry = TypeRegistryArc::default();
        let mut writer = RecordWriter::new(registry.clone());
        // 5 is between Desert and Tundra but names no variant.
        write(&mut writer, &5u64).unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out = Biome::default();
        assert!(matches!(
            read(&mut reader, &mut out),
            Err(SerialError::InvalidEnumValue { value: 5, .. })
        ));
    }
}
