use crate::Reflect;
use crate::serial::{SerialError, SerialReader, SerialWriter, read_member, write_member};

// -----------------------------------------------------------------------------
// PseudoWriter

/// Emits class structure for a type whose members are not described.
///
/// A custom codec uses this to frame hand-picked fields exactly like a
/// described class, so the stream is indistinguishable from a member walk:
///
/// ```
/// use frost_reflect::serial::{PseudoWriter, SerialError, SerialWriter};
///
/// #[derive(Debug, Default, Clone)]
/// struct Color { r: f32, g: f32, b: f32, a: f32 }
/// impl frost_reflect::Reflect for Color {}
///
/// fn write_color(writer: &mut dyn SerialWriter, color: &Color) -> Result<(), SerialError> {
///     PseudoWriter::begin::<Color>(writer)?
///         .member("r", &color.r)?
///         .member("g", &color.g)?
///         .member("b", &color.b)?
///         .member("a", &color.a)?
///         .end()
/// }
/// ```
///
/// [`end`](Self::end) must be called exactly once; a frame abandoned after an
/// error is never closed, matching the engine's abort-on-error contract.
pub struct PseudoWriter<'w> {
    writer: &'w mut dyn SerialWriter,
    written: usize,
}

impl<'w> PseudoWriter<'w> {
    /// Opens a class frame for `T`.
    pub fn begin<T: Reflect>(writer: &'w mut dyn SerialWriter) -> Result<Self, SerialError> {
        let descriptor = writer.registry().clone().write().descriptor_of::<T>();
        writer.class_begin(&descriptor)?;
        Ok(Self { writer, written: 0 })
    }

    /// Writes one named member, inserting the class delimiter as needed.
    pub fn member<M: Reflect>(
        &mut self,
        name: &str,
        value: &M,
    ) -> Result<&mut Self, SerialError> {
        self.delimit()?;
        let descriptor = self.writer.registry().clone().write().descriptor_of::<M>();
        write_member(self.writer, &descriptor, name, value)?;
        Ok(self)
    }

    /// Frames one named member of type `M` and hands the body to `f`, for
    /// members that themselves need a hand-written encoding.
    pub fn member_with<M: Reflect>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut dyn SerialWriter) -> Result<(), SerialError>,
    ) -> Result<&mut Self, SerialError> {
        self.delimit()?;
        let descriptor = self.writer.registry().clone().write().descriptor_of::<M>();
        self.writer.member_begin(&descriptor, name)?;
        f(self.writer)?;
        self.writer.member_end()?;
        Ok(self)
    }

    /// Closes the class frame.
    pub fn end(&mut self) -> Result<(), SerialError> {
        self.writer.class_end()
    }

    fn delimit(&mut self) -> Result<(), SerialError> {
        if self.written != 0 {
            self.writer.class_delim()?;
        }
        self.written += 1;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// PseudoReader

/// Mirror of [`PseudoWriter`]: consumes a pseudo-class frame member by
/// member, in the same order it was written.
pub struct PseudoReader<'r> {
    reader: &'r mut dyn SerialReader,
    consumed: usize,
}

impl<'r> PseudoReader<'r> {
    /// Opens the class frame written for `T`.
    pub fn begin<T: Reflect>(reader: &'r mut dyn SerialReader) -> Result<Self, SerialError> {
        let descriptor = reader.registry().clone().write().descriptor_of::<T>();
        reader.class_begin(&descriptor)?;
        Ok(Self {
            reader,
            consumed: 0,
        })
    }

    /// Reads one named member into `value`.
    pub fn member<M: Reflect>(
        &mut self,
        name: &str,
        value: &mut M,
    ) -> Result<&mut Self, SerialError> {
        self.delimit()?;
        let descriptor = self.reader.registry().clone().write().descriptor_of::<M>();
        read_member(self.reader, &descriptor, name, value)?;
        Ok(self)
    }

    /// Frames one named member of type `M` and hands the body to `f`.
    pub fn member_with<M: Reflect>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut dyn SerialReader) -> Result<(), SerialError>,
    ) -> Result<&mut Self, SerialError> {
        self.delimit()?;
        let descriptor = self.reader.registry().clone().write().descriptor_of::<M>();
        self.reader.member_begin(&descriptor, name)?;
        f(self.reader)?;
        self.reader.member_end()?;
        Ok(self)
    }

    /// Closes the class frame.
    pub fn end(&mut self) -> Result<(), SerialError> {
        self.reader.class_end()
    }

    fn delimit(&mut self) -> Result<(), SerialError> {
        if self.consumed != 0 {
            self.reader.class_delim()?;
        }
        self.consumed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistryArc;
    use crate::serial::{RecordReader, RecordWriter};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Rgba {
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    }

    impl Reflect for Rgba {}

    #[test]
    fn pseudo_frames_round_trip() {
        let registry = TypeRegistryArc::default();
        let color = Rgba {
            r: 0.25,
            g: 0.5,
            b: 0.75,
            a: 1.0,
        };

        let mut writer = RecordWriter::new(registry.clone());
        PseudoWriter::begin::<Rgba>(&mut writer)
            .unwrap()
            .member("r", &color.r)
            .unwrap()
            .member("g", &color.g)
            .unwrap()
            .member("b", &color.b)
            .unwrap()
            .member("a", &color.a)
            .unwrap()
            .end()
            .unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out = Rgba::default();
        PseudoReader::begin::<Rgba>(&mut reader)
            .unwrap()
            .member("r", &mut out.r)
            .unwrap()
            .member("g", &mut out.g)
            .unwrap()
            .member("b", &mut out.b)
            .unwrap()
            .member("a", &mut out.a)
            .unwrap()
            .end()
            .unwrap();

        assert_eq!(out, color);
        assert!(reader.is_exhausted());
    }
}
