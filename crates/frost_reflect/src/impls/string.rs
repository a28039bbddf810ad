use crate::Reflect;
use crate::serial::{SerialError, SerialReader, SerialWriter, read_string, write_string};

impl Reflect for String {
    fn serial_write(&self, writer: &mut dyn SerialWriter) -> Result<(), SerialError> {
        write_string(writer, self)
    }

    fn serial_read(&mut self, reader: &mut dyn SerialReader) -> Result<(), SerialError> {
        *self = read_string(reader)?;
        Ok(())
    }
}
