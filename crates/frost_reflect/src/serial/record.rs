//! An in-memory backend that records the engine's event stream and replays it.
//!
//! [`RecordWriter`] captures every structural call and leaf value as an
//! [`Event`]; [`RecordReader`] replays them while verifying that the reading
//! walk asks for the same structure the writing walk produced. Useful as a
//! reference backend, for tests, and for re-emitting a capture into another
//! backend later.

use core::any::TypeId;
use std::collections::VecDeque;

use crate::info::{TypeDescriptor, TypeInfo};
use crate::registry::TypeRegistryArc;
use crate::serial::{Scalar, SerialError, SerialReader, SerialWriter};

// -----------------------------------------------------------------------------
// Event

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ClassBegin(TypeId),
    ClassDelim,
    ClassEnd,
    MemberBegin(TypeId, String),
    MemberEnd,
    ArrayBegin(TypeId, usize),
    ArrayDelim,
    ArrayEnd,
    StringBegin(usize),
    StringEnd,
    Value(Scalar),
    Bytes(Vec<u8>),
}

// -----------------------------------------------------------------------------
// RecordWriter

/// Backend that appends every engine call to an event list.
pub struct RecordWriter {
    registry: TypeRegistryArc,
    events: Vec<Event>,
}

impl RecordWriter {
    pub fn new(registry: TypeRegistryArc) -> Self {
        Self {
            registry,
            events: Vec::new(),
        }
    }

    /// The recorded stream, in emission order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl SerialWriter for RecordWriter {
    fn registry(&self) -> &TypeRegistryArc {
        &self.registry
    }

    fn class_begin(&mut self, descriptor: &TypeDescriptor) -> Result<(), SerialError> {
        self.events.push(Event::ClassBegin(descriptor.id()));
        Ok(())
    }

    fn class_delim(&mut self) -> Result<(), SerialError> {
        self.events.push(Event::ClassDelim);
        Ok(())
    }

    fn class_end(&mut self) -> Result<(), SerialError> {
        self.events.push(Event::ClassEnd);
        Ok(())
    }

    fn member_begin(&mut self, descriptor: &TypeDescriptor, name: &str) -> Result<(), SerialError> {
        self.events
            .push(Event::MemberBegin(descriptor.id(), name.to_string()));
        Ok(())
    }

    fn member_end(&mut self) -> Result<(), SerialError> {
        self.events.push(Event::MemberEnd);
        Ok(())
    }

    fn array_begin(&mut self, element: &TypeDescriptor, length: usize) -> Result<(), SerialError> {
        self.events.push(Event::ArrayBegin(element.id(), length));
        Ok(())
    }

    fn array_delim(&mut self) -> Result<(), SerialError> {
        self.events.push(Event::ArrayDelim);
        Ok(())
    }

    fn array_end(&mut self) -> Result<(), SerialError> {
        self.events.push(Event::ArrayEnd);
        Ok(())
    }

    fn string_begin(&mut self, length: usize) -> Result<(), SerialError> {
        self.events.push(Event::StringBegin(length));
        Ok(())
    }

    fn string_end(&mut self) -> Result<(), SerialError> {
        self.events.push(Event::StringEnd);
        Ok(())
    }

    fn write_value(&mut self, _info: &TypeInfo, value: Scalar) -> Result<(), SerialError> {
        self.events.push(Event::Value(value));
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        self.events.push(Event::Bytes(bytes.to_vec()));
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// RecordReader

/// Backend that replays a recorded stream, verifying structure as it goes.
pub struct RecordReader {
    registry: TypeRegistryArc,
    events: VecDeque<Event>,
}

impl RecordReader {
    pub fn new(registry: TypeRegistryArc, events: Vec<Event>) -> Self {
        Self {
            registry,
            events: events.into(),
        }
    }

    /// Whether the whole recording has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.events.is_empty()
    }

    fn next(&mut self) -> Result<Event, SerialError> {
        self.events.pop_front().ok_or(SerialError::UnexpectedEof)
    }

    fn expect(&mut self, expected: Event) -> Result<(), SerialError> {
        let found = self.next()?;
        if found == expected {
            Ok(())
        } else {
            Err(SerialError::Malformed(format!(
                "expected {expected:?}, recorded stream holds {found:?}"
            )))
        }
    }
}

impl SerialReader for RecordReader {
    fn registry(&self) -> &TypeRegistryArc {
        &self.registry
    }

    fn class_begin(&mut self, descriptor: &TypeDescriptor) -> Result<(), SerialError> {
        self.expect(Event::ClassBegin(descriptor.id()))
    }

    fn class_delim(&mut self) -> Result<(), SerialError> {
        self.expect(Event::ClassDelim)
    }

    fn class_end(&mut self) -> Result<(), SerialError> {
        self.expect(Event::ClassEnd)
    }

    fn member_begin(&mut self, descriptor: &TypeDescriptor, name: &str) -> Result<(), SerialError> {
        // Names are recorded for inspection but compatibility stays
        // positional, so only the member's type is verified here.
        match self.next()? {
            Event::MemberBegin(id, _) if id == descriptor.id() => Ok(()),
            found => Err(SerialError::Malformed(format!(
                "expected member `{name}`, recorded stream holds {found:?}"
            ))),
        }
    }

    fn member_end(&mut self) -> Result<(), SerialError> {
        self.expect(Event::MemberEnd)
    }

    fn array_begin(&mut self, element: &TypeDescriptor, length: usize) -> Result<(), SerialError> {
        self.expect(Event::ArrayBegin(element.id(), length))
    }

    fn array_delim(&mut self) -> Result<(), SerialError> {
        self.expect(Event::ArrayDelim)
    }

    fn array_end(&mut self) -> Result<(), SerialError> {
        self.expect(Event::ArrayEnd)
    }

    fn string_begin(&mut self, length: usize) -> Result<(), SerialError> {
        self.expect(Event::StringBegin(length))
    }

    fn string_end(&mut self) -> Result<(), SerialError> {
        self.expect(Event::StringEnd)
    }

    fn read_length(&mut self) -> Result<usize, SerialError> {
        // Peeked, not consumed: the matching *_begin consumes the header.
        match self.events.front() {
            Some(Event::ArrayBegin(_, length)) => Ok(*length),
            Some(Event::StringBegin(length)) => Ok(*length),
            Some(found) => Err(SerialError::Malformed(format!(
                "expected an array or string header, recorded stream holds {found:?}"
            ))),
            None => Err(SerialError::UnexpectedEof),
        }
    }

    fn read_value(&mut self, _info: &TypeInfo) -> Result<Scalar, SerialError> {
        match self.next()? {
            Event::Value(value) => Ok(value),
            found => Err(SerialError::Malformed(format!(
                "expected a leaf value, recorded stream holds {found:?}"
            ))),
        }
    }

    fn read_bytes(&mut self, bytes: &mut [u8]) -> Result<(), SerialError> {
        match self.next()? {
            Event::Bytes(recorded) if recorded.len() == bytes.len() => {
                bytes.copy_from_slice(&recorded);
                Ok(())
            }
            found => Err(SerialError::Malformed(format!(
                "expected {} raw bytes, recorded stream holds {found:?}",
                bytes.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::{read, write};

    #[test]
    fn exhausted_reader_reports_eof() {
        let registry = TypeRegistryArc::default();
        let mut reader = RecordReader::new(registry, Vec::new());

        let mut out = 0u8;
        assert!(matches!(
            read(&mut reader, &mut out),
            Err(SerialError::UnexpectedEof)
        ));
    }

    #[test]
    fn replay_rejects_a_diverging_walk() {
        let registry = TypeRegistryArc::default();
        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &1.5f32).unwrap();

        let mut reader = RecordReader::new(registry, writer.into_events());
        let mut out = 0u32;
        assert!(matches!(
            read(&mut reader, &mut out),
            Err(SerialError::UnexpectedScalar { .. })
        ));
    }

    #[test]
    fn reader_tracks_consumption() {
        let registry = TypeRegistryArc::default();
        let mut writer = RecordWriter::new(registry.clone());
        write(&mut writer, &3u64).unwrap();
        assert_eq!(writer.events().len(), 1);

        let mut reader = RecordReader::new(registry, writer.into_events());
        assert!(!reader.is_exhausted());

        let mut out = 0u64;
        read(&mut reader, &mut out).unwrap();
        assert_eq!(out, 3);
        assert!(reader.is_exhausted());
    }
}
