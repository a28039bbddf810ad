//! The format-agnostic serialization engine.
//!
//! The engine walks descriptor graphs ([`write_class`] / [`read_class`]) and
//! emits structural events into a format backend implementing
//! [`SerialWriter`] or [`SerialReader`]. Backends decide bytes; the engine
//! decides structure.
//!
//! Compatibility between a written stream and a reader is positional: members
//! are replayed in declaration order with no name-based matching, so streams
//! survive member renames but not reorders, insertions, or type changes.

mod error;
mod pseudo;
mod record;
mod scalar;
mod walk;

pub use error::SerialError;
pub use pseudo::{PseudoReader, PseudoWriter};
pub use record::{Event, RecordReader, RecordWriter};
pub use scalar::Scalar;
pub use walk::{
    read, read_class, read_member, read_pairs, read_sequence, read_string, write, write_class,
    write_member, write_pairs, write_sequence, write_string,
};

use crate::info::{TypeDescriptor, TypeInfo};
use crate::registry::TypeRegistryArc;

// -----------------------------------------------------------------------------
// SerialWriter

/// Output contract a format backend implements.
///
/// The engine reports structure through the `*_begin` / `*_delim` / `*_end`
/// families and hands leaf data to [`write_value`](Self::write_value) /
/// [`write_bytes`](Self::write_bytes). Structural methods default to doing
/// nothing, so a dense binary backend only implements the leaf methods while
/// a text backend overrides the structural ones to print punctuation.
pub trait SerialWriter {
    /// The registry this writer resolves descriptors against.
    fn registry(&self) -> &TypeRegistryArc;

    /// A structured value with members begins.
    fn class_begin(&mut self, _descriptor: &TypeDescriptor) -> Result<(), SerialError> {
        Ok(())
    }

    /// Separator between two members of the current class.
    fn class_delim(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    /// The current structured value ends.
    fn class_end(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    /// A named member of the current class begins; `descriptor` is the
    /// member's own type.
    fn member_begin(&mut self, _descriptor: &TypeDescriptor, _name: &str) -> Result<(), SerialError> {
        Ok(())
    }

    fn member_end(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    /// A homogeneous run of `length` values of the `element` type begins.
    /// Backends must preserve the length; readers replay it before elements.
    fn array_begin(&mut self, _element: &TypeDescriptor, _length: usize) -> Result<(), SerialError> {
        Ok(())
    }

    fn array_delim(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    fn array_end(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    /// A string payload of `length` bytes begins, delivered through
    /// [`write_bytes`](Self::write_bytes).
    fn string_begin(&mut self, _length: usize) -> Result<(), SerialError> {
        Ok(())
    }

    fn string_end(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    /// Emits one leaf value. `info` carries the exact width and
    /// classification of the source type for backends that encode by width.
    fn write_value(&mut self, info: &TypeInfo, value: Scalar) -> Result<(), SerialError>;

    /// Emits raw bytes (string payloads).
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SerialError>;
}

// -----------------------------------------------------------------------------
// SerialReader

/// Input contract a format backend implements, mirror of [`SerialWriter`].
///
/// Structural methods are notifications that let a backend consume its own
/// punctuation and verify it is still in sync with the descriptor walk.
pub trait SerialReader {
    /// The registry this reader resolves descriptors against.
    fn registry(&self) -> &TypeRegistryArc;

    fn class_begin(&mut self, _descriptor: &TypeDescriptor) -> Result<(), SerialError> {
        Ok(())
    }

    fn class_delim(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    fn class_end(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    fn member_begin(&mut self, _descriptor: &TypeDescriptor, _name: &str) -> Result<(), SerialError> {
        Ok(())
    }

    fn member_end(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    /// Consumes the header of a homogeneous run whose length was already
    /// obtained through [`read_length`](Self::read_length).
    fn array_begin(&mut self, _element: &TypeDescriptor, _length: usize) -> Result<(), SerialError> {
        Ok(())
    }

    fn array_delim(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    fn array_end(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    fn string_begin(&mut self, _length: usize) -> Result<(), SerialError> {
        Ok(())
    }

    fn string_end(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    /// Produces the length of the upcoming array or string without consuming
    /// its header; the engine sizes the target container from this before
    /// calling the matching `*_begin`.
    fn read_length(&mut self) -> Result<usize, SerialError>;

    /// Produces one leaf value. `info` is the target type the engine is
    /// filling, so width-sensitive backends know how many bytes to decode.
    fn read_value(&mut self, info: &TypeInfo) -> Result<Scalar, SerialError>;

    /// Fills `bytes` from the stream (string payloads).
    fn read_bytes(&mut self, bytes: &mut [u8]) -> Result<(), SerialError>;
}
