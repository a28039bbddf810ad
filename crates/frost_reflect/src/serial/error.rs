use thiserror::Error;

use crate::value::CastError;

// -----------------------------------------------------------------------------
// SerialError

/// Error surfaced by the serialization engine and by format backends.
///
/// A failure anywhere inside `write_class` / `read_class` aborts the whole
/// call; there is no partial-object recovery, the instance under construction
/// must be discarded by the caller.
#[derive(Debug, Error)]
pub enum SerialError {
    /// A type-erased value did not hold the type the descriptor claimed.
    #[error(transparent)]
    Cast(#[from] CastError),

    /// The type has no members, no custom codec, and no built-in leaf codec.
    #[error("type `{type_path}` has no members and no codec installed")]
    MissingCodec { type_path: &'static str },

    /// Dynamic deserialization named a type this registry has never seen.
    #[error("no registered type is named `{name}`")]
    UnknownType { name: String },

    /// A leaf value of a different scalar kind was produced by the stream.
    #[error("scalar kind mismatch: expected {expected}, found {found}")]
    UnexpectedScalar {
        expected: &'static str,
        found: &'static str,
    },

    /// A scalar read back from the stream does not fit the target type.
    #[error("scalar value out of range for `{type_path}`")]
    OutOfRange { type_path: &'static str },

    /// An enum discriminant read back from the stream matches no variant.
    #[error("value {value} is not a variant of `{type_path}`")]
    InvalidEnumValue {
        value: u64,
        type_path: &'static str,
    },

    /// A string payload was not valid UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// An [`AnyValue`](crate::AnyValue) without a value reached the engine.
    #[error("empty AnyValue cannot be serialized")]
    EmptyValue,

    /// The input stream ended inside a value.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// The input stream does not follow the protocol at the current position.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// I/O failure in a stream-backed format backend.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
