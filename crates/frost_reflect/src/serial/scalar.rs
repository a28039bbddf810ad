use crate::serial::SerialError;

// -----------------------------------------------------------------------------
// Scalar

/// Leaf-value carrier for the [`write_value`](crate::serial::SerialWriter::write_value)
/// / [`read_value`](crate::serial::SerialReader::read_value) primitives.
///
/// Trait objects cannot expose a method generic over the concrete numeric
/// type, so leaf values cross the stream contract in this enum. The exact
/// byte width of the leaf travels alongside in its
/// [`TypeInfo`](crate::info::TypeInfo), which is what binary backends encode
/// from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Char(char),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl Scalar {
    /// Name of the held kind, used in error reports.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::Unsigned(_) => "unsigned",
            Self::Signed(_) => "signed",
            Self::Float(_) => "float",
        }
    }

    pub fn as_bool(&self) -> Result<bool, SerialError> {
        match *self {
            Self::Bool(value) => Ok(value),
            _ => Err(self.mismatch("bool")),
        }
    }

    pub fn as_char(&self) -> Result<char, SerialError> {
        match *self {
            Self::Char(value) => Ok(value),
            _ => Err(self.mismatch("char")),
        }
    }

    pub fn as_unsigned(&self) -> Result<u64, SerialError> {
        match *self {
            Self::Unsigned(value) => Ok(value),
            _ => Err(self.mismatch("unsigned")),
        }
    }

    pub fn as_signed(&self) -> Result<i64, SerialError> {
        match *self {
            Self::Signed(value) => Ok(value),
            _ => Err(self.mismatch("signed")),
        }
    }

    pub fn as_float(&self) -> Result<f64, SerialError> {
        match *self {
            Self::Float(value) => Ok(value),
            _ => Err(self.mismatch("float")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> SerialError {
        SerialError::UnexpectedScalar {
            expected,
            found: self.kind(),
        }
    }
}
