//! Encoding and decoding traits for persisted rows.

use crate::CoreError;

/// Current format version, embedded as the first byte of every row.
pub const FORMAT_VERSION: u8 = 1;

/// A type that can be serialized to the storage byte format.
pub trait Encoder: Sized {
    /// Encode this value to a fresh buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented.
    fn encode(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = Vec::new();
        self.encode_to(&mut buf)?;
        Ok(buf)
    }

    /// Append the encoded bytes to `buf`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented.
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError>;
}

/// A type that can be deserialized from the storage byte format.
pub trait Decoder: Sized {
    /// Decode a value from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error on truncated or malformed input, or on an
    /// unsupported format version.
    fn decode(bytes: &[u8]) -> Result<Self, CoreError>;
}
