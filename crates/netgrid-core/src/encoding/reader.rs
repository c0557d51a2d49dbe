//! Cursor over an encoded row.

use crate::CoreError;

fn truncated() -> CoreError {
    CoreError::encoding("unexpected end of input")
}

/// A forward-only reader over an encoded byte slice.
///
/// Every `take_*` method advances the position and fails with an encoding
/// error on truncated input, which keeps the row decoders free of manual
/// offset arithmetic.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader over `buf`.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Consume `n` raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an encoding error if fewer than `n` bytes remain.
    pub fn take_bytes(&mut self, n: usize) -> Result<&'a [u8], CoreError> {
        if self.remaining() < n {
            return Err(truncated());
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Consume one byte.
    ///
    /// # Errors
    ///
    /// Returns an encoding error on truncated input.
    pub fn take_u8(&mut self) -> Result<u8, CoreError> {
        Ok(self.take_bytes(1)?[0])
    }

    /// Consume a big-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns an encoding error on truncated input.
    pub fn take_u32(&mut self) -> Result<u32, CoreError> {
        let bytes = self.take_bytes(4)?;
        let arr: [u8; 4] = bytes.try_into().map_err(|_| truncated())?;
        Ok(u32::from_be_bytes(arr))
    }

    /// Consume a big-endian `u64`.
    ///
    /// # Errors
    ///
    /// Returns an encoding error on truncated input.
    pub fn take_u64(&mut self) -> Result<u64, CoreError> {
        let bytes = self.take_bytes(8)?;
        let arr: [u8; 8] = bytes.try_into().map_err(|_| truncated())?;
        Ok(u64::from_be_bytes(arr))
    }

    /// Consume a big-endian `i32`.
    ///
    /// # Errors
    ///
    /// Returns an encoding error on truncated input.
    pub fn take_i32(&mut self) -> Result<i32, CoreError> {
        let bytes = self.take_bytes(4)?;
        let arr: [u8; 4] = bytes.try_into().map_err(|_| truncated())?;
        Ok(i32::from_be_bytes(arr))
    }

    /// Consume an `f64` stored as big-endian IEEE-754 bits.
    ///
    /// # Errors
    ///
    /// Returns an encoding error on truncated input.
    pub fn take_f64(&mut self) -> Result<f64, CoreError> {
        Ok(f64::from_bits(self.take_u64()?))
    }

    /// Consume a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an encoding error on truncated or non-UTF-8 input.
    pub fn take_string(&mut self) -> Result<String, CoreError> {
        let len = self.take_u32()? as usize;
        let bytes = self.take_bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| CoreError::encoding(format!("invalid UTF-8: {e}")))
    }

    /// Consume and verify the leading format-version byte.
    ///
    /// # Errors
    ///
    /// Returns an encoding error if the version does not match.
    pub fn expect_version(&mut self, expected: u8) -> Result<(), CoreError> {
        let version = self.take_u8()?;
        if version != expected {
            return Err(CoreError::encoding(format!(
                "unsupported format version: {version}, expected {expected}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_in_sequence() {
        let mut buf = Vec::new();
        buf.push(1u8);
        buf.extend_from_slice(&42u64.to_be_bytes());
        buf.extend_from_slice(&7u32.to_be_bytes());

        let mut r = ByteReader::new(&buf);
        assert_eq!(r.take_u8().expect("u8"), 1);
        assert_eq!(r.take_u64().expect("u64"), 42);
        assert_eq!(r.take_u32().expect("u32"), 7);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn truncated_input_is_an_error() {
        let mut r = ByteReader::new(&[0u8; 3]);
        assert!(r.take_u64().is_err());
    }

    #[test]
    fn version_mismatch_is_an_error() {
        let mut r = ByteReader::new(&[9u8]);
        assert!(r.expect_version(1).is_err());
    }
}
