//! Primitive encoding/decoding for side-files and archives.
//!
//! Everything is little-endian and fixed-width. Variable-length data
//! (strings, archive entries) carries a u32 length prefix.

use crate::error::{DecodeError, EncodeError};
use crate::limits::MAX_LIST_LEN;

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding binary data.
///
/// Wraps a byte slice and provides methods for reading primitives
/// with bounds checking and error handling.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the remaining bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Returns the number of remaining bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        if self.pos >= self.data.len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly n bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining_len() {
            return Err(DecodeError::UnexpectedEof { context });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    #[inline]
    fn read_array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_bytes(N, context)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Reads a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array(context)?))
    }

    /// Reads a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self, context: &'static str) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.read_array(context)?))
    }

    /// Reads a little-endian f32.
    #[inline]
    pub fn read_f32(&mut self, context: &'static str) -> Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.read_array(context)?))
    }

    /// Reads a little-endian f64.
    ///
    /// NaN is a legal list element, so no NaN check is made.
    #[inline]
    pub fn read_f64(&mut self, context: &'static str) -> Result<f64, DecodeError> {
        Ok(f64::from_le_bytes(self.read_array(context)?))
    }

    /// Reads a u32 record count and checks it against the list limit and
    /// the bytes left, given the minimum encoded size of one record.
    pub fn read_count(
        &mut self,
        record_size: usize,
        field: &'static str,
    ) -> Result<usize, DecodeError> {
        let count = self.read_u32(field)? as usize;
        self.check_count(count, record_size, field)?;
        Ok(count)
    }

    /// Checks an already-read count against the list limit and the bytes
    /// left, so callers never allocate for records that cannot be present.
    pub fn check_count(
        &self,
        count: usize,
        record_size: usize,
        field: &'static str,
    ) -> Result<(), DecodeError> {
        if count > MAX_LIST_LEN {
            return Err(DecodeError::LengthExceedsLimit {
                field,
                len: count,
                max: MAX_LIST_LEN,
            });
        }
        if count.saturating_mul(record_size) > self.remaining_len() {
            return Err(DecodeError::UnexpectedEof { context: field });
        }
        Ok(())
    }

    /// Reads a u32 length, checks it against `max_len` and the bytes left,
    /// then returns that many bytes.
    pub fn read_bytes_u32(
        &mut self,
        max_len: usize,
        field: &'static str,
    ) -> Result<&'a [u8], DecodeError> {
        let len = self.read_u32(field)? as usize;
        if len > max_len {
            return Err(DecodeError::LengthExceedsLimit {
                field,
                len,
                max: max_len,
            });
        }
        self.read_bytes(len, field)
    }

    /// Reads a u32-length-prefixed UTF-8 string.
    pub fn read_string_u32(
        &mut self,
        max_len: usize,
        field: &'static str,
    ) -> Result<String, DecodeError> {
        let bytes = self.read_bytes_u32(max_len, field)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidUtf8 { field })
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data.
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a little-endian u32.
    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian i32.
    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian f32.
    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian f64.
    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a record count as u32, rejecting lists the format can't hold.
    pub fn write_count(&mut self, count: usize, field: &'static str) -> Result<(), EncodeError> {
        let max = MAX_LIST_LEN.min(u32::MAX as usize);
        if count > max {
            return Err(EncodeError::LengthExceedsLimit {
                field,
                len: count,
                max,
            });
        }
        self.write_u32(count as u32);
        Ok(())
    }

    /// Writes `bytes` behind a u32 length, rejecting anything over
    /// `max_len` or too long for the prefix.
    pub fn write_bytes_u32(
        &mut self,
        bytes: &[u8],
        max_len: usize,
        field: &'static str,
    ) -> Result<(), EncodeError> {
        let max = max_len.min(u32::MAX as usize);
        if bytes.len() > max {
            return Err(EncodeError::LengthExceedsLimit {
                field,
                len: bytes.len(),
                max,
            });
        }
        self.write_u32(bytes.len() as u32);
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Writes a u32-length-prefixed UTF-8 string.
    pub fn write_string_u32(
        &mut self,
        s: &str,
        max_len: usize,
        field: &'static str,
    ) -> Result<(), EncodeError> {
        self.write_bytes_u32(s.as_bytes(), max_len, field)
    }
}
