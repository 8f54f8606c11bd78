//! Little-endian byte marshalling.
//!
//! [`MarshalReader`] walks a borrowed buffer and reports which field ran out
//! of bytes; [`MarshalWriter`] appends fields to a growable buffer. Every
//! binary codec in the workspace is written on top of these two.

use crate::error::ParseError;

/// Cursor over a byte slice that decodes fixed-width fields.
#[derive(Clone, Debug)]
pub struct MarshalReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> MarshalReader<'a> {
    /// Create a reader positioned at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        MarshalReader { bytes, offset: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// The bytes consumed between offset `start` and the current offset.
    pub fn consumed_since(&self, start: usize) -> &'a [u8] {
        &self.bytes[start.min(self.offset)..self.offset]
    }

    /// Read exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], ParseError> {
        if self.remaining() < len {
            return Err(ParseError::NotEnoughBytes {
                field,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], ParseError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N, field)?);
        Ok(array)
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, ParseError> {
        Ok(self.read_array::<1>(field)?[0])
    }

    pub fn read_u16(&mut self, field: &'static str) -> Result<u16, ParseError> {
        Ok(u16::from_le_bytes(self.read_array(field)?))
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, ParseError> {
        Ok(u32::from_le_bytes(self.read_array(field)?))
    }

    pub fn read_u64(&mut self, field: &'static str) -> Result<u64, ParseError> {
        Ok(u64::from_le_bytes(self.read_array(field)?))
    }

    pub fn read_i64(&mut self, field: &'static str) -> Result<i64, ParseError> {
        Ok(i64::from_le_bytes(self.read_array(field)?))
    }

    /// Fail unless the whole buffer has been consumed.
    pub fn finish(&self) -> Result<(), ParseError> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(ParseError::TrailingBytes { remaining }),
        }
    }
}

/// Append-only little-endian encoder.
#[derive(Clone, Debug, Default)]
pub struct MarshalWriter {
    buf: Vec<u8>,
}

impl MarshalWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        MarshalWriter { buf: Vec::new() }
    }

    /// Create a writer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        MarshalWriter {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i64(&mut self, value: i64) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
