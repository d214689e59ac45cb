//! Parcel primitives.
//!
//! Every RIL message body is a flat sequence of fields in the Android parcel
//! layout. There are no tags: each command has a fixed field order and both
//! sides must agree on it.
//!
//! ```text
//! i32      : 4 bytes, little-endian
//! string   : i32 char count (-1 = null) | UTF-16LE units | u16 NUL | pad to 4
//! bytes    : i32 length (-1 = null)     | data                     | pad to 4
//! ```

use bytes::{Buf, BufMut, BytesMut};

use crate::error::WireError;

const NULL_LENGTH: i32 = -1;

fn padded(len: usize) -> usize {
    (len + 3) & !3
}

/// Builds a parcel field by field.
#[derive(Debug, Default, Clone)]
pub struct ParcelWriter {
    buf: BytesMut,
}

impl ParcelWriter {
    /// Create an empty parcel.
    pub fn new() -> Self {
        ParcelWriter {
            buf: BytesMut::with_capacity(64),
        }
    }

    /// Append a 32-bit integer.
    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    /// Append a boolean as an integer flag.
    pub fn write_bool(&mut self, value: bool) {
        self.write_i32(value as i32);
    }

    /// Append a nullable UTF-16 string.
    pub fn write_string(&mut self, value: Option<&str>) {
        let Some(s) = value else {
            self.write_i32(NULL_LENGTH);
            return;
        };
        let units: Vec<u16> = s.encode_utf16().collect();
        self.write_i32(units.len() as i32);
        for unit in &units {
            self.buf.put_u16_le(*unit);
        }
        self.buf.put_u16_le(0);
        self.pad();
    }

    /// Append a nullable byte array.
    pub fn write_byte_array(&mut self, value: Option<&[u8]>) {
        let Some(data) = value else {
            self.write_i32(NULL_LENGTH);
            return;
        };
        self.write_i32(data.len() as i32);
        self.buf.extend_from_slice(data);
        self.pad();
    }

    /// Append raw, already-encoded parcel bytes.
    pub fn write_raw(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    fn pad(&mut self) {
        let target = padded(self.buf.len());
        self.buf.put_bytes(0, target - self.buf.len());
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrow the encoded bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Take the encoded bytes.
    pub fn into_bytes(self) -> BytesMut {
        self.buf
    }
}

/// Reads parcel fields in order from a borrowed buffer.
#[derive(Debug, Clone)]
pub struct ParcelReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ParcelReader<'a> {
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        ParcelReader { data, pos: 0 }
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread tail of the parcel.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < needed {
            return Err(WireError::Truncated {
                offset: self.pos,
                needed,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(slice)
    }

    /// Read a 32-bit integer.
    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        let mut bytes = self.take(4)?;
        Ok(bytes.get_i32_le())
    }

    /// Read an integer flag (non-zero = true).
    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        Ok(self.read_i32()? != 0)
    }

    fn read_length(&mut self) -> Result<Option<usize>, WireError> {
        let offset = self.pos;
        match self.read_i32()? {
            NULL_LENGTH => Ok(None),
            length if length < 0 => Err(WireError::InvalidLength { offset, length }),
            length => Ok(Some(length as usize)),
        }
    }

    /// Read a nullable UTF-16 string.
    pub fn read_string(&mut self) -> Result<Option<String>, WireError> {
        let Some(chars) = self.read_length()? else {
            return Ok(None);
        };
        let offset = self.pos;
        let raw = self.take(padded((chars + 1) * 2))?;
        let units: Vec<u16> = raw[..chars * 2]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units)
            .map(Some)
            .map_err(|_| WireError::InvalidUtf16(offset))
    }

    /// Read a nullable byte array.
    pub fn read_byte_array(&mut self) -> Result<Option<Vec<u8>>, WireError> {
        let Some(len) = self.read_length()? else {
            return Ok(None);
        };
        let raw = self.take(padded(len))?;
        Ok(Some(raw[..len].to_vec()))
    }
}
