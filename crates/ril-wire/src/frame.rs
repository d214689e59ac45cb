//! Frame encoding/decoding utilities.
//!
//! The RIL socket carries parcels framed by a 4-byte big-endian length,
//! in both directions.
//!
//! ```text
//! +--------+--------+--------+--------+-------------------+
//! | len_3  | len_2  | len_1  | len_0  | parcel[0..len]    |
//! +--------+--------+--------+--------+-------------------+
//! ```

use bytes::{Buf, BufMut, BytesMut};

use crate::constants::MAX_FRAME_SIZE;
use crate::error::WireError;

const LENGTH_PREFIX: usize = 4;

/// A codec for reading and writing length-prefixed frames.
#[derive(Debug, Default)]
pub struct FrameCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
}

impl FrameCodec {
    /// Create a new frame codec.
    pub fn new() -> Self {
        FrameCodec {
            buffer: BytesMut::with_capacity(MAX_FRAME_SIZE),
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode a complete frame from the buffer.
    ///
    /// Returns `Ok(Some(parcel))` if a complete frame is available, `Ok(None)`
    /// if more data is needed. An oversized length prefix means the stream
    /// is out of sync; the buffer is discarded and an error returned.
    pub fn decode(&mut self) -> Result<Option<Vec<u8>>, WireError> {
        if self.buffer.len() < LENGTH_PREFIX {
            return Ok(None);
        }

        let len = u32::from_be_bytes([
            self.buffer[0],
            self.buffer[1],
            self.buffer[2],
            self.buffer[3],
        ]) as usize;

        if len > MAX_FRAME_SIZE {
            self.buffer.clear();
            return Err(WireError::FrameTooLong {
                max: MAX_FRAME_SIZE,
                actual: len,
            });
        }

        if self.buffer.len() < LENGTH_PREFIX + len {
            return Ok(None);
        }

        self.buffer.advance(LENGTH_PREFIX);
        Ok(Some(self.buffer.split_to(len).to_vec()))
    }

    /// Encode a parcel with its length prefix.
    pub fn encode(parcel: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(LENGTH_PREFIX + parcel.len());
        buf.put_u32(parcel.len() as u32);
        buf.extend_from_slice(parcel);
        buf
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_codec_encode_decode() {
        let mut codec = FrameCodec::new();

        let data = b"Hello, modem";
        let encoded = FrameCodec::encode(data);

        assert_eq!(encoded.len(), 4 + data.len());
        assert_eq!(&encoded[..4], &[0, 0, 0, data.len() as u8]);

        codec.push(&encoded);
        let decoded = codec.decode().unwrap().expect("should decode frame");
        assert_eq!(&decoded, data);
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_frame_codec_partial() {
        let mut codec = FrameCodec::new();
        let encoded = FrameCodec::encode(b"Test data");

        codec.push(&encoded[..3]);
        assert!(codec.decode().unwrap().is_none());

        codec.push(&encoded[3..6]);
        assert!(codec.decode().unwrap().is_none());

        codec.push(&encoded[6..]);
        let decoded = codec.decode().unwrap().expect("should decode frame");
        assert_eq!(&decoded, b"Test data");
    }

    #[test]
    fn test_frame_codec_multiple() {
        let mut codec = FrameCodec::new();

        codec.push(&FrameCodec::encode(b"First"));
        codec.push(&FrameCodec::encode(b"Second"));

        assert_eq!(codec.decode().unwrap().unwrap(), b"First");
        assert_eq!(codec.decode().unwrap().unwrap(), b"Second");
        assert!(codec.decode().unwrap().is_none());
    }

    #[test]
    fn test_frame_too_long() {
        let mut codec = FrameCodec::new();
        codec.push(&[0x00, 0x01, 0x00, 0x00, 0xAA]);
        assert!(matches!(
            codec.decode(),
            Err(WireError::FrameTooLong { actual: 65536, .. })
        ));
        assert_eq!(codec.buffered_len(), 0);
    }
}
