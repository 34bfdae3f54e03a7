//! Wire format encoding and decoding.
//!
//! A frame is a 4-byte length prefix followed by exactly that many bytes:
//! ```text
//! ┌──────────────┬─────────────────────┐
//! │ Length       │ Payload             │
//! │ 4 bytes      │ N bytes             │
//! │ uint32 LE    │                     │
//! └──────────────┴─────────────────────┘
//! ```
//!
//! The length is Little Endian. No upper bound is part of the format.

use crate::error::{FramegrabError, Result};

/// Length prefix size in bytes (fixed, exactly 4).
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Decoded length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthPrefix {
    /// Exact number of payload bytes that follow the prefix.
    pub payload_length: u32,
}

impl LengthPrefix {
    /// Create a new length prefix.
    pub fn new(payload_length: u32) -> Self {
        Self { payload_length }
    }

    /// Encode prefix to bytes (Little Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use framegrab::protocol::LengthPrefix;
    ///
    /// let bytes = LengthPrefix::new(0x0102).encode();
    /// assert_eq!(bytes, [0x02, 0x01, 0x00, 0x00]);
    /// ```
    pub fn encode(&self) -> [u8; LENGTH_PREFIX_SIZE] {
        self.payload_length.to_le_bytes()
    }

    /// Decode prefix from bytes (Little Endian).
    ///
    /// Returns `None` if buffer is too short. Extra bytes are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use framegrab::protocol::LengthPrefix;
    ///
    /// let prefix = LengthPrefix::decode(&[100, 0, 0, 0]).unwrap();
    /// assert_eq!(prefix.payload_length, 100);
    /// ```
    pub fn decode(buf: &[u8]) -> Option<Self> {
        let bytes: [u8; LENGTH_PREFIX_SIZE] = buf.get(..LENGTH_PREFIX_SIZE)?.try_into().ok()?;
        Some(Self::from_bytes(bytes))
    }

    /// Decode a prefix from exactly 4 bytes (Little Endian).
    #[inline]
    pub fn from_bytes(bytes: [u8; LENGTH_PREFIX_SIZE]) -> Self {
        Self {
            payload_length: u32::from_le_bytes(bytes),
        }
    }

    /// Check the declared length against an optional maximum.
    pub fn validate(&self, max_payload: Option<u32>) -> Result<()> {
        match max_payload {
            Some(max) if self.payload_length > max => Err(FramegrabError::PayloadTooLarge {
                declared: self.payload_length,
                max,
            }),
            _ => Ok(()),
        }
    }

    /// Payload length as `usize`.
    #[inline]
    pub fn len(&self) -> usize {
        self.payload_length as usize
    }

    /// True for a zero-length frame.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload_length == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_byte_order() {
        let bytes = LengthPrefix::new(0x0A0B0C0D).encode();
        assert_eq!(bytes, [0x0D, 0x0C, 0x0B, 0x0A]);
    }

    #[test]
    fn test_decode_known_bytes() {
        // 0x00010000 = 65536
        let prefix = LengthPrefix::decode(&[0x00, 0x00, 0x01, 0x00]).unwrap();
        assert_eq!(prefix.payload_length, 65536);
        assert_eq!(prefix.len(), 65536);
    }

    #[test]
    fn test_decode_too_short_buffer() {
        assert!(LengthPrefix::decode(&[]).is_none());
        assert!(LengthPrefix::decode(&[1, 2, 3]).is_none());
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let prefix = LengthPrefix::decode(&[5, 0, 0, 0, b'h', b'e']).unwrap();
        assert_eq!(prefix.payload_length, 5);
    }

    #[test]
    fn test_from_bytes_matches_decode() {
        let raw = [0x10, 0x27, 0x00, 0x00];
        assert_eq!(LengthPrefix::from_bytes(raw).payload_length, 10_000);
        assert_eq!(LengthPrefix::decode(&raw), Some(LengthPrefix::from_bytes(raw)));
    }

    #[test]
    fn test_max_value() {
        let prefix = LengthPrefix::decode(&[0xFF; 4]).unwrap();
        assert_eq!(prefix.payload_length, u32::MAX);
    }

    #[test]
    fn test_validate_without_limit() {
        assert!(LengthPrefix::new(u32::MAX).validate(None).is_ok());
    }

    #[test]
    fn test_validate_limit() {
        assert!(LengthPrefix::new(100).validate(Some(100)).is_ok());

        let result = LengthPrefix::new(101).validate(Some(100));
        assert!(matches!(
            result,
            Err(FramegrabError::PayloadTooLarge {
                declared: 101,
                max: 100
            })
        ));
    }

    #[test]
    fn test_empty() {
        assert!(LengthPrefix::new(0).is_empty());
        assert!(!LengthPrefix::new(1).is_empty());
    }
}
