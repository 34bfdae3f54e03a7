//! Received frame with typed accessors.
//!
//! Uses `bytes::Bytes` so the payload can be handed to a sink without copying.
//!
//! # Example
//!
//! ```
//! use framegrab::protocol::Frame;
//! use bytes::Bytes;
//!
//! let frame = Frame::new(5, Bytes::from_static(b"hello"));
//! assert!(frame.is_complete());
//! assert_eq!(frame.payload(), b"hello");
//! ```

use bytes::Bytes;

use super::wire_format::{LengthPrefix, LENGTH_PREFIX_SIZE};

/// A frame read from the stream.
///
/// `payload` may be shorter than `declared_length` when the peer closed early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Length announced by the prefix.
    pub declared_length: u32,
    /// Bytes actually received.
    pub payload: Bytes,
}

impl Frame {
    pub fn new(declared_length: u32, payload: Bytes) -> Self {
        Self {
            declared_length,
            payload,
        }
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consume the frame, keeping only the payload.
    #[inline]
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// True when the full declared payload arrived.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.payload.len() == self.declared_length as usize
    }

    /// Bytes that never arrived.
    #[inline]
    pub fn missing(&self) -> usize {
        (self.declared_length as usize).saturating_sub(self.payload.len())
    }
}

/// Build a complete frame as wire bytes (prefix + payload).
///
/// # Panics
///
/// Panics if the payload is longer than `u32::MAX` bytes.
pub fn build_frame(payload: &[u8]) -> Vec<u8> {
    let length = u32::try_from(payload.len()).expect("payload longer than u32::MAX");
    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    buf.extend_from_slice(&LengthPrefix::new(length).encode());
    buf.extend_from_slice(payload);
    buf
}
