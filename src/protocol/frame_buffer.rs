//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for buffer management.
//! Implements a state machine for a single length-prefixed frame:
//! - `WaitingForHeader`: Need 4 prefix bytes
//! - `WaitingForPayload`: Prefix parsed, need N more payload bytes
//! - `Complete`: Declared length reached
//!
//! The buffer never takes more bytes than the frame needs. `push` reports how
//! many bytes it consumed and `want` reports how many it still needs, so a
//! reader can size each socket read to stop exactly at the frame boundary.
//!
//! # Example
//!
//! ```
//! use framegrab::protocol::FrameBuffer;
//!
//! let mut buffer = FrameBuffer::new();
//!
//! // Data arrives in chunks from the socket
//! buffer.push(&[3, 0]).unwrap();
//! assert_eq!(buffer.want(), 2);
//! buffer.push(&[0, 0, b'a', b'b', b'c']).unwrap();
//! assert!(buffer.is_complete());
//!
//! let frame = buffer.finish().unwrap();
//! assert_eq!(frame.payload(), b"abc");
//! ```

use bytes::BytesMut;

use super::wire_format::{LengthPrefix, LENGTH_PREFIX_SIZE};
use super::Frame;
use crate::error::{FramegrabError, Result};

/// Upper bound on the buffer reservation made from an untrusted prefix.
const MAX_INITIAL_RESERVE: usize = 64 * 1024;

/// State machine for frame parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Waiting for the complete 4-byte prefix.
    WaitingForHeader,
    /// Prefix parsed, waiting for payload bytes.
    WaitingForPayload { prefix: LengthPrefix },
    /// All declared bytes received.
    Complete { prefix: LengthPrefix },
}

/// Buffer that accumulates one frame across arbitrarily split reads.
pub struct FrameBuffer {
    /// Prefix bytes while waiting for the header, payload bytes afterwards.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Optional limit on the declared payload length.
    max_payload: Option<u32>,
}

impl FrameBuffer {
    /// Create a new frame buffer with no payload limit.
    pub fn new() -> Self {
        Self::with_max_payload(None)
    }

    /// Create a new frame buffer that rejects prefixes above `max_payload`.
    pub fn with_max_payload(max_payload: Option<u32>) -> Self {
        Self {
            buffer: BytesMut::with_capacity(LENGTH_PREFIX_SIZE),
            state: State::WaitingForHeader,
            max_payload,
        }
    }

    /// Push data into the buffer.
    ///
    /// Consumes at most [`want()`](Self::want) bytes from `data` and returns
    /// how many were taken. Anything past the end of the frame is left to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns `PayloadTooLarge` if the prefix exceeds the configured maximum.
    pub fn push(&mut self, data: &[u8]) -> Result<usize> {
        let mut consumed = 0;

        loop {
            match self.state {
                State::WaitingForHeader => {
                    let take = self.want().min(data.len() - consumed);
                    self.buffer
                        .extend_from_slice(&data[consumed..consumed + take]);
                    consumed += take;

                    if self.buffer.len() < LENGTH_PREFIX_SIZE {
                        return Ok(consumed);
                    }

                    let mut header = [0u8; LENGTH_PREFIX_SIZE];
                    header.copy_from_slice(&self.buffer.split_to(LENGTH_PREFIX_SIZE));
                    let prefix = LengthPrefix::from_bytes(header);
                    prefix.validate(self.max_payload)?;

                    self.buffer.reserve(prefix.len().min(MAX_INITIAL_RESERVE));
                    self.state = if prefix.is_empty() {
                        State::Complete { prefix }
                    } else {
                        State::WaitingForPayload { prefix }
                    };
                }

                State::WaitingForPayload { prefix } => {
                    let take = self.want().min(data.len() - consumed);
                    self.buffer
                        .extend_from_slice(&data[consumed..consumed + take]);
                    consumed += take;

                    if self.buffer.len() == prefix.len() {
                        self.state = State::Complete { prefix };
                    }
                    return Ok(consumed);
                }

                State::Complete { .. } => return Ok(consumed),
            }
        }
    }

    /// Number of bytes still needed to finish the current stage.
    ///
    /// Zero once the frame is complete.
    pub fn want(&self) -> usize {
        match self.state {
            State::WaitingForHeader => LENGTH_PREFIX_SIZE - self.buffer.len(),
            State::WaitingForPayload { prefix } => prefix.len() - self.buffer.len(),
            State::Complete { .. } => 0,
        }
    }

    /// The decoded prefix, once all 4 bytes have arrived.
    pub fn prefix(&self) -> Option<LengthPrefix> {
        match self.state {
            State::WaitingForHeader => None,
            State::WaitingForPayload { prefix } | State::Complete { prefix } => Some(prefix),
        }
    }

    /// True when the declared payload length has been reached.
    pub fn is_complete(&self) -> bool {
        matches!(self.state, State::Complete { .. })
    }

    /// Convert the buffered bytes into a frame at end of stream.
    ///
    /// A frame whose payload is still short is returned as-is; callers decide
    /// whether truncation is acceptable.
    ///
    /// # Errors
    ///
    /// Returns `ShortHeader` if the prefix never completed.
    pub fn finish(self) -> Result<Frame> {
        match self.state {
            State::WaitingForHeader => Err(FramegrabError::ShortHeader {
                received: self.buffer.len(),
            }),
            State::WaitingForPayload { prefix } | State::Complete { prefix } => {
                Ok(Frame::new(prefix.payload_length, self.buffer.freeze()))
            }
        }
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            State::WaitingForHeader => "WaitingForHeader",
            State::WaitingForPayload { .. } => "WaitingForPayload",
            State::Complete { .. } => "Complete",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
