//! Protocol module - wire format, framing, and frame types.
//!
//! This module implements the length-prefixed frame format:
//! - 4-byte Little Endian length prefix encoding/decoding
//! - Frame buffer for accumulating partial reads
//! - Frame struct with typed accessors

mod frame;
mod frame_buffer;
mod wire_format;

pub use frame::{build_frame, Frame};
pub use frame_buffer::FrameBuffer;
pub use wire_format::{LengthPrefix, LENGTH_PREFIX_SIZE};
