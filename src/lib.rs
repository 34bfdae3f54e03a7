//! # framegrab
//!
//! Receive a single length-prefixed frame over TCP and hand it to a sink.
//!
//! ## Wire format
//!
//! `[4 bytes: payload length, u32 little-endian][N bytes: payload]`
//!
//! The peer is typically a camera server that broadcasts JPEG frames to
//! every connected client; one call grabs one frame.
//!
//! ## Example
//!
//! ```ignore
//! use framegrab::{receive_frame, FrameSink};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let payload = receive_frame(&"127.0.0.1:8080".parse()?).await?;
//!     FrameSink::default().write(&payload).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod receiver;
pub mod sink;
pub mod transport;

pub use config::GrabConfig;
pub use error::{FramegrabError, Result};
pub use protocol::Frame;
pub use receiver::{
    read_frame, receive_frame, FrameReceiver, ReceiveOptions, ReceiverBuilder, TruncationPolicy,
};
pub use sink::FrameSink;
pub use transport::Endpoint;
