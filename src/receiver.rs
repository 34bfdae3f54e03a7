//! Framed receiver: connect, read one length-prefixed frame, return it.
//!
//! The [`ReceiverBuilder`] provides a fluent API for configuring the
//! receiver. The [`FrameReceiver`] runs one transfer:
//! 1. Connect to the endpoint
//! 2. Read the 4-byte length prefix
//! 3. Read until the declared length is reached or the peer closes
//! 4. Apply the truncation policy and return the frame
//!
//! # Example
//!
//! ```ignore
//! use framegrab::{FrameReceiver, TruncationPolicy};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let frame = FrameReceiver::builder()
//!         .endpoint("127.0.0.1:8080".parse()?)
//!         .truncation(TruncationPolicy::Reject)
//!         .timeout(Duration::from_secs(5))
//!         .build()
//!         .receive()
//!         .await?;
//!
//!     println!("got {} bytes", frame.payload_len());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{FramegrabError, Result};
use crate::protocol::{Frame, FrameBuffer};
use crate::transport::{connect, Endpoint};

/// Default size of a single socket read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

/// What to do when the peer closes before the declared length arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TruncationPolicy {
    /// Return the short payload and log a warning.
    #[default]
    Accept,
    /// Fail with `IncompleteFrame`.
    Reject,
}

/// Options for reading a single frame.
#[derive(Debug, Clone)]
pub struct ReceiveOptions {
    /// Reject prefixes above this length. `None` means unlimited.
    pub max_payload: Option<u32>,
    /// Behavior on early end of stream.
    pub truncation: TruncationPolicy,
    /// Bound on connect + read combined. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Largest single read request.
    pub read_chunk_size: usize,
}

impl Default for ReceiveOptions {
    fn default() -> Self {
        Self {
            max_payload: None,
            truncation: TruncationPolicy::Accept,
            timeout: None,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

/// Builder for configuring a [`FrameReceiver`].
pub struct ReceiverBuilder {
    endpoint: Endpoint,
    options: ReceiveOptions,
}

impl ReceiverBuilder {
    /// Create a new builder targeting `127.0.0.1:8080`.
    pub fn new() -> Self {
        Self {
            endpoint: Endpoint::default(),
            options: ReceiveOptions::default(),
        }
    }

    /// Set the remote endpoint.
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Reject frames whose prefix declares more than `limit` bytes.
    ///
    /// Default: unlimited
    pub fn max_payload(mut self, limit: u32) -> Self {
        self.options.max_payload = Some(limit);
        self
    }

    /// Set the truncation policy.
    ///
    /// Default: `TruncationPolicy::Accept`
    pub fn truncation(mut self, policy: TruncationPolicy) -> Self {
        self.options.truncation = policy;
        self
    }

    /// Bound the whole receive (connect included).
    ///
    /// Default: none
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Set the maximum bytes requested per read. Values below 1 are raised to 1.
    ///
    /// Default: 64 KiB
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.options.read_chunk_size = size.max(1);
        self
    }

    /// Replace all options at once.
    pub fn options(mut self, options: ReceiveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> FrameReceiver {
        FrameReceiver {
            endpoint: self.endpoint,
            options: self.options,
        }
    }
}

impl Default for ReceiverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives one frame per call over a fresh connection.
#[derive(Debug, Clone)]
pub struct FrameReceiver {
    endpoint: Endpoint,
    options: ReceiveOptions,
}

impl FrameReceiver {
    /// Create a new receiver builder.
    pub fn builder() -> ReceiverBuilder {
        ReceiverBuilder::new()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn options(&self) -> &ReceiveOptions {
        &self.options
    }

    /// Connect and read a single frame.
    ///
    /// The connection is closed when this returns, on success or failure.
    pub async fn receive(&self) -> Result<Frame> {
        let transfer = async {
            let mut stream = connect(&self.endpoint).await?;
            read_frame(&mut stream, &self.options).await
        };

        match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, transfer)
                .await
                .map_err(|_| FramegrabError::Timeout(limit))?,
            None => transfer.await,
        }
    }
}

/// Connect to `endpoint` and return the payload of one frame.
///
/// Uses default options: no size limit, no timeout, short payloads accepted.
pub async fn receive_frame(endpoint: &Endpoint) -> Result<Bytes> {
    let frame = FrameReceiver::builder()
        .endpoint(endpoint.clone())
        .build()
        .receive()
        .await?;
    Ok(frame.into_payload())
}

/// Read one frame from any async byte stream.
///
/// Each read requests at most the bytes still missing, so nothing past the
/// frame is consumed from `reader`.
pub async fn read_frame<R>(reader: &mut R, options: &ReceiveOptions) -> Result<Frame>
where
    R: AsyncRead + Unpin,
{
    let mut frame_buffer = FrameBuffer::with_max_payload(options.max_payload);
    let mut buf = vec![0u8; options.read_chunk_size.max(1)];
    let mut announced = false;

    loop {
        let want = frame_buffer.want();
        if want == 0 {
            break;
        }

        let limit = want.min(buf.len());
        let n = reader.read(&mut buf[..limit]).await?;
        if n == 0 {
            tracing::debug!("Peer closed the stream");
            break;
        }

        frame_buffer.push(&buf[..n])?;

        if !announced {
            if let Some(prefix) = frame_buffer.prefix() {
                tracing::debug!("Frame announces {} payload bytes", prefix.payload_length);
                announced = true;
            }
        }
    }

    let frame = frame_buffer.finish()?;

    if !frame.is_complete() {
        match options.truncation {
            TruncationPolicy::Accept => {
                tracing::warn!(
                    "Frame truncated: expected {} bytes, received {}",
                    frame.declared_length,
                    frame.payload_len()
                );
            }
            TruncationPolicy::Reject => {
                return Err(FramegrabError::IncompleteFrame {
                    expected: frame.declared_length,
                    received: frame.payload_len(),
                });
            }
        }
    }

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{build_frame, LengthPrefix};
    use tokio::io::{duplex, AsyncWriteExt};

    #[tokio::test]
    async fn test_read_complete_frame() {
        let mut reader: &[u8] = &build_frame(b"jpeg bytes");

        let frame = read_frame(&mut reader, &ReceiveOptions::default())
            .await
            .unwrap();

        assert_eq!(frame.payload(), b"jpeg bytes");
        assert!(frame.is_complete());
    }

    #[tokio::test]
    async fn test_read_zero_length() {
        let mut reader: &[u8] = &[0, 0, 0, 0, 0xAA];

        let frame = read_frame(&mut reader, &ReceiveOptions::default())
            .await
            .unwrap();

        assert!(frame.payload.is_empty());
        // Nothing after the header was read
        assert_eq!(reader, &[0xAA]);
    }

    #[tokio::test]
    async fn test_read_leaves_trailing_bytes() {
        let mut data = build_frame(b"first");
        data.extend_from_slice(&build_frame(b"second"));
        let mut reader: &[u8] = &data;

        let frame = read_frame(&mut reader, &ReceiveOptions::default())
            .await
            .unwrap();

        assert_eq!(frame.payload(), b"first");
        assert_eq!(reader, &build_frame(b"second")[..]);
    }

    #[tokio::test]
    async fn test_small_read_chunks() {
        let payload: Vec<u8> = (0..=255).collect();
        let mut reader: &[u8] = &build_frame(&payload);
        let options = ReceiveOptions {
            read_chunk_size: 3,
            ..Default::default()
        };

        let frame = read_frame(&mut reader, &options).await.unwrap();

        assert_eq!(frame.payload(), &payload[..]);
    }

    #[tokio::test]
    async fn test_truncated_accepted_by_default() {
        let mut data = LengthPrefix::new(100).encode().to_vec();
        data.extend_from_slice(&[1u8; 40]);
        let mut reader: &[u8] = &data;

        let frame = read_frame(&mut reader, &ReceiveOptions::default())
            .await
            .unwrap();

        assert_eq!(frame.payload_len(), 40);
        assert_eq!(frame.declared_length, 100);
    }

    #[tokio::test]
    async fn test_truncated_rejected() {
        let mut data = LengthPrefix::new(100).encode().to_vec();
        data.extend_from_slice(&[1u8; 40]);
        let mut reader: &[u8] = &data;
        let options = ReceiveOptions {
            truncation: TruncationPolicy::Reject,
            ..Default::default()
        };

        let result = read_frame(&mut reader, &options).await;

        assert!(matches!(
            result,
            Err(FramegrabError::IncompleteFrame {
                expected: 100,
                received: 40
            })
        ));
    }

    #[tokio::test]
    async fn test_short_header() {
        let mut reader: &[u8] = &[9, 0];

        let result = read_frame(&mut reader, &ReceiveOptions::default()).await;

        assert!(matches!(
            result,
            Err(FramegrabError::ShortHeader { received: 2 })
        ));
    }

    #[tokio::test]
    async fn test_max_payload_rejected_before_payload_read() {
        let mut data = LengthPrefix::new(1000).encode().to_vec();
        data.extend_from_slice(&[0u8; 16]);
        let mut reader: &[u8] = &data;
        let options = ReceiveOptions {
            max_payload: Some(100),
            ..Default::default()
        };

        let result = read_frame(&mut reader, &options).await;

        assert!(matches!(
            result,
            Err(FramegrabError::PayloadTooLarge { declared: 1000, max: 100 })
        ));
        assert_eq!(reader.len(), 16);
    }

    #[tokio::test]
    async fn test_duplex_chunked_writes() {
        let (mut client, mut server) = duplex(16);
        let payload = vec![0x5A; 1000];
        let bytes = build_frame(&payload);

        let writer = tokio::spawn(async move {
            for chunk in bytes.chunks(7) {
                server.write_all(chunk).await.unwrap();
                tokio::task::yield_now().await;
            }
        });

        let frame = read_frame(&mut client, &ReceiveOptions::default())
            .await
            .unwrap();
        writer.await.unwrap();

        assert_eq!(frame.payload(), &payload[..]);
    }

    #[test]
    fn test_builder_defaults() {
        let receiver = FrameReceiver::builder().build();

        assert_eq!(receiver.endpoint(), &Endpoint::default());
        assert_eq!(receiver.options().max_payload, None);
        assert_eq!(receiver.options().truncation, TruncationPolicy::Accept);
        assert_eq!(receiver.options().timeout, None);
        assert_eq!(receiver.options().read_chunk_size, DEFAULT_READ_CHUNK_SIZE);
    }

    #[test]
    fn test_builder_configuration() {
        let receiver = FrameReceiver::builder()
            .endpoint(Endpoint::new("10.1.1.1", 9000))
            .max_payload(4096)
            .truncation(TruncationPolicy::Reject)
            .timeout(Duration::from_secs(3))
            .read_chunk_size(0)
            .build();

        assert_eq!(receiver.endpoint().port(), 9000);
        assert_eq!(receiver.options().max_payload, Some(4096));
        assert_eq!(receiver.options().truncation, TruncationPolicy::Reject);
        assert_eq!(receiver.options().timeout, Some(Duration::from_secs(3)));
        assert_eq!(receiver.options().read_chunk_size, 1);
    }
}
