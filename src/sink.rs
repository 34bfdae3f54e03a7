//! Output sinks for a received payload.
//!
//! - [`FrameSink::File`]: write the payload verbatim to a file (create/truncate)
//! - [`FrameSink::Stdout`]: write raw bytes to stdout
//!
//! # Important
//!
//! When writing to stdout, logs must go to stderr or they will corrupt the
//! output.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::{FramegrabError, Result};

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "frame.jpg";

/// Output name that selects stdout.
pub const STDOUT_MARKER: &str = "-";

/// Destination for a received payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSink {
    File(PathBuf),
    Stdout,
}

impl FrameSink {
    /// Parse an output name; `-` selects stdout.
    pub fn from_output(output: &str) -> Self {
        if output == STDOUT_MARKER {
            FrameSink::Stdout
        } else {
            FrameSink::File(PathBuf::from(output))
        }
    }

    /// Write the payload to this sink and return the bytes written.
    pub async fn write(&self, payload: &[u8]) -> Result<usize> {
        let result = match self {
            FrameSink::File(path) => write_file(path, payload).await,
            FrameSink::Stdout => write_stdout(payload).await,
        };

        result.map_err(|source| FramegrabError::Sink {
            target: self.to_string(),
            source,
        })?;

        tracing::debug!("Wrote {} bytes to {}", payload.len(), self);
        Ok(payload.len())
    }
}

impl Default for FrameSink {
    fn default() -> Self {
        FrameSink::File(PathBuf::from(DEFAULT_OUTPUT))
    }
}

impl fmt::Display for FrameSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameSink::File(path) => write!(f, "{}", path.display()),
            FrameSink::Stdout => f.write_str("<stdout>"),
        }
    }
}

async fn write_file(path: &Path, payload: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(payload).await?;
    file.flush().await?;
    Ok(())
}

async fn write_stdout(payload: &[u8]) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(payload).await?;
    stdout.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_output() {
        assert_eq!(FrameSink::from_output("-"), FrameSink::Stdout);
        assert_eq!(
            FrameSink::from_output("out/frame.jpg"),
            FrameSink::File(PathBuf::from("out/frame.jpg"))
        );
    }

    #[test]
    fn test_default_is_frame_jpg() {
        assert_eq!(FrameSink::default(), FrameSink::File(PathBuf::from("frame.jpg")));
    }

    #[tokio::test]
    async fn test_file_sink_writes_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.jpg");
        let payload: Vec<u8> = (0..=255).collect();

        let sink = FrameSink::File(path.clone());
        let written = sink.write(&payload).await.unwrap();

        assert_eq!(written, 256);
        assert_eq!(std::fs::read(&path).unwrap(), payload);
    }

    #[tokio::test]
    async fn test_file_sink_truncates_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.jpg");
        std::fs::write(&path, vec![0xFF; 1024]).unwrap();

        FrameSink::File(path.clone()).write(b"new").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_file_sink_empty_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");

        FrameSink::File(path.clone()).write(&[]).await.unwrap();

        assert!(std::fs::read(&path).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_sink_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("frame.jpg");

        let result = FrameSink::File(path).write(b"data").await;

        assert!(matches!(result, Err(FramegrabError::Sink { .. })));
    }
}
