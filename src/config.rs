//! Runtime configuration.
//!
//! Values are layered, later layers winning:
//! 1. Built-in defaults (`127.0.0.1:8080`, `frame.jpg`)
//! 2. JSON config file
//! 3. `FRAMEGRAB_*` environment variables
//! 4. Command-line flags (applied by the binary)
//!
//! # Example
//!
//! ```
//! use framegrab::config::GrabConfig;
//!
//! let config = GrabConfig::from_json_str(r#"{ "endpoint": "10.0.0.2:9000", "strict": true }"#).unwrap();
//! assert_eq!(config.endpoint.port(), 9000);
//! assert_eq!(config.output, "frame.jpg");
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FramegrabError, Result};
use crate::receiver::{FrameReceiver, ReceiveOptions, TruncationPolicy, DEFAULT_READ_CHUNK_SIZE};
use crate::sink::{FrameSink, DEFAULT_OUTPUT};
use crate::transport::Endpoint;

pub const ENV_ENDPOINT: &str = "FRAMEGRAB_ENDPOINT";
pub const ENV_OUTPUT: &str = "FRAMEGRAB_OUTPUT";
pub const ENV_MAX_PAYLOAD: &str = "FRAMEGRAB_MAX_PAYLOAD";
pub const ENV_TIMEOUT_MS: &str = "FRAMEGRAB_TIMEOUT_MS";
pub const ENV_STRICT: &str = "FRAMEGRAB_STRICT";

/// Everything needed to grab one frame and store it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrabConfig {
    /// Remote frame server.
    pub endpoint: Endpoint,
    /// Output file path, or `-` for stdout.
    pub output: String,
    /// Reject frames declaring more than this many bytes.
    pub max_payload: Option<u32>,
    /// Bound on connect + read, in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Fail on a truncated payload instead of writing it.
    pub strict: bool,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            output: DEFAULT_OUTPUT.to_string(),
            max_payload: None,
            timeout_ms: None,
            strict: false,
        }
    }
}

impl GrabConfig {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FramegrabError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Apply `FRAMEGRAB_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_ENDPOINT) {
            self.endpoint = value.parse()?;
        }
        if let Some(value) = lookup(ENV_OUTPUT) {
            if value.is_empty() {
                return Err(FramegrabError::Config(format!("{} is empty", ENV_OUTPUT)));
            }
            self.output = value;
        }
        if let Some(value) = lookup(ENV_MAX_PAYLOAD) {
            self.max_payload = Some(parse_number(ENV_MAX_PAYLOAD, &value)?);
        }
        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = Some(parse_number(ENV_TIMEOUT_MS, &value)?);
        }
        if let Some(value) = lookup(ENV_STRICT) {
            self.strict = parse_bool(ENV_STRICT, &value)?;
        }
        Ok(())
    }

    pub fn truncation(&self) -> TruncationPolicy {
        if self.strict {
            TruncationPolicy::Reject
        } else {
            TruncationPolicy::Accept
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn receive_options(&self) -> ReceiveOptions {
        ReceiveOptions {
            max_payload: self.max_payload,
            truncation: self.truncation(),
            timeout: self.timeout(),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }

    /// Build a receiver for the configured endpoint.
    pub fn receiver(&self) -> FrameReceiver {
        FrameReceiver::builder()
            .endpoint(self.endpoint.clone())
            .options(self.receive_options())
            .build()
    }

    pub fn sink(&self) -> FrameSink {
        FrameSink::from_output(&self.output)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| FramegrabError::Config(format!("{} must be a number, got '{}'", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(FramegrabError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, value
        ))),
    }
}
