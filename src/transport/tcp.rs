//! TCP endpoint and connection setup.
//!
//! # Example
//!
//! ```ignore
//! use framegrab::transport::{connect, Endpoint};
//!
//! let endpoint: Endpoint = "127.0.0.1:8080".parse()?;
//! let stream = connect(&endpoint).await?;
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;

use crate::error::{FramegrabError, Result};

/// Default host of the frame server.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port of the frame server.
pub const DEFAULT_PORT: u16 = 8080;

/// Host and port of a remote listener.
///
/// Host may be an IPv4/IPv6 literal or a name resolved at connect time.
/// Parses from `host:port`, with IPv6 written as `[addr]:port`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Create an endpoint from host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = FramegrabError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| FramegrabError::Config(format!("Endpoint '{}' is missing a port", s)))?;

        let host = match host.strip_prefix('[') {
            Some(rest) => rest.strip_suffix(']').ok_or_else(|| {
                FramegrabError::Config(format!("Endpoint '{}' has an unclosed '['", s))
            })?,
            None if host.contains(':') => {
                return Err(FramegrabError::Config(format!(
                    "IPv6 endpoint '{}' must be written as [addr]:port",
                    s
                )))
            }
            None => host,
        };

        if host.is_empty() {
            return Err(FramegrabError::Config(format!(
                "Endpoint '{}' is missing a host",
                s
            )));
        }

        let port = port
            .parse::<u16>()
            .map_err(|_| FramegrabError::Config(format!("Invalid port in endpoint '{}'", s)))?;

        Ok(Self::new(host, port))
    }
}

impl TryFrom<String> for Endpoint {
    type Error = FramegrabError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.to_string()
    }
}

/// Open a TCP connection to the endpoint.
///
/// No retry: the first failure is returned as `Connect`.
pub async fn connect(endpoint: &Endpoint) -> Result<TcpStream> {
    tracing::debug!("Connecting to {}", endpoint);

    let stream = TcpStream::connect((endpoint.host(), endpoint.port()))
        .await
        .map_err(|source| FramegrabError::Connect {
            endpoint: endpoint.to_string(),
            source,
        })?;

    if let Ok(peer) = stream.peer_addr() {
        tracing::debug!("Connected to {}", peer);
    }

    Ok(stream)
}
