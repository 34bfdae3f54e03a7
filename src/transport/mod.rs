//! Transport module - endpoint parsing and TCP connection setup.

mod tcp;

pub use tcp::{connect, Endpoint, DEFAULT_HOST, DEFAULT_PORT};
