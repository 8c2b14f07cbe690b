//! Server and client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use osc_codec::constants::DEFAULT_BUFFER_SIZE;

use crate::error::NetworkResult;

/// Receive timeout governing how promptly pause/dispose requests are
/// observed by the blocking receive loop.
const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 69;

/// Configuration for an [`crate::OscServer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// UDP port to listen on. Port 0 binds an ephemeral port.
    pub port: u16,
    /// Capacity of the single reusable receive buffer.
    pub buffer_size: usize,
    /// Blocking-receive timeout in milliseconds. This is the upper bound on
    /// how long `pause()`/`dispose()` wait to be observed.
    pub receive_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            buffer_size: DEFAULT_BUFFER_SIZE,
            receive_timeout_ms: DEFAULT_RECEIVE_TIMEOUT_MS,
        }
    }
}

impl ServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self { port, ..Self::default() }
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms.max(1))
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> NetworkResult<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Configuration for an [`crate::OscClient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Destination host (IP or name resolvable by the OS).
    pub host: String,
    /// Destination UDP port.
    pub port: u16,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> NetworkResult<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.receive_timeout_ms, 69);
    }

    #[test]
    fn from_toml() {
        let config = ServerConfig::from_toml_str("port = 9000\nbuffer_size = 8192\n").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.buffer_size, 8192);
        assert_eq!(config.receive_timeout_ms, 69);

        let client = ClientConfig::from_toml_str("host = \"127.0.0.1\"\nport = 9000\n").unwrap();
        assert_eq!(client.host, "127.0.0.1");
    }
}
