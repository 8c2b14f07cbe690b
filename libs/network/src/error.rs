//! Transport and registration errors.

use thiserror::Error;

/// Errors surfaced by the network layer. Data-plane problems (malformed
/// datagrams) never appear here - those are dropped per message inside the
/// receive loop. These are control-plane faults: misuse of the API or
/// socket-level failures.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Binding the receive socket failed.
    #[error("failed to bind UDP socket on port {port}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// A send on the client socket failed.
    #[error("failed to send to {destination}")]
    Send {
        destination: String,
        #[source]
        source: std::io::Error,
    },

    /// Connecting or configuring the client socket failed.
    #[error("failed to set up client socket for {destination}")]
    ClientSetup {
        destination: String,
        #[source]
        source: std::io::Error,
    },

    /// Spawning the receive thread failed.
    #[error("failed to spawn receive thread")]
    Thread {
        #[source]
        source: std::io::Error,
    },

    /// A server is already registered on this port.
    #[error("port {port} is already in use by another OSC server")]
    PortInUse { port: u16 },

    /// The registration string is neither a valid address nor a valid
    /// pattern.
    #[error("invalid OSC address or pattern: {address:?}")]
    InvalidAddress { address: String },

    /// A pattern failed to compile.
    #[error("invalid OSC address pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The operation requires a server that has not been disposed.
    #[error("server has been disposed")]
    Disposed,

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for network operations.
pub type NetworkResult<T> = std::result::Result<T, NetworkError>;
