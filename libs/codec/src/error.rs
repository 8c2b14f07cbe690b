//! Codec-level errors for OSC message parsing.
//!
//! Malformed input is a routine, per-datagram condition on this protocol -
//! the dispatch layer drops the offending message or bundle element and
//! keeps going - so every variant carries only scalar context and the whole
//! error is `Copy`. Nothing here allocates on the failure path.

use thiserror::Error;

/// Parse errors with enough context to diagnose a bad sender.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Zero-length datagrams carry nothing and are ignored upstream.
    #[error("empty packet")]
    EmptyPacket,

    /// The first address byte must be '/'.
    #[error("address at offset {offset} does not start with '/' (got {byte:#04x})")]
    NotAnAddress { offset: usize, byte: u8 },

    /// No NUL terminator was found for the address string.
    #[error("unterminated address starting at offset {offset}")]
    UnterminatedAddress { offset: usize },

    /// The byte where the type-tag string should begin was not ','.
    #[error("expected ',' to open the type-tag string at offset {offset} (got {byte:#04x})")]
    MissingTypeTags { offset: usize, byte: u8 },

    /// A tag string with zero supported tags describes no elements.
    #[error("type-tag string at offset {offset} contains no supported tags")]
    EmptyTypeTags { offset: usize },

    /// More supported tags than the scratch table can hold.
    #[error("message has more than {max} elements")]
    TooManyElements { max: usize },

    /// An element's payload runs past the received byte count.
    #[error("truncated message: need {need} bytes, received {got}")]
    Truncated { need: usize, got: usize },

    /// A string element has no NUL before the end of the datagram.
    #[error("unterminated string element at offset {offset}")]
    UnterminatedString { offset: usize },

    /// A blob's declared length is negative or exceeds the configured cap.
    #[error("blob length {length} at offset {offset} exceeds limit {limit}")]
    BlobTooLarge { length: i64, offset: usize, limit: usize },
}

/// Result type for codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;
