//! # OSC Wire Codec
//!
//! ## Purpose
//!
//! This crate contains the "rules" layer of the stack: everything that knows
//! what OSC 1.0 bytes mean, and nothing that knows where they came from.
//! - Zero-copy message parsing over a caller-owned receive buffer
//! - Typed element accessors with endianness conversion
//! - Message construction with 4-byte alignment and big-endian encoding
//! - Content-hashed address keys for allocation-free handler lookup
//! - Address / pattern classification
//!
//! ## Architecture Role
//!
//! ```text
//! osc-types → [osc-codec] → osc-network
//!     ↑            ↓             ↓
//! Pure Data   Wire Rules     Transport
//! Structures  Parse/Write    Sockets/Dispatch
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Socket management or the receive loop (belongs in osc-network)
//! - Handler registration and routing (belongs in osc-network)
//!
//! ## Performance Profile
//!
//! - **Parsing**: no heap allocation; one pass over the datagram recording
//!   per-element `(tag, offset)` pairs into a reusable scratch table
//! - **Lookup keys**: exact-address resolution hashes the raw buffer bytes,
//!   no string materialization on the hot path
//! - **Reads**: element accessors index straight into the receive buffer and
//!   byte-swap in registers

pub mod address;
pub mod constants;
pub mod error;
pub mod parser;
pub mod view;
pub mod writer;

pub use address::{address_type, is_valid_address, AddressKey, AddressType};
pub use error::{CodecError, CodecResult};
pub use parser::{is_bundle, parse_message, walk_bundle, AddressSpan, MessageScratch};
pub use view::MessageView;
pub use writer::OscWriter;
